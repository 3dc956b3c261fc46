//! Pet records as delivered by the persistence collaborator.

use chrono::{DateTime, Utc};
use pet_common::{AccessoryKind, AccessoryRequest, ColorOverrides, MaterialSlot, Rgb};
use serde::{Deserialize, Deserializer, Serialize};

use crate::short_id::ShortId;

/// Errors produced while reading pet records.
#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error("failed to parse pet record json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("pet record has an empty id")]
    MissingId,

    #[error("invalid color '{value}' for {field}")]
    InvalidColor { field: &'static str, value: String },

    #[error("unknown accessory type '{0}'")]
    UnknownAccessory(String),
}

/// Coat, eye and snout colors as nullable hex strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorProfile {
    pub coat: Option<String>,
    pub eye: Option<String>,
    pub snout: Option<String>,
}

impl ColorProfile {
    pub fn from_overrides(overrides: &ColorOverrides) -> Self {
        let hex = |slot| overrides.get(slot).map(Rgb::to_hex);
        Self {
            coat: hex(MaterialSlot::Coat),
            eye: hex(MaterialSlot::Eye),
            snout: hex(MaterialSlot::Snout),
        }
    }

    /// Overrides for the colors that parse. Invalid values are skipped.
    pub fn overrides(&self) -> ColorOverrides {
        let mut overrides = ColorOverrides::new();
        for (slot, field, value) in self.fields() {
            overrides.set(slot, parse_lenient(field, value));
        }
        overrides
    }

    fn fields(&self) -> [(MaterialSlot, &'static str, Option<&str>); 3] {
        [
            (MaterialSlot::Coat, "coat", self.coat.as_deref()),
            (MaterialSlot::Eye, "eye", self.eye.as_deref()),
            (MaterialSlot::Snout, "snout", self.snout.as_deref()),
        ]
    }
}

/// One worn accessory as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessoryDescriptor {
    #[serde(rename = "type")]
    pub type_id: Option<String>,
    pub scale: Option<f32>,
    pub ass1: Option<String>,
    pub ass2: Option<String>,
}

impl AccessoryDescriptor {
    pub fn from_request(request: &AccessoryRequest) -> Self {
        Self {
            type_id: request.kind.map(|kind| kind.id().to_string()),
            scale: Some(request.size),
            ass1: request.primary.map(Rgb::to_hex),
            ass2: request.secondary.map(Rgb::to_hex),
        }
    }

    /// Client-side request. Unknown types and unparsable colors degrade to
    /// "none" and "leave as authored".
    pub fn to_request(&self) -> AccessoryRequest {
        let kind = self.type_id.as_deref().and_then(|id| {
            let kind = AccessoryKind::from_id(id);
            if kind.is_none() {
                log::warn!("unknown accessory type '{id}', treating as none");
            }
            kind
        });
        AccessoryRequest {
            kind,
            // A zero scale is as good as unset.
            size: self
                .scale
                .filter(|scale| *scale != 0.0)
                .unwrap_or(pet_common::accessory::SIZE_PARAMETER_FALLBACK),
            primary: parse_lenient("ass1", self.ass1.as_deref()),
            secondary: parse_lenient("ass2", self.ass2.as_deref()),
        }
    }
}

/// A stored pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetRecord {
    pub id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_short_id"
    )]
    pub short_id: Option<ShortId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub colors: ColorProfile,
    #[serde(default)]
    pub accessories: Vec<AccessoryDescriptor>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub xp: f32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_level() -> u32 {
    1
}

/// A malformed short id is dropped with a warning instead of failing the
/// whole record.
fn lenient_short_id<'de, D>(deserializer: D) -> Result<Option<ShortId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match ShortId::parse(&value) {
        Ok(short_id) => Some(short_id),
        Err(err) => {
            log::warn!("ignoring shortId '{value}': {err}");
            None
        }
    }))
}

impl PetRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            short_id: None,
            name: name.into(),
            description: String::new(),
            colors: ColorProfile::default(),
            accessories: Vec::new(),
            level: default_level(),
            xp: 0.0,
            created_at: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let record: Self = serde_json::from_str(json)?;
        record.validate()?;
        Ok(record)
    }

    /// Parse a JSON array of records.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, RecordError> {
        let records: Vec<Self> = serde_json::from_str(json)?;
        for record in &records {
            record.validate()?;
        }
        Ok(records)
    }

    /// Strict check used at ingestion. Rendering paths stay lenient.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.id.trim().is_empty() {
            return Err(RecordError::MissingId);
        }
        for (_, field, value) in self.colors.fields() {
            if let Some(value) = value {
                Rgb::from_hex(value).map_err(|_| RecordError::InvalidColor {
                    field,
                    value: value.to_string(),
                })?;
            }
        }
        for accessory in &self.accessories {
            if let Some(id) = &accessory.type_id {
                if AccessoryKind::from_id(id).is_none() {
                    return Err(RecordError::UnknownAccessory(id.clone()));
                }
            }
            for (field, value) in [("ass1", &accessory.ass1), ("ass2", &accessory.ass2)] {
                if let Some(value) = value {
                    Rgb::from_hex(value).map_err(|_| RecordError::InvalidColor {
                        field,
                        value: value.clone(),
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Only the first accessory is ever worn.
    pub fn active_accessory(&self) -> Option<&AccessoryDescriptor> {
        self.accessories.first()
    }

    pub fn accessory_request(&self) -> AccessoryRequest {
        self.active_accessory()
            .map(AccessoryDescriptor::to_request)
            .unwrap_or_else(AccessoryRequest::none)
    }

    pub fn color_overrides(&self) -> ColorOverrides {
        self.colors.overrides()
    }

    /// Progress toward the next level in `[0, 1]`.
    pub fn xp_fraction(&self) -> f32 {
        if self.xp.is_finite() {
            self.xp.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn set_accessory(&mut self, request: &AccessoryRequest) {
        self.accessories = vec![AccessoryDescriptor::from_request(request)];
    }

    /// Accessories the pet's level allows.
    pub fn unlocked_accessories(&self) -> Vec<AccessoryKind> {
        AccessoryKind::unlocked_for(self.level)
    }

    /// Key under which a rendered thumbnail is cached.
    pub fn thumbnail_key(&self) -> String {
        format!("pet-thumb-{}", self.id)
    }
}

/// Two demo pets used when no records are supplied.
pub fn sample_records() -> Vec<PetRecord> {
    let pet = |id: &str, name: &str, description: &str, colors: [&str; 3], level, xp| PetRecord {
        description: description.to_string(),
        colors: ColorProfile {
            coat: Some(colors[0].to_string()),
            eye: Some(colors[1].to_string()),
            snout: Some(colors[2].to_string()),
        },
        level,
        xp,
        ..PetRecord::new(id, name)
    };
    vec![
        pet(
            "GF123",
            "Gizmo",
            "Curious little hound.",
            ["#d5b6fb", "#eb7a88", "#b5b550"],
            3,
            0.42,
        ),
        pet(
            "AB777",
            "Bolt",
            "Sleepy zoomer.",
            ["#f5d6a1", "#222222", "#c08b5b"],
            5,
            0.96,
        ),
    ]
}

fn parse_lenient(field: &str, value: Option<&str>) -> Option<Rgb> {
    let value = value?;
    match Rgb::from_hex(value) {
        Ok(color) => Some(color),
        Err(err) => {
            log::warn!("ignoring {field} color: {err}");
            None
        }
    }
}
