//! Pet gallery: shows one stored pet at a time, lets the customisation panel
//! edit it and captures a thumbnail the first time each pet is ready.

use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, save_to_disk};
use pet_protocol::{PetRecord, RecordError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pet::{
    PetAppearance, PetFactory, PetInstanceReady, PetPipeline, PetPresentationConfig, retire_pet,
    set_pet_accessory, set_pet_colors,
};
use crate::settings::GallerySettings;

const STAGE_BACKGROUND: Color = Color::srgb(0.16, 0.17, 0.21);
pub const CAMERA_FOV_DEGREES: f32 = 35.0;
pub const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 0.45, 0.0);
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.45, 5.0);

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("failed to read pet records: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write pet records: {0}")]
    Write(#[source] std::io::Error),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("failed to encode pet records: {0}")]
    Encode(#[source] serde_json::Error),
}

pub fn load_records(path: &Path) -> Result<Vec<PetRecord>, GalleryError> {
    let raw = fs::read_to_string(path).map_err(GalleryError::Read)?;
    Ok(PetRecord::list_from_json(&raw)?)
}

pub fn save_records(path: &Path, records: &[PetRecord]) -> Result<(), GalleryError> {
    let encoded = serde_json::to_string_pretty(records).map_err(GalleryError::Encode)?;
    fs::write(path, encoded).map_err(GalleryError::Write)
}

/// Records on display and which one is selected.
#[derive(Resource, Debug, Clone)]
pub struct GalleryState {
    pub records: Vec<PetRecord>,
    /// File the records came from; edits are saved back here.
    pub source: Option<PathBuf>,
    pub selected: usize,
    shown: Option<(usize, Entity)>,
}

impl GalleryState {
    pub fn new(records: Vec<PetRecord>, source: Option<PathBuf>) -> Self {
        Self {
            records,
            source,
            selected: 0,
            shown: None,
        }
    }

    pub fn selected_record(&self) -> Option<&PetRecord> {
        self.records.get(self.selected)
    }

    /// The pet entity currently showing the selected record.
    pub fn shown_pet(&self) -> Option<Entity> {
        match self.shown {
            Some((index, entity)) if index == self.selected => Some(entity),
            _ => None,
        }
    }

    pub fn select(&mut self, index: usize) {
        if index < self.records.len() {
            self.selected = index;
        }
    }

    /// Write a new appearance into the selected record and, when it is on
    /// screen, into its pet.
    pub fn update_selected(&mut self, commands: &mut Commands, appearance: &PetAppearance) {
        let pet = self.shown_pet();
        let Some(record) = self.records.get_mut(self.selected) else {
            return;
        };
        record.colors = pet_protocol::ColorProfile::from_overrides(&appearance.colors);
        record.set_accessory(&appearance.accessory);
        if let Some(pet) = pet {
            set_pet_colors(commands, pet, appearance.colors.clone());
            set_pet_accessory(commands, pet, appearance.accessory);
        }
    }

    pub fn save(&self) -> Result<Option<PathBuf>, GalleryError> {
        let Some(path) = &self.source else {
            return Ok(None);
        };
        save_records(path, &self.records)?;
        Ok(Some(path.clone()))
    }
}

pub fn thumbnail_path(dir: &Path, record: &PetRecord) -> PathBuf {
    dir.join(format!("{}.png", record.thumbnail_key()))
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct StageCamera;

/// Camera, key light and ambient fill shared by the gallery and the recorder.
pub fn spawn_stage(mut commands: Commands) {
    commands.insert_resource(ClearColor(STAGE_BACKGROUND));
    commands.insert_resource(GlobalAmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        affects_lightmapped_meshes: true,
    });
    commands.spawn((
        Name::new("stage-camera"),
        StageCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            ..default()
        }),
        Transform::from_translation(CAMERA_START).looking_at(CAMERA_TARGET, Vec3::Y),
    ));
    commands.spawn((
        Name::new("stage-key-light"),
        DirectionalLight {
            illuminance: 6000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.6, 0.0)),
    ));
}

/// Swap the pet on screen whenever the selection moves.
pub fn show_selected_pet(
    mut commands: Commands,
    config: Res<PetPresentationConfig>,
    mut gallery: ResMut<GalleryState>,
) {
    if gallery.shown.is_some_and(|(index, _)| index == gallery.selected) {
        return;
    }
    if let Some((_, previous)) = gallery.shown.take() {
        retire_pet(&mut commands, previous);
    }
    let Some(record) = gallery.selected_record() else {
        return;
    };
    info!("showing pet '{}' ({})", record.name, record.id);
    let pet = PetFactory::spawn_record(&mut commands, &config, record, Transform::default());
    gallery.shown = Some((gallery.selected, pet));
}

pub fn capture_ready_thumbnails(
    mut commands: Commands,
    mut ready: MessageReader<PetInstanceReady>,
    settings: Res<GallerySettings>,
    gallery: Res<GalleryState>,
) {
    for message in ready.read() {
        if !settings.capture_thumbnails {
            continue;
        }
        let Some(record) = message
            .record_id
            .as_deref()
            .and_then(|id| gallery.records.iter().find(|record| record.id == id))
        else {
            continue;
        };
        let dir = Path::new(&settings.thumbnail_dir);
        let path = thumbnail_path(dir, record);
        if path.exists() {
            continue;
        }
        if let Err(error) = fs::create_dir_all(dir) {
            warn!("cannot create thumbnail directory '{}': {error}", dir.display());
            continue;
        }
        debug!("capturing thumbnail {}", path.display());
        commands
            .spawn(Screenshot::primary_window())
            .observe(save_to_disk(path));
    }
}

pub struct GalleryPlugin {
    pub state: GalleryState,
    pub settings: GallerySettings,
}

impl Plugin for GalleryPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.state.clone())
            .insert_resource(self.settings.clone())
            .add_systems(Startup, spawn_stage)
            .add_systems(
                Update,
                (
                    show_selected_pet.before(PetPipeline::Load),
                    capture_ready_thumbnails.after(PetPipeline::Present),
                ),
            );
    }
}
