//! Semantic names for the parts of a pet model that the presentation layer
//! cares about.
//!
//! Assets can tag nodes explicitly (`slot` in the node extras). Older assets
//! only carry their authoring names, so each node slot also knows how to
//! recognise itself by substring.

use std::collections::BTreeMap;

use crate::color::Rgb;

/// Materials that can be recolored, keyed by their glTF material name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialSlot {
    Coat,
    Eye,
    Snout,
    /// First accessory color (`ass1`).
    AccessoryPrimary,
    /// Second accessory color (`ass2`).
    AccessorySecondary,
}

impl MaterialSlot {
    pub const ALL: [MaterialSlot; 5] = [
        MaterialSlot::Coat,
        MaterialSlot::Eye,
        MaterialSlot::Snout,
        MaterialSlot::AccessoryPrimary,
        MaterialSlot::AccessorySecondary,
    ];

    /// Exact match on the material name as authored.
    pub fn from_material_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.material_name() == name)
    }

    pub fn material_name(self) -> &'static str {
        match self {
            MaterialSlot::Coat => "coat",
            MaterialSlot::Eye => "eye",
            MaterialSlot::Snout => "snout",
            MaterialSlot::AccessoryPrimary => "ass1",
            MaterialSlot::AccessorySecondary => "ass2",
        }
    }
}

/// Nodes looked up by the attachment and visibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeSlot {
    /// Attachment bone for accessories.
    Head,
    /// Hair tuft hidden while an accessory is worn.
    Tuft,
    /// Accessory part that rotates continuously.
    Spin,
}

impl NodeSlot {
    pub fn tag(self) -> &'static str {
        match self {
            NodeSlot::Head => "head",
            NodeSlot::Tuft => "tuft",
            NodeSlot::Spin => "spin",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "head" => Some(NodeSlot::Head),
            "tuft" => Some(NodeSlot::Tuft),
            "spin" => Some(NodeSlot::Spin),
            _ => None,
        }
    }

    fn legacy_keywords(self) -> &'static [&'static str] {
        match self {
            NodeSlot::Head => &["head"],
            NodeSlot::Tuft => &["tuft"],
            NodeSlot::Spin => &["spin", "top", "propeller"],
        }
    }

    /// Case-insensitive substring match for untagged assets.
    pub fn matches_legacy_name(self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.legacy_keywords()
            .iter()
            .any(|keyword| lowered.contains(keyword))
    }
}

/// Per-slot color overrides. Slots without an entry are left as authored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorOverrides {
    colors: BTreeMap<MaterialSlot, Rgb>,
}

impl ColorOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: MaterialSlot, color: Option<Rgb>) -> Self {
        self.set(slot, color);
        self
    }

    pub fn set(&mut self, slot: MaterialSlot, color: Option<Rgb>) {
        match color {
            Some(color) => {
                self.colors.insert(slot, color);
            }
            None => {
                self.colors.remove(&slot);
            }
        }
    }

    pub fn get(&self, slot: MaterialSlot) -> Option<Rgb> {
        self.colors.get(&slot).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialSlot, Rgb)> + '_ {
        self.colors.iter().map(|(slot, color)| (*slot, *color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_names_are_exact() {
        assert_eq!(MaterialSlot::from_material_name("coat"), Some(MaterialSlot::Coat));
        assert_eq!(
            MaterialSlot::from_material_name("ass2"),
            Some(MaterialSlot::AccessorySecondary)
        );
        assert_eq!(MaterialSlot::from_material_name("Coat"), None);
        assert_eq!(MaterialSlot::from_material_name("coat.001"), None);
    }

    #[test]
    fn test_legacy_head_match_is_case_insensitive() {
        assert!(NodeSlot::Head.matches_legacy_name("mixamorig:Head"));
        assert!(NodeSlot::Head.matches_legacy_name("HEAD_end"));
        assert!(!NodeSlot::Head.matches_legacy_name("Neck"));
    }

    #[test]
    fn test_spin_keywords() {
        for name in ["Spinner", "hat_top", "Propeller.001"] {
            assert!(NodeSlot::Spin.matches_legacy_name(name), "{name}");
        }
        assert!(!NodeSlot::Spin.matches_legacy_name("brim"));
    }

    #[test]
    fn test_tags_parse() {
        assert_eq!(NodeSlot::from_tag(" Head "), Some(NodeSlot::Head));
        assert_eq!(NodeSlot::from_tag("tail"), None);
    }

    #[test]
    fn test_overrides_clear_with_none() {
        let mut overrides = ColorOverrides::new()
            .with(MaterialSlot::Coat, Some(Rgb::new(1, 2, 3)))
            .with(MaterialSlot::Eye, None);
        assert_eq!(overrides.get(MaterialSlot::Coat), Some(Rgb::new(1, 2, 3)));
        assert_eq!(overrides.get(MaterialSlot::Eye), None);

        overrides.set(MaterialSlot::Coat, None);
        assert!(overrides.is_empty());
    }
}
