use bevy::gltf::GltfMaterialName;
use bevy::prelude::*;
use pet_common::{ColorOverrides, MaterialSlot, Rgb};

use super::hierarchy::owner_subtree;
use super::types::{InstanceMaterials, MaterialOwner, MaterialOverrides, PetRetiring};

pub fn rgb_to_color(rgb: Rgb) -> Color {
    Color::srgb_u8(rgb.r, rgb.g, rgb.b)
}

/// Recolor every material of one owner that has an override. Materials
/// without one keep their authored color.
pub fn apply_colors(
    nodes: &[Entity],
    overrides: &ColorOverrides,
    material_query: &Query<(&MeshMaterial3d<StandardMaterial>, &GltfMaterialName)>,
    materials: &mut Assets<StandardMaterial>,
) -> usize {
    let mut recolored = 0;
    for &entity in nodes {
        let Ok((handle, name)) = material_query.get(entity) else {
            continue;
        };
        let Some(color) = MaterialSlot::from_material_name(&name.0).and_then(|slot| overrides.get(slot))
        else {
            continue;
        };
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color = rgb_to_color(color);
            recolored += 1;
        }
    }
    recolored
}

/// Reapply overrides whenever they change or the owner has just received
/// its private materials.
pub fn apply_material_overrides(
    mut materials: ResMut<Assets<StandardMaterial>>,
    owners_query: Query<
        (Entity, Ref<MaterialOverrides>, Ref<InstanceMaterials>),
        (With<MaterialOwner>, Without<PetRetiring>),
    >,
    owners: Query<(), With<MaterialOwner>>,
    children_query: Query<&Children>,
    material_query: Query<(&MeshMaterial3d<StandardMaterial>, &GltfMaterialName)>,
) {
    for (owner, overrides, instance) in &owners_query {
        if !instance.is_added() && !overrides.is_changed() {
            continue;
        }

        let nodes = owner_subtree(owner, &children_query, &owners);
        let recolored = apply_colors(&nodes, &overrides.0, &material_query, &mut materials);
        trace!("recolored {recolored} material(s) on {owner}");
    }
}
