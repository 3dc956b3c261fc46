//! Per-instance material copies.
//!
//! Scene spawning already gives every instance its own node hierarchy, but
//! the spawned meshes still point at the template's shared materials. Before
//! an owner's colors or texture offsets are touched, each material it uses is
//! replaced by a private copy.

use bevy::math::Affine2;
use bevy::prelude::*;
use std::collections::hash_map::Entry;

use super::hierarchy::owner_subtree;
use super::types::{
    InstanceMaterials, MaterialOwner, PendingReady, PetInstance, PetRetiring,
};

/// Give every owner that has finished spawning its own materials.
///
/// Owners whose subtree has no material yet are left for a later frame.
/// Owners are spawned hidden and shown from here on; overrides land later in
/// the same pass, before anything is drawn.
pub fn clone_instance_materials(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    owners_pending: Query<
        (Entity, Has<PetInstance>),
        (With<MaterialOwner>, Without<InstanceMaterials>, Without<PetRetiring>),
    >,
    owners: Query<(), With<MaterialOwner>>,
    children_query: Query<&Children>,
    material_query: Query<&MeshMaterial3d<StandardMaterial>>,
) {
    for (owner, is_pet) in &owners_pending {
        let nodes = owner_subtree(owner, &children_query, &owners);
        if !nodes.iter().any(|&entity| material_query.contains(entity)) {
            continue;
        }

        let mut instance = InstanceMaterials::default();
        for entity in nodes {
            let Ok(template) = material_query.get(entity) else {
                continue;
            };
            let handle = match instance.by_template.entry(template.0.id()) {
                Entry::Occupied(existing) => existing.get().clone(),
                Entry::Vacant(slot) => {
                    let Some(mut copy) = materials.get(&template.0).cloned() else {
                        continue;
                    };
                    copy.uv_transform = Affine2::IDENTITY;
                    slot.insert(materials.add(copy)).clone()
                }
            };
            commands.entity(entity).insert(MeshMaterial3d(handle));
        }

        debug!(
            "cloned {} material(s) for owner {owner}",
            instance.by_template.len()
        );
        commands.entity(owner).insert((instance, Visibility::Inherited));
        if is_pet {
            commands.entity(owner).insert(PendingReady);
        }
    }
}
