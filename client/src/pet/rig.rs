use bevy::gltf::{GltfExtras, GltfMaterialName};
use bevy::prelude::*;
use pet_common::{MaterialSlot, NodeSlot};

use super::hierarchy::{find_all_slots, find_slot, owner_subtree};
use super::types::{InstanceMaterials, MaterialOwner, PetInstance, PetModel, PetRetiring, PetRig};

/// Resolve head bone, tufts and eye materials once per pet, after cloning.
pub fn resolve_pet_rigs(
    mut commands: Commands,
    pets: Query<
        (Entity, &PetInstance),
        (With<InstanceMaterials>, Without<PetRig>, Without<PetRetiring>),
    >,
    owners: Query<(), With<MaterialOwner>>,
    models: Query<(), With<PetModel>>,
    children_query: Query<&Children>,
    names: Query<&Name>,
    extras: Query<&GltfExtras>,
    meshes: Query<(), With<MeshMaterial3d<StandardMaterial>>>,
    material_query: Query<(&MeshMaterial3d<StandardMaterial>, &GltfMaterialName)>,
) {
    for (pet, instance) in &pets {
        let mut nodes = owner_subtree(pet, &children_query, &owners);
        nodes.retain(|&entity| entity != pet && !models.contains(entity));

        // Mesh primitives can carry the bone's name; only bones count.
        let head = find_slot(NodeSlot::Head, &nodes, &names, &extras, |entity| {
            meshes.contains(entity)
        });
        let tufts = find_all_slots(NodeSlot::Tuft, &nodes, &names, &extras);
        let eye_materials: Vec<Handle<StandardMaterial>> = nodes
            .iter()
            .filter_map(|&entity| material_query.get(entity).ok())
            .filter(|(_, name)| MaterialSlot::from_material_name(&name.0) == Some(MaterialSlot::Eye))
            .map(|(handle, _)| handle.0.clone())
            .collect();

        if head.is_none() {
            warn!(
                "pet {:?} has no head bone; accessories will not attach",
                instance.record_id
            );
        }
        debug!(
            "rig for {pet}: head={head:?} tufts={} eyes={}",
            tufts.len(),
            eye_materials.len()
        );

        commands.entity(pet).insert(PetRig {
            head,
            tufts,
            eye_materials,
        });
    }
}
