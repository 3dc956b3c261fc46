//! Accessory attachment, tuft visibility and spinner rotation.

use bevy::gltf::GltfExtras;
use bevy::prelude::*;
use pet_common::{AccessoryRequest, AttachOutcome, ColorOverrides, MaterialSlot, NodeSlot};

use super::PetPresentationConfig;
use super::assets::{TemplateCache, TemplateKey};
use super::clock::ActivePresentationClock;
use super::hierarchy::{find_slot, owner_subtree};
use super::types::{
    InstanceMaterials, MaterialOwner, MaterialOverrides, PetAccessory, PetAccessoryMount,
    PetAccessoryPart, PetRetiring, PetRig, SpinLookupDone, SpinPart,
};

pub fn accessory_overrides(request: &AccessoryRequest) -> ColorOverrides {
    ColorOverrides::new()
        .with(MaterialSlot::AccessoryPrimary, request.primary)
        .with(MaterialSlot::AccessorySecondary, request.secondary)
}

/// Bring each pet's mounted accessory in line with its request.
pub fn sync_accessories(
    mut commands: Commands,
    mut cache: ResMut<TemplateCache>,
    asset_server: Res<AssetServer>,
    mut pets: Query<
        (Entity, &PetAccessory, &mut PetAccessoryMount, &PetRig),
        Without<PetRetiring>,
    >,
) {
    for (pet, request, mut mount, rig) in &mut pets {
        let request = request.0;
        if !mount.0.needs_update(&request) {
            continue;
        }

        // Both queues flush together, so no frame ever sees two accessories.
        let mut released = Vec::new();
        mount.0.apply(
            &request,
            |old| released.push(old),
            |kind, placement| {
                let Some(head) = rig.head else {
                    return AttachOutcome::Unavailable;
                };
                let key = TemplateKey::Accessory(kind);
                let Some(scene) = cache.ready_scene(key) else {
                    if cache.is_failed(key) {
                        warn!("accessory '{}' unavailable for {pet}", kind.id());
                        return AttachOutcome::Unavailable;
                    }
                    cache.request(key, &asset_server);
                    return AttachOutcome::Deferred;
                };

                let [x, y, z] = placement.translation;
                let accessory = commands
                    .spawn((
                        Name::new(format!("accessory:{}", kind.id())),
                        PetAccessoryPart { pet },
                        MaterialOwner,
                        MaterialOverrides(accessory_overrides(&request)),
                        SceneRoot(scene),
                        // Shown once its own materials are colored.
                        Visibility::Hidden,
                        Transform {
                            translation: Vec3::new(x, y, z),
                            rotation: Quat::from_rotation_x(placement.pitch),
                            scale: Vec3::splat(placement.scale),
                        },
                        ChildOf(head),
                    ))
                    .id();
                debug!("attached '{}' to {pet} as {accessory}", kind.id());
                AttachOutcome::Attached(accessory)
            },
        );

        for old in released {
            commands.entity(old).try_despawn();
        }
    }
}

/// Find the spinning part of each freshly cloned accessory, once.
pub fn locate_spin_parts(
    mut commands: Commands,
    config: Res<PetPresentationConfig>,
    accessories: Query<
        Entity,
        (
            With<PetAccessoryPart>,
            With<InstanceMaterials>,
            Without<SpinLookupDone>,
        ),
    >,
    owners: Query<(), With<MaterialOwner>>,
    children_query: Query<&Children>,
    names: Query<&Name>,
    extras: Query<&GltfExtras>,
    transforms: Query<&Transform>,
) {
    for accessory in &accessories {
        let mut nodes = owner_subtree(accessory, &children_query, &owners);
        nodes.retain(|&entity| entity != accessory);
        if let Some(part) = find_slot(NodeSlot::Spin, &nodes, &names, &extras, |_| false) {
            let base = transforms
                .get(part)
                .map(|transform| transform.rotation)
                .unwrap_or(Quat::IDENTITY);
            commands.entity(part).insert(SpinPart {
                rate: config.spin_rate,
                base,
            });
        }
        commands.entity(accessory).insert(SpinLookupDone);
    }
}

/// Tufts hide whenever an accessory type is requested, whether or not the
/// accessory itself could be attached.
pub fn apply_tuft_visibility(
    pets: Query<
        (&PetAccessory, &PetRig),
        (
            Or<(Changed<PetAccessory>, Added<PetRig>)>,
            Without<PetRetiring>,
        ),
    >,
    mut visibility: Query<&mut Visibility>,
) {
    for (request, rig) in &pets {
        let target = if request.0.kind.is_some() {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        for &tuft in &rig.tufts {
            if let Ok(mut current) = visibility.get_mut(tuft) {
                current.set_if_neq(target);
            }
        }
    }
}

pub fn spin_accessory_parts(
    clock: Res<ActivePresentationClock>,
    mut parts: Query<(&SpinPart, &mut Transform)>,
) {
    let now = clock.now_secs();
    for (spin, mut transform) in &mut parts {
        let rotation = spin.base * Quat::from_rotation_y(spin.rate * now);
        if transform.rotation != rotation {
            transform.rotation = rotation;
        }
    }
}
