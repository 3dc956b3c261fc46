use bevy::asset::AssetId;
use bevy::prelude::*;
use pet_common::{AccessoryMount, AccessoryRequest, ColorOverrides, GazeController};
use std::collections::HashMap;

/// Root of one rendered pet.
#[derive(Component, Debug, Clone)]
pub struct PetInstance {
    /// Record id the instance was spawned from, if any.
    pub record_id: Option<String>,
}

/// Child entity holding the pet's private copy of the base scene.
#[derive(Component, Debug, Clone, Copy)]
pub struct PetModel {
    pub pet: Entity,
}

/// The instance is waiting for its base template to finish loading.
#[derive(Component, Debug, Default)]
pub struct AwaitingTemplate;

/// Root of a hierarchy whose materials belong to exactly one instance.
///
/// Pets and their accessories are separate owners; traversals never cross
/// from one owner into another.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct MaterialOwner;

/// Private material copies of an owner, keyed by the template material they
/// were cloned from. Present once cloning has run.
#[derive(Component, Debug, Default)]
pub struct InstanceMaterials {
    pub by_template: HashMap<AssetId<StandardMaterial>, Handle<StandardMaterial>>,
}

/// Requested colors for an owner's materials.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct MaterialOverrides(pub ColorOverrides);

/// Requested accessory of a pet.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PetAccessory(pub AccessoryRequest);

/// The pet's single accessory slot.
#[derive(Component, Debug, Default)]
pub struct PetAccessoryMount(pub AccessoryMount<Entity>);

/// Marks an accessory instance and the pet wearing it.
#[derive(Component, Debug, Clone, Copy)]
pub struct PetAccessoryPart {
    pub pet: Entity,
}

/// Set on an accessory once its spin part lookup has run.
#[derive(Component, Debug, Default)]
pub struct SpinLookupDone;

/// Accessory part rotating about its local Y axis.
///
/// The angle is `rate × now` on the presentation clock, on top of the
/// part's authored rotation, so a freshly attached part starts in phase.
#[derive(Component, Debug, Clone, Copy)]
pub struct SpinPart {
    /// Radians per presentation second.
    pub rate: f32,
    pub base: Quat,
}

/// Nodes of the pet resolved once after its materials were cloned.
#[derive(Component, Debug, Clone, Default)]
pub struct PetRig {
    pub head: Option<Entity>,
    pub tufts: Vec<Entity>,
    pub eye_materials: Vec<Handle<StandardMaterial>>,
}

#[derive(Component, Debug, Default)]
pub struct PetGaze(pub GazeController);

/// The pet is being torn down; every other system ignores it.
#[derive(Component, Debug, Default)]
pub struct PetRetiring;

/// Colors have been applied for the first time; the ready signal follows on
/// the next frame.
#[derive(Component, Debug, Default)]
pub struct PendingReady;

#[derive(Component, Debug, Default)]
pub struct ReadySignalled;
