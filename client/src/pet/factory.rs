use bevy::prelude::*;
use pet_common::{AccessoryRequest, ColorOverrides, GazeController};
use pet_protocol::PetRecord;

use super::PetPresentationConfig;
use super::assets::{TemplateCache, TemplateKey};
use super::types::{
    AwaitingTemplate, MaterialOwner, MaterialOverrides, PetAccessory, PetAccessoryMount, PetGaze,
    PetInstance, PetModel, PetRetiring,
};

/// Everything a user can customise about a pet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PetAppearance {
    pub colors: ColorOverrides,
    pub accessory: AccessoryRequest,
}

impl PetAppearance {
    pub fn from_record(record: &PetRecord) -> Self {
        Self {
            colors: record.color_overrides(),
            accessory: record.accessory_request(),
        }
    }
}

pub struct PetFactory;

impl PetFactory {
    /// Spawn a pet root. Its model is instantiated once the base template is
    /// ready.
    pub fn spawn(
        commands: &mut Commands,
        config: &PetPresentationConfig,
        appearance: PetAppearance,
        record_id: Option<String>,
        transform: Transform,
    ) -> Entity {
        let name = match &record_id {
            Some(id) => format!("pet:{id}"),
            None => "pet".to_string(),
        };
        commands
            .spawn((
                Name::new(name),
                PetInstance { record_id },
                MaterialOwner,
                MaterialOverrides(appearance.colors),
                PetAccessory(appearance.accessory),
                PetAccessoryMount::default(),
                PetGaze(GazeController::new(config.gaze)),
                AwaitingTemplate,
                transform,
                // Revealed once its private materials are colored.
                Visibility::Hidden,
            ))
            .id()
    }

    pub fn spawn_record(
        commands: &mut Commands,
        config: &PetPresentationConfig,
        record: &PetRecord,
        transform: Transform,
    ) -> Entity {
        Self::spawn(
            commands,
            config,
            PetAppearance::from_record(record),
            Some(record.id.clone()),
            transform,
        )
    }
}

/// Replace a pet's color overrides. Takes effect on the next frame.
pub fn set_pet_colors(commands: &mut Commands, pet: Entity, colors: ColorOverrides) {
    commands.entity(pet).try_insert(MaterialOverrides(colors));
}

/// Replace a pet's accessory request. Takes effect on the next frame.
pub fn set_pet_accessory(commands: &mut Commands, pet: Entity, accessory: AccessoryRequest) {
    commands.entity(pet).try_insert(PetAccessory(accessory));
}

/// Give waiting pets their private copy of the base scene.
pub fn instantiate_pending_pets(
    mut commands: Commands,
    config: Res<PetPresentationConfig>,
    cache: Res<TemplateCache>,
    pending: Query<Entity, (With<AwaitingTemplate>, Without<PetRetiring>)>,
) {
    if pending.is_empty() {
        return;
    }
    let Some(scene) = cache.ready_scene(TemplateKey::Pet) else {
        return;
    };

    for pet in &pending {
        commands.spawn((
            Name::new("pet-model"),
            PetModel { pet },
            SceneRoot(scene.clone()),
            Transform::from_scale(Vec3::splat(config.model_scale)),
            ChildOf(pet),
        ));
        commands.entity(pet).remove::<AwaitingTemplate>();
    }
}
