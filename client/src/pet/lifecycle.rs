use bevy::prelude::*;

use super::animation::PetAnimation;
use super::types::{PendingReady, PetAccessoryMount, PetInstance, PetRetiring, ReadySignalled};

/// Sent once per pet, one frame after its materials were first cloned and
/// colored.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct PetInstanceReady {
    pub entity: Entity,
    pub record_id: Option<String>,
}

/// Mark a pet for teardown. The pet disappears at the end of the frame's
/// pipeline and no other pet system touches it from now on.
pub fn retire_pet(commands: &mut Commands, pet: Entity) {
    commands.entity(pet).try_insert(PetRetiring);
}

pub fn emit_ready_signals(
    mut commands: Commands,
    mut ready: MessageWriter<PetInstanceReady>,
    pets: Query<
        (Entity, &PetInstance, Ref<PendingReady>),
        (Without<ReadySignalled>, Without<PetRetiring>),
    >,
) {
    for (pet, instance, pending) in &pets {
        // Colors landed this frame; wait until they have been rendered once.
        if pending.is_added() {
            continue;
        }
        ready.write(PetInstanceReady {
            entity: pet,
            record_id: instance.record_id.clone(),
        });
        commands
            .entity(pet)
            .remove::<PendingReady>()
            .insert(ReadySignalled);
    }
}

/// Stop sequencing, stop all clips, release the accessory and despawn.
pub fn teardown_retiring_pets(
    mut commands: Commands,
    mut pets: Query<
        (
            Entity,
            Option<&mut PetAnimation>,
            Option<&mut PetAccessoryMount>,
        ),
        With<PetRetiring>,
    >,
    mut players: Query<&mut AnimationPlayer>,
) {
    for (pet, animation, mount) in &mut pets {
        if let Some(mut animation) = animation {
            if animation.sequencer.teardown() {
                if let Ok(mut player) = players.get_mut(animation.player) {
                    player.stop_all();
                }
            }
        }
        if let Some(mut mount) = mount {
            mount
                .0
                .release_all(|accessory| {
                    commands.entity(accessory).try_despawn();
                });
        }
        debug!("despawning pet {pet}");
        commands.entity(pet).try_despawn();
    }
}
