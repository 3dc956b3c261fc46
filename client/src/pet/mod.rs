//! Real-time pet presentation: per-instance copies of a shared template,
//! recolored materials, one accessory on the head bone, a randomised gesture
//! sequence and pointer-following eyes.

pub mod accessory;
pub mod animation;
pub mod assets;
pub mod clock;
pub mod cloning;
pub mod factory;
pub mod gaze;
pub mod hierarchy;
pub mod lifecycle;
pub mod materials;
pub mod rig;
pub mod types;

use bevy::camera::visibility::VisibilitySystems;
use bevy::prelude::*;
use bevy::transform::TransformSystems;
use pet_common::{ClipSpec, GazeTuning, SequencerTiming};

use crate::settings::PresentationSettings;

pub use animation::{AnimationLibraries, AnimationLibrary, PetAnimation, PetRng};
pub use assets::{TemplateCache, TemplateKey};
pub use clock::ActivePresentationClock;
pub use factory::{PetAppearance, PetFactory, set_pet_accessory, set_pet_colors};
pub use gaze::PointerInput;
pub use lifecycle::{PetInstanceReady, retire_pet};
pub use types::*;

/// Frame ordering of the pet systems.
#[derive(SystemSet, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PetPipeline {
    /// Clock, pointer and template loading.
    Load,
    /// Scene instancing, material cloning and rig lookup.
    Instantiate,
    /// Colors, accessories and tufts.
    Customize,
    /// Gesture sequencing.
    Animate,
    /// Gaze, ready signals and teardown.
    Present,
    /// `PostUpdate`, after scene spawning: owners spawned this frame get
    /// their materials cloned and colored, and spinners are posed, before
    /// anything is drawn.
    Settle,
}

/// Presentation tunables resolved from settings.
#[derive(Resource, Debug, Clone)]
pub struct PetPresentationConfig {
    pub pet_model: String,
    pub model_scale: f32,
    pub playlist: Vec<ClipSpec>,
    pub default_clip: String,
    pub timing: SequencerTiming,
    pub pinned_clip: Option<String>,
    pub gaze: GazeTuning,
    pub spin_rate: f32,
}

impl PetPresentationConfig {
    pub fn from_settings(settings: &PresentationSettings) -> Self {
        Self {
            pet_model: settings.assets.pet_model.clone(),
            model_scale: settings.assets.model_scale,
            playlist: settings.animation.playlist(),
            default_clip: settings.animation.default_clip.clone(),
            timing: settings.animation.timing(),
            pinned_clip: None,
            gaze: settings.gaze.tuning(),
            spin_rate: settings.accessory.spin_rate,
        }
    }
}

impl Default for PetPresentationConfig {
    fn default() -> Self {
        Self::from_settings(&PresentationSettings::default())
    }
}

pub struct PetPresentationPlugin {
    pub config: PetPresentationConfig,
    /// Request every template at startup.
    pub preload: bool,
}

impl PetPresentationPlugin {
    pub fn new(config: PetPresentationConfig) -> Self {
        Self {
            config,
            preload: true,
        }
    }
}

impl Plugin for PetPresentationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(TemplateCache::new(self.config.pet_model.clone()))
            .init_resource::<AnimationLibraries>()
            .init_resource::<ActivePresentationClock>()
            .init_resource::<PointerInput>()
            .add_message::<PetInstanceReady>()
            .configure_sets(
                Update,
                (
                    PetPipeline::Load,
                    PetPipeline::Instantiate,
                    PetPipeline::Customize,
                    PetPipeline::Animate,
                    PetPipeline::Present,
                )
                    .chain(),
            )
            .configure_sets(
                PostUpdate,
                PetPipeline::Settle
                    .before(TransformSystems::Propagate)
                    .before(VisibilitySystems::VisibilityPropagate),
            )
            .add_systems(
                Update,
                (
                    clock::advance_presentation_clock,
                    gaze::track_pointer,
                    assets::poll_template_loads,
                    animation::build_animation_libraries,
                )
                    .chain()
                    .in_set(PetPipeline::Load),
            )
            .add_systems(
                Update,
                (
                    factory::instantiate_pending_pets,
                    cloning::clone_instance_materials,
                    rig::resolve_pet_rigs,
                )
                    .chain()
                    .in_set(PetPipeline::Instantiate),
            )
            .add_systems(
                Update,
                (
                    accessory::sync_accessories,
                    accessory::apply_tuft_visibility,
                    materials::apply_material_overrides,
                    accessory::locate_spin_parts,
                )
                    .chain()
                    .in_set(PetPipeline::Customize),
            )
            .add_systems(
                Update,
                (
                    animation::bind_pet_animations,
                    animation::drive_pet_animations,
                )
                    .chain()
                    .in_set(PetPipeline::Animate),
            )
            .add_systems(
                Update,
                (
                    gaze::update_gaze,
                    lifecycle::emit_ready_signals,
                    lifecycle::teardown_retiring_pets,
                )
                    .chain()
                    .in_set(PetPipeline::Present),
            )
            .add_systems(
                PostUpdate,
                (
                    cloning::clone_instance_materials,
                    materials::apply_material_overrides,
                    accessory::locate_spin_parts,
                    accessory::spin_accessory_parts,
                )
                    .chain()
                    .in_set(PetPipeline::Settle),
            );

        if !app.world().contains_resource::<PetRng>() {
            app.insert_resource(PetRng::from_entropy());
        }
        if self.preload {
            app.add_systems(Startup, assets::preload_templates);
        }
    }
}
