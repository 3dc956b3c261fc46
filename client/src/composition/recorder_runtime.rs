use bevy::prelude::*;

use crate::app::plugins::{build_bevy_plugins, continuous_winit_settings};
use crate::gallery::spawn_stage;
use crate::pet::{PetPresentationConfig, PetPresentationPlugin, PetRng};
use crate::recorder::{RecorderPlugin, recording_spin_rate};
use crate::settings::PresentationSettings;

pub fn configure_recorder_app(app: &mut App, startup_settings: &PresentationSettings) {
    let recording = startup_settings.recording.clone();
    let config = PetPresentationConfig {
        pinned_clip: recording.pinned_clip.clone(),
        spin_rate: recording_spin_rate(&recording),
        ..PetPresentationConfig::from_settings(startup_settings)
    };

    app.add_plugins(build_bevy_plugins(startup_settings))
        .insert_resource(continuous_winit_settings())
        .insert_resource(PetRng::seeded(recording.seed))
        .add_plugins(PetPresentationPlugin::new(config))
        .add_plugins(RecorderPlugin {
            settings: recording,
        })
        .add_systems(Startup, spawn_stage);
}
