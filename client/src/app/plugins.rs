use bevy::app::PluginGroupBuilder;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::pipelined_rendering::PipelinedRenderingPlugin;
use bevy::window::WindowResolution;
use bevy::winit::{UpdateMode, WinitSettings};

use crate::settings::{self, PresentationSettings};

pub fn build_bevy_plugins(startup_settings: &PresentationSettings) -> PluginGroupBuilder {
    DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(create_window_settings(startup_settings)),
            ..Default::default()
        })
        .set(AssetPlugin {
            file_path: startup_settings.assets.root.clone(),
            ..Default::default()
        })
        .disable::<PipelinedRenderingPlugin>()
}

pub fn create_winit_settings(startup_settings: &PresentationSettings) -> WinitSettings {
    let focused_mode = startup_settings.window.fps_limit.to_update_mode();
    WinitSettings {
        focused_mode,
        unfocused_mode: focused_mode,
    }
}

/// Render every frame regardless of focus or input.
pub fn continuous_winit_settings() -> WinitSettings {
    WinitSettings {
        focused_mode: UpdateMode::Continuous,
        unfocused_mode: UpdateMode::Continuous,
    }
}

fn create_window_settings(startup_settings: &PresentationSettings) -> Window {
    let window = &startup_settings.window;
    Window {
        title: window.title.clone(),
        resolution: WindowResolution::new(window.resolution.width, window.resolution.height),
        resizable: true,
        mode: window.mode.to_bevy(),
        present_mode: settings::present_mode_for(window),
        ..Default::default()
    }
}
