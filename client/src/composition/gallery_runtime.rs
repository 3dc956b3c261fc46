use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use pet_protocol::{PetRecord, sample_records};
use std::path::PathBuf;

use crate::app::plugins::{build_bevy_plugins, create_winit_settings};
use crate::gallery::{GalleryPlugin, GalleryState, load_records};
use crate::pet::{PetPresentationConfig, PetPresentationPlugin};
use crate::settings::{PresentationSettings, SettingsPlugin, SettingsResource};
use crate::ui::CustomizationPanelPlugin;

pub fn configure_gallery_app(
    app: &mut App,
    startup_settings: &PresentationSettings,
    records_path: Option<PathBuf>,
) {
    let records = gallery_records(records_path.as_ref());

    app.insert_resource(SettingsResource::new(startup_settings.clone()))
        .add_plugins(build_bevy_plugins(startup_settings))
        .insert_resource(create_winit_settings(startup_settings))
        .add_plugins(bevy::diagnostic::FrameTimeDiagnosticsPlugin::default())
        .add_plugins(EguiPlugin::default())
        .add_plugins(SettingsPlugin)
        .add_plugins(PetPresentationPlugin::new(PetPresentationConfig::from_settings(
            startup_settings,
        )))
        .add_plugins(GalleryPlugin {
            state: GalleryState::new(records, records_path),
            settings: startup_settings.gallery.clone(),
        })
        .add_plugins(CustomizationPanelPlugin);
}

fn gallery_records(records_path: Option<&PathBuf>) -> Vec<PetRecord> {
    let Some(path) = records_path else {
        return sample_records();
    };
    match load_records(path) {
        Ok(records) if !records.is_empty() => records,
        Ok(_) => {
            eprintln!("No pets in '{}'. Showing samples.", path.display());
            sample_records()
        }
        Err(error) => {
            eprintln!("{error}. Showing samples.");
            sample_records()
        }
    }
}
