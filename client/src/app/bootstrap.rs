use bevy::prelude::App;
use std::path::PathBuf;

use crate::composition::gallery_runtime::configure_gallery_app;
use crate::composition::recorder_runtime::configure_recorder_app;
use crate::settings::{self, PresentationSettings};

/// Run the gallery. `records_path` points at a JSON array of pet records;
/// without it two sample pets are shown.
pub fn run_gallery_app(records_path: Option<PathBuf>) {
    let startup_settings = load_startup_settings();
    let mut app = App::new();
    configure_gallery_app(&mut app, &startup_settings, records_path);
    app.run();
}

pub fn run_recorder_app() {
    let startup_settings = load_startup_settings();
    let mut app = App::new();
    configure_recorder_app(&mut app, &startup_settings);
    app.run();
}

fn load_startup_settings() -> PresentationSettings {
    let startup_settings = settings::load_settings_or_default();
    if let Err(error) = settings::ensure_settings_file_exists(&startup_settings) {
        eprintln!(
            "Failed to ensure startup settings file '{}': {}",
            settings::SETTINGS_FILE_PATH,
            error
        );
    }
    startup_settings
}
