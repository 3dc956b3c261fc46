use bevy::prelude::*;
use bevy::window::{MonitorSelection, PresentMode, PrimaryWindow, WindowMode, WindowResolution};
use bevy::winit::{UpdateMode, WinitSettings};
use pet_common::{ClipSpec, GazeTuning, LoopPolicy, SequencerTiming};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const SETTINGS_FILE_PATH: &str = "./pet_settings.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowModeSetting {
    Windowed,
    Fullscreen,
}

impl Default for WindowModeSetting {
    fn default() -> Self {
        Self::Windowed
    }
}

impl WindowModeSetting {
    pub fn to_bevy(self) -> WindowMode {
        match self {
            Self::Windowed => WindowMode::Windowed,
            Self::Fullscreen => WindowMode::BorderlessFullscreen(MonitorSelection::Current),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FpsLimitSetting {
    Default60,
    Monitor,
    Unlimited,
}

impl Default for FpsLimitSetting {
    fn default() -> Self {
        Self::Default60
    }
}

impl FpsLimitSetting {
    pub fn to_update_mode(self) -> UpdateMode {
        match self {
            Self::Default60 => UpdateMode::reactive(Duration::from_secs_f64(1.0 / 60.0)),
            Self::Monitor | Self::Unlimited => UpdateMode::Continuous,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionSetting {
    pub width: u32,
    pub height: u32,
}

impl Default for ResolutionSetting {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub mode: WindowModeSetting,
    pub resolution: ResolutionSetting,
    pub vsync: bool,
    pub fps_limit: FpsLimitSetting,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Pet Gallery".to_string(),
            mode: WindowModeSetting::Windowed,
            resolution: ResolutionSetting::default(),
            vsync: true,
            fps_limit: FpsLimitSetting::Default60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Root directory handed to the asset server. Relative paths resolve
    /// against the workspace.
    pub root: String,
    pub pet_model: String,
    pub model_scale: f32,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            root: concat!(env!("CARGO_MANIFEST_DIR"), "/../assets").to_string(),
            pet_model: "models/thebest.glb".to_string(),
            model_scale: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPolicySetting {
    Once,
    PingPong,
    Repeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipSetting {
    pub name: String,
    pub policy: LoopPolicySetting,
    /// Only used by `ping_pong`.
    #[serde(default = "default_ping_pong_passes")]
    pub passes: u32,
}

fn default_ping_pong_passes() -> u32 {
    2
}

impl ClipSetting {
    pub fn new(name: &str, policy: LoopPolicySetting) -> Self {
        Self {
            name: name.to_string(),
            policy,
            passes: default_ping_pong_passes(),
        }
    }

    pub fn to_spec(&self) -> ClipSpec {
        let policy = match self.policy {
            LoopPolicySetting::Once => LoopPolicy::OneShotClamped,
            LoopPolicySetting::PingPong => LoopPolicy::PingPong {
                passes: self.passes.max(1),
            },
            LoopPolicySetting::Repeat => LoopPolicy::ContinuousRepeat,
        };
        ClipSpec::new(self.name.clone(), policy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub default_clip: String,
    pub crossfade_secs: f32,
    pub settle_secs: f32,
    pub max_repeat_cycles: u32,
    pub clips: Vec<ClipSetting>,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        let timing = SequencerTiming::default();
        Self {
            default_clip: "sit".to_string(),
            crossfade_secs: timing.crossfade_secs,
            settle_secs: timing.settle_secs,
            max_repeat_cycles: timing.max_repeat_cycles,
            clips: vec![
                ClipSetting::new("sit", LoopPolicySetting::Once),
                ClipSetting::new("wag", LoopPolicySetting::PingPong),
                ClipSetting::new("walkloop", LoopPolicySetting::Repeat),
            ],
        }
    }
}

impl AnimationSettings {
    pub fn timing(&self) -> SequencerTiming {
        SequencerTiming {
            crossfade_secs: self.crossfade_secs,
            settle_secs: self.settle_secs,
            max_repeat_cycles: self.max_repeat_cycles,
        }
    }

    pub fn playlist(&self) -> Vec<ClipSpec> {
        self.clips.iter().map(ClipSetting::to_spec).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeSettings {
    pub threshold: f32,
    pub max_offset: f32,
    pub follow_rate: f32,
}

impl Default for GazeSettings {
    fn default() -> Self {
        let tuning = GazeTuning::default();
        Self {
            threshold: tuning.threshold,
            max_offset: tuning.max_offset,
            follow_rate: tuning.follow_rate,
        }
    }
}

impl GazeSettings {
    pub fn tuning(&self) -> GazeTuning {
        GazeTuning {
            threshold: self.threshold,
            max_offset: self.max_offset,
            follow_rate: self.follow_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessorySettings {
    /// Spinner rotation in radians per second.
    pub spin_rate: f32,
}

impl Default for AccessorySettings {
    fn default() -> Self {
        Self { spin_rate: 3.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct GallerySettings {
    pub thumbnail_dir: String,
    pub capture_thumbnails: bool,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            thumbnail_dir: "thumbnails".to_string(),
            capture_thumbnails: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordingModeSetting {
    /// Smooth hue rotation with hats cycling in catalog order.
    #[default]
    Rainbow,
    /// A fresh random pet every `chaos_interval_frames`.
    Chaos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    pub mode: RecordingModeSetting,
    pub total_frames: u64,
    /// Presentation seconds covered by the whole recording.
    pub span_secs: f32,
    pub output_dir: String,
    pub seed: u64,
    /// Hold this clip for the whole recording instead of sequencing.
    pub pinned_clip: Option<String>,
    pub hat_interval_frames: u64,
    /// Full hue rotations over the recording.
    pub hue_turns: f32,
    pub chaos_interval_frames: u64,
    /// Camera distance oscillates between these over `zoom_cycles` cycles.
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_cycles: f32,
    /// Full turntable rotations of the pet.
    pub turntable_turns: f32,
    /// Full spinner rotations over the recording.
    pub spinner_turns: f32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            mode: RecordingModeSetting::default(),
            total_frames: 600,
            span_secs: 10.0,
            output_dir: "recording".to_string(),
            seed: 7,
            pinned_clip: Some("walkloop".to_string()),
            hat_interval_frames: 60,
            hue_turns: 3.0,
            chaos_interval_frames: 6,
            zoom_min: 4.0,
            zoom_max: 6.0,
            zoom_cycles: 4.0,
            turntable_turns: 5.0,
            spinner_turns: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource, Default)]
#[serde(default)]
pub struct PresentationSettings {
    pub window: WindowSettings,
    pub assets: AssetSettings,
    pub animation: AnimationSettings,
    pub gaze: GazeSettings,
    pub accessory: AccessorySettings,
    pub gallery: GallerySettings,
    pub recording: RecordingSettings,
}

#[derive(Debug, Error)]
pub enum SettingsIoError {
    #[error("failed to read settings file: {0}")]
    Read(std::io::Error),
    #[error("failed to write settings file: {0}")]
    Write(std::io::Error),
    #[error("failed to decode YAML settings: {0}")]
    Deserialize(serde_yaml::Error),
    #[error("failed to encode YAML settings: {0}")]
    Serialize(serde_yaml::Error),
}

#[derive(Resource, Clone)]
pub struct SettingsResource {
    pub current: PresentationSettings,
    path: PathBuf,
}

impl SettingsResource {
    pub fn new(current: PresentationSettings) -> Self {
        Self {
            current,
            path: PathBuf::from(SETTINGS_FILE_PATH),
        }
    }

    pub fn save_to_disk(&self) -> Result<(), SettingsIoError> {
        write_settings_to_path(&self.current, &self.path)
    }
}

/// Keeps the primary window in sync with [`SettingsResource`].
pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_window_settings);
    }
}

pub fn load_settings_or_default() -> PresentationSettings {
    let path = Path::new(SETTINGS_FILE_PATH);

    if !path.exists() {
        return PresentationSettings::default();
    }

    match load_settings_from_path(path) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!(
                "Failed to load settings from '{}': {}. Falling back to defaults.",
                SETTINGS_FILE_PATH, error
            );
            PresentationSettings::default()
        }
    }
}

pub fn ensure_settings_file_exists(settings: &PresentationSettings) -> Result<(), SettingsIoError> {
    let path = Path::new(SETTINGS_FILE_PATH);
    if path.exists() {
        return Ok(());
    }

    write_settings_to_path(settings, path)
}

pub fn present_mode_for(window: &WindowSettings) -> PresentMode {
    if matches!(window.fps_limit, FpsLimitSetting::Unlimited) {
        PresentMode::AutoNoVsync
    } else if window.vsync {
        PresentMode::AutoVsync
    } else {
        PresentMode::AutoNoVsync
    }
}

pub fn load_settings_from_path(path: &Path) -> Result<PresentationSettings, SettingsIoError> {
    let raw = fs::read_to_string(path).map_err(SettingsIoError::Read)?;
    parse_settings(&raw)
}

pub fn parse_settings(raw: &str) -> Result<PresentationSettings, SettingsIoError> {
    serde_yaml::from_str::<PresentationSettings>(raw).map_err(SettingsIoError::Deserialize)
}

pub fn write_settings_to_path(
    settings: &PresentationSettings,
    path: &Path,
) -> Result<(), SettingsIoError> {
    let encoded = serde_yaml::to_string(settings).map_err(SettingsIoError::Serialize)?;
    fs::write(path, encoded).map_err(SettingsIoError::Write)
}

fn apply_window_settings(
    settings: Res<SettingsResource>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    winit_settings: Option<ResMut<WinitSettings>>,
    mut last_applied: Local<Option<WindowSettings>>,
) {
    let current = &settings.current.window;
    if last_applied.as_ref() == Some(current) {
        return;
    }

    if let Ok(mut window) = windows.single_mut() {
        let target_mode = current.mode.to_bevy();
        window.mode = target_mode;
        if matches!(target_mode, WindowMode::Windowed) {
            window.resolution =
                WindowResolution::new(current.resolution.width, current.resolution.height);
        }
        window.present_mode = present_mode_for(current);
    }

    if let Some(mut winit_settings) = winit_settings {
        let update_mode = current.fps_limit.to_update_mode();
        winit_settings.focused_mode = update_mode;
        winit_settings.unfocused_mode = update_mode;
    }

    *last_applied = Some(current.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_yaml() {
        let defaults = PresentationSettings::default();
        let encoded = serde_yaml::to_string(&defaults).unwrap();
        assert_eq!(parse_settings(&encoded).unwrap(), defaults);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let parsed = parse_settings("gaze:\n  max_offset: 0.05\n").unwrap();
        assert_eq!(parsed.gaze.max_offset, 0.05);
        assert_eq!(parsed.gaze.threshold, 0.8);
        assert_eq!(parsed.animation, AnimationSettings::default());
        assert_eq!(parsed.accessory.spin_rate, 3.0);
    }

    #[test]
    fn test_playlist_maps_policies() {
        let playlist = AnimationSettings::default().playlist();
        let policies: Vec<LoopPolicy> = playlist.iter().map(|clip| clip.policy).collect();
        assert_eq!(
            policies,
            vec![
                LoopPolicy::OneShotClamped,
                LoopPolicy::PingPong { passes: 2 },
                LoopPolicy::ContinuousRepeat,
            ]
        );
    }

    #[test]
    fn test_clip_passes_default_when_omitted() {
        let parsed = parse_settings(
            "animation:\n  clips:\n    - name: wag\n      policy: ping_pong\n",
        )
        .unwrap();
        assert_eq!(parsed.animation.clips.len(), 1);
        assert_eq!(parsed.animation.clips[0].passes, 2);
        assert_eq!(parsed.animation.default_clip, "sit");
    }

    #[test]
    fn test_recording_mode_parses_snake_case() {
        let parsed = parse_settings("recording:\n  mode: chaos\n  total_frames: 30\n").unwrap();
        assert_eq!(parsed.recording.mode, RecordingModeSetting::Chaos);
        assert_eq!(parsed.recording.total_frames, 30);
        assert_eq!(parsed.recording.chaos_interval_frames, 6);
    }

    #[test]
    fn test_write_and_load_from_path() {
        let path = std::env::temp_dir().join(format!(
            "pet_settings_test_{}.yaml",
            std::process::id()
        ));
        let mut settings = PresentationSettings::default();
        settings.recording.pinned_clip = None;
        settings.window.fps_limit = FpsLimitSetting::Unlimited;

        write_settings_to_path(&settings, &path).unwrap();
        let loaded = load_settings_from_path(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, settings);
        assert_eq!(present_mode_for(&loaded.window), PresentMode::AutoNoVsync);
    }
}
