//! Offline promo export: one pet, a deterministic clock and a PNG per frame.
//!
//! The clock stays paused until the pet has rendered once with its materials
//! in place, then advances one fixed step per frame. Every captured frame is
//! a pure function of its index, the seed and the settings.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, save_to_disk};
use pet_common::accessory::{SIZE_PARAMETER_MAX, SIZE_PARAMETER_MIN};
use pet_common::{AccessoryKind, AccessoryRequest, ColorOverrides, MaterialSlot, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use std::fs;
use std::path::PathBuf;

use crate::gallery::{CAMERA_TARGET, StageCamera};
use crate::pet::{
    ActivePresentationClock, PetAppearance, PetFactory, PetInstanceReady, PetPipeline,
    PetPresentationConfig, set_pet_accessory, set_pet_colors,
};
use crate::settings::{RecordingModeSetting, RecordingSettings};

/// Frames to keep running after the last capture so pending screenshots land.
const EXIT_GRACE_FRAMES: u32 = 8;

/// Hats in the order the rainbow run shows them.
pub const HAT_CYCLE: [Option<AccessoryKind>; 4] = [
    None,
    Some(AccessoryKind::PartyHat),
    Some(AccessoryKind::WizardHat),
    Some(AccessoryKind::SpinnerHat),
];

pub fn default_appearance() -> PetAppearance {
    PetAppearance {
        colors: ColorOverrides::new()
            .with(MaterialSlot::Coat, Some(Rgb::new(0x3A, 0x8D, 0xFF)))
            .with(MaterialSlot::Eye, Some(Rgb::WHITE))
            .with(MaterialSlot::Snout, Some(Rgb::new(0x22, 0x22, 0x22))),
        accessory: AccessoryRequest::none(),
    }
}

pub fn hat_for_frame(frame: u64, interval: u64) -> Option<AccessoryKind> {
    let slot = (frame / interval.max(1)) % HAT_CYCLE.len() as u64;
    HAT_CYCLE[slot as usize]
}

/// Rainbow look at `progress` in `[0, 1]`: every slot walks the hue circle
/// `hue_turns` times, each from its own starting offset.
pub fn rainbow_appearance(
    progress: f32,
    hue_turns: f32,
    hat: Option<AccessoryKind>,
    base: &PetAppearance,
) -> PetAppearance {
    let hue = (progress * 360.0 * hue_turns).rem_euclid(360.0);
    PetAppearance {
        colors: ColorOverrides::new()
            .with(MaterialSlot::Coat, Some(Rgb::from_hsl(hue, 70.0, 50.0)))
            .with(MaterialSlot::Eye, Some(Rgb::from_hsl(hue + 120.0, 60.0, 70.0)))
            .with(MaterialSlot::Snout, Some(Rgb::from_hsl(hue + 240.0, 50.0, 30.0))),
        accessory: AccessoryRequest {
            kind: hat,
            primary: Some(Rgb::from_hsl(hue + 60.0, 80.0, 55.0)),
            secondary: Some(Rgb::from_hsl(hue + 180.0, 80.0, 55.0)),
            ..base.accessory
        },
    }
}

fn random_rgb<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    Rgb::new(
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
    )
}

/// A completely random pet.
pub fn chaos_appearance<R: Rng + ?Sized>(rng: &mut R) -> PetAppearance {
    let colors = ColorOverrides::new()
        .with(MaterialSlot::Coat, Some(random_rgb(rng)))
        .with(MaterialSlot::Eye, Some(random_rgb(rng)))
        .with(MaterialSlot::Snout, Some(random_rgb(rng)));
    let hat = HAT_CYCLE[rng.gen_range(0..HAT_CYCLE.len())];
    let accessory = AccessoryRequest {
        kind: hat,
        size: rng.gen_range(SIZE_PARAMETER_MIN..SIZE_PARAMETER_MAX),
        primary: Some(random_rgb(rng)),
        secondary: Some(random_rgb(rng)),
    };
    PetAppearance { colors, accessory }
}

/// Camera distance oscillating between `min` and `max`, starting halfway.
pub fn zoom_distance(progress: f32, settings: &RecordingSettings) -> f32 {
    let wave = 0.5 + 0.5 * (progress * settings.zoom_cycles * TAU).sin();
    settings.zoom_min + (settings.zoom_max - settings.zoom_min) * wave
}

pub fn frame_file_name(frame: u64) -> String {
    format!("frame_{frame:05}.png")
}

/// Spin rate that gives `spinner_turns` full turns over the recording.
pub fn recording_spin_rate(settings: &RecordingSettings) -> f32 {
    if settings.span_secs <= 0.0 {
        return 0.0;
    }
    TAU * settings.spinner_turns / settings.span_secs
}

#[derive(Resource)]
pub struct RecorderState {
    settings: RecordingSettings,
    pet: Option<Entity>,
    rng: StdRng,
    appearance: PetAppearance,
    /// Frames captured so far.
    frame: u64,
    exit_countdown: Option<u32>,
}

impl RecorderState {
    pub fn new(settings: RecordingSettings) -> Self {
        // Chaos picks use a stream apart from gesture picks.
        let rng = StdRng::seed_from_u64(settings.seed.wrapping_add(1));
        Self {
            settings,
            pet: None,
            rng,
            appearance: default_appearance(),
            frame: 0,
            exit_countdown: None,
        }
    }

    pub fn pet(&self) -> Option<Entity> {
        self.pet
    }

    pub fn frames_captured(&self) -> u64 {
        self.frame
    }

    /// Appearance for the frame about to be captured.
    fn next_appearance(&mut self, frame: u64, progress: f32) -> Option<PetAppearance> {
        match self.settings.mode {
            RecordingModeSetting::Rainbow => {
                let hat = hat_for_frame(frame, self.settings.hat_interval_frames);
                Some(rainbow_appearance(
                    progress,
                    self.settings.hue_turns,
                    hat,
                    &self.appearance,
                ))
            }
            RecordingModeSetting::Chaos => {
                let interval = self.settings.chaos_interval_frames.max(1);
                (frame % interval == 0).then(|| chaos_appearance(&mut self.rng))
            }
        }
    }
}

pub fn spawn_recording_pet(
    mut commands: Commands,
    config: Res<PetPresentationConfig>,
    mut recorder: ResMut<RecorderState>,
) {
    let appearance = recorder.appearance.clone();
    let pet = PetFactory::spawn(&mut commands, &config, appearance, None, Transform::default());
    recorder.pet = Some(pet);
    info!(
        "recording {} frame(s) to '{}'",
        recorder.settings.total_frames, recorder.settings.output_dir
    );
}

/// Release the clock once the pet has been seen with its colors.
pub fn start_when_ready(
    mut ready: MessageReader<PetInstanceReady>,
    recorder: Res<RecorderState>,
    mut clock: ResMut<ActivePresentationClock>,
) {
    if !clock.is_paused() {
        ready.clear();
        return;
    }
    if ready
        .read()
        .any(|message| Some(message.entity) == recorder.pet)
    {
        info!("pet ready, recording starts");
        clock.resume();
    }
}

/// Pose the pet and the camera for the current frame.
pub fn stage_recording_frame(
    mut commands: Commands,
    clock: Res<ActivePresentationClock>,
    mut recorder: ResMut<RecorderState>,
    mut pets: Query<&mut Transform, Without<StageCamera>>,
    mut cameras: Query<&mut Transform, With<StageCamera>>,
) {
    if clock.is_paused() || recorder.exit_countdown.is_some() {
        return;
    }
    let Some(pet) = recorder.pet else {
        return;
    };
    let progress = clock.progress_fraction().unwrap_or(0.0);
    let frame = recorder.frame + 1;

    if let Some(appearance) = recorder.next_appearance(frame, progress) {
        if appearance != recorder.appearance {
            set_pet_colors(&mut commands, pet, appearance.colors.clone());
            set_pet_accessory(&mut commands, pet, appearance.accessory);
            recorder.appearance = appearance;
        }
    }

    if let Ok(mut transform) = pets.get_mut(pet) {
        transform.rotation = Quat::from_rotation_y(progress * TAU * recorder.settings.turntable_turns);
    }
    let distance = zoom_distance(progress, &recorder.settings);
    for mut transform in &mut cameras {
        let direction = (transform.translation - CAMERA_TARGET).normalize_or(Vec3::Z);
        transform.translation = CAMERA_TARGET + direction * distance;
    }
}

pub fn capture_recording_frame(
    mut commands: Commands,
    clock: Res<ActivePresentationClock>,
    mut recorder: ResMut<RecorderState>,
    mut exit: MessageWriter<AppExit>,
) {
    if clock.is_paused() {
        return;
    }
    if let Some(remaining) = recorder.exit_countdown {
        if remaining == 0 {
            info!("recording finished: {} frame(s)", recorder.frame);
            exit.write(AppExit::Success);
        } else {
            recorder.exit_countdown = Some(remaining - 1);
        }
        return;
    }

    recorder.frame += 1;
    let dir = PathBuf::from(&recorder.settings.output_dir);
    if recorder.frame == 1 {
        if let Err(error) = fs::create_dir_all(&dir) {
            error!("cannot create output directory '{}': {error}", dir.display());
            exit.write(AppExit::error());
            return;
        }
    }
    let path = dir.join(frame_file_name(recorder.frame));
    commands
        .spawn(Screenshot::primary_window())
        .observe(save_to_disk(path));

    if recorder.frame >= recorder.settings.total_frames {
        recorder.exit_countdown = Some(EXIT_GRACE_FRAMES);
    }
}

pub struct RecorderPlugin {
    pub settings: RecordingSettings,
}

impl Plugin for RecorderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(RecorderState::new(self.settings.clone()))
            .insert_resource(
                ActivePresentationClock::progress(self.settings.total_frames, self.settings.span_secs)
                    .paused(),
            )
            .add_systems(Startup, spawn_recording_pet)
            .add_systems(
                Update,
                (
                    start_when_ready.before(PetPipeline::Load),
                    stage_recording_frame
                        .after(PetPipeline::Load)
                        .before(PetPipeline::Instantiate),
                    capture_recording_frame.after(PetPipeline::Present),
                ),
            );
    }
}
