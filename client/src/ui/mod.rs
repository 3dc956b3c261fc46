use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};
use pet_common::accessory::{SIZE_PARAMETER_MAX, SIZE_PARAMETER_MIN};
use pet_common::{AccessoryKind, AccessoryRequest, MaterialSlot, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::gallery::GalleryState;
use crate::pet::PetAppearance;
use crate::settings::{self, FpsLimitSetting, SettingsResource, WindowModeSetting, WindowSettings};

/// Brightness applied to randomised accessory colors.
pub const RANDOM_ACCESSORY_BRIGHTNESS: f32 = 0.6;

pub struct CustomizationPanelPlugin;

impl Plugin for CustomizationPanelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PanelState>()
            .init_resource::<DisplayDraft>()
            .add_systems(
                EguiPrimaryContextPass,
                (draw_customization_panel, draw_display_settings).chain(),
            );
    }
}

#[derive(Resource)]
struct PanelState {
    draft: PetAppearance,
    /// Record index the draft was taken from.
    draft_for: Option<usize>,
    status: Option<String>,
    rng: StdRng,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            draft: PetAppearance::default(),
            draft_for: None,
            status: None,
            rng: StdRng::from_entropy(),
        }
    }
}

/// Window settings being edited; `None` until the window is first drawn.
#[derive(Resource, Default)]
struct DisplayDraft(Option<WindowSettings>);

pub fn random_color<R: Rng + ?Sized>(rng: &mut R, brightness: f32) -> Rgb {
    Rgb::new(
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
    )
    .with_brightness(brightness)
}

/// New accessory colors, leaving kind and size alone.
pub fn randomize_accessory_colors<R: Rng + ?Sized>(
    rng: &mut R,
    request: AccessoryRequest,
) -> AccessoryRequest {
    AccessoryRequest {
        primary: Some(random_color(rng, RANDOM_ACCESSORY_BRIGHTNESS)),
        secondary: Some(random_color(rng, RANDOM_ACCESSORY_BRIGHTNESS)),
        ..request
    }
}

/// Accessories offered to a pet: "none" first, then what its level unlocks.
/// A worn accessory stays listed even when the level no longer allows it.
pub fn accessory_choices(level: u32, worn: Option<AccessoryKind>) -> Vec<Option<AccessoryKind>> {
    let mut choices: Vec<Option<AccessoryKind>> = std::iter::once(None)
        .chain(AccessoryKind::unlocked_for(level).into_iter().map(Some))
        .collect();
    if worn.is_some() && !choices.contains(&worn) {
        choices.push(worn);
    }
    choices
}

fn accessory_label(kind: Option<AccessoryKind>) -> &'static str {
    kind.map_or("None", AccessoryKind::display_name)
}

fn draw_customization_panel(
    mut commands: Commands,
    mut contexts: EguiContexts,
    mut panel: ResMut<PanelState>,
    mut gallery: ResMut<GalleryState>,
    mut theme_initialized: Local<bool>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    if !*theme_initialized {
        apply_panel_theme(ctx);
        *theme_initialized = true;
    }

    if panel.draft_for != Some(gallery.selected) {
        if let Some(record) = gallery.selected_record() {
            panel.draft = PetAppearance::from_record(record);
            panel.draft_for = Some(gallery.selected);
        }
    }

    let mut selected = gallery.selected;
    let mut changed = false;
    let mut save_requested = false;

    egui::Window::new("Customize")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
        .collapsible(false)
        .resizable(false)
        .default_width(300.0)
        .show(ctx, |ui| {
            let Some(record) = gallery.selected_record() else {
                ui.label("No pets to show.");
                return;
            };

            egui::ComboBox::from_label("Pet")
                .selected_text(record.name.as_str())
                .show_ui(ui, |ui| {
                    for (index, other) in gallery.records.iter().enumerate() {
                        ui.selectable_value(&mut selected, index, other.name.as_str());
                    }
                });
            if let Some(short_id) = &record.short_id {
                ui.label(format!("#{short_id}"));
            }
            if !record.description.is_empty() {
                ui.label(record.description.as_str());
            }
            ui.add(
                egui::ProgressBar::new(record.xp_fraction())
                    .text(format!("Level {}", record.level)),
            );
            ui.separator();

            let state = &mut *panel;
            ui.heading("Colors");
            for (label, slot) in [
                ("Coat", MaterialSlot::Coat),
                ("Eyes", MaterialSlot::Eye),
                ("Snout", MaterialSlot::Snout),
            ] {
                let current = state.draft.colors.get(slot).unwrap_or(Rgb::WHITE);
                if let Some(next) = color_row(ui, label, current) {
                    state.draft.colors.set(slot, Some(next));
                    changed = true;
                }
            }
            ui.separator();

            ui.heading("Accessory");
            let mut kind = state.draft.accessory.kind;
            egui::ComboBox::from_label("Hat")
                .selected_text(accessory_label(kind))
                .show_ui(ui, |ui| {
                    for choice in accessory_choices(record.level, state.draft.accessory.kind) {
                        ui.selectable_value(&mut kind, choice, accessory_label(choice));
                    }
                });
            if kind != state.draft.accessory.kind {
                state.draft.accessory.kind = kind;
                changed = true;
            }

            let mut size = state.draft.accessory.size;
            if ui
                .add(
                    egui::Slider::new(&mut size, SIZE_PARAMETER_MIN..=SIZE_PARAMETER_MAX)
                        .text("Size"),
                )
                .changed()
            {
                state.draft.accessory.size = size;
                changed = true;
            }

            let primary = state.draft.accessory.primary.unwrap_or(Rgb::WHITE);
            if let Some(next) = color_row(ui, "Primary", primary) {
                state.draft.accessory.primary = Some(next);
                changed = true;
            }
            let secondary = state.draft.accessory.secondary.unwrap_or(Rgb::WHITE);
            if let Some(next) = color_row(ui, "Secondary", secondary) {
                state.draft.accessory.secondary = Some(next);
                changed = true;
            }
            if ui.button("Randomize colors").clicked() {
                state.draft.accessory =
                    randomize_accessory_colors(&mut state.rng, state.draft.accessory);
                changed = true;
            }
            ui.separator();

            ui.horizontal(|ui| {
                save_requested = ui
                    .add_enabled(gallery.source.is_some(), egui::Button::new("Save"))
                    .clicked();
                if let Some(status) = &state.status {
                    ui.label(status.as_str());
                }
            });
        });

    if selected != gallery.selected {
        gallery.select(selected);
        panel.status = None;
        return;
    }
    if changed {
        gallery.update_selected(&mut commands, &panel.draft);
        panel.status = None;
    }
    if save_requested {
        panel.status = Some(match gallery.save() {
            Ok(Some(path)) => format!("Saved to {}", path.display()),
            Ok(None) => "Nothing to save".to_string(),
            Err(error) => {
                warn!("{error}");
                format!("Save failed: {error}")
            }
        });
    }
}

fn fps_limit_label(limit: FpsLimitSetting) -> &'static str {
    match limit {
        FpsLimitSetting::Default60 => "60 FPS",
        FpsLimitSetting::Monitor => "Monitor",
        FpsLimitSetting::Unlimited => "Unlimited",
    }
}

fn draw_display_settings(
    mut contexts: EguiContexts,
    mut draft: ResMut<DisplayDraft>,
    mut settings_resource: ResMut<SettingsResource>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let draft = draft
        .0
        .get_or_insert_with(|| settings_resource.current.window.clone());

    let mut should_apply = false;
    let mut should_reset = false;
    egui::Window::new("Display")
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(16.0, -16.0))
        .collapsible(true)
        .default_open(false)
        .resizable(false)
        .show(ctx, |ui| {
            let mut fullscreen = matches!(draft.mode, WindowModeSetting::Fullscreen);
            if ui.checkbox(&mut fullscreen, "Fullscreen").changed() {
                draft.mode = if fullscreen {
                    WindowModeSetting::Fullscreen
                } else {
                    WindowModeSetting::Windowed
                };
            }
            ui.checkbox(&mut draft.vsync, "VSync");
            egui::ComboBox::from_label("Frame rate")
                .selected_text(fps_limit_label(draft.fps_limit))
                .show_ui(ui, |ui| {
                    for limit in [
                        FpsLimitSetting::Default60,
                        FpsLimitSetting::Monitor,
                        FpsLimitSetting::Unlimited,
                    ] {
                        ui.selectable_value(&mut draft.fps_limit, limit, fps_limit_label(limit));
                    }
                });
            ui.separator();
            ui.horizontal(|ui| {
                should_apply = ui.button("Apply").clicked();
                should_reset = ui.button("Reset").clicked();
            });
        });

    if should_apply {
        settings_resource.current.window = draft.clone();
        if let Err(error) = settings_resource.save_to_disk() {
            warn!(
                "Failed to save settings file '{}': {}",
                settings::SETTINGS_FILE_PATH,
                error
            );
        }
    }
    if should_reset {
        *draft = settings_resource.current.window.clone();
    }
}

fn color_row(ui: &mut egui::Ui, label: &str, current: Rgb) -> Option<Rgb> {
    let mut rgb = [current.r, current.g, current.b];
    let changed = ui
        .horizontal(|ui| {
            let changed = ui.color_edit_button_srgb(&mut rgb).changed();
            ui.label(label);
            changed
        })
        .inner;
    changed.then(|| Rgb::new(rgb[0], rgb[1], rgb[2]))
}

fn apply_panel_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(12.0, 8.0);
    style.spacing.window_margin = egui::Margin::same(14);
    style.visuals.window_corner_radius = egui::CornerRadius::same(12);
    style.visuals.widgets.active.corner_radius = egui::CornerRadius::same(8);
    style.visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(8);
    style.visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(8);
    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessory_choices_follow_level() {
        assert_eq!(
            accessory_choices(1, None),
            vec![None, Some(AccessoryKind::PartyHat)]
        );
        assert_eq!(accessory_choices(3, None).len(), 4);
    }

    #[test]
    fn test_worn_accessory_stays_listed() {
        let choices = accessory_choices(1, Some(AccessoryKind::SpinnerHat));
        assert_eq!(choices.last(), Some(&Some(AccessoryKind::SpinnerHat)));
        assert_eq!(choices.len(), 3);
    }

    #[test]
    fn test_randomize_keeps_kind_and_size() {
        let mut rng = StdRng::seed_from_u64(11);
        let request = AccessoryRequest {
            size: 1.05,
            ..AccessoryRequest::wearing(AccessoryKind::WizardHat)
        };
        let randomized = randomize_accessory_colors(&mut rng, request);
        assert_eq!(randomized.kind, Some(AccessoryKind::WizardHat));
        assert_eq!(randomized.size, 1.05);
        assert!(randomized.primary.is_some());
        assert!(randomized.secondary.is_some());
    }

    #[test]
    fn test_random_color_is_brightened() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..64 {
            let color = random_color(&mut rng, RANDOM_ACCESSORY_BRIGHTNESS);
            // 0.6 lifts every channel at least a fifth of the way to white.
            assert!(color.r >= 51 && color.g >= 51 && color.b >= 51);
        }
    }
}
