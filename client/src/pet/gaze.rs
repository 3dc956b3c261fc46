use bevy::math::Affine2;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::clock::ActivePresentationClock;
use super::types::{PetGaze, PetRetiring, PetRig};

/// Pointer position in normalised view coordinates (`[-1, 1]`, +y up), or
/// `None` while the cursor is outside the window.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerInput(pub Option<Vec2>);

pub fn normalise_cursor(cursor: Vec2, window_size: Vec2) -> Option<Vec2> {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        cursor.x / window_size.x * 2.0 - 1.0,
        1.0 - cursor.y / window_size.y * 2.0,
    ))
}

/// Follow the primary window's cursor. Without a window the resource is
/// left to whoever feeds it.
pub fn track_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut pointer: ResMut<PointerInput>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let next = window
        .cursor_position()
        .and_then(|cursor| normalise_cursor(cursor, window.size()));
    pointer.set_if_neq(PointerInput(next));
}

/// Ease each pet's eye texture offset toward the pointer.
pub fn update_gaze(
    clock: Res<ActivePresentationClock>,
    pointer: Res<PointerInput>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pets: Query<(&mut PetGaze, &PetRig), Without<PetRetiring>>,
) {
    let input = pointer.0.map(|p| [p.x, p.y]);
    let delta = clock.delta_secs();
    for (mut gaze, rig) in &mut pets {
        let [x, y] = gaze.0.update(input, delta);
        let offset = Affine2::from_translation(Vec2::new(x, y));
        for handle in &rig.eye_materials {
            // Untextured eyes have nothing to shift.
            let needs_write = materials.get(handle).is_some_and(|material| {
                material.base_color_texture.is_some() && material.uv_transform != offset
            });
            if !needs_write {
                continue;
            }
            if let Some(material) = materials.get_mut(handle) {
                material.uv_transform = offset;
            }
        }
    }
}
