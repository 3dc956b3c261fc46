//! Pointer-driven eye offset.
//!
//! The pointer lives in normalised view coordinates (`[-1, 1]`, +y up). Inside
//! the deadzone threshold the pupils follow it; beyond it they drift back to
//! the centre.

/// Tuning for [`GazeController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeTuning {
    /// Pointer magnitude (per axis) past which the gaze returns to centre.
    pub threshold: f32,
    /// Largest texture offset per axis.
    pub max_offset: f32,
    /// Exponential approach rate, per second.
    pub follow_rate: f32,
}

impl Default for GazeTuning {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            max_offset: 0.02,
            follow_rate: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeController {
    tuning: GazeTuning,
    offset: [f32; 2],
}

impl Default for GazeController {
    fn default() -> Self {
        Self::new(GazeTuning::default())
    }
}

impl GazeController {
    pub fn new(tuning: GazeTuning) -> Self {
        Self {
            tuning: GazeTuning {
                threshold: if tuning.threshold > 0.0 {
                    tuning.threshold
                } else {
                    GazeTuning::default().threshold
                },
                max_offset: tuning.max_offset.abs(),
                follow_rate: tuning.follow_rate.max(0.0),
            },
            offset: [0.0, 0.0],
        }
    }

    pub fn tuning(&self) -> GazeTuning {
        self.tuning
    }

    pub fn offset(&self) -> [f32; 2] {
        self.offset
    }

    /// Where the offset is heading for a given pointer. `None` means the
    /// pointer is not over the view.
    pub fn target_for(&self, pointer: Option<[f32; 2]>) -> [f32; 2] {
        let Some([x, y]) = pointer else {
            return [0.0, 0.0];
        };
        let threshold = self.tuning.threshold;
        if !x.is_finite() || !y.is_finite() || x.abs() > threshold || y.abs() > threshold {
            return [0.0, 0.0];
        }

        let px = x / threshold;
        let py = y / threshold;
        let max = self.tuning.max_offset;
        [
            (-px * max).clamp(-max, max),
            (py * max).clamp(-max, max),
        ]
    }

    /// Step the offset toward the target for this frame and return it.
    pub fn update(&mut self, pointer: Option<[f32; 2]>, delta_secs: f32) -> [f32; 2] {
        let target = self.target_for(pointer);
        let factor = if delta_secs.is_finite() {
            (self.tuning.follow_rate * delta_secs).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let max = self.tuning.max_offset;
        for axis in 0..2 {
            let current = self.offset[axis];
            self.offset[axis] = (current + (target[axis] - current) * factor).clamp(-max, max);
        }
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_outside_threshold_targets_centre() {
        let gaze = GazeController::default();
        assert_eq!(gaze.target_for(Some([0.9, 0.0])), [0.0, 0.0]);
        assert_eq!(gaze.target_for(Some([0.0, -0.81])), [0.0, 0.0]);
        assert_eq!(gaze.target_for(None), [0.0, 0.0]);
        assert_eq!(gaze.target_for(Some([f32::NAN, 0.0])), [0.0, 0.0]);
    }

    #[test]
    fn test_inside_threshold_inverts_horizontal() {
        let gaze = GazeController::default();
        let [x, y] = gaze.target_for(Some([0.4, 0.0]));
        assert!((x - -0.01).abs() < EPS);
        assert!(y.abs() < EPS);

        let [x, y] = gaze.target_for(Some([-0.8, 0.8]));
        assert!((x - 0.02).abs() < EPS);
        assert!((y - 0.02).abs() < EPS);
    }

    #[test]
    fn test_large_delta_snaps_to_target() {
        let mut gaze = GazeController::default();
        let [x, _] = gaze.update(Some([0.4, 0.0]), 10.0);
        assert!((x - -0.01).abs() < EPS);
    }

    #[test]
    fn test_smoothing_is_partial_for_small_deltas() {
        let mut gaze = GazeController::default();
        let [x, _] = gaze.update(Some([0.4, 0.0]), 0.1);
        assert!((x - -0.005).abs() < EPS);
        let [x, _] = gaze.update(Some([0.95, 0.0]), 0.1);
        assert!((x - -0.0025).abs() < EPS);
    }

    #[test]
    fn test_offset_stays_bounded_over_wide_input() {
        let mut gaze = GazeController::default();
        let mut step = 0u32;
        let mut x = -10.0f32;
        while x <= 10.0 {
            let mut y = -10.0f32;
            while y <= 10.0 {
                let dt = [0.0, 0.016, 0.1, 0.5, 3.0][(step % 5) as usize];
                let [ox, oy] = gaze.update(Some([x, y]), dt);
                assert!(ox.abs() <= 0.02 + EPS && oy.abs() <= 0.02 + EPS, "{x},{y}");
                step += 1;
                y += 0.37;
            }
            x += 0.23;
        }
    }
}
