//! Time sources for the presentation layer.
//!
//! Interactive views advance with the wall-clock frame delta, offline exports
//! advance by a fixed step per rendered frame so every run produces the same
//! frames. Consumers only see [`PresentationClock`].

/// A monotonic presentation time source.
pub trait PresentationClock: Send + Sync + 'static {
    /// Advance by one rendered frame. `frame_delta_secs` is the wall-clock
    /// delta of that frame; deterministic clocks ignore it.
    fn advance(&mut self, frame_delta_secs: f32);

    /// Seconds since the clock started.
    fn now_secs(&self) -> f32;

    /// Seconds elapsed during the last `advance`.
    fn delta_secs(&self) -> f32;

    /// Fraction of a bounded run that has elapsed, if the clock is bounded.
    fn progress(&self) -> Option<f32> {
        None
    }
}

/// Clock driven by the real frame delta.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WallClock {
    elapsed: f32,
    delta: f32,
}

impl WallClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationClock for WallClock {
    fn advance(&mut self, frame_delta_secs: f32) {
        let delta = if frame_delta_secs.is_finite() {
            frame_delta_secs.max(0.0)
        } else {
            0.0
        };
        self.delta = delta;
        self.elapsed += delta;
    }

    fn now_secs(&self) -> f32 {
        self.elapsed
    }

    fn delta_secs(&self) -> f32 {
        self.delta
    }
}

/// Clock that maps a frame counter onto a fixed span of presentation time.
///
/// Frame `n` of `total_frames` sits at `n / total_frames * span_secs`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressClock {
    frame: u64,
    total_frames: u64,
    span_secs: f32,
    delta: f32,
}

impl ProgressClock {
    pub fn new(total_frames: u64, span_secs: f32) -> Self {
        Self {
            frame: 0,
            total_frames: total_frames.max(1),
            span_secs: span_secs.max(0.0),
            delta: 0.0,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.total_frames
    }

    fn time_at(&self, frame: u64) -> f32 {
        (frame as f64 / self.total_frames as f64 * self.span_secs as f64) as f32
    }
}

impl PresentationClock for ProgressClock {
    fn advance(&mut self, _frame_delta_secs: f32) {
        if self.is_finished() {
            self.delta = 0.0;
            return;
        }
        let before = self.time_at(self.frame);
        self.frame += 1;
        self.delta = self.time_at(self.frame) - before;
    }

    fn now_secs(&self) -> f32 {
        self.time_at(self.frame)
    }

    fn delta_secs(&self) -> f32 {
        self.delta
    }

    fn progress(&self) -> Option<f32> {
        Some(self.frame as f32 / self.total_frames as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_accumulates_deltas() {
        let mut clock = WallClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert!((clock.now_secs() - 0.75).abs() < 1e-6);
        assert!((clock.delta_secs() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_wall_clock_ignores_bad_deltas() {
        let mut clock = WallClock::new();
        clock.advance(f32::NAN);
        clock.advance(-1.0);
        assert_eq!(clock.now_secs(), 0.0);
        assert_eq!(clock.delta_secs(), 0.0);
    }

    #[test]
    fn test_progress_clock_ignores_wall_time() {
        let mut a = ProgressClock::new(100, 10.0);
        let mut b = ProgressClock::new(100, 10.0);
        for i in 0..40 {
            a.advance(0.016);
            b.advance(i as f32 * 3.0);
        }
        assert_eq!(a.now_secs(), b.now_secs());
        assert!((a.now_secs() - 4.0).abs() < 1e-5);
        assert!((a.delta_secs() - 0.1).abs() < 1e-5);
        assert_eq!(a.progress(), Some(0.4));
    }

    #[test]
    fn test_progress_clock_stops_at_end() {
        let mut clock = ProgressClock::new(3, 1.5);
        for _ in 0..10 {
            clock.advance(1.0);
        }
        assert!(clock.is_finished());
        assert_eq!(clock.frame(), 3);
        assert!((clock.now_secs() - 1.5).abs() < 1e-6);
        assert_eq!(clock.delta_secs(), 0.0);
    }
}
