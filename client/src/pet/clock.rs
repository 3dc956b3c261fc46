use bevy::prelude::*;
use pet_common::{PresentationClock, ProgressClock, WallClock};

/// The one time source shared by sequencing, spinning and gaze.
///
/// A paused clock neither advances nor reports a delta.
#[derive(Resource)]
pub struct ActivePresentationClock {
    clock: Box<dyn PresentationClock>,
    paused: bool,
}

impl ActivePresentationClock {
    pub fn new(clock: impl PresentationClock) -> Self {
        Self {
            clock: Box::new(clock),
            paused: false,
        }
    }

    pub fn wall() -> Self {
        Self::new(WallClock::new())
    }

    pub fn progress(total_frames: u64, span_secs: f32) -> Self {
        Self::new(ProgressClock::new(total_frames, span_secs))
    }

    /// Start held; nothing moves until [`Self::resume`].
    pub fn paused(mut self) -> Self {
        self.paused = true;
        self
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn now_secs(&self) -> f32 {
        self.clock.now_secs()
    }

    pub fn delta_secs(&self) -> f32 {
        if self.paused {
            0.0
        } else {
            self.clock.delta_secs()
        }
    }

    pub fn progress_fraction(&self) -> Option<f32> {
        self.clock.progress()
    }

    pub fn advance(&mut self, frame_delta_secs: f32) {
        if !self.paused {
            self.clock.advance(frame_delta_secs);
        }
    }
}

impl Default for ActivePresentationClock {
    fn default() -> Self {
        Self::wall()
    }
}

pub fn advance_presentation_clock(time: Res<Time>, mut clock: ResMut<ActivePresentationClock>) {
    clock.advance(time.delta_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_clock_holds_until_resumed() {
        let mut clock = ActivePresentationClock::progress(4, 2.0).paused();
        clock.advance(0.016);
        assert_eq!(clock.now_secs(), 0.0);
        assert_eq!(clock.delta_secs(), 0.0);

        clock.resume();
        clock.advance(0.016);
        assert!((clock.now_secs() - 0.5).abs() < 1e-6);
        assert!((clock.delta_secs() - 0.5).abs() < 1e-6);
        assert_eq!(clock.progress_fraction(), Some(0.25));
    }
}
