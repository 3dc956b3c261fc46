//! Gesture sequencing for idle pets.
//!
//! A [`Sequencer`] keeps one clip current, crossfades to a randomly chosen
//! different clip whenever its deadline passes, and reports per-clip weights
//! and local times for the renderer to apply. Time is whatever the caller's
//! presentation clock says, so the same state machine serves live views and
//! frame-exact exports.

/// How a clip behaves once it reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPolicy {
    /// Play once and hold the last frame.
    OneShotClamped,
    /// Alternate forward and backward for `passes` passes, then hold.
    PingPong { passes: u32 },
    /// Loop until replaced.
    ContinuousRepeat,
}

impl LoopPolicy {
    /// Local clip time after `elapsed` seconds of playback.
    pub fn local_time(self, elapsed: f32, duration: f32) -> f32 {
        if !duration.is_finite() || duration <= 0.0 || !elapsed.is_finite() {
            return 0.0;
        }
        let elapsed = elapsed.max(0.0);

        match self {
            LoopPolicy::OneShotClamped => elapsed.min(duration),
            LoopPolicy::ContinuousRepeat => elapsed.rem_euclid(duration),
            LoopPolicy::PingPong { passes } => {
                let passes = passes.max(1);
                let pass = (elapsed / duration).floor();
                if pass >= passes as f32 {
                    return if passes % 2 == 1 { duration } else { 0.0 };
                }
                let within = (elapsed - pass * duration).clamp(0.0, duration);
                if (pass as u32) % 2 == 0 {
                    within
                } else {
                    duration - within
                }
            }
        }
    }
}

/// A playlist entry as configured.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSpec {
    pub name: String,
    pub policy: LoopPolicy,
}

impl ClipSpec {
    pub fn new(name: impl Into<String>, policy: LoopPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
        }
    }
}

/// A playlist entry matched to clip data.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedClip {
    pub name: String,
    pub policy: LoopPolicy,
    pub duration: f32,
}

/// Match configured clips against the clips a template actually has.
///
/// Returns the playable clips in playlist order and the names that were
/// missing.
pub fn resolve_playlist<F>(specs: &[ClipSpec], duration_of: F) -> (Vec<SequencedClip>, Vec<String>)
where
    F: Fn(&str) -> Option<f32>,
{
    let mut clips = Vec::with_capacity(specs.len());
    let mut missing = Vec::new();
    for spec in specs {
        if clips.iter().any(|clip: &SequencedClip| clip.name == spec.name) {
            continue;
        }
        match duration_of(&spec.name) {
            Some(duration) if duration.is_finite() && duration >= 0.0 => clips.push(SequencedClip {
                name: spec.name.clone(),
                policy: spec.policy,
                duration,
            }),
            _ => missing.push(spec.name.clone()),
        }
    }
    (clips, missing)
}

/// Fixed timing constants of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerTiming {
    /// Fade-in and fade-out length of a transition.
    pub crossfade_secs: f32,
    /// Slack added to every deadline so the clip settles before switching.
    pub settle_secs: f32,
    /// Upper bound for the random cycle count of repeating clips.
    pub max_repeat_cycles: u32,
}

impl Default for SequencerTiming {
    fn default() -> Self {
        Self {
            crossfade_secs: 0.25,
            settle_secs: 1.0,
            max_repeat_cycles: 3,
        }
    }
}

/// Source of the sequencer's random choices.
pub trait ClipPicker {
    /// Uniform index in `0..len`. `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Uniform cycle count in `1..=max`. `max` is at least one.
    fn pick_cycles(&mut self, max: u32) -> u32;
}

/// Weight and local time of one clip for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPose {
    /// Index into [`Sequencer::clips`].
    pub clip: usize,
    pub local_time: f32,
    pub weight: f32,
}

/// A clip change performed by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: Option<usize>,
    pub to: usize,
    /// When the next change is due, if one is scheduled.
    pub deadline: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Playing {
    clip: usize,
    started_at: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fading {
    clip: usize,
    started_at: f32,
    fade_started_at: f32,
    from_weight: f32,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    clips: Vec<SequencedClip>,
    default_clip: usize,
    timing: SequencerTiming,
    current: Option<Playing>,
    fading: Vec<Fading>,
    deadline: Option<f32>,
    torn_down: bool,
}

impl Sequencer {
    /// `None` when there is nothing to play.
    pub fn new(clips: Vec<SequencedClip>, default_clip: &str, timing: SequencerTiming) -> Option<Self> {
        if clips.is_empty() {
            return None;
        }
        let default_clip = clips
            .iter()
            .position(|clip| clip.name == default_clip)
            .unwrap_or(0);
        Some(Self {
            clips,
            default_clip,
            timing: SequencerTiming {
                crossfade_secs: timing.crossfade_secs.max(0.0),
                settle_secs: timing.settle_secs.max(0.0),
                max_repeat_cycles: timing.max_repeat_cycles.max(1),
            },
            current: None,
            fading: Vec::new(),
            deadline: None,
            torn_down: false,
        })
    }

    pub fn clips(&self) -> &[SequencedClip] {
        &self.clips
    }

    pub fn timing(&self) -> SequencerTiming {
        self.timing
    }

    pub fn current_clip(&self) -> Option<&SequencedClip> {
        self.current.map(|playing| &self.clips[playing.clip])
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current.map(|playing| playing.clip)
    }

    pub fn deadline(&self) -> Option<f32> {
        self.deadline
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Whether an outgoing clip still has influence at `now`.
    pub fn is_crossfading(&self, now: f32) -> bool {
        self.fading
            .iter()
            .any(|fade| self.fade_out_weight(fade, now) > 0.0)
    }

    /// Start the default clip.
    pub fn start(&mut self, now: f32, picker: &mut dyn ClipPicker) -> Option<Transition> {
        self.play_index(self.default_clip, now, picker, true)
    }

    /// Play `name` continuously with no scheduled change.
    pub fn pin(&mut self, name: &str, now: f32, picker: &mut dyn ClipPicker) -> Option<Transition> {
        let index = self.clips.iter().position(|clip| clip.name == name)?;
        self.play_index(index, now, picker, false)
    }

    /// Advance to `now`. Switches clip when the deadline has passed.
    pub fn tick(&mut self, now: f32, picker: &mut dyn ClipPicker) -> Option<Transition> {
        if self.torn_down {
            return None;
        }
        self.prune_fades(now);

        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }

        let current = self.current_index();
        let candidates: Vec<usize> = (0..self.clips.len())
            .filter(|&index| Some(index) != current)
            .collect();
        let next = if candidates.is_empty() {
            current.unwrap_or(self.default_clip)
        } else {
            let pick = picker.pick_index(candidates.len()).min(candidates.len() - 1);
            candidates[pick]
        };
        self.play_index(next, now, picker, true)
    }

    /// Weights and local times for every clip with influence at `now`.
    pub fn pose(&self, now: f32) -> Vec<ClipPose> {
        if self.torn_down {
            return Vec::new();
        }

        let mut poses = Vec::with_capacity(1 + self.fading.len());
        for fade in &self.fading {
            let weight = self.fade_out_weight(fade, now);
            if weight <= 0.0 {
                continue;
            }
            let clip = &self.clips[fade.clip];
            poses.push(ClipPose {
                clip: fade.clip,
                local_time: clip.policy.local_time(now - fade.started_at, clip.duration),
                weight,
            });
        }
        if let Some(playing) = self.current {
            let clip = &self.clips[playing.clip];
            poses.push(ClipPose {
                clip: playing.clip,
                local_time: clip.policy.local_time(now - playing.started_at, clip.duration),
                weight: self.fade_in_weight(playing, now),
            });
        }
        poses
    }

    /// Cancel the pending change and drop every clip's influence.
    ///
    /// Returns `true` only on the first call.
    pub fn teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;
        self.deadline = None;
        self.current = None;
        self.fading.clear();
        true
    }

    fn play_index(
        &mut self,
        index: usize,
        now: f32,
        picker: &mut dyn ClipPicker,
        schedule_next: bool,
    ) -> Option<Transition> {
        if self.torn_down || index >= self.clips.len() {
            return None;
        }

        self.fading.retain(|fade| fade.clip != index);
        let previous = self.current.take();
        if let Some(previous) = previous {
            if previous.clip != index {
                let from_weight = self.fade_in_weight(previous, now);
                self.fading.push(Fading {
                    clip: previous.clip,
                    started_at: previous.started_at,
                    fade_started_at: now,
                    from_weight,
                });
            }
        }

        self.current = Some(Playing {
            clip: index,
            started_at: now,
        });

        self.deadline = if schedule_next {
            let clip = &self.clips[index];
            let cycles = match clip.policy {
                LoopPolicy::ContinuousRepeat => picker
                    .pick_cycles(self.timing.max_repeat_cycles)
                    .clamp(1, self.timing.max_repeat_cycles),
                LoopPolicy::OneShotClamped | LoopPolicy::PingPong { .. } => 1,
            };
            Some(now + clip.duration * cycles as f32 + self.timing.settle_secs)
        } else {
            None
        };

        Some(Transition {
            from: previous.map(|playing| playing.clip),
            to: index,
            deadline: self.deadline,
        })
    }

    fn prune_fades(&mut self, now: f32) {
        let crossfade = self.timing.crossfade_secs;
        self.fading
            .retain(|fade| crossfade > 0.0 && now - fade.fade_started_at < crossfade);
    }

    fn fade_in_weight(&self, playing: Playing, now: f32) -> f32 {
        let crossfade = self.timing.crossfade_secs;
        if crossfade <= 0.0 {
            return 1.0;
        }
        ((now - playing.started_at) / crossfade).clamp(0.0, 1.0)
    }

    fn fade_out_weight(&self, fade: &Fading, now: f32) -> f32 {
        let crossfade = self.timing.crossfade_secs;
        if crossfade <= 0.0 {
            return 0.0;
        }
        let t = ((now - fade.fade_started_at) / crossfade).clamp(0.0, 1.0);
        fade.from_weight * (1.0 - t)
    }
}
