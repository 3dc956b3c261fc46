//! Engine-independent core of the pet presentation layer.
//!
//! Everything here is plain data and state machines: colors and material
//! slots, the accessory catalog and mount, gaze smoothing, the gesture
//! sequencer and the presentation clock. The Bevy client drives these from
//! its systems; recorders and tests drive them directly.

pub mod accessory;
pub mod clock;
pub mod color;
pub mod gaze;
pub mod sequencer;
pub mod slots;

pub use accessory::{
    render_scale, AccessoryKind, AccessoryMount, AccessoryPlacement, AccessoryRequest,
    AttachOutcome, MountState,
};
pub use clock::{PresentationClock, ProgressClock, WallClock};
pub use color::{ParseRgbError, Rgb};
pub use gaze::{GazeController, GazeTuning};
pub use sequencer::{
    resolve_playlist, ClipPicker, ClipPose, ClipSpec, LoopPolicy, SequencedClip, Sequencer,
    SequencerTiming, Transition,
};
pub use slots::{ColorOverrides, MaterialSlot, NodeSlot};
