//! Accessory catalog, placement math and the per-pet mount state machine.

use crate::color::Rgb;

/// Smallest value of the size slider.
pub const SIZE_PARAMETER_MIN: f32 = 0.5;
/// Largest value of the size slider.
pub const SIZE_PARAMETER_MAX: f32 = 1.1;
/// Size used when a record carries no usable value.
pub const SIZE_PARAMETER_FALLBACK: f32 = 1.0;
/// Render scale at [`SIZE_PARAMETER_MIN`].
pub const RENDER_SCALE_MIN: f32 = 0.5;
/// Render scale at [`SIZE_PARAMETER_MAX`].
pub const RENDER_SCALE_MAX: f32 = 0.8;

const BASE_HEIGHT: f32 = 0.35;
const HEIGHT_DROP_PER_SCALE: f32 = 0.15;
const FORWARD_OFFSET: f32 = -0.75;
const SEAT_PITCH: f32 = -1.0;

/// Wearable head accessories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessoryKind {
    PartyHat,
    WizardHat,
    SpinnerHat,
}

impl AccessoryKind {
    pub const ALL: [AccessoryKind; 3] = [
        AccessoryKind::PartyHat,
        AccessoryKind::WizardHat,
        AccessoryKind::SpinnerHat,
    ];

    /// Identifier stored in pet records.
    pub fn id(self) -> &'static str {
        match self {
            AccessoryKind::PartyHat => "partyhat",
            AccessoryKind::WizardHat => "wizhat",
            AccessoryKind::SpinnerHat => "spinhat",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AccessoryKind::PartyHat => "Party Hat",
            AccessoryKind::WizardHat => "Wizard Hat",
            AccessoryKind::SpinnerHat => "Spinner Hat",
        }
    }

    /// Model path relative to the asset root.
    pub fn model_path(self) -> &'static str {
        match self {
            AccessoryKind::PartyHat => "models/partyhattex.glb",
            AccessoryKind::WizardHat => "models/wizhattex.glb",
            AccessoryKind::SpinnerHat => "models/spinhattex.glb",
        }
    }

    pub fn level_required(self) -> u32 {
        match self {
            AccessoryKind::PartyHat => 1,
            AccessoryKind::WizardHat => 2,
            AccessoryKind::SpinnerHat => 3,
        }
    }

    pub fn is_unlocked_at(self, level: u32) -> bool {
        self.level_required() <= level.max(1)
    }

    /// Accessories a pet of `level` may wear.
    pub fn unlocked_for(level: u32) -> Vec<AccessoryKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| kind.is_unlocked_at(level))
            .collect()
    }
}

/// What the UI (or a pet record) asks to be worn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessoryRequest {
    pub kind: Option<AccessoryKind>,
    /// Size slider value, nominally in `[0.5, 1.1]`.
    pub size: f32,
    pub primary: Option<Rgb>,
    pub secondary: Option<Rgb>,
}

impl Default for AccessoryRequest {
    fn default() -> Self {
        Self {
            kind: None,
            size: 0.8,
            primary: Some(Rgb::new(0x00, 0x8E, 0xFF)),
            secondary: Some(Rgb::new(0xFF, 0xFF, 0x00)),
        }
    }
}

impl AccessoryRequest {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn wearing(kind: AccessoryKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn placement(&self) -> AccessoryPlacement {
        AccessoryPlacement::for_size(self.size)
    }
}

/// Local transform of an accessory relative to the attachment bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessoryPlacement {
    /// Uniform scale.
    pub scale: f32,
    pub translation: [f32; 3],
    /// Rotation about the lateral (x) axis in radians.
    pub pitch: f32,
}

impl AccessoryPlacement {
    pub fn for_size(size: f32) -> Self {
        let scale = render_scale(size);
        Self {
            scale,
            translation: [
                0.0,
                BASE_HEIGHT - (scale - RENDER_SCALE_MIN) * HEIGHT_DROP_PER_SCALE,
                FORWARD_OFFSET,
            ],
            pitch: SEAT_PITCH,
        }
    }
}

/// Remap the size slider onto the render scale, clamping out-of-range input.
pub fn render_scale(size: f32) -> f32 {
    let size = if size.is_finite() {
        size
    } else {
        SIZE_PARAMETER_FALLBACK
    };
    let t = ((size - SIZE_PARAMETER_MIN) / (SIZE_PARAMETER_MAX - SIZE_PARAMETER_MIN)).clamp(0.0, 1.0);
    RENDER_SCALE_MIN + t * (RENDER_SCALE_MAX - RENDER_SCALE_MIN)
}

/// Result of trying to instantiate an accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome<H> {
    Attached(H),
    /// The accessory's template is still loading; retry later.
    Deferred,
    /// Nothing to attach to (e.g. no head bone). Not retried until the
    /// request changes.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState<H> {
    Detached,
    Attached(H),
}

/// Owns at most one live accessory instance `H`.
#[derive(Debug, Clone)]
pub struct AccessoryMount<H> {
    state: MountState<H>,
    applied: Option<AccessoryRequest>,
}

impl<H> Default for AccessoryMount<H> {
    fn default() -> Self {
        Self {
            state: MountState::Detached,
            applied: None,
        }
    }
}

impl<H: Copy> AccessoryMount<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MountState<H> {
        self.state
    }

    pub fn attached(&self) -> Option<H> {
        match self.state {
            MountState::Attached(handle) => Some(handle),
            MountState::Detached => None,
        }
    }

    /// Last request that was fully handled.
    pub fn applied(&self) -> Option<&AccessoryRequest> {
        self.applied.as_ref()
    }

    pub fn needs_update(&self, request: &AccessoryRequest) -> bool {
        self.applied.as_ref() != Some(request)
    }

    /// Bring the mount in line with `request`.
    ///
    /// Any attached instance goes through `release` before `attach` is asked
    /// for a replacement. `attach` is only called when the request names an
    /// accessory. Returns `true` when something was attached or released.
    pub fn apply<R, A>(&mut self, request: &AccessoryRequest, release: R, attach: A) -> bool
    where
        R: FnOnce(H),
        A: FnOnce(AccessoryKind, AccessoryPlacement) -> AttachOutcome<H>,
    {
        if !self.needs_update(request) {
            return false;
        }

        let mut changed = false;
        if let MountState::Attached(handle) = std::mem::replace(&mut self.state, MountState::Detached) {
            release(handle);
            changed = true;
        }

        let Some(kind) = request.kind else {
            self.applied = Some(*request);
            return changed;
        };

        match attach(kind, request.placement()) {
            AttachOutcome::Attached(handle) => {
                self.state = MountState::Attached(handle);
                self.applied = Some(*request);
                true
            }
            AttachOutcome::Deferred => {
                self.applied = None;
                changed
            }
            AttachOutcome::Unavailable => {
                self.applied = Some(*request);
                changed
            }
        }
    }

    /// Release whatever is attached and forget the applied request.
    pub fn release_all<R: FnOnce(H)>(&mut self, release: R) {
        if let MountState::Attached(handle) = std::mem::replace(&mut self.state, MountState::Detached) {
            release(handle);
        }
        self.applied = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_scale_remap_bounds() {
        assert!((render_scale(0.5) - 0.5).abs() < EPS);
        assert!((render_scale(1.1) - 0.8).abs() < EPS);
        assert!((render_scale(-3.0) - 0.5).abs() < EPS);
        assert!((render_scale(42.0) - 0.8).abs() < EPS);
        assert!((render_scale(f32::NAN) - render_scale(1.0)).abs() < EPS);
    }

    #[test]
    fn test_scale_remap_is_monotonic() {
        let mut previous = render_scale(0.0);
        for step in 1..=200 {
            let scale = render_scale(step as f32 * 0.01);
            assert!(scale >= previous);
            previous = scale;
        }
    }

    #[test]
    fn test_wizard_hat_placement() {
        let request = AccessoryRequest {
            kind: AccessoryKind::from_id("wizhat"),
            size: 0.8,
            primary: Rgb::from_hex("#008EFF").ok(),
            secondary: Rgb::from_hex("#ffff00").ok(),
        };
        let placement = request.placement();
        assert!((placement.scale - 0.65).abs() < EPS);
        assert_eq!(placement.translation[0], 0.0);
        assert!((placement.translation[1] - 0.3275).abs() < EPS);
        assert!((placement.translation[2] - -0.75).abs() < EPS);
        assert_eq!(placement.pitch, -1.0);
    }

    #[test]
    fn test_catalog_levels() {
        assert_eq!(AccessoryKind::unlocked_for(1), vec![AccessoryKind::PartyHat]);
        assert_eq!(AccessoryKind::unlocked_for(0), vec![AccessoryKind::PartyHat]);
        assert_eq!(AccessoryKind::unlocked_for(5).len(), 3);
        assert_eq!(AccessoryKind::from_id("crown"), None);
    }

    #[test]
    fn test_mount_never_holds_two_instances() {
        let live: RefCell<BTreeSet<u32>> = RefCell::new(BTreeSet::new());
        let mut next_id = 0u32;
        let mut mount = AccessoryMount::<u32>::new();

        let kinds = [
            None,
            Some(AccessoryKind::PartyHat),
            Some(AccessoryKind::WizardHat),
            Some(AccessoryKind::SpinnerHat),
        ];
        for step in 0..200u32 {
            let request = AccessoryRequest {
                kind: kinds[(step * 7 % 4) as usize],
                size: 0.5 + (step % 7) as f32 * 0.1,
                ..AccessoryRequest::default()
            };
            mount.apply(
                &request,
                |id| {
                    assert!(live.borrow_mut().remove(&id));
                },
                |_, _| {
                    next_id += 1;
                    live.borrow_mut().insert(next_id);
                    AttachOutcome::Attached(next_id)
                },
            );
            assert!(live.borrow().len() <= 1);
            assert_eq!(live.borrow().iter().next().copied(), mount.attached());
        }
    }

    #[test]
    fn test_mount_releases_before_attaching() {
        let order = RefCell::new(Vec::new());
        let mut mount = AccessoryMount::<u32>::new();
        mount.apply(
            &AccessoryRequest::wearing(AccessoryKind::PartyHat),
            |_| unreachable!(),
            |_, _| AttachOutcome::Attached(1),
        );
        mount.apply(
            &AccessoryRequest::wearing(AccessoryKind::WizardHat),
            |id| order.borrow_mut().push(format!("release {id}")),
            |_, _| {
                order.borrow_mut().push("attach".to_string());
                AttachOutcome::Attached(2)
            },
        );
        assert_eq!(*order.borrow(), vec!["release 1", "attach"]);
        assert_eq!(mount.attached(), Some(2));
    }

    #[test]
    fn test_color_change_reattaches() {
        let mut mount = AccessoryMount::<u32>::new();
        let mut request = AccessoryRequest::wearing(AccessoryKind::PartyHat);
        mount.apply(&request, |_| {}, |_, _| AttachOutcome::Attached(1));
        assert!(!mount.needs_update(&request));

        request.primary = Some(Rgb::new(1, 2, 3));
        let mut released = None;
        mount.apply(&request, |id| released = Some(id), |_, _| AttachOutcome::Attached(2));
        assert_eq!(released, Some(1));
        assert_eq!(mount.attached(), Some(2));
    }

    #[test]
    fn test_unavailable_is_not_retried_but_deferred_is() {
        let mut mount = AccessoryMount::<u32>::new();
        let request = AccessoryRequest::wearing(AccessoryKind::PartyHat);

        mount.apply(&request, |_| {}, |_, _| AttachOutcome::Deferred);
        assert!(mount.needs_update(&request));
        assert_eq!(mount.attached(), None);

        mount.apply(&request, |_| {}, |_, _| AttachOutcome::Unavailable);
        assert!(!mount.needs_update(&request));
        assert_eq!(mount.attached(), None);
    }

    #[test]
    fn test_none_request_detaches_without_attach_call() {
        let mut mount = AccessoryMount::<u32>::new();
        mount.apply(
            &AccessoryRequest::wearing(AccessoryKind::SpinnerHat),
            |_| {},
            |_, _| AttachOutcome::Attached(9),
        );
        let mut released = Vec::new();
        mount.apply(
            &AccessoryRequest::none(),
            |id| released.push(id),
            |_, _| unreachable!(),
        );
        assert_eq!(released, vec![9]);
        assert_eq!(mount.state(), MountState::Detached);
    }
}
