use std::path::PathBuf;

use crate::{
    animation::ease::Ease,
    foundation::core::{KeyRegion, Rect, TimeMs},
};

/// Visual transition kinds selectable per window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Dim to a partial floor, swap, rise back.
    #[default]
    Fade,
    /// Quick full fade (shorter than [`TransitionKind::Fade`]).
    Slide,
    /// Overlay collapses toward the bottom edge, regrows upward from it.
    WipeTop,
    /// Overlay collapses to zero height at the top edge, regrows downward.
    WipeBottom,
    /// Overlay collapses toward the right edge, regrows rightward from the
    /// left edge.
    WipeLeft,
    /// Overlay collapses to zero width at the left edge, regrows leftward
    /// from the right edge.
    WipeRight,
}

impl TransitionKind {
    fn has_geometry(self) -> bool {
        !matches!(self, Self::Fade | Self::Slide)
    }
}

/// Timing, easing, and opacity floor for one two-phase transition.
///
/// Immutable; selected per window via [`TransitionSpec::for_kind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSpec {
    /// Transition kind.
    pub kind: TransitionKind,
    /// Out-phase duration in milliseconds.
    pub out_ms: u64,
    /// In-phase duration in milliseconds.
    pub in_ms: u64,
    /// Easing for the out phase.
    pub ease_out: Ease,
    /// Easing for the in phase.
    pub ease_in: Ease,
    /// Opacity reached at the midpoint (0.2 for fade, 0 otherwise).
    pub fade_floor: f64,
}

impl TransitionSpec {
    /// Canonical timing table per kind.
    pub fn for_kind(kind: TransitionKind) -> Self {
        match kind {
            TransitionKind::Fade => Self {
                kind,
                out_ms: 800,
                in_ms: 600,
                ease_out: Ease::InOutQuad,
                ease_in: Ease::InOutQuad,
                fade_floor: 0.2,
            },
            TransitionKind::Slide => Self {
                kind,
                out_ms: 300,
                in_ms: 300,
                ease_out: Ease::InQuad,
                ease_in: Ease::OutQuad,
                fade_floor: 0.0,
            },
            _ => Self {
                kind,
                out_ms: 600,
                in_ms: 600,
                ease_out: Ease::InQuad,
                ease_in: Ease::OutQuad,
                fade_floor: 0.0,
            },
        }
    }
}

/// Event handed back to the driver by [`Transition::advance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionEvent {
    /// The out phase completed: swap to this content now. The in phase has
    /// already begun when this is returned.
    Swap(PathBuf),
    /// The in phase completed; the engine is idle (or has started a queued
    /// transition).
    Finished,
}

/// Presentation state sampled during (or outside) a transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionFrame {
    /// Overlay layer opacity in `[0, 1]`.
    pub opacity: f64,
    /// Overlay layer placement rect in window coordinates.
    pub rect: Rect,
}

#[derive(Clone, Debug)]
enum Phase {
    Idle,
    OutRunning { started: TimeMs, target: PathBuf },
    InRunning { started: TimeMs },
}

/// Two-phase transition state machine: `Idle -> OutRunning -> (swap) ->
/// InRunning -> Idle`.
///
/// The engine holds no callbacks; the host event loop calls
/// [`Transition::advance`] with the current time and acts on the returned
/// events, then presents whatever [`Transition::sample`] reports. The
/// content swap is therefore guaranteed to happen exactly once, strictly
/// between the phases, on the caller's thread.
///
/// Starting a transition while one is running parks the request in a single
/// queue slot; the newest request replaces any queued one and begins as soon
/// as the running transition finishes.
#[derive(Debug)]
pub struct Transition {
    spec: TransitionSpec,
    region: KeyRegion,
    phase: Phase,
    queued: Option<PathBuf>,
}

impl Transition {
    /// Engine for one window, with the window's fixed spec and current key
    /// region.
    pub fn new(spec: TransitionSpec, region: KeyRegion) -> Self {
        Self {
            spec,
            region,
            phase: Phase::Idle,
            queued: None,
        }
    }

    /// Update the animated region after a window resize.
    pub fn set_region(&mut self, region: KeyRegion) {
        self.region = region;
    }

    /// Whether no transition is running or queued.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle) && self.queued.is_none()
    }

    /// Begin (or queue) a transition that swaps to `target` at its midpoint.
    pub fn start(&mut self, target: PathBuf, now: TimeMs) {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::OutRunning {
                    started: now,
                    target,
                };
            }
            _ => self.queued = Some(target),
        }
    }

    /// Drop any running or queued transition and return to idle.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.queued = None;
    }

    /// Advance the state machine to `now`.
    ///
    /// Returns at most one event per call; callers loop until `None` so a
    /// late tick can still deliver the swap and the completion in order.
    pub fn advance(&mut self, now: TimeMs) -> Option<TransitionEvent> {
        match &self.phase {
            Phase::Idle => {
                let target = self.queued.take()?;
                self.phase = Phase::OutRunning {
                    started: now,
                    target,
                };
                None
            }
            Phase::OutRunning { started, target } => {
                if now.saturating_since(*started) < self.spec.out_ms {
                    return None;
                }
                let target = target.clone();
                self.phase = Phase::InRunning { started: now };
                Some(TransitionEvent::Swap(target))
            }
            Phase::InRunning { started } => {
                if now.saturating_since(*started) < self.spec.in_ms {
                    return None;
                }
                self.phase = match self.queued.take() {
                    Some(target) => Phase::OutRunning {
                        started: now,
                        target,
                    },
                    None => Phase::Idle,
                };
                Some(TransitionEvent::Finished)
            }
        }
    }

    /// Opacity and overlay rect to present at `now`.
    pub fn sample(&self, now: TimeMs) -> TransitionFrame {
        let full = self.region.to_rect();
        match &self.phase {
            Phase::Idle => TransitionFrame {
                opacity: 1.0,
                rect: full,
            },
            Phase::OutRunning { started, .. } => {
                let t = progress(now, *started, self.spec.out_ms);
                let e = self.spec.ease_out.apply(t);
                TransitionFrame {
                    opacity: 1.0 + (self.spec.fade_floor - 1.0) * e,
                    rect: self.geometry(full, e, true),
                }
            }
            Phase::InRunning { started } => {
                let t = progress(now, *started, self.spec.in_ms);
                let e = self.spec.ease_in.apply(t);
                TransitionFrame {
                    opacity: self.spec.fade_floor + (1.0 - self.spec.fade_floor) * e,
                    rect: self.geometry(full, 1.0 - e, false),
                }
            }
        }
    }

    /// Overlay rect at eased collapse factor `c` (0 = full, 1 = collapsed).
    ///
    /// The out phase collapses toward one edge; the in phase grows back from
    /// the opposite edge, per kind.
    fn geometry(&self, full: Rect, c: f64, out_phase: bool) -> Rect {
        if !self.spec.kind.has_geometry() {
            return full;
        }
        let collapsed = match self.spec.kind {
            TransitionKind::WipeTop => Rect::new(full.x0, full.y1, full.x1, full.y1),
            TransitionKind::WipeBottom => Rect::new(full.x0, full.y0, full.x1, full.y0),
            // horizontal wipes collapse onto one edge and regrow from the other
            TransitionKind::WipeLeft if out_phase => Rect::new(full.x1, full.y0, full.x1, full.y1),
            TransitionKind::WipeLeft => Rect::new(full.x0, full.y0, full.x0, full.y1),
            TransitionKind::WipeRight if out_phase => Rect::new(full.x0, full.y0, full.x0, full.y1),
            TransitionKind::WipeRight => Rect::new(full.x1, full.y0, full.x1, full.y1),
            TransitionKind::Fade | TransitionKind::Slide => full,
        };
        lerp_rect(full, collapsed, c)
    }
}

fn progress(now: TimeMs, started: TimeMs, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 1.0;
    }
    (now.saturating_since(started) as f64 / duration_ms as f64).min(1.0)
}

fn lerp_rect(a: Rect, b: Rect, t: f64) -> Rect {
    let l = |a: f64, b: f64| a + (b - a) * t;
    Rect::new(l(a.x0, b.x0), l(a.y0, b.y0), l(a.x1, b.x1), l(a.y1, b.y1))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/transition.rs"]
mod tests;
