//! Drag gesture coordination
//!
//! One drag is an explicit `start → update* → release` session. While it is
//! live the coordinator computes where the sheet should be for every sample;
//! the controller writes that straight to the offset channel. On release a
//! pure decision function picks what happens next.
//!
//! Release rules, first match wins:
//!
//! 1. swipe-to-dismiss enabled and the release is either faster than
//!    [`DISMISS_VELOCITY`] downward or far enough below the most collapsed
//!    snap point → dismiss
//! 2. faster than [`FLING_VELOCITY`] upward → one snap point up
//! 3. faster than [`FLING_VELOCITY`] downward → one snap point down, or
//!    dismiss when already at the lowest one
//! 4. otherwise → the nearest snap point, ties going to the lower index

use serde::{Deserialize, Serialize};
use slide_core::snap::nearest_index;

/// Release speed (px/ms, downward) that always dismisses
pub const DISMISS_VELOCITY: f32 = 0.8;

/// Release speed (px/ms) that moves one snap point in the fling direction
pub const FLING_VELOCITY: f32 = 0.5;

/// Fraction of the collapsed sheet's visible height it must be dragged below
/// its lowest snap point to dismiss on release
pub const DISMISS_DISTANCE_RATIO: f32 = 0.3;

/// One drag sample, relative to where the gesture started
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureSample {
    /// Total vertical travel since the drag began (px, positive = down)
    pub cumulative_dy: f32,
    /// Current vertical velocity (px/ms, positive = down)
    pub velocity_y: f32,
}

impl GestureSample {
    pub fn new(cumulative_dy: f32, velocity_y: f32) -> Self {
        Self {
            cumulative_dy,
            velocity_y,
        }
    }
}

/// What the sheet should do after a drag is released
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReleaseDecision {
    Dismiss,
    SnapTo { index: usize },
}

/// Geometry and policy a drag is evaluated against
#[derive(Clone, Copy, Debug)]
pub struct GestureContext<'a> {
    /// Offset of every snap point by index (index 0 = largest offset)
    pub snap_offsets: &'a [f32],
    pub container_extent: f32,
    pub swipe_to_dismiss: bool,
}

impl GestureContext<'_> {
    fn most_expanded_offset(&self) -> f32 {
        self.snap_offsets
            .last()
            .copied()
            .unwrap_or(self.container_extent)
    }

    fn most_collapsed_offset(&self) -> f32 {
        self.snap_offsets
            .first()
            .copied()
            .unwrap_or(self.container_extent)
    }

    fn last_index(&self) -> usize {
        self.snap_offsets.len().saturating_sub(1)
    }

    /// Keep a dragged offset between full expansion and the container's bottom
    pub fn clamp_offset(&self, offset: f32) -> f32 {
        offset.clamp(self.most_expanded_offset(), self.container_extent)
    }

    /// Distance below the lowest snap point past which a release dismisses
    pub fn dismiss_distance(&self) -> f32 {
        (self.container_extent - self.most_collapsed_offset()) * DISMISS_DISTANCE_RATIO
    }
}

/// Decide what a release at `final_offset` with `velocity_y` leads to
pub fn decide_release(
    final_offset: f32,
    velocity_y: f32,
    current_index: usize,
    ctx: &GestureContext<'_>,
) -> ReleaseDecision {
    let last = ctx.last_index();
    let current_index = current_index.min(last);

    if ctx.swipe_to_dismiss {
        let dragged_past = final_offset - ctx.most_collapsed_offset() > ctx.dismiss_distance();
        if velocity_y > DISMISS_VELOCITY || dragged_past {
            return ReleaseDecision::Dismiss;
        }
    }

    if velocity_y < -FLING_VELOCITY {
        return ReleaseDecision::SnapTo {
            index: (current_index + 1).min(last),
        };
    }

    if velocity_y > FLING_VELOCITY {
        if current_index == 0 && ctx.swipe_to_dismiss {
            return ReleaseDecision::Dismiss;
        }
        return ReleaseDecision::SnapTo {
            index: current_index.saturating_sub(1),
        };
    }

    ReleaseDecision::SnapTo {
        index: nearest_index(ctx.snap_offsets, final_offset),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragSession {
    start_offset: f32,
    start_index: usize,
    last_offset: f32,
}

/// Tracks a single drag from start to release
#[derive(Clone, Debug, Default)]
pub struct GestureCoordinator {
    session: Option<DragSession>,
}

impl GestureCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Begin a drag with the sheet at `start_offset`, resting on `start_index`
    pub fn start(&mut self, start_offset: f32, start_index: usize) {
        tracing::debug!(start_offset, start_index, "drag started");
        self.session = Some(DragSession {
            start_offset,
            start_index,
            last_offset: start_offset,
        });
    }

    /// Offset the sheet should take for `sample`, or `None` outside a drag
    pub fn update(&mut self, sample: GestureSample, ctx: &GestureContext<'_>) -> Option<f32> {
        let session = self.session.as_mut()?;
        let offset = ctx.clamp_offset(session.start_offset + sample.cumulative_dy);
        session.last_offset = offset;
        tracing::trace!(dy = sample.cumulative_dy, offset, "drag update");
        Some(offset)
    }

    /// Offset of the most recent sample
    pub fn current_offset(&self) -> Option<f32> {
        self.session.map(|session| session.last_offset)
    }

    /// End the drag and decide where the sheet goes.
    ///
    /// Returns the final (clamped) offset with the decision, or `None` when no
    /// drag was in progress.
    pub fn release(
        &mut self,
        sample: GestureSample,
        ctx: &GestureContext<'_>,
    ) -> Option<(f32, ReleaseDecision)> {
        let session = self.session.take()?;
        let final_offset = ctx.clamp_offset(session.start_offset + sample.cumulative_dy);
        let decision = decide_release(final_offset, sample.velocity_y, session.start_index, ctx);
        tracing::debug!(
            final_offset,
            velocity = sample.velocity_y,
            ?decision,
            "drag released"
        );
        Some((final_offset, decision))
    }

    /// Abandon the drag without a decision
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("drag cancelled");
        }
    }
}
