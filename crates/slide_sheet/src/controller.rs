//! Bottom sheet controller
//!
//! Owns the sheet's lifecycle state and current snap index, and is the only
//! place that decides who writes the offset and opacity channels:
//!
//! ```text
//! Closed --open--> Opening --settled--> Open[i]
//! Open[i] --drag start--> Dragging --release: snap j--> Open[j]
//!                                  --release: dismiss--> Closing
//! Open|Opening|Dragging --close--> Closing --settled--> Closed
//! ```
//!
//! Transitions settle only inside [`SheetController::tick`]; the host calls it
//! once per frame. With animation disabled every operation settles before it
//! returns.

use crate::config::SheetConfig;
use crate::events::{SheetEvent, SheetEventDispatcher};
use crate::gesture::{GestureContext, GestureCoordinator, GestureSample, ReleaseDecision};
use serde::{Deserialize, Serialize};
use slide_animation::{AnimationDriver, Channel, ChannelValues};
use slide_core::fsm::{StateMachine, Transition};
use slide_core::snap::{clamp_index, SnapPoints};
use slide_core::ConfigError;
use std::time::Duration;

/// Lifecycle of a sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Closed,
    Opening,
    Open,
    Dragging,
    Closing,
}

impl LifecycleState {
    /// `Closed` and `Open` are the only states a sheet rests in
    pub fn is_stable(self) -> bool {
        matches!(self, LifecycleState::Closed | LifecycleState::Open)
    }
}

/// Inputs to the lifecycle state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    OpenRequested,
    CloseRequested,
    SnapRequested,
    DragStarted,
    Released,
    Dismissed,
    Settled,
}

/// What to do when a composite transition settles naturally
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Settle {
    Opened { index: usize },
    Closed,
}

fn lifecycle_machine() -> StateMachine<LifecycleState, LifecycleEvent> {
    use LifecycleEvent::*;
    use LifecycleState::*;

    StateMachine::builder(Closed)
        .on_any(&[Closed, Closing], OpenRequested, Opening)
        .on(Opening, Settled, Open)
        .on_any(&[Opening, Dragging], SnapRequested, Open)
        .on(Open, DragStarted, Dragging)
        .on(Dragging, Released, Open)
        .on(Dragging, Dismissed, Closing)
        .on_any(&[Opening, Open, Dragging], CloseRequested, Closing)
        .on(Closing, Settled, Closed)
        .history_limit(64)
        .build()
}

fn validate_extent(extent: f32) -> Result<(), ConfigError> {
    if extent.is_finite() && extent >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidExtent(extent))
    }
}

/// Headless controller for one bottom sheet
pub struct SheetController {
    snap_points: SnapPoints,
    /// Offsets of `snap_points` for the current extent, by index
    snap_offsets: Vec<f32>,
    initial_snap_index: isize,
    swipe_to_dismiss: bool,
    disable_animation: bool,
    container_extent: f32,
    lifecycle: StateMachine<LifecycleState, LifecycleEvent>,
    current_snap_index: usize,
    channels: ChannelValues,
    driver: AnimationDriver<Settle>,
    gesture: GestureCoordinator,
    events: SheetEventDispatcher,
    /// Last value seen on the external open flag
    open_flag: bool,
}

impl SheetController {
    /// Build a controller for a container `container_extent` pixels tall.
    ///
    /// Fails if the snap points are empty or invalid. When `config.is_open`
    /// is set the sheet starts opening immediately.
    pub fn new(config: SheetConfig, container_extent: f32) -> Result<Self, ConfigError> {
        validate_extent(container_extent)?;
        let snap_points = config.resolve_snap_points()?;
        let snap_offsets = snap_points.offsets(container_extent);

        let mut controller = Self {
            snap_points,
            snap_offsets,
            initial_snap_index: config.initial_snap_index,
            swipe_to_dismiss: config.enable_swipe_to_dismiss,
            disable_animation: config.disable_animation,
            container_extent,
            lifecycle: lifecycle_machine(),
            current_snap_index: 0,
            channels: ChannelValues::hidden(container_extent),
            driver: AnimationDriver::new(config.motion, container_extent),
            gesture: GestureCoordinator::new(),
            events: SheetEventDispatcher::new(),
            open_flag: false,
        };
        controller.set_open(config.is_open);
        Ok(controller)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.current_state()
    }

    pub fn current_snap_index(&self) -> usize {
        self.current_snap_index
    }

    pub fn snap_points(&self) -> &SnapPoints {
        &self.snap_points
    }

    /// Offsets of every snap point for the current extent
    pub fn snap_offsets(&self) -> &[f32] {
        &self.snap_offsets
    }

    pub fn container_extent(&self) -> f32 {
        self.container_extent
    }

    /// Current offset of the sheet's top edge
    pub fn offset(&self) -> f32 {
        self.channels.offset
    }

    pub fn backdrop_opacity(&self) -> f32 {
        self.channels.opacity
    }

    pub fn channel_values(&self) -> ChannelValues {
        self.channels
    }

    /// Whether the sheet should be mounted at all
    pub fn is_rendered(&self) -> bool {
        self.state() != LifecycleState::Closed
    }

    pub fn is_animating(&self) -> bool {
        self.driver.is_animating()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    /// Recent lifecycle transitions, oldest first
    pub fn lifecycle_history(
        &self,
    ) -> impl Iterator<Item = &Transition<LifecycleState, LifecycleEvent>> {
        self.lifecycle.history()
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    pub fn on_event<F>(&mut self, handler: F)
    where
        F: FnMut(&SheetEvent) + Send + 'static,
    {
        self.events.register(handler);
    }

    /// Called once per completed close
    pub fn on_close<F>(&mut self, handler: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.events.on_close(handler);
    }

    /// Called whenever the sheet settles on a different snap point, and once
    /// after every open
    pub fn on_snap_change<F>(&mut self, handler: F)
    where
        F: FnMut(usize) + Send + 'static,
    {
        self.events.on_snap_change(handler);
    }

    // ========================================================================
    // External control
    // ========================================================================

    /// Feed the external open flag. Only edges have an effect.
    pub fn set_open(&mut self, is_open: bool) {
        if is_open == self.open_flag {
            return;
        }
        self.open_flag = is_open;

        if is_open {
            self.open();
        } else if self.is_rendered() {
            self.close();
        }
    }

    /// Open to the initial snap point. No-op unless closed or closing.
    pub fn open(&mut self) {
        let state = self.state();
        if !matches!(state, LifecycleState::Closed | LifecycleState::Closing) {
            tracing::debug!(?state, "open ignored");
            return;
        }

        let index = clamp_index(self.initial_snap_index, self.snap_points.len());
        if index as isize != self.initial_snap_index {
            tracing::debug!(
                requested = self.initial_snap_index,
                index,
                "initial snap index clamped"
            );
        }
        let target = self.snap_offsets[index];
        self.current_snap_index = index;
        self.lifecycle.send(LifecycleEvent::OpenRequested);

        if self.disable_animation {
            self.channels = ChannelValues::new(target, 1.0);
            self.finish_open(index);
            return;
        }

        self.driver
            .open(self.channels, target, Some(Settle::Opened { index }));
    }

    /// Close the sheet. No-op when already closed or closing.
    pub fn close(&mut self) {
        let state = self.state();
        if matches!(state, LifecycleState::Closed | LifecycleState::Closing) {
            tracing::debug!(?state, "close ignored");
            return;
        }

        self.gesture.cancel();
        self.lifecycle.send(LifecycleEvent::CloseRequested);
        self.begin_close();
    }

    /// Move to snap point `index`, clamped into range. Returns the index used.
    ///
    /// `SnapChange` fires only when the resting index actually changes, or
    /// when the snap cuts an open short. Ignored while the sheet is closed or
    /// closing.
    pub fn snap_to(&mut self, index: isize) -> usize {
        let resolved = self.snap_points.clamp(index);
        if resolved as isize != index {
            tracing::debug!(requested = index, resolved, "snap index clamped");
        }

        let state = self.state();
        match state {
            LifecycleState::Closed | LifecycleState::Closing => {
                tracing::warn!(?state, "snap_to ignored");
                return self.current_snap_index;
            }
            LifecycleState::Dragging => {
                self.gesture.cancel();
                self.lifecycle.send(LifecycleEvent::SnapRequested);
            }
            LifecycleState::Opening => {
                self.lifecycle.send(LifecycleEvent::SnapRequested);
            }
            LifecycleState::Open => {}
        }

        // An open interrupted by a snap never reports its own settle
        let interrupted_open = state == LifecycleState::Opening;
        self.settle_on(resolved, 0.0, interrupted_open);
        resolved
    }

    /// Update the container size, e.g. after a layout or rotation.
    ///
    /// A resting sheet is moved onto its snap point for the new extent;
    /// running transitions keep their original targets.
    pub fn set_container_extent(&mut self, extent: f32) -> Result<(), ConfigError> {
        validate_extent(extent)?;
        self.container_extent = extent;
        self.snap_offsets = self.snap_points.offsets(extent);
        self.driver.set_container_extent(extent);

        match self.state() {
            LifecycleState::Closed => self.channels = ChannelValues::hidden(extent),
            LifecycleState::Open if !self.driver.is_channel_animating(Channel::Offset) => {
                self.channels.offset = self.snap_offsets[self.current_snap_index];
            }
            _ => {}
        }
        Ok(())
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// Begin a drag. Only an open sheet can be dragged.
    pub fn drag_start(&mut self) -> bool {
        if !self.lifecycle.is_in(LifecycleState::Open) {
            tracing::debug!(state = ?self.state(), "drag start ignored");
            return false;
        }

        // The gesture becomes the offset channel's only writer
        self.driver.stop_channel(Channel::Offset);
        self.lifecycle.send(LifecycleEvent::DragStarted);
        self.gesture
            .start(self.channels.offset, self.current_snap_index);
        true
    }

    /// Follow the finger. Returns the offset written, if dragging.
    pub fn drag_move(&mut self, sample: GestureSample) -> Option<f32> {
        if !self.lifecycle.is_in(LifecycleState::Dragging) {
            return None;
        }

        let ctx = GestureContext {
            snap_offsets: &self.snap_offsets,
            container_extent: self.container_extent,
            swipe_to_dismiss: self.swipe_to_dismiss,
        };
        let offset = self.gesture.update(sample, &ctx)?;
        self.channels.offset = offset;
        Some(offset)
    }

    /// Let go. The next transition starts from the final drag offset.
    pub fn drag_release(&mut self, sample: GestureSample) -> Option<ReleaseDecision> {
        if !self.lifecycle.is_in(LifecycleState::Dragging) {
            return None;
        }

        let ctx = GestureContext {
            snap_offsets: &self.snap_offsets,
            container_extent: self.container_extent,
            swipe_to_dismiss: self.swipe_to_dismiss,
        };
        let (final_offset, decision) = self.gesture.release(sample, &ctx)?;
        self.channels.offset = final_offset;

        match decision {
            ReleaseDecision::Dismiss => {
                self.lifecycle.send(LifecycleEvent::Dismissed);
                self.begin_close();
            }
            ReleaseDecision::SnapTo { index } => {
                self.lifecycle.send(LifecycleEvent::Released);
                self.settle_on(index, sample.velocity_y, false);
            }
        }
        Some(decision)
    }

    /// The platform took the gesture away; return to the current snap point
    pub fn drag_cancel(&mut self) {
        if !self.lifecycle.is_in(LifecycleState::Dragging) {
            return;
        }
        self.gesture.cancel();
        self.lifecycle.send(LifecycleEvent::Released);
        self.settle_on(self.current_snap_index, 0.0, false);
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// Advance running transitions by `dt`
    pub fn tick(&mut self, dt: Duration) {
        let settled = self.driver.tick(dt, &mut self.channels);
        self.apply_settled(settled);
    }

    /// Advance running transitions by the wall time since the last tick
    pub fn tick_now(&mut self) {
        let settled = self.driver.tick_now(&mut self.channels);
        self.apply_settled(settled);
    }

    fn apply_settled(&mut self, settled: Vec<Settle>) {
        for settle in settled {
            match settle {
                Settle::Opened { index } => self.finish_open(index),
                Settle::Closed => self.finish_close(),
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn begin_close(&mut self) {
        if self.disable_animation {
            self.channels = ChannelValues::hidden(self.container_extent);
            self.finish_close();
            return;
        }
        self.driver.close(self.channels, Some(Settle::Closed));
    }

    fn finish_open(&mut self, index: usize) {
        if self.lifecycle.try_send(LifecycleEvent::Settled) != Some(LifecycleState::Open) {
            return;
        }
        self.current_snap_index = index;
        self.events.dispatch(SheetEvent::SnapChange { index });
    }

    fn finish_close(&mut self) {
        if self.lifecycle.try_send(LifecycleEvent::Settled) != Some(LifecycleState::Closed) {
            return;
        }
        self.events.dispatch(SheetEvent::Close);
    }

    /// Commit `index` as the resting snap point and move there
    fn settle_on(&mut self, index: usize, velocity: f32, force_event: bool) {
        let changed = index != self.current_snap_index;
        self.current_snap_index = index;
        let target = self.snap_offsets[index];

        if self.disable_animation {
            self.channels.offset = target;
        } else {
            let most_expanded = self.snap_offsets[self.snap_points.last_index()];
            self.driver
                .snap_to(self.channels.offset, target, velocity, most_expanded, None);
        }

        if changed || force_event {
            self.events.dispatch(SheetEvent::SnapChange { index });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn controller(config: SheetConfig) -> SheetController {
        SheetController::new(config, 800.0).unwrap()
    }

    fn settle(controller: &mut SheetController) {
        for _ in 0..240 {
            controller.tick(FRAME);
        }
    }

    #[test]
    fn test_starts_closed_and_hidden() {
        let sheet = controller(SheetConfig::default());
        assert_eq!(sheet.state(), LifecycleState::Closed);
        assert_eq!(sheet.offset(), 800.0);
        assert_eq!(sheet.backdrop_opacity(), 0.0);
        assert!(!sheet.is_rendered());
    }

    #[test]
    fn test_rejects_empty_snap_points() {
        let config = SheetConfig::default().with_snap_points(Vec::<f32>::new());
        let result = SheetController::new(config, 800.0);
        assert!(matches!(result, Err(ConfigError::EmptySnapPoints)));
    }

    #[test]
    fn test_rejects_bad_extent() {
        let result = SheetController::new(SheetConfig::default(), f32::NAN);
        assert!(matches!(result, Err(ConfigError::InvalidExtent(_))));
    }

    #[test]
    fn test_open_settles_on_initial_index() {
        let mut sheet = controller(SheetConfig::default().with_initial_snap_index(1));
        sheet.open();
        assert_eq!(sheet.state(), LifecycleState::Opening);

        settle(&mut sheet);
        assert_eq!(sheet.state(), LifecycleState::Open);
        assert_eq!(sheet.current_snap_index(), 1);
        assert!((sheet.offset() - 80.0).abs() < 1e-3);
        assert_eq!(sheet.backdrop_opacity(), 1.0);
    }

    #[test]
    fn test_initial_index_is_clamped() {
        let mut sheet = controller(
            SheetConfig::default()
                .with_initial_snap_index(9)
                .with_animation_disabled(true),
        );
        sheet.open();
        assert_eq!(sheet.current_snap_index(), 1);
    }

    #[test]
    fn test_config_is_open_opens_on_construction() {
        let sheet = controller(
            SheetConfig::default()
                .with_open(true)
                .with_animation_disabled(true),
        );
        assert_eq!(sheet.state(), LifecycleState::Open);
    }

    #[test]
    fn test_drag_only_from_open() {
        let mut sheet = controller(SheetConfig::default());
        assert!(!sheet.drag_start());
        assert_eq!(sheet.drag_move(GestureSample::new(10.0, 0.1)), None);

        sheet.open();
        assert!(!sheet.drag_start(), "cannot drag while opening");
    }

    #[test]
    fn test_snap_during_open_interrupts_it() {
        let mut sheet = controller(SheetConfig::default());
        sheet.open();
        sheet.tick(FRAME);

        assert_eq!(sheet.snap_to(1), 1);
        assert_eq!(sheet.state(), LifecycleState::Open);

        settle(&mut sheet);
        assert_eq!(sheet.state(), LifecycleState::Open);
        assert!((sheet.offset() - 80.0).abs() < 1e-3);
        assert_eq!(sheet.backdrop_opacity(), 1.0);
    }

    #[test]
    fn test_resize_reseats_resting_sheet() {
        let mut sheet = controller(SheetConfig::default().with_animation_disabled(true));
        sheet.open();
        sheet.set_container_extent(1000.0).unwrap();

        assert!((sheet.offset() - 600.0).abs() < 1e-3);
        assert!(sheet.set_container_extent(-1.0).is_err());
    }

    #[test]
    fn test_lifecycle_history_records_transitions() {
        let mut sheet = controller(SheetConfig::default().with_animation_disabled(true));
        sheet.open();
        sheet.close();

        let states: Vec<_> = sheet.lifecycle_history().map(|t| t.to_state).collect();
        assert_eq!(
            states,
            vec![
                LifecycleState::Opening,
                LifecycleState::Open,
                LifecycleState::Closing,
                LifecycleState::Closed,
            ]
        );
        assert!(sheet.state().is_stable());
    }
}
