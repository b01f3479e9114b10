//! Sheet animation driver
//!
//! Turns the three sheet motions (open, close, snap) into scheduler
//! transitions on the offset and opacity channels. Every call stops the
//! channels it touches before starting anything, so the most recent intent
//! always wins and a superseded operation's continuation never comes back.

use crate::channel::{Channel, ChannelValues};
use crate::easing::Easing;
use crate::scheduler::{AnimationScheduler, CompositeHandle, Motion, TransitionId};
use crate::spring::{Spring, SpringConfig};
use crate::tween::Tween;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of the sheet's transitions
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Duration of the offset transition when opening
    #[serde(default = "default_open_duration")]
    pub open_duration_ms: u32,
    /// Duration of the offset transition when closing
    #[serde(default = "default_close_duration")]
    pub close_duration_ms: u32,
    /// Duration of the backdrop fade, in either direction
    #[serde(default = "default_backdrop_duration")]
    pub backdrop_duration_ms: u32,
    #[serde(default = "default_open_easing")]
    pub open_easing: Easing,
    #[serde(default = "default_close_easing")]
    pub close_easing: Easing,
    /// Spring used to settle on a snap point
    #[serde(default)]
    pub snap_spring: SpringConfig,
}

fn default_open_duration() -> u32 {
    300
}

fn default_close_duration() -> u32 {
    250
}

fn default_backdrop_duration() -> u32 {
    200
}

fn default_open_easing() -> Easing {
    Easing::DECELERATE
}

fn default_close_easing() -> Easing {
    Easing::ACCELERATE
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            open_duration_ms: default_open_duration(),
            close_duration_ms: default_close_duration(),
            backdrop_duration_ms: default_backdrop_duration(),
            open_easing: default_open_easing(),
            close_easing: default_close_easing(),
            snap_spring: SpringConfig::default(),
        }
    }
}

/// Issues cancellable composite transitions for a sheet
pub struct AnimationDriver<C> {
    scheduler: AnimationScheduler<C>,
    config: MotionConfig,
    container_extent: f32,
}

impl<C> AnimationDriver<C> {
    pub fn new(config: MotionConfig, container_extent: f32) -> Self {
        Self {
            scheduler: AnimationScheduler::new(),
            config,
            container_extent,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn container_extent(&self) -> f32 {
        self.container_extent
    }

    /// Offset a closing sheet heads for. Running transitions keep their target.
    pub fn set_container_extent(&mut self, extent: f32) {
        self.container_extent = extent;
    }

    /// Slide the sheet from `from.offset` to `target_offset` while fading the
    /// backdrop in. `on_settled` comes back from [`tick`](Self::tick) once both
    /// channels arrive.
    pub fn open(
        &mut self,
        from: ChannelValues,
        target_offset: f32,
        on_settled: Option<C>,
    ) -> CompositeHandle {
        let offset = Tween::new(
            from.offset,
            target_offset,
            self.config.open_duration_ms,
            self.config.open_easing,
        );
        let opacity = Tween::new(
            from.opacity,
            1.0,
            self.config.backdrop_duration_ms,
            Easing::Linear,
        );

        tracing::debug!(from = from.offset, to = target_offset, "driver: open");
        self.scheduler.start_composite(
            [
                (Channel::Offset, Motion::from(offset)),
                (Channel::Opacity, Motion::from(opacity)),
            ],
            on_settled,
        )
    }

    /// Slide the sheet below the fold and fade the backdrop out.
    ///
    /// `on_settled` is delivered exactly once if both channels finish, and
    /// never if either is stopped first.
    pub fn close(&mut self, from: ChannelValues, on_settled: Option<C>) -> CompositeHandle {
        let offset = Tween::new(
            from.offset,
            self.container_extent,
            self.config.close_duration_ms,
            self.config.close_easing,
        );
        let opacity = Tween::new(
            from.opacity,
            0.0,
            self.config.backdrop_duration_ms,
            Easing::Linear,
        );

        tracing::debug!(from = from.offset, to = self.container_extent, "driver: close");
        self.scheduler.start_composite(
            [
                (Channel::Offset, Motion::from(offset)),
                (Channel::Opacity, Motion::from(opacity)),
            ],
            on_settled,
        )
    }

    /// Spring the offset channel to `target_offset`, seeded with
    /// `velocity` in px/ms. Opacity is left alone.
    ///
    /// The offset never leaves `[min_offset, container_extent]`, however
    /// hard the release.
    pub fn snap_to(
        &mut self,
        from_offset: f32,
        target_offset: f32,
        velocity: f32,
        min_offset: f32,
        on_settled: Option<C>,
    ) -> CompositeHandle {
        let spring = Spring::new(self.config.snap_spring, from_offset)
            .with_target(target_offset)
            .with_velocity(velocity * 1000.0)
            .with_bounds(min_offset, self.container_extent);

        tracing::debug!(from = from_offset, to = target_offset, velocity, "driver: snap");
        self.scheduler
            .start_composite([(Channel::Offset, Motion::from(spring))], on_settled)
    }

    /// Stop one transition; its continuation never fires
    pub fn stop(&mut self, handle: TransitionId) -> bool {
        self.scheduler.stop(handle)
    }

    pub fn stop_composite(&mut self, handle: &CompositeHandle) {
        self.scheduler.stop_composite(handle);
    }

    pub fn stop_channel(&mut self, channel: Channel) -> bool {
        self.scheduler.stop_channel(channel)
    }

    pub fn stop_all(&mut self) {
        self.scheduler.stop_all();
    }

    pub fn occupant(&self, channel: Channel) -> Option<TransitionId> {
        self.scheduler.occupant(channel)
    }

    pub fn is_animating(&self) -> bool {
        self.scheduler.has_active_animations()
    }

    pub fn is_channel_animating(&self, channel: Channel) -> bool {
        self.scheduler.occupant(channel).is_some()
    }

    pub fn tick(&mut self, dt: Duration, values: &mut ChannelValues) -> Vec<C> {
        self.scheduler.tick(dt, values)
    }

    pub fn tick_now(&mut self, values: &mut ChannelValues) -> Vec<C> {
        self.scheduler.tick_now(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[derive(Debug, PartialEq)]
    enum Done {
        Opened,
        Closed,
        Snapped,
    }

    fn settle(driver: &mut AnimationDriver<Done>, values: &mut ChannelValues) -> Vec<Done> {
        let mut out = Vec::new();
        for _ in 0..240 {
            out.extend(driver.tick(FRAME, values));
        }
        out
    }

    #[test]
    fn test_open_then_settle() {
        let mut driver = AnimationDriver::new(MotionConfig::default(), 800.0);
        let mut values = ChannelValues::hidden(800.0);

        let handle = driver.open(values, 480.0, Some(Done::Opened));
        assert_eq!(handle.len(), 2);
        assert!(driver.is_channel_animating(Channel::Offset));
        assert!(driver.is_channel_animating(Channel::Opacity));

        assert_eq!(settle(&mut driver, &mut values), vec![Done::Opened]);
        assert_eq!(values, ChannelValues::new(480.0, 1.0));
        assert!(!driver.is_animating());
    }

    #[test]
    fn test_close_supersedes_open() {
        let mut driver = AnimationDriver::new(MotionConfig::default(), 800.0);
        let mut values = ChannelValues::hidden(800.0);

        let open = driver.open(values, 480.0, Some(Done::Opened));
        driver.tick(FRAME, &mut values);
        driver.close(values, Some(Done::Closed));

        for (_, id) in open.iter() {
            assert!(!driver.stop(id), "open members must already be stopped");
        }
        assert_eq!(settle(&mut driver, &mut values), vec![Done::Closed]);
        assert_eq!(values, ChannelValues::hidden(800.0));
    }

    #[test]
    fn test_stopped_close_never_settles() {
        let mut driver = AnimationDriver::new(MotionConfig::default(), 800.0);
        let mut values = ChannelValues::new(480.0, 1.0);

        let close = driver.close(values, Some(Done::Closed));
        driver.stop_composite(&close);

        assert!(settle(&mut driver, &mut values).is_empty());
        assert_eq!(values, ChannelValues::new(480.0, 1.0));
    }

    #[test]
    fn test_snap_leaves_opacity_alone() {
        let mut driver = AnimationDriver::new(MotionConfig::default(), 800.0);
        let mut values = ChannelValues::new(480.0, 0.5);

        let handle = driver.snap_to(values.offset, 80.0, -1.2, 80.0, Some(Done::Snapped));
        assert_eq!(handle.len(), 1);
        assert_eq!(handle.get(Channel::Opacity), None);

        assert_eq!(settle(&mut driver, &mut values), vec![Done::Snapped]);
        assert_eq!(values.offset, 80.0);
        assert_eq!(values.opacity, 0.5);
    }

    #[test]
    fn test_hard_fling_stays_within_offset_range() {
        let mut driver = AnimationDriver::new(MotionConfig::default(), 800.0);
        let mut values = ChannelValues::new(70.0, 1.0);

        driver.snap_to(values.offset, 80.0, -5.0, 80.0, Some(Done::Snapped));
        assert_eq!(values.offset, 70.0);

        let mut settled = Vec::new();
        for _ in 0..240 {
            settled.extend(driver.tick(FRAME, &mut values));
            assert!((80.0..=800.0).contains(&values.offset), "{}", values.offset);
        }
        assert_eq!(settled, vec![Done::Snapped]);

        driver.snap_to(400.0, 480.0, 3.0, 80.0, None);
        for _ in 0..240 {
            driver.tick(FRAME, &mut values);
            assert!(values.offset <= 800.0, "{}", values.offset);
        }
        assert_eq!(values.offset, 480.0);
    }

    #[test]
    fn test_close_uses_current_extent() {
        let mut driver: AnimationDriver<Done> = AnimationDriver::new(MotionConfig::default(), 800.0);
        let mut values = ChannelValues::new(100.0, 1.0);

        driver.set_container_extent(600.0);
        driver.close(values, None);
        assert!(settle(&mut driver, &mut values).is_empty());
        assert_eq!(values, ChannelValues::hidden(600.0));
    }

    #[test]
    fn test_motion_config_defaults_fill_missing_fields() {
        let config: MotionConfig = serde_json::from_str(r#"{ "open_duration_ms": 120 }"#)
            .expect("partial config parses");
        assert_eq!(config.open_duration_ms, 120);
        assert_eq!(config.close_duration_ms, 250);
        assert_eq!(config.snap_spring, SpringConfig::snappy());
    }
}
