//! Slide Animation System
//!
//! Tweens, spring physics, and transition scheduling for bottom sheets.
//!
//! # Features
//!
//! - **Tweens**: duration-based transitions shaped by easing curves
//! - **Spring Physics**: RK4-integrated springs that accept a release velocity
//! - **Channels**: every transition drives one named value; a channel never
//!   has more than one live transition
//! - **Composites**: several channel transitions grouped under one logical
//!   operation with a single completion continuation
//! - **Interruptible**: stopping a transition drops its continuation unfired

pub mod channel;
pub mod driver;
pub mod easing;
pub mod scheduler;
pub mod spring;
pub mod tween;

pub use channel::{Channel, ChannelValues};
pub use driver::{AnimationDriver, MotionConfig};
pub use easing::Easing;
pub use scheduler::{AnimationScheduler, CompositeHandle, Motion, TransitionId};
pub use spring::{Spring, SpringConfig};
pub use tween::Tween;
