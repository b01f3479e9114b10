//! Slide Bottom Sheet
//!
//! A headless bottom sheet: snap points, drag gestures, and open/close
//! transitions driven by the host's frame clock.
//!
//! # Example
//!
//! ```rust
//! use slide_sheet::prelude::*;
//! use std::time::Duration;
//!
//! let config = SheetConfig::default().with_snap_points(vec![0.4, 0.9]);
//! let mut sheet = SheetController::new(config, 800.0).unwrap();
//! sheet.on_close(|| println!("closed"));
//!
//! sheet.set_open(true);
//! for _ in 0..30 {
//!     sheet.tick(Duration::from_millis(16));
//! }
//! assert_eq!(sheet.state(), LifecycleState::Open);
//! assert_eq!(sheet.current_snap_index(), 0);
//! ```
//!
//! # Features
//!
//! - **Snap Points**: any set of exposure fractions, normalized on load
//! - **Gestures**: drag to follow the finger, fling or release to settle
//! - **Swipe to Dismiss**: by velocity or by distance below the lowest point
//! - **Interruptible**: open, close, and snap supersede each other cleanly
//! - **No Animation Mode**: every transition completes synchronously

pub mod config;
pub mod controller;
pub mod events;
pub mod gesture;

pub use config::{LoadError, SheetConfig};
pub use controller::{LifecycleEvent, LifecycleState, SheetController};
pub use events::{SheetEvent, SheetEventDispatcher, SheetEventHandler};
pub use gesture::{
    decide_release, GestureContext, GestureCoordinator, GestureSample, ReleaseDecision,
    DISMISS_DISTANCE_RATIO, DISMISS_VELOCITY, FLING_VELOCITY,
};

// Re-export the pieces of the lower crates that appear in this API
pub use slide_animation::{ChannelValues, Easing, MotionConfig, SpringConfig};
pub use slide_core::{ConfigError, SnapPoints};

/// Common imports for hosts embedding a sheet
pub mod prelude {
    pub use crate::config::SheetConfig;
    pub use crate::controller::{LifecycleState, SheetController};
    pub use crate::events::SheetEvent;
    pub use crate::gesture::{GestureSample, ReleaseDecision};
    pub use slide_animation::MotionConfig;
}
