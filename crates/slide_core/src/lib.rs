//! Slide Core
//!
//! Foundational primitives shared by the Slide bottom-sheet crates:
//!
//! - **Snap Points**: normalization of exposure fractions and index/offset math
//! - **State Machines**: typed transition tables for lifecycle states
//! - **Errors**: configuration errors reported at construction time
//!
//! # Example
//!
//! ```rust
//! use slide_core::snap::{normalize, to_offset};
//!
//! let points = normalize(&[0.9, 0.4, 0.9]).unwrap();
//! assert_eq!(points.as_slice(), &[0.4, 0.9]);
//! assert_eq!(to_offset(0.5, 800.0), 400.0);
//! ```

pub mod error;
pub mod fsm;
pub mod snap;

pub use error::ConfigError;
pub use fsm::{StateMachine, StateMachineBuilder, Transition};
pub use snap::{clamp_index, nearest_index, normalize, to_offset, SnapPoints, TIE_TOLERANCE};
