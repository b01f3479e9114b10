use thiserror::Error;

/// Errors raised while validating sheet configuration.
///
/// These are fatal: they are reported when a controller is constructed (or
/// when its container is resized) and are never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one snap point is required")]
    EmptySnapPoints,

    #[error("snap point #{index} is {value}, expected a fraction in (0, 1]")]
    InvalidSnapPoint { index: usize, value: f32 },

    #[error("container extent must be finite and non-negative, got {0}")]
    InvalidExtent(f32),
}
