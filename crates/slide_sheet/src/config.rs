//! Sheet configuration
//!
//! Plain values resolved when a controller is constructed. Configs can be
//! written inline or loaded from a TOML file:
//!
//! ```toml
//! snap_points = [0.25, 0.5, 0.9]
//! initial_snap_index = 1
//! enable_swipe_to_dismiss = false
//!
//! [motion]
//! open_duration_ms = 350
//! ```

use serde::{Deserialize, Serialize};
use slide_animation::MotionConfig;
use slide_core::snap::{normalize, SnapPoints};
use slide_core::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bottom sheet configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Exposure fractions in (0, 1]; order and duplicates do not matter
    #[serde(default = "default_snap_points")]
    pub snap_points: Vec<f32>,
    /// Snap index used when opening; clamped into range
    #[serde(default)]
    pub initial_snap_index: isize,
    #[serde(default = "default_true")]
    pub enable_swipe_to_dismiss: bool,
    /// Replace every transition with an immediate value assignment
    #[serde(default)]
    pub disable_animation: bool,
    /// Initial value of the external open flag
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub motion: MotionConfig,
}

fn default_snap_points() -> Vec<f32> {
    vec![0.4, 0.9]
}

fn default_true() -> bool {
    true
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            snap_points: default_snap_points(),
            initial_snap_index: 0,
            enable_swipe_to_dismiss: true,
            disable_animation: false,
            is_open: false,
            motion: MotionConfig::default(),
        }
    }
}

/// Errors raised while loading a config file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sheet config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid sheet config: {0}")]
    Invalid(#[from] ConfigError),
}

impl SheetConfig {
    pub fn with_snap_points(mut self, snap_points: impl Into<Vec<f32>>) -> Self {
        self.snap_points = snap_points.into();
        self
    }

    pub fn with_initial_snap_index(mut self, index: isize) -> Self {
        self.initial_snap_index = index;
        self
    }

    pub fn with_swipe_to_dismiss(mut self, enabled: bool) -> Self {
        self.enable_swipe_to_dismiss = enabled;
        self
    }

    pub fn with_animation_disabled(mut self, disabled: bool) -> Self {
        self.disable_animation = disabled;
        self
    }

    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    /// Normalized snap points, or the reason they are unusable
    pub fn resolve_snap_points(&self) -> Result<SnapPoints, ConfigError> {
        normalize(&self.snap_points)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, LoadError> {
        let config: SheetConfig = toml::from_str(input)?;
        config.resolve_snap_points()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SheetConfig::default();
        assert_eq!(config.snap_points, vec![0.4, 0.9]);
        assert_eq!(config.initial_snap_index, 0);
        assert!(config.enable_swipe_to_dismiss);
        assert!(!config.disable_animation);
        assert!(!config.is_open);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = SheetConfig::from_toml_str("").unwrap();
        assert_eq!(config, SheetConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let config = SheetConfig::from_toml_str(
            r#"
            snap_points = [0.9, 0.25, 0.5]
            initial_snap_index = 1
            enable_swipe_to_dismiss = false

            [motion]
            open_duration_ms = 350
            "#,
        )
        .unwrap();

        assert_eq!(config.snap_points, vec![0.9, 0.25, 0.5]);
        assert_eq!(config.initial_snap_index, 1);
        assert!(!config.enable_swipe_to_dismiss);
        assert_eq!(config.motion.open_duration_ms, 350);
        assert_eq!(config.motion.close_duration_ms, 250);
        assert_eq!(
            config.resolve_snap_points().unwrap().as_slice(),
            &[0.25, 0.5, 0.9]
        );
    }

    #[test]
    fn test_empty_snap_points_rejected() {
        let err = SheetConfig::from_toml_str("snap_points = []").unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::EmptySnapPoints)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = SheetConfig::from_toml_str("snap_points = ").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_load_demo_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/sheet.toml");
        let config = SheetConfig::load(&path).unwrap();
        assert_eq!(config.snap_points.len(), 3);
        assert_eq!(config.motion.snap_spring.stiffness, 400.0);
        assert_eq!(config.motion.backdrop_duration_ms, 200);
    }

    #[test]
    fn test_missing_file() {
        let err = SheetConfig::load(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
