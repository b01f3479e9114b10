//! Scenario definition for headless sheet runs.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use slide_sheet::{LifecycleState, SheetConfig, SheetEvent};
use std::path::Path;

/// A sheet, a container, and a sequence of steps to drive it through.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: SheetConfig,
    #[serde(default = "default_container_extent")]
    pub container_extent: f32,
    /// Length of one simulated frame
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    pub steps: Vec<ScenarioStep>,
}

fn default_container_extent() -> f32 {
    800.0
}

fn default_frame_ms() -> u64 {
    16
}

fn default_settle_frames() -> u32 {
    600
}

fn default_tolerance() -> f32 {
    0.5
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(input)?;
        if scenario.frame_ms == 0 {
            bail!("frame_ms must be at least 1");
        }
        Ok(scenario)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid scenario {}", path.display()))
    }
}

/// One scripted input or check.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    SetOpen {
        open: bool,
    },
    Open,
    Close,
    SnapTo {
        index: isize,
    },
    Resize {
        extent: f32,
    },
    DragStart,
    DragMove {
        dy: f32,
        #[serde(default)]
        vy: f32,
    },
    DragRelease {
        dy: f32,
        #[serde(default)]
        vy: f32,
    },
    DragCancel,
    Tick {
        frames: u32,
    },
    Wait {
        ms: u64,
    },
    /// Tick until nothing is animating
    Settle {
        #[serde(default = "default_settle_frames")]
        max_frames: u32,
    },
    AssertState {
        state: LifecycleState,
    },
    AssertIndex {
        index: usize,
    },
    AssertOffset {
        value: f32,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
    },
    AssertOpacity {
        value: f32,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
    },
    /// Every event emitted so far, in order
    AssertEvents {
        events: Vec<SheetEvent>,
    },
}

impl ScenarioStep {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioStep::SetOpen { .. } => "set_open",
            ScenarioStep::Open => "open",
            ScenarioStep::Close => "close",
            ScenarioStep::SnapTo { .. } => "snap_to",
            ScenarioStep::Resize { .. } => "resize",
            ScenarioStep::DragStart => "drag_start",
            ScenarioStep::DragMove { .. } => "drag_move",
            ScenarioStep::DragRelease { .. } => "drag_release",
            ScenarioStep::DragCancel => "drag_cancel",
            ScenarioStep::Tick { .. } => "tick",
            ScenarioStep::Wait { .. } => "wait",
            ScenarioStep::Settle { .. } => "settle",
            ScenarioStep::AssertState { .. } => "assert_state",
            ScenarioStep::AssertIndex { .. } => "assert_index",
            ScenarioStep::AssertOffset { .. } => "assert_offset",
            ScenarioStep::AssertOpacity { .. } => "assert_opacity",
            ScenarioStep::AssertEvents { .. } => "assert_events",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let scenario = Scenario::from_json(r#"{ "steps": [] }"#).unwrap();
        assert_eq!(scenario.container_extent, 800.0);
        assert_eq!(scenario.frame_ms, 16);
        assert_eq!(scenario.config, SheetConfig::default());
    }

    #[test]
    fn test_parses_steps() {
        let scenario = Scenario::from_json(
            r#"{
                "config": { "snap_points": [0.25, 0.5], "disable_animation": true },
                "container_extent": 600,
                "steps": [
                    { "type": "set_open", "open": true },
                    { "type": "drag_move", "dy": -20 },
                    { "type": "settle" },
                    { "type": "assert_state", "state": "open" },
                    { "type": "assert_events", "events": [{ "type": "snap_change", "index": 0 }] }
                ]
            }"#,
        )
        .unwrap();

        assert!(scenario.config.disable_animation);
        assert_eq!(scenario.container_extent, 600.0);
        assert_eq!(scenario.steps.len(), 5);
        assert!(matches!(
            scenario.steps[1],
            ScenarioStep::DragMove { dy, vy } if dy == -20.0 && vy == 0.0
        ));
        assert!(matches!(
            scenario.steps[2],
            ScenarioStep::Settle { max_frames: 600 }
        ));
        assert_eq!(scenario.steps[3].name(), "assert_state");
    }

    #[test]
    fn test_rejects_zero_frame() {
        assert!(Scenario::from_json(r#"{ "frame_ms": 0, "steps": [] }"#).is_err());
    }

    #[test]
    fn test_rejects_unknown_step() {
        assert!(Scenario::from_json(r#"{ "steps": [{ "type": "teleport" }] }"#).is_err());
    }
}
