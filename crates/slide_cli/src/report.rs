//! Report output model for headless scenario runs.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use slide_sheet::{LifecycleState, SheetController, SheetEvent};
use std::io::Write;
use std::path::{Component, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// Where the sheet ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSnapshot {
    pub state: LifecycleState,
    pub snap_index: usize,
    pub offset: f32,
    pub backdrop_opacity: f32,
    pub events: Vec<SheetEvent>,
}

impl SheetSnapshot {
    pub fn capture(sheet: &SheetController, events: &[SheetEvent]) -> Self {
        Self {
            state: sheet.state(),
            snap_index: sheet.current_snap_index(),
            offset: sheet.offset(),
            backdrop_opacity: sheet.backdrop_opacity(),
            events: events.to_vec(),
        }
    }
}

/// Machine-readable result of a scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub message: Option<String>,
    pub elapsed_frames: u64,
    pub elapsed_ms: u64,
    pub sheet: SheetSnapshot,
}

impl RunReport {
    pub fn passed(sheet: SheetSnapshot, elapsed_frames: u64, elapsed_ms: u64) -> Self {
        Self {
            status: ReportStatus::Passed,
            failed_step_index: None,
            assertion: None,
            message: None,
            elapsed_frames,
            elapsed_ms,
            sheet,
        }
    }

    pub fn failed(
        assertion: &str,
        failed_step_index: usize,
        message: String,
        sheet: SheetSnapshot,
        elapsed_frames: u64,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            status: ReportStatus::Failed,
            failed_step_index: Some(failed_step_index),
            assertion: Some(assertion.to_string()),
            message: Some(message),
            elapsed_frames,
            elapsed_ms,
            sheet,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == ReportStatus::Passed
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        if path.is_absolute() || path.has_root() {
            bail!("report path must be relative and must not start with a separator");
        }
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            bail!("report path cannot contain '..' or drive prefixes");
        }
        let payload = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, payload)?;
        Ok(())
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SheetSnapshot {
        SheetSnapshot {
            state: LifecycleState::Open,
            snap_index: 1,
            offset: 80.0,
            backdrop_opacity: 1.0,
            events: vec![SheetEvent::SnapChange { index: 1 }],
        }
    }

    #[test]
    fn test_writer_output() {
        let report = RunReport::passed(snapshot(), 20, 320);
        let mut out = Vec::new();
        report.write_to_writer(&mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["status"], "passed");
        assert_eq!(json["sheet"]["state"], "open");
        assert_eq!(json["sheet"]["events"][0]["type"], "snap_change");
        assert!(json["failed_step_index"].is_null());
    }

    #[test]
    fn test_failed_report() {
        let report = RunReport::failed("assert_index", 3, "expected 0, got 1".into(), snapshot(), 4, 64);
        assert!(!report.is_passed());
        assert_eq!(report.failed_step_index, Some(3));
        assert_eq!(report.assertion.as_deref(), Some("assert_index"));
    }

    #[test]
    fn test_rejects_unsafe_paths() {
        let report = RunReport::passed(snapshot(), 0, 0);
        assert!(report.write_to_path(Path::new("/tmp/report.json")).is_err());
        assert!(report.write_to_path(Path::new("../report.json")).is_err());
    }
}
