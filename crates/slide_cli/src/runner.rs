//! Replays a scenario against a headless sheet controller.

use crate::report::{RunReport, SheetSnapshot};
use crate::scenario::{Scenario, ScenarioStep};
use anyhow::{Context, Result};
use slide_sheet::{GestureSample, SheetController, SheetEvent};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

struct StepFailure {
    assertion: &'static str,
    message: String,
}

impl StepFailure {
    fn new(assertion: &'static str, message: String) -> Self {
        Self { assertion, message }
    }
}

struct Runner {
    sheet: SheetController,
    inbox: Receiver<SheetEvent>,
    events: Vec<SheetEvent>,
    frame_ms: u64,
    elapsed_frames: u64,
    elapsed_ms: u64,
}

impl Runner {
    fn new(scenario: &Scenario) -> Result<Self> {
        let mut sheet = SheetController::new(scenario.config.clone(), scenario.container_extent)
            .context("failed to build sheet controller")?;

        let (tx, inbox) = mpsc::channel();
        sheet.on_event(move |event| {
            // The receiver outlives the controller
            let _ = tx.send(*event);
        });

        Ok(Self {
            sheet,
            inbox,
            events: Vec::new(),
            frame_ms: scenario.frame_ms,
            elapsed_frames: 0,
            elapsed_ms: 0,
        })
    }

    fn collect_events(&mut self) {
        self.events.extend(self.inbox.try_iter());
    }

    fn advance(&mut self, ms: u64) {
        self.sheet.tick(Duration::from_millis(ms));
        self.elapsed_frames += 1;
        self.elapsed_ms += ms;
    }

    fn snapshot(&self) -> SheetSnapshot {
        SheetSnapshot::capture(&self.sheet, &self.events)
    }

    fn step(&mut self, step: &ScenarioStep) -> Result<(), StepFailure> {
        let result = self.apply(step);
        self.collect_events();
        result
    }

    fn apply(&mut self, step: &ScenarioStep) -> Result<(), StepFailure> {
        match *step {
            ScenarioStep::SetOpen { open } => self.sheet.set_open(open),
            ScenarioStep::Open => self.sheet.open(),
            ScenarioStep::Close => self.sheet.close(),
            ScenarioStep::SnapTo { index } => {
                self.sheet.snap_to(index);
            }
            ScenarioStep::Resize { extent } => {
                self.sheet
                    .set_container_extent(extent)
                    .map_err(|err| StepFailure::new("resize", err.to_string()))?;
            }
            ScenarioStep::DragStart => {
                if !self.sheet.drag_start() {
                    tracing::warn!(state = ?self.sheet.state(), "drag_start had no effect");
                }
            }
            ScenarioStep::DragMove { dy, vy } => {
                self.sheet.drag_move(GestureSample::new(dy, vy));
            }
            ScenarioStep::DragRelease { dy, vy } => {
                let decision = self.sheet.drag_release(GestureSample::new(dy, vy));
                tracing::info!(?decision, "drag released");
            }
            ScenarioStep::DragCancel => self.sheet.drag_cancel(),
            ScenarioStep::Tick { frames } => {
                for _ in 0..frames {
                    self.advance(self.frame_ms);
                }
            }
            ScenarioStep::Wait { ms } => {
                let mut remaining = ms;
                while remaining > 0 {
                    let dt = remaining.min(self.frame_ms);
                    self.advance(dt);
                    remaining -= dt;
                }
            }
            ScenarioStep::Settle { max_frames } => {
                let mut frames = 0;
                while self.sheet.is_animating() {
                    if frames == max_frames {
                        return Err(StepFailure::new(
                            "settle",
                            format!("still animating after {max_frames} frames"),
                        ));
                    }
                    self.advance(self.frame_ms);
                    frames += 1;
                }
            }
            ScenarioStep::AssertState { state } => {
                let actual = self.sheet.state();
                if actual != state {
                    return Err(StepFailure::new(
                        "assert_state",
                        format!("expected {state:?}, got {actual:?}"),
                    ));
                }
            }
            ScenarioStep::AssertIndex { index } => {
                let actual = self.sheet.current_snap_index();
                if actual != index {
                    return Err(StepFailure::new(
                        "assert_index",
                        format!("expected {index}, got {actual}"),
                    ));
                }
            }
            ScenarioStep::AssertOffset { value, tolerance } => {
                let actual = self.sheet.offset();
                if (actual - value).abs() > tolerance {
                    return Err(StepFailure::new(
                        "assert_offset",
                        format!("expected {value} ± {tolerance}, got {actual}"),
                    ));
                }
            }
            ScenarioStep::AssertOpacity { value, tolerance } => {
                let actual = self.sheet.backdrop_opacity();
                if (actual - value).abs() > tolerance {
                    return Err(StepFailure::new(
                        "assert_opacity",
                        format!("expected {value} ± {tolerance}, got {actual}"),
                    ));
                }
            }
            ScenarioStep::AssertEvents { ref events } => {
                // Pick up anything emitted by the previous step
                self.collect_events();
                if &self.events != events {
                    return Err(StepFailure::new(
                        "assert_events",
                        format!("expected {events:?}, got {:?}", self.events),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Run every step in order, stopping at the first failure.
///
/// Errors only when the scenario cannot start at all; a failing step is
/// reported in the returned [`RunReport`].
pub fn run(scenario: &Scenario) -> Result<RunReport> {
    let mut runner = Runner::new(scenario)?;

    for (index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!(index, step = step.name(), "scenario step");
        if let Err(failure) = runner.step(step) {
            tracing::warn!(
                index,
                assertion = failure.assertion,
                message = %failure.message,
                "scenario step failed"
            );
            return Ok(RunReport::failed(
                failure.assertion,
                index,
                failure.message,
                runner.snapshot(),
                runner.elapsed_frames,
                runner.elapsed_ms,
            ));
        }
    }

    Ok(RunReport::passed(
        runner.snapshot(),
        runner.elapsed_frames,
        runner.elapsed_ms,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_sheet::LifecycleState;

    fn run_json(input: &str) -> RunReport {
        run(&Scenario::from_json(input).unwrap()).unwrap()
    }

    #[test]
    fn test_fling_and_dismiss_scenario_passes() {
        let report = run_json(
            r#"{
                "steps": [
                    { "type": "set_open", "open": true },
                    { "type": "settle" },
                    { "type": "assert_state", "state": "open" },
                    { "type": "assert_offset", "value": 480 },
                    { "type": "drag_start" },
                    { "type": "drag_move", "dy": -40, "vy": -1.2 },
                    { "type": "drag_release", "dy": -40, "vy": -1.2 },
                    { "type": "settle" },
                    { "type": "assert_index", "index": 1 },
                    { "type": "assert_offset", "value": 80 },
                    { "type": "drag_start" },
                    { "type": "drag_release", "dy": 10, "vy": 0.9 },
                    { "type": "assert_state", "state": "closing" },
                    { "type": "settle" },
                    { "type": "assert_opacity", "value": 0 },
                    { "type": "assert_events", "events": [
                        { "type": "snap_change", "index": 0 },
                        { "type": "snap_change", "index": 1 },
                        { "type": "close" }
                    ] }
                ]
            }"#,
        );

        assert!(report.is_passed(), "{:?}", report.message);
        assert_eq!(report.sheet.state, LifecycleState::Closed);
        assert!(report.elapsed_frames > 0);
        assert_eq!(report.elapsed_ms, report.elapsed_frames * 16);
    }

    #[test]
    fn test_demo_scenario_passes() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../demos/fling_dismiss.json");
        let report = run(&Scenario::from_path(&path).unwrap()).unwrap();
        assert!(report.is_passed(), "{:?}", report.message);
    }

    #[test]
    fn test_failing_assertion_reports_step() {
        let report = run_json(
            r#"{
                "config": { "disable_animation": true },
                "steps": [
                    { "type": "open" },
                    { "type": "snap_to", "index": 99 },
                    { "type": "assert_index", "index": 0 }
                ]
            }"#,
        );

        assert!(!report.is_passed());
        assert_eq!(report.failed_step_index, Some(2));
        assert_eq!(report.assertion.as_deref(), Some("assert_index"));
        assert_eq!(report.sheet.snap_index, 1);
    }

    #[test]
    fn test_wait_splits_into_frames() {
        let report = run_json(r#"{ "frame_ms": 10, "steps": [{ "type": "wait", "ms": 35 }] }"#);
        assert_eq!(report.elapsed_frames, 4);
        assert_eq!(report.elapsed_ms, 35);
    }

    #[test]
    fn test_initially_open_sheet_opens_before_listeners() {
        let report = run_json(
            r#"{
                "config": { "is_open": true, "disable_animation": true },
                "steps": [
                    { "type": "assert_state", "state": "open" },
                    { "type": "assert_events", "events": [] }
                ]
            }"#,
        );
        assert!(report.is_passed());
    }

    #[test]
    fn test_bad_resize_fails_the_step() {
        let report = run_json(r#"{ "steps": [{ "type": "resize", "extent": -10 }] }"#);
        assert_eq!(report.assertion.as_deref(), Some("resize"));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let scenario =
            Scenario::from_json(r#"{ "config": { "snap_points": [] }, "steps": [] }"#).unwrap();
        assert!(run(&scenario).is_err());
    }
}
