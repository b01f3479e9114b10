//! Slide CLI
//!
//! Validate bottom sheet configs and replay scripted interactions against a
//! headless sheet:
//!
//! ```text
//! slide check sheet.toml --extent 800
//! slide run scenario.json --report out/report.json
//! ```

mod report;
mod runner;
mod scenario;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scenario::Scenario;
use slide_sheet::{SheetConfig, SheetController};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bottom sheet tooling
#[derive(Parser, Debug)]
#[command(name = "slide")]
#[command(about = "Validate bottom sheet configs and replay headless scenarios")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a sheet config and print its resolved snap offsets
    Check {
        /// Path to a TOML sheet config
        config: PathBuf,

        /// Container height used to resolve offsets
        #[arg(long, default_value = "800")]
        extent: f32,
    },

    /// Replay a JSON scenario against a headless sheet
    Run {
        /// Path to the scenario file
        scenario: PathBuf,

        /// Write the JSON report here (relative path) instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Check { config, extent } => cmd_check(config, extent),
        Command::Run { scenario, report } => cmd_run(scenario, report),
    }
}

fn cmd_check(path: PathBuf, extent: f32) -> Result<()> {
    let config = SheetConfig::load(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let sheet = SheetController::new(config.clone(), extent)?;

    print!("{}", describe(&config, &sheet));
    Ok(())
}

fn cmd_run(path: PathBuf, report_path: Option<PathBuf>) -> Result<()> {
    let scenario = Scenario::from_path(&path)?;
    tracing::info!(steps = scenario.steps.len(), "running {}", path.display());

    let report = runner::run(&scenario)?;
    match report_path {
        Some(out) => {
            report.write_to_path(&out)?;
            tracing::info!("report written to {}", out.display());
        }
        None => report.write_to_writer(&mut std::io::stdout().lock())?,
    }

    if !report.is_passed() {
        bail!(
            "scenario failed at step {}: {}",
            report.failed_step_index.unwrap_or_default(),
            report.message.as_deref().unwrap_or("unknown failure")
        );
    }
    Ok(())
}

/// Human-readable summary of a validated config
fn describe(config: &SheetConfig, sheet: &SheetController) -> String {
    let mut out = String::new();
    let motion = &config.motion;

    let _ = writeln!(out, "container extent: {}", sheet.container_extent());
    let _ = writeln!(out, "snap points: {}", sheet.snap_points().len());
    for (index, (fraction, offset)) in sheet
        .snap_points()
        .as_slice()
        .iter()
        .zip(sheet.snap_offsets())
        .enumerate()
    {
        let _ = writeln!(out, "  [{index}] {fraction:.2} -> offset {offset:.1}");
    }
    let _ = writeln!(
        out,
        "initial index: {}",
        sheet.snap_points().clamp(config.initial_snap_index)
    );
    let _ = writeln!(
        out,
        "swipe to dismiss: {}",
        if config.enable_swipe_to_dismiss { "on" } else { "off" }
    );
    if config.disable_animation {
        let _ = writeln!(out, "animation: off");
    } else {
        let _ = writeln!(
            out,
            "animation: open {}ms, close {}ms, backdrop {}ms",
            motion.open_duration_ms, motion.close_duration_ms, motion.backdrop_duration_ms
        );
    }
    out
}
