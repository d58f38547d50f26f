//! Status command implementation.
//!
//! The `aptprobe status` command shows, per dependency, whether the image
//! has it installed.

use crate::cli::args::StatusArgs;
use crate::config::ProberConfig;
use crate::engine::ContainerEngine;
use crate::error::Result;
use crate::probe::{DependencyProber, DependencyStatus, ProbeReport, ProbeSettings};
use crate::ui::UserInterface;

use super::dispatcher::{resolve_dependencies, Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand {
    args: StatusArgs,
    config: ProberConfig,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(args: StatusArgs, config: ProberConfig) -> Self {
        Self { args, config }
    }
}

impl Command for StatusCommand {
    fn execute(
        &self,
        engine: &dyn ContainerEngine,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let deps = resolve_dependencies(&self.args.dependencies, &self.config);
        let prober = DependencyProber::new(engine, ProbeSettings::from(&self.config));
        let report = prober.probe_report(&self.args.image, &deps)?;

        if self.args.json {
            ui.output(&format_json(&report)?)?;
        } else {
            ui.show_header(&format!("{}:", report.image));
            ui.output(&format_table(&report))?;
            let missing = report.absent().len();
            if missing == 0 {
                ui.success("All dependencies are installed");
            } else {
                ui.message(&format!(
                    "{} of {} dependencies missing",
                    missing,
                    report.results.len()
                ));
            }
        }

        Ok(CommandResult::success())
    }
}

/// One line per dependency, names padded to a common width.
fn format_table(report: &ProbeReport) -> String {
    let width = report
        .results
        .iter()
        .map(|r| r.dependency.len())
        .max()
        .unwrap_or(0);

    report
        .results
        .iter()
        .map(|r| format!("  {:<width$}  {}\n", r.dependency, r.outcome.label()))
        .collect()
}

fn format_json(report: &ProbeReport) -> Result<String> {
    let statuses: Vec<DependencyStatus<'_>> = report.results.iter().map(|r| r.status()).collect();
    let mut json = serde_json::to_string_pretty(&statuses).map_err(anyhow::Error::from)?;
    json.push('\n');
    Ok(json)
}
