//! Fragment command implementation.
//!
//! The `aptprobe fragment` command prints the Dockerfile fragment that
//! installs whichever packages the image is missing.

use std::fs;

use crate::cli::args::FragmentArgs;
use crate::config::ProberConfig;
use crate::engine::ContainerEngine;
use crate::error::Result;
use crate::probe::{DependencyProber, ProbeSettings};
use crate::ui::UserInterface;

use super::dispatcher::{resolve_dependencies, Command, CommandResult};

/// The fragment command implementation.
pub struct FragmentCommand {
    args: FragmentArgs,
    config: ProberConfig,
}

impl FragmentCommand {
    /// Create a new fragment command.
    pub fn new(args: FragmentArgs, config: ProberConfig) -> Self {
        Self { args, config }
    }
}

impl Command for FragmentCommand {
    fn execute(
        &self,
        engine: &dyn ContainerEngine,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let deps = resolve_dependencies(&self.args.dependencies, &self.config);
        if deps.is_empty() {
            ui.warning("No dependencies given; nothing to probe");
        } else {
            ui.message(&format!(
                "Probing {} dependencies in {}",
                deps.len(),
                self.args.image
            ));
        }

        let prober = DependencyProber::new(engine, ProbeSettings::from(&self.config));
        let fragment = prober.probe(&self.args.image, &deps)?;

        if fragment.is_empty() {
            ui.success("All dependencies are installed");
        } else {
            ui.message(&format!("Missing: {}", fragment.packages().join(", ")));
        }

        let text = fragment.render();
        match &self.args.output {
            Some(path) => {
                fs::write(path, &text)?;
                ui.success(&format!("Wrote fragment to {}", path.display()));
            }
            None => ui.output(&text)?,
        }

        Ok(CommandResult::success())
    }
}
