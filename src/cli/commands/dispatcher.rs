//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::PathBuf;

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, validate, ProberConfig};
use crate::engine::{ContainerEngine, DockerCli};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `engine` - Container engine used for pulls and probes
    /// * `ui` - User interface for status and primary output
    fn execute(
        &self,
        engine: &dyn ContainerEngine,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Load the config file and apply command-line overrides.
    pub fn resolve_config(&self, cli: &Cli) -> Result<ProberConfig> {
        let mut config = load_config(&self.project_root, cli.config.as_deref())?;
        cli.apply_overrides(&mut config);
        validate(&config)?;
        tracing::debug!("Resolved config: {:?}", config);
        Ok(config)
    }

    /// Dispatch and execute a command against the configured engine.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.resolve_config(cli)?;
        let engine = DockerCli::new(config.engine.clone());
        self.dispatch_with_engine(cli, config, &engine, ui)
    }

    /// Dispatch and execute a command against an explicit engine.
    pub fn dispatch_with_engine(
        &self,
        cli: &Cli,
        config: ProberConfig,
        engine: &dyn ContainerEngine,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        match &cli.command {
            Commands::Fragment(args) => {
                let cmd = super::fragment::FragmentCommand::new(args.clone(), config);
                cmd.execute(engine, ui)
            }
            Commands::Status(args) => {
                let cmd = super::status::StatusCommand::new(args.clone(), config);
                cmd.execute(engine, ui)
            }
        }
    }
}

/// Dependencies from the command line, falling back to the config's list.
///
/// Names are passed through untouched; the prober rejects unusable ones.
pub fn resolve_dependencies(from_args: &[String], config: &ProberConfig) -> Vec<String> {
    if from_args.is_empty() {
        config.dependencies.clone()
    } else {
        from_args.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use crate::ui::MockUI;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn resolve_config_applies_file_then_flags() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".aptprobe.yml"),
            "engine: podman\ntimeout: 30\n",
        )
        .unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());
        let cli = Cli::parse_from(["aptprobe", "--timeout", "5", "status", "img"]);

        let config = dispatcher.resolve_config(&cli).unwrap();

        assert_eq!(config.engine, "podman");
        assert_eq!(config.timeout, 5);
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());
        let cli = Cli::parse_from(["aptprobe", "--jobs", "0", "status", "img"]);

        assert!(dispatcher.resolve_config(&cli).is_err());
    }

    #[test]
    fn dispatch_routes_to_fragment() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());
        let cli = Cli::parse_from(["aptprobe", "fragment", "img", "curl", "jq"]);
        let engine = MockEngine::new().with_missing(&["jq"]);
        let mut ui = MockUI::new();

        let result = dispatcher
            .dispatch_with_engine(&cli, ProberConfig::default(), &engine, &mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.stdout().contains("jq \\\n"));
    }

    #[test]
    fn dependencies_fall_back_to_config() {
        let config = ProberConfig {
            dependencies: vec!["git".to_string()],
            ..Default::default()
        };
        assert_eq!(resolve_dependencies(&[], &config), vec!["git"]);
        assert_eq!(
            resolve_dependencies(&["curl".to_string()], &config),
            vec!["curl"]
        );
    }

    #[test]
    fn dependencies_are_passed_through_unchanged() {
        let args = vec!["curl".to_string(), String::new(), " jq".to_string()];
        assert_eq!(
            resolve_dependencies(&args, &ProberConfig::default()),
            vec!["curl", "", " jq"]
        );
    }

    #[test]
    fn empty_dependency_name_is_a_usage_error() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());
        let mut cli = Cli::parse_from(["aptprobe", "fragment", "img", "curl"]);
        if let Commands::Fragment(args) = &mut cli.command {
            args.dependencies.push(String::new());
        }
        let engine = MockEngine::new();
        let mut ui = MockUI::new();

        let err = dispatcher
            .dispatch_with_engine(&cli, ProberConfig::default(), &engine, &mut ui)
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::ProbeError::InvalidDependency { .. }
        ));
        assert!(err.is_usage_error());
        assert!(engine.calls().is_empty());
    }
}
