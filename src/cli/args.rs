//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ProberConfig;

/// aptprobe - Find apt packages missing from a container image.
#[derive(Debug, Parser)]
#[command(name = "aptprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .aptprobe.yml discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory searched for .aptprobe.yml (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Container engine binary
    #[arg(long, global = true, env = "APTPROBE_ENGINE")]
    pub engine: Option<String>,

    /// Per-probe timeout in seconds (0 disables)
    #[arg(long, global = true, value_name = "SECS", env = "APTPROBE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Number of dependencies probed concurrently
    #[arg(short, long, global = true, env = "APTPROBE_JOBS")]
    pub jobs: Option<usize>,

    /// Only print errors and results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line (and environment) overrides on top of file config.
    pub fn apply_overrides(&self, config: &mut ProberConfig) {
        if let Some(engine) = &self.engine {
            config.engine = engine.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print a Dockerfile RUN fragment installing the missing packages
    Fragment(FragmentArgs),

    /// Show which packages are installed in the image
    Status(StatusArgs),
}

/// Arguments for the `fragment` command.
#[derive(Debug, Clone, clap::Args)]
pub struct FragmentArgs {
    /// Image to probe (e.g. ubuntu:22.04)
    pub image: String,

    /// Packages to check (space- or comma-separated; defaults to the config's list)
    #[arg(value_delimiter = ',')]
    pub dependencies: Vec<String>,

    /// Write the fragment to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, clap::Args)]
pub struct StatusArgs {
    /// Image to probe (e.g. ubuntu:22.04)
    pub image: String,

    /// Packages to check (space- or comma-separated; defaults to the config's list)
    #[arg(value_delimiter = ',')]
    pub dependencies: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
