//! aptprobe - Find apt packages missing from a container image.
//!
//! aptprobe pulls an image, runs `dpkg -s <package>` for each dependency in
//! a throwaway container, and emits a Dockerfile `RUN` fragment that
//! installs only the packages the image is missing.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and validation
//! - [`engine`] - Container engine access (docker CLI, mock)
//! - [`error`] - Error types and result aliases
//! - [`probe`] - Dependency probing and fragment synthesis
//! - [`shell`] - External command execution with timeouts
//! - [`ui`] - Status and result output
//!
//! # Example
//!
//! ```
//! use aptprobe::engine::MockEngine;
//! use aptprobe::probe::{DependencyProber, ProbeSettings};
//!
//! let engine = MockEngine::new();
//! let prober = DependencyProber::new(&engine, ProbeSettings::default());
//!
//! let deps = vec!["curl".to_string(), "jq".to_string()];
//! let fragment = prober.probe("ubuntu:22.04", &deps).unwrap();
//! assert_eq!(fragment.render(), "");
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod probe;
pub mod shell;
pub mod ui;

pub use error::{ProbeError, Result};
