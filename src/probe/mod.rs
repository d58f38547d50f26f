//! Dependency probing and install fragment synthesis.
//!
//! # Modules
//!
//! - [`prober`] - Pull an image and probe each dependency in a throwaway container
//! - [`marker`] - Classify query results using dpkg's "not installed" message
//! - [`outcome`] - Per-dependency outcomes and run reports
//! - [`fragment`] - The Dockerfile `RUN` fragment for missing packages
//!
//! # Example
//!
//! ```
//! use aptprobe::engine::MockEngine;
//! use aptprobe::probe::{DependencyProber, ProbeSettings};
//!
//! let engine = MockEngine::new().with_missing(&["jq"]);
//! let prober = DependencyProber::new(&engine, ProbeSettings::default());
//!
//! let deps = vec!["curl".to_string(), "jq".to_string()];
//! let fragment = prober.probe("debian:12", &deps).unwrap();
//! assert_eq!(fragment.packages(), &["jq"]);
//! ```

pub mod fragment;
pub mod marker;
pub mod outcome;
pub mod prober;

pub use fragment::InstallFragment;
pub use marker::{classify, NotInstalledMarker, DEFAULT_MARKER};
pub use outcome::{DependencyResult, DependencyStatus, ProbeOutcome, ProbeReport};
pub use prober::{DependencyProber, ProbeSettings};
