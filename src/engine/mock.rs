//! Scripted engine implementation for testing.
//!
//! `MockEngine` implements [`ContainerEngine`] without touching a real
//! container runtime. Each dependency (the last argv element of a run) is
//! answered from a script, and every call is recorded for later assertion.
//!
//! # Example
//!
//! ```
//! use aptprobe::engine::{ContainerEngine, MockEngine, MockResponse};
//!
//! let engine = MockEngine::new().with_response("jq", MockResponse::NotInstalled);
//!
//! let argv = vec!["dpkg".to_string(), "-s".to_string(), "jq".to_string()];
//! let result = engine.run("debian:12", &argv, None).unwrap();
//! assert!(!result.success);
//! assert!(result.stderr.contains("package 'jq' is not installed"));
//! assert_eq!(engine.run_count(), 1);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::Result;
use crate::shell::CommandResult;

use super::ContainerEngine;

/// Scripted answer for one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Query exits 0.
    Installed,
    /// Query exits 1 with dpkg's "not installed" message.
    NotInstalled,
    /// Query exits with `exit_code` and `detail` on stderr.
    Failure { exit_code: i32, detail: String },
    /// Query never finishes. With a timeout the run is killed at its
    /// deadline; without one it ends as if killed from outside (no exit
    /// code, no output).
    Hang,
}

/// A recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Pull { image: String },
    Run { image: String, argv: Vec<String> },
}

/// Mock engine for testing.
#[derive(Debug, Default)]
pub struct MockEngine {
    pull_failure: Option<String>,
    responses: HashMap<String, MockResponse>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<EngineCall>>,
}

impl MockEngine {
    /// Create an engine where pulls succeed and every package is installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `pull` fail with `detail` on stderr.
    pub fn with_pull_failure(mut self, detail: &str) -> Self {
        self.pull_failure = Some(detail.to_string());
        self
    }

    /// Script the answer for `dependency`.
    pub fn with_response(mut self, dependency: &str, response: MockResponse) -> Self {
        self.responses.insert(dependency.to_string(), response);
        self
    }

    /// Mark every dependency in `dependencies` as not installed.
    pub fn with_missing(mut self, dependencies: &[&str]) -> Self {
        for dep in dependencies {
            self.responses
                .insert(dep.to_string(), MockResponse::NotInstalled);
        }
        self
    }

    /// Delay the answer for `dependency`.
    pub fn with_delay(mut self, dependency: &str, delay: Duration) -> Self {
        self.delays.insert(dependency.to_string(), delay);
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of `run` calls made so far.
    pub fn run_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, EngineCall::Run { .. }))
            .count()
    }

    /// Dependencies probed so far (last argv element of each run), in call order.
    pub fn probed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Run { argv, .. } => argv.last().cloned(),
                EngineCall::Pull { .. } => None,
            })
            .collect()
    }

    fn record(&self, call: EngineCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl ContainerEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn pull(&self, image: &str, _timeout: Option<Duration>) -> Result<CommandResult> {
        self.record(EngineCall::Pull {
            image: image.to_string(),
        });

        Ok(match &self.pull_failure {
            Some(detail) => {
                CommandResult::failure(Some(1), String::new(), detail.clone(), Duration::ZERO)
            }
            None => CommandResult::success(
                format!("Status: Image is up to date for {}\n", image),
                String::new(),
                Duration::ZERO,
            ),
        })
    }

    fn run(
        &self,
        image: &str,
        argv: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandResult> {
        self.record(EngineCall::Run {
            image: image.to_string(),
            argv: argv.to_vec(),
        });

        let dependency = argv.last().cloned().unwrap_or_default();
        if let Some(delay) = self.delays.get(&dependency) {
            std::thread::sleep(*delay);
        }

        let response = self
            .responses
            .get(&dependency)
            .cloned()
            .unwrap_or(MockResponse::Installed);

        Ok(match response {
            MockResponse::Installed => CommandResult::success(
                format!("Package: {}\nStatus: install ok installed\n", dependency),
                String::new(),
                Duration::ZERO,
            ),
            MockResponse::NotInstalled => CommandResult::failure(
                Some(1),
                String::new(),
                format!(
                    "dpkg-query: package '{}' is not installed and no information is available\n\
                     Use dpkg --info (= dpkg-deb --info) to examine archive files.\n",
                    dependency
                ),
                Duration::ZERO,
            ),
            MockResponse::Failure { exit_code, detail } => {
                CommandResult::failure(Some(exit_code), String::new(), detail, Duration::ZERO)
            }
            MockResponse::Hang => match timeout {
                Some(limit) => CommandResult::timeout(String::new(), String::new(), limit),
                None => CommandResult::failure(None, String::new(), String::new(), Duration::ZERO),
            },
        })
    }
}
