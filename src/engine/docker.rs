//! Docker CLI engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::Result;
use crate::shell::{execute, CommandOptions, CommandResult};

use super::ContainerEngine;

/// Upper bound on the `rm -f` issued after a probe times out.
const REMOVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Engine backed by the `docker` command line (or a compatible binary such
/// as `podman`).
#[derive(Debug)]
pub struct DockerCli {
    binary: String,
    name_prefix: String,
    counter: AtomicUsize,
}

impl DockerCli {
    /// Create an engine that shells out to `binary`.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            name_prefix: format!("aptprobe-{}", std::process::id()),
            counter: AtomicUsize::new(0),
        }
    }

    /// The engine binary.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Arguments for `pull`.
    pub fn pull_args(image: &str) -> Vec<String> {
        vec!["pull".to_string(), image.to_string()]
    }

    /// Arguments for `run`; `argv` is appended after the image untouched.
    pub fn run_args(container_name: &str, image: &str, argv: &[String]) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            container_name.to_string(),
            image.to_string(),
        ];
        args.extend(argv.iter().cloned());
        args
    }

    fn next_container_name(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.name_prefix, n)
    }

    /// Force-remove a container left behind by a killed `run`.
    fn remove_container(&self, container_name: &str) {
        let args = vec!["rm".to_string(), "-f".to_string(), container_name.to_string()];
        match execute(
            &self.binary,
            &args,
            &CommandOptions::with_timeout(Some(REMOVE_TIMEOUT)),
        ) {
            Ok(result) if result.timed_out => {
                tracing::warn!(
                    "Removing container {} timed out after {}s",
                    container_name,
                    REMOVE_TIMEOUT.as_secs()
                );
            }
            Ok(result) if result.success => {
                tracing::debug!("Removed container {}", container_name);
            }
            Ok(result) => {
                tracing::warn!(
                    "Could not remove container {}: {}",
                    container_name,
                    result.stderr.trim()
                );
            }
            Err(e) => tracing::warn!("Could not remove container {}: {}", container_name, e),
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerEngine for DockerCli {
    fn name(&self) -> &str {
        &self.binary
    }

    fn pull(&self, image: &str, timeout: Option<Duration>) -> Result<CommandResult> {
        let result = execute(
            &self.binary,
            &Self::pull_args(image),
            &CommandOptions::with_timeout(timeout),
        )?;
        tracing::debug!("{} pull {} -> {:?}", self.binary, image, result.exit_code);
        Ok(result)
    }

    fn run(
        &self,
        image: &str,
        argv: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandResult> {
        let container_name = self.next_container_name();
        let result = execute(
            &self.binary,
            &Self::run_args(&container_name, image, argv),
            &CommandOptions::with_timeout(timeout),
        )?;

        // Killing the client does not stop the container; --rm only fires on exit.
        if result.timed_out {
            tracing::warn!(
                "Probe container {} exceeded its timeout, removing",
                container_name
            );
            self.remove_container(&container_name);
        }

        Ok(result)
    }
}
