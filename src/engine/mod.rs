//! Container engine access.
//!
//! The prober only needs two capabilities from an engine: pulling an image
//! and running a throwaway container from it. [`ContainerEngine`] captures
//! exactly that so tests can swap in [`MockEngine`].
//!
//! # Modules
//!
//! - [`docker`] - CLI-backed engine (`docker` or any CLI-compatible binary)
//! - [`mock`] - Scripted engine for tests

pub mod docker;
pub mod mock;

pub use docker::DockerCli;
pub use mock::{EngineCall, MockEngine, MockResponse};

use crate::error::Result;
use crate::shell::CommandResult;
use std::time::Duration;

/// Minimal capability set the prober needs from a container engine.
///
/// Implementations must be shareable across probe worker threads.
pub trait ContainerEngine: Send + Sync {
    /// Engine name for diagnostics (e.g. "docker").
    fn name(&self) -> &str;

    /// Pull `image` into the local store.
    ///
    /// A non-zero exit is reported through the returned result, not as `Err`;
    /// `Err` is reserved for the engine itself being unusable.
    fn pull(&self, image: &str, timeout: Option<Duration>) -> Result<CommandResult>;

    /// Run `argv` in a transient container created from `image`.
    ///
    /// The container must be gone once this returns, whatever the outcome.
    fn run(&self, image: &str, argv: &[String], timeout: Option<Duration>)
        -> Result<CommandResult>;
}
