//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands receive
//! the container engine explicitly so tests can run them against
//! [`MockEngine`](crate::engine::MockEngine).

pub mod dispatcher;
pub mod fragment;
pub mod status;

pub use dispatcher::{resolve_dependencies, Command, CommandDispatcher, CommandResult};
