//! Command-line interface for aptprobe.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, FragmentArgs, StatusArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
