//! User-facing output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] writing status to stderr and results to stdout
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use aptprobe::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(OutputMode::Quiet, false);
//! ui.success("All packages installed");
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, ProbeTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Display a status message.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message (shown in every mode).
    fn error(&mut self, msg: &str);

    /// Show a header line.
    fn show_header(&mut self, title: &str);

    /// Write primary output verbatim.
    fn output(&mut self, text: &str) -> Result<()>;
}
