//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use aptprobe::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Probing 2 dependencies");
//! ui.output("RUN true\n").unwrap();
//!
//! assert!(ui.messages().contains(&"Probing 2 dependencies".to_string()));
//! assert_eq!(ui.stdout(), "RUN true\n");
//! ```

use crate::error::Result;

use super::UserInterface;

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    stdout: String,
}

impl MockUI {
    /// Create a new MockUI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warnings.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured errors.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Everything written as primary output.
    pub fn stdout(&self) -> &str {
        &self.stdout
    }
}

impl UserInterface for MockUI {
    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn output(&mut self, text: &str) -> Result<()> {
        self.stdout.push_str(text);
        Ok(())
    }
}
