//! Terminal UI.

use console::Term;
use std::io::Write;

use crate::error::Result;

use super::{should_use_colors, OutputMode, ProbeTheme, UserInterface};

/// Terminal UI implementation.
///
/// Status goes to stderr; primary output goes to stdout untouched so it can
/// be redirected into a Dockerfile.
pub struct TerminalUI {
    status: Term,
    theme: ProbeTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode, colors: bool) -> Self {
        let theme = if colors && should_use_colors() {
            ProbeTheme::new()
        } else {
            ProbeTheme::plain()
        };

        Self {
            status: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.status, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.status, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.status, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.status, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.status, "{}", self.theme.format_header(title)).ok();
        }
    }

    fn output(&mut self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Create the UI for the given mode.
pub fn create_ui(mode: OutputMode, colors: bool) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode, colors))
}
