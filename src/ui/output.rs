//! Output mode.

/// Output verbosity mode for status messages.
///
/// Primary output (the fragment or report) is never suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show progress and status.
    #[default]
    Normal,
    /// Show nothing except errors.
    Quiet,
}

impl OutputMode {
    /// Check if this mode shows status messages.
    pub fn shows_status(&self) -> bool {
        matches!(self, Self::Normal)
    }
}
