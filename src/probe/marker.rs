//! "Not installed" marker matching.
//!
//! `dpkg -s` exits 1 both when a package is unknown and when something else
//! goes wrong, so the exit code alone cannot tell them apart. The query's
//! output is searched for dpkg's "not installed" message naming the exact
//! package instead.

use regex::Regex;

use crate::shell::CommandResult;

use super::outcome::ProbeOutcome;

/// dpkg's message for an unknown package; `{}` is the package name.
pub const DEFAULT_MARKER: &str =
    "package '{}' is not installed and no information is available";

/// Placeholder substituted with the dependency name.
pub const PLACEHOLDER: &str = "{}";

/// Matcher for the "package not installed" message of one query tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotInstalledMarker {
    template: String,
}

impl NotInstalledMarker {
    /// Create a marker from a template containing `{}`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Regex matching the marker for `dependency`.
    ///
    /// Both the template text and the name are matched literally, so names
    /// like `libstdc++6` do not act as patterns.
    pub fn pattern(&self, dependency: &str) -> String {
        self.template
            .split(PLACEHOLDER)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(&regex::escape(dependency))
    }

    /// Whether `output` reports `dependency` as not installed.
    pub fn matches(&self, dependency: &str, output: &str) -> bool {
        match Regex::new(&self.pattern(dependency)) {
            Ok(re) => re.is_match(output),
            Err(e) => {
                tracing::debug!("Marker pattern for '{}' did not compile: {}", dependency, e);
                false
            }
        }
    }
}

impl Default for NotInstalledMarker {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

/// Classify one query result for `dependency`.
pub fn classify(
    dependency: &str,
    result: &CommandResult,
    marker: &NotInstalledMarker,
) -> ProbeOutcome {
    if result.success {
        return ProbeOutcome::Present;
    }

    let output = result.combined_output();
    if marker.matches(dependency, &output) {
        return ProbeOutcome::Absent;
    }

    let detail = output.trim();
    if detail.is_empty() {
        ProbeOutcome::Indeterminate(match result.exit_code {
            Some(code) => format!("query exited with code {} and no output", code),
            None => "query was terminated by a signal".to_string(),
        })
    } else {
        ProbeOutcome::Indeterminate(detail.to_string())
    }
}
