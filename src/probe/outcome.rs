//! Probe outcome types.
//!
//! Each probe produces a [`ProbeOutcome`]; a successful run collects them
//! into a [`ProbeReport`] from which the install fragment is derived.

use serde::Serialize;

use super::fragment::InstallFragment;

/// The result of probing a single dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The query succeeded; the package is installed.
    Present,

    /// The query reported the package as not installed.
    Absent,

    /// The query failed for some other reason (raw detail attached).
    Indeterminate(String),
}

impl ProbeOutcome {
    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeOutcome::Present => "installed",
            ProbeOutcome::Absent => "missing",
            ProbeOutcome::Indeterminate(_) => "indeterminate",
        }
    }

    /// Whether the package needs installing.
    pub fn is_absent(&self) -> bool {
        matches!(self, ProbeOutcome::Absent)
    }
}

/// Outcome for one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyResult {
    /// The dependency that was probed.
    pub dependency: String,
    /// Its outcome.
    pub outcome: ProbeOutcome,
}

/// Serialized form of a [`DependencyResult`].
#[derive(Debug, Serialize)]
pub struct DependencyStatus<'a> {
    pub dependency: &'a str,
    pub status: &'static str,
}

impl DependencyResult {
    /// Serializable view of this result.
    pub fn status(&self) -> DependencyStatus<'_> {
        DependencyStatus {
            dependency: &self.dependency,
            status: self.outcome.label(),
        }
    }
}

/// Outcomes of a completed probe run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// The probed image.
    pub image: String,
    /// One result per input dependency.
    pub results: Vec<DependencyResult>,
}

impl ProbeReport {
    /// Dependencies found installed.
    pub fn present(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.outcome == ProbeOutcome::Present)
            .map(|r| r.dependency.as_str())
            .collect()
    }

    /// Dependencies found missing, in input order.
    pub fn absent(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.outcome.is_absent())
            .map(|r| r.dependency.as_str())
            .collect()
    }

    /// Install fragment for the missing dependencies.
    pub fn fragment(&self) -> InstallFragment {
        InstallFragment::from_packages(self.absent())
    }
}
