//! Dependency prober.
//!
//! The `DependencyProber` pulls an image once, then runs one throwaway
//! container per dependency to find out whether the package is installed.
//! Every failure other than "not installed" aborts the whole run.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use crate::config::ProberConfig;
use crate::engine::ContainerEngine;
use crate::error::{ProbeError, Result};

use super::fragment::InstallFragment;
use super::marker::{classify, NotInstalledMarker};
use super::outcome::{DependencyResult, ProbeOutcome, ProbeReport};

/// Tunables for a probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Query argv prefix; the dependency name is appended.
    pub query: Vec<String>,
    /// "Not installed" marker.
    pub marker: NotInstalledMarker,
    /// Per-probe timeout.
    pub timeout: Option<Duration>,
    /// Image pull timeout.
    pub pull_timeout: Option<Duration>,
    /// Concurrent probes.
    pub jobs: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self::from(&ProberConfig::default())
    }
}

impl From<&ProberConfig> for ProbeSettings {
    fn from(config: &ProberConfig) -> Self {
        Self {
            query: config.query.clone(),
            marker: NotInstalledMarker::new(config.marker.clone()),
            timeout: seconds(config.timeout),
            pull_timeout: seconds(config.pull_timeout),
            jobs: config.jobs.max(1),
        }
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Probes an image for installed packages.
pub struct DependencyProber<'a> {
    engine: &'a dyn ContainerEngine,
    settings: ProbeSettings,
}

impl<'a> DependencyProber<'a> {
    /// Create a prober using `engine`.
    pub fn new(engine: &'a dyn ContainerEngine, settings: ProbeSettings) -> Self {
        Self { engine, settings }
    }

    /// Probe `deps` in `image` and return the install fragment for the
    /// missing ones (empty when everything is installed).
    pub fn probe(&self, image: &str, deps: &[String]) -> Result<InstallFragment> {
        self.probe_report(image, deps).map(|report| report.fragment())
    }

    /// Probe `deps` in `image` and return every outcome, in input order.
    ///
    /// # Errors
    ///
    /// - `InvalidImage` / `InvalidDependency` before anything is run
    /// - `PullFailed` if the image cannot be pulled (no probes run)
    /// - `UnexpectedFailure` or `Timeout` for the first failing dependency
    pub fn probe_report(&self, image: &str, deps: &[String]) -> Result<ProbeReport> {
        let image = image.trim();
        if image.is_empty() {
            return Err(ProbeError::InvalidImage {
                message: "image reference must not be empty".to_string(),
            });
        }
        for dep in deps {
            check_dependency_name(dep)?;
        }

        self.pull(image)?;

        let outcomes = if self.settings.jobs > 1 && deps.len() > 1 {
            self.probe_parallel(image, deps)?
        } else {
            self.probe_sequential(image, deps)?
        };

        let results = deps
            .iter()
            .zip(outcomes)
            .map(|(dep, outcome)| DependencyResult {
                dependency: dep.clone(),
                outcome,
            })
            .collect();

        Ok(ProbeReport {
            image: image.to_string(),
            results,
        })
    }

    /// Probe a single dependency.
    ///
    /// Only `Present` and `Absent` come back as `Ok`; anything else is an error.
    pub fn probe_one(&self, image: &str, dependency: &str) -> Result<ProbeOutcome> {
        let argv = self.query_argv(dependency);
        let result = self.engine.run(image, &argv, self.settings.timeout)?;

        if result.timed_out {
            return Err(ProbeError::Timeout {
                dependency: dependency.to_string(),
                seconds: self.settings.timeout.map(|t| t.as_secs()).unwrap_or(0),
            });
        }

        match classify(dependency, &result, &self.settings.marker) {
            ProbeOutcome::Present => {
                tracing::info!("Found package: {}", dependency);
                Ok(ProbeOutcome::Present)
            }
            ProbeOutcome::Absent => {
                tracing::info!("Package not installed: {}", dependency);
                Ok(ProbeOutcome::Absent)
            }
            ProbeOutcome::Indeterminate(detail) => {
                tracing::debug!("Unexpected probe output for {}: {}", dependency, detail);
                Err(ProbeError::UnexpectedFailure {
                    dependency: dependency.to_string(),
                    detail,
                })
            }
        }
    }

    /// Argv run inside the container for `dependency`.
    pub fn query_argv(&self, dependency: &str) -> Vec<String> {
        let mut argv = self.settings.query.clone();
        argv.push(dependency.to_string());
        argv
    }

    fn pull(&self, image: &str) -> Result<()> {
        tracing::info!("Pulling image {} with {}", image, self.engine.name());
        let result = self.engine.pull(image, self.settings.pull_timeout)?;

        if result.success {
            return Ok(());
        }

        let detail = if result.timed_out {
            format!(
                "pull timed out after {}s",
                self.settings
                    .pull_timeout
                    .map(|t| t.as_secs())
                    .unwrap_or(0)
            )
        } else {
            let output = result.combined_output();
            let output = output.trim();
            if output.is_empty() {
                format!("exit code {:?}", result.exit_code)
            } else {
                output.to_string()
            }
        };

        Err(ProbeError::PullFailed {
            image: image.to_string(),
            detail,
        })
    }

    fn probe_sequential(&self, image: &str, deps: &[String]) -> Result<Vec<ProbeOutcome>> {
        deps.iter()
            .map(|dep| self.probe_one(image, dep))
            .collect()
    }

    /// Probe on up to `jobs` worker threads.
    ///
    /// Workers claim indices in increasing order and write each result into
    /// its own slot, so output order never depends on completion order. The
    /// first error stops workers from claiming further indices; the error
    /// reported is the one with the lowest index.
    fn probe_parallel(&self, image: &str, deps: &[String]) -> Result<Vec<ProbeOutcome>> {
        let next = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let slots: Vec<OnceLock<Result<ProbeOutcome>>> =
            deps.iter().map(|_| OnceLock::new()).collect();
        let workers = self.settings.jobs.min(deps.len());

        tracing::debug!("Probing {} dependencies on {} workers", deps.len(), workers);

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    if abort.load(Ordering::SeqCst) {
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(dep) = deps.get(index) else {
                        break;
                    };

                    let outcome = self.probe_one(image, dep);
                    if outcome.is_err() {
                        abort.store(true, Ordering::SeqCst);
                    }
                    let _ = slots[index].set(outcome);
                });
            }
        });

        let mut outcomes = Vec::with_capacity(deps.len());
        for slot in slots {
            match slot.into_inner() {
                Some(Ok(outcome)) => outcomes.push(outcome),
                Some(Err(e)) => return Err(e),
                // Unclaimed slots only follow the failing one.
                None => break,
            }
        }

        if outcomes.len() != deps.len() {
            return Err(ProbeError::Other(anyhow::anyhow!(
                "probing stopped after {} of {} dependencies",
                outcomes.len(),
                deps.len()
            )));
        }

        Ok(outcomes)
    }
}

/// Reject names the query tool would read as options.
fn check_dependency_name(dependency: &str) -> Result<()> {
    if dependency.is_empty() {
        return Err(ProbeError::InvalidDependency {
            dependency: dependency.to_string(),
            reason: "name must not be empty".to_string(),
        });
    }
    if dependency.starts_with('-') {
        return Err(ProbeError::InvalidDependency {
            dependency: dependency.to_string(),
            reason: "name must not start with '-'".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineCall, MockEngine, MockResponse};

    fn deps(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn parallel(jobs: usize) -> ProbeSettings {
        ProbeSettings {
            jobs,
            ..Default::default()
        }
    }

    #[test]
    fn all_present_gives_empty_fragment() {
        let engine = MockEngine::new();
        let prober = DependencyProber::new(&engine, ProbeSettings::default());

        let fragment = prober.probe("debian:12", &deps(&["curl", "jq"])).unwrap();

        assert_eq!(fragment.render(), "");
        assert_eq!(engine.run_count(), 2);
    }

    #[test]
    fn absent_dependency_is_installed() {
        let engine = MockEngine::new().with_missing(&["jq"]);
        let prober = DependencyProber::new(&engine, ProbeSettings::default());

        let fragment = prober.probe("debian:12", &deps(&["curl", "jq"])).unwrap();

        assert_eq!(fragment.packages(), &["jq"]);
        assert!(fragment.render().contains("jq \\\n"));
        assert!(!fragment.render().contains("curl"));
    }

    #[test]
    fn unexpected_failure_reports_dependency_and_detail() {
        let engine = MockEngine::new().with_response(
            "curl",
            MockResponse::Failure {
                exit_code: 2,
                detail: "dpkg-query: error: parsing file '/var/lib/dpkg/status'".to_string(),
            },
        );
        let prober = DependencyProber::new(&engine, ProbeSettings::default());

        let err = prober.probe("debian:12", &deps(&["curl"])).unwrap_err();

        match err {
            ProbeError::UnexpectedFailure { dependency, detail } => {
                assert_eq!(dependency, "curl");
                assert!(detail.contains("parsing file"));
            }
            other => panic!("Expected UnexpectedFailure, got {:?}", other),
        }
    }

    #[test]
    fn unexpected_failure_stops_further_probes() {
        let engine = MockEngine::new().with_response(
            "b",
            MockResponse::Failure {
                exit_code: 125,
                detail: "daemon error".to_string(),
            },
        );
        let prober = DependencyProber::new(&engine, ProbeSettings::default());

        let result = prober.probe("img", &deps(&["a", "b", "c", "d"]));

        assert!(result.is_err());
        assert_eq!(engine.probed(), vec!["a", "b"]);
    }

    #[test]
    fn pull_failure_runs_no_containers() {
        let engine = MockEngine::new().with_pull_failure("pull access denied");
        let prober = DependencyProber::new(&engine, ProbeSettings::default());

        let err = prober.probe("private/img", &deps(&["curl"])).unwrap_err();

        match err {
            ProbeError::PullFailed { image, detail } => {
                assert_eq!(image, "private/img");
                assert_eq!(detail, "pull access denied");
            }
            other => panic!("Expected PullFailed, got {:?}", other),
        }
        assert_eq!(engine.run_count(), 0);
    }

    #[test]
    fn empty_dependency_list_still_pulls() {
        let engine = MockEngine::new();
        let prober = DependencyProber::new(&engine, ProbeSettings::default());

        let fragment = prober.probe("debian:12", &[]).unwrap();

        assert!(fragment.is_empty());
        assert_eq!(
            engine.calls(),
            vec![EngineCall::Pull {
                image: "debian:12".to_string()
            }]
        );
    }

    #[test]
    fn empty_image_is_rejected() {
        let engine = MockEngine::new();
        let prober = DependencyProber::new(&engine, ProbeSettings::default());

        let err = prober.probe("  ", &deps(&["curl"])).unwrap_err();

        assert!(matches!(err, ProbeError::InvalidImage { .. }));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn option_like_names_are_rejected_before_pulling() {
        let engine = MockEngine::new();
        let prober = DependencyProber::new(&engine, ProbeSettings::default());

        let err = prober
            .probe("debian:12", &deps(&["curl", "--admindir=/tmp"]))
            .unwrap_err();

        assert!(matches!(err, ProbeError::InvalidDependency { .. }));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn dependency_name_is_a_separate_argument() {
        let engine = MockEngine::new();
        let prober = DependencyProber::new(&engine, ProbeSettings::default());

        prober.probe("img", &deps(&["curl; rm -rf /"])).unwrap();

        assert_eq!(
            engine.calls()[1],
            EngineCall::Run {
                image: "img".to_string(),
                argv: vec![
                    "dpkg".to_string(),
                    "-s".to_string(),
                    "curl; rm -rf /".to_string()
                ],
            }
        );
    }

    #[test]
    fn timeout_is_fatal() {
        let engine = MockEngine::new().with_response("jq", MockResponse::Hang);
        let settings = ProbeSettings {
            timeout: Some(Duration::from_secs(7)),
            ..Default::default()
        };
        let prober = DependencyProber::new(&engine, settings);

        let err = prober.probe("img", &deps(&["jq", "curl"])).unwrap_err();

        match err {
            ProbeError::Timeout {
                dependency,
                seconds,
            } => {
                assert_eq!(dependency, "jq");
                assert_eq!(seconds, 7);
            }
            other => panic!("Expected Timeout, got {:?}", other),
        }
        assert_eq!(engine.run_count(), 1);
    }

    #[test]
    fn killed_run_without_timeout_is_unexpected() {
        let engine = MockEngine::new().with_response("jq", MockResponse::Hang);
        let settings = ProbeSettings {
            timeout: None,
            ..Default::default()
        };
        let prober = DependencyProber::new(&engine, settings);

        let err = prober.probe("img", &deps(&["jq"])).unwrap_err();

        match err {
            ProbeError::UnexpectedFailure { dependency, detail } => {
                assert_eq!(dependency, "jq");
                assert!(detail.contains("terminated by a signal"));
            }
            other => panic!("Expected UnexpectedFailure, got {:?}", other),
        }
    }

    #[test]
    fn report_lists_every_outcome_in_order() {
        let engine = MockEngine::new().with_missing(&["git"]);
        let prober = DependencyProber::new(&engine, ProbeSettings::default());

        let report = prober
            .probe_report("img", &deps(&["curl", "git", "jq"]))
            .unwrap();

        assert_eq!(report.image, "img");
        assert_eq!(report.present(), vec!["curl", "jq"]);
        assert_eq!(report.absent(), vec!["git"]);
    }

    #[test]
    fn probing_twice_gives_identical_fragments() {
        let engine = MockEngine::new().with_missing(&["jq", "git"]);
        let prober = DependencyProber::new(&engine, ProbeSettings::default());
        let list = deps(&["git", "curl", "jq"]);

        let first = prober.probe("img", &list).unwrap();
        let second = prober.probe("img", &list).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.render(), second.render());
    }

    #[test]
    fn parallel_fragment_keeps_input_order() {
        // The first dependency answers last.
        let engine = MockEngine::new()
            .with_missing(&["a", "c", "e"])
            .with_delay("a", Duration::from_millis(150))
            .with_delay("c", Duration::from_millis(50));
        let prober = DependencyProber::new(&engine, parallel(4));

        let fragment = prober.probe("img", &deps(&["a", "b", "c", "d", "e"])).unwrap();

        assert_eq!(fragment.packages(), &["a", "c", "e"]);
        assert_eq!(engine.run_count(), 5);
    }

    #[test]
    fn parallel_matches_sequential() {
        let list = deps(&["curl", "jq", "git", "make", "gcc", "zip"]);
        let sequential_engine = MockEngine::new().with_missing(&["jq", "make", "zip"]);
        let parallel_engine = MockEngine::new().with_missing(&["jq", "make", "zip"]);

        let sequential = DependencyProber::new(&sequential_engine, ProbeSettings::default())
            .probe("img", &list)
            .unwrap();
        let parallel = DependencyProber::new(&parallel_engine, parallel(3))
            .probe("img", &list)
            .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn parallel_failure_never_reports_success() {
        let engine = MockEngine::new()
            .with_missing(&["a"])
            .with_response(
                "c",
                MockResponse::Failure {
                    exit_code: 1,
                    detail: "E: broken".to_string(),
                },
            );
        let prober = DependencyProber::new(&engine, parallel(2));

        let err = prober.probe("img", &deps(&["a", "b", "c", "d", "e", "f"])).unwrap_err();

        match err {
            ProbeError::UnexpectedFailure { dependency, .. } => assert_eq!(dependency, "c"),
            other => panic!("Expected UnexpectedFailure, got {:?}", other),
        }
    }

    #[test]
    fn parallel_reports_lowest_index_failure() {
        let failure = MockResponse::Failure {
            exit_code: 1,
            detail: "boom".to_string(),
        };
        let engine = MockEngine::new()
            .with_response("a", failure.clone())
            .with_delay("a", Duration::from_millis(100))
            .with_response("b", failure);
        let prober = DependencyProber::new(&engine, parallel(2));

        let err = prober.probe("img", &deps(&["a", "b"])).unwrap_err();

        match err {
            ProbeError::UnexpectedFailure { dependency, .. } => assert_eq!(dependency, "a"),
            other => panic!("Expected UnexpectedFailure, got {:?}", other),
        }
    }

    #[test]
    fn settings_from_config() {
        let config = ProberConfig {
            timeout: 0,
            pull_timeout: 30,
            jobs: 0,
            ..Default::default()
        };
        let settings = ProbeSettings::from(&config);

        assert_eq!(settings.timeout, None);
        assert_eq!(settings.pull_timeout, Some(Duration::from_secs(30)));
        assert_eq!(settings.jobs, 1);
        assert_eq!(settings.query, vec!["dpkg", "-s"]);
    }
}
