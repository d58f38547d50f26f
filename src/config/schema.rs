//! Configuration schema definitions.
//!
//! This module contains the struct that maps to the `.aptprobe.yml` file.

use serde::{Deserialize, Serialize};

use crate::probe::marker::DEFAULT_MARKER;

/// Root configuration structure for `.aptprobe.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProberConfig {
    /// Container engine binary (docker, podman, ...)
    pub engine: String,

    /// Per-probe timeout in seconds (0 = no timeout)
    pub timeout: u64,

    /// Image pull timeout in seconds (0 = no timeout)
    pub pull_timeout: u64,

    /// Number of dependencies probed concurrently
    pub jobs: usize,

    /// Package-status query; the dependency name is appended as the last argument
    pub query: Vec<String>,

    /// "Not installed" message template, `{}` stands for the dependency name
    pub marker: String,

    /// Dependencies probed when none are given on the command line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            timeout: default_timeout(),
            pull_timeout: 0,
            jobs: 1,
            query: default_query(),
            marker: DEFAULT_MARKER.to_string(),
            dependencies: Vec::new(),
        }
    }
}

fn default_engine() -> String {
    "docker".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_query() -> Vec<String> {
    vec!["dpkg".to_string(), "-s".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config: ProberConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ProberConfig::default());
        assert_eq!(config.engine, "docker");
        assert_eq!(config.timeout, 120);
        assert_eq!(config.jobs, 1);
        assert_eq!(config.query, vec!["dpkg", "-s"]);
    }

    #[test]
    fn partial_yaml_overrides_only_given_fields() {
        let yaml = r#"
engine: podman
jobs: 4
dependencies: [curl, jq]
"#;
        let config: ProberConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.engine, "podman");
        assert_eq!(config.jobs, 4);
        assert_eq!(config.dependencies, vec!["curl", "jq"]);
        assert_eq!(config.timeout, 120);
        assert_eq!(config.marker, DEFAULT_MARKER);
    }

    #[test]
    fn custom_query_parses() {
        let yaml = "query: [dpkg-query, --status]";
        let config: ProberConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.query, vec!["dpkg-query", "--status"]);
    }

    #[test]
    fn serializes_without_empty_dependencies() {
        let yaml = serde_yaml::to_string(&ProberConfig::default()).unwrap();
        assert!(yaml.contains("engine: docker"));
        assert!(!yaml.contains("dependencies"));
    }
}
