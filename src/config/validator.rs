//! Configuration validation rules.
//!
//! - `engine` must not be empty
//! - `jobs` must be at least 1
//! - `query` must name a program
//! - `marker` must contain the `{}` placeholder

use crate::config::schema::ProberConfig;
use crate::error::{ProbeError, Result};
use crate::probe::marker::PLACEHOLDER;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &ProberConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.engine.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-engine",
            "'engine' must name a container engine binary",
        ));
    }

    if config.jobs == 0 {
        errors.push(ValidationError::new(
            "zero-jobs",
            "'jobs' must be at least 1",
        ));
    }

    match config.query.first() {
        Some(program) if !program.trim().is_empty() => {}
        _ => errors.push(ValidationError::new(
            "empty-query",
            "'query' must start with the program to run",
        )),
    }

    if !config.marker.contains(PLACEHOLDER) {
        errors.push(ValidationError::new(
            "marker-placeholder",
            format!("'marker' must contain '{}' for the package name", PLACEHOLDER),
        ));
    }

    errors
}

/// Validate a configuration, failing on the first batch of errors.
pub fn validate(config: &ProberConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(ProbeError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
