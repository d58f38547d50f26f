//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use aptprobe::config::{load_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".aptprobe.yml"), "engine: podman\njobs: 2").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.engine, "podman");
//! assert_eq!(config.jobs, 2);
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{discover, load_config, load_config_file, parse_config, CONFIG_FILE_NAME};
pub use schema::ProberConfig;
pub use validator::{validate, validate_config, ValidationError};
