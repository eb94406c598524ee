//! Orchestrator configuration.
//!
//! Settings are read from a YAML file passed with `--settings`; without one
//! the defaults apply.
//!
//! # Example
//!
//! ```
//! use planwright::config::load_settings;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("planwright.yml");
//! fs::write(&path, "step_timeout_ms: 1000").unwrap();
//!
//! let settings = load_settings(&path).unwrap();
//! assert_eq!(settings.step_timeout_ms, Some(1000));
//! ```

pub mod settings;

pub use settings::{load_settings, load_settings_or_default, parse_settings, Settings};
