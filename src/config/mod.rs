//! Configuration loading and management for the Rate Cascade Engine.
//!
//! This module holds the [`RateConfig`] snapshot the resolver reads and the
//! [`ConfigLoader`] that builds one from a directory of YAML files.
//!
//! # Example
//!
//! ```no_run
//! use rate_cascade::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/sample").unwrap().into_config();
//! println!("Default currency: {}", config.default_currency());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{ClientsFile, RateConfig, RateRecord, RatesFile};
