//! Configuration management for fixturekit using Figment
//!
//! Discovery and access-coordination settings are read from layered sources:
//! built-in defaults, an optional `fixturekit.{toml,yaml,yml,json}` in the
//! project directory, explicitly supplied files, and `FIXTUREKIT_`
//! environment variables.
//!
//! # Example TOML Configuration
//!
//! ```toml
//! [discovery]
//! fixtures_dir_name = "Fixtures"
//! max_ascent_depth = 10
//! package_manifests = ["Cargo.toml", "Package.swift"]
//!
//! [access]
//! acquire_timeout_ms = 5000
//! ```
//!
//! # Loading
//!
//! ```no_run
//! use fixturekit_config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("/path/to/project"))?;
//! println!("looking for {}", config.discovery.fixtures_dir_name);
//! # Ok::<(), fixturekit_config::ConfigError>(())
//! ```

pub mod defaults;
mod discovery;
mod error;
mod provider;
mod types;

pub use discovery::{discover_config_files, ConfigFile, ConfigFormat};
pub use error::{ConfigError, ConfigResult};
pub use provider::{load_config, ConfigProvider, ENV_PREFIX};
pub use types::{AccessOptions, DiscoveryOptions, FixturekitConfig};
