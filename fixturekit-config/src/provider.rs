//! Configuration provider using Figment

use crate::discovery::{discover_config_files, ConfigFile, ConfigFormat};
use crate::error::{ConfigError, ConfigResult};
use crate::types::FixturekitConfig;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Prefix of environment variables that override configuration values.
///
/// Nested keys are separated by a double underscore, e.g.
/// `FIXTUREKIT_DISCOVERY__MAX_ASCENT_DEPTH=4`.
pub const ENV_PREFIX: &str = "FIXTUREKIT_";

/// Configuration provider using figment
///
/// Sources are merged in precedence order (later sources override earlier ones):
/// 1. Default values
/// 2. Configuration files discovered in the project directory
/// 3. Explicitly supplied configuration files
/// 4. `FIXTUREKIT_` environment variables
///
/// Nothing is cached; every `load` reads the sources again.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    project_dir: Option<PathBuf>,
    explicit_files: Vec<PathBuf>,
}

impl ConfigProvider {
    /// Create a provider that only uses defaults and environment variables
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover configuration files in `dir`
    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    /// Merge an explicit configuration file; it must exist when loading
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_files.push(path.into());
        self
    }

    /// Load and validate the configuration
    pub fn load(&self) -> ConfigResult<FixturekitConfig> {
        let figment = self.build_figment()?;
        let config: FixturekitConfig = figment.extract()?;
        config.validate()?;
        debug!(
            fixtures_dir = %config.discovery.fixtures_dir_name,
            max_ascent_depth = config.discovery.max_ascent_depth,
            "Loaded fixturekit configuration"
        );
        Ok(config)
    }

    fn build_figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(FixturekitConfig::default()));

        if let Some(dir) = &self.project_dir {
            for file in discover_config_files(dir) {
                figment = figment.merge(Self::file_provider(&file));
            }
        }

        for path in &self.explicit_files {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound { path: path.clone() });
            }
            let format =
                ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
                    format: path
                        .extension()
                        .map(|e| e.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                })?;
            figment = figment.merge(Self::file_provider(&ConfigFile {
                path: path.clone(),
                format,
            }));
        }

        trace!("Merging {} environment overrides", ENV_PREFIX);
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn file_provider(file: &ConfigFile) -> Figment {
        trace!("Loading config file: {}", file.path.display());
        let path: &Path = &file.path;
        match file.format {
            ConfigFormat::Toml => Figment::from(Toml::file(path)),
            ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
            ConfigFormat::Json => Figment::from(Json::file(path)),
        }
    }
}

/// Load configuration for a project directory
pub fn load_config(project_dir: &Path) -> ConfigResult<FixturekitConfig> {
    ConfigProvider::new().with_project_dir(project_dir).load()
}
