//! Configuration for the OPFS helper
//!
//! Defaults can be overridden from an optional `opfs.toml` and from
//! `OPFS_*` environment variables, or from an in-memory TOML string on hosts
//! without a filesystem.

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::Deserialize;

use crate::path::OPFS_PREFIX;
use crate::platform::AccessMode;

/// Resolution and upgrade settings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct OpfsConfig {
    /// Storage-origin marker stripped from virtual paths
    /// Environment: OPFS_PATH_PREFIX
    pub path_prefix: String,

    /// Mode used when a sync handle request names none
    /// Environment: OPFS_DEFAULT_ACCESS_MODE
    pub default_access_mode: AccessMode,
}

impl Default for OpfsConfig {
    fn default() -> Self {
        Self {
            path_prefix: OPFS_PREFIX.to_string(),
            default_access_mode: AccessMode::ReadWriteUnsafe,
        }
    }
}

impl OpfsConfig {
    /// Load from `opfs.toml` (optional) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("opfs", "OPFS")
    }

    /// Load from the optional file `file_name` with `{env_prefix}_*` overrides
    pub fn load_from(file_name: &str, env_prefix: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name(file_name).required(false))
            .add_source(Environment::with_prefix(env_prefix).try_parsing(false))
            .build()?;
        Self::finish(settings)
    }

    /// Load from a TOML document layered over the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::finish(settings)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("path_prefix", defaults.path_prefix)?
            .set_default("default_access_mode", defaults.default_access_mode.as_str())
    }

    fn finish(settings: Config) -> Result<Self, config::ConfigError> {
        let config: OpfsConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.path_prefix.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "path_prefix cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
