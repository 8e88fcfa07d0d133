//! `tierlens.toml` loading and flag/env overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tierlens_resolve::ResolveOptions;
use tierlens_store::PoolOptions;

pub const DEFAULT_CONFIG_FILE: &str = "tierlens.toml";

/// Checked in order; the first one set wins.
const DATABASE_URL_ENV: &[&str] = &["TIERLENS_DATABASE_URL", "DATABASE_URL"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("config file not found: {0}")]
    Missing(PathBuf),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub lineage: LineageSettings,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            acquire_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageSettings {
    pub chain_max_depth: u32,
    pub flow_max_depth: u32,
    pub depth_limit: u32,
}

impl Default for LineageSettings {
    fn default() -> Self {
        let defaults = ResolveOptions::default();
        Self {
            chain_max_depth: defaults.chain_max_depth,
            flow_max_depth: defaults.flow_max_depth,
            depth_limit: defaults.depth_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub limit_per_type: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit_per_type: ResolveOptions::default().search_limit,
        }
    }
}

impl Settings {
    /// Read settings from `path`, or from `./tierlens.toml` when it exists.
    /// An explicit path that does not exist is an error; a missing default
    /// file just yields defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !path.exists() {
            return if required {
                Err(ConfigError::Missing(path))
            } else {
                Ok(Self::default())
            };
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ConfigResult<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment then flag overrides, flags taking precedence.
    pub fn with_overrides<F>(mut self, env: F, database_url: Option<String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = DATABASE_URL_ENV
            .iter()
            .find_map(|name| env(name).filter(|value| !value.trim().is_empty()))
        {
            self.database.url = Some(url);
        }
        if let Some(url) = database_url {
            self.database.url = Some(url);
        }
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let lineage = &self.lineage;
        if lineage.depth_limit == 0 {
            return Err(ConfigError::Invalid("lineage.depth_limit must be at least 1".into()));
        }
        for (name, value) in [
            ("lineage.chain_max_depth", lineage.chain_max_depth),
            ("lineage.flow_max_depth", lineage.flow_max_depth),
        ] {
            if value == 0 || value > lineage.depth_limit {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be between 1 and {}, got {value}",
                    lineage.depth_limit
                )));
            }
        }
        if self.search.limit_per_type == 0 {
            return Err(ConfigError::Invalid("search.limit_per_type must be at least 1".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be at least 1".into()));
        }
        Ok(())
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            chain_max_depth: self.lineage.chain_max_depth,
            flow_max_depth: self.lineage.flow_max_depth,
            depth_limit: self.lineage.depth_limit,
            search_limit: self.search.limit_per_type,
        }
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_connections: self.database.max_connections,
            acquire_timeout: Duration::from_secs(self.database.acquire_timeout_secs),
        }
    }
}
