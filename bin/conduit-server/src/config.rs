//! Server configuration loaded from TOML, with `-o key=value` overrides.

use std::{
    fs,
    path::{Path, PathBuf},
};

use conduit_db_store_sled::SledDbConfig;
use conduit_http_api::Role;
use serde::{Deserialize, Serialize};

use crate::{args::Args, errors::*};

/// Default host to listen on.
const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port to listen on.
const DEFAULT_PORT: u16 = 8080;

/// Default data directory.
const DEFAULT_DATADIR: &str = "data";

/// Default number of attempts for conflicting database updates.
const DEFAULT_RETRY_COUNT: u16 = 5;


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) server: ServerConfig,

    #[serde(default)]
    pub(crate) storage: StorageConfig,

    #[serde(default)]
    pub(crate) auth: AuthConfig,

    #[serde(default)]
    pub(crate) logging: LoggingConfig,

    #[serde(default)]
    pub(crate) sanitizer: SanitizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ServerConfig {
    #[serde(default = "default_values::host")]
    pub(crate) host: String,

    #[serde(default = "default_values::port")]
    pub(crate) port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_values::host(),
            port: default_values::port(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum StorageBackend {
    #[default]
    Sled,
    /// Nothing survives a restart.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StorageConfig {
    #[serde(default)]
    pub(crate) backend: StorageBackend,

    #[serde(default = "default_values::datadir")]
    pub(crate) datadir: PathBuf,

    #[serde(default = "default_values::retry_count")]
    pub(crate) retry_count: u16,

    /// Flush every output write to disk before acknowledging it.
    #[serde(default = "default_values::flush_on_write")]
    pub(crate) flush_on_write: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            datadir: default_values::datadir(),
            retry_count: default_values::retry_count(),
            flush_on_write: default_values::flush_on_write(),
        }
    }
}

impl StorageConfig {
    pub(crate) fn sled_config(&self) -> SledDbConfig {
        SledDbConfig::new(self.retry_count, self.flush_on_write)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenConfig {
    pub(crate) token: String,
    pub(crate) role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AuthConfig {
    /// When off, every caller is treated as an admin.
    #[serde(default = "default_values::auth_enabled")]
    pub(crate) enabled: bool,

    #[serde(default)]
    pub(crate) tokens: Vec<TokenConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_values::auth_enabled(),
            tokens: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) service_label: Option<String>,

    /// Deployment environment attached to exported traces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) environment: Option<String>,

    /// Identifies this replica in exported traces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) otlp_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) otlp_timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) log_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) log_file_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) json_format: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SanitizerConfig {
    /// Directory of `<actorDefinitionId>.json` connection specifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) spec_dir: Option<PathBuf>,
}

/// Default value functions to make [`serde`] happy.
mod default_values {
    use super::*;

    pub(super) fn host() -> String {
        DEFAULT_HOST.to_string()
    }

    pub(super) fn port() -> u16 {
        DEFAULT_PORT
    }

    pub(super) fn datadir() -> PathBuf {
        PathBuf::from(DEFAULT_DATADIR)
    }

    pub(super) fn retry_count() -> u16 {
        DEFAULT_RETRY_COUNT
    }

    pub(super) fn flush_on_write() -> bool {
        false
    }

    pub(super) fn auth_enabled() -> bool {
        true
    }
}

/// Loads the config file named by `args`, applies overrides and validates.
pub(crate) fn load_config(args: &Args) -> Result<Config, InitError> {
    let mut config_toml = load_config_from_path(&args.config)?;

    let overrides = args
        .get_all_overrides()?
        .iter()
        .map(|o| parse_override(o))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let table = config_toml
        .as_table_mut()
        .ok_or(ConfigError::TraverseNonTableAt {
            key: "<root>".to_string(),
            path: "".to_string(),
        })?;

    for (path, val) in overrides {
        apply_override(&path, val, table)?;
    }

    let config = config_toml.try_into::<Config>()?;
    validate_config(config)
}

fn load_config_from_path(path: &Path) -> Result<toml::Value, InitError> {
    let config_str = fs::read_to_string(path)?;
    Ok(toml::from_str(&config_str)?)
}

fn validate_config(config: Config) -> Result<Config, InitError> {
    if config.auth.enabled && config.auth.tokens.is_empty() {
        return Err(ConfigError::NoAuthTokens.into());
    }
    if config.storage.retry_count == 0 {
        return Err(ConfigError::ZeroRetries.into());
    }
    Ok(config)
}

/// Splits `a.b.c=value` into its key path and a TOML value. Values that don't
/// parse as TOML are taken as plain strings.
fn parse_override(raw: &str) -> Result<(Vec<String>, toml::Value), ConfigError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(raw.to_string()))?;

    let path: Vec<String> = key.trim().split('.').map(str::to_string).collect();
    if path.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::InvalidOverride(raw.to_string()));
    }

    let value = value.trim();
    let parsed = toml::from_str::<toml::value::Table>(&format!("v = {value}"))
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| toml::Value::String(value.to_string()));

    Ok((path, parsed))
}

fn apply_override(
    path: &[String],
    val: toml::Value,
    table: &mut toml::value::Table,
) -> Result<(), ConfigError> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(());
    };

    let mut cur = table;
    for (i, key) in parents.iter().enumerate() {
        let entry = cur
            .entry(key.clone())
            .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
        cur = entry
            .as_table_mut()
            .ok_or_else(|| ConfigError::TraverseNonTableAt {
                key: key.clone(),
                path: path[..=i].join("."),
            })?;
    }
    cur.insert(last.clone(), val);
    Ok(())
}
