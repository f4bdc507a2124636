use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::messages::Locale;

const CONFIG_DIR_NAME: &str = "magic";
const CONFIG_FILE_NAME: &str = "config.toml";
const CURRENT_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

pub const API_BASE_ENV: &str = "MAGIC_API_BASE";
pub const TIMEOUT_ENV: &str = "MAGIC_TIMEOUT_SECS";
pub const LOCALE_ENV: &str = "MAGIC_LOCALE";

/// Settings handed to [`crate::ConversionClient`] at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub timeout: Option<Duration>,
    pub locale: Locale,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: None,
            locale: Locale::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_api_base<S: Into<String>>(mut self, api_base: S) -> Self {
        self.api_base = normalize_api_base(&api_base.into());
        self
    }
}

/// Result returned by [`load_config`], capturing the source and any non-fatal issues.
#[derive(Debug, Clone)]
pub struct ConfigLoadResult {
    pub config: FileConfig,
    pub warnings: Vec<String>,
    pub source: ConfigSource,
}

/// Indicates where the configuration was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// No persisted configuration was found or usable; defaults were synthesized.
    Default,
    /// Configuration was read from `config.toml`.
    File,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML serialization error: {0}")]
    Ser(#[from] toml::ser::Error),
    #[error("invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },
}

/// Disk-backed configuration schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default = "FileConfig::schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub client: ClientPreferences,
    #[serde(default)]
    pub output: OutputPreferences,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            client: ClientPreferences::default(),
            output: OutputPreferences::default(),
        }
    }
}

impl FileConfig {
    const fn schema_version() -> u32 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_base: self.client.api_base.clone(),
            timeout: match self.client.timeout_secs {
                Some(0) | None => None,
                Some(secs) => Some(Duration::from_secs(secs)),
            },
            locale: self.client.locale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientPreferences {
    #[serde(default = "ClientPreferences::default_api_base")]
    pub api_base: String,
    /// Zero or absent disables the timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub locale: Locale,
}

impl Default for ClientPreferences {
    fn default() -> Self {
        Self {
            api_base: Self::default_api_base(),
            timeout_secs: None,
            locale: Locale::default(),
        }
    }
}

impl ClientPreferences {
    fn default_api_base() -> String {
        DEFAULT_API_BASE.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputPreferences {
    /// Where downloads are written; the working directory when unset.
    #[serde(default)]
    pub directory: Option<String>,
}

/// Directory containing `config.toml` and the log folder.
pub fn config_directory() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path to `config.toml`.
pub fn config_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Load the configuration from the default location, falling back to defaults.
pub fn load_config() -> ConfigLoadResult {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> ConfigLoadResult {
    let mut warnings = Vec::new();

    if path.exists() {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<FileConfig>(&raw) {
                Ok(cfg) => {
                    let (cfg, mut sanitize_warnings) = sanitize_config(cfg);
                    warnings.append(&mut sanitize_warnings);
                    return ConfigLoadResult {
                        config: cfg,
                        warnings,
                        source: ConfigSource::File,
                    };
                }
                Err(err) => {
                    warnings.push(format!(
                        "Failed to parse {} as TOML: {}. Falling back to defaults.",
                        path.display(),
                        err
                    ));
                }
            },
            Err(err) => {
                warnings.push(format!(
                    "Failed to read {}: {}. Falling back to defaults.",
                    path.display(),
                    err
                ));
            }
        }
    }

    ConfigLoadResult {
        config: FileConfig::default(),
        warnings,
        source: ConfigSource::Default,
    }
}

pub fn save_config(config: &FileConfig) -> Result<(), ConfigError> {
    save_config_to(&config_path(), config)
}

pub fn save_config_to(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_config(config)?)?;
    Ok(())
}

/// Serializes a configuration the way it is written to disk.
pub fn render_config(config: &FileConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

fn sanitize_config(mut config: FileConfig) -> (FileConfig, Vec<String>) {
    let mut warnings = Vec::new();

    if config.schema_version != CURRENT_SCHEMA_VERSION {
        warnings.push(format!(
            "Unknown schema_version {} in {}; reading it as version {}.",
            config.schema_version, CONFIG_FILE_NAME, CURRENT_SCHEMA_VERSION
        ));
        config.schema_version = CURRENT_SCHEMA_VERSION;
    }

    let normalized = normalize_api_base(&config.client.api_base);
    if normalized.is_empty() {
        warnings.push(format!(
            "client.api_base is empty; using {}.",
            DEFAULT_API_BASE
        ));
        config.client.api_base = DEFAULT_API_BASE.to_string();
    } else {
        config.client.api_base = normalized;
    }

    if let Some(dir) = config.output.directory.as_ref() {
        if dir.trim().is_empty() {
            config.output.directory = None;
        }
    }

    (config, warnings)
}

pub fn normalize_api_base(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Apply `MAGIC_*` environment overrides on top of a configuration.
pub fn apply_env_overrides(config: &mut ClientConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |var| env::var(var).ok())
}

fn apply_overrides_from<F>(config: &mut ClientConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base) = lookup(API_BASE_ENV) {
        let normalized = normalize_api_base(&base);
        if normalized.is_empty() {
            return Err(ConfigError::Env {
                var: API_BASE_ENV,
                reason: "empty URL".to_string(),
            });
        }
        config.api_base = normalized;
    }

    if let Some(raw) = lookup(TIMEOUT_ENV) {
        let secs = parse_env_value(TIMEOUT_ENV, &raw, |s| s.parse::<u64>())?;
        config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }

    if let Some(raw) = lookup(LOCALE_ENV) {
        config.locale = parse_env_value(LOCALE_ENV, &raw, |s| s.parse::<Locale>())?;
    }

    Ok(())
}

fn parse_env_value<T, F, E>(var: &'static str, raw: &str, parser: F) -> Result<T, ConfigError>
where
    F: FnOnce(&str) -> Result<T, E>,
    E: std::fmt::Display,
{
    parser(raw.trim()).map_err(|err| ConfigError::Env {
        var,
        reason: err.to_string(),
    })
}
