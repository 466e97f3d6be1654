//! Configuration loading and database path resolution
//!
//! Settings come from an optional TOML file. Individual values can be
//! overridden from the command line or environment, in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LDT_CONFIG";

/// Environment variable naming the database file
pub const DATABASE_ENV_VAR: &str = "LDT_DATABASE";

/// Default database file name
pub const DEFAULT_DATABASE_FILE: &str = "luxdemocracy.db";

/// Default rows per page in listings
pub const DEFAULT_PAGE_SIZE: i64 = 25;

/// Contents of `config.toml`
///
/// Every field is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// SQLite database file
    pub database_path: Option<PathBuf>,
    /// Default tracing filter (`RUST_LOG` still wins)
    pub log_level: Option<String>,
    pub import: ImportConfig,
    pub web: WebConfig,
}

/// `[import]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Worksheet used when `--sheet` is not given
    pub sheet: Option<String>,
    /// Header overrides, keyed by logical column (`law_number`, `law_title`, ...)
    pub columns: BTreeMap<String, String>,
}

/// `[web]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
    pub port: u16,
    pub page_size: i64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5780,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load configuration with graceful degradation
    ///
    /// An explicit path (argument or `LDT_CONFIG`) must exist and parse. When no
    /// path is given, the platform locations are tried and a missing or broken
    /// file only produces a warning and defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        if let Some(path) = explicit {
            debug!("Loading config from {}", path.display());
            return Self::from_file(&path);
        }

        match locate_config_file() {
            Some(path) => match Self::from_file(&path) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    Ok(config)
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    Ok(Self::default())
                }
            },
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Resolve the database path for this configuration
    pub fn database_path(&self, cli_arg: Option<&Path>) -> PathBuf {
        resolve_database_path(cli_arg, DATABASE_ENV_VAR, self.database_path.as_deref())
    }
}

/// Database path resolution: CLI → environment → TOML → compiled default
pub fn resolve_database_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config_value: Option<&Path>,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = config_value {
        return path.to_path_buf();
    }

    default_database_path()
}

/// Platform config file, if one exists
fn locate_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("ldt").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/ldt/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ldt").join(DEFAULT_DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE))
}

/// Tracing filter directive: `RUST_LOG` is honoured by the caller, this picks
/// the fallback from config or `info`
pub fn log_directive(config: &TomlConfig) -> String {
    config
        .log_level
        .clone()
        .unwrap_or_else(|| "info".to_string())
}
