//! Configuration file resolution and TOML loading
//!
//! Config file resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`tgai/config.toml`)
//! 4. None: caller falls back to compiled defaults

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "TGAI_CONFIG";

/// Logging configuration shared by all services
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolve the config file path.
///
/// A CLI or environment path is returned even if it does not exist, so that
/// `load_toml` can report it. The platform paths are returned only if present.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_file()
}

/// Get default configuration file path for the platform, if one exists
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tgai").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tgai/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load a TOML config file into `T`.
///
/// - `None` path: compiled defaults, no error
/// - Path that does not exist: warning + compiled defaults
/// - Path that exists but fails to parse: `Error::Config`
pub fn load_toml<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!("Config file {} not found, using built-in defaults", path.display());
        return Ok(T::default());
    }

    debug!("Loading config from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<T>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}
