//! Configuration management for plaprice.
//!
//! Configuration is read from `~/.config/plaprice/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! Shop definitions are not part of this file; they live in the shop store.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::aggregator::DEFAULT_WORKERS;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub search: SearchConfig,
    pub store: StoreConfig,
}

/// Transport settings shared by every shop request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of shops fetched at once.
    pub workers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Override for the shop store location.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, creating a commented default file
    /// there when it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::write_default(path, false)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/plaprice/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("plaprice").join("config.toml"))
    }

    /// Get the default shop store path: `<data_dir>/plaprice/shops.json`
    pub fn default_store_path() -> Result<PathBuf, ConfigError> {
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(data_dir.join("plaprice").join("shops.json"))
    }

    /// The shop store location, honoring `[store] path`.
    pub fn store_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => Self::default_store_path(),
        }
    }

    /// Write the commented default config to `path`.
    ///
    /// Returns `false` without touching the file when it already exists and
    /// `force` is not set.
    pub fn write_default(path: &Path, force: bool) -> Result<bool, ConfigError> {
        if path.exists() && !force {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(true)
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        format!(
            r##"# plaprice configuration
#
# Shops are managed with `plaprice shop add/remove/enable/disable`
# and stored separately (see `plaprice config path`).

[http]
# Per-shop request timeout in seconds
timeout_secs = 30

# Headers sent with every search request
user_agent = "{DEFAULT_USER_AGENT}"
accept_language = "{DEFAULT_ACCEPT_LANGUAGE}"

[search]
# Maximum number of shops fetched concurrently
workers = {DEFAULT_WORKERS}

[store]
# Location of the shop list (JSON). Defaults to <data dir>/plaprice/shops.json
# path = "/home/me/.local/share/plaprice/shops.json"
"##
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.search.workers, DEFAULT_WORKERS);
        assert_eq!(config.store.path, None);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[http]
timeout_secs = 5
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        // Custom value
        assert_eq!(config.http.timeout(), Duration::from_secs(5));
        // Default values
        assert_eq!(config.http.accept_language, DEFAULT_ACCEPT_LANGUAGE);
        assert_eq!(config.search.workers, DEFAULT_WORKERS);
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.search.workers, DEFAULT_WORKERS);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# plaprice configuration"));
    }

    #[test]
    fn test_load_from_reads_store_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[store]\npath = \"/tmp/shops.json\"\n[search]\nworkers = 2\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.search.workers, 2);
        assert_eq!(config.store_path().unwrap(), PathBuf::from("/tmp/shops.json"));
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[http]\ntimeout_secs = \"soon\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_write_default_respects_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "# mine\n").unwrap();

        assert!(!Config::write_default(&path, false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");

        assert!(Config::write_default(&path, true).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("[search]"));
    }

    #[test]
    fn test_zero_timeout_clamped() {
        let http = HttpConfig {
            timeout_secs: 0,
            ..HttpConfig::default()
        };
        assert_eq!(http.timeout(), Duration::from_secs(1));
    }
}
