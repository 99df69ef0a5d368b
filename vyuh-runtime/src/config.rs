//! Runtime configuration, read from `vyuh.toml`.
//!
//! ```toml
//! route_type = "vyuh.route"
//!
//! [loader]
//! fetch_timeout_ms = 30000
//! allow_refresh = true
//! live = false
//! ```

use crate::error::RuntimeResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use vyuh_loader::{DEFAULT_ROUTE_TYPE, LoaderOptions};

pub const CONFIG_FILE_NAME: &str = "vyuh.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Document type route paths resolve against.
    pub route_type: String,
    pub loader: LoaderConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            route_type: DEFAULT_ROUTE_TYPE.to_string(),
            loader: LoaderConfig::default(),
        }
    }
}

/// Defaults for loaders created through the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub fetch_timeout_ms: u64,
    pub allow_refresh: bool,
    pub live: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 30_000,
            allow_refresh: true,
            live: false,
        }
    }
}

impl RuntimeConfig {
    /// Parses TOML, failing on malformed input.
    pub fn from_toml_str(contents: &str) -> RuntimeResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads configuration from `path`.
    /// Falls back to defaults when the file is missing or unreadable.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded runtime config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            route_type: self.route_type.clone(),
            fetch_timeout: Duration::from_millis(self.loader.fetch_timeout_ms),
            allow_refresh: self.loader.allow_refresh,
            live: self.loader.live,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn load_config_from_str(contents: &str) -> RuntimeConfig {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        RuntimeConfig::load_from(path)
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RuntimeConfig::load_from(dir.path().join("absent.toml"));
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.loader_options(), LoaderOptions::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = load_config_from_str(
            r#"
[loader]
fetch_timeout_ms = 2500
live = true
"#,
        );
        assert_eq!(config.route_type, "vyuh.route");
        assert_eq!(config.loader.fetch_timeout_ms, 2500);
        assert!(config.loader.allow_refresh);

        let options = config.loader_options();
        assert_eq!(options.fetch_timeout, Duration::from_millis(2500));
        assert!(options.live);
    }

    #[test]
    fn route_type_is_configurable() {
        let config = load_config_from_str(r#"route_type = "marketing.page""#);
        assert_eq!(config.loader_options().route_type, "marketing.page");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let config = load_config_from_str("[loader\nlive = ");
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn strict_parse_reports_errors() {
        assert!(RuntimeConfig::from_toml_str("[loader]\nfetch_timeout_ms = \"soon\"").is_err());
    }
}
