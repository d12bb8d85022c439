//! Shell configuration, loaded from an optional YAML file with per-field
//! defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// On-disk shape. Every field is optional; missing fields fall back to the
/// built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    window_width: Option<f64>,
    window_height: Option<f64>,
    scheme: Option<String>,
    channel: Option<String>,
    resource_root: Option<PathBuf>,
    content_type_fallback: Option<String>,
    devtools: Option<bool>,
}

/// Resolved shell configuration.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub window_width: f64,
    pub window_height: f64,
    /// Custom URL scheme served from `resource_root`.
    pub scheme: String,
    /// Name of the script-message channel exposed to page content.
    pub channel: String,
    pub resource_root: PathBuf,
    pub content_type_fallback: String,
    pub devtools: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            window_width: 1000.0,
            window_height: 700.0,
            scheme: "local".to_string(),
            channel: "local".to_string(),
            resource_root: PathBuf::from("app"),
            content_type_fallback: "text/html".to_string(),
            devtools: true,
        }
    }
}

impl ShellConfig {
    /// Loads configuration from `path`, or returns the defaults when no path
    /// is given. A missing field in the file keeps its default.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let Some(path) = path else {
            debug!("no config file, using defaults");
            return Ok(config);
        };
        let raw = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_yaml::from_str(&raw)?;
        if let Some(v) = file.window_width {
            config.window_width = v;
        }
        if let Some(v) = file.window_height {
            config.window_height = v;
        }
        if let Some(v) = file.scheme {
            config.scheme = v;
        }
        if let Some(v) = file.channel {
            config.channel = v;
        }
        if let Some(v) = file.resource_root {
            config.resource_root = v;
        }
        if let Some(v) = file.content_type_fallback {
            config.content_type_fallback = v;
        }
        if let Some(v) = file.devtools {
            config.devtools = v;
        }
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = root.into();
        self
    }
}
