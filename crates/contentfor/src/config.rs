//! Application configuration for view and layout rendering.
//!
//! A [`Config`] is built once at startup, either programmatically or from
//! YAML, and shared behind an `Arc` by everything that renders.
//!
//! ```yaml
//! base_path: /srv/booking
//! views:
//!   - app/views
//! layouts:
//!   path: app/layouts
//!   default:
//!     html: application.html
//! results:
//!   chunked: false
//! dev_mode: true
//! ```
//!
//! Every key is optional. Relative directories are resolved against
//! `base_path`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default directory holding layout templates, relative to the base path.
pub const DEFAULT_LAYOUT_DIR: &str = "app/layouts";

/// Default directory holding view templates, relative to the base path.
pub const DEFAULT_VIEW_DIR: &str = "app/views";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root that relative view and layout directories are resolved against.
    pub base_path: PathBuf,
    /// Directories holding view templates.
    pub views: Vec<PathBuf>,
    pub layouts: LayoutsConfig,
    pub results: ResultsConfig,
    /// Development mode: results always buffer, even when chunked.
    pub dev_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutsConfig {
    /// Directory holding layout templates.
    pub path: PathBuf,
    /// Layout used per request format when the action does not pick one.
    pub default: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Stream rendered pages straight into the response.
    pub chunked: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            views: vec![PathBuf::from(DEFAULT_VIEW_DIR)],
            layouts: LayoutsConfig::default(),
            results: ResultsConfig::default(),
            dev_mode: false,
        }
    }
}

impl Default for LayoutsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LAYOUT_DIR),
            default: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from a YAML document.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads configuration from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded render configuration");
        Ok(config)
    }

    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = path.into();
        self
    }

    /// Replaces the view directories with a single directory.
    pub fn with_view_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.views = vec![dir.into()];
        self
    }

    /// Appends a view directory.
    pub fn add_view_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.views.push(dir.into());
        self
    }

    pub fn with_layout_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.layouts.path = dir.into();
        self
    }

    /// Sets the default layout for a request format (`"html"`, `"json"`, ...).
    pub fn with_default_layout(mut self, format: impl Into<String>, layout: impl Into<String>) -> Self {
        self.layouts.default.insert(format.into(), layout.into());
        self
    }

    pub fn with_chunked(mut self, chunked: bool) -> Self {
        self.results.chunked = chunked;
        self
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// The default layout for `format`, if one is configured and non-empty.
    pub fn default_layout(&self, format: &str) -> Option<&str> {
        self.layouts
            .default
            .get(format)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Whether results should stream into the response.
    ///
    /// Development mode always buffers so that errors render cleanly.
    pub fn streams_results(&self) -> bool {
        self.results.chunked && !self.dev_mode
    }

    /// The layout directory resolved against the base path.
    pub fn layout_dir(&self) -> PathBuf {
        self.base_path.join(&self.layouts.path)
    }

    /// The view directories resolved against the base path.
    pub fn view_dirs(&self) -> Vec<PathBuf> {
        self.views.iter().map(|dir| self.base_path.join(dir)).collect()
    }
}
