use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_RESOURCE: &str = "users";

static RESOURCE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex"));

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Where the user collection lives
#[derive(Debug, Clone, Serialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            resource: DEFAULT_RESOURCE.to_string(),
            timeout_ms: None,
        }
    }
}

/// Session journal settings
#[derive(Debug, Clone, Serialize)]
pub struct JournalConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: Path::new(".roster").join("sessions"),
        }
    }
}

/// Effective configuration after all layers are applied
#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    pub remote: RemoteConfig,
    pub journal: JournalConfig,
}

/// One config file. Unset keys leave lower layers alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default)]
    pub remote: RemoteLayer,
    #[serde(default)]
    pub journal: JournalLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteLayer {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalLayer {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl ConfigLayer {
    /// Load one layer from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let layer: ConfigLayer = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(layer)
    }
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.roster/config.local.toml) > project (.roster/config.toml) > user (~/.roster/config.toml)
    pub fn load() -> Result<Self> {
        Self::load_layers(dirs::home_dir().as_deref(), Path::new("."))
    }

    /// Layered load rooted at explicit directories
    pub fn load_layers(home: Option<&Path>, project: &Path) -> Result<Self> {
        let mut config = Self::default();

        let mut paths = Vec::new();
        if let Some(home) = home {
            paths.push(home.join(".roster").join("config.toml"));
        }
        paths.push(project.join(".roster").join("config.toml"));
        paths.push(project.join(".roster").join("config.local.toml"));

        for path in paths {
            if path.exists() {
                config.merge(ConfigLayer::load_from(&path)?);
            }
        }

        Ok(config)
    }

    /// Load configuration from a single file on top of the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(ConfigLayer::load_from(path)?);
        Ok(config)
    }

    /// Merge a layer into this config (layer takes priority where set)
    pub fn merge(&mut self, layer: ConfigLayer) {
        if let Some(base_url) = layer.remote.base_url {
            self.remote.base_url = base_url;
        }
        if let Some(resource) = layer.remote.resource {
            self.remote.resource = resource;
        }
        if layer.remote.timeout_ms.is_some() {
            self.remote.timeout_ms = layer.remote.timeout_ms;
        }
        if let Some(enabled) = layer.journal.enabled {
            self.journal.enabled = enabled;
        }
        if let Some(dir) = layer.journal.dir {
            self.journal.dir = dir;
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let url = self.remote.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ValidationError {
                field: "remote.base_url".to_string(),
                message: format!("Expected an http(s) URL, got '{}'", url),
            });
        }

        if !RESOURCE_SEGMENT.is_match(&self.remote.resource) {
            errors.push(ValidationError {
                field: "remote.resource".to_string(),
                message: format!(
                    "Must be a single path segment of letters, digits, '-' or '_', got '{}'",
                    self.remote.resource
                ),
            });
        }

        if self.remote.timeout_ms == Some(0) {
            errors.push(ValidationError {
                field: "remote.timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
