use crate::classifier::ClassifierConfig;
use crate::error::ConfigError;
use crate::extractor::MarkerConvention;
use crate::preview::{PreviewAssets, SandboxPolicy};
use crate::types::ManagedPage;
use serde::{Deserialize, Serialize};
use std::fs;

// Default value functions for serde
fn default_endpoint() -> String {
    "api/page".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

/// Top-level editor configuration, loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Managed pages, in display order
    #[serde(default = "default_pages")]
    pub pages: Vec<ManagedPage>,
    #[serde(default)]
    pub regions: RegionNames,
    #[serde(default)]
    pub markers: MarkerConvention,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub preview: PreviewAssets,
    #[serde(default)]
    pub sandbox: SandboxPolicy,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Names of the two regions every managed page carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionNames {
    pub hero: String,
    pub main: String,
}

impl Default for RegionNames {
    fn default() -> Self {
        Self {
            hero: "hero".to_string(),
            main: "main".to_string(),
        }
    }
}

/// Where the remote retrieval collaborator lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the page API; `None` means only local input is possible
    #[serde(default)]
    pub base_url: Option<String>,
    /// Endpoint path under `base_url`, queried with `?path=<page path>`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_pages() -> Vec<ManagedPage> {
    vec![
        ManagedPage::new("Home", "index.html"),
        ManagedPage::new("About", "about.html"),
        ManagedPage::new("Menu", "menu.html"),
        ManagedPage::new("Events", "events.html"),
        ManagedPage::new("Gallery", "gallery.html"),
        ManagedPage::new("Contact", "contact.html"),
    ]
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pages: default_pages(),
            regions: RegionNames::default(),
            markers: MarkerConvention::default(),
            classifier: ClassifierConfig::default(),
            preview: PreviewAssets::default(),
            sandbox: SandboxPolicy::default(),
            source: SourceConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!(path = p, error = %e, "failed to load config, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Find a managed page by label (case-insensitive) or exact path.
    pub fn find_page(&self, key: &str) -> Result<&ManagedPage, ConfigError> {
        self.pages
            .iter()
            .find(|p| p.path == key || p.label.eq_ignore_ascii_case(key))
            .ok_or_else(|| ConfigError::UnknownPage(key.to_string()))
    }

    /// The page to load when none was requested.
    pub fn default_page(&self) -> Result<&ManagedPage, ConfigError> {
        self.pages.first().ok_or(ConfigError::NoPages)
    }
}
