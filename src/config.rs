use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

use crate::map::declutter::DeclutterPolicy;
use crate::overrides::DEFAULT_NAMESPACE;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedCfg {
    pub url: Option<String>,
    pub path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for FeedCfg {
    fn default() -> Self {
        Self {
            url: None,
            path: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverridesCfg {
    pub dir: PathBuf,
    pub namespace: String,
}

impl Default for OverridesCfg {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".listing-map"),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Initial camera and search focus zoom
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewCfg {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    pub focus_zoom: f64,
}

impl Default for ViewCfg {
    fn default() -> Self {
        // Lublin city centre
        Self {
            center_lat: 51.2465,
            center_lon: 22.5684,
            zoom: 13.0,
            focus_zoom: 17.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub feed: FeedCfg,
    pub overrides: OverridesCfg,
    pub view: ViewCfg,
    pub declutter: DeclutterPolicy,
}

impl MapConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
