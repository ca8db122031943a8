//! On-disk TOML configuration.
//!
//! Every field is optional; missing values fall back to the defaults applied
//! in [`crate::resolved`].

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cookiescope_types::Separator;

use crate::ConfigError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CookiescopeConfig {
    pub audit: Option<AuditSection>,
    pub output: Option<OutputSection>,
    pub browser: Option<BrowserSection>,
    pub scope: Option<ScopeSection>,
    pub classifier: Option<ClassifierSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditSection {
    /// Site list path.
    pub sites: Option<PathBuf>,
    /// Report output path.
    pub output: Option<PathBuf>,
    /// Seconds to wait after page load before reading cookies.
    pub delay_seconds: Option<u64>,
    /// Navigation timeout in seconds.
    pub timeout_seconds: Option<u64>,
    pub headless: Option<bool>,
    /// Check the cookie-cleanup confirmation page after each site.
    pub verify: Option<bool>,
    pub separator: Option<Separator>,
    /// Worker pool size. Values below 1 are raised to 1.
    pub workers: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub color: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrowserSection {
    /// Chromium executable. Overridden by `BROWSER_PATH` when that exists.
    pub executable: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeSection {
    pub root_domain: Option<String>,
    pub verification_url: Option<String>,
    pub verification_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierSection {
    /// Extra exact-name signatures: cookie name to service label.
    #[serde(default)]
    pub literals: BTreeMap<String, String>,
    /// Extra prefix signatures, tried after the built-in prefixes in order.
    #[serde(default)]
    pub prefixes: Vec<PrefixRule>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrefixRule {
    pub prefix: String,
    pub label: String,
}

impl CookiescopeConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the per-user file is read if
    /// present and `Ok(None)` is returned otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Option<Self>, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: Box::new(err),
                })
            }
        }
    }
}

/// Per-user config location: `~/.cookiescope/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cookiescope").join("config.toml"))
}
