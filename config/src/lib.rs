//! Configuration for cookiescope.
//!
//! [`CookiescopeConfig`] mirrors the optional TOML file; [`ResolvedConfig`]
//! is what the rest of the application consumes.

mod file;
mod resolved;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use file::{
    AuditSection, BrowserSection, ClassifierSection, CookiescopeConfig, OutputSection,
    PrefixRule, ScopeSection, config_path,
};
pub use cookiescope_types::{DEFAULT_ROOT_DOMAIN, DEFAULT_WORKERS};
pub use resolved::{
    BROWSER_PATH_ENV, DEFAULT_BROWSER_PATH, DEFAULT_DELAY_SECONDS, DEFAULT_OUTPUT_PATH,
    DEFAULT_SITES_PATH, DEFAULT_TIMEOUT_SECONDS, DEFAULT_VERIFICATION_MARKER,
    DEFAULT_VERIFICATION_URL, Overrides, ResolvedConfig, VerificationPolicy, VerificationTarget,
    resolve_browser_executable,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },
    #[error("invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => {
                Some(path.as_path())
            }
            ConfigError::Invalid { .. } => None,
        }
    }
}
