//! Resolved, invariant-safe settings.
//!
//! Converts the optional file configuration plus command-line overrides into
//! concrete values the audit engine can use without further checks.
//! Precedence is: override, then file, then default.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cookiescope_types::{DEFAULT_ROOT_DOMAIN, DEFAULT_WORKERS, Separator};
use url::Url;

use crate::ConfigError;
use crate::file::{ClassifierSection, CookiescopeConfig};

pub const DEFAULT_SITES_PATH: &str = "/data/sites.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "/data/report.csv";
pub const DEFAULT_DELAY_SECONDS: u64 = 4;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 25;
pub const DEFAULT_VERIFICATION_URL: &str = "https://apps.lib.umn.edu/cookiecutter/";
pub const DEFAULT_VERIFICATION_MARKER: &str =
    "No cookies were found that are eligible for deletion.";

/// Environment variable naming a browser executable to prefer.
pub const BROWSER_PATH_ENV: &str = "BROWSER_PATH";
pub const DEFAULT_BROWSER_PATH: &str = "/usr/bin/chromium";

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sites: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub delay_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub headless: Option<bool>,
    pub verify: Option<bool>,
    pub separator: Option<Separator>,
    pub color: Option<bool>,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub sites: PathBuf,
    pub output: PathBuf,
    pub settle_delay: Duration,
    pub navigation_timeout: Duration,
    pub headless: bool,
    pub verification: VerificationPolicy,
    pub separator: Separator,
    pub color: bool,
    /// Always at least 1.
    pub workers: usize,
    pub browser_executable: PathBuf,
    pub root_domain: String,
    pub extra_literals: Vec<(String, String)>,
    pub extra_prefixes: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub enum VerificationPolicy {
    Disabled,
    Enabled(VerificationTarget),
}

/// Confirmation page and the exact text it shows when nothing is left to clean.
#[derive(Debug, Clone)]
pub struct VerificationTarget {
    pub url: Url,
    pub marker: String,
}

impl ResolvedConfig {
    /// Resolve using the real `BROWSER_PATH` environment variable.
    pub fn resolve(
        file: Option<&CookiescopeConfig>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        Self::resolve_with_env(file, overrides, env::var_os(BROWSER_PATH_ENV))
    }

    pub fn resolve_with_env(
        file: Option<&CookiescopeConfig>,
        overrides: &Overrides,
        browser_env: Option<OsString>,
    ) -> Result<Self, ConfigError> {
        let audit = file.and_then(|f| f.audit.as_ref());
        let scope = file.and_then(|f| f.scope.as_ref());

        let sites = overrides
            .sites
            .clone()
            .or_else(|| audit.and_then(|a| a.sites.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SITES_PATH));
        let output = overrides
            .output
            .clone()
            .or_else(|| audit.and_then(|a| a.output.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

        let delay_seconds = overrides
            .delay_seconds
            .or_else(|| audit.and_then(|a| a.delay_seconds))
            .unwrap_or(DEFAULT_DELAY_SECONDS);
        let timeout_seconds = overrides
            .timeout_seconds
            .or_else(|| audit.and_then(|a| a.timeout_seconds))
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
            .max(1);

        let headless = overrides
            .headless
            .or_else(|| audit.and_then(|a| a.headless))
            .unwrap_or(true);
        let verify = overrides
            .verify
            .or_else(|| audit.and_then(|a| a.verify))
            .unwrap_or(true);
        let separator = overrides
            .separator
            .or_else(|| audit.and_then(|a| a.separator))
            .unwrap_or_default();
        let color = overrides
            .color
            .or_else(|| file.and_then(|f| f.output.as_ref()).and_then(|o| o.color))
            .unwrap_or(true);
        let workers = overrides
            .workers
            .or_else(|| audit.and_then(|a| a.workers))
            .unwrap_or(DEFAULT_WORKERS)
            .max(1);

        let root_domain = scope
            .and_then(|s| s.root_domain.clone())
            .unwrap_or_else(|| DEFAULT_ROOT_DOMAIN.to_string());
        if root_domain.trim().trim_start_matches('.').is_empty() {
            return Err(ConfigError::Invalid {
                field: "scope.root_domain",
                message: "must not be empty".to_string(),
            });
        }

        let verification = if verify {
            VerificationPolicy::Enabled(resolve_verification_target(
                scope.and_then(|s| s.verification_url.as_deref()),
                scope.and_then(|s| s.verification_marker.as_deref()),
            )?)
        } else {
            VerificationPolicy::Disabled
        };

        let configured_browser = file
            .and_then(|f| f.browser.as_ref())
            .and_then(|b| b.executable.as_deref());
        let browser_executable = resolve_browser_executable(browser_env, configured_browser);

        let (extra_literals, extra_prefixes) =
            classifier_extras(file.and_then(|f| f.classifier.as_ref()));

        Ok(Self {
            sites,
            output,
            settle_delay: Duration::from_secs(delay_seconds),
            navigation_timeout: Duration::from_secs(timeout_seconds),
            headless,
            verification,
            separator,
            color,
            workers,
            browser_executable,
            root_domain,
            extra_literals,
            extra_prefixes,
        })
    }
}

fn resolve_verification_target(
    url: Option<&str>,
    marker: Option<&str>,
) -> Result<VerificationTarget, ConfigError> {
    let raw_url = url.unwrap_or(DEFAULT_VERIFICATION_URL);
    let url = Url::parse(raw_url).map_err(|e| ConfigError::Invalid {
        field: "scope.verification_url",
        message: format!("{raw_url}: {e}"),
    })?;
    let marker = marker.unwrap_or(DEFAULT_VERIFICATION_MARKER);
    if marker.is_empty() {
        return Err(ConfigError::Invalid {
            field: "scope.verification_marker",
            message: "must not be empty".to_string(),
        });
    }
    Ok(VerificationTarget {
        url,
        marker: marker.to_string(),
    })
}

/// Pick the browser executable.
///
/// The environment override wins only when it names an existing file; a
/// configured path is used the same way; otherwise the fixed default is
/// returned unchecked and launch reports the failure.
#[must_use]
pub fn resolve_browser_executable(
    env_value: Option<OsString>,
    configured: Option<&Path>,
) -> PathBuf {
    if let Some(raw) = env_value.filter(|v| !v.is_empty()) {
        let candidate = PathBuf::from(raw);
        if candidate.exists() {
            return candidate;
        }
        tracing::warn!(
            path = %candidate.display(),
            "{BROWSER_PATH_ENV} does not exist; ignoring"
        );
    }
    if let Some(path) = configured.filter(|p| !p.as_os_str().is_empty()) {
        if path.exists() {
            return path.to_path_buf();
        }
        tracing::warn!(
            path = %path.display(),
            "Configured browser executable does not exist; ignoring"
        );
    }
    PathBuf::from(DEFAULT_BROWSER_PATH)
}

type SignaturePairs = Vec<(String, String)>;

fn classifier_extras(section: Option<&ClassifierSection>) -> (SignaturePairs, SignaturePairs) {
    let Some(section) = section else {
        return (Vec::new(), Vec::new());
    };
    let literals = section
        .literals
        .iter()
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, label)| (name.clone(), label.clone()))
        .collect();
    let prefixes = section
        .prefixes
        .iter()
        .filter(|rule| !rule.prefix.is_empty())
        .map(|rule| (rule.prefix.clone(), rule.label.clone()))
        .collect();
    (literals, prefixes)
}
