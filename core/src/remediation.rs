//! Fix recommendations for sites that leak cookies onto the root domain.

use thiserror::Error;
use url::Url;

pub const NO_ACTION: &str = "No action needed";

#[derive(Debug, Error)]
pub enum RemediationError {
    #[error("invalid site URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("site URL '{url}' has no host")]
    MissingHost { url: String },
}

/// Which recommendation a set of offending names selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationBranch {
    NoAction,
    GoogleAnalytics,
    SubdomainScope,
}

#[derive(Debug, Clone)]
pub struct RemediationRules {
    root_domain: String,
}

impl RemediationRules {
    #[must_use]
    pub fn new(root_domain: &str) -> Self {
        Self {
            root_domain: root_domain.trim().trim_start_matches('.').to_string(),
        }
    }

    /// Recommendation for `offending_names` found on `site_url`.
    ///
    /// The host is extracted first, so a malformed URL is an error even when
    /// nothing offending was found.
    pub fn remediate<S: AsRef<str>>(
        &self,
        offending_names: &[S],
        site_url: &str,
    ) -> Result<String, RemediationError> {
        let host = extract_host(site_url)?;
        let text = match select_branch(offending_names) {
            RemediationBranch::NoAction => NO_ACTION.to_string(),
            RemediationBranch::GoogleAnalytics => format!(
                "Update GA/gtag cookie scope: set cookie_domain to {host} in your GA4 \
                 Configuration tag (GTM) or gtag config, remove legacy UA tags or GA Settings \
                 that force cookieDomain=.{root}, publish, then verify with CookieCutter",
                root = self.root_domain
            ),
            RemediationBranch::SubdomainScope => format!(
                "Scope cookies to subdomain {host}: audit GTM/gtag or app code to avoid \
                 setting cookies on .{root}, publish changes, then verify with CookieCutter",
                root = self.root_domain
            ),
        };
        Ok(text)
    }
}

/// First matching rule wins: empty, then any GA-family name, then generic.
#[must_use]
pub fn select_branch<S: AsRef<str>>(offending_names: &[S]) -> RemediationBranch {
    if offending_names.is_empty() {
        return RemediationBranch::NoAction;
    }
    let is_ga = offending_names.iter().any(|name| {
        let name = name.as_ref();
        name.starts_with("_ga") || name == "_gid" || name.starts_with("_gat")
    });
    if is_ga {
        RemediationBranch::GoogleAnalytics
    } else {
        RemediationBranch::SubdomainScope
    }
}

fn extract_host(site_url: &str) -> Result<String, RemediationError> {
    let parsed = Url::parse(site_url).map_err(|source| RemediationError::InvalidUrl {
        url: site_url.to_string(),
        source,
    })?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| RemediationError::MissingHost {
            url: site_url.to_string(),
        })
}
