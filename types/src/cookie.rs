//! Harvested cookie records.

use serde::{Deserialize, Serialize};

/// One cookie as reported by the browser after a page load.
///
/// Absent attributes are omitted from the serialized form rather than written
/// as `null`, so the report blob only carries what the browser actually set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub path: String,
    /// Expiry as seconds since the Unix epoch. `None` for session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
    #[serde(default)]
    pub session: bool,
    #[serde(default)]
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<CookiePriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_scheme: Option<SourceScheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<i64>,
}

impl CookieRecord {
    /// Minimal record with the given name and domain; all other attributes default.
    #[must_use]
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            domain: domain.into(),
            path: "/".to_string(),
            expires: None,
            http_only: false,
            secure: false,
            same_site: None,
            session: true,
            size: 0,
            priority: None,
            source_scheme: None,
            source_port: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Drop attributes the browser reports as placeholders.
    ///
    /// DevTools reports session cookies with a non-positive expiry; those are
    /// treated as having no expiry at all.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.expires.is_some_and(|ts| ts <= 0.0 || !ts.is_finite()) {
            self.expires = None;
        }
        self
    }
}

/// `SameSite` attribute as reported by DevTools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CookiePriority {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

/// Scheme of the origin that set the cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceScheme {
    Unset,
    NonSecure,
    Secure,
    #[serde(other)]
    Unknown,
}
