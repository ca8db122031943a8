//! Per-site audit tasks and their results.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cookie::CookieRecord;

/// Maximum number of characters of a verification page body kept in a row.
pub const VERIFICATION_EXCERPT_MAX_CHARS: usize = 4000;

/// One entry of the input site list.
///
/// Created once at startup and consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTask {
    raw_input: String,
    sequence_index: usize,
}

impl SiteTask {
    #[must_use]
    pub fn new(raw_input: impl Into<String>, sequence_index: usize) -> Self {
        Self {
            raw_input: raw_input.into(),
            sequence_index,
        }
    }

    #[must_use]
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// Zero-based position in the filtered site list.
    #[must_use]
    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }
}

/// Classes of per-site failure recorded in error rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Browser could not be started for this worker.
    Launch,
    /// Page load failed (DNS, TLS, connection, protocol).
    Navigation,
    /// Page load exceeded the navigation timeout.
    Timeout,
    /// Cookies could not be read back from the browser.
    CookieRead,
    /// The verification page could not be loaded or read.
    Verification,
    /// The site URL could not be parsed.
    InvalidUrl,
    /// The browser connection went away mid-task.
    SessionLost,
    /// Unexpected failure inside the audit pipeline.
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::Navigation => "navigation",
            Self::Timeout => "timeout",
            Self::CookieRead => "cookie_read",
            Self::Verification => "verification",
            Self::InvalidUrl => "invalid_url",
            Self::SessionLost => "session_lost",
            Self::Internal => "internal",
        }
    }

    /// Whether the worker's browser session must be discarded after this error.
    #[must_use]
    pub const fn is_session_fatal(self) -> bool {
        matches!(self, Self::Launch | Self::SessionLost)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-site failure: kind plus best-effort message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct AuditError {
    #[serde(rename = "error")]
    pub kind: ErrorKind,
    pub message: String,
}

impl AuditError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of checking the cookie-cleanup confirmation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub ok: bool,
    /// Marker text when `ok`, otherwise the leading part of the page body.
    pub excerpt: String,
}

/// Classification output for a site whose pipeline ran to completion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SiteFindings {
    /// Unique offending cookie names, sorted.
    pub offending_names: Vec<String>,
    /// `name:size` for every offending record, in harvest order.
    pub offending_sizes: Vec<String>,
    pub offending_count: usize,
    pub offending_total_size: i64,
    pub verification: Option<Verification>,
    pub remediation: String,
    /// Every harvested cookie, kept for the traceability blob.
    pub cookies: Vec<CookieRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    Completed(SiteFindings),
    Failed(AuditError),
}

/// Value of the `offending?` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffendingStatus {
    Yes,
    No,
    Error,
}

impl OffendingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Error => "error",
        }
    }
}

/// Exactly one of these is produced per [`SiteTask`].
#[derive(Debug, Clone, PartialEq)]
pub struct AuditResult {
    /// Normalized URL of the audited site.
    pub site: String,
    pub sequence_index: usize,
    pub outcome: AuditOutcome,
}

impl AuditResult {
    #[must_use]
    pub fn completed(
        site: impl Into<String>,
        sequence_index: usize,
        findings: SiteFindings,
    ) -> Self {
        Self {
            site: site.into(),
            sequence_index,
            outcome: AuditOutcome::Completed(findings),
        }
    }

    #[must_use]
    pub fn failed(site: impl Into<String>, sequence_index: usize, error: AuditError) -> Self {
        Self {
            site: site.into(),
            sequence_index,
            outcome: AuditOutcome::Failed(error),
        }
    }

    #[must_use]
    pub fn status(&self) -> OffendingStatus {
        match &self.outcome {
            AuditOutcome::Failed(_) => OffendingStatus::Error,
            AuditOutcome::Completed(findings) if findings.offending_count > 0 => {
                OffendingStatus::Yes
            }
            AuditOutcome::Completed(_) => OffendingStatus::No,
        }
    }

    #[must_use]
    pub fn offending_count(&self) -> usize {
        match &self.outcome {
            AuditOutcome::Completed(findings) => findings.offending_count,
            AuditOutcome::Failed(_) => 0,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&AuditError> {
        match &self.outcome {
            AuditOutcome::Failed(err) => Some(err),
            AuditOutcome::Completed(_) => None,
        }
    }
}
