//! Core domain types for cookiescope.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod audit;
mod cookie;
mod ids;
mod text;

pub use audit::{
    AuditError, AuditOutcome, AuditResult, ErrorKind, OffendingStatus, SiteFindings, SiteTask,
    VERIFICATION_EXCERPT_MAX_CHARS, Verification,
};
pub use cookie::{CookiePriority, CookieRecord, SameSite, SourceScheme};
pub use ids::WorkerId;
pub use text::truncate_chars;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Defaults
// ============================================================================

/// Institution-wide domain that offending cookies are scoped to.
pub const DEFAULT_ROOT_DOMAIN: &str = "umn.edu";

/// Browser sessions run side by side when nothing else is configured.
pub const DEFAULT_WORKERS: usize = 3;

// ============================================================================
// Cell separators
// ============================================================================

/// How multi-value report cells are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    #[default]
    Newline,
    Comma,
    Pipe,
}

#[derive(Debug, Error)]
#[error("unknown separator '{0}' (expected newline, comma, or pipe)")]
pub struct SeparatorParseError(String);

impl Separator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Separator::Newline => "newline",
            Separator::Comma => "comma",
            Separator::Pipe => "pipe",
        }
    }

    /// The literal text placed between joined values.
    #[must_use]
    pub const fn joiner(self) -> &'static str {
        match self {
            Separator::Newline => "\n",
            Separator::Comma => ", ",
            Separator::Pipe => "|",
        }
    }

    #[must_use]
    pub fn join(self, values: &[String]) -> String {
        text::join_with(values, self.joiner())
    }
}

impl FromStr for Separator {
    type Err = SeparatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newline" => Ok(Separator::Newline),
            "comma" => Ok(Separator::Comma),
            "pipe" => Ok(Separator::Pipe),
            other => Err(SeparatorParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
