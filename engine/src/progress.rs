//! Per-site status lines and the end-of-run summary.

use std::fmt;
use std::time::{Duration, Instant};

use cookiescope_types::{AuditResult, OffendingStatus};

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub ok: usize,
    pub offending: usize,
    pub errors: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Rows written so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.ok + self.offending + self.errors
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} site(s): {} ok, {} offending, {} error(s) in {:.1}s",
            self.total,
            self.ok,
            self.offending,
            self.errors,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Completion counter owned by the report sink.
#[derive(Debug)]
pub struct ProgressReporter {
    total: usize,
    ok: usize,
    offending: usize,
    errors: usize,
    started: Instant,
}

impl ProgressReporter {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ok: 0,
            offending: 0,
            errors: 0,
            started: Instant::now(),
        }
    }

    /// Count one finished site and log its status line.
    pub fn record(&mut self, result: &AuditResult) {
        let status = result.status();
        match status {
            OffendingStatus::No => self.ok += 1,
            OffendingStatus::Yes => self.offending += 1,
            OffendingStatus::Error => self.errors += 1,
        }

        let line = status_line(self.completed(), self.total, result);
        match result.error() {
            Some(err) => tracing::warn!(kind = %err.kind, "{line}: {}", err.message),
            None => tracing::info!("{line}"),
        }
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.ok + self.offending + self.errors
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total: self.total,
            ok: self.ok,
            offending: self.offending,
            errors: self.errors,
            elapsed: self.started.elapsed(),
        }
    }
}

/// `(k/total) <site> <icon> <status>`.
#[must_use]
pub fn status_line(completed: usize, total: usize, result: &AuditResult) -> String {
    let (icon, status) = match result.status() {
        OffendingStatus::No => ("✅", "ok".to_string()),
        OffendingStatus::Yes => ("⚠️", format!("offending={}", result.offending_count())),
        OffendingStatus::Error => ("❌", "error".to_string()),
    };
    format!("({completed}/{total}) {} {icon} {status}", result.site)
}
