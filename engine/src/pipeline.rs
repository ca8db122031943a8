//! The per-site audit steps.
//!
//! Every step can fail; the first failure ends the task and becomes the
//! task's [`AuditError`]. Nothing here retries.

use std::time::Duration;

use cookiescope_browser::{BrowserSession, SessionError};
use cookiescope_core::{Classifier, RemediationRules};
use cookiescope_types::{
    AuditError, ErrorKind, SiteFindings, VERIFICATION_EXCERPT_MAX_CHARS, Verification,
    truncate_chars,
};
use tokio::time::sleep;

/// Cookie-cleanup confirmation page checked after each site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCheck {
    pub url: String,
    /// Exact text the page shows when no deletable cookies remain.
    pub marker: String,
}

/// Read-only state shared by every worker.
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub classifier: Classifier,
    pub remediation: RemediationRules,
    pub settle_delay: Duration,
    pub verification: Option<VerificationCheck>,
}

impl AuditContext {
    /// Context whose classifier and remediation rules share one root domain.
    #[must_use]
    pub fn new(
        classifier: Classifier,
        settle_delay: Duration,
        verification: Option<VerificationCheck>,
    ) -> Self {
        let remediation = RemediationRules::new(classifier.root_domain());
        Self {
            classifier,
            remediation,
            settle_delay,
            verification,
        }
    }
}

pub(crate) fn session_failure(err: &SessionError) -> AuditError {
    AuditError::new(err.kind(), err.to_string())
}

/// Run the full pipeline for one normalized URL.
pub(crate) async fn audit_site(
    session: &mut dyn BrowserSession,
    url: &str,
    ctx: &AuditContext,
) -> Result<SiteFindings, AuditError> {
    session
        .clear_cookies()
        .await
        .map_err(|e| session_failure(&e))?;
    session.navigate(url).await.map_err(|e| session_failure(&e))?;

    if !ctx.settle_delay.is_zero() {
        sleep(ctx.settle_delay).await;
    }

    let cookies = session
        .read_cookies()
        .await
        .map_err(|e| session_failure(&e))?;
    let summary = ctx.classifier.summarize(&cookies);

    let remediation = ctx
        .remediation
        .remediate(&summary.names, url)
        .map_err(|e| AuditError::new(ErrorKind::InvalidUrl, e.to_string()))?;

    let verification = match &ctx.verification {
        Some(check) => Some(verify(session, check).await?),
        None => None,
    };

    Ok(SiteFindings {
        offending_names: summary.names,
        offending_sizes: summary.sizes,
        offending_count: summary.count,
        offending_total_size: summary.total_size,
        verification,
        remediation,
        cookies,
    })
}

async fn verify(
    session: &mut dyn BrowserSession,
    check: &VerificationCheck,
) -> Result<Verification, AuditError> {
    session
        .navigate(&check.url)
        .await
        .map_err(|e| verification_failure(&e))?;
    let body = session
        .page_body()
        .await
        .map_err(|e| verification_failure(&e))?;

    if body.contains(&check.marker) {
        Ok(Verification {
            ok: true,
            excerpt: check.marker.clone(),
        })
    } else {
        Ok(Verification {
            ok: false,
            excerpt: truncate_chars(&body, VERIFICATION_EXCERPT_MAX_CHARS),
        })
    }
}

// A lost browser stays a session failure so the worker replaces it.
fn verification_failure(err: &SessionError) -> AuditError {
    if err.is_session_fatal() {
        session_failure(err)
    } else {
        AuditError::new(
            ErrorKind::Verification,
            format!("verification page check failed: {err}"),
        )
    }
}
