//! Rendering audit results as fixed-width report rows.

use cookiescope_types::{AuditOutcome, AuditResult, Separator};

/// Column headers, in output order.
pub const REPORT_HEADER: [&str; 10] = [
    "site",
    "offending?",
    "offending_cookie_count",
    "offending_cookie_names",
    "offending_cookie_sizes",
    "offending_total_size",
    "verification_ok",
    "verification_excerpt",
    "remediation",
    "all_cookies_blob",
];

pub type ReportRow = [String; 10];

/// Render one result. Error rows have the same column count as normal rows.
///
/// Fails only if the cookie blob cannot be serialized.
pub fn render_row(
    result: &AuditResult,
    separator: Separator,
) -> Result<ReportRow, serde_json::Error> {
    let status = result.status().as_str().to_string();
    let row = match &result.outcome {
        AuditOutcome::Completed(findings) => {
            let (verification_ok, excerpt) = match &findings.verification {
                Some(v) => (v.ok.to_string(), v.excerpt.clone()),
                None => (String::new(), String::new()),
            };
            [
                result.site.clone(),
                status,
                findings.offending_count.to_string(),
                separator.join(&findings.offending_names),
                separator.join(&findings.offending_sizes),
                findings.offending_total_size.to_string(),
                verification_ok,
                excerpt,
                findings.remediation.clone(),
                serde_json::to_string(&findings.cookies)?,
            ]
        }
        AuditOutcome::Failed(error) => [
            result.site.clone(),
            status,
            "0".to_string(),
            String::new(),
            String::new(),
            "0".to_string(),
            String::new(),
            String::new(),
            String::new(),
            serde_json::to_string(error)?,
        ],
    };
    Ok(row)
}
