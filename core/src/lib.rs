//! Pure audit logic for cookiescope.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`classifier`] | Root-domain scope check and tracking-signature lookup |
//! | [`remediation`] | Fix recommendation selected from offending names |
//! | [`sites`] | Site list parsing and URL normalization |
//! | [`row`] | Fixed-column report rows |
//!
//! Nothing here touches the browser or the network; everything is safe to call
//! from any number of workers at once.

pub mod classifier;
pub mod remediation;
pub mod row;
pub mod sites;

pub use classifier::{Classifier, OffendingSummary, SuspectTable};
pub use cookiescope_types::DEFAULT_ROOT_DOMAIN;
pub use remediation::{NO_ACTION, RemediationBranch, RemediationError, RemediationRules};
pub use row::{REPORT_HEADER, ReportRow, render_row};
pub use sites::{SiteListError, normalize_url, parse_site_list, read_site_list};
