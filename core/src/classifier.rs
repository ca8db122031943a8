//! Tracking-cookie classification.
//!
//! A cookie is *offending* when it is scoped to the institution-wide root
//! domain (exactly `root` or `.root`) and its name matches a known
//! tracking-service signature. Signatures are an exact-name table checked
//! first, then an ordered prefix table where the first match wins.
//!
//! Tables are immutable once a [`Classifier`] is built, so one instance can be
//! shared by reference across every worker.

use std::collections::HashMap;

use cookiescope_types::{CookieRecord, DEFAULT_ROOT_DOMAIN};

const BUILTIN_LITERALS: &[(&str, &str)] = &[
    ("_fbp", "Facebook"),
    ("_clck", "Microsoft Clarity"),
    ("_clsk", "Microsoft Clarity"),
    ("_gcl_au", "Google AdSense"),
    ("_gid", "Google Analytics"),
    ("__gsas", "Google Adsense"),
    ("OJSSID", "Open Journal System"),
    ("_scid", "Snapchat"),
    ("_scid_r", "Snapchat"),
    ("_sctr", "Snapchat"),
    ("_ttp", "TikTok"),
    ("_tt_enable_cookie", "TikTok"),
    ("_uetvid", "Bing Ads"),
    ("_uetsid", "Bing Ads"),
    ("UMNOJSSID", "UMN Open Journal System"),
];

// Checked in order; the first matching prefix decides the label.
const BUILTIN_PREFIXES: &[(&str, &str)] = &[
    ("_dc_gtm_UA", "Google Analytics"),
    ("_ga", "Google Analytics"),
    ("_hjSessionUser", "Hotjar"),
];

/// Exact-name and prefix signatures mapping cookie names to service labels.
#[derive(Debug, Clone, Default)]
pub struct SuspectTable {
    literals: HashMap<String, String>,
    prefixes: Vec<(String, String)>,
}

impl SuspectTable {
    /// The signatures shipped with cookiescope.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for (name, label) in BUILTIN_LITERALS {
            table = table.with_literal(*name, *label);
        }
        for (prefix, label) in BUILTIN_PREFIXES {
            table = table.with_prefix(*prefix, *label);
        }
        table
    }

    /// Add (or replace) an exact-name signature.
    #[must_use]
    pub fn with_literal(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.literals.insert(name.into(), label.into());
        self
    }

    /// Append a prefix signature after every existing prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>, label: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), label.into()));
        self
    }

    /// Layer configured signatures over this table: literals first, then
    /// prefixes in the order given.
    #[must_use]
    pub fn with_extras(
        mut self,
        literals: &[(String, String)],
        prefixes: &[(String, String)],
    ) -> Self {
        for (name, label) in literals {
            self = self.with_literal(name.as_str(), label.as_str());
        }
        for (prefix, label) in prefixes {
            self = self.with_prefix(prefix.as_str(), label.as_str());
        }
        self
    }
}

/// Offending cookies folded into report-ready values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OffendingSummary {
    /// Unique names, sorted.
    pub names: Vec<String>,
    /// `name:size` per offending record, in harvest order.
    pub sizes: Vec<String>,
    pub count: usize,
    pub total_size: i64,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    root_domain: String,
    dotted_root: String,
    table: SuspectTable,
}

impl Classifier {
    /// Build a classifier for `root_domain`.
    ///
    /// The root is case-folded and a leading dot is ignored, so `".UMN.edu"`
    /// and `"umn.edu"` configure the same scope.
    #[must_use]
    pub fn new(root_domain: &str, table: SuspectTable) -> Self {
        let root_domain = root_domain
            .trim()
            .trim_start_matches('.')
            .to_ascii_lowercase();
        let dotted_root = format!(".{root_domain}");
        Self {
            root_domain,
            dotted_root,
            table,
        }
    }

    #[must_use]
    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// True iff the cookie's domain is exactly the root or the dotted root.
    #[must_use]
    pub fn is_domain_in_scope(&self, cookie: &CookieRecord) -> bool {
        let domain = cookie.domain.to_ascii_lowercase();
        domain == self.root_domain || domain == self.dotted_root
    }

    /// Service label for a cookie name, if it matches a known signature.
    #[must_use]
    pub fn classify(&self, name: &str) -> Option<&str> {
        if let Some(label) = self.table.literals.get(name) {
            return Some(label.as_str());
        }
        self.table
            .prefixes
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix.as_str()))
            .map(|(_, label)| label.as_str())
    }

    #[must_use]
    pub fn is_offending(&self, cookie: &CookieRecord) -> bool {
        self.is_domain_in_scope(cookie) && self.classify(&cookie.name).is_some()
    }

    #[must_use]
    pub fn summarize(&self, cookies: &[CookieRecord]) -> OffendingSummary {
        let offending: Vec<&CookieRecord> =
            cookies.iter().filter(|c| self.is_offending(c)).collect();

        let mut names: Vec<String> = offending.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names.dedup();

        OffendingSummary {
            names,
            sizes: offending
                .iter()
                .map(|c| format!("{}:{}", c.name, c.size))
                .collect(),
            count: offending.len(),
            total_size: offending.iter().map(|c| c.size).sum(),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_DOMAIN, SuspectTable::builtin())
    }
}
