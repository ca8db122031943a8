//! Site list parsing and URL normalization.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cookiescope_types::SiteTask;
use thiserror::Error;

const COMMENT_MARKER: char = '#';
const DEFAULT_SCHEME_PREFIX: &str = "https://";

#[derive(Debug, Error)]
pub enum SiteListError {
    #[error("failed to read site list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Turn site-list text into tasks, one per non-blank, non-comment line.
///
/// Lines are trimmed before filtering. Sequence indices count only the kept
/// lines.
#[must_use]
pub fn parse_site_list(content: &str) -> Vec<SiteTask> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .enumerate()
        .map(|(index, line)| SiteTask::new(line, index))
        .collect()
}

pub fn read_site_list(path: &Path) -> Result<Vec<SiteTask>, SiteListError> {
    let content = fs::read_to_string(path).map_err(|source| SiteListError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tasks = parse_site_list(&content);
    tracing::debug!(path = %path.display(), sites = tasks.len(), "Site list loaded");
    Ok(tasks)
}

/// Prefix `https://` unless the input already names an http(s) scheme.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    if has_http_scheme(raw) {
        raw.to_string()
    } else {
        format!("{DEFAULT_SCHEME_PREFIX}{raw}")
    }
}

fn has_http_scheme(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
