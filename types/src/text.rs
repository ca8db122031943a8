//! Small pure text helpers.

/// Keep at most `max_chars` characters of `raw`.
///
/// Counts `char`s rather than bytes so multi-byte page content is never split.
#[must_use]
pub fn truncate_chars(raw: &str, max_chars: usize) -> String {
    match raw.char_indices().nth(max_chars) {
        Some((end, _)) => raw[..end].to_string(),
        None => raw.to_string(),
    }
}

/// Join cell values with the given separator string.
#[must_use]
pub(crate) fn join_with(values: &[String], separator: &str) -> String {
    values.join(separator)
}
