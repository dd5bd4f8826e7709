//! Canonical path normalization.
//!
//! # Rules
//! - Surrounding whitespace is trimmed
//! - A leading `/` is enforced on non-empty input
//! - Trailing slashes are stripped, except for the root path `/`
//!
//! Every stored path and every lookup key goes through [`normalize`], so
//! uniqueness and equality are always decided on canonical form.

/// Normalize a raw path into its canonical form.
///
/// Never fails: empty or all-slash input collapses to `/`.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();

    let mut path = String::with_capacity(trimmed.len() + 1);
    if !trimmed.is_empty() && !trimmed.starts_with('/') {
        path.push('/');
    }
    path.push_str(trimmed);

    let stripped = path.trim_end_matches('/');
    if stripped.is_empty() {
        "/".to_string()
    } else {
        stripped.to_string()
    }
}
