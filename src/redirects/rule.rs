//! Redirect rule data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::redirects::path::normalize;
use crate::redirects::store::StoreError;

/// The only status code this system persists or serves.
pub const PERMANENT_REDIRECT: u16 = 301;

/// Store-assigned identifier of a rule. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub i64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted old-path → new-path mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectRule {
    pub id: RuleId,
    /// Canonical source path, unique across all rules.
    pub old_path: String,
    /// Canonical destination path, joined with the site base URL when served.
    pub new_path: String,
    pub status: u16,
    pub created_at: DateTime<Utc>,
    /// Inactive rules are kept but never matched.
    pub active: bool,
}

/// Aggregate counts shown on the admin status page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuleStats {
    pub total: u64,
    pub active: u64,
}

/// Validate a raw path pair and return both paths in canonical form.
///
/// Blank input is rejected before normalization, since the normalizer
/// would otherwise turn it into `/`.
pub fn validate_paths(old_raw: &str, new_raw: &str) -> Result<(String, String), StoreError> {
    if old_raw.trim().is_empty() || new_raw.trim().is_empty() {
        return Err(StoreError::EmptyPath);
    }

    let old_path = normalize(old_raw);
    let new_path = normalize(new_raw);

    if old_path.is_empty() || new_path.is_empty() {
        return Err(StoreError::EmptyPath);
    }
    if old_path == new_path {
        return Err(StoreError::SamePath);
    }

    Ok((old_path, new_path))
}
