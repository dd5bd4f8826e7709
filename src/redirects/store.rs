//! Redirect store contract and error taxonomy.

use async_trait::async_trait;
use thiserror::Error;

use crate::redirects::rule::{RedirectRule, RuleId, RuleStats};

/// Broad category of a [`StoreError`], used by callers to pick a rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Storage,
}

/// Every expected failure of a store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Old or new path is blank.
    #[error("both old path and new path are required")]
    EmptyPath,

    /// Old and new path are equal after normalization.
    #[error("old path and new path cannot be the same")]
    SamePath,

    /// Another rule already owns this canonical old path.
    #[error("a redirect for {0} already exists")]
    DuplicatePath(String),

    #[error("redirect {0} not found")]
    NotFound(RuleId),

    /// Backing store I/O failure.
    #[error("storage failure: {0}")]
    Storage(#[source] sqlx::Error),

    #[error("migration failure: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyPath | Self::SamePath => ErrorKind::Validation,
            Self::DuplicatePath(_) => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) | Self::Migration(_) => ErrorKind::Storage,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicatePath(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err)
    }
}

/// Owner of the redirect rule set.
///
/// Every mutating operation is atomic with respect to the `old_path`
/// uniqueness check; implementations enforce it in the storage layer.
#[async_trait]
pub trait RedirectStore: Send + Sync + 'static {
    /// Validate, normalize and insert a new active rule.
    async fn create(&self, old_raw: &str, new_raw: &str) -> Result<RuleId, StoreError>;

    /// Replace both paths of an existing rule.
    async fn update(&self, id: RuleId, old_raw: &str, new_raw: &str) -> Result<(), StoreError>;

    /// Flip the active flag and return its new value.
    async fn toggle_active(&self, id: RuleId) -> Result<bool, StoreError>;

    async fn delete(&self, id: RuleId) -> Result<(), StoreError>;

    /// Remove every rule, returning how many were deleted.
    async fn clear_all(&self) -> Result<u64, StoreError>;

    /// All rules, most recently created first.
    async fn list(&self) -> Result<Vec<RedirectRule>, StoreError>;

    async fn get(&self, id: RuleId) -> Result<RedirectRule, StoreError>;

    async fn stats(&self) -> Result<RuleStats, StoreError>;

    /// Exact match on a canonical old path, active rules only.
    async fn lookup_active(&self, old_path: &str) -> Result<Option<RedirectRule>, StoreError>;

    /// Whether any rule (active or not) owns `old_path`, optionally ignoring one id.
    async fn exists_by_old_path(
        &self,
        old_path: &str,
        exclude: Option<RuleId>,
    ) -> Result<bool, StoreError>;
}
