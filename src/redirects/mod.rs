//! Redirect rules subsystem.
//!
//! # Data Flow
//! ```text
//! Admin add/update, CSV import
//!     → path.rs (canonical form)
//!     → rule.rs (validation: empty, same path)
//!     → store.rs / sqlite.rs (unique old_path, CRUD)
//!
//! Inbound request
//!     → resolver.rs (normalize path, lookup active rule)
//!     → 301 + Location, or fall through to normal handling
//! ```
//!
//! # Design Decisions
//! - Exact matching on canonical paths only; no wildcards, no query strings
//! - `old_path` is unique across active and inactive rules alike
//! - Uniqueness is enforced by the storage layer, not by check-then-write

pub mod path;
pub mod resolver;
pub mod rule;
pub mod sqlite;
pub mod store;

pub use path::normalize;
pub use resolver::{redirect_middleware, Redirect, RedirectResolver};
pub use rule::{RedirectRule, RuleId, RuleStats, PERMANENT_REDIRECT};
pub use sqlite::SqliteRedirectStore;
pub use store::{ErrorKind, RedirectStore, StoreError};
