//! Path redirect gateway library.
//!
//! Keeps a table of exact old-path → new-path rules, answers matching
//! requests with `301 Moved Permanently`, and exposes admin operations
//! (add, update, toggle, delete, list, CSV import) over HTTP.

pub mod admin;
pub mod config;
pub mod http;
pub mod import;
pub mod lifecycle;
pub mod observability;
pub mod redirects;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use import::{CsvImporter, ImportOptions, ImportReport};
pub use lifecycle::Shutdown;
pub use redirects::{RedirectResolver, RedirectStore, SqliteRedirectStore, StoreError};
