//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resolver, admin handlers, import pipeline
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, Prometheus scrape endpoint)
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) is attached by the HTTP layer and shows up in trace spans
//! - Storage errors are logged here in full; clients only see a generic message

pub mod logging;
pub mod metrics;
