//! CSV bulk import subsystem.
//!
//! # Data Flow
//! ```text
//! CSV byte stream
//!     → lines.rs (terminators → `\n`, blank lines kept as one-field records)
//!     → pipeline.rs (blocking reader: header → column positions, then one
//!       record at a time over a bounded channel)
//!     → filter: status == "301", both paths non-empty
//!     → redirects::normalize
//!     → optional duplicate skip (exists_by_old_path)
//!     → RedirectStore::create
//!     → report.rs (imported / skipped counts + row reasons)
//! ```
//!
//! # Design Decisions
//! - Missing header or required columns aborts the whole file with `{0, 0}`
//! - Blank lines are data rows and count as skipped
//! - Row failures are local: counted as skipped, never escalated
//! - Each row's insert is its own atomic unit; no lock spans the file

mod lines;
pub mod pipeline;
pub mod report;

pub use pipeline::CsvImporter;
pub use report::{ImportAbort, ImportOptions, ImportReport, RejectReason, RowRejection};
