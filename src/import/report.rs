//! Structured outcome of a CSV import.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Most row rejections kept in a report; counts stay exact past this.
pub const MAX_REPORTED_REJECTIONS: usize = 100;

/// Caller-selected import behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Delete every existing rule before reading the file.
    pub clear_existing: bool,
    /// Silently skip rows whose old path is already taken.
    pub skip_duplicates: bool,
}

/// Why a whole file was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ImportAbort {
    /// The file has no header row.
    MissingHeader,
    /// One or more of `path_old`, `path_new`, `status` is absent from the header.
    MissingColumns { columns: Vec<String> },
    /// The source could not be read.
    Unreadable { detail: String },
}

impl fmt::Display for ImportAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "file has no header row"),
            Self::MissingColumns { columns } => {
                write!(f, "missing required columns: {}", columns.join(", "))
            }
            Self::Unreadable { detail } => write!(f, "could not read file: {detail}"),
        }
    }
}

/// Why a single data row was not imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    BlankLine,
    UnsupportedStatus { status: String },
    EmptyPath,
    SamePath,
    Duplicate,
    Malformed { detail: String },
    StorageFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    /// 1-based line number in the source file.
    pub line: u64,
    #[serde(flatten)]
    pub reason: RejectReason,
}

/// Counts plus per-row detail for one import run.
///
/// `imported + skipped` always equals the number of data rows read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: u64,
    pub skipped: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort: Option<ImportAbort>,
    pub rejections: Vec<RowRejection>,
    /// Set when more rows were rejected than `rejections` holds.
    pub rejections_truncated: bool,
}

impl ImportReport {
    pub fn aborted(abort: ImportAbort) -> Self {
        Self {
            abort: Some(abort),
            ..Self::default()
        }
    }

    pub(crate) fn record_imported(&mut self) {
        self.imported += 1;
    }

    pub(crate) fn record_skipped(&mut self, line: u64, reason: RejectReason) {
        self.skipped += 1;
        if self.rejections.len() < MAX_REPORTED_REJECTIONS {
            self.rejections.push(RowRejection { line, reason });
        } else {
            self.rejections_truncated = true;
        }
    }

    /// Total data rows processed.
    pub fn rows(&self) -> u64 {
        self.imported + self.skipped
    }
}
