//! Streaming CSV → redirect store import.
//!
//! Parsing runs on a blocking thread and hands rows to the async side over
//! a bounded channel, so at most `ROW_BUFFER` rows are held at once.

use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::import::lines::PhysicalLines;
use crate::import::report::{ImportAbort, ImportOptions, ImportReport, RejectReason};
use crate::observability::metrics;
use crate::redirects::path::normalize;
use crate::redirects::store::{ErrorKind, RedirectStore, StoreError};

const PATH_OLD: &str = "path_old";
const PATH_NEW: &str = "path_new";
const STATUS: &str = "status";

/// The only status value eligible for import.
const IMPORTABLE_STATUS: &str = "301";

/// Parsed rows waiting for the store.
const ROW_BUFFER: usize = 64;

/// Header positions of the three required columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    old: usize,
    new: usize,
    status: usize,
}

/// Locate required columns by name. Cells are trimmed and lower-cased;
/// extra columns and column order do not matter.
fn locate_columns(header: &StringRecord) -> Result<Columns, ImportAbort> {
    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let cell = if i == 0 { cell.trim_start_matches('\u{feff}') } else { cell };
            cell.trim().to_lowercase()
        })
        .collect();
    let find = |wanted: &str| names.iter().position(|name| name == wanted);

    match (find(PATH_OLD), find(PATH_NEW), find(STATUS)) {
        (Some(old), Some(new), Some(status)) => Ok(Columns { old, new, status }),
        (old, new, status) => {
            let columns = [(PATH_OLD, old), (PATH_NEW, new), (STATUS, status)]
                .into_iter()
                .filter(|(_, position)| position.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            Err(ImportAbort::MissingColumns { columns })
        }
    }
}

/// A short row yields an empty string for any absent field.
fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}

/// A blank source line, as rewritten by `PhysicalLines`.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record[0].trim().is_empty()
}

fn line_of(position: Option<&csv::Position>) -> u64 {
    position.map(csv::Position::line).unwrap_or_default()
}

/// Errors that leave the reader in no state to continue.
fn is_fatal(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(_) | csv::ErrorKind::Seek)
}

/// One step of the blocking reader's output after the header.
#[derive(Debug)]
enum RowEvent {
    Record { line: u64, record: StringRecord },
    Malformed { line: u64, detail: String },
    Stopped(ImportAbort),
}

/// Blocking half of an import: parse `source`, report the header, then
/// send rows until the input ends or the receiver goes away.
fn read_csv<R: Read>(
    source: R,
    header: oneshot::Sender<Result<Columns, ImportAbort>>,
    rows: mpsc::Sender<RowEvent>,
) {
    let mut records = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(PhysicalLines::new(source))
        .into_records();

    let columns = match records.next() {
        Some(Ok(record)) if is_blank(&record) => Err(ImportAbort::MissingHeader),
        Some(Ok(record)) => locate_columns(&record),
        Some(Err(e)) => Err(ImportAbort::Unreadable { detail: e.to_string() }),
        None => Err(ImportAbort::MissingHeader),
    };
    let found = columns.is_ok();
    if header.send(columns).is_err() || !found {
        return;
    }

    for result in records {
        let (event, last) = match result {
            Ok(record) => (
                RowEvent::Record { line: line_of(record.position()), record },
                false,
            ),
            Err(e) if is_fatal(&e) => {
                (RowEvent::Stopped(ImportAbort::Unreadable { detail: e.to_string() }), true)
            }
            Err(e) => (
                RowEvent::Malformed { line: line_of(e.position()), detail: e.to_string() },
                false,
            ),
        };
        if rows.blocking_send(event).is_err() || last {
            return;
        }
    }
}

/// Turns CSV rows into redirect rules, one row at a time.
///
/// Only structural problems abort the run. Every data row ends up either
/// imported or skipped; a failed insert never stops the rows after it.
#[derive(Clone)]
pub struct CsvImporter {
    store: Arc<dyn RedirectStore>,
}

impl CsvImporter {
    pub fn new(store: Arc<dyn RedirectStore>) -> Self {
        Self { store }
    }

    /// Import redirects from `source`, read on a blocking thread.
    ///
    /// Returns `Err` only when clearing existing rules fails, which happens
    /// before any row is read.
    pub async fn import<R>(&self, source: R, options: ImportOptions) -> Result<ImportReport, StoreError>
    where
        R: Read + Send + 'static,
    {
        if options.clear_existing {
            let removed = self.store.clear_all().await?;
            tracing::info!(removed, "Cleared existing redirects before import");
        }

        let (header_tx, header_rx) = oneshot::channel();
        let (rows_tx, mut rows) = mpsc::channel(ROW_BUFFER);
        let reader = tokio::task::spawn_blocking(move || read_csv(source, header_tx, rows_tx));

        let header = header_rx.await.unwrap_or_else(|_| {
            Err(ImportAbort::Unreadable { detail: "CSV reader stopped".to_string() })
        });
        let columns = match header {
            Ok(columns) => columns,
            Err(abort) => {
                tracing::warn!(reason = %abort, "CSV import aborted");
                return Ok(ImportReport::aborted(abort));
            }
        };

        let mut report = ImportReport::default();
        while let Some(event) = rows.recv().await {
            match event {
                RowEvent::Record { line, record } => {
                    match self.import_row(&record, columns, options).await {
                        Ok(()) => report.record_imported(),
                        Err(reason) => {
                            tracing::debug!(line, ?reason, "CSV row skipped");
                            report.record_skipped(line, reason);
                        }
                    }
                }
                RowEvent::Malformed { line, detail } => {
                    report.record_skipped(line, RejectReason::Malformed { detail });
                }
                RowEvent::Stopped(abort) => {
                    tracing::warn!(reason = %abort, rows = report.rows(), "CSV import stopped early");
                    report.abort = Some(abort);
                }
            }
        }

        if let Err(e) = reader.await {
            tracing::error!(error = %e, "CSV reader task failed");
            if report.abort.is_none() {
                report.abort = Some(ImportAbort::Unreadable { detail: e.to_string() });
            }
        }

        metrics::record_import(report.imported, report.skipped);
        tracing::info!(
            imported = report.imported,
            skipped = report.skipped,
            clear_existing = options.clear_existing,
            skip_duplicates = options.skip_duplicates,
            "CSV import finished"
        );
        Ok(report)
    }

    async fn import_row(
        &self,
        record: &StringRecord,
        columns: Columns,
        options: ImportOptions,
    ) -> Result<(), RejectReason> {
        if is_blank(record) {
            return Err(RejectReason::BlankLine);
        }
        let old_raw = field(record, columns.old);
        let new_raw = field(record, columns.new);
        let status = field(record, columns.status);

        if status != IMPORTABLE_STATUS {
            return Err(RejectReason::UnsupportedStatus { status: status.to_string() });
        }
        if old_raw.is_empty() || new_raw.is_empty() {
            return Err(RejectReason::EmptyPath);
        }

        let old_path = normalize(old_raw);
        let new_path = normalize(new_raw);

        if options.skip_duplicates {
            match self.store.exists_by_old_path(&old_path, None).await {
                Ok(true) => return Err(RejectReason::Duplicate),
                Ok(false) => {}
                Err(e) => return Err(reject_reason(&e)),
            }
        }

        self.store
            .create(&old_path, &new_path)
            .await
            .map(|_| ())
            .map_err(|e| reject_reason(&e))
    }
}

fn reject_reason(err: &StoreError) -> RejectReason {
    match err {
        StoreError::EmptyPath => RejectReason::EmptyPath,
        StoreError::SamePath => RejectReason::SamePath,
        StoreError::DuplicatePath(_) => RejectReason::Duplicate,
        other => {
            if other.kind() == ErrorKind::Storage {
                tracing::error!(error = %other, "Storage failure during CSV import");
            }
            RejectReason::StorageFailure
        }
    }
}
