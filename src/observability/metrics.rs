//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirect_lookups_total` (counter): resolver outcomes by `outcome` (hit, miss, error)
//! - `redirect_admin_mutations_total` (counter): admin writes by `op` and `result`
//! - `redirect_import_rows_total` (counter): CSV rows by `outcome` (imported, skipped)
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_lookup(outcome: &'static str) {
    metrics::counter!("redirect_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_mutation(op: &'static str, result: &'static str) {
    metrics::counter!("redirect_admin_mutations_total", "op" => op, "result" => result)
        .increment(1);
}

pub fn record_import(imported: u64, skipped: u64) {
    metrics::counter!("redirect_import_rows_total", "outcome" => "imported").increment(imported);
    metrics::counter!("redirect_import_rows_total", "outcome" => "skipped").increment(skipped);
}
