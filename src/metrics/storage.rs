//! Flat-file storage metrics: whole-table rewrites, read fallbacks and
//! rows skipped during conversion.

use crate::metrics::{phase_metric, AreaMetrics, MetricDoc};

pub struct StorageMetrics;

impl StorageMetrics {
    pub fn record_table_written(table: &str, rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "storage", "table_writes"), "table" => table.to_string())
            .increment(1);
        ::metrics::counter!(phase_metric!(counter, "storage", "rows_written"), "table" => table.to_string())
            .increment(rows as u64);
    }

    pub fn record_read_fallback(table: &str) {
        ::metrics::counter!(phase_metric!(counter, "storage", "read_fallbacks"), "table" => table.to_string())
            .increment(1);
    }

    pub fn record_row_skipped(table: &str) {
        ::metrics::counter!(phase_metric!(counter, "storage", "rows_skipped"), "table" => table.to_string())
            .increment(1);
    }
}

impl AreaMetrics for StorageMetrics {
    fn register_metrics() {
        use metrics::counter;

        let _ = counter!(phase_metric!(counter, "storage", "table_writes"));
        let _ = counter!(phase_metric!(counter, "storage", "rows_written"));
        let _ = counter!(phase_metric!(counter, "storage", "read_fallbacks"));
        let _ = counter!(phase_metric!(counter, "storage", "rows_skipped"));
    }

    fn area_name() -> &'static str {
        "storage"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "storage", "table_writes"),
                help: "Whole-table rewrites of the containers or ships file",
            },
            MetricDoc {
                name: phase_metric!(counter, "storage", "rows_written"),
                help: "Rows written across all table rewrites",
            },
            MetricDoc {
                name: phase_metric!(counter, "storage", "read_fallbacks"),
                help: "Reads that degraded to an empty table because the file was missing or unreadable",
            },
            MetricDoc {
                name: phase_metric!(counter, "storage", "rows_skipped"),
                help: "Stored rows skipped because they could not be converted to an entity",
            },
        ]
    }
}
