use crate::metrics::{phase_metric, AreaMetrics, MetricDoc};

pub struct InsightMetrics;

impl InsightMetrics {
    pub fn record_generated(operation: &str) {
        ::metrics::counter!(phase_metric!(counter, "insights", "generated"), "operation" => operation.to_string())
            .increment(1);
    }

    pub fn record_fallback(operation: &str) {
        ::metrics::counter!(phase_metric!(counter, "insights", "fallbacks"), "operation" => operation.to_string())
            .increment(1);
    }
}

impl AreaMetrics for InsightMetrics {
    fn register_metrics() {
        use metrics::counter;

        let _ = counter!(phase_metric!(counter, "insights", "generated"));
        let _ = counter!(phase_metric!(counter, "insights", "fallbacks"));
    }

    fn area_name() -> &'static str {
        "insights"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "insights", "generated"),
                help: "Insights built from a parsed model reply",
            },
            MetricDoc {
                name: phase_metric!(counter, "insights", "fallbacks"),
                help: "Insights replaced by the basic-mode fallback after a failed generation",
            },
        ]
    }
}
