use crate::metrics::{phase_metric, AreaMetrics, MetricDoc};

pub struct TrackingMetrics;

impl TrackingMetrics {
    pub fn record_arrival() {
        ::metrics::counter!(phase_metric!(counter, "tracking", "arrivals")).increment(1);
    }

    pub fn record_crane_assigned() {
        ::metrics::counter!(phase_metric!(counter, "tracking", "crane_assignments")).increment(1);
    }

    pub fn record_no_crane_available() {
        ::metrics::counter!(phase_metric!(counter, "tracking", "crane_pool_exhausted")).increment(1);
    }

    pub fn record_container_completed() {
        ::metrics::counter!(phase_metric!(counter, "tracking", "containers_completed")).increment(1);
    }

    /// A use case absorbed an error and reported failure to its caller
    pub fn record_operation_failed(operation: &str) {
        ::metrics::counter!(phase_metric!(counter, "tracking", "operations_failed"), "operation" => operation.to_string())
            .increment(1);
    }
}

impl AreaMetrics for TrackingMetrics {
    fn register_metrics() {
        use metrics::counter;

        let _ = counter!(phase_metric!(counter, "tracking", "arrivals"));
        let _ = counter!(phase_metric!(counter, "tracking", "crane_assignments"));
        let _ = counter!(phase_metric!(counter, "tracking", "crane_pool_exhausted"));
        let _ = counter!(phase_metric!(counter, "tracking", "containers_completed"));
        let _ = counter!(phase_metric!(counter, "tracking", "operations_failed"));
    }

    fn area_name() -> &'static str {
        "tracking"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "tracking", "arrivals"),
                help: "Containers processed as arriving",
            },
            MetricDoc {
                name: phase_metric!(counter, "tracking", "crane_assignments"),
                help: "Cranes assigned to docked containers",
            },
            MetricDoc {
                name: phase_metric!(counter, "tracking", "crane_pool_exhausted"),
                help: "Crane requests refused because every crane was busy",
            },
            MetricDoc {
                name: phase_metric!(counter, "tracking", "containers_completed"),
                help: "Containers that reached 100% unloading progress",
            },
            MetricDoc {
                name: phase_metric!(counter, "tracking", "operations_failed"),
                help: "Tracking operations that reported failure",
            },
        ]
    }
}
