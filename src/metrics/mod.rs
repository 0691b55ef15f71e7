//! Metrics for the tracker, grouped by area.
//!
//! Each area (storage, tracking, insights) owns a submodule that records its
//! counters. Names follow `chancay_{area}_{name}_{type}` via [`phase_metric!`].

pub mod insights;
pub mod storage;
pub mod tracking;

pub use insights::InsightMetrics;
pub use storage::StorageMetrics;
pub use tracking::TrackingMetrics;

use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and pre-register every counter.
///
/// Idempotent. The handle is kept so `/metrics` can render a snapshot in-process.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Prometheus handle was already set");
            }
            register_all_metrics();
            info!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    }
}

/// Render the current snapshot in Prometheus text format, if a recorder is installed.
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Trait for area-specific metric collections
pub trait AreaMetrics {
    /// Pre-register all counters so they appear before first use
    fn register_metrics();

    fn area_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub help: &'static str,
}

fn register_all_metrics() {
    let mut total = 0;
    total += register_area::<StorageMetrics>();
    total += register_area::<TrackingMetrics>();
    total += register_area::<InsightMetrics>();
    info!("Registered {} metrics", total);
}

fn register_area<T: AreaMetrics>() -> usize {
    T::register_metrics();
    let docs = T::metrics_documentation();
    tracing::debug!("Registered {} metrics for area '{}'", docs.len(), T::area_name());
    docs.len()
}

/// Builds a metric name: `chancay_{area}_{name}_total` for counters.
macro_rules! phase_metric {
    (counter, $area:literal, $name:literal) => {
        concat!("chancay_", $area, "_", $name, "_total")
    };
}

pub(crate) use phase_metric;
