use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::app::ports::{AnalyticsPort, InsightPort, OperationsPort, PerformanceMetrics};
use crate::constants::{BERTH_COUNT, CRANE_COUNT, DEFAULT_TURNAROUND_HOURS, REPORTING_PERIOD_HOURS};
use crate::domain::AiInsight;

/// Daily efficiency figures derived from raw performance numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyReport {
    pub containers_per_hour: f64,
    pub crane_utilization: f64,
    pub berth_occupancy: f64,
    pub turnaround_time: f64,
    pub overall_efficiency: f64,
}

impl EfficiencyReport {
    /// Weighted sum: 0.3 throughput, 0.3 cranes, 0.2 berths, 0.2 turnaround.
    /// The turnaround term uses days with a floor of 0.1.
    pub fn from_metrics(metrics: &PerformanceMetrics) -> Self {
        let containers_per_hour = metrics.containers_processed / REPORTING_PERIOD_HOURS;
        let crane_utilization = metrics.crane_usage / CRANE_COUNT as f64;
        let berth_occupancy = metrics.berth_usage / BERTH_COUNT as f64;
        let turnaround_time = metrics.avg_turnaround_hours.unwrap_or(DEFAULT_TURNAROUND_HOURS);

        let turnaround_days = (turnaround_time / 24.0).max(0.1);
        let overall_efficiency = 0.3 * containers_per_hour
            + 0.3 * crane_utilization
            + 0.2 * berth_occupancy
            + 0.2 * (1.0 / turnaround_days);

        Self {
            containers_per_hour,
            crane_utilization,
            berth_occupancy,
            turnaround_time,
            overall_efficiency,
        }
    }
}

pub struct PortEfficiencyService {
    operations: Arc<dyn OperationsPort>,
    analytics: Arc<dyn AnalyticsPort>,
    insights: Arc<dyn InsightPort>,
}

impl PortEfficiencyService {
    pub fn new(
        operations: Arc<dyn OperationsPort>,
        analytics: Arc<dyn AnalyticsPort>,
        insights: Arc<dyn InsightPort>,
    ) -> Self {
        Self {
            operations,
            analytics,
            insights,
        }
    }

    pub async fn calculate_daily_efficiency(&self) -> EfficiencyReport {
        let metrics = self.analytics.performance_metrics().await;
        let report = EfficiencyReport::from_metrics(&metrics);
        info!(
            overall = report.overall_efficiency,
            crane_utilization = report.crane_utilization,
            "Daily efficiency calculated"
        );
        report
    }

    /// Ask the insight port to review the operations still in progress.
    pub async fn optimize_operations(&self) -> Vec<AiInsight> {
        let active = self.operations.active_operations().await;
        vec![self.insights.generate_efficiency_insights(&active).await]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::FakeInsights;
    use crate::infra::{InMemoryOperations, InMemoryRepository, RepositoryAnalytics};
    use async_trait::async_trait;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_reference_efficiency_score() {
        let report = EfficiencyReport::from_metrics(&PerformanceMetrics {
            containers_processed: 24.0,
            crane_usage: 6.0,
            berth_usage: 2.0,
            avg_turnaround_hours: Some(24.0),
        });
        assert!(close(report.containers_per_hour, 1.0));
        assert!(close(report.crane_utilization, 0.5));
        assert!(close(report.berth_occupancy, 0.5));
        assert!(close(report.overall_efficiency, 0.75));
    }

    #[test]
    fn test_missing_turnaround_defaults_to_two_days() {
        let report = EfficiencyReport::from_metrics(&PerformanceMetrics::default());
        assert_eq!(report.turnaround_time, 48.0);
        assert!(close(report.overall_efficiency, 0.1));
    }

    #[test]
    fn test_turnaround_ratio_floor() {
        let report = EfficiencyReport::from_metrics(&PerformanceMetrics {
            avg_turnaround_hours: Some(0.0),
            ..Default::default()
        });
        // 0.2 * (1 / 0.1)
        assert!(close(report.overall_efficiency, 2.0));
    }

    struct FixedAnalytics(PerformanceMetrics);

    #[async_trait]
    impl AnalyticsPort for FixedAnalytics {
        async fn port_overview(&self) -> crate::app::ports::PortOverview {
            Default::default()
        }
        async fn performance_metrics(&self) -> PerformanceMetrics {
            self.0.clone()
        }
        async fn cargo_statistics(&self) -> crate::app::ports::CargoStatistics {
            Default::default()
        }
        async fn route_analytics(&self) -> crate::app::ports::RouteAnalytics {
            Default::default()
        }
    }

    #[tokio::test]
    async fn test_daily_efficiency_uses_analytics_port() {
        let service = PortEfficiencyService::new(
            Arc::new(InMemoryOperations::new()),
            Arc::new(FixedAnalytics(PerformanceMetrics {
                containers_processed: 48.0,
                crane_usage: 12.0,
                berth_usage: 4.0,
                avg_turnaround_hours: Some(24.0),
            })),
            Arc::new(FakeInsights::new(0.9)),
        );
        let report = service.calculate_daily_efficiency().await;
        assert!(close(report.overall_efficiency, 0.3 * 2.0 + 0.3 + 0.2 + 0.2));
    }

    #[tokio::test]
    async fn test_optimize_operations_reviews_active_operations() {
        let operations = Arc::new(InMemoryOperations::new());
        operations.assign_crane("C-1", "Crane-01", 4).await.unwrap();
        operations.assign_crane("C-2", "Crane-02", 4).await.unwrap();
        operations.release_crane("C-2", chrono::Utc::now()).await.unwrap();

        let repo = Arc::new(InMemoryRepository::new());
        let insights = Arc::new(FakeInsights::new(0.9));
        let analytics = Arc::new(RepositoryAnalytics::new(repo.clone(), repo, operations.clone()));
        let service = PortEfficiencyService::new(operations, analytics, insights.clone());

        let results = service.optimize_operations().await;
        assert_eq!(results.len(), 1);
        assert_eq!(insights.last_operation_batch(), vec!["C-1".to_string()]);
    }
}
