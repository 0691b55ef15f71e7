use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::ports::{AnalyticsPort, ContainerRepository, InsightPort};
use crate::domain::{AiInsight, ContainerStatus, ImpactLevel, InsightCategory, InsightDraft};

/// Insights for the dashboard and the trade-corridor analysis.
pub struct InsightService {
    insights: Arc<dyn InsightPort>,
    analytics: Arc<dyn AnalyticsPort>,
    containers: Arc<dyn ContainerRepository>,
}

impl InsightService {
    pub fn new(
        insights: Arc<dyn InsightPort>,
        analytics: Arc<dyn AnalyticsPort>,
        containers: Arc<dyn ContainerRepository>,
    ) -> Self {
        Self {
            insights,
            analytics,
            containers,
        }
    }

    /// Congestion and cargo patterns, plus a crane recommendation when
    /// anything is docked and waiting.
    pub async fn generate_dashboard_insights(&self) -> Vec<AiInsight> {
        let overview = self.analytics.port_overview().await;
        let containers = self.containers.list_all().await;

        let mut results = vec![
            self.insights.predict_port_congestion(&overview).await,
            self.insights.analyze_cargo_patterns(&containers).await,
        ];

        let docked: Vec<_> = containers
            .into_iter()
            .filter(|c| c.status() == ContainerStatus::Docked)
            .collect();
        if !docked.is_empty() {
            results.push(self.insights.recommend_crane_allocation(&docked).await);
        }

        debug!(count = results.len(), "Dashboard insights generated");
        results
    }

    /// Summary of the Asia-Chancay routes and the cargo moving on them.
    pub async fn analyze_trade_corridor(&self) -> Option<AiInsight> {
        let routes = self.analytics.route_analytics().await;
        let cargo = self.analytics.cargo_statistics().await;

        let busiest = routes
            .active_routes
            .iter()
            .max_by_key(|(_, ships)| **ships)
            .map(|(origin, ships)| format!("{} ({} ships)", origin, ships))
            .unwrap_or_else(|| "none".to_string());
        let top_cargo = cargo
            .weight_by_type_kg
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(cargo_type, kg)| format!("{} ({:.0} t)", cargo_type, kg / 1000.0))
            .unwrap_or_else(|| "none".to_string());

        let description = format!(
            "Main corridors: {}. Busiest origin: {}. Heaviest cargo: {}.",
            routes.main_corridors.join(", "),
            busiest,
            top_cargo
        );

        let now = Utc::now();
        let draft = InsightDraft {
            insight_id: format!("trade_corridor_{}", now.format("%Y%m%d_%H%M")),
            category: InsightCategory::Analysis,
            title: "Asia-Chancay trade corridor".to_string(),
            description,
            confidence: 0.85,
            impact_level: ImpactLevel::High,
            generated_at: now,
            related_containers: vec![],
        };
        match draft.build() {
            Ok(insight) => Some(insight),
            Err(e) => {
                warn!(error = %e, "Trade corridor insight rejected");
                None
            }
        }
    }
}
