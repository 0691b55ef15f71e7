use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{AiInsight, Container, ContainerStatus, PortOperation, Priority, Ship};
use crate::error::Result;

// Repository ports. Reads never fail: storage problems degrade to an empty
// collection inside the adapter. Every returned entity is an independent copy.

#[async_trait]
pub trait ContainerRepository: Send + Sync {
    async fn list_all(&self) -> Vec<Container>;

    async fn get_by_id(&self, container_id: &str) -> Option<Container> {
        self.list_all()
            .await
            .into_iter()
            .find(|c| c.container_id == container_id)
    }

    async fn list_by_status(&self, status: ContainerStatus) -> Vec<Container> {
        self.list_all()
            .await
            .into_iter()
            .filter(|c| c.status() == status)
            .collect()
    }

    /// Replace the stored container with the same id. `Ok(false)` when no
    /// such container exists.
    async fn update(&self, container: &Container) -> Result<bool>;

    /// Append a container. Id uniqueness is not checked here.
    async fn add(&self, container: &Container) -> Result<bool>;
}

#[async_trait]
pub trait ShipRepository: Send + Sync {
    async fn list_all(&self) -> Vec<Ship>;

    async fn get_by_id(&self, ship_id: &str) -> Option<Ship> {
        self.list_all().await.into_iter().find(|s| s.ship_id == ship_id)
    }

    /// Ships whose status is `arriving` or `docked`.
    async fn list_arriving(&self) -> Vec<Ship> {
        self.list_all()
            .await
            .into_iter()
            .filter(|s| {
                let status = s.current_status.trim().to_lowercase();
                status == crate::constants::SHIP_ARRIVING || status == crate::constants::SHIP_DOCKED
            })
            .collect()
    }

    async fn update_status(&self, ship_id: &str, status: &str) -> Result<bool>;
}

// Operations side: unload/load/inspection records and the crane slots they hold.

#[async_trait]
pub trait OperationsPort: Send + Sync {
    async fn all_operations(&self) -> Vec<PortOperation>;

    async fn active_operations(&self) -> Vec<PortOperation> {
        self.all_operations()
            .await
            .into_iter()
            .filter(|op| !op.is_completed())
            .collect()
    }

    /// `Ok(false)` if an operation with the same id already exists.
    async fn create_operation(&self, operation: PortOperation) -> Result<bool>;

    async fn complete_operation(&self, operation_id: &str, end_time: DateTime<Utc>) -> Result<bool>;

    /// Busy cranes mapped to the containers they are working on.
    async fn crane_assignments(&self) -> BTreeMap<String, Vec<String>>;

    /// Open an unload operation holding `crane_id` for `container_id`.
    async fn assign_crane(
        &self,
        container_id: &str,
        crane_id: &str,
        estimated_hours: u32,
    ) -> Result<PortOperation>;

    /// Complete the container's open crane operation, freeing the crane.
    async fn release_crane(
        &self,
        container_id: &str,
        end_time: DateTime<Utc>,
    ) -> Result<Option<PortOperation>>;
}

#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn send_alert(&self, message: &str, priority: Priority, recipients: &[String]) -> Result<()>;
    async fn send_status_update(&self, container_id: &str, status: ContainerStatus) -> Result<()>;
    async fn send_insight(&self, insight: &AiInsight) -> Result<()>;
}

/// The external text-generation call, treated as opaque.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str, temperature: f32) -> Result<String>;
}

/// Insight generation. Implementations never fail: any problem yields a
/// fallback insight in the `Error` category.
#[async_trait]
pub trait InsightPort: Send + Sync {
    async fn predict_port_congestion(&self, overview: &PortOverview) -> AiInsight;
    async fn recommend_crane_allocation(&self, containers: &[Container]) -> AiInsight;
    async fn analyze_cargo_patterns(&self, containers: &[Container]) -> AiInsight;
    async fn generate_efficiency_insights(&self, operations: &[PortOperation]) -> AiInsight;
    async fn predict_delays(&self, ship: &Ship, weather: &WeatherSnapshot) -> AiInsight;
}

#[async_trait]
pub trait AnalyticsPort: Send + Sync {
    async fn port_overview(&self) -> PortOverview;
    async fn performance_metrics(&self) -> PerformanceMetrics;
    async fn cargo_statistics(&self) -> CargoStatistics;
    async fn route_analytics(&self) -> RouteAnalytics;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortOverview {
    pub total_containers: usize,
    pub total_weight_kg: f64,
    pub ships_count: usize,
    pub status_breakdown: BTreeMap<String, usize>,
    pub active_cranes: usize,
    pub occupied_berths: usize,
    pub unloading_containers: usize,
}

/// Raw performance numbers feeding the efficiency score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub containers_processed: f64,
    pub crane_usage: f64,
    pub berth_usage: f64,
    pub avg_turnaround_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CargoStatistics {
    pub cargo_breakdown: BTreeMap<String, usize>,
    pub weight_by_type_kg: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteAnalytics {
    pub active_routes: BTreeMap<String, usize>,
    pub main_corridors: Vec<String>,
    pub avg_transit_days: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub conditions: String,
    pub wind_knots: f64,
    pub wave_height_m: f64,
    pub visibility_km: f64,
}
