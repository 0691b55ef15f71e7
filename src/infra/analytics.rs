use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::app::ports::{
    AnalyticsPort, CargoStatistics, ContainerRepository, OperationsPort, PerformanceMetrics, PortOverview,
    RouteAnalytics, ShipRepository,
};
use crate::constants;
use crate::domain::{ContainerStatus, Ship};

/// Analytics computed on demand from the repositories and the operations ledger.
pub struct RepositoryAnalytics {
    containers: Arc<dyn ContainerRepository>,
    ships: Arc<dyn ShipRepository>,
    operations: Arc<dyn OperationsPort>,
}

impl RepositoryAnalytics {
    pub fn new(
        containers: Arc<dyn ContainerRepository>,
        ships: Arc<dyn ShipRepository>,
        operations: Arc<dyn OperationsPort>,
    ) -> Self {
        Self {
            containers,
            ships,
            operations,
        }
    }
}

fn docked_ships(ships: &[Ship]) -> usize {
    ships
        .iter()
        .filter(|s| s.current_status.trim().eq_ignore_ascii_case(constants::SHIP_DOCKED))
        .count()
}

#[async_trait]
impl AnalyticsPort for RepositoryAnalytics {
    async fn port_overview(&self) -> PortOverview {
        let containers = self.containers.list_all().await;
        let ships = self.ships.list_all().await;
        let active_cranes = self.operations.crane_assignments().await.len();

        let mut status_breakdown = BTreeMap::new();
        for container in &containers {
            *status_breakdown
                .entry(container.status().as_str().to_string())
                .or_insert(0) += 1;
        }

        PortOverview {
            total_containers: containers.len(),
            total_weight_kg: containers.iter().map(|c| c.weight_kg()).sum(),
            ships_count: ships.len(),
            unloading_containers: status_breakdown
                .get(ContainerStatus::Unloading.as_str())
                .copied()
                .unwrap_or(0),
            status_breakdown,
            active_cranes,
            occupied_berths: docked_ships(&ships),
        }
    }

    async fn performance_metrics(&self) -> PerformanceMetrics {
        let completed = self
            .containers
            .list_by_status(ContainerStatus::Completed)
            .await
            .len();
        let busy_cranes = self.operations.crane_assignments().await.len();
        let berths = docked_ships(&self.ships.list_all().await);

        let durations: Vec<f64> = self
            .operations
            .all_operations()
            .await
            .iter()
            .filter_map(|op| op.duration_hours())
            .collect();
        let avg_turnaround_hours = if durations.is_empty() {
            None
        } else {
            Some(durations.iter().sum::<f64>() / durations.len() as f64)
        };

        PerformanceMetrics {
            containers_processed: completed as f64,
            crane_usage: busy_cranes as f64,
            berth_usage: berths as f64,
            avg_turnaround_hours,
        }
    }

    async fn cargo_statistics(&self) -> CargoStatistics {
        let mut stats = CargoStatistics::default();
        for container in self.containers.list_all().await {
            let key = container.cargo_type.as_str().to_string();
            *stats.cargo_breakdown.entry(key.clone()).or_insert(0) += 1;
            *stats.weight_by_type_kg.entry(key).or_insert(0.0) += container.weight_kg();
        }
        stats
    }

    async fn route_analytics(&self) -> RouteAnalytics {
        let mut active_routes = BTreeMap::new();
        for ship in self.ships.list_all().await {
            *active_routes.entry(ship.origin_port).or_insert(0) += 1;
        }
        RouteAnalytics {
            active_routes,
            main_corridors: constants::main_corridors(),
            avg_transit_days: constants::TRANSIT_DAYS
                .iter()
                .map(|(origin, days)| (origin.to_string(), *days))
                .collect(),
        }
    }
}
