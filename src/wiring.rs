//! Composition root: builds every adapter once and hands them to the services.

use std::sync::Arc;
use tracing::info;

use crate::app::ports::{
    AnalyticsPort, ContainerRepository, InsightPort, NotificationPort, OperationsPort, ShipRepository,
};
use crate::app::{ContainerTrackingService, InsightService, PortEfficiencyService};
use crate::config::AppConfig;
use crate::error::Result;
use crate::infra::{
    CsvStore, InMemoryOperations, LlmInsightAdapter, OpenAiClient, RepositoryAnalytics, TracingNotifier,
};

pub struct AppContext {
    pub config: AppConfig,
    pub analytics: Arc<dyn AnalyticsPort>,
    pub tracking: ContainerTrackingService,
    pub efficiency: PortEfficiencyService,
    pub insights: InsightService,
}

/// Adapters a context is assembled from. Tests swap in fakes here.
pub struct Ports {
    pub containers: Arc<dyn ContainerRepository>,
    pub ships: Arc<dyn ShipRepository>,
    pub insights: Arc<dyn InsightPort>,
    pub notifications: Arc<dyn NotificationPort>,
    pub operations: Arc<dyn OperationsPort>,
}

impl AppContext {
    /// Production wiring: CSV storage under the configured data dir, the
    /// OpenAI-compatible generator, and log-based notifications.
    pub async fn build(config: AppConfig) -> Result<Self> {
        let store = Arc::new(CsvStore::new(&config.storage.data_dir));
        if config.storage.seed_sample_data {
            store.seed_sample_data().await?;
        }

        let operations = Arc::new(InMemoryOperations::new());
        let existing = ContainerRepository::list_all(store.as_ref()).await;
        operations.seed_from_containers(&existing).await;

        let generator = Arc::new(OpenAiClient::new(&config.llm)?);
        info!(model = generator.model(), data_dir = %config.storage.data_dir.display(), "Adapters ready");

        let ports = Ports {
            containers: store.clone(),
            ships: store,
            insights: Arc::new(LlmInsightAdapter::new(generator)),
            notifications: Arc::new(TracingNotifier),
            operations,
        };
        Ok(Self::from_ports(config, ports))
    }

    pub fn from_ports(config: AppConfig, ports: Ports) -> Self {
        let analytics: Arc<dyn AnalyticsPort> = Arc::new(RepositoryAnalytics::new(
            ports.containers.clone(),
            ports.ships.clone(),
            ports.operations.clone(),
        ));

        let tracking = ContainerTrackingService::new(
            ports.containers.clone(),
            ports.ships,
            ports.insights.clone(),
            ports.notifications,
            ports.operations.clone(),
        );
        let efficiency =
            PortEfficiencyService::new(ports.operations, analytics.clone(), ports.insights.clone());
        let insights = InsightService::new(ports.insights, analytics.clone(), ports.containers);

        Self {
            config,
            analytics,
            tracking,
            efficiency,
            insights,
        }
    }
}
