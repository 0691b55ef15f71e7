use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::app::ports::{
    ContainerRepository, InsightPort, NotificationPort, OperationsPort, ShipRepository, WeatherSnapshot,
};
use crate::app::TrackingError;
use crate::constants;
use crate::domain::{AiInsight, Container, ContainerStatus, PortOperation, Ship};
use crate::metrics::TrackingMetrics;

/// Outcome of a successful crane assignment
#[derive(Debug, Clone, Serialize)]
pub struct CraneAssignment {
    pub container_id: String,
    pub crane_id: String,
    pub operation: PortOperation,
}

/// First crane of the fixed pool with nothing assigned to it.
pub fn first_free_crane(assignments: &BTreeMap<String, Vec<String>>) -> Option<String> {
    let busy: HashSet<&str> = assignments
        .iter()
        .filter(|(_, containers)| !containers.is_empty())
        .map(|(crane, _)| crane.as_str())
        .collect();

    constants::crane_pool()
        .into_iter()
        .find(|crane| !busy.contains(crane.as_str()))
}

/// Use cases for moving containers through arrival, docking and unloading.
///
/// Stateless: every call works on the repository snapshot taken at call time.
/// Each boolean operation has a `try_` twin that keeps the failure reason.
pub struct ContainerTrackingService {
    containers: Arc<dyn ContainerRepository>,
    ships: Arc<dyn ShipRepository>,
    insights: Arc<dyn InsightPort>,
    notifications: Arc<dyn NotificationPort>,
    operations: Arc<dyn OperationsPort>,
}

impl ContainerTrackingService {
    pub fn new(
        containers: Arc<dyn ContainerRepository>,
        ships: Arc<dyn ShipRepository>,
        insights: Arc<dyn InsightPort>,
        notifications: Arc<dyn NotificationPort>,
        operations: Arc<dyn OperationsPort>,
    ) -> Self {
        Self {
            containers,
            ships,
            insights,
            notifications,
            operations,
        }
    }

    pub async fn all_containers(&self) -> Vec<Container> {
        self.containers.list_all().await
    }

    pub async fn containers_by_status(&self, status: ContainerStatus) -> Vec<Container> {
        self.containers.list_by_status(status).await
    }

    pub async fn container(&self, container_id: &str) -> Option<Container> {
        self.containers.get_by_id(container_id).await
    }

    pub async fn all_ships(&self) -> Vec<Ship> {
        self.ships.list_all().await
    }

    /// Mark a container as arriving and persist it, then ask for a crane
    /// recommendation over everything docked plus this container.
    ///
    /// The status write is not rolled back if a later step fails.
    pub async fn process_arriving_container(&self, container: Container) -> bool {
        report("process_arriving_container", self.try_process_arriving_container(container).await)
    }

    pub async fn try_process_arriving_container(
        &self,
        mut container: Container,
    ) -> Result<Container, TrackingError> {
        let was_unloading = match self.containers.get_by_id(&container.container_id).await {
            Some(stored) => stored.status() == ContainerStatus::Unloading,
            None => false,
        };
        container.set_status(ContainerStatus::Arriving);
        // Arrival is also the ingestion event for containers we have not seen
        if !self.containers.update(&container).await? {
            self.containers.add(&container).await?;
        }
        if was_unloading {
            self.release_crane_of(&container.container_id).await?;
        }
        TrackingMetrics::record_arrival();

        let mut waiting = self.containers.list_by_status(ContainerStatus::Docked).await;
        waiting.push(container.clone());
        let recommendation = self.insights.recommend_crane_allocation(&waiting).await;

        self.notifications
            .send_status_update(&container.container_id, ContainerStatus::Arriving)
            .await?;
        if recommendation.is_high_confidence() {
            self.notifications.send_insight(&recommendation).await?;
        }

        info!(container_id = %container.container_id, "Container arriving");
        Ok(container)
    }

    /// Add a new container. Unlike the repository, this refuses an id that is
    /// already stored.
    pub async fn register_container(&self, container: Container) -> bool {
        report("register_container", self.try_register_container(container).await)
    }

    pub async fn try_register_container(&self, container: Container) -> Result<Container, TrackingError> {
        if self.containers.get_by_id(&container.container_id).await.is_some() {
            return Err(TrackingError::DuplicateContainer(container.container_id));
        }
        self.containers.add(&container).await?;
        info!(container_id = %container.container_id, "Container registered");
        Ok(container)
    }

    pub async fn dock_container(&self, container_id: &str) -> bool {
        report("dock_container", self.try_dock_container(container_id).await)
    }

    pub async fn try_dock_container(&self, container_id: &str) -> Result<Container, TrackingError> {
        let mut container = self.find(container_id).await?;
        let was_unloading = container.status() == ContainerStatus::Unloading;
        container.set_status(ContainerStatus::Docked);
        self.persist(&container).await?;
        if was_unloading {
            self.release_crane_of(container_id).await?;
        }
        info!(container_id, "Container docked");
        Ok(container)
    }

    /// Give a docked container the first free crane of the pool.
    pub async fn assign_crane_intelligently(&self, container_id: &str) -> bool {
        report("assign_crane_intelligently", self.try_assign_crane(container_id).await)
    }

    pub async fn try_assign_crane(&self, container_id: &str) -> Result<CraneAssignment, TrackingError> {
        let mut container = self.find(container_id).await?;

        let assignments = self.operations.crane_assignments().await;
        let waiting = self.containers.list_by_status(ContainerStatus::Docked).await;
        // Advisory only; allocation stays first-free
        let advisory = self.insights.recommend_crane_allocation(&waiting).await;
        debug!(
            title = advisory.title(),
            confidence = advisory.confidence(),
            "Crane allocation advisory"
        );

        let Some(crane_id) = first_free_crane(&assignments) else {
            TrackingMetrics::record_no_crane_available();
            self.alert_no_crane(&container).await;
            return Err(TrackingError::NoCraneAvailable);
        };

        container.assign_crane(&crane_id)?;
        // Ledger first: a crane it refuses must never reach the stored row
        let operation = self
            .operations
            .assign_crane(container_id, &crane_id, container.estimated_unload_hours())
            .await?;
        if let Err(e) = self.persist(&container).await {
            self.release_crane_of(container_id).await?;
            return Err(e);
        }

        TrackingMetrics::record_crane_assigned();
        info!(container_id, crane_id = %crane_id, "Crane assigned");
        Ok(CraneAssignment {
            container_id: container_id.to_string(),
            crane_id,
            operation,
        })
    }

    pub async fn update_unloading_progress(&self, container_id: &str, progress: i32) -> bool {
        report(
            "update_unloading_progress",
            self.try_update_unloading_progress(container_id, progress).await,
        )
    }

    pub async fn try_update_unloading_progress(
        &self,
        container_id: &str,
        progress: i32,
    ) -> Result<Container, TrackingError> {
        let mut container = self.find(container_id).await?;
        container.update_progress(progress)?;
        self.persist(&container).await?;

        if progress == 100 {
            self.release_crane_of(container_id).await?;
            self.notifications
                .send_status_update(container_id, ContainerStatus::Completed)
                .await?;
            TrackingMetrics::record_container_completed();
            info!(container_id, "Container unloading completed");
        }
        Ok(container)
    }

    pub async fn get_priority_containers(&self) -> Vec<Container> {
        self.containers
            .list_all()
            .await
            .into_iter()
            .filter(Container::is_priority_cargo)
            .collect()
    }

    pub async fn arriving_ships(&self) -> Vec<Ship> {
        self.ships.list_arriving().await
    }

    pub async fn update_ship_status(&self, ship_id: &str, status: &str) -> bool {
        report("update_ship_status", self.try_update_ship_status(ship_id, status).await)
    }

    pub async fn try_update_ship_status(&self, ship_id: &str, status: &str) -> Result<(), TrackingError> {
        if !self.ships.update_status(ship_id, status).await? {
            return Err(TrackingError::ShipNotFound(ship_id.to_string()));
        }
        info!(ship_id, status, "Ship status updated");
        Ok(())
    }

    /// Delay outlook for one ship; `None` if the ship is unknown.
    pub async fn predict_ship_delay(&self, ship_id: &str, weather: &WeatherSnapshot) -> Option<AiInsight> {
        let ship = self.ships.get_by_id(ship_id).await?;
        Some(self.insights.predict_delays(&ship, weather).await)
    }

    /// Raise an alert at the waiting container's priority. A failed alert is
    /// logged and does not change the outcome.
    async fn alert_no_crane(&self, container: &Container) {
        let recipients: Vec<String> = constants::CRANE_ALERT_RECIPIENTS
            .iter()
            .map(|r| r.to_string())
            .collect();
        let message = format!(
            "All {} cranes busy; {} ({} cargo) is waiting",
            constants::CRANE_COUNT,
            container.container_id,
            container.cargo_type
        );
        if let Err(e) = self
            .notifications
            .send_alert(&message, container.priority, &recipients)
            .await
        {
            warn!(container_id = %container.container_id, error = %e, "Crane alert not delivered");
        }
    }

    /// Close the container's open crane operation, if any.
    async fn release_crane_of(&self, container_id: &str) -> Result<(), TrackingError> {
        if let Some(operation) = self.operations.release_crane(container_id, Utc::now()).await? {
            debug!(
                container_id,
                crane_id = ?operation.crane_id,
                hours = ?operation.duration_hours(),
                "Crane released"
            );
        }
        Ok(())
    }

    async fn find(&self, container_id: &str) -> Result<Container, TrackingError> {
        self.containers
            .get_by_id(container_id)
            .await
            .ok_or_else(|| TrackingError::ContainerNotFound(container_id.to_string()))
    }

    async fn persist(&self, container: &Container) -> Result<(), TrackingError> {
        if self.containers.update(container).await? {
            Ok(())
        } else {
            // Removed between our read and write
            Err(TrackingError::ContainerNotFound(container.container_id.clone()))
        }
    }
}

fn report<T>(operation: &'static str, result: Result<T, TrackingError>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            warn!(operation, error = %e, "Tracking operation failed");
            TrackingMetrics::record_operation_failed(operation);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{fixture, Fixture};
    use crate::domain::container::tests::draft;
    use crate::domain::Priority;

    fn busy(cranes: &[&str]) -> BTreeMap<String, Vec<String>> {
        cranes
            .iter()
            .enumerate()
            .map(|(i, crane)| (crane.to_string(), vec![format!("C-{}", i)]))
            .collect()
    }

    #[test]
    fn test_first_free_crane_skips_busy_slots() {
        assert_eq!(first_free_crane(&BTreeMap::new()).as_deref(), Some("Crane-01"));
        assert_eq!(
            first_free_crane(&busy(&["Crane-01", "Crane-03"])).as_deref(),
            Some("Crane-02")
        );
    }

    #[test]
    fn test_first_free_crane_ignores_empty_assignment_lists() {
        let mut assignments = busy(&["Crane-02"]);
        assignments.insert("Crane-01".to_string(), vec![]);
        assert_eq!(first_free_crane(&assignments).as_deref(), Some("Crane-01"));
    }

    #[test]
    fn test_eleven_busy_cranes_leave_exactly_one() {
        let pool = constants::crane_pool();
        for free_index in 0..pool.len() {
            let taken: Vec<&str> = pool
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != free_index)
                .map(|(_, c)| c.as_str())
                .collect();
            assert_eq!(first_free_crane(&busy(&taken)), Some(pool[free_index].clone()));
        }
    }

    #[test]
    fn test_all_cranes_busy() {
        let pool = constants::crane_pool();
        let taken: Vec<&str> = pool.iter().map(String::as_str).collect();
        assert_eq!(first_free_crane(&busy(&taken)), None);
    }

    #[tokio::test]
    async fn test_dock_unknown_container_fails() {
        let Fixture { service, .. } = fixture(vec![], 0.9).await;
        assert!(!service.dock_container("missing").await);
        assert!(matches!(
            service.try_dock_container("missing").await,
            Err(TrackingError::ContainerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_dock_persists_status() {
        let f = fixture(vec![draft("C-1", ContainerStatus::Arriving).build().unwrap()], 0.9).await;
        assert!(f.service.dock_container("C-1").await);
        let stored = f.repo_container("C-1").await;
        assert_eq!(stored.status(), ContainerStatus::Docked);
    }

    #[tokio::test]
    async fn test_assign_crane_to_docked_container() {
        let f = fixture(vec![draft("C-1", ContainerStatus::Docked).build().unwrap()], 0.9).await;

        let assignment = f.service.try_assign_crane("C-1").await.unwrap();
        assert_eq!(assignment.crane_id, "Crane-01");

        let stored = f.repo_container("C-1").await;
        assert_eq!(stored.status(), ContainerStatus::Unloading);
        assert_eq!(stored.crane_assigned(), Some("Crane-01"));

        let assignments = f.operations.crane_assignments().await;
        assert_eq!(assignments.get("Crane-01"), Some(&vec!["C-1".to_string()]));
        assert_eq!(f.insights.crane_calls(), 1);
    }

    #[tokio::test]
    async fn test_assign_crane_rejects_non_docked_without_mutation() {
        let f = fixture(vec![draft("C-1", ContainerStatus::Arriving).build().unwrap()], 0.9).await;

        assert!(!f.service.assign_crane_intelligently("C-1").await);
        let stored = f.repo_container("C-1").await;
        assert_eq!(stored.status(), ContainerStatus::Arriving);
        assert_eq!(stored.crane_assigned(), None);
        assert!(f.operations.crane_assignments().await.is_empty());
    }

    #[tokio::test]
    async fn test_assign_crane_fails_when_pool_exhausted() {
        let mut containers = vec![];
        for i in 0..13 {
            containers.push(draft(&format!("C-{}", i), ContainerStatus::Docked).build().unwrap());
        }
        let f = fixture(containers, 0.9).await;

        for i in 0..12 {
            assert!(f.service.assign_crane_intelligently(&format!("C-{}", i)).await);
        }
        let err = f.service.try_assign_crane("C-12").await.unwrap_err();
        assert!(matches!(err, TrackingError::NoCraneAvailable));
        assert_eq!(err.to_string(), "no crane available");
        assert_eq!(f.repo_container("C-12").await.status(), ContainerStatus::Docked);

        let alerts = f.notifier.alerts();
        assert_eq!(alerts.len(), 1);
        let (message, priority, recipients) = &alerts[0];
        assert!(message.contains("C-12"));
        assert_eq!(*priority, Priority::High);
        assert_eq!(recipients, &vec!["port-operations".to_string()]);
    }

    #[tokio::test]
    async fn test_undelivered_crane_alert_keeps_original_error() {
        let mut containers = vec![];
        for i in 0..13 {
            containers.push(draft(&format!("C-{}", i), ContainerStatus::Docked).build().unwrap());
        }
        let f = fixture(containers, 0.9).await;
        for i in 0..12 {
            assert!(f.service.assign_crane_intelligently(&format!("C-{}", i)).await);
        }

        f.notifier.fail_next();
        assert!(matches!(
            f.service.try_assign_crane("C-12").await,
            Err(TrackingError::NoCraneAvailable)
        ));
        assert!(f.notifier.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_completion_frees_crane_and_notifies() {
        let f = fixture(vec![draft("C-1", ContainerStatus::Docked).build().unwrap()], 0.9).await;
        assert!(f.service.assign_crane_intelligently("C-1").await);

        assert!(f.service.update_unloading_progress("C-1", 40).await);
        assert!(f.notifier.status_updates().is_empty());

        assert!(f.service.update_unloading_progress("C-1", 100).await);
        let stored = f.repo_container("C-1").await;
        assert_eq!(stored.status(), ContainerStatus::Completed);
        assert_eq!(stored.progress_percent(), 100);
        assert!(f.operations.crane_assignments().await.is_empty());
        assert_eq!(
            f.notifier.status_updates(),
            vec![("C-1".to_string(), ContainerStatus::Completed)]
        );
    }

    #[tokio::test]
    async fn test_redocking_releases_crane_before_reassignment() {
        let f = fixture(vec![draft("C-1", ContainerStatus::Docked).build().unwrap()], 0.9).await;

        assert!(f.service.assign_crane_intelligently("C-1").await);
        assert!(f.service.dock_container("C-1").await);

        let stored = f.repo_container("C-1").await;
        assert_eq!(stored.status(), ContainerStatus::Docked);
        assert_eq!(stored.crane_assigned(), None);
        assert!(f.operations.crane_assignments().await.is_empty());

        // Crane-01 is free again, so the second assignment reuses it
        let second = f.service.try_assign_crane("C-1").await.unwrap();
        assert_eq!(second.crane_id, "Crane-01");

        assert!(f.service.update_unloading_progress("C-1", 100).await);
        assert!(f.operations.crane_assignments().await.is_empty());
        assert!(f.operations.active_operations().await.is_empty());
    }

    #[tokio::test]
    async fn test_arrival_of_unloading_container_releases_crane() {
        let f = fixture(vec![draft("C-1", ContainerStatus::Docked).build().unwrap()], 0.9).await;
        assert!(f.service.assign_crane_intelligently("C-1").await);

        let unloading = f.repo_container("C-1").await;
        assert!(f.service.process_arriving_container(unloading).await);

        let stored = f.repo_container("C-1").await;
        assert_eq!(stored.status(), ContainerStatus::Arriving);
        assert_eq!(stored.crane_assigned(), None);
        assert!(f.operations.crane_assignments().await.is_empty());
    }

    /// Ledger that reports every crane free but refuses to open operations.
    struct RefusingLedger;

    #[async_trait::async_trait]
    impl OperationsPort for RefusingLedger {
        async fn all_operations(&self) -> Vec<PortOperation> {
            vec![]
        }

        async fn create_operation(&self, _operation: PortOperation) -> crate::error::Result<bool> {
            Ok(false)
        }

        async fn complete_operation(
            &self,
            _operation_id: &str,
            _end_time: chrono::DateTime<Utc>,
        ) -> crate::error::Result<bool> {
            Ok(false)
        }

        async fn crane_assignments(&self) -> BTreeMap<String, Vec<String>> {
            BTreeMap::new()
        }

        async fn assign_crane(
            &self,
            _container_id: &str,
            crane_id: &str,
            _estimated_hours: u32,
        ) -> crate::error::Result<PortOperation> {
            Err(crate::error::TrackerError::Api {
                message: format!("{} is already working another container", crane_id),
            })
        }

        async fn release_crane(
            &self,
            _container_id: &str,
            _end_time: chrono::DateTime<Utc>,
        ) -> crate::error::Result<Option<PortOperation>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_refused_crane_never_reaches_storage() {
        let f = fixture(vec![draft("C-1", ContainerStatus::Docked).build().unwrap()], 0.9).await;
        let service = ContainerTrackingService::new(
            f.repo.clone(),
            f.repo.clone(),
            f.insights.clone(),
            f.notifier.clone(),
            Arc::new(RefusingLedger),
        );

        assert!(matches!(
            service.try_assign_crane("C-1").await,
            Err(TrackingError::Storage(_))
        ));
        let stored = f.repo_container("C-1").await;
        assert_eq!(stored.status(), ContainerStatus::Docked);
        assert_eq!(stored.crane_assigned(), None);
    }

    #[tokio::test]
    async fn test_invalid_progress_is_reported_not_raised() {
        let f = fixture(vec![draft("C-1", ContainerStatus::Unloading).build().unwrap()], 0.9).await;
        assert!(!f.service.update_unloading_progress("C-1", 120).await);
        assert!(!f.service.update_unloading_progress("missing", 50).await);
        assert_eq!(f.repo_container("C-1").await.progress_percent(), 0);
    }

    #[tokio::test]
    async fn test_arrival_persists_and_forwards_confident_recommendation() {
        let f = fixture(vec![draft("C-1", ContainerStatus::Docked).build().unwrap()], 0.9).await;
        let incoming = draft("C-2", ContainerStatus::InTransit).build().unwrap();

        assert!(f.service.process_arriving_container(incoming).await);

        assert_eq!(f.repo_container("C-2").await.status(), ContainerStatus::Arriving);
        assert_eq!(f.insights.last_crane_batch(), vec!["C-1".to_string(), "C-2".to_string()]);
        assert_eq!(
            f.notifier.status_updates(),
            vec![("C-2".to_string(), ContainerStatus::Arriving)]
        );
        assert_eq!(f.notifier.insights_sent(), 1);
    }

    #[tokio::test]
    async fn test_arrival_keeps_low_confidence_recommendation() {
        let f = fixture(vec![draft("C-1", ContainerStatus::InTransit).build().unwrap()], 0.5).await;
        let known = f.repo_container("C-1").await;

        assert!(f.service.process_arriving_container(known).await);
        assert_eq!(f.repo_container("C-1").await.status(), ContainerStatus::Arriving);
        assert_eq!(f.notifier.insights_sent(), 0);
        assert_eq!(f.repo_len().await, 1);
    }

    #[tokio::test]
    async fn test_arrival_write_survives_notification_failure() {
        let f = fixture(vec![], 0.9).await;
        f.notifier.fail_next();

        let incoming = draft("C-7", ContainerStatus::InTransit).build().unwrap();
        assert!(!f.service.process_arriving_container(incoming).await);
        assert_eq!(f.repo_container("C-7").await.status(), ContainerStatus::Arriving);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_ids() {
        let f = fixture(vec![draft("C-1", ContainerStatus::InTransit).build().unwrap()], 0.9).await;
        let duplicate = draft("C-1", ContainerStatus::Arriving).build().unwrap();

        assert!(matches!(
            f.service.try_register_container(duplicate).await,
            Err(TrackingError::DuplicateContainer(_))
        ));
        assert!(f
            .service
            .register_container(draft("C-2", ContainerStatus::InTransit).build().unwrap())
            .await);
        assert_eq!(f.repo_len().await, 2);
    }

    #[tokio::test]
    async fn test_priority_containers() {
        let mut low = draft("C-low", ContainerStatus::Docked);
        low.priority = crate::domain::Priority::Low;
        let mut critical = draft("C-critical", ContainerStatus::Docked);
        critical.priority = crate::domain::Priority::Critical;
        let f = fixture(vec![low.build().unwrap(), critical.build().unwrap()], 0.9).await;

        let ids: Vec<String> = f
            .service
            .get_priority_containers()
            .await
            .into_iter()
            .map(|c| c.container_id)
            .collect();
        assert_eq!(ids, vec!["C-critical".to_string()]);
    }

    #[tokio::test]
    async fn test_ship_status_update_and_arrivals() {
        let f = fixture(vec![], 0.9).await;
        assert!(f.service.update_ship_status("S-1", "docked").await);
        assert!(!f.service.update_ship_status("S-404", "docked").await);

        let arriving: Vec<String> = f
            .service
            .arriving_ships()
            .await
            .into_iter()
            .map(|s| s.ship_id)
            .collect();
        assert_eq!(arriving, vec!["S-1".to_string(), "S-2".to_string()]);
    }

    #[tokio::test]
    async fn test_predict_ship_delay() {
        let f = fixture(vec![], 0.9).await;
        let weather = WeatherSnapshot {
            conditions: "swell".to_string(),
            wind_knots: 25.0,
            wave_height_m: 3.1,
            visibility_km: 4.0,
        };
        assert!(f.service.predict_ship_delay("S-1", &weather).await.is_some());
        assert!(f.service.predict_ship_delay("S-404", &weather).await.is_none());
    }
}
