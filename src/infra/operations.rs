use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::app::ports::OperationsPort;
use crate::domain::{Container, ContainerStatus, OperationType, PortOperation};
use crate::error::{Result, TrackerError};

/// Operations ledger held in memory. A crane is busy while an incomplete
/// operation references it.
#[derive(Default)]
pub struct InMemoryOperations {
    operations: Arc<Mutex<Vec<PortOperation>>>,
}

impl InMemoryOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an unload operation for each container already unloading under a
    /// crane, so the pool reflects persisted state after a restart.
    pub async fn seed_from_containers(&self, containers: &[Container]) -> usize {
        let now = Utc::now();
        let mut operations = self.operations.lock().await;
        let mut seeded = 0;
        for container in containers {
            if container.status() != ContainerStatus::Unloading {
                continue;
            }
            let Some(crane_id) = container.crane_assigned() else {
                continue;
            };
            let already_open = operations.iter().any(|op| {
                !op.is_completed() && op.container_id == container.container_id
            });
            if already_open {
                continue;
            }
            operations.push(unload_operation(
                &container.container_id,
                crane_id,
                container.estimated_unload_hours(),
                now,
            ));
            seeded += 1;
        }
        info!("Seeded {} open unload operations", seeded);
        seeded
    }
}

fn unload_operation(container_id: &str, crane_id: &str, hours: u32, start: DateTime<Utc>) -> PortOperation {
    PortOperation {
        operation_id: Uuid::new_v4().to_string(),
        container_id: container_id.to_string(),
        operation_type: OperationType::Unload,
        start_time: start,
        estimated_end_time: start + Duration::hours(i64::from(hours)),
        actual_end_time: None,
        crane_id: Some(crane_id.to_string()),
        operator_id: String::new(),
        notes: String::new(),
    }
}

#[async_trait]
impl OperationsPort for InMemoryOperations {
    async fn all_operations(&self) -> Vec<PortOperation> {
        self.operations.lock().await.clone()
    }

    async fn create_operation(&self, operation: PortOperation) -> Result<bool> {
        let mut operations = self.operations.lock().await;
        if operations
            .iter()
            .any(|op| op.operation_id == operation.operation_id)
        {
            return Ok(false);
        }
        debug!("Created operation {}", operation.operation_id);
        operations.push(operation);
        Ok(true)
    }

    async fn complete_operation(&self, operation_id: &str, end_time: DateTime<Utc>) -> Result<bool> {
        let mut operations = self.operations.lock().await;
        match operations.iter_mut().find(|op| op.operation_id == operation_id) {
            Some(op) => {
                op.complete(end_time);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn crane_assignments(&self) -> BTreeMap<String, Vec<String>> {
        let operations = self.operations.lock().await;
        let mut assignments: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for op in operations.iter().filter(|op| !op.is_completed()) {
            if let Some(crane_id) = &op.crane_id {
                assignments
                    .entry(crane_id.clone())
                    .or_default()
                    .push(op.container_id.clone());
            }
        }
        assignments
    }

    async fn assign_crane(&self, container_id: &str, crane_id: &str, estimated_hours: u32) -> Result<PortOperation> {
        let mut operations = self.operations.lock().await;
        let taken = operations
            .iter()
            .any(|op| !op.is_completed() && op.crane_id.as_deref() == Some(crane_id));
        if taken {
            return Err(TrackerError::Api {
                message: format!("{} is already working another container", crane_id),
            });
        }
        let operation = unload_operation(container_id, crane_id, estimated_hours, Utc::now());
        operations.push(operation.clone());
        debug!(container_id, crane_id, "Opened unload operation");
        Ok(operation)
    }

    async fn release_crane(&self, container_id: &str, end_time: DateTime<Utc>) -> Result<Option<PortOperation>> {
        let mut operations = self.operations.lock().await;
        let open = operations
            .iter_mut()
            .find(|op| !op.is_completed() && op.container_id == container_id && op.crane_id.is_some());
        Ok(open.map(|op| {
            op.complete(end_time);
            op.clone()
        }))
    }
}
