use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::app::ports::{ContainerRepository, ShipRepository};
use crate::domain::{Container, Ship};
use crate::error::Result;

/// In-memory storage backing the service tests
pub struct InMemoryRepository {
    containers: Arc<Mutex<Vec<Container>>>,
    ships: Arc<Mutex<Vec<Ship>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::with_data(vec![], vec![])
    }

    pub fn with_data(containers: Vec<Container>, ships: Vec<Ship>) -> Self {
        Self {
            containers: Arc::new(Mutex::new(containers)),
            ships: Arc::new(Mutex::new(ships)),
        }
    }
}

#[async_trait]
impl ContainerRepository for InMemoryRepository {
    async fn list_all(&self) -> Vec<Container> {
        self.containers.lock().await.clone()
    }

    async fn update(&self, container: &Container) -> Result<bool> {
        let mut containers = self.containers.lock().await;
        match containers
            .iter_mut()
            .find(|c| c.container_id == container.container_id)
        {
            Some(slot) => {
                *slot = container.clone();
                debug!("Updated container {}", container.container_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add(&self, container: &Container) -> Result<bool> {
        self.containers.lock().await.push(container.clone());
        debug!("Added container {}", container.container_id);
        Ok(true)
    }
}

#[async_trait]
impl ShipRepository for InMemoryRepository {
    async fn list_all(&self) -> Vec<Ship> {
        self.ships.lock().await.clone()
    }

    async fn update_status(&self, ship_id: &str, status: &str) -> Result<bool> {
        let mut ships = self.ships.lock().await;
        match ships.iter_mut().find(|s| s.ship_id == ship_id) {
            Some(ship) => {
                ship.current_status = status.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::container::tests::draft;
    use crate::domain::ContainerStatus;

    #[tokio::test]
    async fn test_update_then_get_returns_new_state() {
        let repo = InMemoryRepository::new();
        let mut container = draft("C-1", ContainerStatus::Arriving).build().unwrap();
        repo.add(&container).await.unwrap();

        container.set_status(ContainerStatus::Docked);
        assert!(repo.update(&container).await.unwrap());
        assert_eq!(ContainerRepository::get_by_id(&repo, "C-1").await, Some(container));
        assert_eq!(ContainerRepository::get_by_id(&repo, "C-404").await, None);
    }

    #[tokio::test]
    async fn test_returned_entities_are_copies() {
        let repo =
            InMemoryRepository::with_data(vec![draft("C-1", ContainerStatus::Docked).build().unwrap()], vec![]);
        let mut copy = ContainerRepository::get_by_id(&repo, "C-1").await.unwrap();
        copy.set_status(ContainerStatus::Problem);
        assert_eq!(
            ContainerRepository::get_by_id(&repo, "C-1").await.unwrap().status(),
            ContainerStatus::Docked
        );
    }

    #[tokio::test]
    async fn test_ship_status_update() {
        let repo = InMemoryRepository::with_data(
            vec![],
            vec![crate::domain::ship::tests::draft("S-1", 10, 100, "in_transit").build().unwrap()],
        );
        assert!(repo.update_status("S-1", "Docked").await.unwrap());
        assert!(!repo.update_status("S-2", "docked").await.unwrap());
        assert_eq!(repo.list_arriving().await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_status_is_exact_subset() {
        let repo = InMemoryRepository::with_data(
            vec![
                draft("C-1", ContainerStatus::Docked).build().unwrap(),
                draft("C-2", ContainerStatus::Arriving).build().unwrap(),
                draft("C-3", ContainerStatus::Docked).build().unwrap(),
            ],
            vec![],
        );
        let docked: Vec<String> = repo
            .list_by_status(ContainerStatus::Docked)
            .await
            .into_iter()
            .map(|c| c.container_id)
            .collect();
        assert_eq!(docked, vec!["C-1".to_string(), "C-3".to_string()]);
        assert!(repo.list_by_status(ContainerStatus::Problem).await.is_empty());
    }
}
