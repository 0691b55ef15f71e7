use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipDraft {
    pub ship_id: String,
    pub name: String,
    pub captain: String,
    pub origin_port: String,
    pub containers_count: u32,
    pub max_capacity: u32,
    pub current_status: String,
    pub eta: NaiveDateTime,
}

impl ShipDraft {
    pub fn build(self) -> Result<Ship, DomainError> {
        Ship::try_from(self)
    }
}

/// A vessel calling at the port. `current_status` is free text maintained by
/// tracking updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShipDraft")]
pub struct Ship {
    pub ship_id: String,
    pub name: String,
    pub captain: String,
    pub origin_port: String,
    containers_count: u32,
    max_capacity: u32,
    pub current_status: String,
    pub eta: NaiveDateTime,
}

impl TryFrom<ShipDraft> for Ship {
    type Error = DomainError;

    fn try_from(draft: ShipDraft) -> Result<Self, Self::Error> {
        if draft.max_capacity == 0 {
            return Err(DomainError::ZeroCapacity(draft.ship_id));
        }
        if draft.containers_count > draft.max_capacity {
            return Err(DomainError::CapacityExceeded {
                ship_id: draft.ship_id,
                count: draft.containers_count,
                capacity: draft.max_capacity,
            });
        }

        Ok(Self {
            ship_id: draft.ship_id,
            name: draft.name,
            captain: draft.captain,
            origin_port: draft.origin_port,
            containers_count: draft.containers_count,
            max_capacity: draft.max_capacity,
            current_status: draft.current_status,
            eta: draft.eta,
        })
    }
}

impl Ship {
    pub fn containers_count(&self) -> u32 {
        self.containers_count
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    pub fn load_percentage(&self) -> f64 {
        100.0 * f64::from(self.containers_count) / f64::from(self.max_capacity)
    }

    pub fn is_overloaded(&self) -> bool {
        f64::from(self.containers_count) > f64::from(self.max_capacity) * 0.95
    }
}
