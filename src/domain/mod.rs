//! Domain entities for the port: containers, ships, port operations and
//! generated insights. Nothing in here performs I/O.

pub mod container;
pub mod insight;
pub mod operation;
pub mod ship;

pub use container::{CargoType, Container, ContainerDraft, ContainerStatus, Priority};
pub use insight::{AiInsight, ImpactLevel, InsightCategory, InsightDraft};
pub use operation::{OperationType, PortOperation};
pub use ship::{Ship, ShipDraft};

use thiserror::Error;

/// Invariant violations raised while constructing or mutating an entity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("weight must be positive, got {0} kg")]
    NonPositiveWeight(f64),

    #[error("progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(i32),

    #[error("cranes can only be assigned to docked containers ({container_id} is {status})")]
    CraneRequiresDocked {
        container_id: String,
        status: ContainerStatus,
    },

    #[error("only unloading containers hold a crane ({container_id} is {status})")]
    CraneWithoutUnloading {
        container_id: String,
        status: ContainerStatus,
    },

    #[error("ship {ship_id} carries {count} containers, above its capacity of {capacity}")]
    CapacityExceeded {
        ship_id: String,
        count: u32,
        capacity: u32,
    },

    #[error("ship {0} has zero capacity")]
    ZeroCapacity(String),

    #[error("confidence must lie in [0, 1], got {0}")]
    ConfidenceOutOfRange(f64),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
