pub mod container_tracking;
pub mod efficiency;
pub mod insights;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use container_tracking::{first_free_crane, ContainerTrackingService, CraneAssignment};
pub use efficiency::{EfficiencyReport, PortEfficiencyService};
pub use insights::InsightService;

use thiserror::Error;

use crate::domain::DomainError;
use crate::error::TrackerError;

/// Why a tracking use case did not go through.
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("container {0} not found")]
    ContainerNotFound(String),

    #[error("ship {0} not found")]
    ShipNotFound(String),

    #[error("no crane available")]
    NoCraneAvailable,

    #[error("container {0} already exists")]
    DuplicateContainer(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] TrackerError),
}

impl TrackingError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TrackingError::ContainerNotFound(_) | TrackingError::ShipNotFound(_)
        )
    }
}
