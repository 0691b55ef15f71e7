use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Where a container is in its trip through the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    InTransit,
    Arriving,
    Docked,
    Unloading,
    Completed,
    Problem,
}

impl ContainerStatus {
    pub const ALL: [ContainerStatus; 6] = [
        ContainerStatus::InTransit,
        ContainerStatus::Arriving,
        ContainerStatus::Docked,
        ContainerStatus::Unloading,
        ContainerStatus::Completed,
        ContainerStatus::Problem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerStatus::InTransit => "in_transit",
            ContainerStatus::Arriving => "arriving",
            ContainerStatus::Docked => "docked",
            ContainerStatus::Unloading => "unloading",
            ContainerStatus::Completed => "completed",
            ContainerStatus::Problem => "problem",
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ContainerStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| DomainError::UnknownVariant {
                kind: "container status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoType {
    Minerals,
    Agricultural,
    Manufacturing,
    Textiles,
    Chemicals,
    General,
}

impl CargoType {
    pub const ALL: [CargoType; 6] = [
        CargoType::Minerals,
        CargoType::Agricultural,
        CargoType::Manufacturing,
        CargoType::Textiles,
        CargoType::Chemicals,
        CargoType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CargoType::Minerals => "minerals",
            CargoType::Agricultural => "agricultural",
            CargoType::Manufacturing => "manufacturing",
            CargoType::Textiles => "textiles",
            CargoType::Chemicals => "chemicals",
            CargoType::General => "general",
        }
    }
}

impl fmt::Display for CargoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CargoType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CargoType::ALL
            .into_iter()
            .find(|cargo| cargo.as_str() == wanted)
            .ok_or_else(|| DomainError::UnknownVariant {
                kind: "cargo type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(DomainError::UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// Unvalidated container fields, as they arrive from storage or the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerDraft {
    pub container_id: String,
    pub ship_name: String,
    pub origin_port: String,
    pub destination_port: String,
    pub cargo_type: CargoType,
    pub weight_kg: f64,
    pub status: ContainerStatus,
    pub eta: NaiveDateTime,
    pub priority: Priority,
    #[serde(default)]
    pub progress_percent: i32,
    #[serde(default)]
    pub crane_assigned: Option<String>,
    #[serde(default)]
    pub temperature_controlled: bool,
    #[serde(default)]
    pub customs_cleared: bool,
}

impl ContainerDraft {
    pub fn build(self) -> Result<Container, DomainError> {
        Container::try_from(self)
    }
}

/// A cargo unit tracked from arrival to completed unloading.
///
/// Weight, progress, status and crane are private so the lifecycle rules
/// below are the only way to change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContainerDraft")]
pub struct Container {
    pub container_id: String,
    pub ship_name: String,
    pub origin_port: String,
    pub destination_port: String,
    pub cargo_type: CargoType,
    weight_kg: f64,
    status: ContainerStatus,
    pub eta: NaiveDateTime,
    pub priority: Priority,
    progress_percent: i32,
    crane_assigned: Option<String>,
    pub temperature_controlled: bool,
    pub customs_cleared: bool,
}

impl TryFrom<ContainerDraft> for Container {
    type Error = DomainError;

    fn try_from(draft: ContainerDraft) -> Result<Self, Self::Error> {
        if draft.weight_kg.is_nan() || draft.weight_kg <= 0.0 {
            return Err(DomainError::NonPositiveWeight(draft.weight_kg));
        }
        check_progress(draft.progress_percent)?;
        if draft.crane_assigned.is_some() && draft.status != ContainerStatus::Unloading {
            return Err(DomainError::CraneWithoutUnloading {
                container_id: draft.container_id,
                status: draft.status,
            });
        }

        Ok(Self {
            container_id: draft.container_id,
            ship_name: draft.ship_name,
            origin_port: draft.origin_port,
            destination_port: draft.destination_port,
            cargo_type: draft.cargo_type,
            weight_kg: draft.weight_kg,
            status: draft.status,
            eta: draft.eta,
            priority: draft.priority,
            progress_percent: draft.progress_percent,
            crane_assigned: draft.crane_assigned,
            temperature_controlled: draft.temperature_controlled,
            customs_cleared: draft.customs_cleared,
        })
    }
}

fn check_progress(progress: i32) -> Result<(), DomainError> {
    if (0..=100).contains(&progress) {
        Ok(())
    } else {
        Err(DomainError::ProgressOutOfRange(progress))
    }
}

impl Container {
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn status(&self) -> ContainerStatus {
        self.status
    }

    pub fn progress_percent(&self) -> i32 {
        self.progress_percent
    }

    pub fn crane_assigned(&self) -> Option<&str> {
        self.crane_assigned.as_deref()
    }

    /// Move to another lifecycle status. Crane assignment and completion go
    /// through [`Container::assign_crane`] and [`Container::update_progress`].
    ///
    /// Leaving Unloading drops the crane; returns the crane that was released.
    pub fn set_status(&mut self, status: ContainerStatus) -> Option<String> {
        self.status = status;
        if status == ContainerStatus::Unloading {
            None
        } else {
            self.crane_assigned.take()
        }
    }

    /// Assign a crane and start unloading. Only docked containers qualify;
    /// on error the container is left untouched.
    pub fn assign_crane(&mut self, crane_id: &str) -> Result<(), DomainError> {
        if self.status != ContainerStatus::Docked {
            return Err(DomainError::CraneRequiresDocked {
                container_id: self.container_id.clone(),
                status: self.status,
            });
        }
        self.crane_assigned = Some(crane_id.to_string());
        self.status = ContainerStatus::Unloading;
        Ok(())
    }

    /// Record unloading progress. Reaching 100 completes the container and
    /// frees its crane, whatever the previous status was.
    pub fn update_progress(&mut self, progress: i32) -> Result<(), DomainError> {
        check_progress(progress)?;
        self.progress_percent = progress;
        if progress == 100 {
            self.status = ContainerStatus::Completed;
            self.crane_assigned = None;
        }
        Ok(())
    }

    pub fn is_priority_cargo(&self) -> bool {
        matches!(self.priority, Priority::High | Priority::Critical)
    }

    /// Rough unloading time in whole hours, scaled by weight and cargo type.
    pub fn estimated_unload_hours(&self) -> u32 {
        let base_hours = match self.cargo_type {
            CargoType::Minerals => 4.0,
            CargoType::Chemicals => 6.0,
            _ => 2.0,
        };
        let weight_factor = (self.weight_kg / 20_000.0).min(2.0);
        (base_hours * weight_factor) as u32
    }
}
