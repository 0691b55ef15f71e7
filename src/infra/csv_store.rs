//! Flat-file storage: one CSV table for containers and one for ships.
//!
//! Every read parses the whole file and every write rewrites it. There is no
//! locking, so concurrent writers follow last-write-wins.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::app::ports::{ContainerRepository, ShipRepository};
use crate::constants::{CONTAINERS_FILE, SHIPS_FILE};
use crate::domain::{
    CargoType, Container, ContainerDraft, ContainerStatus, DomainError, Priority, Ship, ShipDraft,
};
use crate::error::{Result, TrackerError};
use crate::metrics::StorageMetrics;

/// Written in place of an absent crane
const NULL_MARKER: &str = "None";
/// Whole seconds print without a fraction, so older files read back unchanged
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const ACCEPTED_TIMESTAMPS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Serialize, Deserialize)]
struct ContainerRow {
    container_id: String,
    ship_name: String,
    origin_port: String,
    destination_port: String,
    cargo_type: String,
    weight_kg: f64,
    status: String,
    eta: String,
    priority: String,
    progress_percent: i32,
    crane_assigned: String,
    temperature_controlled: String,
    customs_cleared: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ShipRow {
    ship_id: String,
    name: String,
    captain: String,
    origin_port: String,
    containers_count: u32,
    max_capacity: u32,
    current_status: String,
    eta_chancay: String,
}

impl From<&Container> for ContainerRow {
    fn from(c: &Container) -> Self {
        Self {
            container_id: c.container_id.clone(),
            ship_name: c.ship_name.clone(),
            origin_port: c.origin_port.clone(),
            destination_port: c.destination_port.clone(),
            cargo_type: c.cargo_type.to_string(),
            weight_kg: c.weight_kg(),
            status: c.status().to_string(),
            eta: c.eta.format(TIMESTAMP_FORMAT).to_string(),
            priority: c.priority.to_string(),
            progress_percent: c.progress_percent(),
            crane_assigned: c.crane_assigned().unwrap_or(NULL_MARKER).to_string(),
            temperature_controlled: c.temperature_controlled.to_string(),
            customs_cleared: c.customs_cleared.to_string(),
        }
    }
}

impl TryFrom<ContainerRow> for Container {
    type Error = DomainError;

    fn try_from(row: ContainerRow) -> std::result::Result<Self, Self::Error> {
        ContainerDraft {
            cargo_type: row.cargo_type.parse::<CargoType>()?,
            status: row.status.parse::<ContainerStatus>()?,
            eta: parse_timestamp(&row.eta)?,
            priority: row.priority.parse::<Priority>()?,
            crane_assigned: parse_nullable(&row.crane_assigned),
            temperature_controlled: parse_bool(&row.temperature_controlled)?,
            customs_cleared: parse_bool(&row.customs_cleared)?,
            container_id: row.container_id,
            ship_name: row.ship_name,
            origin_port: row.origin_port,
            destination_port: row.destination_port,
            weight_kg: row.weight_kg,
            progress_percent: row.progress_percent,
        }
        .build()
    }
}

impl From<&Ship> for ShipRow {
    fn from(s: &Ship) -> Self {
        Self {
            ship_id: s.ship_id.clone(),
            name: s.name.clone(),
            captain: s.captain.clone(),
            origin_port: s.origin_port.clone(),
            containers_count: s.containers_count(),
            max_capacity: s.max_capacity(),
            current_status: s.current_status.clone(),
            eta_chancay: s.eta.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl TryFrom<ShipRow> for Ship {
    type Error = DomainError;

    fn try_from(row: ShipRow) -> std::result::Result<Self, Self::Error> {
        ShipDraft {
            eta: parse_timestamp(&row.eta_chancay)?,
            ship_id: row.ship_id,
            name: row.name,
            captain: row.captain,
            origin_port: row.origin_port,
            containers_count: row.containers_count,
            max_capacity: row.max_capacity,
            current_status: row.current_status,
        }
        .build()
    }
}

fn parse_nullable(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == NULL_MARKER {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(value: &str) -> std::result::Result<bool, DomainError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DomainError::UnknownVariant {
            kind: "boolean",
            value: value.to_string(),
        }),
    }
}

fn parse_timestamp(value: &str) -> std::result::Result<NaiveDateTime, DomainError> {
    let value = value.trim();
    for format in ACCEPTED_TIMESTAMPS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| DomainError::UnknownVariant {
            kind: "timestamp",
            value: value.to_string(),
        })
}

/// CSV-backed container and ship repository rooted at a data directory.
#[derive(Debug, Clone)]
pub struct CsvStore {
    data_dir: PathBuf,
}

impl CsvStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn containers_path(&self) -> PathBuf {
        self.data_dir.join(CONTAINERS_FILE)
    }

    pub fn ships_path(&self) -> PathBuf {
        self.data_dir.join(SHIPS_FILE)
    }

    /// Overwrite both tables with the sample port data.
    pub async fn seed_sample_data(&self) -> Result<()> {
        let containers = sample_containers()?;
        let ships = sample_ships()?;
        self.write_containers(&containers).await?;
        self.write_ships(&ships).await?;
        info!(
            containers = containers.len(),
            ships = ships.len(),
            data_dir = %self.data_dir.display(),
            "Seeded sample data"
        );
        Ok(())
    }

    async fn read_containers(&self) -> Vec<Container> {
        read_table::<ContainerRow, Container>(&self.containers_path(), "containers").await
    }

    async fn read_ships(&self) -> Vec<Ship> {
        read_table::<ShipRow, Ship>(&self.ships_path(), "ships").await
    }

    async fn write_containers(&self, containers: &[Container]) -> Result<()> {
        let rows: Vec<ContainerRow> = containers.iter().map(ContainerRow::from).collect();
        write_table(&self.containers_path(), "containers", &rows).await
    }

    async fn write_ships(&self, ships: &[Ship]) -> Result<()> {
        let rows: Vec<ShipRow> = ships.iter().map(ShipRow::from).collect();
        write_table(&self.ships_path(), "ships", &rows).await
    }
}

/// Parse every row of `path`. A missing or unreadable file yields an empty
/// table; a row that fails to convert is skipped.
async fn read_table<R, T>(path: &Path, table: &'static str) -> Vec<T>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = DomainError>,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(table, path = %path.display(), error = %e, "Table unreadable, using empty collection");
            StorageMetrics::record_read_fallback(table);
            return Vec::new();
        }
    };

    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let mut items = Vec::new();
    for (line, record) in reader.deserialize::<R>().enumerate() {
        let converted = record
            .map_err(TrackerError::from)
            .and_then(|row| T::try_from(row).map_err(TrackerError::from));
        match converted {
            Ok(item) => items.push(item),
            Err(e) => {
                warn!(table, row = line + 1, error = %e, "Skipping unreadable row");
                StorageMetrics::record_row_skipped(table);
            }
        }
    }
    debug!(table, rows = items.len(), "Table read");
    items
}

async fn write_table<R: Serialize>(path: &Path, table: &'static str, rows: &[R]) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TrackerError::Io(std::io::Error::new(e.error().kind(), e.to_string())))?;

    tokio::fs::write(path, bytes).await?;
    StorageMetrics::record_table_written(table, rows.len());
    debug!(table, rows = rows.len(), "Table written");
    Ok(())
}

#[async_trait]
impl ContainerRepository for CsvStore {
    async fn list_all(&self) -> Vec<Container> {
        self.read_containers().await
    }

    async fn update(&self, container: &Container) -> Result<bool> {
        let mut containers = self.read_containers().await;
        let Some(slot) = containers
            .iter_mut()
            .find(|c| c.container_id == container.container_id)
        else {
            return Ok(false);
        };
        *slot = container.clone();
        self.write_containers(&containers).await?;
        Ok(true)
    }

    async fn add(&self, container: &Container) -> Result<bool> {
        let mut containers = self.read_containers().await;
        containers.push(container.clone());
        self.write_containers(&containers).await?;
        Ok(true)
    }
}

#[async_trait]
impl ShipRepository for CsvStore {
    async fn list_all(&self) -> Vec<Ship> {
        self.read_ships().await
    }

    async fn update_status(&self, ship_id: &str, status: &str) -> Result<bool> {
        let mut ships = self.read_ships().await;
        let Some(ship) = ships.iter_mut().find(|s| s.ship_id == ship_id) else {
            return Ok(false);
        };
        ship.current_status = status.to_string();
        self.write_ships(&ships).await?;
        Ok(true)
    }
}

fn at(date: &str) -> std::result::Result<NaiveDateTime, DomainError> {
    parse_timestamp(date)
}

#[allow(clippy::too_many_arguments)]
fn sample_container(
    id: &str,
    ship: &str,
    origin: &str,
    cargo_type: CargoType,
    weight_kg: f64,
    status: ContainerStatus,
    eta: &str,
    priority: Priority,
    progress_percent: i32,
    crane: Option<&str>,
    temperature_controlled: bool,
    customs_cleared: bool,
) -> std::result::Result<Container, DomainError> {
    ContainerDraft {
        container_id: id.to_string(),
        ship_name: ship.to_string(),
        origin_port: origin.to_string(),
        destination_port: "Chancay".to_string(),
        cargo_type,
        weight_kg,
        status,
        eta: at(eta)?,
        priority,
        progress_percent,
        crane_assigned: crane.map(str::to_string),
        temperature_controlled,
        customs_cleared,
    }
    .build()
}

#[rustfmt::skip]
fn sample_containers() -> Result<Vec<Container>> {
    use CargoType::*;
    use ContainerStatus::*;

    Ok(vec![
        sample_container(
            "TCLU-2024-001", "Perú Express", "Shanghai", Minerals, 25_000.0, Unloading,
            "2025-01-17 14:30", Priority::High, 65, Some("Crane-03"), false, true,
        )?,
        sample_container(
            "TCLU-2024-002", "Asia Dream", "Qingdao", Agricultural, 18_000.0, Docked,
            "2025-01-17 12:00", Priority::Medium, 0, None, true, false,
        )?,
        sample_container(
            "TCLU-2024-003", "Chancay Pioneer", "Busan", Textiles, 12_000.0, Arriving,
            "2025-01-17 18:45", Priority::Low, 0, None, false, false,
        )?,
        sample_container(
            "TCLU-2024-004", "Lima Trader", "Ningbo", Chemicals, 22_000.0, Unloading,
            "2025-01-17 09:15", Priority::Critical, 90, Some("Crane-01"), true, true,
        )?,
        sample_container(
            "TCLU-2024-005", "Pacific Bridge", "Yokohama", Manufacturing, 16_500.0, Completed,
            "2025-01-17 06:00", Priority::Medium, 100, None, false, true,
        )?,
    ])
}

#[rustfmt::skip]
fn sample_ships() -> Result<Vec<Ship>> {
    let ship = |id: &str, name: &str, captain: &str, origin: &str, count: u32, capacity: u32, status: &str, eta: &str| {
        ShipDraft {
            ship_id: id.to_string(),
            name: name.to_string(),
            captain: captain.to_string(),
            origin_port: origin.to_string(),
            containers_count: count,
            max_capacity: capacity,
            current_status: status.to_string(),
            eta: at(eta)?,
        }
        .build()
    };

    Ok(vec![
        ship("SHIP-001", "Perú Express", "Captain Rodriguez", "Shanghai", 450, 500, "docked", "2025-01-17 14:30")?,
        ship("SHIP-002", "Asia Dream", "Captain Chen", "Qingdao", 380, 400, "unloading", "2025-01-17 12:00")?,
        ship("SHIP-003", "Chancay Pioneer", "Captain Kim", "Busan", 320, 450, "arriving", "2025-01-17 18:45")?,
    ])
}
