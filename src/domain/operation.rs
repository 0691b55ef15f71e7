use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Unload,
    Load,
    Inspection,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationType::Unload => "unload",
            OperationType::Load => "load",
            OperationType::Inspection => "inspection",
        };
        f.write_str(name)
    }
}

/// A bounded activity on one container. Completed once `actual_end_time` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortOperation {
    pub operation_id: String,
    pub container_id: String,
    pub operation_type: OperationType,
    pub start_time: DateTime<Utc>,
    pub estimated_end_time: DateTime<Utc>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub crane_id: Option<String>,
    pub operator_id: String,
    pub notes: String,
}

impl PortOperation {
    pub fn is_completed(&self) -> bool {
        self.actual_end_time.is_some()
    }

    /// Elapsed hours between start and actual end; `None` while running.
    pub fn duration_hours(&self) -> Option<f64> {
        self.actual_end_time
            .map(|end| (end - self.start_time).num_seconds() as f64 / 3600.0)
    }

    pub fn complete(&mut self, end_time: DateTime<Utc>) {
        self.actual_end_time = Some(end_time);
    }
}
