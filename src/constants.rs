//! Port-wide constants. The crane pool and berth count are fixed because the
//! efficiency score divides by them directly.

pub const PORT_NAME: &str = "Port of Chancay";
pub const PORT_COUNTRY: &str = "Peru";
pub const ANNUAL_CAPACITY: &str = "1,000,000 TEU";

pub const CRANE_COUNT: usize = 12;
pub const BERTH_COUNT: usize = 4;

/// Hours in the efficiency reporting period
pub const REPORTING_PERIOD_HOURS: f64 = 24.0;
/// Turnaround assumed when no operation has completed yet
pub const DEFAULT_TURNAROUND_HOURS: f64 = 48.0;

pub const CONTAINERS_FILE: &str = "containers.csv";
pub const SHIPS_FILE: &str = "ships.csv";

/// Ship status labels that count as "arriving" for berth planning.
pub const SHIP_ARRIVING: &str = "arriving";
pub const SHIP_DOCKED: &str = "docked";

/// Who hears about a container left waiting for a crane
pub const CRANE_ALERT_RECIPIENTS: [&str; 1] = ["port-operations"];

/// Label of the n-th crane in the pool (1-based): `Crane-01` .. `Crane-12`.
pub fn crane_label(n: usize) -> String {
    format!("Crane-{:02}", n)
}

/// All crane labels in allocation order.
pub fn crane_pool() -> Vec<String> {
    (1..=CRANE_COUNT).map(crane_label).collect()
}

/// Main trade corridors served from Asia, with typical transit in days.
pub const TRANSIT_DAYS: [(&str, u32); 5] = [
    ("Shanghai", 23),
    ("Qingdao", 25),
    ("Ningbo", 24),
    ("Busan", 26),
    ("Yokohama", 22),
];

pub fn main_corridors() -> Vec<String> {
    ["Shanghai", "Qingdao", "Busan"]
        .iter()
        .map(|origin| format!("{}-Chancay", origin))
        .collect()
}
