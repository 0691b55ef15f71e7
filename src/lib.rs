pub mod app;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod wiring;

pub use error::{Result, TrackerError};
