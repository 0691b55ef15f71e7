use thiserror::Error;

use crate::domain::DomainError;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid entity: {0}")]
    Domain(#[from] DomainError),

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Text generation failed: {0}")]
    Generation(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
