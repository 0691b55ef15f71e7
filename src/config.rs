use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants;
use crate::error::{Result, TrackerError};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub port: PortConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    pub name: String,
    pub country: String,
    pub annual_capacity: String,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            name: constants::PORT_NAME.to_string(),
            country: constants::PORT_COUNTRY.to_string(),
            annual_capacity: constants::ANNUAL_CAPACITY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Overwrite both tables with the sample data on startup
    pub seed_sample_data: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            seed_sample_data: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// No timeout unless set
    pub timeout_seconds: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl AppConfig {
    /// Load `config.toml` from the working directory, falling back to
    /// defaults when it is absent, then apply environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                TrackerError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            Self::from_toml_str(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(dir) = std::env::var("CHANCAY_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("CHANCAY_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("CHANCAY_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid PORT value '{}'", port),
            }
        }
        if self.llm.api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; insights will fall back to basic mode");
        }
    }
}
