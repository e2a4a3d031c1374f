use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("aipet")
        });

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let config_path = data_dir.join("config.json");

        let mut config = if config_path.exists() {
            let config_str =
                std::fs::read_to_string(&config_path).context("Failed to read config.json")?;
            let mut config: Config =
                serde_json::from_str(&config_str).context("Failed to parse config.json")?;
            config.data_dir = data_dir;
            config
        } else {
            let config = Config {
                data_dir,
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
            };
            config.save()?;
            config
        };

        // Environment variable wins over an absent stored key.
        if config.api_key.as_ref().map_or(true, |key| key.is_empty()) {
            config.api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.data_dir.join("config.json");
        let json_str = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, json_str).context("Failed to write config.json")?;
        Ok(())
    }

    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }

    /// Directory holding the persisted application state files.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("state")
    }
}
