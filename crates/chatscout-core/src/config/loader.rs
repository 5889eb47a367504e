use super::schema::ChatscoutConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./chatscout.yaml
    /// 2. ~/.chatscout/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<ChatscoutConfig, ConfigError> {
        let local_config = PathBuf::from("./chatscout.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".chatscout").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(ChatscoutConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<ChatscoutConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        // An empty file is a valid "all defaults" config.
        if content.trim().is_empty() {
            return Ok(ChatscoutConfig::default());
        }
        let config: ChatscoutConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
