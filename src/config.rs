use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Defaults for local development; real deployments override via the
/// config file or environment.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_API_KEY: &str = "dev-key";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

impl Config {
    /// Load the config file, writing one with the defaults on first run so
    /// operators have something to edit.
    pub fn load_or_init() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            Self::read_from(&config_path)
        } else {
            let config = Self::default();
            config.write_to(&config_path)?;
            Ok(config)
        }
    }

    fn read_from(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Base address of the assistant API. Environment wins over the config
    /// file, which wins over the built-in default.
    pub fn api_url(&self) -> String {
        std::env::var("INVOICE_API_URL")
            .ok()
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Shared application credential sent as the X-API-Key header.
    pub fn api_key(&self) -> String {
        std::env::var("INVOICE_API_KEY")
            .ok()
            .or_else(|| self.api_key.clone())
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string())
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Diagnostic log destination; the TUI owns the terminal, so tracing
    /// output goes to a file instead.
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("client.log"))
    }

    fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("invoice-chat"))
    }
}
