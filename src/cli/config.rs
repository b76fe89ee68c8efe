use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::session::FileStore;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

/// Persistent CLI settings (`cli.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub server_url: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            updated_at: None,
            last_ping: None,
            status: ServerStatus::Unknown,
        }
    }
}

impl CliConfig {
    pub fn set_server(&mut self, url: &str) {
        self.server_url = url.trim_end_matches('/').to_string();
        self.updated_at = Some(Utc::now());
        self.status = ServerStatus::Unknown;
        self.last_ping = None;
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("KITCHEN_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("kitchen").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_cli_config() -> anyhow::Result<CliConfig> {
    let config_file = get_config_dir()?.join("cli.json");

    if !config_file.exists() {
        return Ok(CliConfig::default());
    }

    let content = fs::read_to_string(config_file)?;
    let config: CliConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_cli_config(config: &CliConfig) -> anyhow::Result<()> {
    let config_file = get_config_dir()?.join("cli.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_file, content)?;
    Ok(())
}

/// Key-value file holding the cached session (`session.json`)
pub fn session_store() -> anyhow::Result<FileStore> {
    Ok(FileStore::new(get_config_dir()?.join("session.json")))
}

pub async fn ping_server(server_url: &str) -> ServerStatus {
    let client = reqwest::Client::new();
    let url = format!("{}/health", server_url);

    match client.get(&url).timeout(std::time::Duration::from_secs(5)).send().await {
        Ok(response) if response.status().is_success() => ServerStatus::Up,
        _ => ServerStatus::Down,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_server_trims_and_resets_status() {
        let mut config = CliConfig::default();
        config.update_ping(ServerStatus::Up);
        config.set_server("https://kitchen.example.com/");

        assert_eq!(config.server_url, "https://kitchen.example.com");
        assert!(matches!(config.status, ServerStatus::Unknown));
        assert!(config.last_ping.is_none());
    }
}
