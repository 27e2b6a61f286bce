use lobby_common::config::{ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer};
use lobby_common::defaults::{DEFAULT_PORT, MAX_CONNECTIONS};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "lobby_server_config.yaml";

pub fn get_config_manager(path: &str) -> ConfigManager<FileContentConfigProvider, ServerConfig, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(path)
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub max_connections: usize,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_connections: MAX_CONNECTIONS,
            static_dir: "./static".to_string(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be greater than 0".to_string());
        }
        if self.max_connections == 0 {
            return Err("max_connections must be greater than 0".to_string());
        }
        if self.static_dir.trim().is_empty() {
            return Err("static_dir must not be empty".to_string());
        }
        Ok(())
    }
}
