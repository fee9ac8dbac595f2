use std::fs;
use std::path::{Path, PathBuf};

use crate::proxy::ProxyConfig;

const DATA_DIR: &str = ".storefront_proxy";
const CONFIG_FILE: &str = "storefront_proxy.json";

/// Get data directory path, creating it when missing
pub fn get_data_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Failed to get user home directory")?;
    let data_dir = home.join(DATA_DIR);

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data directory: {}", e))?;
    }

    Ok(data_dir)
}

/// Load proxy configuration
pub fn load_proxy_config() -> Result<ProxyConfig, String> {
    load_proxy_config_from(&get_data_dir()?)
}

fn load_proxy_config_from(data_dir: &Path) -> Result<ProxyConfig, String> {
    let config_path = data_dir.join(CONFIG_FILE);

    if !config_path.exists() {
        let config = ProxyConfig::default();
        let _ = save_proxy_config_to(data_dir, &config);
        return Ok(config);
    }

    let content = fs::read_to_string(&config_path)
        .map_err(|e| format!("Failed to read config file: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
}

fn save_proxy_config_to(data_dir: &Path, config: &ProxyConfig) -> Result<(), String> {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    fs::write(&config_path, content).map_err(|e| format!("Failed to save config: {}", e))
}
