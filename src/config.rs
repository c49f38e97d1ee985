//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::search::DEFAULT_WORKERS;

/// Environment variable overriding the catalog data file / 覆盖数据文件路径的环境变量
pub const DATA_FILE_ENV: &str = "BOOKSTORE_DATA_FILE";

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// Catalog configuration / 目录配置
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Search configuration / 搜索配置
    #[serde(default)]
    pub search: SearchConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Catalog configuration / 目录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON file the catalog is bootstrapped from / 初始数据文件
    pub data_file: String,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Worker threads per search, 0 means one per CPU / 每次搜索的工作线程数
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_file: "books.json".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get the catalog data file, honoring the env override / 获取数据文件路径
    pub fn get_data_file(&self) -> PathBuf {
        match std::env::var(DATA_FILE_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(&self.catalog.data_file),
        }
    }

    /// Resolve the search pool size / 获取搜索线程数
    pub fn get_search_workers(&self) -> usize {
        if self.search.workers == 0 {
            num_cpus::get()
        } else {
            self.search.workers
        }
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from config.json in the working directory / 加载配置文件
pub fn load_config() -> Result<AppConfig, String> {
    load_config_from(&get_config_path())
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config_to(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config_to(config: &AppConfig, config_path: &Path) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}
