//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件
//!
//! The configuration is loaded once in `main` and handed down explicitly;
//! nothing here keeps a process-wide copy.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration / 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Search configuration / 搜索配置
    #[serde(default)]
    pub search: SearchSettings,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
    /// Public site root prepended to result links (no trailing slash) / 站点根地址
    #[serde(default)]
    pub wwwroot: String,
}

/// Database configuration / 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Data directory path / 数据目录路径
    pub data_dir: String,
    /// Main database file path (relative to data_dir) / 主数据库文件路径
    pub db_file: String,
}

/// How a multi-word term is matched against a category's fields / 匹配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The re-joined phrase is one substring / 整个短语作为一个子串
    #[default]
    Phrase,
    /// Every token must appear in at least one field / 每个词都必须命中
    AllTokens,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Tokens shorter than this are dropped / 最小词长度
    pub min_term_length: usize,
    /// Soft cap for prepared body text / 内容摘要长度
    pub summary_length: usize,
    /// Per-provider time limit in milliseconds / 单个提供者超时（毫秒）
    pub provider_timeout_ms: u64,
    /// Providers running at once within one request / 单次请求的并发上限
    pub max_concurrency: usize,
    pub match_mode: MatchMode,
    /// Category keys never registered / 禁用的类别
    pub disabled_categories: Vec<String>,
    /// Categories that skip the platform-wide visibility gate / 忽略全局可见性的类别
    pub ignore_global_visibility: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8180,
            wwwroot: String::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            db_file: "course.db".to_string(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_term_length: 3,
            summary_length: 75,
            provider_timeout_ms: 5000,
            max_concurrency: 8,
            match_mode: MatchMode::Phrase,
            disabled_categories: Vec::new(),
            // Forums cannot be hidden globally
            ignore_global_visibility: vec![
                "forum_titles".to_string(),
                "forum_discussions".to_string(),
                "forum_posts".to_string(),
            ],
        }
    }
}

impl SearchSettings {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms.max(1))
    }

    /// Concurrency limit, never zero / 并发上限（至少为1）
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    pub fn is_disabled(&self, key: &str) -> bool {
        self.disabled_categories.iter().any(|k| k == key)
    }
}

impl AppConfig {
    /// Get the full database URL / 获取完整的数据库URL
    pub fn get_database_url(&self) -> String {
        let db_path = Path::new(&self.database.data_dir).join(&self.database.db_file);
        format!("sqlite:{}?mode=rwc", db_path.to_string_lossy())
    }

    /// Get the full data directory path / 获取完整的数据目录路径
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.database.data_dir)
    }

    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get the config file path / 获取配置文件路径
pub fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        // Load existing config / 加载现有配置
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        // Create default config / 创建默认配置
        let config = AppConfig::default();
        save_config_to(config_path, &config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Load `config.json` from the working directory / 从工作目录加载配置
pub fn load_config() -> Result<AppConfig, String> {
    load_config_from(&get_config_path())
}

/// Save configuration to file / 保存配置到文件
pub fn save_config_to(config_path: &Path, config: &AppConfig) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}
