//! Config - TOML から読む worker プロセスの設定
//!
//! ```toml
//! workers = ["http", "jobs"]
//!
//! [rpc]
//! host = "tcp://localhost"
//! port = 6001
//!
//! [jobs]
//! queue = "tasks"
//! serializer = "native"   # native | compact | json
//!
//! [app]
//! production = false
//! ```
//!
//! すべてのフィールドにデフォルト値があり、空ファイルも有効な設定です。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Mode;
use crate::serializer::SerializerKind;

/// ConfigError は設定の読み込み・検証エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {}", .0.join(", "))]
    Validation(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    /// このプロセスが worker を登録するモード
    pub workers: Vec<Mode>,
    pub rpc: RpcConfig,
    pub jobs: JobsConfig,
    pub app: AppConfig,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            workers: vec![Mode::Http, Mode::Jobs],
            rpc: RpcConfig::default(),
            jobs: JobsConfig::default(),
            app: AppConfig::default(),
        }
    }
}

impl CourierConfig {
    /// TOML 文字列をパースして検証
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn worker_names(&self) -> Vec<&str> {
        self.workers.iter().map(Mode::as_str).collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        if self.workers.is_empty() {
            errors.push("workers must name at least one mode".to_string());
        }
        for (i, mode) in self.workers.iter().enumerate() {
            if self.workers[..i].contains(mode) {
                errors.push(format!("worker mode \"{mode}\" is listed twice"));
            }
        }
        if self.jobs.queue.trim().is_empty() {
            errors.push("jobs.queue must not be empty".to_string());
        }
        if self.rpc.port == 0 {
            errors.push("rpc.port must not be 0".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// アプリケーションサーバーの RPC エンドポイント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "tcp://localhost".to_string(),
            port: 6001,
        }
    }
}

impl RpcConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// producer の送信先キュー
    pub queue: String,
    pub serializer: SerializerKind,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            queue: "tasks".to_string(),
            serializer: SerializerKind::Native,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// エラー詳細と診断ページを隠す
    pub production: bool,
}

/// TOML ファイルから設定を読み込んで検証
///
/// # フロー
/// 1. ファイルを読む（失敗 → `ConfigError::Io`）
/// 2. TOML をパース（失敗 → `ConfigError::Parse`）
/// 3. 検証（問題はまとめて `ConfigError::Validation`）
pub fn load_config(path: &Path) -> Result<CourierConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    CourierConfig::from_toml_str(&content)
}
