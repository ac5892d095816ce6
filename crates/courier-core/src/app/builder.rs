//! ServerBuilder - モードと worker のワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - モードごとに worker は 1 つ（重複は `register` で拒否）

use std::collections::BTreeMap;

use super::server::Server;
use crate::domain::Mode;
use crate::error::ConfigurationError;
use crate::worker::Worker;

/// ServerBuilder は worker を集めて検証
///
/// # 使用例
/// ```ignore
/// let server = Server::builder()
///     .register(Mode::Http, http_worker)?
///     .register(Mode::Jobs, jobs_worker)?
///     .expect_modes(&["http", "jobs"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_modes() で必要なモードを宣言
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば `ConfigurationError::MissingWorkers` を返す
pub struct ServerBuilder {
    workers: BTreeMap<String, Box<dyn Worker>>,
    expected_modes: Option<Vec<String>>,
}

impl ServerBuilder {
    /// 新しい ServerBuilder を作成
    pub fn new() -> Self {
        Self {
            workers: BTreeMap::new(),
            expected_modes: None,
        }
    }

    /// worker をモードに登録（同じモードの二重登録はエラー）
    pub fn register(
        mut self,
        mode: impl Into<Mode>,
        worker: impl Worker + 'static,
    ) -> Result<Self, ConfigurationError> {
        let mode = mode.into();
        if self.workers.contains_key(mode.as_str()) {
            return Err(ConfigurationError::DuplicateWorker(mode));
        }
        self.workers.insert(mode.to_string(), Box::new(worker));
        Ok(self)
    }

    /// 期待されるモードを設定（build() 時に検証）
    pub fn expect_modes(mut self, modes: &[&str]) -> Self {
        self.expected_modes = Some(modes.iter().map(|m| m.to_string()).collect());
        self
    }

    /// Server を構築
    pub fn build(self) -> Result<Server, ConfigurationError> {
        if let Some(expected) = &self.expected_modes {
            let missing: Vec<String> = expected
                .iter()
                .filter(|mode| !self.workers.contains_key(mode.as_str()))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(ConfigurationError::MissingWorkers(missing));
            }
        }
        Ok(Server::new(self.workers))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
