//! Server - 実行モードに応じて worker ループを選ぶ

use std::collections::BTreeMap;

use super::builder::ServerBuilder;
use crate::domain::{MODE_ENV, Mode};
use crate::error::{ConfigurationError, ServerError};
use crate::worker::Worker;

/// Server はモードごとに 1 つの worker を持ち、そのうち 1 つだけを実行
pub struct Server {
    workers: BTreeMap<String, Box<dyn Worker>>,
}

impl Server {
    pub(crate) fn new(workers: BTreeMap<String, Box<dyn Worker>>) -> Self {
        Self { workers }
    }

    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// [`MODE_ENV`] で選ばれた worker を実行
    pub async fn run(&mut self) -> Result<(), ServerError> {
        self.run_with_env(|key| std::env::var(key).ok()).await
    }

    /// [`Server::run`] と同じ。ただし [`MODE_ENV`] は `lookup` 経由で読む
    pub async fn run_with_env(
        &mut self,
        lookup: impl FnOnce(&str) -> Option<String>,
    ) -> Result<(), ServerError> {
        let mode = Mode::from_lookup(lookup).ok_or(ConfigurationError::MissingMode(MODE_ENV))?;
        self.run_mode(&mode).await
    }

    /// `mode` に登録された worker を transport が閉じるまで実行
    pub async fn run_mode(&mut self, mode: &Mode) -> Result<(), ServerError> {
        let available = self.modes();
        let worker = self.workers.get_mut(mode.as_str()).ok_or_else(|| {
            ConfigurationError::UnknownMode {
                mode: mode.clone(),
                available,
            }
        })?;

        tracing::info!(%mode, worker = worker.name(), "starting worker");
        worker.run().await?;
        tracing::info!(%mode, "worker finished");
        Ok(())
    }

    /// 登録済みのモード名（ソート済み）
    pub fn modes(&self) -> Vec<String> {
        self.workers.keys().cloned().collect()
    }
}
