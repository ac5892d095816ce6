//! TaskQueue port - jobs キューの送信側
//!
//! キューが扱うのは dispatcher 名とエンコード済みバイト列のみです。
//! payload の型は受信側で解決します。

use async_trait::async_trait;

use crate::domain::{PreparedTask, TaskOptions};

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue '{0}' is closed")]
    Closed(String),

    #[error("queue operation failed: {0}")]
    OperationFailed(String),
}

/// TaskQueue は名前付きキューへタスクを送る
///
/// # 設計原則
/// - `create` はタスクを作るだけで送らない
/// - `push` は 1 件を即座に送る
/// - `dispatch_many` はバッチを 1 回で送る（呼び出し側から見て all or nothing）
#[async_trait]
pub trait TaskQueue: Send + Sync {
    fn name(&self) -> &str;

    fn create(&self, name: &str, payload: Vec<u8>, options: TaskOptions) -> PreparedTask {
        PreparedTask::new(name, payload, options)
    }

    async fn push(&self, task: PreparedTask) -> Result<(), QueueError>;

    async fn dispatch_many(&self, tasks: &[PreparedTask]) -> Result<(), QueueError>;
}
