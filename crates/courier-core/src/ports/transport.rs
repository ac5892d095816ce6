//! Transport ports - アプリケーションサーバーと worker の間の pull チャネル
//!
//! ワイヤプロトコルはモデル化しません。
//! 次の処理単位を渡し、その結果を受け取れるものなら何でも transport です。

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;

use crate::domain::{RawRequest, TaskId};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,

    #[error("task {0} was already acknowledged or nacked")]
    AlreadyCompleted(TaskId),

    #[error("transport failure: {0}")]
    Io(String),
}

/// HttpTransport は HTTP 形式の処理単位を配送
///
/// # 設計原則
/// - `wait_request` はリクエストが届くまでブロック
/// - `Ok(None)` はサーバーがチャネルを閉じたことを示す（worker は停止する）
/// - 渡したリクエストには必ずちょうど 1 回 `respond` する
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn wait_request(&self) -> Result<Option<RawRequest>, TransportError>;

    async fn respond(&self, response: Response<Bytes>) -> Result<(), TransportError>;
}

/// JobConsumer はキューのタスクを配送
#[async_trait]
pub trait JobConsumer: Send + Sync {
    /// タスクが届くまでブロック。`Ok(None)` はチャネルが閉じたことを示す
    async fn wait_task(&self) -> Result<Option<Box<dyn ReceivedTask>>, TransportError>;
}

/// ReceivedTask はこの worker に貸し出されたタスク
///
/// worker が所有し、必ずちょうど 1 つの終端状態に到達させる。
/// `ack` と `nack` は合わせて 1 回まで。2 回目は [`TransportError::AlreadyCompleted`] を返す。
#[async_trait]
pub trait ReceivedTask: Send + Sync {
    fn id(&self) -> TaskId;

    /// タスクが push されたときの dispatcher 名
    fn name(&self) -> &str;

    fn queue(&self) -> &str;

    /// エンコード済み payload（送信側が何も送らなかった場合は空）
    fn payload(&self) -> &[u8];

    fn header(&self, name: &str) -> Option<&str>;

    /// ack または nack 済みなら true
    fn is_completed(&self) -> bool;

    async fn ack(&mut self) -> Result<(), TransportError>;

    async fn nack(&mut self, reason: String) -> Result<(), TransportError>;
}
