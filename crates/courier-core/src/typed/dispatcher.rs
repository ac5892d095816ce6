//! TaskDispatcher trait - キューのタスクを処理する名前付き dispatcher
//!
//! 送信側は `D::NAME` だけで dispatcher を指定し、受信側は同じ名前を
//! `DispatcherRegistry` で解決します。両側が同じ定数を使うので解決結果は必ず一致します。
//!
//! # 学習ポイント
//! - 関連型 payload を持つジェネリック trait (`TaskDispatcher`)
//! - Object-safe trait (`DynDispatcher`)
//! - Type erasure パターン (`TypedDispatcher<D>` → `DynDispatcher`)

use async_trait::async_trait;
use std::sync::Arc;

use super::payload::{DynPayload, Payload};
use crate::domain::CourierError;
use crate::ports::ReceivedTask;

/// TaskDispatcher は [`TaskDispatcher::NAME`] で push されたタスクを処理
///
/// # 使用例
/// ```ignore
/// struct SendMailDispatcher;
///
/// #[async_trait]
/// impl TaskDispatcher for SendMailDispatcher {
///     const NAME: &'static str = "mail.send";
///     type Payload = SendMail;
///
///     async fn process(
///         &self,
///         task: &mut dyn ReceivedTask,
///         payload: Option<SendMail>,
///     ) -> Result<(), CourierError> {
///         Ok(())
///     }
/// }
/// ```
///
/// `process` が `Ok` を返したら worker が ack する
/// （dispatcher 自身が ack / nack 済みの場合を除く）
#[async_trait]
pub trait TaskDispatcher: Send + Sync + 'static {
    /// タスクを push するときの安定した名前（空文字は不可）
    const NAME: &'static str;

    type Payload: Payload;

    /// `payload` が `None` になるのはバイト列が空・デコード不能・別の payload 型だった場合
    async fn process(
        &self,
        task: &mut dyn ReceivedTask,
        payload: Option<Self::Payload>,
    ) -> Result<(), CourierError>;
}

/// DynDispatcher は object-safe な [`TaskDispatcher`] の抽象化
///
/// `TypedDispatcher<D>` を通すことで `HashMap<String, Arc<dyn DynDispatcher>>` に格納可能にします。
#[async_trait]
pub trait DynDispatcher: Send + Sync {
    fn name(&self) -> &str;

    async fn process_dyn(
        &self,
        task: &mut dyn ReceivedTask,
        payload: Option<Box<dyn DynPayload>>,
    ) -> Result<(), CourierError>;
}

pub struct TypedDispatcher<D: TaskDispatcher> {
    dispatcher: Arc<D>,
}

impl<D: TaskDispatcher> TypedDispatcher<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

#[async_trait]
impl<D: TaskDispatcher> DynDispatcher for TypedDispatcher<D> {
    fn name(&self) -> &str {
        D::NAME
    }

    async fn process_dyn(
        &self,
        task: &mut dyn ReceivedTask,
        payload: Option<Box<dyn DynPayload>>,
    ) -> Result<(), CourierError> {
        let payload = match payload {
            Some(erased) => match erased.downcast::<D::Payload>() {
                Ok(p) => Some(p),
                Err(other) => {
                    tracing::warn!(
                        dispatcher = D::NAME,
                        expected = <D::Payload as Payload>::TYPE,
                        actual = other.type_tag(),
                        "payload type does not match dispatcher, processing without payload"
                    );
                    None
                }
            },
            None => None,
        };
        self.dispatcher.process(task, payload).await
    }
}
