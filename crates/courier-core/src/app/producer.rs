//! TaskProducer - jobs キューの送信側
//!
//! タスクの宛先は dispatcher の型で指定します。`push::<D>` / `plan::<D>` は
//! `D::NAME` を使い、受信側の `DispatcherRegistry` も同じ定数をキーにします。

use std::sync::Arc;

use crate::domain::{PreparedTask, TaskOptions};
use crate::ports::{QueueError, TaskQueue};
use crate::serializer::TaskSerializer;
use crate::typed::{Payload, TaskDispatcher};

/// TaskProducer はタスクを即時送信、またはバッチ用に溜める
///
/// # 使用例
/// ```ignore
/// let mut producer = TaskProducer::new(queue, serializer);
/// producer.push::<SendMailDispatcher>(Some(mail), TaskOptions::default()).await?;
///
/// producer.plan::<SendMailDispatcher>(Some(a), TaskOptions::default());
/// producer.plan::<SendMailDispatcher>(Some(b), TaskOptions::default());
/// producer.dispatch().await?;
/// ```
pub struct TaskProducer {
    queue: Arc<dyn TaskQueue>,
    serializer: Arc<dyn TaskSerializer>,
    planned: Vec<PreparedTask>,
}

impl TaskProducer {
    pub fn new(queue: Arc<dyn TaskQueue>, serializer: Arc<dyn TaskSerializer>) -> Self {
        Self {
            queue,
            serializer,
            planned: Vec::new(),
        }
    }

    pub fn queue_name(&self) -> &str {
        self.queue.name()
    }

    /// タスクを 1 件すぐに送る
    pub async fn push<D: TaskDispatcher>(
        &self,
        payload: Option<D::Payload>,
        options: TaskOptions,
    ) -> Result<PreparedTask, QueueError> {
        let task = self.prepare::<D>(payload, options);
        self.queue.push(task.clone()).await?;
        tracing::debug!(task = D::NAME, task_id = %task.id(), queue = self.queue.name(), "task pushed");
        Ok(task)
    }

    /// 次の [`TaskProducer::dispatch`] 用にタスクを溜める
    ///
    /// 戻り値の参照からヘッダーや delay を後から調整できる
    pub fn plan<D: TaskDispatcher>(
        &mut self,
        payload: Option<D::Payload>,
        options: TaskOptions,
    ) -> &mut PreparedTask {
        let task = self.prepare::<D>(payload, options);
        let index = self.planned.len();
        self.planned.push(task);
        &mut self.planned[index]
    }

    /// 溜めたタスクをまとめて 1 バッチで送る
    ///
    /// # 実装詳細
    /// - キューがバッチを受け付けたときだけバッファをクリア
    /// - 失敗時は溜めたタスクが残り、再試行できる
    pub async fn dispatch(&mut self) -> Result<usize, QueueError> {
        if self.planned.is_empty() {
            return Ok(0);
        }
        self.queue.dispatch_many(&self.planned).await?;
        let sent = self.planned.len();
        self.planned.clear();
        tracing::debug!(tasks = sent, queue = self.queue.name(), "planned tasks dispatched");
        Ok(sent)
    }

    pub fn planned(&self) -> &[PreparedTask] {
        &self.planned
    }

    pub fn planned_len(&self) -> usize {
        self.planned.len()
    }

    fn prepare<D: TaskDispatcher>(
        &self,
        payload: Option<D::Payload>,
        options: TaskOptions,
    ) -> PreparedTask {
        let bytes = match payload {
            Some(payload) => self.serializer.serialize(&payload).unwrap_or_else(|| {
                tracing::warn!(
                    task = D::NAME,
                    payload_type = <D::Payload as Payload>::TYPE,
                    "payload could not be serialized, sending task without payload"
                );
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.queue.create(D::NAME, bytes, options)
    }
}
