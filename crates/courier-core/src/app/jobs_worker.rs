//! JobsWorker - タスク消費ループ
//!
//! # フロー
//! 1. `JobConsumer::wait_task()`（`None` でループ終了）
//! 2. `IterationScope::begin_iteration()`
//! 3. タスク名から dispatcher を解決
//! 4. payload をデコード（デコード不能なら `None`。失敗にはしない）
//! 5. `DynDispatcher::process_dyn()` → 終端状態でなければ ack
//! 6. 失敗 → エラーメッセージで nack（Pending の場合のみ）→ ログ
//! 7. 副作用を flush
//!
//! すべてのタスクはちょうど 1 つの終端状態に到達します。

use std::sync::Arc;

use async_trait::async_trait;

use super::scope::IterationScope;
use crate::domain::CourierError;
use crate::error::WorkerError;
use crate::impls::TracingExceptionLogger;
use crate::ports::{Application, ExceptionLogger, JobConsumer, ReceivedTask};
use crate::serializer::TaskSerializer;
use crate::typed::DispatcherRegistry;
use crate::worker::Worker;

pub struct JobsWorker {
    consumer: Arc<dyn JobConsumer>,
    dispatchers: Arc<DispatcherRegistry>,
    serializer: Arc<dyn TaskSerializer>,
    application: Arc<dyn Application>,
    exception_logger: Arc<dyn ExceptionLogger>,
    scope: IterationScope,
}

impl JobsWorker {
    pub fn new(
        consumer: Arc<dyn JobConsumer>,
        dispatchers: Arc<DispatcherRegistry>,
        serializer: Arc<dyn TaskSerializer>,
        application: Arc<dyn Application>,
    ) -> Self {
        Self {
            consumer,
            dispatchers,
            serializer,
            application,
            exception_logger: Arc::new(TracingExceptionLogger),
            scope: IterationScope::new(),
        }
    }

    pub fn with_exception_logger(mut self, logger: Arc<dyn ExceptionLogger>) -> Self {
        self.exception_logger = logger;
        self
    }

    pub fn with_scope(mut self, scope: IterationScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> &IterationScope {
        &self.scope
    }

    /// 受信タスク 1 件を終端状態まで処理
    pub async fn handle_task(&mut self, task: &mut dyn ReceivedTask) {
        self.scope.begin_iteration();

        if let Err(error) = self.process(task).await {
            if task.is_completed() {
                tracing::warn!(
                    task_id = %task.id(),
                    task = task.name(),
                    "task failed after reaching an outcome, not nacking"
                );
            } else if let Err(e) = task.nack(error.to_string()).await {
                tracing::error!(task_id = %task.id(), error = %e, "failed to nack task");
            }
            self.log_error(task, &error);
        }

        if let Err(error) = self.application.flush_side_effects().await {
            self.log_error(task, &error);
        }
    }

    async fn process(&self, task: &mut dyn ReceivedTask) -> Result<(), CourierError> {
        let dispatcher = self
            .dispatchers
            .get(task.name())
            .ok_or_else(|| CourierError::unknown_dispatcher(task.name()))?;

        let payload = if task.payload().is_empty() {
            None
        } else {
            let decoded = self.serializer.unserialize(task.payload());
            if decoded.is_none() {
                tracing::warn!(
                    task_id = %task.id(),
                    task = task.name(),
                    bytes = task.payload().len(),
                    "payload could not be decoded, processing without payload"
                );
            }
            decoded
        };

        tracing::debug!(task_id = %task.id(), task = task.name(), queue = task.queue(), "dispatching task");
        dispatcher.process_dyn(task, payload).await?;

        if !task.is_completed() {
            task.ack().await.map_err(|e| {
                CourierError::application(format!("cannot ack task {}", task.id())).with_source(e)
            })?;
        }
        Ok(())
    }

    fn log_error(&self, task: &dyn ReceivedTask, error: &CourierError) {
        tracing::error!(
            worker = self.name(),
            task_id = %task.id(),
            task = task.name(),
            kind = %error.kind(),
            error = %error,
            "task failed"
        );
        self.exception_logger.log(error);
    }
}

#[async_trait]
impl Worker for JobsWorker {
    fn name(&self) -> &'static str {
        "jobs"
    }

    async fn run(&mut self) -> Result<(), WorkerError> {
        tracing::info!(
            worker = self.name(),
            dispatchers = self.dispatchers.len(),
            "worker started"
        );
        while let Some(mut task) = self.consumer.wait_task().await? {
            self.handle_task(task.as_mut()).await;
        }
        tracing::info!(worker = self.name(), "consumer closed, worker stopping");
        Ok(())
    }
}
