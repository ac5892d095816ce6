//! InMemoryTaskQueue - 送信側と受信側の両方を担う開発用キュー
//!
//! - producer 向けの `TaskQueue`（push / dispatch_many）
//! - jobs worker 向けの `JobConsumer`（wait_task）
//!
//! 配送は FIFO。delay と priority はタスクに保持するだけで反映しません。

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::{PreparedTask, TaskId, TaskOptions, TaskState};
use crate::ports::{JobConsumer, QueueError, ReceivedTask, TaskQueue, TransportError};

struct QueueState {
    ready: VecDeque<PreparedTask>,
    closed: bool,
    batches: usize,
}

pub struct InMemoryTaskQueue {
    name: String,
    state: Mutex<QueueState>,
    notify: Notify,
    outcomes: Arc<Mutex<HashMap<TaskId, TaskState>>>,
}

impl InMemoryTaskQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(QueueState {
                ready: VecDeque::new(),
                closed: false,
                batches: 0,
            }),
            notify: Notify::new(),
            outcomes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// エンコード済みバイト列を dispatcher 名で積む
    pub async fn enqueue(&self, name: &str, payload: Vec<u8>) -> Result<TaskId, QueueError> {
        let task = self.create(name, payload, TaskOptions::default());
        let id = task.id();
        self.push(task).await?;
        Ok(id)
    }

    /// 受付を停止。consumer は残りを処理した後 `None` を受け取る
    pub fn close(&self) {
        self.lock_state().closed = true;
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub fn pending(&self) -> usize {
        self.lock_state().ready.len()
    }

    /// 受け付けた `dispatch_many` の回数
    pub fn batches(&self) -> usize {
        self.lock_state().batches
    }

    /// consumer に渡したタスクの終端状態（渡していなければ `None`）
    pub fn outcome(&self, id: TaskId) -> Option<TaskState> {
        lock(&self.outcomes).get(&id).cloned()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, QueueState> {
        lock(&self.state)
    }

    fn enqueue_all(&self, tasks: impl IntoIterator<Item = PreparedTask>) -> Result<(), QueueError> {
        let mut state = self.lock_state();
        if state.closed {
            return Err(QueueError::Closed(self.name.clone()));
        }
        state.ready.extend(tasks);
        drop(state);
        self.notify.notify_one();
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn push(&self, task: PreparedTask) -> Result<(), QueueError> {
        self.enqueue_all([task])
    }

    async fn dispatch_many(&self, tasks: &[PreparedTask]) -> Result<(), QueueError> {
        self.enqueue_all(tasks.iter().cloned())?;
        self.lock_state().batches += 1;
        Ok(())
    }
}

#[async_trait]
impl JobConsumer for InMemoryTaskQueue {
    async fn wait_task(&self) -> Result<Option<Box<dyn ReceivedTask>>, TransportError> {
        loop {
            {
                let mut state = self.lock_state();
                if let Some(task) = state.ready.pop_front() {
                    // 他の consumer 向けの仕事が残っている可能性がある
                    if !state.ready.is_empty() {
                        self.notify.notify_one();
                    }
                    drop(state);
                    return Ok(Some(Box::new(InMemoryReceivedTask::new(
                        task,
                        self.name.clone(),
                        Arc::clone(&self.outcomes),
                    ))));
                }
                if state.closed {
                    return Ok(None);
                }
            }
            self.notify.notified().await;
        }
    }
}

/// [`InMemoryTaskQueue`] が渡すタスク
pub struct InMemoryReceivedTask {
    task: PreparedTask,
    queue: String,
    state: TaskState,
    outcomes: Arc<Mutex<HashMap<TaskId, TaskState>>>,
}

impl InMemoryReceivedTask {
    fn new(
        task: PreparedTask,
        queue: String,
        outcomes: Arc<Mutex<HashMap<TaskId, TaskState>>>,
    ) -> Self {
        let state = if task.options().auto_ack {
            TaskState::Acked
        } else {
            TaskState::Pending
        };
        lock(&outcomes).insert(task.id(), state.clone());
        Self {
            task,
            queue,
            state,
            outcomes,
        }
    }

    fn complete(&mut self, state: TaskState) -> Result<(), TransportError> {
        if self.state.is_completed() {
            return Err(TransportError::AlreadyCompleted(self.task.id()));
        }
        lock(&self.outcomes).insert(self.task.id(), state.clone());
        self.state = state;
        Ok(())
    }
}

#[async_trait]
impl ReceivedTask for InMemoryReceivedTask {
    fn id(&self) -> TaskId {
        self.task.id()
    }

    fn name(&self) -> &str {
        self.task.name()
    }

    fn queue(&self) -> &str {
        &self.queue
    }

    fn payload(&self) -> &[u8] {
        self.task.payload()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.task
            .headers()
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    async fn ack(&mut self) -> Result<(), TransportError> {
        self.complete(TaskState::Acked)
    }

    async fn nack(&mut self, reason: String) -> Result<(), TransportError> {
        self.complete(TaskState::Nacked(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_push_wait_roundtrip() {
        let queue = InMemoryTaskQueue::new("tasks");
        let id = queue.enqueue("mail.send", b"abc".to_vec()).await.unwrap();

        let task = queue.wait_task().await.unwrap().unwrap();
        assert_eq!(task.id(), id);
        assert_eq!(task.name(), "mail.send");
        assert_eq!(task.queue(), "tasks");
        assert_eq!(task.payload(), b"abc");
        assert_eq!(queue.outcome(id), Some(TaskState::Pending));
    }

    #[tokio::test]
    async fn test_closed_queue_drains_then_ends() {
        let queue = InMemoryTaskQueue::new("tasks");
        queue.enqueue("a", Vec::new()).await.unwrap();
        queue.close();

        assert!(queue.wait_task().await.unwrap().is_some());
        assert!(queue.wait_task().await.unwrap().is_none());
        assert!(matches!(
            queue.enqueue("b", Vec::new()).await,
            Err(QueueError::Closed(_))
        ));
    }

    #[tokio::test]
    async fn test_push_wakes_waiter() {
        let queue = Arc::new(InMemoryTaskQueue::new("tasks"));

        let waiter = tokio::spawn({
            let queue = queue.clone();
            async move {
                let task = queue.wait_task().await.unwrap().unwrap();
                task.name().to_string()
            }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        queue.enqueue("late", Vec::new()).await.unwrap();

        assert_eq!(waiter.await.unwrap(), "late");
    }

    #[tokio::test]
    async fn test_terminal_outcome_only_once() {
        let queue = InMemoryTaskQueue::new("tasks");
        let id = queue.enqueue("a", Vec::new()).await.unwrap();
        let mut task = queue.wait_task().await.unwrap().unwrap();

        task.nack("bad".to_string()).await.unwrap();
        assert!(task.is_completed());
        assert!(matches!(
            task.ack().await,
            Err(TransportError::AlreadyCompleted(t)) if t == id
        ));
        assert_eq!(queue.outcome(id), Some(TaskState::Nacked("bad".to_string())));
    }

    #[tokio::test]
    async fn test_auto_ack_tasks_arrive_completed() {
        let queue = InMemoryTaskQueue::new("tasks");
        let task = queue.create("a", Vec::new(), TaskOptions::new().with_auto_ack(true));
        queue.push(task).await.unwrap();

        let received = queue.wait_task().await.unwrap().unwrap();
        assert!(received.is_completed());
    }

    #[tokio::test]
    async fn test_batch_is_counted_once() {
        let queue = InMemoryTaskQueue::new("tasks");
        let tasks: Vec<_> = (0..3)
            .map(|i| queue.create(&format!("t{i}"), Vec::new(), TaskOptions::default()))
            .collect();
        queue.dispatch_many(&tasks).await.unwrap();

        assert_eq!(queue.batches(), 1);
        assert_eq!(queue.pending(), 3);
    }
}
