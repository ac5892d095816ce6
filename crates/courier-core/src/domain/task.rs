use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use ulid::Ulid;

/// TaskId はキューがタスク作成時に割り当てる ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(Ulid);

impl TaskId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Ulid> for TaskId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// TaskOptions は送信側でタスクに付ける配送オプション
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Duration>,

    #[serde(default)]
    pub priority: u32,

    /// 配送時にキュー側で ack する（consumer は ack 不要）
    #[serde(default)]
    pub auto_ack: bool,
}

impl TaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_auto_ack(mut self, auto_ack: bool) -> Self {
        self.auto_ack = auto_ack;
        self
    }
}

/// PreparedTask は作成済みだが未送信のタスク
///
/// payload はエンコード済み。`name` は受信側が解決する dispatcher 名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTask {
    id: TaskId,
    name: String,
    payload: Vec<u8>,
    options: TaskOptions,
    headers: Vec<(String, String)>,
}

impl PreparedTask {
    pub fn new(name: impl Into<String>, payload: Vec<u8>, options: TaskOptions) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            payload,
            options,
            headers: Vec::new(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn options(&self) -> &TaskOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut TaskOptions {
        &mut self.options
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn with_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_delay(&mut self, delay: Duration) -> &mut Self {
        self.options.delay = Some(delay);
        self
    }
}
