//! State - 受信タスクの終端状態

/// TaskState は受信タスクが終端状態に達したかを追跡
///
/// # 状態遷移
/// - Pending → Acked
/// - Pending → Nacked
///
/// Acked と Nacked は終端（両方になることはない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Acked,
    Nacked(String),
}

impl TaskState {
    pub fn is_completed(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}
