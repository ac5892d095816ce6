use thiserror::Error;

use crate::domain::Mode;
use crate::ports::TransportError;

/// WorkerError は worker ループを終わらせる致命的なエラー
///
/// 個々のリクエストやタスクの失敗はここには現れない
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("transport failed while waiting for work: {0}")]
    Transport(#[from] TransportError),
}

/// ConfigurationError はプロセスを終了させる設定の問題
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Cannot find worker for mode \"{mode}\". Available workers: {}", .available.join(", "))]
    UnknownMode { mode: Mode, available: Vec<String> },

    #[error("execution mode is not set ({0} is missing)")]
    MissingMode(&'static str),

    #[error("worker for mode \"{0}\" is already registered")]
    DuplicateWorker(Mode),

    #[error("missing workers for modes: {0:?}")]
    MissingWorkers(Vec<String>),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Worker(#[from] WorkerError),
}
