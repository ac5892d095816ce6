//! Domain - ドメインモデル
//!
//! - **errors**: ErrorKind + CourierError
//! - **request**: RawRequest（transport から見た形）と AppRequest（アプリケーションから見た形）
//! - **task**: TaskId, TaskOptions, PreparedTask
//! - **state**: 受信タスクの終端状態
//! - **mode**: 実行モード

pub mod errors;
pub mod mode;
pub mod request;
pub mod state;
pub mod task;

pub use self::errors::{CourierError, ErrorKind};
pub use self::mode::{MODE_ENV, Mode};
pub use self::request::{AppRequest, RawRequest};
pub use self::state::TaskState;
pub use self::task::{PreparedTask, TaskId, TaskOptions};
