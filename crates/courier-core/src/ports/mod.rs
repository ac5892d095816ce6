//! Ports - 抽象化レイヤー
//!
//! 各 trait は worker コアの外側との境界です。
//! - アプリケーションサーバーの transport
//! - jobs キュー
//! - アプリケーションフレームワーク / プロセス全体のエラーロガー

pub mod application;
pub mod cache;
pub mod exception_logger;
pub mod task_queue;
pub mod transport;

pub use self::application::{Application, RequestFactory, Session};
pub use self::cache::ScopedCache;
pub use self::exception_logger::ExceptionLogger;
pub use self::task_queue::{QueueError, TaskQueue};
pub use self::transport::{HttpTransport, JobConsumer, ReceivedTask, TransportError};
