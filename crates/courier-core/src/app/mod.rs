//! App - アプリケーションロジック（worker ループとそのワイヤリング）
//!
//! # 構成
//! - **Server** / **ServerBuilder**: モード → worker の解決
//! - **HttpWorker**: リクエストループ（wait → decode → dispatch → respond）
//! - **JobsWorker**: タスクループ（wait → resolve → decode → process → ack/nack）
//! - **TaskProducer**: 送信側の push / plan / dispatch
//! - **IterationScope**: 両ループ共通のイテレーションごとのキャッシュリセット

pub mod builder;
pub mod http_worker;
pub mod jobs_worker;
pub mod producer;
pub mod scope;
pub mod server;

pub use self::builder::ServerBuilder;
pub use self::http_worker::HttpWorker;
pub use self::jobs_worker::JobsWorker;
pub use self::producer::TaskProducer;
pub use self::scope::IterationScope;
pub use self::server::Server;
