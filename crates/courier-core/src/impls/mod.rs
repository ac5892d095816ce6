//! Impls - ports のプロセス内実装
//!
//! - **InMemoryHttpTransport** / **InMemoryTaskQueue**: 開発・テスト用 transport
//! - **HttpRequestFactory**: RawRequest → AppRequest
//! - **InMemorySession**, **InstanceCache**, **TracingExceptionLogger**
//!
//! アプリケーションサーバーと通信する本番用 transport はこの crate の外に置きます。

pub mod inmem_queue;
pub mod inmem_transport;
pub mod instance_cache;
pub mod request_factory;
pub mod session;
pub mod tracing_logger;

pub use self::inmem_queue::{InMemoryReceivedTask, InMemoryTaskQueue};
pub use self::inmem_transport::InMemoryHttpTransport;
pub use self::instance_cache::InstanceCache;
pub use self::request_factory::HttpRequestFactory;
pub use self::session::InMemorySession;
pub use self::tracing_logger::TracingExceptionLogger;
