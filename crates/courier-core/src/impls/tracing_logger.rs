//! TracingExceptionLogger - デフォルトの ExceptionLogger

use crate::domain::CourierError;
use crate::ports::ExceptionLogger;

/// 分類済みエラーを原因チェーンごと `courier::exception` target で `tracing` に書く
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingExceptionLogger;

impl ExceptionLogger for TracingExceptionLogger {
    fn log(&self, error: &CourierError) {
        tracing::error!(
            target: "courier::exception",
            kind = %error.kind(),
            chain = ?error.chain(),
            "{error}"
        );
    }
}
