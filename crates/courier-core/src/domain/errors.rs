//! Errors - 処理単位ごとの失敗の分類
//!
//! リクエストやタスクの処理中に発生した失敗は、必ずひとつの [`ErrorKind`] を持ちます。
//! kind はエラーを作った時点で決まり、HTTP エラー分類器と jobs worker が網羅的に match します。

use std::fmt;

/// ErrorKind は処理単位の中で起きた失敗を分類
///
/// # 振り分け
/// - MalformedRequest: 固定の 400（アプリケーションには届かない）
/// - RouteNotFound: 404 handler
/// - AccessDenied: 403 handler
/// - UnknownDispatcher: タスクを nack
/// - ApplicationFault: それ以外すべて（診断ページ / 500 / nack）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedRequest,
    RouteNotFound,
    AccessDenied,
    UnknownDispatcher,
    ApplicationFault,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedRequest => "malformed_request",
            Self::RouteNotFound => "route_not_found",
            Self::AccessDenied => "access_denied",
            Self::UnknownDispatcher => "unknown_dispatcher",
            Self::ApplicationFault => "application_fault",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// CourierError はアプリケーションコード・dispatcher・worker から流れてくるエラー型
#[derive(Debug)]
pub struct CourierError {
    kind: ErrorKind,
    message: String,
    source: Option<BoxError>,
}

impl CourierError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn malformed_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedRequest, message)
    }

    pub fn route_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RouteNotFound, message)
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    /// メッセージはそのまま nack の理由になる
    pub fn unknown_dispatcher(name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownDispatcher,
            format!("Cannot find dispatcher for task \"{name}\""),
        )
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ApplicationFault, message)
    }

    /// 原因となったエラーを付与
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 自身と原因すべてのメッセージ（外側から順に）
    pub fn chain(&self) -> Vec<String> {
        let mut out = vec![self.message.clone()];
        let mut current = std::error::Error::source(self);
        while let Some(err) = current {
            out.push(err.to_string());
            current = err.source();
        }
        out
    }
}

impl fmt::Display for CourierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CourierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
