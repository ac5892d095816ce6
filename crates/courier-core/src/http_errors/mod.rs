//! HTTP errors - エラー分類とコンテントネゴシエーションした描画
//!
//! # ErrorKind による振り分け
//! - RouteNotFound → 404 handler
//! - AccessDenied → 403 handler
//! - それ以外（本番以外）→ 診断ページ（500, text/html）
//! - それ以外（本番）→ 500 handler
//!
//! 3 つの handler は [`negotiate`] を共有します（JSON → HTML → plain text の順）。

pub mod diagnostic;
pub mod handlers;
pub mod negotiate;

use std::sync::Arc;

use bytes::Bytes;
use http::{Response, StatusCode};

use crate::domain::{AppRequest, CourierError, ErrorKind};

pub use self::diagnostic::{DebugPageRenderer, DiagnosticRenderer};
pub use self::handlers::{
    AccessDeniedHandler, HttpErrorHandler, InternalErrorHandler, NotFoundHandler,
};
pub use self::negotiate::{ErrorResponse, ErrorType, Negotiated, negotiate};

/// ErrorHandlerSet はエラーに対応する handler を選んでレスポンスを描画
#[derive(Clone)]
pub struct ErrorHandlerSet {
    not_found: Arc<dyn HttpErrorHandler>,
    access_denied: Arc<dyn HttpErrorHandler>,
    internal: Arc<dyn HttpErrorHandler>,
    diagnostic: Arc<dyn DiagnosticRenderer>,
    production: bool,
}

impl ErrorHandlerSet {
    /// デフォルトの handler 群
    ///
    /// 本番以外では JSON ボディに詳細を含め、未分類エラーには診断ページを返す
    pub fn new(production: bool) -> Self {
        Self {
            not_found: Arc::new(NotFoundHandler::new().with_details(!production)),
            access_denied: Arc::new(AccessDeniedHandler::new().with_details(!production)),
            internal: Arc::new(InternalErrorHandler::new().with_details(!production)),
            diagnostic: Arc::new(DebugPageRenderer),
            production,
        }
    }

    pub fn with_not_found(mut self, handler: Arc<dyn HttpErrorHandler>) -> Self {
        self.not_found = handler;
        self
    }

    pub fn with_access_denied(mut self, handler: Arc<dyn HttpErrorHandler>) -> Self {
        self.access_denied = handler;
        self
    }

    pub fn with_internal(mut self, handler: Arc<dyn HttpErrorHandler>) -> Self {
        self.internal = handler;
        self
    }

    pub fn with_diagnostic(mut self, renderer: Arc<dyn DiagnosticRenderer>) -> Self {
        self.diagnostic = renderer;
        self
    }

    pub fn is_production(&self) -> bool {
        self.production
    }

    pub fn classify(&self, request: &AppRequest, error: &CourierError) -> Response<Bytes> {
        match error.kind() {
            ErrorKind::RouteNotFound => self.not_found.show_error(request, error),
            ErrorKind::AccessDenied => self.access_denied.show_error(request, error),
            ErrorKind::MalformedRequest
            | ErrorKind::UnknownDispatcher
            | ErrorKind::ApplicationFault => {
                if self.production {
                    self.internal.show_error(request, error)
                } else {
                    self.diagnostic_page(request, error)
                }
            }
        }
    }

    fn diagnostic_page(&self, request: &AppRequest, error: &CourierError) -> Response<Bytes> {
        let mut buffer = String::new();
        match self.diagnostic.render(request, error, &mut buffer) {
            Ok(()) => negotiate::with_content_type(
                StatusCode::INTERNAL_SERVER_ERROR,
                "text/html",
                Bytes::from(buffer),
            ),
            Err(_) => {
                tracing::warn!("diagnostic page failed to render, using 500 handler");
                self.internal.show_error(request, error)
            }
        }
    }
}
