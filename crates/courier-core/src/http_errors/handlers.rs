//! Handlers - ステータス別のエラーハンドラー

use bytes::Bytes;
use http::{Response, StatusCode};

use super::negotiate::{ErrorPage, ErrorType};
use crate::domain::{AppRequest, CourierError};

/// HttpErrorHandler はエラーをリクエストに対するレスポンスに描画
pub trait HttpErrorHandler: Send + Sync {
    fn show_error(&self, request: &AppRequest, error: &CourierError) -> Response<Bytes>;
}

/// 404 handler
#[derive(Debug, Clone, Default)]
pub struct NotFoundHandler {
    expose_details: bool,
}

impl NotFoundHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON ボディにエラーの Debug 表示を含める
    pub fn with_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }
}

impl HttpErrorHandler for NotFoundHandler {
    fn show_error(&self, request: &AppRequest, error: &CourierError) -> Response<Bytes> {
        ErrorPage {
            status: StatusCode::NOT_FOUND,
            title: "Not Found",
            heading: "Oops, I cannot find this.",
            error_type: ErrorType::NotFound,
        }
        .render(request, error, self.expose_details)
    }
}

/// 403 handler
#[derive(Debug, Clone, Default)]
pub struct AccessDeniedHandler {
    expose_details: bool,
}

impl AccessDeniedHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }
}

impl HttpErrorHandler for AccessDeniedHandler {
    fn show_error(&self, request: &AppRequest, error: &CourierError) -> Response<Bytes> {
        ErrorPage {
            status: StatusCode::FORBIDDEN,
            title: "Access denied",
            heading: "Access denied",
            error_type: ErrorType::Access,
        }
        .render(request, error, self.expose_details)
    }
}

/// 500 handler
#[derive(Debug, Clone, Default)]
pub struct InternalErrorHandler {
    expose_details: bool,
}

impl InternalErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }
}

impl HttpErrorHandler for InternalErrorHandler {
    fn show_error(&self, request: &AppRequest, error: &CourierError) -> Response<Bytes> {
        ErrorPage {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            title: "Internal server error",
            heading: "Something went wrong",
            error_type: ErrorType::Internal,
        }
        .render(request, error, self.expose_details)
    }
}
