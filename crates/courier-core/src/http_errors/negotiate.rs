//! Negotiate - 全ステータス別 handler 共通のコンテントネゴシエーション

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::{AppRequest, CourierError};

/// クライアントに返す形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiated {
    Json,
    Html,
    Plain,
}

impl Negotiated {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Html => "text/html",
            Self::Plain => "text/plain",
        }
    }
}

/// `application/json` を `text/html` より優先。それ以外は plain text
pub fn negotiate(request: &AppRequest) -> Negotiated {
    let accepted = request.accept_types();
    if accepted.iter().any(|t| t == "application/json") {
        Negotiated::Json
    } else if accepted.iter().any(|t| t == "text/html") {
        Negotiated::Html
    } else {
        Negotiated::Plain
    }
}

/// API クライアントに見せるエラー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    NotFound,
    Access,
    Internal,
}

/// JSON のエラーボディ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub title: String,

    #[serde(rename = "type")]
    pub error_type: ErrorType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// エラーチェーンの Debug 表示（詳細を公開するときのみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

/// ステータス別 handler ごとの差分（描画は共通）
pub(crate) struct ErrorPage {
    pub status: StatusCode,
    pub title: &'static str,
    pub heading: &'static str,
    pub error_type: ErrorType,
}

impl ErrorPage {
    pub fn render(
        &self,
        request: &AppRequest,
        error: &CourierError,
        expose_details: bool,
    ) -> Response<Bytes> {
        let negotiated = negotiate(request);
        let body = match negotiated {
            Negotiated::Json => {
                let payload = ErrorResponse {
                    title: self.heading.to_string(),
                    error_type: self.error_type,
                    detail: Some(error.message().to_string()),
                    exception: expose_details.then(|| format!("{error:?}")),
                };
                match serde_json::to_vec(&payload) {
                    Ok(body) => Bytes::from(body),
                    Err(e) => {
                        tracing::error!(error = %e, "error response encode failed");
                        return plain(self.status, format!("{} - {}", self.heading, error));
                    }
                }
            }
            Negotiated::Html => Bytes::from(html_page(self.title, self.heading, error.message())),
            Negotiated::Plain => Bytes::from(format!("{} - {}", self.heading, error)),
        };
        with_content_type(self.status, negotiated.content_type(), body)
    }
}

pub(crate) fn with_content_type(
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
) -> Response<Bytes> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

pub(crate) fn plain(status: StatusCode, body: impl Into<Bytes>) -> Response<Bytes> {
    with_content_type(status, "text/plain", body.into())
}

fn html_page(title: &str, heading: &str, message: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body>
  <h1>{heading}</h1>
  <p>{message}</p>
</body>
</html>
"#,
        message = escape_html(message),
    )
}

pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
