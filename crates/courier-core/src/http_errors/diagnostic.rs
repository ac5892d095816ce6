//! Diagnostic - 本番以外で未分類エラーに出す診断ページ

use std::fmt::{self, Write};

use super::negotiate::escape_html;
use crate::domain::{AppRequest, CourierError};

/// DiagnosticRenderer はエラーの HTML トレースを `out` に書く
///
/// 専用バッファに描画し、`Ok` が返ってからレスポンスを作る。
/// 描画に失敗しても途中までのページは出ない。
pub trait DiagnosticRenderer: Send + Sync {
    fn render(&self, request: &AppRequest, error: &CourierError, out: &mut String) -> fmt::Result;
}

/// デフォルトの renderer（リクエスト行・ヘッダー・エラーチェーン）
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugPageRenderer;

impl DiagnosticRenderer for DebugPageRenderer {
    fn render(&self, request: &AppRequest, error: &CourierError, out: &mut String) -> fmt::Result {
        let chain = error.chain();
        writeln!(out, "<!doctype html>")?;
        writeln!(out, "<html lang=\"en\">")?;
        writeln!(out, "<head><meta charset=\"UTF-8\"><title>{}</title></head>", escape_html(error.message()))?;
        writeln!(out, "<body>")?;
        writeln!(out, "<h1>{}</h1>", escape_html(error.message()))?;
        writeln!(out, "<p>kind: <code>{}</code></p>", error.kind())?;

        writeln!(out, "<h2>Caused by</h2>")?;
        writeln!(out, "<ol>")?;
        for cause in &chain {
            writeln!(out, "  <li>{}</li>", escape_html(cause))?;
        }
        writeln!(out, "</ol>")?;

        writeln!(out, "<h2>Request</h2>")?;
        writeln!(
            out,
            "<p><code>{} {}</code></p>",
            request.method(),
            escape_html(&request.uri().to_string())
        )?;
        writeln!(out, "<table>")?;
        for (name, value) in request.headers() {
            writeln!(
                out,
                "  <tr><th>{}</th><td>{}</td></tr>",
                name,
                escape_html(&String::from_utf8_lossy(value.as_bytes()))
            )?;
        }
        writeln!(out, "</table>")?;

        writeln!(out, "<h2>Debug</h2>")?;
        writeln!(out, "<pre>{}</pre>", escape_html(&format!("{error:#?}")))?;
        writeln!(out, "</body>")?;
        writeln!(out, "</html>")
    }
}
