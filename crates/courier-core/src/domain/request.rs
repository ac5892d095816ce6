//! Request - transport が渡すリクエストとアプリケーションが見るリクエスト

use bytes::Bytes;
use http::header::ACCEPT;
use http::{HeaderMap, Method, Request, Uri};

/// RawRequest は transport から届いたままのリクエスト
///
/// まだ何も検証していない。[`AppRequest`] への変換は `RequestFactory` が行い、失敗しうる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl RawRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// AppRequest はアプリケーションから見た 1 件の HTTP リクエスト
#[derive(Debug)]
pub struct AppRequest {
    inner: Request<Bytes>,
}

impl AppRequest {
    pub fn new(inner: Request<Bytes>) -> Self {
        Self { inner }
    }

    /// ヘッダーもボディもない `GET /`（エラーハンドラーは plain text で応答する）
    pub fn empty() -> Self {
        Self::new(Request::new(Bytes::new()))
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    pub fn inner(&self) -> &Request<Bytes> {
        &self.inner
    }

    pub fn into_inner(self) -> Request<Bytes> {
        self.inner
    }

    /// `Accept` ヘッダーに並ぶメディアタイプ
    ///
    /// # 実装詳細
    /// - 値を `,` で分割し、`;` 以降のパラメータは捨てる
    /// - trim して小文字化する
    /// - 空要素と UTF-8 でない値は読み飛ばす
    pub fn accept_types(&self) -> Vec<String> {
        self.headers()
            .get_all(ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .filter_map(|item| {
                let media = item.split(';').next().unwrap_or("").trim();
                (!media.is_empty()).then(|| media.to_ascii_lowercase())
            })
            .collect()
    }
}
