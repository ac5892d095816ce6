//! HttpRequestFactory - transport から届いたリクエストを検証

use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method, Request, Uri};

use crate::domain::{AppRequest, CourierError, RawRequest};
use crate::ports::RequestFactory;

/// HttpRequestFactory は [`RawRequest`] から [`AppRequest`] を作る
///
/// # 検証
/// - method / URI が不正 → `MalformedRequest`
/// - ヘッダー名 / ヘッダー値が不正 → `MalformedRequest`
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRequestFactory;

impl RequestFactory for HttpRequestFactory {
    fn from_raw(&self, raw: RawRequest) -> Result<AppRequest, CourierError> {
        let method = Method::from_bytes(raw.method.as_bytes()).map_err(|e| {
            CourierError::malformed_request(format!("invalid method {:?}", raw.method))
                .with_source(e)
        })?;
        let uri: Uri = raw.uri.parse().map_err(|e| {
            CourierError::malformed_request(format!("invalid uri {:?}", raw.uri)).with_source(e)
        })?;

        let mut request = Request::new(Bytes::new());
        *request.method_mut() = method;
        *request.uri_mut() = uri;
        for (name, value) in &raw.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                CourierError::malformed_request(format!("invalid header name {name:?}"))
                    .with_source(e)
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                CourierError::malformed_request(format!("invalid value for header {name}"))
                    .with_source(e)
            })?;
            request.headers_mut().append(name, value);
        }
        *request.body_mut() = raw.body;

        Ok(AppRequest::new(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    #[test]
    fn test_builds_request_with_repeated_headers() {
        let raw = RawRequest::new("POST", "/orders?x=1")
            .with_header("Accept", "text/html")
            .with_header("Accept", "application/json")
            .with_body("{}");

        let request = HttpRequestFactory.from_raw(raw).unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri().path(), "/orders");
        assert_eq!(request.accept_types(), vec!["text/html", "application/json"]);
        assert_eq!(request.body().as_ref(), b"{}");
    }

    #[test]
    fn test_rejects_bad_method() {
        let err = HttpRequestFactory
            .from_raw(RawRequest::new("GE T", "/"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRequest);
        assert!(err.message().contains("invalid method"));
    }

    #[test]
    fn test_rejects_bad_header_value() {
        let err = HttpRequestFactory
            .from_raw(RawRequest::new("GET", "/").with_header("x-bad", "line\nbreak"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRequest);
    }
}
