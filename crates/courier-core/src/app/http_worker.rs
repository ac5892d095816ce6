//! HttpWorker - リクエスト処理ループ
//!
//! # フロー
//! 1. `HttpTransport::wait_request()`（`None` でループ終了）
//! 2. `RequestFactory::from_raw()`（失敗 → 固定の 400 を返して次へ）
//! 3. `IterationScope::begin_iteration()`
//! 4. session 初期化（初回のみ）→ `Application::run()` → 言語 / cookie ヘッダー付与
//!    → 応答 → session close → 副作用を flush
//! 5. 3-4 のエラー → `ErrorHandlerSet::classify()` → 応答
//!
//! すべてのリクエストにちょうど 1 回応答します。

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_LANGUAGE, SET_COOKIE};
use http::{HeaderValue, Response, StatusCode};

use super::scope::IterationScope;
use crate::domain::{AppRequest, CourierError};
use crate::error::WorkerError;
use crate::http_errors::ErrorHandlerSet;
use crate::http_errors::negotiate::plain;
use crate::impls::{HttpRequestFactory, TracingExceptionLogger};
use crate::ports::{Application, ExceptionLogger, HttpTransport, RequestFactory, Session};
use crate::worker::Worker;

pub struct HttpWorker {
    transport: Arc<dyn HttpTransport>,
    request_factory: Arc<dyn RequestFactory>,
    application: Arc<dyn Application>,
    session: Arc<dyn Session>,
    errors: ErrorHandlerSet,
    exception_logger: Arc<dyn ExceptionLogger>,
    scope: IterationScope,
}

impl HttpWorker {
    /// デフォルトの request factory / error handler / exception logger で作成
    ///
    /// production フラグは `Application::is_production()` から取る
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        application: Arc<dyn Application>,
        session: Arc<dyn Session>,
    ) -> Self {
        let errors = ErrorHandlerSet::new(application.is_production());
        Self {
            transport,
            request_factory: Arc::new(HttpRequestFactory),
            application,
            session,
            errors,
            exception_logger: Arc::new(TracingExceptionLogger),
            scope: IterationScope::new(),
        }
    }

    pub fn with_request_factory(mut self, factory: Arc<dyn RequestFactory>) -> Self {
        self.request_factory = factory;
        self
    }

    pub fn with_error_handlers(mut self, errors: ErrorHandlerSet) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_exception_logger(mut self, logger: Arc<dyn ExceptionLogger>) -> Self {
        self.exception_logger = logger;
        self
    }

    pub fn with_scope(mut self, scope: IterationScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> &IterationScope {
        &self.scope
    }

    /// デコード済みリクエスト 1 件を処理
    pub async fn handle_request(&mut self, request: AppRequest) {
        self.scope.begin_iteration();

        match self.produce_response(&request).await {
            Ok(response) => {
                self.respond(response).await;
                if let Err(error) = self.finish_request().await {
                    // 応答済みなのでログのみ
                    self.log_error(&error);
                }
            }
            Err(error) => self.handle_error(&request, error).await,
        }
    }

    async fn produce_response(&self, request: &AppRequest) -> Result<Response<Bytes>, CourierError> {
        if !self.session.is_initialized() {
            self.session.init().await?;
        }

        let mut response = self.application.run(request).await?;

        let language = header_value("Content-Language", self.application.language())?;
        let cookie = header_value("Set-Cookie", self.session.cookie_header())?;
        response.headers_mut().append(CONTENT_LANGUAGE, language);
        response.headers_mut().append(SET_COOKIE, cookie);
        Ok(response)
    }

    async fn finish_request(&self) -> Result<(), CourierError> {
        self.session.close().await?;
        self.application.flush_side_effects().await
    }

    async fn handle_error(&self, request: &AppRequest, error: CourierError) {
        self.log_error(&error);
        let response = self.errors.classify(request, &error);
        self.respond(response).await;
    }

    fn log_error(&self, error: &CourierError) {
        tracing::error!(
            worker = self.name(),
            kind = %error.kind(),
            error = %error,
            "request failed"
        );
        self.exception_logger.log(error);
    }

    async fn respond(&self, response: Response<Bytes>) {
        let status = response.status();
        if let Err(e) = self.transport.respond(response).await {
            tracing::error!(worker = self.name(), %status, error = %e, "failed to write response");
        }
    }
}

fn header_value(name: &str, value: String) -> Result<HeaderValue, CourierError> {
    HeaderValue::try_from(value)
        .map_err(|e| CourierError::application(format!("invalid {name} header value")).with_source(e))
}

#[async_trait]
impl Worker for HttpWorker {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn run(&mut self) -> Result<(), WorkerError> {
        tracing::info!(worker = self.name(), "worker started");
        while let Some(raw) = self.transport.wait_request().await? {
            let request = match self.request_factory.from_raw(raw) {
                Ok(request) => request,
                Err(error) => {
                    tracing::warn!(worker = self.name(), error = %error, "malformed request");
                    self.respond(plain(StatusCode::BAD_REQUEST, error.message().to_string()))
                        .await;
                    continue;
                }
            };
            self.handle_request(request).await;
        }
        tracing::info!(worker = self.name(), "transport closed, worker stopping");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, RawRequest};
    use crate::http_errors::{ErrorResponse, ErrorType};
    use crate::impls::{InMemoryHttpTransport, InMemorySession, InstanceCache};
    use http::header::CONTENT_TYPE;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// ルート: `/hello`, `/admin` (403), `/crash` (fault), それ以外は 404
    struct TestApp {
        production: bool,
        language: String,
        flushes: AtomicUsize,
        cache: Arc<InstanceCache<String, String>>,
        cache_sizes: Mutex<Vec<usize>>,
    }

    impl TestApp {
        fn new(production: bool) -> Self {
            Self {
                production,
                language: "cs".to_string(),
                flushes: AtomicUsize::new(0),
                cache: Arc::new(InstanceCache::new("test")),
                cache_sizes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Application for TestApp {
        async fn run(&self, request: &AppRequest) -> Result<Response<Bytes>, CourierError> {
            self.cache_sizes.lock().unwrap().push(self.cache.len());
            self.cache
                .get_or_insert_with(request.uri().path().to_string(), || "seen".to_string());
            match request.uri().path() {
                "/hello" => Ok(Response::new(Bytes::from("hello"))),
                "/admin" => Err(CourierError::access_denied("admins only")),
                "/crash" => Err(CourierError::application("kaboom")),
                path => Err(CourierError::route_not_found(format!("no route for {path}"))),
            }
        }

        fn language(&self) -> String {
            self.language.clone()
        }

        fn is_production(&self) -> bool {
            self.production
        }

        async fn flush_side_effects(&self) -> Result<(), CourierError> {
            self.flushes.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        kinds: Mutex<Vec<ErrorKind>>,
    }

    impl ExceptionLogger for RecordingLogger {
        fn log(&self, error: &CourierError) {
            self.kinds.lock().unwrap().push(error.kind());
        }
    }

    /// close が常に失敗する session
    #[derive(Default)]
    struct BrokenCloseSession {
        inner: InMemorySession,
    }

    #[async_trait]
    impl Session for BrokenCloseSession {
        fn is_initialized(&self) -> bool {
            self.inner.is_initialized()
        }

        async fn init(&self) -> Result<(), CourierError> {
            self.inner.init().await
        }

        fn cookie_header(&self) -> String {
            self.inner.cookie_header()
        }

        async fn close(&self) -> Result<(), CourierError> {
            Err(CourierError::application("session storage unavailable"))
        }
    }

    struct Harness {
        transport: Arc<InMemoryHttpTransport>,
        app: Arc<TestApp>,
        session: Arc<InMemorySession>,
        logger: Arc<RecordingLogger>,
        worker: HttpWorker,
    }

    fn harness(production: bool, requests: Vec<RawRequest>) -> Harness {
        harness_with(TestApp::new(production), requests)
    }

    fn harness_with(app: TestApp, requests: Vec<RawRequest>) -> Harness {
        let transport = Arc::new(InMemoryHttpTransport::scripted(requests));
        let app = Arc::new(app);
        let session = Arc::new(InMemorySession::default());
        let logger = Arc::new(RecordingLogger::default());
        let worker = HttpWorker::new(transport.clone(), app.clone(), session.clone())
            .with_scope(IterationScope::new().with_cache(app.cache.clone()))
            .with_exception_logger(logger.clone());
        Harness {
            transport,
            app,
            session,
            logger,
            worker,
        }
    }

    #[tokio::test]
    async fn test_closed_transport_ends_run() {
        let mut h = harness(true, Vec::new());
        h.worker.run().await.unwrap();
        assert!(h.transport.take_responses().is_empty());
    }

    #[tokio::test]
    async fn test_successful_request_gets_language_and_cookie() {
        let mut h = harness(true, vec![RawRequest::new("GET", "/hello")]);
        h.worker.run().await.unwrap();

        let responses = h.transport.take_responses();
        assert_eq!(responses.len(), 1);
        let response = &responses[0];
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"hello");
        assert_eq!(response.headers()[CONTENT_LANGUAGE], "cs");
        assert!(
            response.headers()[SET_COOKIE]
                .to_str()
                .unwrap()
                .starts_with("SESSID=")
        );
        assert_eq!(h.app.flushes.load(Ordering::Relaxed), 1);
        assert_eq!(h.session.close_count(), 1);
    }

    #[tokio::test]
    async fn test_not_found_as_json() {
        let mut h = harness(
            true,
            vec![RawRequest::new("GET", "/missing").with_header("Accept", "application/json")],
        );
        h.worker.run().await.unwrap();

        let responses = h.transport.take_responses();
        assert_eq!(responses.len(), 1);
        let response = &responses[0];
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body: ErrorResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body.error_type, ErrorType::NotFound);
        assert_eq!(body.detail.as_deref(), Some("no route for /missing"));
    }

    #[tokio::test]
    async fn test_malformed_request_gets_fixed_400_and_loop_continues() {
        let mut h = harness(
            true,
            vec![RawRequest::new("GE T", "/hello"), RawRequest::new("GET", "/hello")],
        );
        h.worker.run().await.unwrap();

        let responses = h.transport.take_responses();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].status(), StatusCode::BAD_REQUEST);
        assert!(
            std::str::from_utf8(responses[0].body())
                .unwrap()
                .contains("invalid method")
        );
        assert_eq!(responses[1].status(), StatusCode::OK);
        // 不正なリクエストはアプリケーションに届かない
        assert_eq!(h.app.cache_sizes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_loop() {
        let mut h = harness(
            true,
            vec![
                RawRequest::new("GET", "/admin").with_header("Accept", "text/html"),
                RawRequest::new("GET", "/crash"),
                RawRequest::new("GET", "/hello"),
            ],
        );
        h.worker.run().await.unwrap();

        let statuses: Vec<_> = h
            .transport
            .take_responses()
            .iter()
            .map(|r| r.status())
            .collect();
        assert_eq!(
            statuses,
            vec![StatusCode::FORBIDDEN, StatusCode::INTERNAL_SERVER_ERROR, StatusCode::OK]
        );
    }

    #[tokio::test]
    async fn test_non_production_fault_renders_diagnostic_page() {
        let mut h = harness(
            false,
            vec![RawRequest::new("GET", "/crash").with_header("Accept", "application/json")],
        );
        h.worker.run().await.unwrap();

        let responses = h.transport.take_responses();
        assert_eq!(responses[0].status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(responses[0].headers()[CONTENT_TYPE], "text/html");
        assert!(std::str::from_utf8(responses[0].body()).unwrap().contains("kaboom"));
    }

    #[tokio::test]
    async fn test_session_initialised_once_and_caches_reset_each_iteration() {
        let mut h = harness(
            true,
            vec![
                RawRequest::new("GET", "/hello"),
                RawRequest::new("GET", "/other"),
                RawRequest::new("GET", "/hello"),
            ],
        );
        h.worker.run().await.unwrap();

        assert_eq!(h.session.init_count(), 1);
        assert_eq!(*h.app.cache_sizes.lock().unwrap(), vec![0, 0, 0]);
        assert_eq!(h.worker.scope().iterations(), 3);
    }

    #[tokio::test]
    async fn test_exception_logger_sees_classified_kinds() {
        let mut h = harness(
            true,
            vec![
                RawRequest::new("GET", "/missing"),
                RawRequest::new("GET", "/admin"),
                RawRequest::new("GET", "/crash"),
                RawRequest::new("GET", "/hello"),
            ],
        );
        h.worker.run().await.unwrap();

        assert_eq!(h.transport.take_responses().len(), 4);
        assert_eq!(
            *h.logger.kinds.lock().unwrap(),
            vec![ErrorKind::RouteNotFound, ErrorKind::AccessDenied, ErrorKind::ApplicationFault]
        );
    }

    #[tokio::test]
    async fn test_close_failure_after_response_is_logged_only() {
        let transport = Arc::new(InMemoryHttpTransport::scripted(vec![RawRequest::new(
            "GET", "/hello",
        )]));
        let app = Arc::new(TestApp::new(true));
        let logger = Arc::new(RecordingLogger::default());
        let mut worker = HttpWorker::new(
            transport.clone(),
            app.clone(),
            Arc::new(BrokenCloseSession::default()),
        )
        .with_exception_logger(logger.clone());
        worker.run().await.unwrap();

        let responses = transport.take_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status(), StatusCode::OK);
        assert_eq!(*logger.kinds.lock().unwrap(), vec![ErrorKind::ApplicationFault]);
        // close が先に失敗するので flush は走らない
        assert_eq!(app.flushes.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_rejected_language_header_is_classified_as_fault() {
        let mut app = TestApp::new(true);
        app.language = "bad\nvalue".to_string();
        let mut h = harness_with(app, vec![RawRequest::new("GET", "/hello")]);
        h.worker.run().await.unwrap();

        let responses = h.transport.take_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!responses[0].headers().contains_key(CONTENT_LANGUAGE));
        assert_eq!(*h.logger.kinds.lock().unwrap(), vec![ErrorKind::ApplicationFault]);
        assert_eq!(h.session.close_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_language_header_renders_diagnostic_outside_production() {
        let mut app = TestApp::new(false);
        app.language = "bad\nvalue".to_string();
        let mut h = harness_with(app, vec![RawRequest::new("GET", "/hello")]);
        h.worker.run().await.unwrap();

        let responses = h.transport.take_responses();
        assert_eq!(responses[0].status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(responses[0].headers()[CONTENT_TYPE], "text/html");
        assert!(
            std::str::from_utf8(responses[0].body())
                .unwrap()
                .contains("invalid Content-Language header value")
        );
    }
}
