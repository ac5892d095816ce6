//! InMemoryHttpTransport - 開発・テスト用の台本どおりにリクエストを出す transport

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;
use tokio::sync::Notify;

use crate::domain::RawRequest;
use crate::ports::{HttpTransport, TransportError};

struct TransportState {
    requests: VecDeque<RawRequest>,
    responses: Vec<Response<Bytes>>,
    closed: bool,
}

/// リクエストは送られた順に配り、レスポンスは取り出されるまで保持する
pub struct InMemoryHttpTransport {
    state: Mutex<TransportState>,
    notify: Notify,
}

impl InMemoryHttpTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TransportState {
                requests: VecDeque::new(),
                responses: Vec::new(),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// `requests` を配り終えたら閉じる transport
    pub fn scripted(requests: impl IntoIterator<Item = RawRequest>) -> Self {
        let transport = Self::new();
        for request in requests {
            transport.send(request);
        }
        transport.close();
        transport
    }

    pub fn send(&self, request: RawRequest) {
        self.lock().requests.push_back(request);
        self.notify.notify_one();
    }

    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    /// これまでに書かれたレスポンスを取り出す
    pub fn take_responses(&self) -> Vec<Response<Bytes>> {
        std::mem::take(&mut self.lock().responses)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TransportState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InMemoryHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for InMemoryHttpTransport {
    async fn wait_request(&self) -> Result<Option<RawRequest>, TransportError> {
        loop {
            {
                let mut state = self.lock();
                if let Some(request) = state.requests.pop_front() {
                    return Ok(Some(request));
                }
                if state.closed {
                    return Ok(None);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn respond(&self, response: Response<Bytes>) -> Result<(), TransportError> {
        self.lock().responses.push(response);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_transport_serves_then_closes() {
        let transport = InMemoryHttpTransport::scripted([
            RawRequest::new("GET", "/a"),
            RawRequest::new("GET", "/b"),
        ]);

        assert_eq!(transport.wait_request().await.unwrap().unwrap().uri, "/a");
        assert_eq!(transport.wait_request().await.unwrap().unwrap().uri, "/b");
        assert!(transport.wait_request().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_responses_are_collected() {
        let transport = InMemoryHttpTransport::new();
        transport.respond(Response::new(Bytes::from("ok"))).await.unwrap();

        let responses = transport.take_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].body().as_ref(), b"ok");
        assert!(transport.take_responses().is_empty());
    }
}
