//! InMemorySession - プロセスメモリ上の cookie セッション

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use ulid::Ulid;

use crate::domain::CourierError;
use crate::ports::Session;

/// InMemorySession は worker プロセスと同じ寿命のセッション
///
/// `init` はプロセスで 1 回だけ走りセッション ID を発行する。`close` は回数を数えるだけ。
pub struct InMemorySession {
    cookie_name: String,
    id: Mutex<Option<Ulid>>,
    initialized: AtomicBool,
    inits: AtomicUsize,
    closes: AtomicUsize,
}

impl InMemorySession {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            id: Mutex::new(None),
            initialized: AtomicBool::new(false),
            inits: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::Relaxed)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::Relaxed)
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new("SESSID")
    }
}

#[async_trait]
impl Session for InMemorySession {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    async fn init(&self) -> Result<(), CourierError> {
        let mut id = self.id.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        id.get_or_insert_with(Ulid::new);
        self.inits.fetch_add(1, Ordering::Relaxed);
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    fn cookie_header(&self) -> String {
        let id = self.id.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match *id {
            Some(id) => format!("{}={}; Path=/; HttpOnly", self.cookie_name, id),
            None => format!("{}=; Path=/; HttpOnly", self.cookie_name),
        }
    }

    async fn close(&self) -> Result<(), CourierError> {
        self.closes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
