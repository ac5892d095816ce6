//! IterationScope - イテレーションごとの状態リセット
//!
//! worker プロセスは長寿命です。ある処理単位でキャッシュしたものは次の処理単位の前に消えている必要があります。
//! ループ自身が新しいリクエストの束縛やタスクの解決より前に
//! [`IterationScope::begin_iteration`] を呼びます。

use std::sync::Arc;

use crate::ports::ScopedCache;

#[derive(Clone, Default)]
pub struct IterationScope {
    caches: Vec<Arc<dyn ScopedCache>>,
    iterations: u64,
}

impl IterationScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, cache: Arc<dyn ScopedCache>) {
        self.caches.push(cache);
    }

    pub fn with_cache(mut self, cache: Arc<dyn ScopedCache>) -> Self {
        self.register(cache);
        self
    }

    /// 登録済みキャッシュをすべてクリアし、イテレーション数を数える
    pub fn begin_iteration(&mut self) {
        for cache in &self.caches {
            cache.clear();
        }
        self.iterations += 1;
        tracing::trace!(iteration = self.iterations, caches = self.caches.len(), "iteration scope reset");
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
