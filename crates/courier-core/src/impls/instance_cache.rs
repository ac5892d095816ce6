//! InstanceCache - イテレーション単位の identity map

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use crate::ports::ScopedCache;

/// InstanceCache は 1 処理単位の間だけロード済みインスタンスを保持
///
/// worker の `IterationScope` に登録すると、リクエストやタスクの前に毎回空になる。
pub struct InstanceCache<K, V> {
    name: String,
    entries: Mutex<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash, V> InstanceCache<K, V> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.lock().get(key).cloned()
    }

    pub fn get_or_insert_with(&self, key: K, load: impl FnOnce() -> V) -> Arc<V> {
        self.lock()
            .entry(key)
            .or_insert_with(|| Arc::new(load()))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, Arc<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K, V> ScopedCache for InstanceCache<K, V>
where
    K: Eq + Hash + Send,
    V: Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
