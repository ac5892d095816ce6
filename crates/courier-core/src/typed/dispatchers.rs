//! DispatcherRegistry - jobs worker が使う名前 → dispatcher の対応表

use std::collections::HashMap;
use std::sync::Arc;

use super::dispatcher::{DynDispatcher, TaskDispatcher, TypedDispatcher};
use super::registry::RegistryError;

/// DispatcherRegistry は処理時にタスク名から dispatcher を解決
///
/// # 使用例
/// ```ignore
/// let mut dispatchers = DispatcherRegistry::new();
/// dispatchers.register(SendMailDispatcher)?;
/// let handler = dispatchers.get("mail.send");
/// ```
#[derive(Default)]
pub struct DispatcherRegistry {
    dispatchers: HashMap<String, Arc<dyn DynDispatcher>>,
}

impl DispatcherRegistry {
    pub fn new() -> Self {
        Self {
            dispatchers: HashMap::new(),
        }
    }

    pub fn register<D: TaskDispatcher>(&mut self, dispatcher: D) -> Result<(), RegistryError> {
        self.register_dyn(Arc::new(TypedDispatcher::new(dispatcher)))
    }

    /// 型消去済みの dispatcher を自身の名前で登録
    pub fn register_dyn(&mut self, dispatcher: Arc<dyn DynDispatcher>) -> Result<(), RegistryError> {
        let name = dispatcher.name().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyDispatcherName);
        }
        if self.dispatchers.contains_key(&name) {
            return Err(RegistryError::DispatcherAlreadyRegistered(name));
        }
        self.dispatchers.insert(name, dispatcher);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DynDispatcher>> {
        self.dispatchers.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }

    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dispatchers.keys().cloned().collect();
        names.sort();
        names
    }
}
