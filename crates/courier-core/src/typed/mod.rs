//! Typed - 型付き payload / dispatcher API
//!
//! type tag と dispatcher 名は関連定数として型に置くので、送信側と受信側で食い違いません。
//!
//! # 2 層構造
//! - **Typed**: `Payload`, `TaskDispatcher` - アプリケーションコードが実装する
//! - **Dyn**: `DynPayload`, `DynDispatcher` - object-safe（型消去済み）

pub mod dispatcher;
pub mod dispatchers;
pub mod payload;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::dispatcher::{DynDispatcher, TaskDispatcher, TypedDispatcher};
pub use self::dispatchers::DispatcherRegistry;
pub use self::payload::{DynPayload, Payload};
pub use self::registry::{PayloadRegistry, RegistryError};
