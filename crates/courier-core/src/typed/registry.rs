//! PayloadRegistry - type tag → デコーダの対応表
//!
//! Serializer は payload の type tag をデータと一緒に書き込みます。
//! 読み戻すときはここで tag を引いて具体型のデコーダを選びます。
//!
//! # 学習ポイント
//! - 単相化した関数ポインタによる型消去 (`fn(&[u8]) -> Option<Box<dyn DynPayload>>`)

use std::collections::HashMap;

use super::payload::{DynPayload, Payload};
use crate::serializer::binary::BinaryEncoding;

type JsonDecoder = fn(serde_json::Value) -> serde_json::Result<Box<dyn DynPayload>>;
type BinaryDecoder = fn(BinaryEncoding, &[u8]) -> bincode::Result<Box<dyn DynPayload>>;

#[derive(Clone, Copy)]
struct Decoders {
    json: JsonDecoder,
    binary: BinaryDecoder,
}

fn decode_json<P: Payload>(value: serde_json::Value) -> serde_json::Result<Box<dyn DynPayload>> {
    let payload: P = serde_json::from_value(value)?;
    Ok(Box::new(payload))
}

fn decode_binary<P: Payload>(
    encoding: BinaryEncoding,
    bytes: &[u8],
) -> bincode::Result<Box<dyn DynPayload>> {
    let payload: P = encoding.deserialize(bytes)?;
    Ok(Box::new(payload))
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("payload type '{0}' is already registered")]
    PayloadAlreadyRegistered(String),

    #[error("dispatcher '{0}' is already registered")]
    DispatcherAlreadyRegistered(String),

    #[error("dispatcher name must not be empty")]
    EmptyDispatcherName,
}

/// PayloadRegistry は worker が復元できる payload 型をすべて知っている
///
/// # 使用例
/// ```ignore
/// let mut payloads = PayloadRegistry::new();
/// payloads.register::<SendMail>()?;
/// let serializer = JsonSerializer::new(Arc::new(payloads));
/// ```
///
/// 初期化時に構築し、以降は読み取り専用で共有する。
#[derive(Default)]
pub struct PayloadRegistry {
    decoders: HashMap<&'static str, Decoders>,
}

impl PayloadRegistry {
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    pub fn register<P: Payload>(&mut self) -> Result<(), RegistryError> {
        if self.decoders.contains_key(P::TYPE) {
            return Err(RegistryError::PayloadAlreadyRegistered(P::TYPE.to_string()));
        }
        self.decoders.insert(
            P::TYPE,
            Decoders {
                json: decode_json::<P>,
                binary: decode_binary::<P>,
            },
        );
        Ok(())
    }

    /// Builder 形式の [`register`](Self::register)
    pub fn with<P: Payload>(mut self) -> Result<Self, RegistryError> {
        self.register::<P>()?;
        Ok(self)
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.decoders.contains_key(type_tag)
    }

    /// tag が未知、またはデコードできなければ `None`
    pub fn decode_json(
        &self,
        type_tag: &str,
        value: serde_json::Value,
    ) -> Option<Box<dyn DynPayload>> {
        let decoders = self.decoders.get(type_tag)?;
        (decoders.json)(value).ok()
    }

    /// tag が未知、またはデコードできなければ `None`
    pub fn decode_binary(
        &self,
        type_tag: &str,
        encoding: BinaryEncoding,
        bytes: &[u8],
    ) -> Option<Box<dyn DynPayload>> {
        let decoders = self.decoders.get(type_tag)?;
        (decoders.binary)(encoding, bytes).ok()
    }

    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.decoders.keys().copied().collect();
        types.sort_unstable();
        types
    }
}
