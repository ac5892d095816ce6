//! bincode によるバイナリ戦略
//!
//! どちらも `{type_tag, data}` レコードをエンコードし、`data` は同じオプションでエンコードした payload です。
//! 違いは整数のエンコードのみ（native は固定長、compact は varint）。
//!
//! # 検証
//! bincode は自己記述的でないため、エンコード後に registry で読み戻せることを確かめます。
//! 読み戻せない payload は `None` になります。

use std::sync::Arc;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::TaskSerializer;
use crate::typed::{DynPayload, PayloadRegistry};

/// 1 回のデコードの上限（壊れた長さプレフィックスで無制限に確保させない）
const DECODE_LIMIT: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryEncoding {
    Fixed,
    Varint,
}

impl BinaryEncoding {
    pub fn serialize<T: Serialize + ?Sized>(self, value: &T) -> bincode::Result<Vec<u8>> {
        match self {
            Self::Fixed => bincode::DefaultOptions::new()
                .with_fixint_encoding()
                .serialize(value),
            Self::Varint => bincode::DefaultOptions::new()
                .with_varint_encoding()
                .serialize(value),
        }
    }

    /// 末尾の余分なバイトは拒否
    pub fn deserialize<T: DeserializeOwned>(self, bytes: &[u8]) -> bincode::Result<T> {
        match self {
            Self::Fixed => bincode::DefaultOptions::new()
                .with_fixint_encoding()
                .with_limit(DECODE_LIMIT)
                .deserialize(bytes),
            Self::Varint => bincode::DefaultOptions::new()
                .with_varint_encoding()
                .with_limit(DECODE_LIMIT)
                .deserialize(bytes),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BinaryEnvelope {
    type_tag: String,
    data: Vec<u8>,
}

fn encode(
    encoding: BinaryEncoding,
    registry: &PayloadRegistry,
    payload: &dyn DynPayload,
) -> Option<Vec<u8>> {
    let type_tag = payload.type_tag();
    let data = match payload.to_binary(encoding) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(type_tag, error = %e, "binary encode failed");
            return None;
        }
    };
    // skip されたフィールドや flatten / untagged はエンコードできてもデコードできない
    if registry.contains(type_tag) && registry.decode_binary(type_tag, encoding, &data).is_none() {
        tracing::warn!(type_tag, "payload does not decode back from binary encoding");
        return None;
    }
    let envelope = BinaryEnvelope {
        type_tag: type_tag.to_string(),
        data,
    };
    encoding.serialize(&envelope).ok()
}

fn decode(
    encoding: BinaryEncoding,
    registry: &PayloadRegistry,
    bytes: &[u8],
) -> Option<Box<dyn DynPayload>> {
    let envelope: BinaryEnvelope = encoding.deserialize(bytes).ok()?;
    registry.decode_binary(&envelope.type_tag, encoding, &envelope.data)
}

/// NativeSerializer - 固定長 bincode（エンコード / デコードが最速）
#[derive(Clone)]
pub struct NativeSerializer {
    registry: Arc<PayloadRegistry>,
}

impl NativeSerializer {
    pub fn new(registry: Arc<PayloadRegistry>) -> Self {
        Self { registry }
    }
}

impl TaskSerializer for NativeSerializer {
    fn serialize(&self, payload: &dyn DynPayload) -> Option<Vec<u8>> {
        encode(BinaryEncoding::Fixed, &self.registry, payload)
    }

    fn unserialize(&self, bytes: &[u8]) -> Option<Box<dyn DynPayload>> {
        decode(BinaryEncoding::Fixed, &self.registry, bytes)
    }
}

/// CompactSerializer - varint bincode（サイズが小さい）
#[derive(Clone)]
pub struct CompactSerializer {
    registry: Arc<PayloadRegistry>,
}

impl CompactSerializer {
    pub fn new(registry: Arc<PayloadRegistry>) -> Self {
        Self { registry }
    }
}

impl TaskSerializer for CompactSerializer {
    fn serialize(&self, payload: &dyn DynPayload) -> Option<Vec<u8>> {
        encode(BinaryEncoding::Varint, &self.registry, payload)
    }

    fn unserialize(&self, bytes: &[u8]) -> Option<Box<dyn DynPayload>> {
        decode(BinaryEncoding::Varint, &self.registry, bytes)
    }
}
