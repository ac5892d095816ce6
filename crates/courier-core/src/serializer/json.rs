//! JsonSerializer - type tag を明示したテキスト形式
//!
//! ワイヤ形式:
//! ```text
//! {"payloadType": "mail.send.v1", "data": { ...payload fields... }}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::TaskSerializer;
use crate::typed::{DynPayload, PayloadRegistry};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonEnvelope {
    payload_type: String,
    data: serde_json::Value,
}

#[derive(Clone)]
pub struct JsonSerializer {
    registry: Arc<PayloadRegistry>,
}

impl JsonSerializer {
    pub fn new(registry: Arc<PayloadRegistry>) -> Self {
        Self { registry }
    }
}

impl TaskSerializer for JsonSerializer {
    fn serialize(&self, payload: &dyn DynPayload) -> Option<Vec<u8>> {
        let data = match payload.to_json_value() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(type_tag = payload.type_tag(), error = %e, "json encode failed");
                return None;
            }
        };
        let envelope = JsonEnvelope {
            payload_type: payload.type_tag().to_string(),
            data,
        };
        serde_json::to_vec(&envelope).ok()
    }

    fn unserialize(&self, bytes: &[u8]) -> Option<Box<dyn DynPayload>> {
        let envelope: JsonEnvelope = serde_json::from_slice(bytes).ok()?;
        self.registry.decode_json(&envelope.payload_type, envelope.data)
    }
}
