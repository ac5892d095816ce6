//! Payload trait - 型付きタスク payload と型消去した形
//!
//! # 2 層構造
//! - `Payload`: アプリケーションの型が実装する。type tag を持つ
//! - `DynPayload`: serializer と jobs worker が使う object-safe な形

use std::any::Any;
use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::serializer::binary::BinaryEncoding;

/// Payload は具体型と安定した type tag を結びつける
///
/// # 使用例
/// ```ignore
/// #[derive(Debug, Serialize, Deserialize)]
/// struct SendMail {
///     to: String,
/// }
///
/// impl Payload for SendMail {
///     const TYPE: &'static str = "mail.send.v1";
/// }
/// ```
///
/// tag はエンコード済みデータと一緒に書き込まれ、汎用の unserializer が正しい型を復元する。
/// 変更するとキューに残っているタスクが読めなくなる。
pub trait Payload: Serialize + DeserializeOwned + Debug + Send + Sync + 'static {
    const TYPE: &'static str;
}

/// DynPayload は型消去した [`Payload`]
pub trait DynPayload: Debug + Send + Sync {
    fn type_tag(&self) -> &'static str;

    fn to_json_value(&self) -> serde_json::Result<serde_json::Value>;

    fn to_binary(&self, encoding: BinaryEncoding) -> bincode::Result<Vec<u8>>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<P: Payload> DynPayload for P {
    fn type_tag(&self) -> &'static str {
        P::TYPE
    }

    fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    fn to_binary(&self, encoding: BinaryEncoding) -> bincode::Result<Vec<u8>> {
        encoding.serialize(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl dyn DynPayload {
    pub fn is<P: Payload>(&self) -> bool {
        self.as_any().is::<P>()
    }

    pub fn downcast_ref<P: Payload>(&self) -> Option<&P> {
        self.as_any().downcast_ref::<P>()
    }

    /// 具体型を取り出す。型が違えば box をそのまま返す
    pub fn downcast<P: Payload>(self: Box<Self>) -> Result<P, Box<dyn DynPayload>> {
        if self.is::<P>() {
            match self.into_any().downcast::<P>() {
                Ok(p) => Ok(*p),
                Err(_) => unreachable!("type checked above"),
            }
        } else {
            Err(self)
        }
    }
}
