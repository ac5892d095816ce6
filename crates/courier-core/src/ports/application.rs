//! Application ports - worker が駆動するフレームワーク側
//!
//! worker はこれらを構築時に明示的な依存として受け取ります。
//! グローバル状態からの遅延ルックアップはしません。

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;

use crate::domain::{AppRequest, CourierError, RawRequest};

/// Application はリクエストをレスポンスに変換
///
/// ルーティングの失敗は error kind で伝える
/// （`CourierError::route_not_found` / `CourierError::access_denied`）
#[async_trait]
pub trait Application: Send + Sync {
    async fn run(&self, request: &AppRequest) -> Result<Response<Bytes>, CourierError>;

    /// 現在のリクエストの言語（`Content-Language` として送る）
    fn language(&self) -> String;

    fn is_production(&self) -> bool;

    /// 溜めておいた副作用を flush（保留中の翻訳更新など）
    ///
    /// 処理単位ごとに 1 回、レスポンスまたはタスクの結果の後に呼ばれる
    async fn flush_side_effects(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

/// Session は処理中のリクエストに紐づくセッション
#[async_trait]
pub trait Session: Send + Sync {
    fn is_initialized(&self) -> bool;

    async fn init(&self) -> Result<(), CourierError>;

    /// `Set-Cookie` ヘッダーの値
    fn cookie_header(&self) -> String;

    async fn close(&self) -> Result<(), CourierError>;
}

/// RequestFactory は transport から届いたものを [`AppRequest`] に変換
///
/// ここでの失敗は境界違反。worker は固定の 400 を返し、アプリケーションには入らない。
pub trait RequestFactory: Send + Sync {
    fn from_raw(&self, raw: RawRequest) -> Result<AppRequest, CourierError>;
}
