//! courier-core
//!
//! アプリケーションサーバーとアプリケーションをつなぐ worker 側のブリッジ。
//! サーバーが HTTP リクエストやキューのタスクを配り、worker プロセスは実行モードごとに
//! 1 つのループを回して処理単位をアプリケーションへ渡します。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（request, task, mode, error kind）
//! - **ports**: 抽象化レイヤー（transport, task queue, application, session, logger）
//! - **typed**: 型付き API（`Payload` / `TaskDispatcher` とその registry）
//! - **serializer**: payload のエンコード戦略（native, compact, json）
//! - **http_errors**: エラー分類とコンテントネゴシエーションしたエラーレスポンス
//! - **app**: アプリケーションロジック（worker ループ, server, task producer）
//! - **impls**: 実装（in-memory transport など開発用）
//! - **config** / **observability**: プロセスのセットアップ

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_errors;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod serializer;
pub mod typed;
pub mod worker;

pub use self::app::{HttpWorker, JobsWorker, Server, ServerBuilder, TaskProducer};
pub use self::domain::{CourierError, ErrorKind, Mode};
pub use self::error::{ConfigurationError, ServerError, WorkerError};
pub use self::worker::Worker;
