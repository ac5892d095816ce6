//! Observability - worker プロセスの tracing subscriber 設定

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "courier=info,courier_core=info,courier_cli=info";

/// `RUST_LOG` でフィルタするグローバルな fmt subscriber を登録
///
/// worker プロセスは stdio パイプでアプリケーションサーバーと通信するため、ログは stderr に出す。
/// 2 回目以降の呼び出しは無視される。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
