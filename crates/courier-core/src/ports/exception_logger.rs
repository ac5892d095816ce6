//! ExceptionLogger port - 分類済みエラーのプロセス全体の出力先

use crate::domain::CourierError;

/// ExceptionLogger は worker が分類したすべてのエラーを受け取る
///
/// 実装はエラートラッカーへ転送してよい。デフォルト実装は `tracing` に書く。
pub trait ExceptionLogger: Send + Sync {
    fn log(&self, error: &CourierError);
}
