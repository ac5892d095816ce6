use async_trait::async_trait;

use crate::error::WorkerError;

/// Worker は 1 つの実行モードに対応する worker ループ
///
/// # 設計原則
/// - `run` が `Ok(())` を返すのは transport が閉じたときだけ
/// - 処理単位ごとの失敗はループ内で処理し、呼び出し元には返さない
#[async_trait]
pub trait Worker: Send {
    fn name(&self) -> &'static str;

    async fn run(&mut self) -> Result<(), WorkerError>;
}
