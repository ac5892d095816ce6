//! ScopedCache port - 処理単位を越えて残してはいけない状態

/// ScopedCache は worker が毎イテレーションの先頭でクリアする
pub trait ScopedCache: Send + Sync {
    fn name(&self) -> &str;

    fn clear(&self);
}
