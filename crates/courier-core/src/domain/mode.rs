//! Mode - プロセスが実行する worker ループの選択

use serde::{Deserialize, Serialize};
use std::fmt;

/// アプリケーションサーバーが各 worker プロセスに設定する環境変数
pub const MODE_ENV: &str = "RR_MODE";

/// Mode は環境変数から読む実行モード
///
/// 未知の値もそのまま保持する（Server がエラーメッセージに含めるため）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    Http,
    Jobs,
    Other(String),
}

impl Mode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Http => "http",
            Self::Jobs => "jobs",
            Self::Other(s) => s,
        }
    }

    /// [`MODE_ENV`] からモードを読む。未設定または UTF-8 でなければ `None`
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の環境変数ルックアップ経由でモードを読む
    pub fn from_lookup(lookup: impl FnOnce(&str) -> Option<String>) -> Option<Self> {
        lookup(MODE_ENV).map(Self::from)
    }
}

impl From<&str> for Mode {
    fn from(value: &str) -> Self {
        match value {
            "http" => Self::Http,
            "jobs" => Self::Jobs,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Mode {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
