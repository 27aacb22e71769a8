use serde::{Deserialize, Serialize};

/// Schema Registry 接続設定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRegistryConfig {
    /// Schema Registry の URL。
    /// 例: "http://localhost:8081"
    pub url: String,

    /// HTTP タイムアウト（秒）。
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// 既定の Schema Registry URL。
pub const DEFAULT_URL: &str = "http://localhost:8081";

fn default_timeout_secs() -> u64 {
    30
}

impl SchemaRegistryConfig {
    /// 指定した URL で設定を作成する。タイムアウトは 30 秒。
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// タイムアウト（秒）を差し替える。
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for SchemaRegistryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}
