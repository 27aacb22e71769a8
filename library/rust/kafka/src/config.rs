use rdkafka::config::ClientConfig;
use serde::{Deserialize, Serialize};

use crate::error::KafkaError;

/// 既定のブローカーアドレス。
pub const DEFAULT_BROKER: &str = "localhost:9092";

/// KafkaConfig はメタデータ取得に使う Kafka クライアントの接続設定を表す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Kafka ブローカーアドレスのリスト
    pub brokers: Vec<String>,
    /// セキュリティプロトコル（PLAINTEXT / SSL / SASL_PLAINTEXT / SASL_SSL）
    #[serde(default = "default_security_protocol")]
    pub security_protocol: String,
    /// 接続タイムアウト（ミリ秒）
    #[serde(default = "default_timeout_ms")]
    pub connection_timeout_ms: u64,
    /// リクエストタイムアウト（ミリ秒）。メタデータ取得の待ち時間にも使う。
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_security_protocol() -> String {
    "PLAINTEXT".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl KafkaConfig {
    /// ビルダーを取得する。
    pub fn builder() -> KafkaConfigBuilder {
        KafkaConfigBuilder::default()
    }

    /// ブローカーアドレスをカンマ区切り文字列で返す（rdkafka の bootstrap.servers 用）。
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }

    /// SSL / SASL_SSL なら true。
    pub fn uses_tls(&self) -> bool {
        self.security_protocol.ends_with("SSL")
    }

    /// ブローカーが 1 つ以上あり、空のアドレスを含まないことを検証する。
    pub fn validate(&self) -> Result<(), KafkaError> {
        if self.brokers.is_empty() {
            return Err(KafkaError::ConfigurationError(
                "at least one broker must be specified".to_string(),
            ));
        }
        if self.brokers.iter().any(|b| b.trim().is_empty()) {
            return Err(KafkaError::ConfigurationError(format!(
                "broker address must not be blank: {:?}",
                self.brokers
            )));
        }
        Ok(())
    }

    /// rdkafka のクライアント設定を生成する。
    pub fn client_config(&self) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", self.bootstrap_servers())
            .set("security.protocol", &self.security_protocol)
            .set(
                "socket.connection.setup.timeout.ms",
                self.connection_timeout_ms.to_string(),
            )
            .set("socket.timeout.ms", self.request_timeout_ms.to_string());
        client_config
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec![DEFAULT_BROKER.to_string()],
            security_protocol: default_security_protocol(),
            connection_timeout_ms: default_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// KafkaConfigBuilder は KafkaConfig のビルダー。
#[derive(Default)]
pub struct KafkaConfigBuilder {
    brokers: Vec<String>,
    security_protocol: Option<String>,
    connection_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
}

impl KafkaConfigBuilder {
    /// ブローカーアドレスを設定する。
    pub fn brokers(mut self, brokers: Vec<String>) -> Self {
        self.brokers = brokers;
        self
    }

    /// セキュリティプロトコルを設定する。
    pub fn security_protocol(mut self, protocol: &str) -> Self {
        self.security_protocol = Some(protocol.to_string());
        self
    }

    /// 接続タイムアウト（ミリ秒）を設定する。
    pub fn connection_timeout_ms(mut self, ms: u64) -> Self {
        self.connection_timeout_ms = Some(ms);
        self
    }

    /// リクエストタイムアウト（ミリ秒）を設定する。
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = Some(ms);
        self
    }

    /// KafkaConfig を構築する。ブローカーが未設定または空の場合はエラーを返す。
    pub fn build(self) -> Result<KafkaConfig, KafkaError> {
        let config = KafkaConfig {
            brokers: self.brokers,
            security_protocol: self
                .security_protocol
                .unwrap_or_else(default_security_protocol),
            connection_timeout_ms: self.connection_timeout_ms.unwrap_or_else(default_timeout_ms),
            request_timeout_ms: self
                .request_timeout_ms
                .unwrap_or_else(default_request_timeout_ms),
        };
        config.validate()?;
        Ok(config)
    }
}
