use std::time::Duration;

use async_trait::async_trait;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::error::{KafkaError as RdKafkaError, RDKafkaErrorCode};
use tracing::debug;

use crate::config::KafkaConfig;
use crate::error::KafkaError;

/// Kafka クラスタのメタデータを参照するインターフェース。
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait ClusterMetadata: Send + Sync {
    /// クラスタに存在するトピック名をブローカーの返却順で返す。
    async fn topics(&self) -> Result<Vec<String>, KafkaError>;
}

/// rdkafka の BaseConsumer でメタデータを取得する実装。
///
/// 接続は保持せず、呼び出しごとにコンシューマを生成する。
pub struct RdKafkaClusterMetadata {
    config: KafkaConfig,
}

impl RdKafkaClusterMetadata {
    pub fn new(config: KafkaConfig) -> Result<Self, KafkaError> {
        config.validate()?;
        Ok(Self { config })
    }
}

fn map_rdkafka_error(err: &RdKafkaError) -> KafkaError {
    match err.rdkafka_error_code() {
        Some(RDKafkaErrorCode::OperationTimedOut | RDKafkaErrorCode::RequestTimedOut) => {
            KafkaError::Timeout(format!("metadata request timed out: {err}"))
        }
        _ => KafkaError::ConnectionFailed(format!("Kafka broker unreachable: {err}")),
    }
}

#[async_trait]
impl ClusterMetadata for RdKafkaClusterMetadata {
    async fn topics(&self) -> Result<Vec<String>, KafkaError> {
        let client_config = self.config.client_config();
        let timeout = Duration::from_millis(self.config.request_timeout_ms);
        let brokers = self.config.bootstrap_servers();

        debug!(brokers = %brokers, "Fetching cluster metadata");

        // ブロッキング操作を spawn_blocking で実行
        let topics = tokio::task::spawn_blocking(move || {
            let consumer: BaseConsumer = client_config.create().map_err(|e| {
                KafkaError::ConfigurationError(format!("Kafka client creation failed: {e}"))
            })?;

            let metadata = consumer
                .fetch_metadata(None, timeout)
                .map_err(|e| map_rdkafka_error(&e))?;

            Ok::<_, KafkaError>(
                metadata
                    .topics()
                    .iter()
                    .map(|t| t.name().to_string())
                    .collect::<Vec<_>>(),
            )
        })
        .await
        .map_err(|e| KafkaError::ConnectionFailed(format!("Task join error: {e}")))??;

        debug!(brokers = %brokers, count = topics.len(), "Fetched cluster metadata");
        Ok(topics)
    }
}
