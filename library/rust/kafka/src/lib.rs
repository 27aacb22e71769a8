//! protoreg-kafka: Kafka クラスタ接続設定とメタデータ取得ライブラリ。
//!
//! スキーマ登録前のトピック存在確認に使う、トピック一覧の取得を提供する。

pub mod config;
pub mod error;
pub mod metadata;

pub use config::{KafkaConfig, KafkaConfigBuilder};
pub use error::KafkaError;
pub use metadata::{ClusterMetadata, RdKafkaClusterMetadata};

#[cfg(feature = "mock")]
pub use metadata::MockClusterMetadata;
