//! protoreg-schemaregistry: Confluent Schema Registry クライアントライブラリ。
//!
//! Kafka トピックに対する Protobuf スキーマの登録・取得・削除・互換性検証を提供する。
//!
//! # 使用例
//!
//! ```rust,no_run
//! use protoreg_schemaregistry::{
//!     HttpSchemaRegistryClient, SchemaRegistryClient, SchemaRegistryConfig, SchemaType,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SchemaRegistryConfig::new("http://localhost:8081");
//!     let client = HttpSchemaRegistryClient::new(config)?;
//!
//!     let schema = client
//!         .register_schema(
//!             "rates-usd_eur-value",
//!             r#"syntax = "proto3"; message Currency {}"#,
//!             SchemaType::Protobuf,
//!         )
//!         .await?;
//!
//!     println!("Registered schema id={} version={}", schema.id, schema.version);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod schema;

pub use client::{HttpSchemaRegistryClient, SchemaRegistryClient};
pub use config::SchemaRegistryConfig;
pub use error::SchemaRegistryError;
pub use schema::{CompatibilityResult, RegisteredSchema, SchemaReference, SchemaType};

#[cfg(feature = "mock")]
pub use client::MockSchemaRegistryClient;
