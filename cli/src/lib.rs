//! protoreg: Kafka トピックの Protobuf スキーマを Confluent Schema Registry と同期する CLI。
//!
//! proto 定義のメッセージオプション `(topic)` / `(record)` からサブジェクト
//! `{topic}-{record}-value` を決め、登録・互換性検証・削除・参照を行う。

pub mod app;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod usecase;

pub use app::run;
pub use cli::Cli;
