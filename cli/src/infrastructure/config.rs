//! 設定ファイル（YAML）の読み込みと、フラグ・環境変数とのマージ。
//!
//! 優先順位はフラグ > 環境変数 > 設定ファイル > 既定値。フラグと環境変数の
//! 解決は clap が行うため、ここでは設定ファイルと既定値による補完だけを扱う。

use std::path::{Path, PathBuf};

use protoreg_kafka::config::DEFAULT_BROKER;
use protoreg_kafka::{KafkaConfig, KafkaError};
use protoreg_schemaregistry::config::DEFAULT_URL;
use protoreg_schemaregistry::SchemaRegistryConfig;
use serde::Deserialize;

use crate::infrastructure::logging::{LogFormat, LogSettings, DEFAULT_LOG_LEVEL};

/// `SCHEMA_CONFIG` で指定する設定ファイルの内容。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub schema_registry: RegistrySection,
    pub kafka: KafkaSection,
    pub log: LogSection,
    /// YAML のマッピングでなかったため読み飛ばした設定ファイル。
    #[serde(skip)]
    pub ignored_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KafkaSection {
    pub brokers: Option<Vec<String>>,
    pub security_protocol: Option<String>,
    pub connection_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

/// 設定ファイルを読み込む。パスが指定されなければ空の設定を返す。
///
/// 指定されたファイルが読めない、または YAML として不正な場合はエラー。
/// `KEY=VALUE` 形式の dotenv ファイルのようにマッピング以外の YAML は
/// 既定値として扱い、`ignored_file` にパスを残す。
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("can not read config file {}: {}", path.display(), e))?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let value: serde_yaml::Value = serde_yaml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("can not parse config file {}: {}", path.display(), e))?;
    if !value.is_mapping() {
        return Ok(AppConfig {
            ignored_file: Some(path.to_path_buf()),
            ..AppConfig::default()
        });
    }
    let config = serde_yaml::from_value(value)
        .map_err(|e| anyhow::anyhow!("can not parse config file {}: {}", path.display(), e))?;
    Ok(config)
}

impl AppConfig {
    /// `url` はフラグまたは `SCHEMA_REGISTRY` の値。
    pub fn registry_config(&self, url: Option<&str>) -> SchemaRegistryConfig {
        let url = url
            .map(str::to_string)
            .or_else(|| self.schema_registry.url.clone())
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let config = SchemaRegistryConfig::new(url);
        match self.schema_registry.timeout_secs {
            Some(secs) => config.with_timeout_secs(secs),
            None => config,
        }
    }

    /// `brokers` はフラグまたは `CLUSTER` の値。空なら設定ファイル、既定値の順に使う。
    pub fn kafka_config(&self, brokers: &[String]) -> Result<KafkaConfig, KafkaError> {
        let brokers = if brokers.is_empty() {
            self.kafka
                .brokers
                .clone()
                .unwrap_or_else(|| vec![DEFAULT_BROKER.to_string()])
        } else {
            brokers.to_vec()
        };

        let mut builder = KafkaConfig::builder().brokers(brokers);
        if let Some(protocol) = &self.kafka.security_protocol {
            builder = builder.security_protocol(protocol);
        }
        if let Some(ms) = self.kafka.connection_timeout_ms {
            builder = builder.connection_timeout_ms(ms);
        }
        if let Some(ms) = self.kafka.request_timeout_ms {
            builder = builder.request_timeout_ms(ms);
        }
        builder.build()
    }

    pub fn log_settings(&self, level: Option<&str>, format: Option<LogFormat>) -> LogSettings {
        LogSettings {
            level: level
                .map(str::to_string)
                .or_else(|| self.log.level.clone())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            format: format.or(self.log.format).unwrap_or_default(),
        }
    }
}
