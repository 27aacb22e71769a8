use protoreg_kafka::KafkaError;
use protoreg_protoschema::ExtractError;
use protoreg_schemaregistry::SchemaRegistryError;

/// WorkflowError はスキーマ操作ワークフローのエラーを表す。
///
/// `TopicUnset` / `TopicNotFound` / `SubjectNotFound` はワークフローによっては
/// エラーにせず、表示文言だけを情報メッセージとして返す。
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("can not extract topic and record from proto: {0}")]
    Parse(#[from] ExtractError),

    #[error("schema body is not valid UTF-8: {0}")]
    SchemaEncoding(#[from] std::str::Utf8Error),

    #[error("version is invalid: {token:?}")]
    InvalidVersion { token: String },

    #[error("topic is not set")]
    TopicUnset,

    #[error("topic {0:?} not exist")]
    TopicNotFound(String),

    #[error("schema {0:?} not exist yet")]
    SubjectNotFound(String),

    #[error("schema is not compatible with {subject}{}", describe_reasons(.messages))]
    IncompatibleSchema {
        subject: String,
        messages: Vec<String>,
    },

    #[error("schema registry {operation} failed for {target}: {source}")]
    Registry {
        operation: &'static str,
        target: String,
        #[source]
        source: SchemaRegistryError,
    },

    #[error("kafka {operation} failed for topic {topic}: {source}")]
    Cluster {
        operation: &'static str,
        topic: String,
        #[source]
        source: KafkaError,
    },

    #[error("{operation} cancelled")]
    Cancelled { operation: &'static str },

    #[error("invalid subject pattern: {0}")]
    TopicPattern(#[from] regex::Error),

    #[error("can not encode schema references: {0}")]
    References(#[from] serde_json::Error),
}

fn describe_reasons(messages: &[String]) -> String {
    if messages.is_empty() {
        String::new()
    } else {
        format!(": {}", messages.join("; "))
    }
}
