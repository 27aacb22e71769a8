pub mod delete;
pub mod export;
pub mod inspect;
pub mod preamble;
pub mod register;
pub mod subjects;
pub mod validate;
pub mod versions;

pub use delete::{DeleteArgs, DeleteSchemaUseCase};
pub use export::ExportSchemaUseCase;
pub use inspect::InspectSchemaUseCase;
pub use preamble::{SchemaSource, SchemaVersionArgs, SubjectArgs};
pub use register::RegisterSchemaUseCase;
pub use subjects::ListSubjectsUseCase;
pub use validate::ValidateSchemaUseCase;
pub use versions::ListVersionsUseCase;

use std::future::Future;

use protoreg_kafka::KafkaError;
use protoreg_schemaregistry::SchemaRegistryError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::domain::WorkflowError;

/// 外部呼び出しをキャンセルトークンと競合させる。キャンセルが先なら `Cancelled`。
async fn cancellable<T>(
    cancel: &CancellationToken,
    operation: &'static str,
    call: impl Future<Output = T>,
) -> Result<T, WorkflowError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            warn!(operation, "Workflow cancelled before the call completed");
            Err(WorkflowError::Cancelled { operation })
        }
        value = call => Ok(value),
    }
}

/// Schema Registry 呼び出しを実行し、失敗を操作名と対象付きで包む。
pub(crate) async fn registry_call<T>(
    cancel: &CancellationToken,
    operation: &'static str,
    target: &str,
    call: impl Future<Output = Result<T, SchemaRegistryError>>,
) -> Result<T, WorkflowError> {
    cancellable(cancel, operation, call)
        .await?
        .map_err(|source| WorkflowError::Registry {
            operation,
            target: target.to_string(),
            source,
        })
}

/// Kafka クラスタ呼び出しを実行し、失敗を操作名とトピック付きで包む。
pub(crate) async fn cluster_call<T>(
    cancel: &CancellationToken,
    operation: &'static str,
    topic: &str,
    call: impl Future<Output = Result<T, KafkaError>>,
) -> Result<T, WorkflowError> {
    cancellable(cancel, operation, call)
        .await?
        .map_err(|source| WorkflowError::Cluster {
            operation,
            topic: topic.to_string(),
            source,
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use protoreg_kafka::MockClusterMetadata;
    use protoreg_schemaregistry::{RegisteredSchema, SchemaType};

    /// 指定したトピックを返すクラスタのモック。呼ばれなくてもよい。
    pub fn cluster_with_topics(topics: &[&str]) -> MockClusterMetadata {
        let topics: Vec<String> = topics.iter().map(|t| (*t).to_string()).collect();
        let mut cluster = MockClusterMetadata::new();
        cluster
            .expect_topics()
            .returning(move || Ok(topics.clone()));
        cluster
    }

    pub fn proto_with(topic: &str, record: &str) -> Vec<u8> {
        format!(
            "syntax = \"proto3\";\nmessage Currency {{\n  option (topic) = \"{topic}\";\n  option (record) = \"{record}\";\n  string left = 1;\n}}\n"
        )
        .into_bytes()
    }

    pub fn registered(subject: &str, id: i32, version: i32, schema: &str) -> RegisteredSchema {
        RegisteredSchema {
            id,
            subject: subject.to_string(),
            version,
            schema: schema.to_string(),
            schema_type: SchemaType::Protobuf,
            references: Vec::new(),
        }
    }
}
