use std::sync::Arc;

use protoreg_kafka::ClusterMetadata;
use protoreg_schemaregistry::{SchemaRegistryClient, SchemaType};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::{Payload, VersionSpec, WorkflowError, WorkflowOutcome};
use crate::usecase::preamble::{preflight, subject_exists, Preflight, SchemaSource};
use crate::usecase::registry_call;

/// 互換性がある場合の表示文言。
pub const COMPATIBLE_MESSAGE: &str = "schema is compatible";

/// proto 定義が登録済みの最新バージョンと互換か検証するユースケース。
pub struct ValidateSchemaUseCase {
    registry: Arc<dyn SchemaRegistryClient>,
    cluster: Arc<dyn ClusterMetadata>,
}

impl ValidateSchemaUseCase {
    pub fn new(registry: Arc<dyn SchemaRegistryClient>, cluster: Arc<dyn ClusterMetadata>) -> Self {
        Self { registry, cluster }
    }

    /// 非互換なら `IncompatibleSchema` を返す。レジストリには何も書き込まない。
    pub async fn execute(
        &self,
        source: &SchemaSource,
        cancel: &CancellationToken,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let subject = match preflight(source, self.cluster.as_ref(), cancel).await? {
            Preflight::Ready(subject) => subject,
            Preflight::Skip(outcome) => return Ok(outcome),
        };
        let body = source.body()?;

        if !subject_exists(self.registry.as_ref(), &subject, cancel).await? {
            info!(subject = %subject, "Subject does not exist yet, nothing to validate");
            return Ok(WorkflowOutcome::info(
                WorkflowError::SubjectNotFound(subject.to_string()).to_string(),
            ));
        }

        let result = registry_call(
            cancel,
            "check compatibility",
            subject.as_str(),
            self.registry.check_compatibility(
                subject.as_str(),
                body,
                &VersionSpec::Latest.as_token(),
                SchemaType::Protobuf,
            ),
        )
        .await?;

        if !result.is_compatible {
            warn!(
                subject = %subject,
                reasons = ?result.messages,
                "Schema is not compatible with latest version"
            );
            return Err(WorkflowError::IncompatibleSchema {
                subject: subject.to_string(),
                messages: result.messages,
            });
        }

        info!(subject = %subject, "Schema is compatible with latest version");
        Ok(WorkflowOutcome::Done(Payload::Message(
            COMPATIBLE_MESSAGE.to_string(),
        )))
    }
}
