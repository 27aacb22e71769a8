use std::sync::Arc;

use protoreg_schemaregistry::SchemaRegistryClient;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::{Payload, SchemaReport, WorkflowError, WorkflowOutcome};
use crate::usecase::preamble::{fetch_schema, subject_exists, SchemaVersionArgs};

/// 登録済みスキーマの ID・バージョン・参照・本文を表示するユースケース。
pub struct InspectSchemaUseCase {
    registry: Arc<dyn SchemaRegistryClient>,
}

impl InspectSchemaUseCase {
    pub fn new(registry: Arc<dyn SchemaRegistryClient>) -> Self {
        Self { registry }
    }

    pub async fn execute(
        &self,
        args: &SchemaVersionArgs,
        cancel: &CancellationToken,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let subject = args.subject.subject()?;
        if !subject_exists(self.registry.as_ref(), &subject, cancel).await? {
            info!(subject = %subject, "Subject does not exist yet, nothing to inspect");
            return Ok(WorkflowOutcome::info(
                WorkflowError::SubjectNotFound(subject.to_string()).to_string(),
            ));
        }

        let schema = fetch_schema(self.registry.as_ref(), &subject, args.version, cancel).await?;
        let references = serde_json::to_string(&schema.references)?;

        info!(
            subject = %subject,
            id = schema.id,
            version = schema.version,
            "Fetched schema"
        );
        Ok(WorkflowOutcome::Done(Payload::Inspection(SchemaReport {
            subject: subject.to_string(),
            id: schema.id,
            version: schema.version,
            references,
            schema: schema.schema,
        })))
    }
}
