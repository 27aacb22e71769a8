use std::sync::Arc;

use protoreg_schemaregistry::SchemaRegistryClient;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::{Payload, WorkflowError, WorkflowOutcome};
use crate::usecase::preamble::{fetch_schema, subject_exists, SchemaVersionArgs};

/// 登録済みスキーマの本文を取り出すユースケース。書き出し先は表示層が決める。
pub struct ExportSchemaUseCase {
    registry: Arc<dyn SchemaRegistryClient>,
}

impl ExportSchemaUseCase {
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
            info!(subject = %subject, "Subject does not exist yet, nothing to export");
            return Ok(WorkflowOutcome::info(
                WorkflowError::SubjectNotFound(subject.to_string()).to_string(),
            ));
        }

        let schema = fetch_schema(self.registry.as_ref(), &subject, args.version, cancel).await?;

        info!(
            subject = %subject,
            version = schema.version,
            bytes = schema.schema.len(),
            "Exporting schema"
        );
        Ok(WorkflowOutcome::Done(Payload::Document(
            schema.schema.into_bytes(),
        )))
    }
}
