use std::sync::Arc;

use protoreg_schemaregistry::SchemaRegistryClient;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::{Payload, WorkflowError, WorkflowOutcome};
use crate::usecase::preamble::{subject_exists, SubjectArgs};
use crate::usecase::registry_call;

/// サブジェクトに登録されたバージョン番号を一覧するユースケース。
pub struct ListVersionsUseCase {
    registry: Arc<dyn SchemaRegistryClient>,
}

impl ListVersionsUseCase {
    pub fn new(registry: Arc<dyn SchemaRegistryClient>) -> Self {
        Self { registry }
    }

    /// サブジェクトが存在しなければ `SubjectNotFound` を返す。
    pub async fn execute(
        &self,
        args: &SubjectArgs,
        cancel: &CancellationToken,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let subject = args.subject()?;
        if !subject_exists(self.registry.as_ref(), &subject, cancel).await? {
            return Err(WorkflowError::SubjectNotFound(subject.to_string()));
        }

        let versions = registry_call(
            cancel,
            "list versions",
            subject.as_str(),
            self.registry.list_versions(subject.as_str()),
        )
        .await?;

        info!(subject = %subject, count = versions.len(), "Listed schema versions");
        Ok(WorkflowOutcome::Done(Payload::Versions(versions)))
    }
}
