use std::sync::Arc;

use protoreg_schemaregistry::SchemaRegistryClient;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::{topic_pattern, Payload, WorkflowError, WorkflowOutcome};
use crate::usecase::registry_call;

/// トピックに属するサブジェクトを一覧するユースケース。
pub struct ListSubjectsUseCase {
    registry: Arc<dyn SchemaRegistryClient>,
}

impl ListSubjectsUseCase {
    pub fn new(registry: Arc<dyn SchemaRegistryClient>) -> Self {
        Self { registry }
    }

    /// `{topic}-{record}-value` に一致するサブジェクトをレジストリの返却順で返す。
    pub async fn execute(
        &self,
        topic: &str,
        cancel: &CancellationToken,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        if topic.is_empty() {
            return Err(WorkflowError::TopicUnset);
        }
        let pattern = topic_pattern(topic)?;

        let subjects = registry_call(cancel, "list subjects", topic, self.registry.list_subjects())
            .await?;
        let matched: Vec<String> = subjects
            .into_iter()
            .filter(|subject| pattern.is_match(subject))
            .collect();

        info!(topic, count = matched.len(), "Listed subjects of topic");
        Ok(WorkflowOutcome::Done(Payload::Subjects(matched)))
    }
}
