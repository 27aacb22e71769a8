use std::sync::Arc;

use protoreg_schemaregistry::SchemaRegistryClient;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::{Deletion, Payload, VersionSpec, WorkflowError, WorkflowOutcome};
use crate::usecase::preamble::SubjectArgs;
use crate::usecase::registry_call;

/// delete の引数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteArgs {
    pub subject: SubjectArgs,
    pub version: VersionSpec,
    pub permanent: bool,
}

/// サブジェクト全体または特定バージョンを削除するユースケース。
pub struct DeleteSchemaUseCase {
    registry: Arc<dyn SchemaRegistryClient>,
}

impl DeleteSchemaUseCase {
    pub fn new(registry: Arc<dyn SchemaRegistryClient>) -> Self {
        Self { registry }
    }

    /// `latest` はサブジェクト全体、番号指定はそのバージョンのみを削除する。
    ///
    /// 存在確認は行わず、レジストリの応答をそのまま返す。
    pub async fn execute(
        &self,
        args: &DeleteArgs,
        cancel: &CancellationToken,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let subject = args.subject.subject()?;

        let versions = match args.version.number() {
            None => {
                registry_call(
                    cancel,
                    "delete subject",
                    subject.as_str(),
                    self.registry
                        .delete_subject(subject.as_str(), args.permanent),
                )
                .await?
            }
            Some(number) => {
                let deleted = registry_call(
                    cancel,
                    "delete schema version",
                    subject.as_str(),
                    self.registry
                        .delete_schema_version(subject.as_str(), number, args.permanent),
                )
                .await?;
                vec![deleted]
            }
        };

        info!(
            subject = %subject,
            versions = ?versions,
            permanent = args.permanent,
            "Schema deleted"
        );
        Ok(WorkflowOutcome::Done(Payload::Deleted(Deletion {
            subject: subject.to_string(),
            versions,
            permanent: args.permanent,
        })))
    }
}
