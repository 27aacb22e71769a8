//! ワークフロー共通の前処理。
//!
//! トピック・レコードの確定、クラスタ上のトピック確認、サブジェクトの存在確認、
//! バージョン指定によるスキーマ取得をまとめる。

use protoreg_kafka::ClusterMetadata;
use protoreg_protoschema::TopicRecord;
use protoreg_schemaregistry::{RegisteredSchema, SchemaRegistryClient};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::{SchemaSubject, VersionSpec, WorkflowError, WorkflowOutcome};
use crate::usecase::{cluster_call, registry_call};

/// register / validate に渡すスキーマ定義と、フラグで指定されたトピック・レコード。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSource {
    pub proto: Vec<u8>,
    pub topic: Option<String>,
    pub record: Option<String>,
}

impl SchemaSource {
    /// トピックとレコードを確定する。
    ///
    /// どちらかが未指定または空の場合は proto 定義の注釈から両方を読み直し、
    /// フラグの値は使わない。
    pub fn resolve_identity(&self) -> Result<TopicRecord, WorkflowError> {
        let topic = self.topic.as_deref().unwrap_or_default();
        let record = self.record.as_deref().unwrap_or_default();
        if !topic.is_empty() && !record.is_empty() {
            return Ok(TopicRecord::new(topic, record));
        }

        let identity = protoreg_protoschema::extract(&self.proto)?;
        debug!(
            topic = %identity.topic,
            record = %identity.record,
            "Resolved topic and record from proto annotations"
        );
        Ok(identity)
    }

    /// レジストリに送るスキーマ本文。
    pub fn body(&self) -> Result<&str, WorkflowError> {
        Ok(std::str::from_utf8(&self.proto)?)
    }
}

/// 既存サブジェクトを指す引数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectArgs {
    pub topic: String,
    pub record: String,
}

impl SubjectArgs {
    pub fn new(topic: impl Into<String>, record: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            record: record.into(),
        }
    }

    pub(crate) fn subject(&self) -> Result<SchemaSubject, WorkflowError> {
        SchemaSubject::new(&TopicRecord::new(self.topic.clone(), self.record.clone()))
    }
}

/// サブジェクトとバージョンの組。inspect と export で使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaVersionArgs {
    pub subject: SubjectArgs,
    pub version: VersionSpec,
}

/// register / validate の前段の判定結果。
pub(crate) enum Preflight {
    Ready(SchemaSubject),
    Skip(WorkflowOutcome),
}

/// トピックを確定し、クラスタに存在することを確認する。
///
/// トピックが未設定またはクラスタに存在しない場合は、書き込みを行わずに
/// 情報メッセージで終える。
pub(crate) async fn preflight(
    source: &SchemaSource,
    cluster: &dyn ClusterMetadata,
    cancel: &CancellationToken,
) -> Result<Preflight, WorkflowError> {
    let identity = source.resolve_identity()?;
    if identity.topic.is_empty() {
        info!("Topic is not set, nothing to do");
        return Ok(Preflight::Skip(WorkflowOutcome::info(
            WorkflowError::TopicUnset.to_string(),
        )));
    }

    if !topic_exists(cluster, &identity.topic, cancel).await? {
        info!(topic = %identity.topic, "Topic does not exist in cluster, nothing to do");
        return Ok(Preflight::Skip(WorkflowOutcome::info(
            WorkflowError::TopicNotFound(identity.topic).to_string(),
        )));
    }

    Ok(Preflight::Ready(SchemaSubject::new(&identity)?))
}

pub(crate) async fn topic_exists(
    cluster: &dyn ClusterMetadata,
    topic: &str,
    cancel: &CancellationToken,
) -> Result<bool, WorkflowError> {
    let topics = cluster_call(cancel, "list topics", topic, cluster.topics()).await?;
    Ok(topics.iter().any(|name| name == topic))
}

pub(crate) async fn subject_exists(
    registry: &dyn SchemaRegistryClient,
    subject: &SchemaSubject,
    cancel: &CancellationToken,
) -> Result<bool, WorkflowError> {
    let subjects = registry_call(
        cancel,
        "list subjects",
        subject.as_str(),
        registry.list_subjects(),
    )
    .await?;
    Ok(subjects.iter().any(|name| name == subject.as_str()))
}

/// `latest` なら最新、番号指定ならそのバージョンを取得する。
pub(crate) async fn fetch_schema(
    registry: &dyn SchemaRegistryClient,
    subject: &SchemaSubject,
    version: VersionSpec,
    cancel: &CancellationToken,
) -> Result<RegisteredSchema, WorkflowError> {
    match version.number() {
        None => {
            registry_call(
                cancel,
                "get latest schema",
                subject.as_str(),
                registry.get_latest_schema(subject.as_str()),
            )
            .await
        }
        Some(number) => {
            registry_call(
                cancel,
                "get schema version",
                subject.as_str(),
                registry.get_schema_version(subject.as_str(), number),
            )
            .await
        }
    }
}
