use std::sync::Arc;

use protoreg_kafka::ClusterMetadata;
use protoreg_schemaregistry::{SchemaRegistryClient, SchemaType};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::{Payload, Registration, WorkflowError, WorkflowOutcome};
use crate::usecase::preamble::{preflight, subject_exists, Preflight, SchemaSource};
use crate::usecase::registry_call;

/// proto 定義をトピックのサブジェクトへ登録するユースケース。
pub struct RegisterSchemaUseCase {
    registry: Arc<dyn SchemaRegistryClient>,
    cluster: Arc<dyn ClusterMetadata>,
}

impl RegisterSchemaUseCase {
    pub fn new(registry: Arc<dyn SchemaRegistryClient>, cluster: Arc<dyn ClusterMetadata>) -> Self {
        Self { registry, cluster }
    }

    /// トピックがクラスタに存在する場合のみ登録する。
    ///
    /// サブジェクトが未作成なら最初のバージョン、既存なら新しいバージョンになる。
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

        // 存在有無で分岐はしない。作成か追加かはレジストリ側が決める
        let exists = subject_exists(self.registry.as_ref(), &subject, cancel).await?;
        debug!(subject = %subject, exists, "Checked subject before registration");

        let registered = registry_call(
            cancel,
            "register schema",
            subject.as_str(),
            self.registry
                .register_schema(subject.as_str(), body, SchemaType::Protobuf),
        )
        .await?;

        info!(
            subject = %subject,
            id = registered.id,
            version = registered.version,
            "Schema registered"
        );
        Ok(WorkflowOutcome::Done(Payload::Registered(Registration {
            subject: subject.to_string(),
            id: registered.id,
            version: registered.version,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{cluster_with_topics, proto_with, registered};
    use protoreg_kafka::{KafkaError, MockClusterMetadata};
    use protoreg_schemaregistry::{MockSchemaRegistryClient, SchemaRegistryError};

    fn source(topic: &str, record: &str) -> SchemaSource {
        SchemaSource {
            proto: proto_with(topic, record),
            topic: None,
            record: None,
        }
    }

    #[tokio::test]
    async fn test_register_new_subject() {
        let mut registry = MockSchemaRegistryClient::new();
        registry
            .expect_list_subjects()
            .returning(|| Ok(vec!["orders-default-value".to_string()]));
        registry
            .expect_register_schema()
            .withf(|subject, schema, schema_type| {
                subject == "rates-usd_eur-value"
                    && schema.contains("option (topic) = \"rates\"")
                    && *schema_type == SchemaType::Protobuf
            })
            .times(1)
            .returning(|subject, schema, _| Ok(registered(subject, 11, 1, schema)));

        let uc = RegisterSchemaUseCase::new(
            Arc::new(registry),
            Arc::new(cluster_with_topics(&["rates", "orders"])),
        );
        let outcome = uc
            .execute(&source("rates", "usd_eur"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WorkflowOutcome::Done(Payload::Registered(Registration {
                subject: "rates-usd_eur-value".to_string(),
                id: 11,
                version: 1,
            }))
        );
    }

    #[tokio::test]
    async fn test_register_existing_subject_adds_version() {
        let mut registry = MockSchemaRegistryClient::new();
        registry
            .expect_list_subjects()
            .returning(|| Ok(vec!["rates-usd_eur-value".to_string()]));
        registry
            .expect_register_schema()
            .times(1)
            .returning(|subject, schema, _| Ok(registered(subject, 12, 4, schema)));

        let uc = RegisterSchemaUseCase::new(
            Arc::new(registry),
            Arc::new(cluster_with_topics(&["rates"])),
        );
        let outcome = uc
            .execute(&source("rates", "usd_eur"), &CancellationToken::new())
            .await
            .unwrap();

        match outcome {
            WorkflowOutcome::Done(Payload::Registered(registration)) => {
                assert_eq!(registration.version, 4);
                assert_eq!(registration.id, 12);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_skips_unknown_topic() {
        let mut registry = MockSchemaRegistryClient::new();
        registry.expect_list_subjects().never();
        registry.expect_register_schema().never();

        let uc = RegisterSchemaUseCase::new(
            Arc::new(registry),
            Arc::new(cluster_with_topics(&["orders"])),
        );
        let outcome = uc
            .execute(&source("rates", "usd_eur"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, WorkflowOutcome::info(r#"topic "rates" not exist"#));
    }

    #[tokio::test]
    async fn test_register_skips_unset_topic() {
        let mut registry = MockSchemaRegistryClient::new();
        registry.expect_register_schema().never();
        let mut cluster = MockClusterMetadata::new();
        cluster.expect_topics().never();

        let uc = RegisterSchemaUseCase::new(Arc::new(registry), Arc::new(cluster));
        let source = SchemaSource {
            proto: b"syntax = \"proto3\"; message Plain { string id = 1; }".to_vec(),
            ..Default::default()
        };
        let outcome = uc.execute(&source, &CancellationToken::new()).await.unwrap();

        assert_eq!(outcome, WorkflowOutcome::info("topic is not set"));
    }

    #[tokio::test]
    async fn test_register_uses_flags_when_both_given() {
        let mut registry = MockSchemaRegistryClient::new();
        registry.expect_list_subjects().returning(|| Ok(Vec::new()));
        registry
            .expect_register_schema()
            .withf(|subject, _, _| subject == "orders-shipping-value")
            .returning(|subject, schema, _| Ok(registered(subject, 3, 1, schema)));

        let uc = RegisterSchemaUseCase::new(
            Arc::new(registry),
            Arc::new(cluster_with_topics(&["orders"])),
        );
        let source = SchemaSource {
            proto: proto_with("rates", "usd_eur"),
            topic: Some("orders".to_string()),
            record: Some("shipping".to_string()),
        };
        let outcome = uc.execute(&source, &CancellationToken::new()).await.unwrap();

        assert!(matches!(
            outcome,
            WorkflowOutcome::Done(Payload::Registered(Registration { ref subject, .. }))
                if subject == "orders-shipping-value"
        ));
    }

    #[tokio::test]
    async fn test_register_propagates_registry_rejection() {
        let mut registry = MockSchemaRegistryClient::new();
        registry.expect_list_subjects().returning(|| Ok(Vec::new()));
        registry.expect_register_schema().returning(|_, _, _| {
            Err(SchemaRegistryError::Api {
                status: 409,
                error_code: 409,
                message: "Schema being registered is incompatible".to_string(),
            })
        });

        let uc = RegisterSchemaUseCase::new(
            Arc::new(registry),
            Arc::new(cluster_with_topics(&["rates"])),
        );
        let err = uc
            .execute(&source("rates", "usd_eur"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Registry {
                operation: "register schema",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_register_cluster_failure_is_error() {
        let mut registry = MockSchemaRegistryClient::new();
        registry.expect_register_schema().never();
        let mut cluster = MockClusterMetadata::new();
        cluster
            .expect_topics()
            .returning(|| Err(KafkaError::ConnectionFailed("no brokers".to_string())));

        let uc = RegisterSchemaUseCase::new(Arc::new(registry), Arc::new(cluster));
        let err = uc
            .execute(&source("rates", "usd_eur"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Cluster { ref topic, .. } if topic == "rates"));
    }

    #[tokio::test]
    async fn test_register_cancelled_before_write() {
        let mut registry = MockSchemaRegistryClient::new();
        registry.expect_register_schema().never();
        let mut cluster = MockClusterMetadata::new();
        cluster
            .expect_topics()
            .times(0..=1)
            .returning(|| Ok(vec!["rates".to_string()]));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let uc = RegisterSchemaUseCase::new(Arc::new(registry), Arc::new(cluster));
        let err = uc
            .execute(&source("rates", "usd_eur"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Cancelled { .. }));
    }
}
