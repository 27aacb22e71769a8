use protoreg_schemaregistry::{
    HttpSchemaRegistryClient, SchemaRegistryClient, SchemaRegistryConfig, SchemaRegistryError,
    SchemaType,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROTO: &str = r#"syntax = "proto3"; message Currency { string left = 1; }"#;

fn make_client(server: &MockServer) -> HttpSchemaRegistryClient {
    HttpSchemaRegistryClient::new(SchemaRegistryConfig::new(server.uri())).unwrap()
}

fn make_schema_version(subject: &str, id: i32, version: i32) -> serde_json::Value {
    serde_json::json!({
        "subject": subject,
        "id": id,
        "version": version,
        "schemaType": "PROTOBUF",
        "schema": PROTO
    })
}

#[tokio::test]
async fn test_list_subjects_preserves_registry_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subjects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            "users-default-value",
            "orders-default-value",
            "orders-shipping-value"
        ])))
        .mount(&mock_server)
        .await;

    let subjects = make_client(&mock_server).list_subjects().await.unwrap();
    assert_eq!(
        subjects,
        vec![
            "users-default-value".to_string(),
            "orders-default-value".to_string(),
            "orders-shipping-value".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_register_schema_returns_id_and_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subjects/rates-usd_eur-value/versions"))
        .and(header("content-type", "application/vnd.schemaregistry.v1+json"))
        .and(body_partial_json(serde_json::json!({"schemaType": "PROTOBUF"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 21})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/subjects/rates-usd_eur-value"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(make_schema_version("rates-usd_eur-value", 21, 4)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let schema = make_client(&mock_server)
        .register_schema("rates-usd_eur-value", PROTO, SchemaType::Protobuf)
        .await
        .unwrap();
    assert_eq!(schema.id, 21);
    assert_eq!(schema.version, 4);
    assert_eq!(schema.subject, "rates-usd_eur-value");
}

#[tokio::test]
async fn test_register_schema_falls_back_to_latest_when_lookup_misses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subjects/rates-usd_eur-value/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 21})))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/subjects/rates-usd_eur-value"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error_code": 40403,
            "message": "Schema not found"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/subjects/rates-usd_eur-value/versions/latest"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(make_schema_version("rates-usd_eur-value", 21, 5)),
        )
        .mount(&mock_server)
        .await;

    let schema = make_client(&mock_server)
        .register_schema("rates-usd_eur-value", PROTO, SchemaType::Protobuf)
        .await
        .unwrap();
    assert_eq!(schema.id, 21);
    assert_eq!(schema.version, 5);
}

#[tokio::test]
async fn test_register_schema_rejected_by_registry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subjects/rates-usd_eur-value/versions"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error_code": 409,
            "message": "Schema being registered is incompatible with an earlier schema"
        })))
        .mount(&mock_server)
        .await;

    let err = make_client(&mock_server)
        .register_schema("rates-usd_eur-value", PROTO, SchemaType::Protobuf)
        .await
        .unwrap_err();
    match err {
        SchemaRegistryError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 409);
            assert!(message.contains("incompatible"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_latest_schema_with_references() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subjects/orders-default-value/versions/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "subject": "orders-default-value",
            "id": 9,
            "version": 3,
            "schemaType": "PROTOBUF",
            "schema": PROTO,
            "references": [{"name": "money.proto", "subject": "money-value", "version": 2}]
        })))
        .mount(&mock_server)
        .await;

    let schema = make_client(&mock_server)
        .get_latest_schema("orders-default-value")
        .await
        .unwrap();
    assert_eq!(schema.id, 9);
    assert_eq!(schema.version, 3);
    assert_eq!(schema.references.len(), 1);
    assert_eq!(schema.references[0].subject, "money-value");
}

#[tokio::test]
async fn test_get_schema_version_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subjects/orders-default-value/versions/42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error_code": 40402,
            "message": "Version 42 not found."
        })))
        .mount(&mock_server)
        .await;

    let err = make_client(&mock_server)
        .get_schema_version("orders-default-value", 42)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaRegistryError::SchemaNotFound {
            version: Some(42),
            ..
        }
    ));
}

#[tokio::test]
async fn test_list_versions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subjects/orders-default-value/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2, 4])))
        .mount(&mock_server)
        .await;

    let versions = make_client(&mock_server)
        .list_versions("orders-default-value")
        .await
        .unwrap();
    assert_eq!(versions, vec![1, 2, 4]);
}

#[tokio::test]
async fn test_list_versions_encodes_hash_in_subject() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subjects/rates-usd%23eur-value/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let versions = make_client(&mock_server)
        .list_versions("rates-usd#eur-value")
        .await
        .unwrap();
    assert_eq!(versions, vec![1]);
}

#[tokio::test]
async fn test_delete_subject_encodes_slash_in_subject() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/rates-usd%2Feur-value"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([3])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let versions = make_client(&mock_server)
        .delete_subject("rates-usd/eur-value", false)
        .await
        .unwrap();
    assert_eq!(versions, vec![3]);
}

#[tokio::test]
async fn test_soft_delete_subject_single_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/orders-default-value"))
        .and(query_param_is_missing("permanent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/orders-default-value"))
        .and(query_param("permanent", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let versions = make_client(&mock_server)
        .delete_subject("orders-default-value", false)
        .await
        .unwrap();
    assert_eq!(versions, vec![1, 2]);
}

#[tokio::test]
async fn test_permanent_delete_subject_soft_deletes_first() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/orders-default-value"))
        .and(query_param_is_missing("permanent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/orders-default-value"))
        .and(query_param("permanent", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let versions = make_client(&mock_server)
        .delete_subject("orders-default-value", true)
        .await
        .unwrap();
    assert_eq!(versions, vec![1, 2]);
}

#[tokio::test]
async fn test_permanent_delete_of_already_soft_deleted_subject() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/orders-default-value"))
        .and(query_param_is_missing("permanent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error_code": 40404,
            "message": "Subject 'orders-default-value' was soft deleted."
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/orders-default-value"))
        .and(query_param("permanent", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let versions = make_client(&mock_server)
        .delete_subject("orders-default-value", true)
        .await
        .unwrap();
    assert_eq!(versions, vec![1]);
}

#[tokio::test]
async fn test_soft_delete_of_soft_deleted_subject_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/orders-default-value"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error_code": 40404,
            "message": "Subject 'orders-default-value' was soft deleted."
        })))
        .mount(&mock_server)
        .await;

    let err = make_client(&mock_server)
        .delete_subject("orders-default-value", false)
        .await
        .unwrap_err();
    assert!(err.is_soft_deleted());
}

#[tokio::test]
async fn test_delete_schema_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/orders-default-value/versions/2"))
        .and(query_param_is_missing("permanent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/orders-default-value/versions/2"))
        .and(query_param("permanent", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let deleted = make_client(&mock_server)
        .delete_schema_version("orders-default-value", 2, true)
        .await
        .unwrap();
    assert_eq!(deleted, 2);
}

#[tokio::test]
async fn test_delete_unknown_subject_surfaces_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/subjects/ghost-default-value"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error_code": 40401,
            "message": "Subject 'ghost-default-value' not found."
        })))
        .mount(&mock_server)
        .await;

    let err = make_client(&mock_server)
        .delete_subject("ghost-default-value", true)
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaRegistryError::SchemaNotFound { .. }));
}

#[tokio::test]
async fn test_check_compatibility_incompatible_with_messages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compatibility/subjects/orders-default-value/versions/latest"))
        .and(query_param("verbose", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "is_compatible": false,
            "messages": ["FIELD_KIND_CHANGED at #/Order/1"]
        })))
        .mount(&mock_server)
        .await;

    let result = make_client(&mock_server)
        .check_compatibility("orders-default-value", PROTO, "latest", SchemaType::Protobuf)
        .await
        .unwrap();
    assert!(!result.is_compatible);
    assert_eq!(result.messages, vec!["FIELD_KIND_CHANGED at #/Order/1".to_string()]);
}

#[tokio::test]
async fn test_check_compatibility_compatible() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compatibility/subjects/orders-default-value/versions/latest"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"is_compatible": true})),
        )
        .mount(&mock_server)
        .await;

    let result = make_client(&mock_server)
        .check_compatibility("orders-default-value", PROTO, "latest", SchemaType::Protobuf)
        .await
        .unwrap();
    assert!(result.is_compatible);
}

#[tokio::test]
async fn test_server_error_without_body_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subjects"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let err = make_client(&mock_server).list_subjects().await.unwrap_err();
    assert!(matches!(err, SchemaRegistryError::Unavailable(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let client = HttpSchemaRegistryClient::new(SchemaRegistryConfig::new("http://127.0.0.1:1"))
        .unwrap();
    let err = client.list_subjects().await.unwrap_err();
    assert!(matches!(err, SchemaRegistryError::Http(_)));
}
