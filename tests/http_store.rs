use std::sync::Arc;

use serde_json::json;
use tfinv::{ExtractError, ExtractInput, HttpStore, InventoryStore, MatchCriteria, Pipeline, StoreError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state_resource() -> serde_json::Value {
    json!({
        "_id": "state-1",
        "resource_type": "terraform_state",
        "raw": {"terraform": {"resources": [
            {
                "type": "aws_security_group",
                "mode": "managed",
                "name": "web",
                "instances": [{"attributes": {"sg_id": "sg-1", "description": "web"}}]
            }
        ]}}
    })
}

#[tokio::test]
async fn test_get_resource_posts_criteria() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/resources/search"))
        .and(header("authorization", "Bearer test_token"))
        .and(body_json(json!({"resource_type": "terraform_state", "vpc": "vpc-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [state_resource()]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = HttpStore::new(mock_server.uri(), Some("test_token".to_string())).unwrap();
    let criteria = MatchCriteria::builder("terraform_state").vpc("vpc-1").build();
    let results = store.get_resource(&criteria).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["_id"], "state-1");
}

#[tokio::test]
async fn test_override_search_body_omits_must_exist() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/resources/search"))
        .and(body_json(json!({"resource_type": "tf_bundle", "label": "prod"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = HttpStore::new(mock_server.uri(), None).unwrap();
    let raw = json!({"resource_type": "tf_bundle", "label": "prod", "must_exists": false});
    let criteria = MatchCriteria::from_override(raw.as_object().unwrap().clone());
    let results = store.get_resource(&criteria).await.unwrap();

    assert!(results.is_empty());
    assert!(!criteria.must_exist());
}

#[tokio::test]
async fn test_get_resource_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/resources/search"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "database down"})))
        .mount(&mock_server)
        .await;

    let store = HttpStore::new(mock_server.uri(), None).unwrap();
    let criteria = MatchCriteria::builder("terraform_state").build();
    let err = store.get_resource(&criteria).await.unwrap_err();

    match err {
        StoreError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database down");
        }
        other => panic!("Expected StoreError::Api, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_resource_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/resources/search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let store = HttpStore::new(mock_server.uri(), Some("expired".to_string())).unwrap();
    let criteria = MatchCriteria::builder("terraform_state").build();
    let err = store.get_resource(&criteria).await.unwrap_err();

    assert!(matches!(err, StoreError::Auth { .. }));
    assert!(!err.to_string().contains("expired"));
}

#[tokio::test]
async fn test_get_resource_missing_results_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/resources/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&mock_server)
        .await;

    let store = HttpStore::new(mock_server.uri(), None).unwrap();
    let criteria = MatchCriteria::builder("terraform_state").build();
    let err = store.get_resource(&criteria).await.unwrap_err();

    assert!(matches!(err, StoreError::Decode { .. }));
}

#[tokio::test]
async fn test_pipeline_against_http_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/resources/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [state_resource()]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/resources"))
        .and(body_json(json!({
            "resource_type": "security_group",
            "name": "web",
            "values": {
                "sg_id": "sg-1",
                "description": "web",
                "resource_type": "security_group",
                "id": "sg-1",
                "name": "web",
                "cluster": "prod",
                "_id": "sg-1",
                "parent": "state-1"
            },
            "_id": "sg-1",
            "parent": "state-1",
            "cluster": "prod",
            "human_description": "security_group sg-1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "sg-1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(HttpStore::new(mock_server.uri(), None).unwrap());
    let config = ExtractInput {
        resource_type: "security_group".to_string(),
        src_resource_type: Some("terraform_state".to_string()),
        terraform_type: Some("aws_security_group".to_string()),
        mapping: Some(json!(r#"{"sg_id": "id"}"#)),
        cluster: Some("prod".to_string()),
        ..Default::default()
    }
    .into_config();

    let report = Pipeline::new(store).run(&config).await.unwrap();
    assert_eq!(report.emitted, vec!["sg-1"]);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_pipeline_not_found_writes_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/resources/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/resources"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = Arc::new(HttpStore::new(mock_server.uri(), None).unwrap());
    let config = ExtractInput {
        resource_type: "security_group".to_string(),
        ..Default::default()
    }
    .into_config();

    let err = Pipeline::new(store).run(&config).await.unwrap_err();
    assert!(matches!(err, ExtractError::NotFound { .. }));
}
