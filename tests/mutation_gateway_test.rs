use anyhow::Result;
use field_sync::adapters::mutation::MutationGateway;
use field_sync::adapters::remote::{RemoteClient, RemotePageSource};
use field_sync::adapters::signer::ProfileSigner;
use field_sync::app::views::job_orders;
use field_sync::config::profile::RemoteProfile;
use field_sync::core::detail_cache::DetailCache;
use field_sync::domain::model::RawRecord;
use field_sync::{PageAccumulator, SyncError};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn profile_for(server: &MockServer) -> RemoteProfile {
    let toml_content = format!(
        r#"
[profile]
name = "test"

[remote]
endpoint = "{}"
script_id = "1428"
deploy_id = "1"

[auth]
header = "NLAuth account=1"
"#,
        server.url("/restlet")
    );
    RemoteProfile::from_toml_str(&toml_content).unwrap()
}

fn client_for(profile: &RemoteProfile) -> RemoteClient {
    let signer = Arc::new(ProfileSigner::from_profile(profile));
    RemoteClient::new(profile, signer)
}

fn detail_lines(key: &str) -> Vec<RawRecord> {
    match json!({"Document Number": key, "Equipment": "Gear"}) {
        serde_json::Value::Object(map) => {
            vec![RawRecord::from_object(job_orders::DOCUMENT_KEY_FIELD, map)]
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_create_wraps_payload_in_data_envelope() -> Result<()> {
    let server = MockServer::start();

    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/restlet")
            .json_body_partial(r#"{"type": "createJobOrder", "Data": {"Equipment": "Pump"}}"#);
        then.status(200)
            .json_body(json!({"message": "created", "success": "true"}));
    });

    let profile = profile_for(&server);
    let gateway = MutationGateway::new(client_for(&profile));
    let response = gateway
        .create_job_order(json!({"Equipment": "Pump"}))
        .await?;

    create_mock.assert();
    assert!(response.succeeded());
    assert_eq!(response.message, "created");

    Ok(())
}

#[tokio::test]
async fn test_success_invalidates_accumulator_and_detail_cache() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST)
            .path("/restlet")
            .json_body_partial(r#"{"type": "performJobOrder"}"#);
        then.status(200)
            .json_body(json!({"message": "performed", "success": "true"}));
    });

    let profile = profile_for(&server);
    let accumulator = Arc::new(PageAccumulator::new(
        RemotePageSource::new(
            client_for(&profile),
            job_orders::LIST_OPERATION,
            job_orders::DOCUMENT_KEY_FIELD,
        ),
        25,
    ));
    let cache = Arc::new(DetailCache::new());
    cache.put("EQJOB62".to_string(), detail_lines("EQJOB62"));
    cache.put("EQJOB7".to_string(), detail_lines("EQJOB7"));

    let gateway = MutationGateway::new(client_for(&profile))
        .register(accumulator.clone())
        .register(cache.clone());

    gateway
        .perform_job_order("EQJOB62", json!({"Technician": "Alice"}))
        .await?;

    // 成功的寫入讓清單下次讀取時重抓,並清掉該文件的明細快取
    assert!(accumulator.is_stale());
    assert!(cache.get("EQJOB62").is_none());
    assert!(cache.get("EQJOB7").is_some());

    Ok(())
}

#[tokio::test]
async fn test_string_false_is_a_failure_and_invalidates_nothing() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST)
            .path("/restlet")
            .json_body_partial(r#"{"type": "updateJobOrder"}"#);
        then.status(200).json_body(json!({
            "message": "Document is locked by another user",
            "success": "false"
        }));
    });

    let profile = profile_for(&server);
    let accumulator = Arc::new(PageAccumulator::new(
        RemotePageSource::new(
            client_for(&profile),
            job_orders::LIST_OPERATION,
            job_orders::DOCUMENT_KEY_FIELD,
        ),
        25,
    ));
    let cache = Arc::new(DetailCache::new());
    cache.put("EQJOB62".to_string(), detail_lines("EQJOB62"));

    let gateway = MutationGateway::new(client_for(&profile))
        .register(accumulator.clone())
        .register(cache.clone());

    let result = gateway
        .update_job_order("EQJOB62", json!({"Technician": "Bob"}))
        .await;

    match result {
        Err(SyncError::MutationFailed { message, .. }) => {
            assert_eq!(message, "Document is locked by another user");
        }
        other => panic!("expected MutationFailed, got {:?}", other.map(|r| r.message)),
    }

    // 失敗時本地狀態完全不動
    assert!(!accumulator.is_stale());
    assert!(cache.get("EQJOB62").is_some());

    Ok(())
}

#[tokio::test]
async fn test_shipment_posting_uses_flat_body() -> Result<()> {
    let server = MockServer::start();

    let shipment_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/restlet")
            .json_body_partial(r#"{"type": "submitMaintainance", "jobId": 62, "lines": [3, 5]}"#);
        then.status(200)
            .json_body(json!({"message": "posted", "success": "true"}));
    });

    let profile = profile_for(&server);
    let gateway = MutationGateway::new(client_for(&profile));
    let response = gateway.post_shipment_lines("EQJOB62", 62, &[3, 5]).await?;

    shipment_mock.assert();
    assert!(response.succeeded());

    Ok(())
}

#[tokio::test]
async fn test_http_error_is_not_a_mutation_failure() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/restlet");
        then.status(503);
    });

    let profile = profile_for(&server);
    let gateway = MutationGateway::new(client_for(&profile));
    let result = gateway.create_job_order(json!({})).await;

    assert!(matches!(
        result,
        Err(SyncError::HttpStatus { status: 503, .. })
    ));

    Ok(())
}
