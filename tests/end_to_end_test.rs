use anyhow::Result;
use field_sync::adapters::remote::{RemoteClient, RemotePageSource};
use field_sync::adapters::signer::ProfileSigner;
use field_sync::app::views::job_orders;
use field_sync::app::{export, views::job_orders::STATUS_FIELD};
use field_sync::config::profile::RemoteProfile;
use field_sync::core::query::{FilterSpec, SortSpec};
use field_sync::domain::model::MIXED_STATUS;
use field_sync::{LocalStorage, PageAccumulator, SyncEngine};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn engine_for(server: &MockServer) -> SyncEngine<RemotePageSource> {
    let toml_content = format!(
        r#"
[profile]
name = "e2e"

[remote]
endpoint = "{}"
script_id = "1428"
deploy_id = "1"

[auth]
header = "NLAuth account=1"

[pagination]
page_size = 3
"#,
        server.url("/restlet")
    );
    let profile = RemoteProfile::from_toml_str(&toml_content).unwrap();
    let signer = Arc::new(ProfileSigner::from_profile(&profile));
    let client = RemoteClient::new(&profile, signer);
    let source = RemotePageSource::new(
        client,
        job_orders::LIST_OPERATION,
        job_orders::DOCUMENT_KEY_FIELD,
    );
    let accumulator =
        PageAccumulator::new(source, profile.page_size()).with_max_pages(profile.max_pages());
    SyncEngine::new(accumulator, job_orders::view_config())
}

fn mock_pages(server: &MockServer) {
    // 兩頁原始明細:EQJOB62 有三條 line item,狀態不一致
    server.mock(|when, then| {
        when.method(POST)
            .path("/restlet")
            .json_body_partial(r#"{"pagination": {"page": 0}}"#);
        then.status(200).json_body(json!({
            "data": [
                {
                    "Document Number": "EQJOB62",
                    "Equipment": "Main spring",
                    "Overall Job Status": "Not Started",
                    "Scheduled Maintenance Date": "11/01/2024"
                },
                {
                    "Document Number": "EQJOB62",
                    "Equipment": "Battery",
                    "Overall Job Status": "Not Started",
                    "Scheduled Maintenance Date": "11/01/2024"
                },
                {
                    "Document Number": "EQJOB2",
                    "Equipment": "Gear",
                    "Overall Job Status": "Completed",
                    "Scheduled Maintenance Date": "11/15/2024",
                    "Maintenance Completion Date": "11/16/2024"
                }
            ],
            "hasNextPage": true
        }));
    });

    server.mock(|when, then| {
        when.method(POST)
            .path("/restlet")
            .json_body_partial(r#"{"pagination": {"page": 1}}"#);
        then.status(200).json_body(json!({
            "data": [
                {
                    "Document Number": "EQJOB62",
                    "Equipment": "Main spring",
                    "Overall Job Status": "Started",
                    "Scheduled Maintenance Date": "11/01/2024"
                },
                {
                    "Document Number": "EQJOB10",
                    "Equipment": "Belt",
                    "Overall Job Status": "Completed",
                    "Scheduled Maintenance Date": "12/01/2024"
                }
            ],
            "hasNextPage": false
        }));
    });
}

#[tokio::test]
async fn test_sync_consolidate_and_query_end_to_end() -> Result<()> {
    let server = MockServer::start();
    mock_pages(&server);

    let engine = engine_for(&server);
    let total = engine.sync().await?;
    assert_eq!(total, 5);

    // 依文件鍵數字排序的合併清單
    let window = engine.query(&FilterSpec::new(), None, 0, 10);
    assert_eq!(window.total_count, 3);

    let keys: Vec<&str> = window
        .items
        .iter()
        .map(|c| c.document_key.as_str())
        .collect();
    assert_eq!(keys, vec!["EQJOB2", "EQJOB10", "EQJOB62"]);

    let merged = window
        .items
        .iter()
        .find(|c| c.document_key == "EQJOB62")
        .unwrap();
    assert_eq!(merged.source_count, 3);
    assert_eq!(merged.text(STATUS_FIELD), MIXED_STATUS);
    assert_eq!(
        merged.text(job_orders::EQUIPMENT_FIELD),
        "Main spring, Battery"
    );

    Ok(())
}

#[tokio::test]
async fn test_filtered_and_sorted_query_over_http() -> Result<()> {
    let server = MockServer::start();
    mock_pages(&server);

    let engine = engine_for(&server);
    engine.sync().await?;

    let filter = job_orders::list_filter(Some("Completed"), None, None, None, None);
    let sort = SortSpec::descending(job_orders::DOCUMENT_KEY_FIELD);
    let window = engine.query(&filter, Some(&sort), 0, 10);

    let keys: Vec<&str> = window
        .items
        .iter()
        .map(|c| c.document_key.as_str())
        .collect();
    assert_eq!(keys, vec!["EQJOB10", "EQJOB2"]);

    Ok(())
}

#[tokio::test]
async fn test_refresh_refetches_from_page_zero() -> Result<()> {
    let server = MockServer::start();
    mock_pages(&server);

    let engine = engine_for(&server);
    engine.sync().await?;
    assert_eq!(engine.raw_records().len(), 5);

    let total = engine.refresh().await?;
    assert_eq!(total, 5);

    Ok(())
}

#[tokio::test]
async fn test_export_consolidated_listing_to_csv() -> Result<()> {
    let server = MockServer::start();
    mock_pages(&server);

    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let engine = engine_for(&server);
    engine.sync().await?;

    let window = engine.query(&FilterSpec::new(), None, 0, usize::MAX);
    let storage = LocalStorage::new(output_path.clone());
    export::export_consolidated_csv(
        &storage,
        "job_orders.csv",
        &[
            job_orders::DOCUMENT_KEY_FIELD,
            STATUS_FIELD,
            job_orders::EQUIPMENT_FIELD,
        ],
        &window.items,
    )
    .await?;

    let content =
        std::fs::read_to_string(std::path::Path::new(&output_path).join("job_orders.csv"))?;
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(
        lines[0],
        "Document Number,Overall Job Status,Equipment,Line Count"
    );
    assert_eq!(lines.len(), 4);
    assert!(content.contains("EQJOB62,Mixed Status,\"Main spring, Battery\",3"));

    Ok(())
}
