use crate::config::profile::RemoteProfile;
use crate::domain::model::{Page, RawRecord};
use crate::domain::ports::{PageSource, RequestSigner};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Shared HTTP plumbing for the single remote endpoint: query parameters,
/// headers, signing, timeout and the fixed-delay transport retry. Used by
/// both the page source and the mutation gateway.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    endpoint: String,
    script_id: String,
    deploy_id: String,
    timeout: Option<Duration>,
    retry_attempts: u32,
    retry_delay: Duration,
    signer: Arc<dyn RequestSigner>,
}

impl RemoteClient {
    pub fn new(profile: &RemoteProfile, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            client: Client::new(),
            endpoint: profile.remote.endpoint.clone(),
            script_id: profile.remote.script_id.clone(),
            deploy_id: profile.remote.deploy_id.clone(),
            timeout: profile.timeout_seconds().map(Duration::from_secs),
            retry_attempts: profile.retry_attempts(),
            retry_delay: Duration::from_secs(profile.retry_delay_seconds()),
            signer,
        }
    }

    /// POSTs one operation body. Fails with a typed credential error before
    /// anything is sent when the signer has nothing to sign with; transport
    /// errors are retried `retry_attempts` times with a fixed delay.
    pub async fn post(&self, operation: &str, body: &Value) -> Result<reqwest::Response> {
        if !self.signer.has_credentials() {
            return Err(SyncError::MissingCredentials {
                profile: self.endpoint.clone(),
            });
        }

        let params = vec![
            ("script".to_string(), self.script_id.clone()),
            ("deploy".to_string(), self.deploy_id.clone()),
        ];
        let authorization = self.signer.sign("POST", &self.endpoint, &params)?;

        let mut attempt = 0;
        loop {
            let mut request = self
                .client
                .post(&self.endpoint)
                .query(&params)
                .header("Content-Type", "application/json")
                .header("Accept", "application/json")
                .header("Authorization", &authorization)
                .json(body);

            if let Some(timeout) = self.timeout {
                request = request.timeout(timeout);
            }

            tracing::debug!("Sending '{}' request to {}", operation, self.endpoint);
            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "🔁 Transport error on '{}' (attempt {}/{}): {}",
                        operation,
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(SyncError::ApiError(e)),
            }
        }
    }
}

/// Fetches one operation's record pages and normalizes the endpoint's
/// response shapes into `Page`.
pub struct RemotePageSource {
    client: RemoteClient,
    operation: String,
    key_field: String,
}

impl RemotePageSource {
    pub fn new(client: RemoteClient, operation: &str, key_field: &str) -> Self {
        Self {
            client,
            operation: operation.to_string(),
            key_field: key_field.to_string(),
        }
    }
}

#[async_trait]
impl PageSource for RemotePageSource {
    async fn fetch_page(&self, page: u32, page_size: usize) -> Result<Page> {
        let body = serde_json::json!({
            "type": self.operation,
            "pagination": { "page": page, "pageSize": page_size }
        });

        let response = self.client.post(&self.operation, &body).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::HttpStatus {
                operation: self.operation.clone(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        Ok(normalize_response(&self.key_field, &text))
    }
}

/// Accepts a bare record array, a `{data, hasNextPage}` envelope, or either
/// of those JSON-encoded inside a string. A body that parses as none of
/// these becomes an empty final page: one malformed payload must not abort
/// an otherwise-working pagination loop.
pub fn normalize_response(key_field: &str, body: &str) -> Page {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => normalize_value(key_field, value, true),
        Err(_) => {
            tracing::warn!("⚠️ Unparseable page payload; treating as empty final page");
            empty_final_page()
        }
    }
}

fn normalize_value(key_field: &str, value: Value, unwrap_string: bool) -> Page {
    match value {
        Value::Array(items) => Page {
            records: records_from(key_field, items),
            explicit_has_more: None,
        },
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => {
                let explicit_has_more = obj.get("hasNextPage").and_then(|v| v.as_bool());
                Page {
                    records: records_from(key_field, items),
                    explicit_has_more,
                }
            }
            _ => {
                tracing::warn!("⚠️ Page payload object has no 'data' array; treating as empty");
                empty_final_page()
            }
        },
        // 字串包住的 JSON 只解一層
        Value::String(inner) if unwrap_string => match serde_json::from_str::<Value>(&inner) {
            Ok(parsed) => normalize_value(key_field, parsed, false),
            Err(_) => {
                tracing::warn!("⚠️ String payload is not valid JSON; treating as empty");
                empty_final_page()
            }
        },
        _ => empty_final_page(),
    }
}

fn empty_final_page() -> Page {
    Page {
        records: Vec::new(),
        explicit_has_more: Some(false),
    }
}

fn records_from(key_field: &str, items: Vec<Value>) -> Vec<RawRecord> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some(RawRecord::from_object(key_field, obj)),
            _ => None,
        })
        .collect()
}
