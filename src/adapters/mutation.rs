use crate::adapters::remote::RemoteClient;
use crate::domain::model::MutationResponse;
use crate::domain::ports::Invalidate;
use crate::utils::error::{Result, SyncError};
use serde_json::Value;
use std::sync::Arc;

/// Fire-and-forget write operations against the remote endpoint. No
/// optimistic updates: local state only changes after a successful refetch,
/// which the gateway triggers by invalidating every registered listener
/// (accumulators, detail caches) once the server confirms the write.
pub struct MutationGateway {
    client: RemoteClient,
    listeners: Vec<Arc<dyn Invalidate>>,
}

impl MutationGateway {
    pub fn new(client: RemoteClient) -> Self {
        Self {
            client,
            listeners: Vec::new(),
        }
    }

    pub fn register(mut self, listener: Arc<dyn Invalidate>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub async fn create_job_order(&self, payload: Value) -> Result<MutationResponse> {
        self.submit_wrapped("createJobOrder", payload, None).await
    }

    pub async fn update_job_order(
        &self,
        document_key: &str,
        payload: Value,
    ) -> Result<MutationResponse> {
        self.submit_wrapped("updateJobOrder", payload, Some(document_key))
            .await
    }

    pub async fn perform_job_order(
        &self,
        document_key: &str,
        payload: Value,
    ) -> Result<MutationResponse> {
        self.submit_wrapped("performJobOrder", payload, Some(document_key))
            .await
    }

    pub async fn reassign_job_order(
        &self,
        document_key: &str,
        payload: Value,
    ) -> Result<MutationResponse> {
        self.submit_wrapped("reassignJobOrder", payload, Some(document_key))
            .await
    }

    /// Shipment posting uses a flat body instead of the `Data` envelope.
    pub async fn post_shipment_lines(
        &self,
        document_key: &str,
        job_id: i64,
        lines: &[i64],
    ) -> Result<MutationResponse> {
        let body = serde_json::json!({
            "type": "submitMaintainance",
            "jobId": job_id,
            "lines": lines,
        });
        self.submit("submitMaintainance", body, Some(document_key))
            .await
    }

    async fn submit_wrapped(
        &self,
        operation: &str,
        payload: Value,
        document_key: Option<&str>,
    ) -> Result<MutationResponse> {
        let body = serde_json::json!({
            "type": operation,
            "Data": payload,
        });
        self.submit(operation, body, document_key).await
    }

    async fn submit(
        &self,
        operation: &str,
        body: Value,
        document_key: Option<&str>,
    ) -> Result<MutationResponse> {
        let response = self.client.post(operation, &body).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::HttpStatus {
                operation: operation.to_string(),
                status: status.as_u16(),
            });
        }

        let mutation: MutationResponse = response.json().await?;
        if !mutation.succeeded() {
            // 失敗時不動本地狀態,訊息原樣帶回給畫面
            return Err(SyncError::MutationFailed {
                operation: operation.to_string(),
                message: mutation.message,
            });
        }

        tracing::info!("✅ Mutation '{}' accepted: {}", operation, mutation.message);
        for listener in &self.listeners {
            listener.invalidate(document_key);
        }
        Ok(mutation)
    }
}
