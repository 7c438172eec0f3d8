//! HTTP Record Client
//!
//! Speaks the record backend's REST surface on top of any [`HttpClient`].
//! Payloads are the wire types from [`bridge_traits::records`] serialized
//! verbatim; responses are decoded straight into an [`Envelope`].
//!
//! Every call is sent exactly once; failures are never replayed.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy},
    records::{DeleteRequest, Envelope, RecordBatch, RecordClient, RecordQuery},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Record client for a hosted project.
///
/// Routes (relative to `base_url`):
///
/// | Call | Method | Path |
/// |------|--------|------|
/// | `fetch_records` | POST | `api/projects/{project}/tables/{table}/records/query` |
/// | `get_record_by_id` | POST | `api/projects/{project}/tables/{table}/records/{id}/query` |
/// | `create_record` | POST | `api/projects/{project}/tables/{table}/records` |
/// | `update_record` | PATCH | `api/projects/{project}/tables/{table}/records` |
/// | `delete_record` | DELETE | `api/projects/{project}/tables/{table}/records` |
pub struct HttpRecordClient {
    http: Arc<dyn HttpClient>,
    base_url: Url,
    project_id: String,
    public_key: String,
    timeout: Option<Duration>,
}

impl HttpRecordClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: &str,
        project_id: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BridgeError::NotAvailable(format!("Invalid backend URL: {}", e)))?;

        if base_url.cannot_be_a_base() {
            return Err(BridgeError::NotAvailable(format!(
                "Backend URL cannot be used as a base: {}",
                base_url
            )));
        }

        Ok(Self {
            http,
            base_url,
            project_id: project_id.into(),
            public_key: public_key.into(),
            timeout: None,
        })
    }

    /// Per-request timeout forwarded to the HTTP layer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self, table: &str, tail: &[&str]) -> Result<String> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                BridgeError::NotAvailable("Backend URL cannot be used as a base".to_string())
            })?;
            segments
                .pop_if_empty()
                .extend(["api", "projects", self.project_id.as_str(), "tables", table, "records"])
                .extend(tail);
        }
        Ok(url.into())
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: HttpMethod,
        url: String,
        body: &B,
    ) -> Result<Envelope> {
        let mut request = HttpRequest::new(method, url)
            .bearer_token(&self.public_key)
            .header("Accept", "application/json")
            .json(body)?;

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        debug!(method = ?request.method, url = %request.url, "Calling record backend");
        let response = self
            .http
            .execute_with_retry(request, RetryPolicy::none())
            .await?;

        match response.json::<Envelope>() {
            Ok(envelope) => Ok(envelope),
            Err(e) if response.is_success() => Err(e),
            Err(_) => {
                warn!(status = response.status, "Record backend returned a non-envelope error");
                Err(BridgeError::OperationFailed(format!(
                    "Record backend responded with HTTP {}",
                    response.status
                )))
            }
        }
    }
}

#[async_trait]
impl RecordClient for HttpRecordClient {
    async fn fetch_records(&self, table: &str, query: &RecordQuery) -> Result<Envelope> {
        let url = self.endpoint(table, &["query"])?;
        self.send(HttpMethod::Post, url, query).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        query: &RecordQuery,
    ) -> Result<Envelope> {
        let id = id.to_string();
        let url = self.endpoint(table, &[id.as_str(), "query"])?;
        self.send(HttpMethod::Post, url, query).await
    }

    async fn create_record(&self, table: &str, payload: &RecordBatch) -> Result<Envelope> {
        let url = self.endpoint(table, &[])?;
        self.send(HttpMethod::Post, url, payload).await
    }

    async fn update_record(&self, table: &str, payload: &RecordBatch) -> Result<Envelope> {
        let url = self.endpoint(table, &[])?;
        self.send(HttpMethod::Patch, url, payload).await
    }

    async fn delete_record(&self, table: &str, payload: &DeleteRequest) -> Result<Envelope> {
        let url = self.endpoint(table, &[])?;
        self.send(HttpMethod::Delete, url, payload).await
    }
}
