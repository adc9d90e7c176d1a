//! Optional REST persistence of job records.
//!
//! Records mirror a job's input, parameters, model name, and result for
//! audit/query purposes. They are **not** authoritative for serving poll
//! requests (the broker's result value is); every operation here is
//! best-effort and callers log-and-continue on failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use textgen_core::JobId;

/// One persisted job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub input_text: String,
    pub parameters: Value,
    pub model_name: String,
    #[serde(default)]
    pub result: String,
}

/// Record store failure. Never propagated past the calling component.
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("record store request failed: {0}")]
    Request(String),

    #[error("record store rejected request: {status} {body}")]
    Rejected { status: u16, body: String },

    #[error("record store response decode failed: {0}")]
    Decode(String),
}

/// The four operations the pipeline needs from the external store.
pub trait RecordStore: Send + Sync {
    fn insert(&self, record: &JobRecord) -> Result<(), RecordStoreError>;

    fn select_by_job_id(&self, job_id: JobId) -> Result<Vec<JobRecord>, RecordStoreError>;

    fn update(&self, job_id: JobId, patch: &Value) -> Result<(), RecordStoreError>;

    fn delete(&self, job_id: JobId) -> Result<(), RecordStoreError>;
}

/// Record store over a PostgREST-style HTTP API.
///
/// All four operations target `<base_url>/rest/v1/<table>` with `apikey`
/// and bearer-token headers; row selection uses `job_id=eq.<id>` filters.
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    table: String,
}

/// Default table name for job records.
pub const DEFAULT_RECORDS_TABLE: &str = "inference_results";

impl RestRecordStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_table(base_url, api_key, DEFAULT_RECORDS_TABLE)
    }

    pub fn with_table(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            table: table.into(),
        }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }

    fn job_filter(job_id: JobId) -> String {
        format!("eq.{job_id}")
    }

    fn authed(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn expect_success(response: reqwest::blocking::Response) -> Result<(), RecordStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(RecordStoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

impl RecordStore for RestRecordStore {
    fn insert(&self, record: &JobRecord) -> Result<(), RecordStoreError> {
        let response = self
            .authed(self.client.post(self.table_url()))
            .json(record)
            .send()
            .map_err(|e| RecordStoreError::Request(e.to_string()))?;

        Self::expect_success(response)?;
        debug!(job_id = %record.job_id, "stored job record");
        Ok(())
    }

    fn select_by_job_id(&self, job_id: JobId) -> Result<Vec<JobRecord>, RecordStoreError> {
        let response = self
            .authed(self.client.get(self.table_url()))
            .query(&[
                ("select", "*".to_string()),
                ("job_id", Self::job_filter(job_id)),
            ])
            .send()
            .map_err(|e| RecordStoreError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RecordStoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| RecordStoreError::Decode(e.to_string()))
    }

    fn update(&self, job_id: JobId, patch: &Value) -> Result<(), RecordStoreError> {
        let response = self
            .authed(self.client.patch(self.table_url()))
            .query(&[("job_id", Self::job_filter(job_id))])
            .json(patch)
            .send()
            .map_err(|e| RecordStoreError::Request(e.to_string()))?;

        Self::expect_success(response)
    }

    fn delete(&self, job_id: JobId) -> Result<(), RecordStoreError> {
        let response = self
            .authed(self.client.delete(self.table_url()))
            .query(&[("job_id", Self::job_filter(job_id))])
            .send()
            .map_err(|e| RecordStoreError::Request(e.to_string()))?;

        Self::expect_success(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_normalizes_trailing_slash() {
        let store = RestRecordStore::new("https://records.example.com/", "key");
        assert_eq!(
            store.table_url(),
            "https://records.example.com/rest/v1/inference_results"
        );
    }

    #[test]
    fn job_filter_uses_postgrest_eq_syntax() {
        let job_id = JobId::new();
        assert_eq!(RestRecordStore::job_filter(job_id), format!("eq.{job_id}"));
    }
}
