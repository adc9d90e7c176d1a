//! Request/response DTOs and JSON mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use textgen_core::JobId;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct InferRequest {
    pub input_text: String,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct QueueRequest {
    pub input_text: String,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct JobStatusQuery {
    pub job_id: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferStatus {
    Success,
    Error,
}

/// `POST /infer` response. Always carried with HTTP 200: callers check the
/// `status` field, never the transport status.
#[derive(Debug, Serialize)]
pub struct InferResponse {
    pub result: String,
    pub status: InferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InferResponse {
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            status: InferStatus::Success,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: String::new(),
            status: InferStatus::Error,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Queued,
    Pending,
    Done,
    Error,
}

/// Response for both queue endpoints (submission and status poll).
#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub job_id: JobId,
    pub status: QueueStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueueResponse {
    pub fn queued(job_id: JobId) -> Self {
        Self {
            job_id,
            status: QueueStatus::Queued,
            result: None,
            error: None,
        }
    }

    pub fn pending(job_id: JobId) -> Self {
        Self {
            job_id,
            status: QueueStatus::Pending,
            result: None,
            error: None,
        }
    }

    pub fn done(job_id: JobId, result: impl Into<String>) -> Self {
        Self {
            job_id,
            status: QueueStatus::Done,
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn error(job_id: JobId, message: impl Into<String>) -> Self {
        Self {
            job_id,
            status: QueueStatus::Error,
            result: None,
            error: Some(message.into()),
        }
    }
}
