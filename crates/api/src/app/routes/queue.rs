//! Asynchronous job submission and polling.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::error;

use textgen_core::{GenerationParams, JobDescriptor, JobId, JobOutcome};

use crate::app::dto::{JobStatusQuery, QueueRequest, QueueResponse};
use crate::app::errors;
use crate::app::services::AppServices;

/// POST /queue
///
/// Enqueue a job for the background worker and return immediately; never
/// blocks on completion. The descriptor's model name is the configured
/// default (the request cannot override it yet).
pub async fn submit_job(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<QueueRequest>,
) -> axum::response::Response {
    let params = body
        .parameters
        .map(GenerationParams::from_map)
        .unwrap_or_default();

    let job = JobDescriptor::new(body.input_text, params, services.default_model.clone());

    if let Err(err) = services.broker.enqueue(&job) {
        error!(job_id = %job.job_id, error = %err, "failed to enqueue job");
        return errors::json_error(StatusCode::BAD_GATEWAY, "broker_error", err.to_string());
    }

    Json(QueueResponse::queued(job.job_id)).into_response()
}

/// GET /queue?job_id=<id>
///
/// Map the broker's result value onto the three observable states:
/// absent → pending, error-tagged → error, otherwise → done.
pub async fn job_status(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<JobStatusQuery>,
) -> axum::response::Response {
    let job_id: JobId = match query.job_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_job_id",
                "job_id must be a UUID",
            )
        }
    };

    let value = match services.broker.get_result(job_id) {
        Ok(value) => value,
        Err(err) => {
            error!(%job_id, error = %err, "failed to read job result");
            return errors::json_error(StatusCode::BAD_GATEWAY, "broker_error", err.to_string());
        }
    };

    let response = match value {
        None => QueueResponse::pending(job_id),
        Some(raw) => match JobOutcome::parse(&raw) {
            JobOutcome::Done(result) => QueueResponse::done(job_id, result),
            JobOutcome::Error(message) => QueueResponse::error(job_id, message),
        },
    };

    Json(response).into_response()
}
