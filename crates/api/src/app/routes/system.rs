use axum::{response::IntoResponse, Json};

/// GET / — informational root payload.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Text-generation inference and job-queue service",
        "docs": "/docs",
        "health": "/healthz",
    }))
}

/// GET /docs — minimal endpoint reference.
pub async fn docs() -> impl IntoResponse {
    Json(serde_json::json!({
        "endpoints": {
            "POST /infer": "run inference on input_text with optional parameters",
            "GET /healthz": "liveness probe",
            "POST /queue": "submit an asynchronous inference job",
            "GET /queue?job_id=<id>": "poll a job's status/result",
        }
    }))
}

/// GET /healthz — liveness probe.
pub async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
