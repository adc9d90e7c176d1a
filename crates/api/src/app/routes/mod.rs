use axum::{
    routing::{get, post},
    Router,
};

pub mod infer;
pub mod queue;
pub mod system;

/// Full routing tree.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/docs", get(system::docs))
        .route("/healthz", get(system::healthz))
        .route("/infer", post(infer::infer))
        .route("/queue", post(queue::submit_job).get(queue::job_status))
}
