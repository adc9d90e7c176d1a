//! Request-level middleware.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

/// Log every incoming request's method and path.
pub async fn log_requests(request: Request, next: Next) -> Response {
    info!(
        method = %request.method(),
        path = %request.uri().path(),
        "incoming request"
    );
    next.run(request).await
}
