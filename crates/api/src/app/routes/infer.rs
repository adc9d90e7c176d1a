//! Synchronous inference endpoint.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use tracing::error;

use textgen_core::GenerationParams;
use textgen_engine::generated_text;

use crate::app::dto::{InferRequest, InferResponse};
use crate::app::services::AppServices;

/// POST /infer
///
/// Runs the eagerly loaded default model directly, bypassing the queue.
/// Always answers HTTP 200; failures are reported in the `status`/`error`
/// fields so clients have a single response shape to handle.
pub async fn infer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<InferRequest>,
) -> Json<InferResponse> {
    let Some(generator) = &services.generator else {
        error!("inference requested but model is not loaded");
        return Json(InferResponse::error("Model not loaded."));
    };

    let params = body
        .parameters
        .map(GenerationParams::from_map)
        .unwrap_or_default()
        .with_defaults();

    match generator.generate(&body.input_text, &params) {
        Ok(output) => Json(InferResponse::success(generated_text(&output))),
        Err(err) => {
            error!(error = %err, "inference failed");
            Json(InferResponse::error(err.to_string()))
        }
    }
}
