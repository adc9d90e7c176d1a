//! Infrastructure wiring shared by the HTTP handlers.

use std::sync::Arc;

use tracing::{error, info, warn};

use textgen_engine::{ModelLoader, TextGenerator};
use textgen_infra::broker::{JobBroker, RedisJobBroker};
use textgen_infra::records::{RecordStore, RestRecordStore};

use crate::config::AppConfig;

/// Services owned by the HTTP layer.
///
/// The generator here is the eagerly loaded default model for the
/// synchronous `/infer` path; the asynchronous path's model cache lives in
/// the worker and is deliberately separate (handlers and worker only share
/// the broker).
pub struct AppServices {
    /// Model name stamped onto submitted job descriptors.
    pub default_model: String,
    /// Eagerly loaded default generator; `None` when the startup load
    /// failed (the service still serves, `/infer` reports the error).
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub broker: Arc<dyn JobBroker>,
}

/// Build production services: eager default-model load plus Redis broker.
///
/// A failed model load is not fatal (degraded serving); a bad broker URL
/// is, since nothing can be queued or polled without it.
pub fn build_services(
    config: &AppConfig,
    loader: Arc<dyn ModelLoader>,
) -> anyhow::Result<AppServices> {
    let generator = match loader.load(&config.model_name) {
        Ok(generator) => {
            info!(model_name = %config.model_name, "default model loaded");
            Some(generator)
        }
        Err(err) => {
            error!(model_name = %config.model_name, error = %err, "default model loading failed");
            None
        }
    };

    let broker = RedisJobBroker::new(&config.redis_url)?;

    Ok(AppServices {
        default_model: config.model_name.clone(),
        generator,
        broker: Arc::new(broker),
    })
}

/// Build the optional record store from config.
///
/// Returns `None` (persistence disabled) unless both URL and key are set.
pub fn build_record_store(config: &AppConfig) -> Option<Arc<dyn RecordStore>> {
    match (&config.record_store_url, &config.record_store_key) {
        (Some(url), Some(key)) => {
            info!("job record persistence enabled");
            Some(Arc::new(RestRecordStore::new(url, key)))
        }
        _ => {
            warn!("record store credentials not set; job record persistence disabled");
            None
        }
    }
}
