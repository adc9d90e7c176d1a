//! Environment-derived configuration.
//!
//! Every absent value degrades gracefully (log and fall back or skip);
//! startup never crashes over missing credentials.

use tracing::warn;

/// Fallback model when `MODEL_NAME` is not set. Small on purpose so the
/// service comes up quickly in dev; production sets the real model name.
pub const DEFAULT_MODEL_NAME: &str = "distilgpt2";

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Model loaded eagerly at startup and used for job submissions.
    pub model_name: String,
    /// Optional model-hub token; login is attempted best-effort when set.
    pub hub_token: Option<String>,
    /// Broker connection string.
    pub redis_url: String,
    /// Optional persistence store base URL; persistence is skipped when
    /// either the URL or key is absent.
    pub record_store_url: Option<String>,
    pub record_store_key: Option<String>,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let model_name = std::env::var("MODEL_NAME").unwrap_or_else(|_| {
            warn!("MODEL_NAME not set; using default '{DEFAULT_MODEL_NAME}'");
            DEFAULT_MODEL_NAME.to_string()
        });

        let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| {
            warn!("REDIS_URL not set; using local default");
            DEFAULT_REDIS_URL.to_string()
        });

        Self {
            model_name,
            hub_token: std::env::var("HUB_TOKEN").ok(),
            redis_url,
            record_store_url: std::env::var("RECORD_STORE_URL").ok(),
            record_store_key: std::env::var("RECORD_STORE_KEY").ok(),
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}
