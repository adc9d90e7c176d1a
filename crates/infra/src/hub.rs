//! Best-effort model-hub login.
//!
//! A failed login never stops startup: public models still load without a
//! token, so callers log the error and move on.

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_HUB_URL: &str = "https://huggingface.co";

#[derive(Debug, Error)]
pub enum HubError {
    #[error("hub request failed: {0}")]
    Request(String),

    #[error("hub rejected token: {status}")]
    Rejected { status: u16 },
}

#[derive(Debug, Deserialize)]
struct WhoAmI {
    name: String,
}

/// Validate a hub token against the default hub endpoint.
///
/// Returns the account name the token authenticates as.
pub async fn login(token: &str) -> Result<String, HubError> {
    login_at(DEFAULT_HUB_URL, token).await
}

pub async fn login_at(hub_url: &str, token: &str) -> Result<String, HubError> {
    let response = reqwest::Client::new()
        .get(format!("{}/api/whoami-v2", hub_url.trim_end_matches('/')))
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| HubError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HubError::Rejected {
            status: status.as_u16(),
        });
    }

    let who: WhoAmI = response
        .json()
        .await
        .map_err(|e| HubError::Request(e.to_string()))?;
    Ok(who.name)
}
