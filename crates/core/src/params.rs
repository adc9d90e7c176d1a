//! Generation parameters with caller-wins default merging.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Default `max_new_tokens` applied when the caller omits it.
pub const DEFAULT_MAX_NEW_TOKENS: u64 = 128;

/// Default sampling `temperature` applied when the caller omits it.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Open mapping of generation options passed through to the inference
/// callable (e.g. `max_new_tokens`, `temperature`, `top_p`).
///
/// The set of recognized keys is owned by the model backend, not by us, so
/// this stays an untyped JSON map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationParams(Map<String, Value>);

impl GenerationParams {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Fill in `max_new_tokens` and `temperature` defaults.
    ///
    /// Caller-supplied values are preserved verbatim; only absent keys are
    /// populated.
    pub fn with_defaults(mut self) -> Self {
        self.0
            .entry("max_new_tokens".to_string())
            .or_insert(json!(DEFAULT_MAX_NEW_TOKENS));
        self.0
            .entry("temperature".to_string())
            .or_insert(json!(DEFAULT_TEMPERATURE));
        self
    }
}

impl From<Map<String, Value>> for GenerationParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_absent_keys() {
        let params = GenerationParams::new().with_defaults();
        assert_eq!(params.get("max_new_tokens"), Some(&json!(128)));
        assert_eq!(params.get("temperature"), Some(&json!(0.7)));
    }

    #[test]
    fn defaults_never_override_caller_values() {
        let mut params = GenerationParams::new();
        params.set("max_new_tokens", json!(16));
        params.set("temperature", json!(1.2));

        let merged = params.with_defaults();
        assert_eq!(merged.get("max_new_tokens"), Some(&json!(16)));
        assert_eq!(merged.get("temperature"), Some(&json!(1.2)));
    }

    #[test]
    fn unrelated_keys_pass_through() {
        let mut params = GenerationParams::new();
        params.set("top_p", json!(0.9));

        let merged = params.with_defaults();
        assert_eq!(merged.get("top_p"), Some(&json!(0.9)));
        assert_eq!(merged.get("max_new_tokens"), Some(&json!(128)));
    }
}
