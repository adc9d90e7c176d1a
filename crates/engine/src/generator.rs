//! Inference callable and model loader seams.

use std::sync::Arc;

use serde_json::Value;

use textgen_core::GenerationParams;

use crate::error::EngineError;

/// The opaque inference callable.
///
/// Implementations wrap an external text-generation backend. The raw JSON
/// return value mirrors the backend's own output shape (typically a list of
/// `{"generated_text": ...}` objects); callers extract text with
/// [`generated_text`] so a backend with a different shape degrades to a
/// textual rendering instead of hanging a job.
pub trait TextGenerator: Send + Sync + 'static {
    /// The model name this generator was loaded for.
    fn model_name(&self) -> &str;

    /// Generate a continuation of `input_text`.
    ///
    /// Must not mutate any state observable outside the generator.
    fn generate(&self, input_text: &str, params: &GenerationParams) -> Result<Value, EngineError>;
}

impl std::fmt::Debug for dyn TextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextGenerator")
            .field("model_name", &self.model_name())
            .finish()
    }
}

/// Loads a generator for a named model.
///
/// Loading is allowed to be slow and blocking; it runs on the worker thread
/// (or once at startup for the synchronous path).
pub trait ModelLoader: Send + Sync + 'static {
    fn load(&self, model_name: &str) -> Result<Arc<dyn TextGenerator>, EngineError>;
}

/// Extract the generated text from a backend's raw output.
///
/// Takes `output[0].generated_text` when present; otherwise falls back to a
/// textual rendering of the whole value, so malformed output still produces
/// a terminal result.
pub fn generated_text(output: &Value) -> String {
    match output
        .get(0)
        .and_then(|first| first.get("generated_text"))
        .and_then(Value::as_str)
    {
        Some(text) => text.to_string(),
        None => output.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_generated_text_from_pipeline_shape() {
        let output = json!([{"generated_text": "hello world"}]);
        assert_eq!(generated_text(&output), "hello world");
    }

    #[test]
    fn falls_back_to_rendering_unexpected_shapes() {
        let output = json!({"tokens": [1, 2, 3]});
        assert_eq!(generated_text(&output), r#"{"tokens":[1,2,3]}"#);

        let output = json!([]);
        assert_eq!(generated_text(&output), "[]");
    }

    #[test]
    fn falls_back_when_generated_text_is_not_a_string() {
        let output = json!([{"generated_text": 42}]);
        assert_eq!(generated_text(&output), r#"[{"generated_text":42}]"#);
    }
}
