//! Deterministic echo backend for development and tests.
//!
//! Real deployments wire a loader backed by an actual generation runtime;
//! the echo backend keeps the full pipeline exercisable without one.

use std::sync::Arc;

use serde_json::{json, Value};

use textgen_core::GenerationParams;

use crate::error::EngineError;
use crate::generator::{ModelLoader, TextGenerator};

/// Generator that echoes its input in the backend's pipeline output shape.
pub struct EchoGenerator {
    model_name: String,
}

impl EchoGenerator {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
        }
    }
}

impl TextGenerator for EchoGenerator {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn generate(&self, input_text: &str, _params: &GenerationParams) -> Result<Value, EngineError> {
        Ok(json!([{ "generated_text": format!("Echo: {input_text}") }]))
    }
}

/// Loader that produces [`EchoGenerator`]s for any model name.
#[derive(Debug, Default, Clone)]
pub struct EchoLoader;

impl EchoLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModelLoader for EchoLoader {
    fn load(&self, model_name: &str) -> Result<Arc<dyn TextGenerator>, EngineError> {
        Ok(Arc::new(EchoGenerator::new(model_name)))
    }
}
