use thiserror::Error;

/// Failure at the model/inference boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The named model could not be loaded.
    #[error("model load failed for '{model_name}': {message}")]
    LoadFailed { model_name: String, message: String },

    /// The loaded model failed to produce output.
    #[error("generation failed: {0}")]
    GenerationFailed(String),
}

impl EngineError {
    pub fn load_failed(model_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LoadFailed {
            model_name: model_name.into(),
            message: message.into(),
        }
    }
}
