//! Single-slot model cache owned by the worker loop.

use std::sync::Arc;

use tracing::info;

use crate::error::EngineError;
use crate::generator::{ModelLoader, TextGenerator};

/// Holds at most one loaded (model name, generator) pair.
///
/// Single slot is a memory tradeoff, not an optimization: alternating model
/// names across consecutive jobs causes repeated reloads, and that is the
/// documented cost. The cache is owned by a single worker and needs no
/// internal synchronization; a multi-worker deployment must switch to
/// per-worker caches or add locking around `ensure_loaded`.
pub struct ModelCache {
    loader: Arc<dyn ModelLoader>,
    current: Option<(String, Arc<dyn TextGenerator>)>,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            current: None,
        }
    }

    /// Name of the currently resident model, if any.
    pub fn current_model(&self) -> Option<&str> {
        self.current.as_ref().map(|(name, _)| name.as_str())
    }

    /// Return the generator for `model_name`, loading it on a name miss.
    ///
    /// On a load failure the previous entry is retained untouched (a
    /// partially-loaded model is never cached) and the error propagates to
    /// the caller.
    pub fn ensure_loaded(
        &mut self,
        model_name: &str,
    ) -> Result<Arc<dyn TextGenerator>, EngineError> {
        if let Some((name, generator)) = &self.current {
            if name == model_name {
                return Ok(Arc::clone(generator));
            }
        }

        info!(model_name, "loading model");
        let generator = self.loader.load(model_name)?;
        self.current = Some((model_name.to_string(), Arc::clone(&generator)));
        Ok(generator)
    }
}
