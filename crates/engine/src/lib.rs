//! `textgen-engine`
//!
//! **Responsibility:** the model/inference boundary.
//!
//! Text generation itself is an external concern: this crate only defines
//! the seams the rest of the system needs from it:
//! - `TextGenerator`: the opaque inference callable
//! - `ModelLoader`: turns a model name into a generator
//! - `ModelCache`: single-slot holder of the currently loaded model
//!
//! It must not know about the broker, HTTP, or persistence.

pub mod cache;
pub mod echo;
pub mod error;
pub mod generator;

pub use cache::ModelCache;
pub use echo::{EchoGenerator, EchoLoader};
pub use error::EngineError;
pub use generator::{generated_text, ModelLoader, TextGenerator};
