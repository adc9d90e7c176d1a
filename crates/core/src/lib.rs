//! `textgen-core` — shared job and parameter types.
//!
//! This crate contains **pure data** primitives (no I/O, no broker, no HTTP).

pub mod id;
pub mod job;
pub mod params;

pub use id::JobId;
pub use job::{JobDescriptor, JobOutcome};
pub use params::{GenerationParams, DEFAULT_MAX_NEW_TOKENS, DEFAULT_TEMPERATURE};
