//! Job descriptor and outcome encoding.

use serde::{Deserialize, Serialize};

use crate::id::JobId;
use crate::params::GenerationParams;

/// Prefix tagging an error outcome in the broker's result value.
const ERROR_TAG: &str = "ERROR: ";

/// One asynchronous inference request, as carried through the broker queue.
///
/// Descriptors are transient: they exist only between enqueue and dequeue
/// and are never redelivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub job_id: JobId,
    pub input_text: String,
    #[serde(default, skip_serializing_if = "GenerationParams::is_empty")]
    pub parameters: GenerationParams,
    pub model_name: String,
}

impl JobDescriptor {
    pub fn new(
        input_text: impl Into<String>,
        parameters: GenerationParams,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            job_id: JobId::new(),
            input_text: input_text.into(),
            parameters,
            model_name: model_name.into(),
        }
    }
}

/// Terminal outcome of a processed job.
///
/// The broker stores outcomes as a single string value with an `"ERROR: "`
/// prefix tagging failures; this enum is the in-process representation and
/// converts losslessly at the broker boundary. A `Done` text that itself
/// starts with the tag would be misread on parse; that collision is
/// accepted, the value is model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Done(String),
    Error(String),
}

impl JobOutcome {
    /// Encode to the broker's string value.
    pub fn encode(&self) -> String {
        match self {
            JobOutcome::Done(text) => text.clone(),
            JobOutcome::Error(message) => format!("{ERROR_TAG}{message}"),
        }
    }

    /// Parse a broker value back into an outcome.
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix(ERROR_TAG) {
            Some(message) => JobOutcome::Error(message.to_string()),
            None => JobOutcome::Done(value.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JobOutcome::Error(_))
    }
}
