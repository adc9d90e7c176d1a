//! Broker client: a remote list queue plus a key/value result space.
//!
//! Job descriptors travel head-to-tail through a single named queue; each
//! result is a single string value under a namespaced per-job key,
//! overwritten on duplicate writes (last write wins). Payloads are strict
//! JSON — a malformed queue entry surfaces as [`BrokerError::Deserialize`]
//! and is never interpreted any other way.

use textgen_core::{JobDescriptor, JobId};

mod in_memory;
mod redis;

pub use in_memory::InMemoryJobBroker;
pub use redis::RedisJobBroker;

/// Default queue key for job descriptors.
pub const DEFAULT_QUEUE_KEY: &str = "textgen:jobs";

/// Default key prefix for per-job result values.
pub const DEFAULT_RESULT_PREFIX: &str = "textgen:job_result:";

/// Broker failure.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("broker connection error: {0}")]
    Connection(String),

    #[error("broker command error: {0}")]
    Command(String),

    #[error("job payload serialization error: {0}")]
    Serialize(String),

    #[error("job payload deserialization error: {0}")]
    Deserialize(String),
}

/// Client for the job queue and result space.
///
/// Submitter and worker share no in-process state; this interface is their
/// only rendezvous.
pub trait JobBroker: Send + Sync {
    /// Append a descriptor to the tail of the queue.
    ///
    /// Once this returns `Ok`, the job is owned by the broker (durability
    /// is the broker's concern, not ours).
    fn enqueue(&self, job: &JobDescriptor) -> Result<(), BrokerError>;

    /// Remove and return the descriptor at the head of the queue.
    ///
    /// `Ok(None)` means the queue is empty, which is not an error.
    fn dequeue(&self) -> Result<Option<JobDescriptor>, BrokerError>;

    /// Store a result value for a job, overwriting any prior value.
    fn put_result(&self, job_id: JobId, value: &str) -> Result<(), BrokerError>;

    /// Read the current result value for a job, if one has been written.
    fn get_result(&self, job_id: JobId) -> Result<Option<String>, BrokerError>;
}
