//! `textgen-infra` — external collaborators of the job pipeline.
//!
//! - `broker`: the list + key/value service carrying job descriptors and
//!   results between submitter and worker (Redis in production, in-memory
//!   for tests/dev)
//! - `records`: optional best-effort REST persistence of job records
//! - `hub`: best-effort model-hub login at startup
//! - `worker`: the single background worker loop

pub mod broker;
pub mod hub;
pub mod records;
pub mod worker;

pub use broker::{BrokerError, InMemoryJobBroker, JobBroker, RedisJobBroker};
pub use records::{JobRecord, RecordStore, RecordStoreError, RestRecordStore};
pub use worker::{Worker, WorkerConfig, WorkerHandle};
