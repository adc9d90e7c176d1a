//! In-memory broker for tests and dev.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use textgen_core::{JobDescriptor, JobId};

use super::{BrokerError, JobBroker};

/// Broker backed by process-local collections.
///
/// Same contract as the Redis broker (FIFO queue, last-write-wins results)
/// without the network.
#[derive(Debug, Default)]
pub struct InMemoryJobBroker {
    queue: Mutex<VecDeque<JobDescriptor>>,
    results: Mutex<HashMap<JobId, String>>,
}

impl InMemoryJobBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of descriptors currently waiting in the queue.
    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

impl JobBroker for InMemoryJobBroker {
    fn enqueue(&self, job: &JobDescriptor) -> Result<(), BrokerError> {
        self.queue.lock().unwrap().push_back(job.clone());
        Ok(())
    }

    fn dequeue(&self) -> Result<Option<JobDescriptor>, BrokerError> {
        Ok(self.queue.lock().unwrap().pop_front())
    }

    fn put_result(&self, job_id: JobId, value: &str) -> Result<(), BrokerError> {
        self.results
            .lock()
            .unwrap()
            .insert(job_id, value.to_string());
        Ok(())
    }

    fn get_result(&self, job_id: JobId) -> Result<Option<String>, BrokerError> {
        Ok(self.results.lock().unwrap().get(&job_id).cloned())
    }
}
