//! Redis-backed broker (RPUSH/LPOP queue, SET/GET results).

use redis::Commands;

use textgen_core::{JobDescriptor, JobId};

use super::{BrokerError, JobBroker, DEFAULT_QUEUE_KEY, DEFAULT_RESULT_PREFIX};

/// Broker client over a Redis list and keyspace.
#[derive(Debug, Clone)]
pub struct RedisJobBroker {
    client: redis::Client,
    queue_key: String,
    result_prefix: String,
}

impl RedisJobBroker {
    pub fn new(redis_url: impl AsRef<str>) -> Result<Self, BrokerError> {
        Self::with_keys(redis_url, DEFAULT_QUEUE_KEY, DEFAULT_RESULT_PREFIX)
    }

    pub fn with_keys(
        redis_url: impl AsRef<str>,
        queue_key: impl Into<String>,
        result_prefix: impl Into<String>,
    ) -> Result<Self, BrokerError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            queue_key: queue_key.into(),
            result_prefix: result_prefix.into(),
        })
    }

    fn connection(&self) -> Result<redis::Connection, BrokerError> {
        self.client
            .get_connection()
            .map_err(|e| BrokerError::Connection(e.to_string()))
    }

    fn result_key(&self, job_id: JobId) -> String {
        format!("{}{}", self.result_prefix, job_id)
    }
}

impl JobBroker for RedisJobBroker {
    fn enqueue(&self, job: &JobDescriptor) -> Result<(), BrokerError> {
        let payload =
            serde_json::to_string(job).map_err(|e| BrokerError::Serialize(e.to_string()))?;

        let mut conn = self.connection()?;
        let _: i64 = conn
            .rpush(&self.queue_key, payload)
            .map_err(|e| BrokerError::Command(e.to_string()))?;
        Ok(())
    }

    fn dequeue(&self) -> Result<Option<JobDescriptor>, BrokerError> {
        let mut conn = self.connection()?;
        let raw: Option<String> = conn
            .lpop(&self.queue_key, None)
            .map_err(|e| BrokerError::Command(e.to_string()))?;

        match raw {
            Some(payload) => serde_json::from_str(&payload)
                .map(Some)
                .map_err(|e| BrokerError::Deserialize(e.to_string())),
            None => Ok(None),
        }
    }

    fn put_result(&self, job_id: JobId, value: &str) -> Result<(), BrokerError> {
        let mut conn = self.connection()?;
        let _: () = conn
            .set(self.result_key(job_id), value)
            .map_err(|e| BrokerError::Command(e.to_string()))?;
        Ok(())
    }

    fn get_result(&self, job_id: JobId) -> Result<Option<String>, BrokerError> {
        let mut conn = self.connection()?;
        conn.get(self.result_key(job_id))
            .map_err(|e| BrokerError::Command(e.to_string()))
    }
}
