//! Background worker: dequeue, infer, store result.
//!
//! A single worker owns the model cache, so no synchronization is needed
//! around loads. Jobs run strictly in submission order; a failed job is
//! terminal (its result is written with the error tag and it is never
//! retried or re-enqueued).

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use textgen_core::{GenerationParams, JobDescriptor, JobOutcome};
use textgen_engine::{generated_text, EngineError, ModelCache, ModelLoader};

use crate::broker::{BrokerError, JobBroker};
use crate::records::{JobRecord, RecordStore};

/// Worker loop configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Sleep between polls when the queue is empty.
    pub poll_interval: Duration,
    /// Thread name for logging.
    pub name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            name: "job-worker".to_string(),
        }
    }
}

impl WorkerConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Handle to control and join a running worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// The single job consumer.
///
/// Constructible and runnable without the HTTP layer; `spawn` starts the
/// loop on a dedicated thread, `process_next` drives one cycle (used by
/// the loop and by tests).
pub struct Worker {
    broker: Arc<dyn JobBroker>,
    cache: ModelCache,
    records: Option<Arc<dyn RecordStore>>,
}

impl Worker {
    pub fn new(
        broker: Arc<dyn JobBroker>,
        loader: Arc<dyn ModelLoader>,
        records: Option<Arc<dyn RecordStore>>,
    ) -> Self {
        Self {
            broker,
            cache: ModelCache::new(loader),
            records,
        }
    }

    /// Spawn the worker loop on a background thread.
    pub fn spawn(self, config: WorkerConfig) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let name = config.name.clone();
        let join = thread::Builder::new()
            .name(name)
            .spawn(move || worker_loop(self, config, shutdown_rx))
            .expect("failed to spawn job worker thread");

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }

    /// Run one cycle: dequeue and process at most one job.
    ///
    /// Returns `Ok(true)` when a queue entry was consumed (including a
    /// malformed payload, which is logged and dropped) and `Ok(false)` when
    /// the queue was empty. Broker connectivity errors propagate.
    pub fn process_next(&mut self) -> Result<bool, BrokerError> {
        match self.broker.dequeue() {
            Ok(Some(job)) => {
                self.process_job(job);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(err @ BrokerError::Deserialize(_)) => {
                warn!(error = %err, "dropping malformed job payload");
                Ok(true)
            }
            Err(err) => Err(err),
        }
    }

    fn process_job(&mut self, job: JobDescriptor) {
        let job_id = job.job_id;
        debug!(%job_id, model_name = %job.model_name, "processing job");

        let params = job.parameters.clone().with_defaults();
        let outcome = match self.run_inference(&job, &params) {
            Ok(output) => JobOutcome::Done(generated_text(&output)),
            Err(err) => {
                error!(%job_id, error = %err, "job failed");
                JobOutcome::Error(err.to_string())
            }
        };

        if let Err(err) = self.broker.put_result(job_id, &outcome.encode()) {
            error!(%job_id, error = %err, "failed to store job result");
            return;
        }

        if let JobOutcome::Done(result) = &outcome {
            self.persist_record(&job, result);
        }
    }

    fn run_inference(
        &mut self,
        job: &JobDescriptor,
        params: &GenerationParams,
    ) -> Result<Value, EngineError> {
        let generator = self.cache.ensure_loaded(&job.model_name)?;
        generator.generate(&job.input_text, params)
    }

    /// Best-effort persistence; failures are logged and never fail the job.
    fn persist_record(&self, job: &JobDescriptor, result: &str) {
        let Some(records) = &self.records else {
            return;
        };

        let record = JobRecord {
            job_id: job.job_id,
            input_text: job.input_text.clone(),
            parameters: Value::Object(job.parameters.as_map().clone()),
            model_name: job.model_name.clone(),
            result: result.to_string(),
        };

        if let Err(err) = records.insert(&record) {
            error!(job_id = %job.job_id, error = %err, "failed to persist job record");
        }
    }
}

fn worker_loop(mut worker: Worker, config: WorkerConfig, shutdown_rx: mpsc::Receiver<()>) {
    info!(worker = %config.name, "job worker started");

    loop {
        match shutdown_rx.try_recv() {
            Ok(()) | Err(mpsc::TryRecvError::Disconnected) => break,
            Err(mpsc::TryRecvError::Empty) => {}
        }

        match worker.process_next() {
            Ok(true) => {}
            Ok(false) => thread::sleep(config.poll_interval),
            Err(err) => {
                warn!(worker = %config.name, error = %err, "broker poll failed");
                thread::sleep(config.poll_interval);
            }
        }
    }

    info!(worker = %config.name, "job worker stopped");
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use serde_json::json;

    use textgen_core::{GenerationParams, JobId};
    use textgen_engine::{EchoLoader, TextGenerator};

    use crate::broker::InMemoryJobBroker;
    use crate::records::RecordStoreError;

    use super::*;

    /// Loader whose generators record every call's input and params.
    struct RecordingLoader {
        calls: Arc<Mutex<Vec<(String, GenerationParams)>>>,
        loads: Arc<AtomicUsize>,
    }

    struct RecordingGenerator {
        model_name: String,
        calls: Arc<Mutex<Vec<(String, GenerationParams)>>>,
    }

    impl TextGenerator for RecordingGenerator {
        fn model_name(&self) -> &str {
            &self.model_name
        }

        fn generate(
            &self,
            input_text: &str,
            params: &GenerationParams,
        ) -> Result<Value, EngineError> {
            self.calls
                .lock()
                .unwrap()
                .push((input_text.to_string(), params.clone()));
            Ok(json!([{ "generated_text": format!("out: {input_text}") }]))
        }
    }

    impl ModelLoader for RecordingLoader {
        fn load(
            &self,
            model_name: &str,
        ) -> Result<Arc<dyn TextGenerator>, EngineError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(RecordingGenerator {
                model_name: model_name.to_string(),
                calls: Arc::clone(&self.calls),
            }))
        }
    }

    struct FailingLoader;

    impl ModelLoader for FailingLoader {
        fn load(
            &self,
            model_name: &str,
        ) -> Result<Arc<dyn TextGenerator>, EngineError> {
            Err(EngineError::load_failed(model_name, "no such model"))
        }
    }

    struct RecordingStore {
        inserts: Mutex<Vec<JobRecord>>,
    }

    impl RecordStore for RecordingStore {
        fn insert(&self, record: &JobRecord) -> Result<(), RecordStoreError> {
            self.inserts.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn select_by_job_id(&self, _: JobId) -> Result<Vec<JobRecord>, RecordStoreError> {
            Ok(self.inserts.lock().unwrap().clone())
        }

        fn update(&self, _: JobId, _: &Value) -> Result<(), RecordStoreError> {
            Ok(())
        }

        fn delete(&self, _: JobId) -> Result<(), RecordStoreError> {
            Ok(())
        }
    }

    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn insert(&self, _: &JobRecord) -> Result<(), RecordStoreError> {
            Err(RecordStoreError::Request("connection refused".into()))
        }

        fn select_by_job_id(&self, _: JobId) -> Result<Vec<JobRecord>, RecordStoreError> {
            Ok(Vec::new())
        }

        fn update(&self, _: JobId, _: &Value) -> Result<(), RecordStoreError> {
            Ok(())
        }

        fn delete(&self, _: JobId) -> Result<(), RecordStoreError> {
            Ok(())
        }
    }

    fn recording_worker(
        broker: Arc<InMemoryJobBroker>,
    ) -> (Worker, Arc<Mutex<Vec<(String, GenerationParams)>>>, Arc<AtomicUsize>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let loads = Arc::new(AtomicUsize::new(0));
        let loader = RecordingLoader {
            calls: Arc::clone(&calls),
            loads: Arc::clone(&loads),
        };
        (Worker::new(broker, Arc::new(loader), None), calls, loads)
    }

    fn job(input: &str, model: &str) -> JobDescriptor {
        JobDescriptor::new(input, GenerationParams::new(), model)
    }

    /// Broker whose dequeue answers are scripted, for failure injection the
    /// in-memory broker cannot produce (it stores typed descriptors).
    struct ScriptedBroker {
        dequeues: Mutex<VecDeque<Result<Option<JobDescriptor>, BrokerError>>>,
        results: Mutex<HashMap<JobId, String>>,
    }

    impl ScriptedBroker {
        fn new(
            dequeues: impl IntoIterator<Item = Result<Option<JobDescriptor>, BrokerError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                dequeues: Mutex::new(dequeues.into_iter().collect()),
                results: Mutex::new(HashMap::new()),
            })
        }
    }

    impl JobBroker for ScriptedBroker {
        fn enqueue(&self, _job: &JobDescriptor) -> Result<(), BrokerError> {
            Ok(())
        }

        fn dequeue(&self) -> Result<Option<JobDescriptor>, BrokerError> {
            self.dequeues
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(None))
        }

        fn put_result(&self, job_id: JobId, value: &str) -> Result<(), BrokerError> {
            self.results.lock().unwrap().insert(job_id, value.to_string());
            Ok(())
        }

        fn get_result(&self, job_id: JobId) -> Result<Option<String>, BrokerError> {
            Ok(self.results.lock().unwrap().get(&job_id).cloned())
        }
    }

    #[test]
    fn empty_queue_is_not_an_error() {
        let broker = InMemoryJobBroker::arc();
        let (mut worker, _, _) = recording_worker(Arc::clone(&broker));
        assert!(!worker.process_next().unwrap());
    }

    #[test]
    fn success_writes_done_result() {
        let broker = InMemoryJobBroker::arc();
        let (mut worker, _, _) = recording_worker(Arc::clone(&broker));

        let job = job("hello", "gpt2");
        let job_id = job.job_id;
        broker.enqueue(&job).unwrap();

        assert!(worker.process_next().unwrap());

        let value = broker.get_result(job_id).unwrap().unwrap();
        assert_eq!(JobOutcome::parse(&value), JobOutcome::Done("out: hello".into()));

        // Idempotent read.
        assert_eq!(broker.get_result(job_id).unwrap().unwrap(), value);
    }

    #[test]
    fn jobs_run_in_submission_order() {
        let broker = InMemoryJobBroker::arc();
        let (mut worker, calls, _) = recording_worker(Arc::clone(&broker));

        broker.enqueue(&job("a", "gpt2")).unwrap();
        broker.enqueue(&job("b", "gpt2")).unwrap();
        broker.enqueue(&job("c", "gpt2")).unwrap();

        while worker.process_next().unwrap() {}

        let inputs: Vec<String> = calls.lock().unwrap().iter().map(|(i, _)| i.clone()).collect();
        assert_eq!(inputs, ["a", "b", "c"]);
    }

    #[test]
    fn defaults_merge_without_overriding_caller_values() {
        let broker = InMemoryJobBroker::arc();
        let (mut worker, calls, _) = recording_worker(Arc::clone(&broker));

        let mut params = GenerationParams::new();
        params.set("temperature", json!(0.1));
        broker
            .enqueue(&JobDescriptor::new("hi", params, "gpt2"))
            .unwrap();
        worker.process_next().unwrap();

        let calls = calls.lock().unwrap();
        let (_, seen) = &calls[0];
        assert_eq!(seen.get("temperature"), Some(&json!(0.1)));
        assert_eq!(seen.get("max_new_tokens"), Some(&json!(128)));
    }

    #[test]
    fn model_loads_once_for_consecutive_same_model_jobs() {
        let broker = InMemoryJobBroker::arc();
        let (mut worker, _, loads) = recording_worker(Arc::clone(&broker));

        broker.enqueue(&job("one", "gpt2")).unwrap();
        broker.enqueue(&job("two", "gpt2")).unwrap();
        broker.enqueue(&job("three", "distilgpt2")).unwrap();

        while worker.process_next().unwrap() {}
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn malformed_payload_is_dropped_and_the_queue_keeps_draining() {
        let job = job("next", "gpt2");
        let job_id = job.job_id;
        let broker = ScriptedBroker::new([
            Err(BrokerError::Deserialize("expected value at line 1".into())),
            Ok(Some(job)),
        ]);
        let mut worker = Worker::new(
            Arc::clone(&broker) as Arc<dyn JobBroker>,
            Arc::new(EchoLoader::new()),
            None,
        );

        // The malformed entry is consumed (not treated as empty, not fatal)
        // and no result is written for it.
        assert!(worker.process_next().unwrap());
        assert!(broker.results.lock().unwrap().is_empty());

        // The following entry still processes normally.
        assert!(worker.process_next().unwrap());
        let value = broker.get_result(job_id).unwrap().unwrap();
        assert_eq!(JobOutcome::parse(&value), JobOutcome::Done("Echo: next".into()));

        assert!(!worker.process_next().unwrap());
    }

    #[test]
    fn load_failure_is_tagged_terminal_error() {
        let broker = InMemoryJobBroker::arc();
        let mut worker = Worker::new(Arc::clone(&broker) as Arc<dyn JobBroker>, Arc::new(FailingLoader), None);

        let job = job("hello", "missing-model");
        let job_id = job.job_id;
        broker.enqueue(&job).unwrap();
        worker.process_next().unwrap();

        let value = broker.get_result(job_id).unwrap().unwrap();
        let outcome = JobOutcome::parse(&value);
        assert!(outcome.is_error());
        assert!(value.starts_with("ERROR: "));
        assert!(value.contains("missing-model"));

        // Terminal: the job is gone from the queue, nothing to retry.
        assert_eq!(broker.queue_len(), 0);
        assert!(!worker.process_next().unwrap());
    }

    #[test]
    fn successful_job_is_persisted() {
        let broker = InMemoryJobBroker::arc();
        let store = Arc::new(RecordingStore {
            inserts: Mutex::new(Vec::new()),
        });
        let mut worker = Worker::new(
            Arc::clone(&broker) as Arc<dyn JobBroker>,
            Arc::new(EchoLoader::new()),
            Some(Arc::clone(&store) as Arc<dyn RecordStore>),
        );

        let job = job("persist me", "gpt2");
        broker.enqueue(&job).unwrap();
        worker.process_next().unwrap();

        let inserts = store.inserts.lock().unwrap();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].job_id, job.job_id);
        assert_eq!(inserts[0].input_text, "persist me");
        assert_eq!(inserts[0].result, "Echo: persist me");
    }

    #[test]
    fn record_store_failure_never_fails_the_job() {
        let broker = InMemoryJobBroker::arc();
        let mut worker = Worker::new(
            Arc::clone(&broker) as Arc<dyn JobBroker>,
            Arc::new(EchoLoader::new()),
            Some(Arc::new(BrokenStore)),
        );

        let job = job("still fine", "gpt2");
        let job_id = job.job_id;
        broker.enqueue(&job).unwrap();
        worker.process_next().unwrap();

        let value = broker.get_result(job_id).unwrap().unwrap();
        assert_eq!(JobOutcome::parse(&value), JobOutcome::Done("Echo: still fine".into()));
    }

    #[test]
    fn spawned_worker_drains_queue_and_shuts_down() {
        let broker = InMemoryJobBroker::arc();
        let worker = Worker::new(
            Arc::clone(&broker) as Arc<dyn JobBroker>,
            Arc::new(EchoLoader::new()),
            None,
        );

        let job = job("async", "gpt2");
        let job_id = job.job_id;
        broker.enqueue(&job).unwrap();

        let handle = worker.spawn(
            WorkerConfig::default().with_poll_interval(Duration::from_millis(5)),
        );

        let mut value = None;
        for _ in 0..200 {
            value = broker.get_result(job_id).unwrap();
            if value.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        handle.shutdown();

        assert_eq!(
            JobOutcome::parse(&value.expect("worker did not process job in time")),
            JobOutcome::Done("Echo: async".into())
        );
    }
}
