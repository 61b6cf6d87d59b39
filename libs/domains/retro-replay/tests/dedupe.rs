//! Confirms the done-marker dedupe path: two deliveries of a replay job
//! carrying the same fingerprint result in exactly one call to the
//! underlying processor. Runs against a real Redis via testcontainers.

use async_trait::async_trait;
use domain_retro_core::{MarkerKind, ReplayJob};
use redis::aio::ConnectionManager;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stream_worker::{Broker, BrokerError, StreamDef, StreamProcessor, StreamWorker, WorkerConfig};
use test_utils::TestRedis;
use tokio::sync::watch;

async fn connection_manager(connection_string: &str) -> ConnectionManager {
    let client = redis::Client::open(connection_string).expect("failed to open redis client");
    ConnectionManager::new(client).await.expect("failed to create connection manager")
}

struct ReplayQueue;
impl StreamDef for ReplayQueue {
    const QUEUE_NAME: &'static str = "replay-dedupe-jobs";
}

struct CountingProcessor {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl StreamProcessor<ReplayJob> for CountingProcessor {
    async fn process(&self, _job: &ReplayJob) -> Result<(), BrokerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CountingProcessor"
    }
}

fn sample_job(attempt: u32) -> ReplayJob {
    ReplayJob {
        project_id: "proj-1".to_string(),
        session_id: "sess-1".to_string(),
        events_object_key: "sessions/proj-1/sess-1/events.json".to_string(),
        marker_offsets_ms: vec![1_200, 3_400],
        trigger_kind: MarkerKind::JsException,
        attempt,
    }
}

#[tokio::test]
async fn second_delivery_with_identical_fingerprint_is_skipped() {
    let redis = TestRedis::new().await;
    let broker = Broker::new(connection_manager(redis.connection_string()).await);

    let config = WorkerConfig::from_stream_def::<ReplayQueue>()
        .with_consumer_id("dedupe-test")
        .with_dedupe_window_sec(60);

    // Two distinct stream entries, same job content and therefore the same
    // fingerprint: the second represents a duplicate ingest retry, not a
    // retried attempt of the first.
    broker.enqueue(&config.queue_name, &sample_job(0)).await.unwrap();
    broker.enqueue(&config.queue_name, &sample_job(0)).await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let processor = CountingProcessor { calls: Arc::clone(&calls) };
    let worker = StreamWorker::new(broker.clone(), processor, config.clone());

    let (_tx, rx) = watch::channel(false);
    let run_handle = tokio::spawn(async move { worker.run(rx).await });

    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        let stats = broker.stats(&config.queue_name, &config.group_name()).await.unwrap();
        if stats.stream_depth == 0 && stats.pending == 0 {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("both deliveries were not drained within 5s");
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }

    run_handle.abort();

    assert_eq!(calls.load(Ordering::SeqCst), 1, "the duplicate delivery must not re-run the processor");

    let stats = broker.stats(&config.queue_name, &config.group_name()).await.unwrap();
    assert_eq!(stats.failed_depth, 0, "neither delivery should be dead-lettered");
}

#[tokio::test]
async fn retried_attempt_keeps_same_fingerprint_as_original() {
    let original = sample_job(0);
    let retried = original.with_attempt(1);

    use stream_worker::StreamJob;
    assert_eq!(
        original.fingerprint(),
        retried.fingerprint(),
        "attempt must not perturb the fingerprint used for dedupe"
    );
    assert_ne!(original.attempt(), retried.attempt());
}
