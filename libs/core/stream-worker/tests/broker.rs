//! Integration tests for the Redis Streams broker: stale-delivery
//! reclaiming, retry-bound dead-lettering, legacy list migration, and
//! dead-letter redrive. Runs against a real Redis via testcontainers.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stream_worker::{
    Broker, BrokerError, FailedEntry, StreamDef, StreamJob, StreamProcessor, StreamWorker, WorkerConfig,
};
use test_utils::TestRedis;
use tokio::sync::watch;

async fn connection_manager(connection_string: &str) -> ConnectionManager {
    let client = redis::Client::open(connection_string).expect("failed to open redis client");
    ConnectionManager::new(client)
        .await
        .expect("failed to create connection manager")
}

struct TestQueue;
impl StreamDef for TestQueue {
    const QUEUE_NAME: &'static str = "broker-test-jobs";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PingJob {
    id: String,
    attempt: u32,
}

impl StreamJob for PingJob {
    fn job_id(&self) -> String {
        self.id.clone()
    }

    fn attempt(&self) -> u32 {
        self.attempt
    }

    fn with_attempt(&self, attempt: u32) -> Self {
        Self { attempt, ..self.clone() }
    }

    fn fingerprint(&self) -> String {
        self.id.clone()
    }
}

/// A processor that always fails transiently, so every delivery exercises
/// the retry/dead-letter branch.
struct AlwaysFail;

#[async_trait]
impl StreamProcessor<PingJob> for AlwaysFail {
    async fn process(&self, _job: &PingJob) -> Result<(), BrokerError> {
        Err(BrokerError::Processing("synthetic failure".to_string()))
    }

    fn name(&self) -> &'static str {
        "always-fail"
    }
}

async fn wait_for_failed_entry(broker: &Broker, queue: &str, group: &str, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let stats = broker.stats(queue, group).await.unwrap();
        if stats.failed_depth >= 1 {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("job was not dead-lettered within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn stale_delivery_is_reclaimed_and_completed_by_another_consumer() {
    let redis = TestRedis::new().await;
    let broker = Broker::new(connection_manager(redis.connection_string()).await);
    let queue = "stale-reclaim-jobs";
    let group = format!("{queue}:group");

    broker.ensure_queue(queue, &group).await.unwrap();
    broker.enqueue(queue, &PingJob { id: "job-1".into(), attempt: 0 }).await.unwrap();

    // consumer-1 reads but never acks, simulating a crash after claim.
    let delivered = broker.read(queue, &group, "consumer-1", 5, 100).await.unwrap();
    assert_eq!(delivered.len(), 1);

    let stats_before = broker.stats(queue, &group).await.unwrap();
    assert_eq!(stats_before.pending, 1);

    // consumer-2 reclaims the idle entry (min_idle_ms = 0 so it's eligible immediately).
    let reclaimed = broker.claim_stale(queue, &group, "consumer-2", 0, 10).await.unwrap();
    assert_eq!(reclaimed.len(), 1);
    assert_eq!(reclaimed[0].id, delivered[0].id);

    broker.ack(queue, &group, &reclaimed[0].id).await.unwrap();

    let stats_after = broker.stats(queue, &group).await.unwrap();
    assert_eq!(stats_after.pending, 0, "ack should clear the pending entries list");
    assert_eq!(stats_after.stream_depth, 0, "ack atomically XDELs the entry");
}

#[tokio::test]
async fn job_is_never_retried_more_than_max_attempts_before_dead_lettering() {
    let redis = TestRedis::new().await;
    let broker = Broker::new(connection_manager(redis.connection_string()).await);

    let config = WorkerConfig::from_stream_def::<TestQueue>()
        .with_consumer_id("retry-bound-test")
        .with_max_attempts(2)
        .with_base_retry_ms(5)
        .with_processing_stale_sec(5);

    let worker = StreamWorker::new(broker.clone(), AlwaysFail, config.clone());

    broker
        .enqueue(&config.queue_name, &PingJob { id: "job-1".into(), attempt: 0 })
        .await
        .unwrap();

    let (_tx, rx) = watch::channel(false);
    let run_handle = tokio::spawn(async move { worker.run(rx).await });

    wait_for_failed_entry(&broker, &config.queue_name, &config.group_name(), Duration::from_secs(5)).await;

    run_handle.abort();

    let stats = broker.stats(&config.queue_name, &config.group_name()).await.unwrap();
    assert_eq!(stats.failed_depth, 1, "the (maxAttempts+1)th failure dead-letters exactly once");
    assert_eq!(stats.retry_depth, 0, "no attempt left pending in the retry z-set");
    assert_eq!(stats.stream_depth, 0, "the stream entry is gone once dead-lettered");

    let dead_letters = broker.list_dead_letters(&config.queue_name, 10, 0).await.unwrap();
    assert_eq!(dead_letters.len(), 1);
    assert_eq!(dead_letters[0].attempt, 2, "attempt recorded at the point of exhaustion");
}

#[tokio::test]
async fn ensure_queue_migrates_legacy_list_oldest_first_then_new_entry() {
    let redis = TestRedis::new().await;
    let broker = Broker::new(connection_manager(redis.connection_string()).await);
    let queue = "legacy-migration-jobs";
    let group = format!("{queue}:group");

    let mut raw_conn = connection_manager(redis.connection_string()).await;
    // LPUSH leaves the most recently pushed entry at the head, so
    // legacy-1 was enqueued before legacy-2.
    redis::cmd("LPUSH").arg(queue).arg("legacy-2").arg("legacy-1").query_async::<()>(&mut raw_conn).await.unwrap();

    broker.ensure_queue(queue, &group).await.unwrap();

    let key_type: String = redis::cmd("TYPE").arg(queue).query_async(&mut raw_conn).await.unwrap();
    assert_eq!(key_type, "stream");

    broker.enqueue(queue, &serde_json::json!({"payload": "new"})).await.unwrap();

    let reply: redis::streams::StreamRangeReply =
        redis::cmd("XRANGE").arg(queue).arg("-").arg("+").query_async(&mut raw_conn).await.unwrap();

    assert_eq!(reply.ids.len(), 3, "legacy-1, legacy-2, and the new entry");

    let payloads: Vec<String> = reply
        .ids
        .iter()
        .map(|entry| {
            entry
                .map
                .get("payload")
                .and_then(|v| match v {
                    redis::Value::BulkString(bytes) => String::from_utf8(bytes.clone()).ok(),
                    redis::Value::SimpleString(s) => Some(s.clone()),
                    _ => None,
                })
                .unwrap()
        })
        .collect();

    assert_eq!(payloads[0], "legacy-1");
    assert_eq!(payloads[1], "legacy-2");
    assert!(payloads[2].contains("\"payload\":\"new\""));
}

#[tokio::test]
async fn redrive_splits_valid_and_garbage_entries() {
    let redis = TestRedis::new().await;
    let broker = Broker::new(connection_manager(redis.connection_string()).await);
    let queue = "redrive-jobs";
    let mut raw_conn = connection_manager(redis.connection_string()).await;

    let valid = FailedEntry {
        failed_at: chrono::Utc::now(),
        error: "upstream timeout".to_string(),
        attempt: 3,
        payload: serde_json::json!({"projectId": "p1", "sessionId": "s1"}),
    };
    let garbage = FailedEntry {
        failed_at: chrono::Utc::now(),
        error: "decode failure".to_string(),
        attempt: 1,
        payload: serde_json::json!({"oops": true}),
    };

    // Seed the failed list directly, as if an earlier worker run had
    // dead-lettered both entries.
    redis::cmd("LPUSH")
        .arg(format!("{queue}:failed"))
        .arg(serde_json::to_string(&garbage).unwrap())
        .arg(serde_json::to_string(&valid).unwrap())
        .query_async::<()>(&mut raw_conn)
        .await
        .unwrap();

    let result = broker.redrive(queue, 10).await.unwrap();

    assert_eq!(result.requested, 10);
    assert_eq!(result.redriven, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.remaining_failed, 0);

    let unprocessable_len: u64 =
        redis::cmd("LLEN").arg(format!("{queue}:failed:unprocessable")).query_async(&mut raw_conn).await.unwrap();
    assert_eq!(unprocessable_len, 1);

    let stream_len: u64 = redis::cmd("XLEN").arg(queue).query_async(&mut raw_conn).await.unwrap();
    assert_eq!(stream_len, 1, "the well-formed entry was re-enqueued onto the stream");
}
