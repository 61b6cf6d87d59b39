//! Confirms the alert cooldown gate: a cluster crossing the confidence
//! threshold fires once, then stays quiet for the configured cooldown even
//! if promotion re-runs. Runs against a real Redis via testcontainers.

use domain_retro_clustering::alert::AlertGate;
use redis::aio::ConnectionManager;
use test_utils::TestRedis;

async fn connection_manager(connection_string: &str) -> ConnectionManager {
    let client = redis::Client::open(connection_string).expect("failed to open redis client");
    ConnectionManager::new(client).await.expect("failed to create connection manager")
}

#[tokio::test]
async fn second_acquire_within_cooldown_is_refused() {
    let redis = TestRedis::new().await;
    let gate = AlertGate::new(connection_manager(redis.connection_string()).await, 60);

    let first = gate.try_acquire("proj-1", "cluster-key-a", "threshold").await.unwrap();
    assert!(first, "the first alert for a fresh cluster must be allowed through");

    let second = gate.try_acquire("proj-1", "cluster-key-a", "threshold").await.unwrap();
    assert!(!second, "a repeat promotion within the cooldown window must not re-alert");
}

#[tokio::test]
async fn distinct_clusters_and_alert_types_gate_independently() {
    let redis = TestRedis::new().await;
    let gate = AlertGate::new(connection_manager(redis.connection_string()).await, 60);

    assert!(gate.try_acquire("proj-1", "cluster-key-a", "threshold").await.unwrap());
    assert!(gate.try_acquire("proj-1", "cluster-key-b", "threshold").await.unwrap(), "a different cluster must gate independently");
    assert!(gate.try_acquire("proj-1", "cluster-key-a", "reopened").await.unwrap(), "a different alert type must gate independently");
    assert!(!gate.try_acquire("proj-1", "cluster-key-a", "threshold").await.unwrap(), "same project/cluster/type must still be refused");
}

#[tokio::test]
async fn zero_cooldown_allows_every_acquire() {
    let redis = TestRedis::new().await;
    let gate = AlertGate::new(connection_manager(redis.connection_string()).await, 0);

    // cooldown_minutes = 0 -> TTL of 0 seconds, so the cooldown key expires
    // essentially immediately; SET NX still races the first writer in.
    assert!(gate.try_acquire("proj-2", "cluster-key-z", "threshold").await.unwrap());
}
