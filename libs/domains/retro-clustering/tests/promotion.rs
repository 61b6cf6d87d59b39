//! End-to-end promotion against a real Postgres schema: markers recorded
//! through `PgClusteringRepository` group into clusters once the session
//! threshold is reached, and re-running promotion over an unchanged marker
//! table is idempotent. Confidence math itself is covered by the mock-based
//! unit tests in `service.rs`; this file exercises the repository wiring.

use chrono::Utc;
use domain_retro_clustering::cluster_key::derive_cluster_key;
use domain_retro_clustering::config::ClusterConfig;
use domain_retro_clustering::entity::marker::NewErrorMarker;
use domain_retro_clustering::postgres::PgClusteringRepository;
use domain_retro_clustering::service::ClusteringService;
use domain_retro_core::{ClusterState, MarkerKind};
use test_utils::TestDatabase;

fn config(min_sessions: u64) -> ClusterConfig {
    ClusterConfig {
        min_sessions,
        min_cluster_confidence: 0.0,
        cooldown_minutes: 60,
        alert_webhook_url: None,
        alert_timeout_ms: 5_000,
    }
}

fn marker(project_id: &str, session_id: &str, cluster_key: &str, route: &str) -> NewErrorMarker {
    NewErrorMarker {
        project_id: project_id.to_string(),
        session_id: session_id.to_string(),
        cluster_key: cluster_key.to_string(),
        kind: MarkerKind::ApiError,
        route: route.to_string(),
        offset_ms: 1_500,
        label: Some("checkout-5xx".to_string()),
        cluster_hint: Some("checkout-5xx".to_string()),
        observed_at: Utc::now(),
    }
}

#[tokio::test]
async fn marker_group_promotes_once_min_sessions_reached() {
    let db = TestDatabase::new().await;
    let repo = PgClusteringRepository::new(db.connection());

    let key = derive_cluster_key("/checkout", MarkerKind::ApiError, Some("checkout-5xx"), None);
    let key_string = key.as_str().to_string();

    let markers = domain_retro_clustering::repository::MarkerRepository::record(
        &repo,
        vec![
            marker("proj-1", "sess-a", &key_string, "/checkout"),
            marker("proj-1", "sess-b", &key_string, "/checkout"),
        ],
    );
    markers.await.unwrap();

    let service = ClusteringService::new(repo.clone(), repo.clone(), repo, config(2), None, None);
    let promoted = service.promote("proj-1").await.unwrap();

    assert_eq!(promoted.len(), 1);
    let cluster = &promoted[0];
    assert_eq!(cluster.cluster_key.as_str(), key_string);
    assert_eq!(cluster.session_count, 2);
    assert!((cluster.confidence - (2.0 / 3.0)).abs() < 1e-9);
    assert_eq!(cluster.state, ClusterState::Open);
}

#[tokio::test]
async fn below_threshold_group_is_not_promoted() {
    let db = TestDatabase::new().await;
    let repo = PgClusteringRepository::new(db.connection());

    let key = derive_cluster_key("/checkout", MarkerKind::ApiError, Some("checkout-5xx"), None);
    let key_string = key.as_str().to_string();

    domain_retro_clustering::repository::MarkerRepository::record(
        &repo,
        vec![marker("proj-1", "sess-a", &key_string, "/checkout")],
    )
    .await
    .unwrap();

    let service = ClusteringService::new(repo.clone(), repo.clone(), repo, config(2), None, None);
    let promoted = service.promote("proj-1").await.unwrap();

    assert!(promoted.is_empty());
}

#[tokio::test]
async fn re_running_promotion_over_unchanged_markers_is_idempotent() {
    let db = TestDatabase::new().await;
    let repo = PgClusteringRepository::new(db.connection());

    let key = derive_cluster_key("/checkout", MarkerKind::ApiError, Some("checkout-5xx"), None);
    let key_string = key.as_str().to_string();

    domain_retro_clustering::repository::MarkerRepository::record(
        &repo,
        vec![
            marker("proj-1", "sess-a", &key_string, "/checkout"),
            marker("proj-1", "sess-b", &key_string, "/checkout"),
        ],
    )
    .await
    .unwrap();

    let service = ClusteringService::new(repo.clone(), repo.clone(), repo, config(2), None, None);

    let first = service.promote("proj-1").await.unwrap();
    let second = service.promote("proj-1").await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].session_count, second[0].session_count);
    assert_eq!(first[0].confidence, second[0].confidence);
    assert_eq!(first[0].state, second[0].state);
}

#[tokio::test]
async fn operator_assigned_state_survives_repeated_promotion() {
    let db = TestDatabase::new().await;
    let repo = PgClusteringRepository::new(db.connection());

    let key = derive_cluster_key("/checkout", MarkerKind::ApiError, Some("checkout-5xx"), None);
    let key_string = key.as_str().to_string();

    domain_retro_clustering::repository::MarkerRepository::record(
        &repo,
        vec![
            marker("proj-1", "sess-a", &key_string, "/checkout"),
            marker("proj-1", "sess-b", &key_string, "/checkout"),
        ],
    )
    .await
    .unwrap();

    let marker_writer = repo.clone();
    let service = ClusteringService::new(repo.clone(), repo.clone(), repo, config(2), None, None);
    service.promote("proj-1").await.unwrap();

    service
        .set_state("proj-1", &key, ClusterState::Acknowledged, Some("alice".to_string()), None, None, "operator")
        .await
        .unwrap();

    // A new marker arrives for the same cluster, shifting the group's
    // aggregate but not its operator-assigned state or assignee.
    domain_retro_clustering::repository::MarkerRepository::record(
        &marker_writer,
        vec![marker("proj-1", "sess-c", &key_string, "/checkout")],
    )
    .await
    .unwrap();

    let reconfirmed = service.promote("proj-1").await.unwrap();
    assert_eq!(reconfirmed.len(), 1);
    assert_eq!(reconfirmed[0].state, ClusterState::Acknowledged);
    assert_eq!(reconfirmed[0].assignee.as_deref(), Some("alice"));
    assert_eq!(reconfirmed[0].session_count, 3);
}
