//! Confirms the confidence gate in `AnalysisService`: a session whose
//! heuristic confidence lands below the acceptance threshold is discarded
//! when the deployment opts into it, and otherwise stays pending for the
//! replay stage to confirm or refute.

use async_trait::async_trait;
use domain_retro_analysis::repository::ReportCardRepository;
use domain_retro_analysis::{AnalysisConfig, AnalysisResult, AnalysisService, AnalyzerProvider};
use domain_retro_core::{AnalysisJob, MarkerKind, ObjectStore, ReportCard, ReportCardStatus, RetroError, RetroResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

struct InMemoryObjectStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    fn with(key: &str, bytes: Vec<u8>) -> Self {
        let mut blobs = HashMap::new();
        blobs.insert(key.to_string(), bytes);
        Self { blobs: Mutex::new(blobs) }
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, key: &str) -> RetroResult<Vec<u8>> {
        self.blobs.lock().await.get(key).cloned().ok_or_else(|| RetroError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> RetroResult<()> {
        self.blobs.lock().await.insert(key.to_string(), bytes);
        Ok(())
    }
}

/// A `ReportCardRepository` that just records the last card it was given.
/// `mockall`'s generated mocks are gated behind `#[cfg(test)]` inside the
/// library crate itself, so they don't exist in a normal dependency build —
/// this integration test needs its own fake.
#[derive(Default)]
struct RecordingRepository {
    last: Mutex<Option<ReportCard>>,
}

#[async_trait]
impl ReportCardRepository for RecordingRepository {
    async fn upsert(&self, card: ReportCard) -> AnalysisResult<ReportCard> {
        *self.last.lock().await = Some(card.clone());
        Ok(card)
    }

    async fn get(&self, _project_id: &str, _session_id: &str) -> AnalysisResult<Option<ReportCard>> {
        Ok(self.last.lock().await.clone())
    }
}

fn config(min_accept_confidence: f64, discard_uncertain: bool) -> AnalysisConfig {
    AnalysisConfig {
        provider: AnalyzerProvider::Heuristic,
        min_accept_confidence,
        discard_uncertain,
        remote_text_url: None,
        remote_text_timeout_ms: 1_000,
    }
}

fn low_signal_job() -> AnalysisJob {
    // ui_no_effect base 0.56 with <20 sampled events and no rule-table hit
    // scores 0.48, safely below any reasonable acceptance threshold.
    AnalysisJob {
        project_id: "p1".into(),
        session_id: "s1".into(),
        events_object_key: "k".into(),
        marker_offsets_ms: vec![100],
        trigger_kind: MarkerKind::UiNoEffect,
        marker_hints: vec![],
        route: "/cart".into(),
        site: "shop".into(),
        attempt: 0,
    }
}

fn sparse_events() -> Vec<u8> {
    let events: Vec<_> =
        (0..5).map(|i| serde_json::json!({"type": 1, "timestamp": 100 + i * 10, "v": "click"})).collect();
    serde_json::to_vec(&events).unwrap()
}

#[tokio::test]
async fn low_confidence_session_is_discarded_when_configured_to() {
    let store = Arc::new(InMemoryObjectStore::with("k", sparse_events()));
    let repo = RecordingRepository::default();

    let service = AnalysisService::new(repo, config(0.6, true), store);
    let card = service.analyze_and_persist(&low_signal_job()).await.unwrap();

    assert_eq!(card.status, ReportCardStatus::Discarded);
    assert!(card.confidence < 0.6);
}

#[tokio::test]
async fn low_confidence_session_stays_pending_when_discard_disabled() {
    let store = Arc::new(InMemoryObjectStore::with("k", sparse_events()));
    let repo = RecordingRepository::default();

    let service = AnalysisService::new(repo, config(0.6, false), store);
    let card = service.analyze_and_persist(&low_signal_job()).await.unwrap();

    assert_eq!(card.status, ReportCardStatus::Pending);
}

#[tokio::test]
async fn confidence_at_or_above_threshold_is_never_discarded() {
    let store = Arc::new(InMemoryObjectStore::with("k", sparse_events()));
    let repo = RecordingRepository::default();

    // Same marker/event shape, but a threshold low enough that 0.48 clears it.
    let service = AnalysisService::new(repo, config(0.4, true), store);
    let card = service.analyze_and_persist(&low_signal_job()).await.unwrap();

    assert_eq!(card.status, ReportCardStatus::Pending);
    assert!(card.confidence >= 0.4);
}

#[tokio::test]
async fn terminal_provider_failure_persists_a_failed_card_with_low_confidence() {
    let store = Arc::new(InMemoryObjectStore::with("k", sparse_events()));
    let repo = RecordingRepository::default();

    let service = AnalysisService::new(repo, config(0.6, true), store);
    let card = service.persist_failed(&low_signal_job(), "upstream schema violation").await.unwrap();

    assert_eq!(card.status, ReportCardStatus::Failed);
    assert_eq!(card.technical_root_cause.as_deref(), Some("upstream schema violation"));
}

