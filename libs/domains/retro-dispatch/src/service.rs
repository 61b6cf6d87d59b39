use chrono::Utc;
use domain_retro_clustering::derive_cluster_key;
use domain_retro_clustering::entity::marker::NewErrorMarker;
use domain_retro_clustering::MarkerRepository;
use domain_retro_core::{
    dominant_trigger_kind, AnalysisJob, AnalysisQueue, Marker, ReplayJob, ReplayQueue,
};
use std::sync::Arc;
use stream_worker::{Broker, StreamDef};
use tracing::{error, info, instrument};

use crate::error::{DispatchError, DispatchResult};
use crate::models::{IngestSessionRequest, IngestSessionResponse, QueuedStatus};

/// Fans an ingested session out into a replay job and an analysis job, and
/// records one `error_markers` row per marker (cluster key pre-computed)
/// for the clustering engine's later promotion pass.
/// Enqueue failures are surfaced in the response but never fail ingestion:
/// the session was still received and recorded in the caller's log.
pub struct DispatchService<M: MarkerRepository> {
    broker: Broker,
    markers: Arc<M>,
}

impl<M: MarkerRepository> DispatchService<M> {
    pub fn new(broker: Broker, markers: M) -> Self {
        Self { broker, markers: Arc::new(markers) }
    }

    #[instrument(skip(self, req), fields(project_id = %req.project_id, session_id = %req.session_id))]
    pub async fn dispatch_session(&self, req: IngestSessionRequest) -> DispatchResult<IngestSessionResponse> {
        if req.markers.is_empty() {
            info!("session accepted with no markers; no jobs enqueued");
            return Ok(IngestSessionResponse {
                accepted: true,
                trigger_kind: None,
                queued: QueuedStatus { replay: false, analysis: false },
                queue_error: None,
            });
        }

        let trigger_kind = dominant_trigger_kind(&req.markers)
            .expect("validated non-empty marker list above");

        let marker_offsets_ms: Vec<i64> = req.markers.iter().map(|m| m.offset_ms).collect();
        let marker_hints: Vec<String> = req
            .markers
            .iter()
            .filter_map(|m: &Marker| m.label.clone().or_else(|| m.cluster_hint.clone()))
            .collect();

        let replay_job = ReplayJob {
            project_id: req.project_id.clone(),
            session_id: req.session_id.clone(),
            events_object_key: req.events_object_key.clone(),
            marker_offsets_ms: marker_offsets_ms.clone(),
            trigger_kind,
            attempt: 0,
        };

        let analysis_job = AnalysisJob {
            project_id: req.project_id.clone(),
            session_id: req.session_id.clone(),
            events_object_key: req.events_object_key.clone(),
            marker_offsets_ms,
            trigger_kind,
            marker_hints,
            route: req.route.clone(),
            site: req.site.clone(),
            attempt: 0,
        };

        let mut queue_errors = Vec::new();
        let observed_at = req.observed_at.unwrap_or_else(Utc::now);

        let new_markers: Vec<NewErrorMarker> = req
            .markers
            .iter()
            .map(|marker| {
                let cluster_hint = marker.cluster_hint.clone();
                let label = marker.label.clone();
                let cluster_key = derive_cluster_key(&req.route, marker.kind, cluster_hint.as_deref(), label.as_deref());

                NewErrorMarker {
                    project_id: req.project_id.clone(),
                    session_id: req.session_id.clone(),
                    cluster_key: cluster_key.as_str().to_string(),
                    kind: marker.kind,
                    route: req.route.clone(),
                    offset_ms: marker.offset_ms,
                    label,
                    cluster_hint,
                    observed_at,
                }
            })
            .collect();

        if let Err(e) = self.markers.record(new_markers).await {
            error!(error = %e, "failed to persist error markers");
            queue_errors.push(format!("markers: {e}"));
        }

        let replay_queued = match self.broker.enqueue(ReplayQueue::QUEUE_NAME, &replay_job).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "failed to enqueue replay job");
                queue_errors.push(format!("replay: {e}"));
                false
            }
        };

        let analysis_queued = match self.broker.enqueue(AnalysisQueue::QUEUE_NAME, &analysis_job).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "failed to enqueue analysis job");
                queue_errors.push(format!("analysis: {e}"));
                false
            }
        };

        info!(
            trigger_kind = %trigger_kind,
            replay_queued,
            analysis_queued,
            observed_at = %observed_at,
            "session dispatched"
        );

        Ok(IngestSessionResponse {
            accepted: true,
            trigger_kind: Some(trigger_kind.to_string()),
            queued: QueuedStatus { replay: replay_queued, analysis: analysis_queued },
            queue_error: if queue_errors.is_empty() { None } else { Some(queue_errors.join("; ")) },
        })
    }
}
