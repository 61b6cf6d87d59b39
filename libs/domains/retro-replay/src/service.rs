use chrono::Utc;
use domain_retro_core::{
    marker_window, parse_events, Artifact, ArtifactStatus, ArtifactType, ObjectStore, ReplayJob, ReportCard, ReportCardStatus,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::config::ReplayConfig;
use crate::error::{ReplayError, ReplayResult};
use crate::quota::{RenderGateDecision, RenderQuotaGate};
use crate::renderer::{Renderer, Viewport};
use crate::report_sink::ReportSink;
use crate::repository::ArtifactRepository;
use crate::visual_client::{VideoLocation, VisualModelClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum RenderStatus {
    Skipped,
    Ready,
    Failed,
}

/// The `analysis.json` artifact body, per the on-disk contract every
/// downstream reader (including the visual model's own dashboard) expects.
#[derive(Debug, Serialize)]
struct AnalysisJsonArtifact {
    version: u8,
    project_id: String,
    session_id: String,
    source_events_object_key: String,
    marker_windows: Vec<domain_retro_core::MarkerWindow>,
    trigger_kind: domain_retro_core::MarkerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay_video_object_key: Option<String>,
    render_status: RenderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    render_error: Option<String>,
    generated_at: chrono::DateTime<Utc>,
}

pub struct ReplayService<A: ArtifactRepository> {
    artifacts: Arc<A>,
    object_store: Arc<dyn ObjectStore>,
    renderer: Arc<dyn Renderer>,
    quota_gate: Option<RenderQuotaGate>,
    visual_client: Option<VisualModelClient>,
    report_sink: Arc<dyn ReportSink>,
    config: ReplayConfig,
}

impl<A: ArtifactRepository> ReplayService<A> {
    pub fn new(
        artifacts: A,
        object_store: Arc<dyn ObjectStore>,
        renderer: Arc<dyn Renderer>,
        quota_gate: Option<RenderQuotaGate>,
        visual_client: Option<VisualModelClient>,
        report_sink: Arc<dyn ReportSink>,
        config: ReplayConfig,
    ) -> Self {
        Self { artifacts: Arc::new(artifacts), object_store, renderer, quota_gate, visual_client, report_sink, config }
    }

    #[instrument(skip(self, job), fields(project_id = %job.project_id, session_id = %job.session_id))]
    pub async fn process(&self, job: &ReplayJob) -> ReplayResult<()> {
        let blob = self
            .object_store
            .get(&job.events_object_key)
            .await
            .map_err(|e| ReplayError::ObjectStore(e.to_string()))?;
        let events = match parse_events(&blob) {
            Ok(events) => events,
            Err(e) => return Err(ReplayError::SchemaViolation(e.to_string())),
        };

        let marker_windows: Vec<_> = job.marker_offsets_ms.iter().map(|o| marker_window(*o)).collect();

        let (render_status, render_error, video_bytes) = self.attempt_render(job, &events).await;

        let replay_video_object_key = if render_status == RenderStatus::Ready {
            Some(format!("{}{}/full-replay.webm", self.config.artifact_prefix, job.session_id))
        } else {
            None
        };

        let analysis_json = AnalysisJsonArtifact {
            version: 1,
            project_id: job.project_id.clone(),
            session_id: job.session_id.clone(),
            source_events_object_key: job.events_object_key.clone(),
            marker_windows: marker_windows.clone(),
            trigger_kind: job.trigger_kind,
            replay_video_object_key: replay_video_object_key.clone(),
            render_status,
            render_error: render_error.clone(),
            generated_at: Utc::now(),
        };

        let analysis_json_key = format!("{}{}/analysis.json", self.config.artifact_prefix, job.session_id);
        let analysis_json_bytes =
            serde_json::to_vec(&analysis_json).map_err(|e| ReplayError::Render(e.to_string()))?;
        self.object_store
            .put(&analysis_json_key, analysis_json_bytes)
            .await
            .map_err(|e| ReplayError::ObjectStore(e.to_string()))?;

        self.artifacts
            .upsert(Artifact {
                project_id: job.project_id.clone(),
                session_id: job.session_id.clone(),
                artifact_type: ArtifactType::AnalysisJson,
                artifact_key: analysis_json_key,
                status: ArtifactStatus::Ready,
                trigger_kind: job.trigger_kind,
                windows: marker_windows,
                generated_at: Utc::now(),
            })
            .await?;

        if let (RenderStatus::Ready, Some(key), Some(bytes)) = (render_status, &replay_video_object_key, video_bytes) {
            self.object_store.put(key, bytes).await.map_err(|e| ReplayError::ObjectStore(e.to_string()))?;
            self.artifacts
                .upsert(Artifact {
                    project_id: job.project_id.clone(),
                    session_id: job.session_id.clone(),
                    artifact_type: ArtifactType::ReplayVideo,
                    artifact_key: key.clone(),
                    status: ArtifactStatus::Ready,
                    trigger_kind: job.trigger_kind,
                    windows: vec![],
                    generated_at: Utc::now(),
                })
                .await?;
        }

        let existing = self.report_sink.fetch_card(&job.project_id, &job.session_id).await?;
        let mut card = existing.unwrap_or_else(|| ReportCard::pending(&job.project_id, &job.session_id));

        card.status = match render_status {
            // A visual endpoint exists to confirm or refute the video; absent
            // that it can't contradict the text-analysis stage, so the card
            // closes `ready` on the text signal alone.
            RenderStatus::Ready if self.visual_client.is_some() => {
                self.apply_visual_verification(job, &mut card, replay_video_object_key.as_deref()).await
            }
            RenderStatus::Ready | RenderStatus::Skipped => ReportCardStatus::Ready,
            RenderStatus::Failed => {
                card.technical_root_cause = card.technical_root_cause.or(render_error);
                ReportCardStatus::Failed
            }
        };

        self.report_sink.report(card).await
    }

    /// Drives the render gate and renderer. Any render-path error becomes a
    /// `Failed` status rather than a propagated error: a render failure
    /// still produces a valid (videoless) analysis artifact.
    async fn attempt_render(
        &self,
        job: &ReplayJob,
        events: &[domain_retro_core::SessionEvent],
    ) -> (RenderStatus, Option<String>, Option<Vec<u8>>) {
        if !self.config.render_enabled {
            return (RenderStatus::Skipped, Some("rendering disabled".to_string()), None);
        }

        let Some(gate) = &self.quota_gate else {
            return (RenderStatus::Skipped, Some("render quota gate not configured".to_string()), None);
        };

        match gate.check(&job.project_id).await {
            Ok(RenderGateDecision::Allowed) => {}
            Ok(RenderGateDecision::Skipped(reason)) => return (RenderStatus::Skipped, Some(reason), None),
            Err(e) => return (RenderStatus::Skipped, Some(e.to_string()), None),
        }

        let viewport = Viewport { width: self.config.viewport_width, height: self.config.viewport_height };

        match self
            .renderer
            .render_to_webm(events, viewport, self.config.render_speed, self.config.render_max_duration_ms)
            .await
        {
            Ok(outcome) => {
                if let Err(e) = gate.record_render(&job.project_id).await {
                    warn!(session_id = %job.session_id, error = %e, "failed to record render quota usage");
                }
                (RenderStatus::Ready, None, Some(outcome.webm))
            }
            Err(e) => (RenderStatus::Failed, Some(e.to_string()), None),
        }
    }

    async fn apply_visual_verification(
        &self,
        job: &ReplayJob,
        card: &mut ReportCard,
        video_key: Option<&str>,
    ) -> ReportCardStatus {
        let (Some(client), Some(key)) = (&self.visual_client, video_key) else {
            return card.status;
        };

        let video = VideoLocation {
            bucket: self.config.artifact_bucket.clone(),
            endpoint: self.config.artifact_endpoint.clone(),
            region: self.config.artifact_region.clone(),
            key: key.to_string(),
            content_type: "video/webm".to_string(),
        };

        match client.verify(video, &job.trigger_kind.to_string()).await {
            Ok(verdict) => {
                card.visual_summary = Some(verdict.summary);
                if card.symptom.is_none() {
                    card.symptom = verdict.symptom;
                }
                if card.technical_root_cause.is_none() {
                    card.technical_root_cause = verdict.technical_root_cause;
                }
                if card.suggested_fix.is_none() {
                    card.suggested_fix = verdict.suggested_fix;
                }
                card.confidence = card.confidence.max(verdict.confidence);

                if verdict.confirmed {
                    ReportCardStatus::Ready
                } else {
                    ReportCardStatus::Discarded
                }
            }
            Err(e) => {
                warn!(session_id = %job.session_id, error = %e, "visual verification failed");
                ReportCardStatus::Failed
            }
        }
    }

    /// Closes a session's report card as `failed`, for a terminal error the
    /// processor has decided will never succeed on retry. Called by
    /// `ReplayProcessor`, not from within `process` itself, so the same
    /// terminal-or-not decision that drives the worker's dead-letter routing
    /// also drives this write — exactly once per terminal failure.
    pub async fn persist_failed(&self, job: &ReplayJob, reason: &str) -> ReplayResult<()> {
        let existing = self.report_sink.fetch_card(&job.project_id, &job.session_id).await?;
        let mut card = existing.unwrap_or_else(|| ReportCard::pending(&job.project_id, &job.session_id));
        card.status = ReportCardStatus::Failed;
        let truncated: String = reason.chars().take(600).collect();
        card.technical_root_cause = card.technical_root_cause.or(Some(truncated));
        self.report_sink.report(card).await
    }
}
