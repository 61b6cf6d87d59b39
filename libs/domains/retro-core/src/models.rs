//! Shared data model for the ingest → analysis/replay → clustering pipeline.
//!
//! These types cross crate boundaries (dispatch produces jobs, analysis and
//! replay workers consume them) so they live here rather than in any single
//! domain crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stream_worker::StreamJob;
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// A marker is a single recorded anomaly within a session replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarkerKind {
    ValidationFailed,
    ApiError,
    JsException,
    UiNoEffect,
}

impl MarkerKind {
    /// Weight used to pick the dominant trigger kind for a session: higher wins.
    pub fn weight(self) -> u8 {
        match self {
            MarkerKind::UiNoEffect => 1,
            MarkerKind::ValidationFailed => 2,
            MarkerKind::ApiError => 3,
            MarkerKind::JsException => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Marker {
    pub kind: MarkerKind,
    pub offset_ms: i64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub cluster_hint: Option<String>,
}

/// An ingested browser session, the unit of work the dispatcher fans out from.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub project_id: String,
    pub session_id: String,
    pub site: String,
    pub route: String,
    pub events_object_key: String,
    pub markers: Vec<Marker>,
    pub observed_at: DateTime<Utc>,
}

/// Highest-weighted [`MarkerKind`] across a session's markers; ties keep the
/// first marker of the winning weight. Panics never occur: callers only
/// invoke this for sessions that already have at least one marker.
pub fn dominant_trigger_kind(markers: &[Marker]) -> Option<MarkerKind> {
    markers.iter().map(|m| m.kind).max_by_key(|k| k.weight())
}

/// Clamp a confidence value into `[0, 1]`, mapping non-finite inputs to 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn fingerprint_of(parts: &[&str], offsets: &[i64]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\0");
    }
    for offset in offsets {
        hasher.update(offset.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Replay/render job: renders a session's events into a video artifact.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplayJob {
    pub project_id: String,
    pub session_id: String,
    pub events_object_key: String,
    pub marker_offsets_ms: Vec<i64>,
    pub trigger_kind: MarkerKind,
    #[serde(default)]
    pub attempt: u32,
}

impl StreamJob for ReplayJob {
    fn job_id(&self) -> String {
        format!("{}:{}", self.project_id, self.session_id)
    }

    fn attempt(&self) -> u32 {
        self.attempt
    }

    fn with_attempt(&self, attempt: u32) -> Self {
        Self { attempt, ..self.clone() }
    }

    fn fingerprint(&self) -> String {
        fingerprint_of(
            &[
                &self.project_id,
                &self.session_id,
                &self.events_object_key,
                self.trigger_kind.to_string().as_str(),
            ],
            &self.marker_offsets_ms,
        )
    }
}

/// Analysis job: runs heuristic/remote-text providers over a session's markers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisJob {
    pub project_id: String,
    pub session_id: String,
    pub events_object_key: String,
    pub marker_offsets_ms: Vec<i64>,
    pub trigger_kind: MarkerKind,
    pub marker_hints: Vec<String>,
    pub route: String,
    pub site: String,
    #[serde(default)]
    pub attempt: u32,
}

impl StreamJob for AnalysisJob {
    fn job_id(&self) -> String {
        format!("{}:{}", self.project_id, self.session_id)
    }

    fn attempt(&self) -> u32 {
        self.attempt
    }

    fn with_attempt(&self, attempt: u32) -> Self {
        Self { attempt, ..self.clone() }
    }

    fn fingerprint(&self) -> String {
        let mut parts: Vec<&str> = vec![
            &self.project_id,
            &self.session_id,
            &self.events_object_key,
            self.trigger_kind.to_string().as_str(),
            &self.route,
            &self.site,
        ];
        for hint in &self.marker_hints {
            parts.push(hint.as_str());
        }
        fingerprint_of(&parts, &self.marker_offsets_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_trigger_kind_picks_highest_weight() {
        let markers = vec![
            Marker { kind: MarkerKind::UiNoEffect, offset_ms: 0, label: None, cluster_hint: None },
            Marker { kind: MarkerKind::JsException, offset_ms: 10, label: None, cluster_hint: None },
            Marker { kind: MarkerKind::ApiError, offset_ms: 20, label: None, cluster_hint: None },
        ];
        assert_eq!(dominant_trigger_kind(&markers), Some(MarkerKind::JsException));
    }

    #[test]
    fn clamp_confidence_rejects_non_finite() {
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
        assert_eq!(clamp_confidence(f64::INFINITY), 0.0);
        assert_eq!(clamp_confidence(1.5), 1.0);
        assert_eq!(clamp_confidence(-0.5), 0.0);
    }

    #[test]
    fn fingerprint_is_stable_and_order_sensitive_on_attempt() {
        let job = AnalysisJob {
            project_id: "p1".into(),
            session_id: "s1".into(),
            events_object_key: "k1".into(),
            marker_offsets_ms: vec![100, 200],
            trigger_kind: MarkerKind::JsException,
            marker_hints: vec!["hint-a".into()],
            route: "/checkout".into(),
            site: "shop".into(),
            attempt: 0,
        };
        let retried = job.with_attempt(1);
        assert_eq!(job.fingerprint(), retried.fingerprint());
        assert_eq!(retried.attempt(), 1);
    }
}
