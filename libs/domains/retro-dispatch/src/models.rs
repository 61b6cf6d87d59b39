use chrono::{DateTime, Utc};
use domain_retro_core::Marker;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct IngestSessionRequest {
    #[validate(length(min = 1))]
    pub project_id: String,
    #[validate(length(min = 1))]
    pub session_id: String,
    #[validate(length(min = 1))]
    pub site: String,
    #[validate(length(min = 1))]
    pub route: String,
    #[validate(length(min = 1))]
    pub events_object_key: String,
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueuedStatus {
    pub replay: bool,
    pub analysis: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngestSessionResponse {
    pub accepted: bool,
    /// Absent when the session carried no markers: an empty-marker session
    /// is still accepted, but there is no dominant kind to enqueue jobs for.
    pub trigger_kind: Option<String>,
    pub queued: QueuedStatus,
    /// Non-fatal: the session was still accepted even if a queue write failed.
    pub queue_error: Option<String>,
}
