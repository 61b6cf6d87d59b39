use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::MarkerKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactType {
    AnalysisJson,
    ReplayVideo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactStatus {
    #[default]
    Pending,
    Ready,
    Discarded,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, TS)]
pub struct MarkerWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

/// A rendered-or-analyzed output object for one session, unique per
/// `(project_id, session_id, artifact_type)`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct Artifact {
    pub project_id: String,
    pub session_id: String,
    pub artifact_type: ArtifactType,
    pub artifact_key: String,
    pub status: ArtifactStatus,
    pub trigger_kind: MarkerKind,
    pub windows: Vec<MarkerWindow>,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

/// Marker window per spec: `[max(0, offset - 2000), offset + 8000]`.
pub fn marker_window(offset_ms: i64) -> MarkerWindow {
    MarkerWindow {
        start_ms: (offset_ms - 2_000).max(0),
        end_ms: offset_ms + 8_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_window_clamps_start_at_zero() {
        let w = marker_window(500);
        assert_eq!(w.start_ms, 0);
        assert_eq!(w.end_ms, 8_500);
    }

    #[test]
    fn marker_window_preserves_offset_when_clear_of_zero() {
        let w = marker_window(5_000);
        assert_eq!(w.start_ms, 3_000);
        assert_eq!(w.end_ms, 13_000);
    }
}
