use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReportCardStatus {
    #[default]
    Pending,
    Ready,
    Failed,
    Discarded,
}

/// The narrative analysis output for a single session: a symptom, a guess at
/// root cause, and a suggested fix, gated by confidence before promotion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ReportCard {
    pub project_id: String,
    pub session_id: String,
    pub status: ReportCardStatus,
    pub symptom: Option<String>,
    pub technical_root_cause: Option<String>,
    pub suggested_fix: Option<String>,
    pub text_summary: Option<String>,
    pub visual_summary: Option<String>,
    pub confidence: f64,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

impl ReportCard {
    pub fn pending(project_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            session_id: session_id.into(),
            status: ReportCardStatus::Pending,
            symptom: None,
            technical_root_cause: None,
            suggested_fix: None,
            text_summary: None,
            visual_summary: None,
            confidence: 0.0,
            generated_at: Utc::now(),
        }
    }

    /// True once the card has at least an analysis result to show.
    pub fn is_ready(&self) -> bool {
        matches!(self.status, ReportCardStatus::Ready)
    }
}
