//! Shared types for the session-replay analysis pipeline: the data that
//! crosses crate boundaries between ingest, the analysis/replay workers, and
//! the clustering engine.

pub mod artifact;
pub mod error;
pub mod events;
pub mod issue;
pub mod models;
pub mod object_store;
pub mod report_card;
pub mod streams;

pub use artifact::{Artifact, ArtifactStatus, ArtifactType, MarkerWindow, marker_window};
pub use error::{RetroError, RetroResult};
pub use events::{events_within_window, parse_events, tokenize_sample, SessionEvent};
pub use issue::{ClusterKey, ClusterState, FeedbackKind, IssueCluster, IssueFeedbackEvent};
pub use models::{
    clamp_confidence, dominant_trigger_kind, AnalysisJob, Marker, MarkerKind, ReplayJob, Session,
};
pub use object_store::{FsObjectStore, ObjectStore};
pub use report_card::{ReportCard, ReportCardStatus};
pub use streams::{AnalysisQueue, ReplayQueue};
