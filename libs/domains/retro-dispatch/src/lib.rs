//! Dispatcher: fans an ingested session out into a replay job and an
//! analysis job.

pub mod error;
pub mod handlers;
pub mod models;
pub mod service;

pub use error::{DispatchError, DispatchResult};
pub use handlers::ApiDoc;
pub use models::{IngestSessionRequest, IngestSessionResponse, QueuedStatus};
pub use service::DispatchService;

#[cfg(test)]
mod tests {
    use super::*;
    use domain_retro_core::{Marker, MarkerKind};
    use validator::Validate;

    fn sample_request(markers: Vec<Marker>) -> IngestSessionRequest {
        IngestSessionRequest {
            project_id: "p1".into(),
            session_id: "s1".into(),
            site: "shop".into(),
            route: "/checkout".into(),
            events_object_key: "session-events/p1/2026/07/26/shop/s1.json".into(),
            markers,
            observed_at: None,
        }
    }

    #[test]
    fn empty_markers_pass_request_validation() {
        // An empty-marker session is a valid, accepted ingest that simply
        // enqueues no jobs — not a client error.
        let req = sample_request(vec![]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn populated_markers_pass_request_validation() {
        let req = sample_request(vec![Marker {
            kind: MarkerKind::JsException,
            offset_ms: 1_200,
            label: Some("TypeError".into()),
            cluster_hint: None,
        }]);
        assert!(req.validate().is_ok());
    }
}
