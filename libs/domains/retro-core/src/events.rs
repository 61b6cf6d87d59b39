use serde::{Deserialize, Serialize};

use crate::error::{RetroError, RetroResult};

/// One recorded browser event. `event_type` and `timestamp_ms` must be
/// numeric in the source payload; anything else is a corrupt blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    #[serde(rename = "type")]
    pub event_type: i64,
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Parses and validates a raw event blob: every element must be an object
/// with numeric `type` and `timestamp`. A single malformed element fails the
/// whole blob — this is the terminal "corrupt payload" case.
pub fn parse_events(bytes: &[u8]) -> RetroResult<Vec<SessionEvent>> {
    serde_json::from_slice::<Vec<SessionEvent>>(bytes)
        .map_err(|e| RetroError::Validation(format!("corrupt event payload: {e}")))
}

/// Events whose timestamp falls within `offset_ms - radius_ms ..= offset_ms +
/// radius_ms`, in original order, capped at `cap` events total.
pub fn events_within_window(events: &[SessionEvent], offset_ms: i64, radius_ms: i64, cap: usize) -> Vec<&SessionEvent> {
    let lo = offset_ms - radius_ms;
    let hi = offset_ms + radius_ms;

    events
        .iter()
        .filter(|e| e.timestamp_ms >= lo && e.timestamp_ms <= hi)
        .take(cap)
        .collect()
}

/// Lowercased, whitespace-joined token sample from a set of events' JSON
/// payloads — the crude "tokenize" step the heuristic rule table scans.
pub fn tokenize_sample(events: &[&SessionEvent]) -> String {
    events
        .iter()
        .map(|e| serde_json::to_string(&e.data).unwrap_or_default().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_numeric_type() {
        let raw = br#"[{"type":"click","timestamp":100}]"#;
        assert!(parse_events(raw).is_err());
    }

    #[test]
    fn accepts_well_formed_events() {
        let raw = br#"[{"type":3,"timestamp":100,"data":{"x":1}}]"#;
        let events = parse_events(raw).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, 3);
    }

    #[test]
    fn window_filters_by_offset_and_caps_count() {
        let events: Vec<SessionEvent> = (0..10)
            .map(|i| SessionEvent { event_type: 1, timestamp_ms: i * 1000, data: Default::default() })
            .collect();

        let window = events_within_window(&events, 3000, 2000, 2);
        assert_eq!(window.len(), 2);
        assert!(window.iter().all(|e| e.timestamp_ms >= 1000 && e.timestamp_ms <= 5000));
    }
}
