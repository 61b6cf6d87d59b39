use async_trait::async_trait;
use domain_retro_core::{
    clamp_confidence, events_within_window, parse_events, tokenize_sample, AnalysisJob, MarkerKind, ObjectStore,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::warn;

use crate::error::{AnalysisError, AnalysisResult};

const MARKER_WINDOW_RADIUS_MS: i64 = 2_000;
const MAX_SAMPLED_EVENTS: usize = 300;
const REMOTE_WINDOW_RADIUS_MS: i64 = 3_000;
const REMOTE_MAX_EVENTS: usize = 180;
const REMOTE_MAX_CHARS: usize = 45_000;

#[derive(Debug, Clone)]
pub struct ProviderOutput {
    pub confidence: f64,
    pub symptom: String,
    pub technical_root_cause: Option<String>,
    pub suggested_fix: Option<String>,
    pub text_summary: Option<String>,
}

#[async_trait]
pub trait ConfidenceProvider: Send + Sync {
    async fn analyze(&self, job: &AnalysisJob) -> AnalysisResult<ProviderOutput>;
    fn name(&self) -> &'static str;
}

fn base_confidence(kind: MarkerKind) -> f64 {
    match kind {
        MarkerKind::UiNoEffect => 0.56,
        MarkerKind::ValidationFailed => 0.62,
        MarkerKind::ApiError => 0.67,
        MarkerKind::JsException => 0.74,
    }
}

/// One rule in the kind-specific table: a keyword to scan the tokenized
/// event sample for, and what it implies when found.
struct Rule {
    keyword: &'static str,
    technical_root_cause: &'static str,
    suggested_fix: &'static str,
    boost: f64,
}

fn rule_table(kind: MarkerKind) -> &'static [Rule] {
    match kind {
        MarkerKind::JsException => &[
            Rule {
                keyword: "undefined",
                technical_root_cause: "Script read a property off an undefined value",
                suggested_fix: "Add a null/undefined guard before the property access",
                boost: 0.12,
            },
            Rule {
                keyword: "is not a function",
                technical_root_cause: "Called a value that was not a function",
                suggested_fix: "Verify the callee is defined before invoking it",
                boost: 0.14,
            },
        ],
        MarkerKind::ApiError => &[
            Rule {
                keyword: "\"status\":5",
                technical_root_cause: "Upstream API returned a 5xx response",
                suggested_fix: "Add retry with backoff for transient upstream failures",
                boost: 0.1,
            },
            Rule {
                keyword: "timeout",
                technical_root_cause: "API call exceeded its timeout",
                suggested_fix: "Raise the client timeout or reduce payload size",
                boost: 0.08,
            },
        ],
        MarkerKind::ValidationFailed => &[Rule {
            keyword: "required",
            technical_root_cause: "A required field failed validation",
            suggested_fix: "Add client-side required-field validation before submit",
            boost: 0.08,
        }],
        MarkerKind::UiNoEffect => &[Rule {
            keyword: "disabled",
            technical_root_cause: "The control the user interacted with was disabled",
            suggested_fix: "Surface a visible disabled state or tooltip explaining why",
            boost: 0.07,
        }],
    }
}

/// Deterministic rule-based provider: no network calls, no randomness.
/// Scans the event blob around each marker offset, tokenizes it, and applies
/// a kind-specific rule table on top of the trigger kind's base confidence.
pub struct HeuristicProvider {
    object_store: Arc<dyn ObjectStore>,
}

impl HeuristicProvider {
    pub fn new(object_store: Arc<dyn ObjectStore>) -> Self {
        Self { object_store }
    }

    fn symptom(job: &AnalysisJob) -> String {
        let hint = job.marker_hints.first().cloned().unwrap_or_else(|| job.trigger_kind.to_string());
        format!("{} on {}", hint, job.route)
    }

    /// `>= 3 markers` is treated as corroborating evidence (+0.04); fewer
    /// than 20 sampled events is treated as too little signal (-0.08).
    fn count_penalty(marker_count: usize, sampled_event_count: usize) -> f64 {
        let mut penalty = 0.0;
        if marker_count >= 3 {
            penalty += 0.04;
        }
        if sampled_event_count < 20 {
            penalty -= 0.08;
        }
        penalty
    }
}

#[async_trait]
impl ConfidenceProvider for HeuristicProvider {
    async fn analyze(&self, job: &AnalysisJob) -> AnalysisResult<ProviderOutput> {
        let blob = self
            .object_store
            .get(&job.events_object_key)
            .await
            .map_err(|e| AnalysisError::Provider(e.to_string()))?;
        let events = parse_events(&blob).map_err(|e| AnalysisError::SchemaViolation(e.to_string()))?;

        let sampled: Vec<_> = job
            .marker_offsets_ms
            .iter()
            .flat_map(|offset| events_within_window(&events, *offset, MARKER_WINDOW_RADIUS_MS, MAX_SAMPLED_EVENTS))
            .take(MAX_SAMPLED_EVENTS)
            .collect();
        let tokens = tokenize_sample(&sampled);

        let mut boost = 0.0;
        let mut technical_root_cause = None;
        let mut suggested_fix = None;
        for rule in rule_table(job.trigger_kind) {
            if tokens.contains(rule.keyword) {
                boost = rule.boost;
                technical_root_cause = Some(rule.technical_root_cause.to_string());
                suggested_fix = Some(rule.suggested_fix.to_string());
                break;
            }
        }

        let confidence = clamp_confidence(
            base_confidence(job.trigger_kind) + boost + Self::count_penalty(job.marker_offsets_ms.len(), sampled.len()),
        );

        Ok(ProviderOutput {
            confidence,
            symptom: Self::symptom(job),
            technical_root_cause: technical_root_cause.or_else(|| job.marker_hints.first().cloned()),
            suggested_fix,
            text_summary: Some(format!(
                "{} triggered by {} on {} ({} marker(s), {} sampled events)",
                job.trigger_kind,
                Self::symptom(job),
                job.site,
                job.marker_offsets_ms.len(),
                sampled.len(),
            )),
        })
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}").unwrap()
});
static LONG_DIGITS_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{6,}").unwrap());
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());
static CREDENTIAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)("?(?:password|token|secret|api[_-]?key)"?\s*[:=]\s*"?)[^",\s]+"#).unwrap());

/// Strips emails, UUIDs, long digit runs, URLs, and key=value credentials
/// from a sampled event blob before it leaves the process.
fn redact(text: &str) -> String {
    let text = CREDENTIAL_PATTERN.replace_all(text, "${1}[redacted]");
    let text = EMAIL_PATTERN.replace_all(&text, "[redacted-email]");
    let text = UUID_PATTERN.replace_all(&text, "[redacted-uuid]");
    let text = URL_PATTERN.replace_all(&text, "[redacted-url]");
    LONG_DIGITS_PATTERN.replace_all(&text, "[redacted-digits]").into_owned()
}

#[derive(Debug, Serialize)]
struct RemoteTextRequest<'a> {
    trigger_kind: String,
    route: &'a str,
    site: &'a str,
    marker_hints: &'a [String],
    marker_count: usize,
    sampled_events: String,
}

/// Accepts the aliased field names the response schema allows for each
/// narrative field, in priority order.
#[derive(Debug, Deserialize)]
struct RemoteTextResponse {
    symptom: Option<String>,
    #[serde(alias = "rootCause", alias = "cause")]
    technical_root_cause: Option<String>,
    #[serde(alias = "fix", alias = "recommendation")]
    suggested_fix: Option<String>,
    #[serde(alias = "textSummary")]
    summary: Option<String>,
    confidence: Option<f64>,
}

/// Calls an external text model for a richer narrative. Sends a redacted,
/// sampled view of the session's events plus trigger kind/route/site/hints —
/// never the raw storage key.
pub struct RemoteTextProvider {
    client: reqwest::Client,
    url: String,
    object_store: Arc<dyn ObjectStore>,
}

impl RemoteTextProvider {
    pub fn new(url: impl Into<String>, timeout_ms: u64, object_store: Arc<dyn ObjectStore>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("reqwest client config is valid");
        Self { client, url: url.into(), object_store }
    }

    async fn sample(&self, job: &AnalysisJob) -> AnalysisResult<String> {
        let blob = self
            .object_store
            .get(&job.events_object_key)
            .await
            .map_err(|e| AnalysisError::Provider(e.to_string()))?;
        let events = parse_events(&blob).map_err(|e| AnalysisError::SchemaViolation(e.to_string()))?;

        let sampled: Vec<_> = job
            .marker_offsets_ms
            .iter()
            .flat_map(|offset| events_within_window(&events, *offset, REMOTE_WINDOW_RADIUS_MS, REMOTE_MAX_EVENTS))
            .take(REMOTE_MAX_EVENTS)
            .collect();

        let joined = tokenize_sample(&sampled);
        let truncated: String = joined.chars().take(REMOTE_MAX_CHARS).collect();
        Ok(redact(&truncated))
    }
}

#[async_trait]
impl ConfidenceProvider for RemoteTextProvider {
    async fn analyze(&self, job: &AnalysisJob) -> AnalysisResult<ProviderOutput> {
        let sampled_events = self.sample(job).await?;

        let body = RemoteTextRequest {
            trigger_kind: job.trigger_kind.to_string(),
            route: &job.route,
            site: &job.site,
            marker_hints: &job.marker_hints[..job.marker_hints.len().min(5)],
            marker_count: job.marker_offsets_ms.len(),
            sampled_events,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(e.to_string())
                } else {
                    AnalysisError::Provider(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(AnalysisError::Provider(format!(
                "remote text provider returned {}",
                response.status()
            )));
        }

        let parsed: RemoteTextResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::SchemaViolation(e.to_string()))?;

        let confidence = parsed.confidence.unwrap_or(0.0);
        if !(0.0..=1.0).contains(&confidence) {
            return Err(AnalysisError::SchemaViolation("confidence out of range".to_string()));
        }

        Ok(ProviderOutput {
            confidence: clamp_confidence(confidence),
            symptom: parsed.symptom.unwrap_or_default(),
            technical_root_cause: parsed.technical_root_cause,
            suggested_fix: parsed.suggested_fix,
            text_summary: parsed.summary,
        })
    }

    fn name(&self) -> &'static str {
        "remote_text"
    }
}

/// Merge a primary (heuristic) and secondary (remote) result: the remote
/// result's non-empty fields win, confidences average. Used when the remote
/// provider succeeds; on timeout the caller should skip this and keep the
/// heuristic result as-is.
pub fn merge_remote_wins_if_nonempty(heuristic: ProviderOutput, remote: ProviderOutput) -> ProviderOutput {
    ProviderOutput {
        confidence: clamp_confidence((heuristic.confidence + remote.confidence) / 2.0),
        symptom: if remote.symptom.trim().is_empty() { heuristic.symptom } else { remote.symptom },
        technical_root_cause: remote.technical_root_cause.or(heuristic.technical_root_cause),
        suggested_fix: remote.suggested_fix.or(heuristic.suggested_fix),
        text_summary: remote.text_summary.or(heuristic.text_summary),
    }
}

pub fn log_fallback_to_heuristic(job: &AnalysisJob, error: &AnalysisError) {
    warn!(
        session_id = %job.session_id,
        error = %error,
        "remote text provider unavailable, falling back to heuristic"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_retro_core::RetroResult;
    use std::collections::HashMap;
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
            self.blobs
                .lock()
                .await
                .get(key)
                .cloned()
                .ok_or_else(|| domain_retro_core::RetroError::NotFound(key.to_string()))
        }

        async fn put(&self, key: &str, bytes: Vec<u8>) -> RetroResult<()> {
            self.blobs.lock().await.insert(key.to_string(), bytes);
            Ok(())
        }
    }

    fn job(trigger_kind: MarkerKind, offsets: Vec<i64>) -> AnalysisJob {
        AnalysisJob {
            project_id: "p1".into(),
            session_id: "s1".into(),
            events_object_key: "k".into(),
            marker_offsets_ms: offsets,
            trigger_kind,
            marker_hints: vec!["TypeError".into(), "undefined is not a function".into()],
            route: "/checkout".into(),
            site: "shop".into(),
            attempt: 0,
        }
    }

    fn events_json(count: usize, window_start_ms: i64) -> Vec<u8> {
        let events: Vec<_> = (0..count)
            .map(|i| serde_json::json!({"type": 1, "timestamp": window_start_ms + i as i64 * 10, "v": "click"}))
            .collect();
        serde_json::to_vec(&events).unwrap()
    }

    #[tokio::test]
    async fn heuristic_confidence_is_within_bounds() {
        let store = Arc::new(InMemoryObjectStore::with("k", events_json(50, 100)));
        let provider = HeuristicProvider::new(store);
        let output = provider.analyze(&job(MarkerKind::JsException, vec![100, 500, 900])).await.unwrap();
        assert!((0.0..=1.0).contains(&output.confidence));
        assert!(output.confidence > base_confidence(MarkerKind::JsException) - 0.2);
    }

    #[tokio::test]
    async fn low_event_count_applies_the_spec_penalty() {
        // ui_no_effect base 0.56, < 20 sampled events, no rule-table match
        // in the payload -> 0.56 - 0.08 = 0.48.
        let store = Arc::new(InMemoryObjectStore::with("k", events_json(5, 100)));
        let provider = HeuristicProvider::new(store);
        let output = provider.analyze(&job(MarkerKind::UiNoEffect, vec![100])).await.unwrap();
        assert!((output.confidence - 0.48).abs() < 1e-9);
    }

    #[tokio::test]
    async fn js_exception_keyword_match_boosts_confidence() {
        let mut events: Vec<_> = (0..25)
            .map(|i| serde_json::json!({"type": 1, "timestamp": 100 + i * 10, "v": "click"}))
            .collect();
        events.push(serde_json::json!({"type": 2, "timestamp": 105, "message": "x is undefined"}));
        let bytes = serde_json::to_vec(&events).unwrap();

        let store = Arc::new(InMemoryObjectStore::with("k", bytes));
        let provider = HeuristicProvider::new(store);
        let output = provider.analyze(&job(MarkerKind::JsException, vec![100])).await.unwrap();
        assert!((output.confidence - 0.86).abs() < 1e-9);
        assert!(output.technical_root_cause.unwrap().contains("undefined"));
    }

    #[test]
    fn merge_prefers_remote_non_empty_fields() {
        let heuristic = ProviderOutput {
            confidence: 0.6,
            symptom: "heuristic symptom".into(),
            technical_root_cause: Some("heuristic cause".into()),
            suggested_fix: None,
            text_summary: Some("heuristic summary".into()),
        };
        let remote = ProviderOutput {
            confidence: 0.8,
            symptom: "remote symptom".into(),
            technical_root_cause: None,
            suggested_fix: Some("remote fix".into()),
            text_summary: None,
        };
        let merged = merge_remote_wins_if_nonempty(heuristic, remote);
        assert_eq!(merged.symptom, "remote symptom");
        assert_eq!(merged.technical_root_cause, Some("heuristic cause".into()));
        assert_eq!(merged.suggested_fix, Some("remote fix".into()));
        assert_eq!(merged.confidence, 0.7);
    }

    #[test]
    fn redact_strips_emails_uuids_digits_urls_and_credentials() {
        let input = r#"{"user":"a@b.com","id":"550e8400-e29b-41d4-a716-446655440000","phone":"5551234567","href":"https://example.com/x","apiKey":"sk-test-1234"}"#;
        let out = redact(input);
        assert!(!out.contains("a@b.com"));
        assert!(!out.contains("550e8400"));
        assert!(!out.contains("5551234567"));
        assert!(!out.contains("https://example.com"));
        assert!(!out.contains("sk-test-1234"));
    }

    #[test]
    fn remote_response_accepts_aliased_field_names() {
        let raw = r#"{"symptom":"s","rootCause":"r","fix":"f","textSummary":"t","confidence":0.9}"#;
        let parsed: RemoteTextResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.technical_root_cause.as_deref(), Some("r"));
        assert_eq!(parsed.suggested_fix.as_deref(), Some("f"));
        assert_eq!(parsed.summary.as_deref(), Some("t"));
    }
}
