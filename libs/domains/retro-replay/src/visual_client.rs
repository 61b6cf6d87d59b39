//! Client for the visual confirmation model: given a rendered clip's object
//! location, asks whether the clip actually shows the failure the markers
//! claimed.
//!
//! Grounded on `domain_retro_analysis::RemoteTextProvider`'s `reqwest`
//! client construction and strict-schema response validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ReplayError, ReplayResult};

#[derive(Debug, Clone, Serialize)]
pub struct VideoLocation {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub key: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize)]
struct VisualVerificationRequest {
    #[serde(flatten)]
    video: VideoLocation,
    trigger_kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualVerdict {
    pub confirmed: bool,
    pub confidence: f64,
    pub summary: String,
    pub symptom: Option<String>,
    pub technical_root_cause: Option<String>,
    pub suggested_fix: Option<String>,
}

pub struct VisualModelClient {
    client: reqwest::Client,
    url: String,
}

impl VisualModelClient {
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("reqwest client config is valid");
        Self { client, url: url.into() }
    }

    pub async fn verify(&self, video: VideoLocation, trigger_kind: &str) -> ReplayResult<VisualVerdict> {
        let body = VisualVerificationRequest { video, trigger_kind: trigger_kind.to_string() };

        let response = self.client.post(&self.url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ReplayError::Timeout(e.to_string())
            } else {
                ReplayError::Provider(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(ReplayError::Provider(format!("visual model returned {}", response.status())));
        }

        let verdict: VisualVerdict =
            response.json().await.map_err(|e| ReplayError::SchemaViolation(e.to_string()))?;

        if !(0.0..=1.0).contains(&verdict.confidence) {
            return Err(ReplayError::SchemaViolation("confidence out of range".to_string()));
        }

        Ok(verdict)
    }
}
