//! Webhook alerting for newly promoted or re-opened clusters, cooldown-gated
//! in Redis so the same cluster doesn't page twice within `cooldownMinutes`.
//!
//! Grounded on `domain_retro_replay::quota::RenderQuotaGate`'s "check a Redis
//! key before acting" shape, swapping the daily counter for a single TTL key.

use redis::aio::ConnectionManager;
use serde::Serialize;

use crate::error::{ClusteringError, ClusteringResult};

#[derive(Debug, Clone, Serialize)]
pub struct ClusterAlert<'a> {
    pub project_id: &'a str,
    pub cluster_key: &'a str,
    pub symptom: &'a str,
    pub session_count: u64,
    pub confidence: f64,
    pub alert_type: &'a str,
}

pub struct AlertGate {
    redis: ConnectionManager,
    cooldown_minutes: u64,
}

impl AlertGate {
    pub fn new(redis: ConnectionManager, cooldown_minutes: u64) -> Self {
        Self { redis, cooldown_minutes }
    }

    fn cooldown_key(project_id: &str, cluster_key: &str, alert_type: &str) -> String {
        format!("cluster:alert:{project_id}:{cluster_key}:{alert_type}:cooldown")
    }

    /// Returns true if sending is allowed and immediately stamps the cooldown,
    /// so concurrent promotions can't both pass the check.
    pub async fn try_acquire(&self, project_id: &str, cluster_key: &str, alert_type: &str) -> ClusteringResult<bool> {
        let mut conn = self.redis.clone();
        let key = Self::cooldown_key(project_id, cluster_key, alert_type);
        let ttl_sec = self.cooldown_minutes * 60;

        let acquired: bool = redis::cmd("SET")
            .arg(&key)
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(ttl_sec)
            .query_async::<Option<String>>(&mut conn)
            .await
            .map_err(|e| ClusteringError::Alert(e.to_string()))?
            .is_some();

        Ok(acquired)
    }
}

pub struct AlertClient {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl AlertClient {
    pub fn new(webhook_url: Option<String>, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .expect("reqwest client builder should not fail with static config");

        Self { client, webhook_url }
    }

    /// No-op when no webhook is configured, matching `ReplayConfig::visual_model_url`'s
    /// optional-feature shape.
    pub async fn send(&self, alert: ClusterAlert<'_>) -> ClusteringResult<()> {
        let Some(url) = self.webhook_url.as_deref() else {
            return Ok(());
        };

        self.client
            .post(url)
            .json(&alert)
            .send()
            .await
            .map_err(|e| ClusteringError::Alert(e.to_string()))?
            .error_for_status()
            .map_err(|e| ClusteringError::Alert(e.to_string()))?;

        Ok(())
    }
}
