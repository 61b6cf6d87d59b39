//! Render quota gate: per-project and global daily render counters plus a
//! minimum-interval-per-project cooldown, all Redis-backed so the limit
//! holds across every replay-worker process sharing the broker.
//!
//! Grounded on `stream-worker::resilience`'s "count an action, refuse past a
//! threshold" shape, but counters live in Redis rather than in-process
//! atomics: the daily limit has to be enforced across every worker replica,
//! not just within one.

use chrono::Utc;
use redis::aio::ConnectionManager;

use crate::error::{ReplayError, ReplayResult};

pub enum RenderGateDecision {
    Allowed,
    Skipped(String),
}

pub struct RenderQuotaGate {
    redis: ConnectionManager,
    daily_limit_per_project: u64,
    daily_limit_global: u64,
    min_interval_sec_per_project: u64,
}

impl RenderQuotaGate {
    pub fn new(
        redis: ConnectionManager,
        daily_limit_per_project: u64,
        daily_limit_global: u64,
        min_interval_sec_per_project: u64,
    ) -> Self {
        Self { redis, daily_limit_per_project, daily_limit_global, min_interval_sec_per_project }
    }

    fn project_key(&self, date: &str, project_id: &str) -> String {
        format!("replay:render:quota:{date}:{project_id}")
    }

    fn global_key(&self, date: &str) -> String {
        format!("replay:render:quota:{date}:global")
    }

    fn last_render_key(&self, project_id: &str) -> String {
        format!("replay:render:last:{project_id}")
    }

    /// Checks the gate without consuming it. Call [`RenderQuotaGate::record_render`]
    /// only once the caller actually commits to rendering.
    pub async fn check(&self, project_id: &str) -> ReplayResult<RenderGateDecision> {
        let mut conn = self.redis.clone();
        let now = Utc::now();
        let date = now.format("%Y-%m-%d").to_string();

        let project_count: u64 = redis::cmd("GET")
            .arg(self.project_key(&date, project_id))
            .query_async::<Option<u64>>(&mut conn)
            .await
            .map_err(|e| ReplayError::ObjectStore(e.to_string()))?
            .unwrap_or(0);

        if project_count >= self.daily_limit_per_project {
            return Ok(RenderGateDecision::Skipped(format!(
                "per-project daily render limit reached ({project_count}/{})",
                self.daily_limit_per_project
            )));
        }

        let global_count: u64 = redis::cmd("GET")
            .arg(self.global_key(&date))
            .query_async::<Option<u64>>(&mut conn)
            .await
            .map_err(|e| ReplayError::ObjectStore(e.to_string()))?
            .unwrap_or(0);

        if global_count >= self.daily_limit_global {
            return Ok(RenderGateDecision::Skipped(format!(
                "global daily render limit reached ({global_count}/{})",
                self.daily_limit_global
            )));
        }

        let last_render_epoch_s: Option<i64> = redis::cmd("GET")
            .arg(self.last_render_key(project_id))
            .query_async(&mut conn)
            .await
            .map_err(|e| ReplayError::ObjectStore(e.to_string()))?;

        if let Some(last) = last_render_epoch_s {
            let elapsed = now.timestamp() - last;
            if elapsed < self.min_interval_sec_per_project as i64 {
                return Ok(RenderGateDecision::Skipped(format!(
                    "only {elapsed}s since last render for this project, minimum is {}s",
                    self.min_interval_sec_per_project
                )));
            }
        }

        Ok(RenderGateDecision::Allowed)
    }

    /// Records that a render was attempted: increments both daily counters
    /// (expiring at end of day) and stamps the per-project cooldown.
    pub async fn record_render(&self, project_id: &str) -> ReplayResult<()> {
        let mut conn = self.redis.clone();
        let now = Utc::now();
        let date = now.format("%Y-%m-%d").to_string();
        let seconds_until_midnight = (86_400 - (now.timestamp() % 86_400)).max(1);

        let project_key = self.project_key(&date, project_id);
        let global_key = self.global_key(&date);

        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.cmd("INCR").arg(&project_key);
        pipe.cmd("EXPIRE").arg(&project_key).arg(seconds_until_midnight);
        pipe.cmd("INCR").arg(&global_key);
        pipe.cmd("EXPIRE").arg(&global_key).arg(seconds_until_midnight);
        pipe.cmd("SET").arg(self.last_render_key(project_id)).arg(now.timestamp());

        pipe.query_async::<()>(&mut conn).await.map_err(|e| ReplayError::ObjectStore(e.to_string()))?;

        Ok(())
    }
}
