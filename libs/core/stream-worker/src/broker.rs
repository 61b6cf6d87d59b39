//! Thin abstraction over Redis Streams: the queue substrate shared by every
//! worker. One stream + consumer group per queue, a retry z-set, a
//! dead-letter list, and an unprocessable list.
//!
//! Redis keys (bit-exact):
//! - stream: `{queue}`, group: `{queue}:group`, consumer: `{host}-{pid}`
//! - retry z-set: `{queue}:retry` (score = epoch ms)
//! - dead-letter list: `{queue}:failed`, unprocessable: `{queue}:failed:unprocessable`
//! - done-marker: `{queue}:done:{fingerprint}`
//! - legacy list migration: `{queue}:legacy:list:{unixNanos}`

use crate::config::WorkerConfig;
use crate::error::BrokerError;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

/// One message read off a queue: its stream entry id and decoded payload.
#[derive(Debug, Clone)]
pub struct Delivery<J> {
    pub id: String,
    pub payload: J,
}

/// A raw message whose payload failed to decode as `J`.
#[derive(Debug, Clone)]
pub struct RawDelivery {
    pub id: String,
    pub raw_payload: Option<String>,
}

/// Dead-letter entry as written to `{queue}:failed`.
#[derive(Debug, Clone, Serialize, serde::Deserialize, ToSchema)]
pub struct FailedEntry {
    pub failed_at: DateTime<Utc>,
    pub error: String,
    pub attempt: u32,
    #[schema(value_type = Object)]
    pub payload: Value,
}

#[derive(Debug, Clone, Default, Serialize, serde::Deserialize, ToSchema)]
pub struct BrokerStats {
    pub stream_depth: u64,
    pub pending: u64,
    pub retry_depth: u64,
    pub failed_depth: u64,
}

#[derive(Debug, Clone, Default, Serialize, serde::Deserialize, ToSchema)]
pub struct RedriveResult {
    pub requested: usize,
    pub redriven: usize,
    pub skipped: usize,
    pub remaining_failed: u64,
}

/// The Broker: a thin, queue-agnostic wrapper over a Redis connection.
///
/// One `Broker` instance is shared across every queue; callers pass the
/// queue's `WorkerConfig` (or just its name) to each call.
#[derive(Clone)]
pub struct Broker {
    redis: ConnectionManager,
}

impl Broker {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    pub fn redis(&self) -> &ConnectionManager {
        &self.redis
    }

    /// Create the stream + consumer group on first use, migrating a legacy
    /// list at the same key if one exists (P6: legacy entries land first,
    /// oldest-first).
    pub async fn ensure_queue(&self, queue: &str, group: &str) -> Result<(), BrokerError> {
        let mut conn = self.redis.clone();

        self.migrate_legacy_list(queue).await?;

        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(queue)
            .arg(group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        if let Err(e) = result {
            if !e.to_string().contains("BUSYGROUP") {
                return Err(BrokerError::Redis(e));
            }
        }

        Ok(())
    }

    async fn migrate_legacy_list(&self, queue: &str) -> Result<(), BrokerError> {
        let mut conn = self.redis.clone();

        let key_type: String = redis::cmd("TYPE").arg(queue).query_async(&mut conn).await?;
        if key_type != "list" {
            return Ok(());
        }

        let unix_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let legacy_key = format!("{queue}:legacy:list:{unix_nanos}");

        redis::cmd("RENAME")
            .arg(queue)
            .arg(&legacy_key)
            .query_async::<()>(&mut conn)
            .await?;

        let entries: Vec<String> = redis::cmd("LRANGE")
            .arg(&legacy_key)
            .arg(0)
            .arg(-1)
            .query_async(&mut conn)
            .await?;

        // LPUSH puts the most recently pushed entry at the head, so the
        // oldest entry is at the tail: reverse to restore push order.
        for entry in entries.into_iter().rev() {
            redis::cmd("XADD")
                .arg(queue)
                .arg("*")
                .arg("payload")
                .arg(&entry)
                .query_async::<String>(&mut conn)
                .await?;
        }

        redis::cmd("DEL")
            .arg(&legacy_key)
            .query_async::<()>(&mut conn)
            .await?;

        info!(queue, legacy_key, "migrated legacy list into stream");
        Ok(())
    }

    /// Enqueue: appends `{payload: json(job)}` to the stream for `queue`.
    pub async fn enqueue<J: Serialize>(&self, queue: &str, job: &J) -> Result<String, BrokerError> {
        let mut conn = self.redis.clone();
        let payload = serde_json::to_string(job)?;

        let id: String = redis::cmd("XADD")
            .arg(queue)
            .arg("*")
            .arg("payload")
            .arg(&payload)
            .query_async(&mut conn)
            .await?;

        debug!(queue, id = %id, "enqueued job");
        Ok(id)
    }

    /// Read up to `count` new (never-delivered) messages, blocking up to
    /// `block_ms`. Returns raw deliveries so the caller can attempt to
    /// decode `J` and dead-letter unparseable ones without losing the id.
    pub async fn read(
        &self,
        queue: &str,
        group: &str,
        consumer: &str,
        count: usize,
        block_ms: u64,
    ) -> Result<Vec<RawDelivery>, BrokerError> {
        let mut conn = self.redis.clone();

        let reply: redis::streams::StreamReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(group)
            .arg(consumer)
            .arg("COUNT")
            .arg(count)
            .arg("BLOCK")
            .arg(block_ms)
            .arg("STREAMS")
            .arg(queue)
            .arg(">")
            .query_async(&mut conn)
            .await?;

        Ok(Self::raw_deliveries_from_reply(reply))
    }

    /// ClaimStale: transfer pending entries idle longer than `min_idle_ms`
    /// to `consumer`. Cursor-paged, bounded per invocation.
    pub async fn claim_stale(
        &self,
        queue: &str,
        group: &str,
        consumer: &str,
        min_idle_ms: u64,
        max_count: usize,
    ) -> Result<Vec<RawDelivery>, BrokerError> {
        let mut conn = self.redis.clone();

        let (_cursor, reply): (String, redis::streams::StreamAutoClaimReply) =
            match redis::cmd("XAUTOCLAIM")
                .arg(queue)
                .arg(group)
                .arg(consumer)
                .arg(min_idle_ms)
                .arg("0")
                .arg("COUNT")
                .arg(max_count)
                .query_async(&mut conn)
                .await
            {
                Ok(v) => v,
                Err(e) if e.to_string().contains("NOGROUP") => return Ok(vec![]),
                Err(e) => return Err(BrokerError::Redis(e)),
            };

        Ok(reply
            .claimed
            .into_iter()
            .map(|entry| RawDelivery {
                id: entry.id,
                raw_payload: field_value(&entry.map, "payload"),
            })
            .collect())
    }

    /// Ack: atomically XACK + XDEL so the group's pending set never retains
    /// acked ids.
    pub async fn ack(&self, queue: &str, group: &str, id: &str) -> Result<(), BrokerError> {
        let mut conn = self.redis.clone();
        redis::pipe()
            .atomic()
            .cmd("XACK")
            .arg(queue)
            .arg(group)
            .arg(id)
            .cmd("XDEL")
            .arg(queue)
            .arg(id)
            .query_async::<()>(&mut conn)
            .await
            .map_err(BrokerError::Redis)
    }

    /// ScheduleRetry: insert into `{queue}:retry` scored by `run_at_ms`.
    pub async fn schedule_retry<J: Serialize>(
        &self,
        queue: &str,
        job: &J,
        run_at_ms: i64,
    ) -> Result<(), BrokerError> {
        let mut conn = self.redis.clone();
        let payload = serde_json::to_string(job)?;
        redis::cmd("ZADD")
            .arg(format!("{queue}:retry"))
            .arg(run_at_ms)
            .arg(&payload)
            .query_async::<()>(&mut conn)
            .await
            .map_err(BrokerError::Redis)
    }

    /// DrainRetry: pulls items with score <= now_ms, removes them from the
    /// z-set, and re-appends them to the stream. Returns count moved.
    pub async fn drain_retry(&self, queue: &str, now_ms: i64, max_batch: usize) -> Result<usize, BrokerError> {
        let mut conn = self.redis.clone();
        let retry_key = format!("{queue}:retry");

        let due: Vec<String> = redis::cmd("ZRANGEBYSCORE")
            .arg(&retry_key)
            .arg(0)
            .arg(now_ms)
            .arg("LIMIT")
            .arg(0)
            .arg(max_batch)
            .query_async(&mut conn)
            .await?;

        if due.is_empty() {
            return Ok(0);
        }

        for payload in &due {
            let mut pipe = redis::pipe();
            pipe.atomic();
            pipe.cmd("ZREM").arg(&retry_key).arg(payload);
            pipe.cmd("XADD").arg(queue).arg("*").arg("payload").arg(payload);
            let _: Result<((), String), _> = pipe.query_async(&mut conn).await;
        }

        Ok(due.len())
    }

    /// DeadLetter: left-push onto `{queue}:failed`, or
    /// `{queue}:failed:unprocessable` if `entry.payload` carries neither a
    /// `projectId` nor `sessionId` (not a valid envelope).
    pub async fn dead_letter(&self, queue: &str, entry: &FailedEntry) -> Result<(), BrokerError> {
        let mut conn = self.redis.clone();
        let is_valid_envelope =
            entry.payload.get("projectId").is_some() && entry.payload.get("sessionId").is_some();

        let key = if is_valid_envelope {
            format!("{queue}:failed")
        } else {
            format!("{queue}:failed:unprocessable")
        };

        let json = serde_json::to_string(entry)?;
        redis::cmd("LPUSH")
            .arg(&key)
            .arg(&json)
            .query_async::<()>(&mut conn)
            .await
            .map_err(BrokerError::Redis)?;

        warn!(queue, key = %key, attempt = entry.attempt, error = %entry.error, "dead-lettered job");
        Ok(())
    }

    /// Stats: tolerates absent keys (report 0) and absent group (0 pending).
    pub async fn stats(&self, queue: &str, group: &str) -> Result<BrokerStats, BrokerError> {
        let mut conn = self.redis.clone();

        let stream_depth: u64 = redis::cmd("XLEN").arg(queue).query_async(&mut conn).await.unwrap_or(0);

        let pending: u64 = match redis::cmd("XPENDING")
            .arg(queue)
            .arg(group)
            .query_async::<redis::streams::StreamPendingReply>(&mut conn)
            .await
        {
            Ok(redis::streams::StreamPendingReply::Data(data)) => data.count as u64,
            Ok(redis::streams::StreamPendingReply::Empty) => 0,
            Err(e) if e.to_string().contains("NOGROUP") => 0,
            Err(e) => return Err(BrokerError::Redis(e)),
        };

        let retry_depth: u64 = redis::cmd("ZCARD")
            .arg(format!("{queue}:retry"))
            .query_async(&mut conn)
            .await
            .unwrap_or(0);

        let failed_depth: u64 = redis::cmd("LLEN")
            .arg(format!("{queue}:failed"))
            .query_async(&mut conn)
            .await
            .unwrap_or(0);

        Ok(BrokerStats {
            stream_depth,
            pending,
            retry_depth,
            failed_depth,
        })
    }

    /// Redrive: pop oldest-first from `{queue}:failed`; re-enqueue entries
    /// that carry at least `projectId`+`sessionId`, otherwise move to the
    /// unprocessable list. On re-enqueue failure, the entry is restored to
    /// `:failed` and the error surfaces.
    pub async fn redrive(&self, queue: &str, limit: usize) -> Result<RedriveResult, BrokerError> {
        let mut conn = self.redis.clone();
        let failed_key = format!("{queue}:failed");

        let mut result = RedriveResult {
            requested: limit,
            ..Default::default()
        };

        for _ in 0..limit {
            let raw: Option<String> = redis::cmd("RPOP")
                .arg(&failed_key)
                .query_async(&mut conn)
                .await?;

            let Some(raw) = raw else { break };

            let entry: FailedEntry = match serde_json::from_str(&raw) {
                Ok(e) => e,
                Err(_) => {
                    redis::cmd("LPUSH")
                        .arg(format!("{queue}:failed:unprocessable"))
                        .arg(&raw)
                        .query_async::<()>(&mut conn)
                        .await?;
                    result.skipped += 1;
                    continue;
                }
            };

            let is_valid = entry.payload.get("projectId").is_some() && entry.payload.get("sessionId").is_some();
            if !is_valid {
                redis::cmd("LPUSH")
                    .arg(format!("{queue}:failed:unprocessable"))
                    .arg(&raw)
                    .query_async::<()>(&mut conn)
                    .await?;
                result.skipped += 1;
                continue;
            }

            let payload_json = serde_json::to_string(&entry.payload)?;
            let enqueue_result = redis::cmd("XADD")
                .arg(queue)
                .arg("*")
                .arg("payload")
                .arg(&payload_json)
                .query_async::<String>(&mut conn)
                .await;

            match enqueue_result {
                Ok(_) => result.redriven += 1,
                Err(e) => {
                    redis::cmd("LPUSH")
                        .arg(&failed_key)
                        .arg(&raw)
                        .query_async::<()>(&mut conn)
                        .await?;
                    return Err(BrokerError::Redis(e));
                }
            }
        }

        result.remaining_failed = redis::cmd("LLEN")
            .arg(&failed_key)
            .query_async(&mut conn)
            .await
            .unwrap_or(0);

        Ok(result)
    }

    /// List paginated entries from `{queue}:failed`, oldest-last order preserved.
    pub async fn list_dead_letters(&self, queue: &str, limit: usize, offset: usize) -> Result<Vec<FailedEntry>, BrokerError> {
        let mut conn = self.redis.clone();
        let start = offset as isize;
        let stop = (offset + limit).saturating_sub(1) as isize;
        let raw: Vec<String> = redis::cmd("LRANGE")
            .arg(format!("{queue}:failed"))
            .arg(start)
            .arg(stop)
            .query_async(&mut conn)
            .await?;

        Ok(raw
            .into_iter()
            .filter_map(|s| serde_json::from_str(&s).ok())
            .collect())
    }

    /// Set a done-marker with TTL, short-circuiting duplicate work.
    pub async fn mark_done(&self, config: &WorkerConfig, fingerprint: &str) -> Result<(), BrokerError> {
        let mut conn = self.redis.clone();
        redis::cmd("SET")
            .arg(config.done_key(fingerprint))
            .arg("1")
            .arg("EX")
            .arg(config.dedupe_window_sec)
            .query_async::<()>(&mut conn)
            .await
            .map_err(BrokerError::Redis)
    }

    pub async fn is_done(&self, config: &WorkerConfig, fingerprint: &str) -> Result<bool, BrokerError> {
        let mut conn = self.redis.clone();
        let exists: bool = redis::cmd("EXISTS")
            .arg(config.done_key(fingerprint))
            .query_async(&mut conn)
            .await?;
        Ok(exists)
    }

    fn raw_deliveries_from_reply(reply: redis::streams::StreamReadReply) -> Vec<RawDelivery> {
        let mut out = Vec::new();
        for key in reply.keys {
            for entry in key.ids {
                out.push(RawDelivery {
                    id: entry.id,
                    raw_payload: field_value(&entry.map, "payload"),
                });
            }
        }
        out
    }
}

fn field_value(map: &std::collections::HashMap<String, redis::Value>, field: &str) -> Option<String> {
    map.get(field).and_then(|v| match v {
        redis::Value::BulkString(bytes) => String::from_utf8(bytes.clone()).ok(),
        redis::Value::SimpleString(s) => Some(s.clone()),
        _ => None,
    })
}

/// Decode a raw delivery's payload as `J`, yielding `None` on parse failure
/// (the caller is responsible for dead-lettering those as unprocessable).
pub fn decode<J: DeserializeOwned>(raw: &RawDelivery) -> Option<J> {
    raw.raw_payload.as_deref().and_then(|s| serde_json::from_str(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mirrors the `#[serde(rename_all = "camelCase")]` shape real job types
    /// (`ReplayJob`/`AnalysisJob` in `domain_retro_core`) serialize to. Using
    /// a hand-built `json!({"projectId": ...})` literal here instead would
    /// pass even if a real job type's rename attribute were ever dropped.
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct FakeJob {
        project_id: String,
        session_id: String,
    }

    #[test]
    fn dead_letter_routing_requires_project_and_session() {
        let valid_payload = serde_json::to_value(FakeJob {
            project_id: "p1".into(),
            session_id: "s1".into(),
        })
        .unwrap();
        let valid = FailedEntry { failed_at: Utc::now(), error: "boom".into(), attempt: 1, payload: valid_payload };
        assert!(valid.payload.get("projectId").is_some() && valid.payload.get("sessionId").is_some());

        let garbage = FailedEntry {
            failed_at: Utc::now(),
            error: "boom".into(),
            attempt: 1,
            payload: serde_json::json!({"oops": true}),
        };
        assert!(!(garbage.payload.get("projectId").is_some() && garbage.payload.get("sessionId").is_some()));
    }
}
