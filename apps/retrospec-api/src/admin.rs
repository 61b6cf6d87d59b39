//! Queue operations surface: depth/backlog health, dead-letter inspection,
//! and redrive. Built directly on `stream_worker::Broker` — there is one
//! `Broker` shared across both queues, distinguished by name.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use domain_retro_core::{AnalysisQueue, ReplayQueue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stream_worker::{Broker, BrokerStats, FailedEntry, RedriveResult, StreamDef};
use utoipa::{OpenApi, ToSchema};

use crate::config::QueueHealthConfig;
use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AdminState {
    pub broker: Broker,
    pub queue_health: Arc<QueueHealthConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueueName {
    Replay,
    Analysis,
}

impl QueueName {
    fn queue(self) -> &'static str {
        match self {
            QueueName::Replay => ReplayQueue::QUEUE_NAME,
            QueueName::Analysis => AnalysisQueue::QUEUE_NAME,
        }
    }

    fn group(self) -> String {
        format!("{}:group", self.queue())
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueueHealthEntry {
    pub queue: String,
    pub status: HealthStatus,
    pub stream_depth: u64,
    pub pending: u64,
    pub retry_depth: u64,
    pub failed_depth: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueueHealthReport {
    pub status: HealthStatus,
    pub queues: Vec<QueueHealthEntry>,
}

fn classify(stats: &BrokerStats, config: &QueueHealthConfig) -> HealthStatus {
    let levels = [
        threshold(stats.pending, config.warning_pending, config.critical_pending),
        threshold(stats.retry_depth, config.warning_retry, config.critical_retry),
        threshold(stats.failed_depth, config.warning_failed, config.critical_failed),
    ];
    levels.into_iter().max().unwrap_or(HealthStatus::Healthy)
}

fn threshold(value: u64, warning: u64, critical: u64) -> HealthStatus {
    if value >= critical {
        HealthStatus::Critical
    } else if value >= warning {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    }
}

#[utoipa::path(
    get,
    path = "/v1/admin/queue-health",
    tag = "admin",
    responses(
        (status = 200, description = "Worst-of-thresholds health across both queues", body = QueueHealthReport),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn queue_health(State(state): State<AdminState>) -> ApiResult<Json<QueueHealthReport>> {
    let mut queues = Vec::with_capacity(2);
    for name in [QueueName::Replay, QueueName::Analysis] {
        let stats = state
            .broker
            .stats(name.queue(), &name.group())
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let status = classify(&stats, &state.queue_health);
        queues.push(QueueHealthEntry {
            queue: name.queue().to_string(),
            status,
            stream_depth: stats.stream_depth,
            pending: stats.pending,
            retry_depth: stats.retry_depth,
            failed_depth: stats.failed_depth,
        });
    }

    let status = queues.iter().map(|q| q.status).max().unwrap_or(HealthStatus::Healthy);
    Ok(Json(QueueHealthReport { status, queues }))
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct DeadLetterQuery {
    pub queue: QueueName,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeadLetterResponse {
    pub queue: String,
    pub entries: Vec<FailedEntry>,
}

#[utoipa::path(
    get,
    path = "/v1/admin/queue-dead-letters",
    tag = "admin",
    params(DeadLetterQuery),
    responses(
        (status = 200, description = "Dead-letter entries for a queue", body = DeadLetterResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn queue_dead_letters(
    State(state): State<AdminState>,
    Query(query): Query<DeadLetterQuery>,
) -> ApiResult<Json<DeadLetterResponse>> {
    let entries = state
        .broker
        .list_dead_letters(query.queue.queue(), query.limit, query.offset)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(DeadLetterResponse { queue: query.queue.queue().to_string(), entries }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedriveRequest {
    pub queue: QueueName,
    #[serde(default = "default_redrive_limit")]
    pub limit: usize,
}

fn default_redrive_limit() -> usize {
    20
}

#[utoipa::path(
    post,
    path = "/v1/admin/queue-redrive",
    tag = "admin",
    request_body = RedriveRequest,
    responses(
        (status = 200, description = "Entries moved back onto the stream for reprocessing", body = RedriveResult),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn queue_redrive(
    State(state): State<AdminState>,
    Json(req): Json<RedriveRequest>,
) -> ApiResult<Json<RedriveResult>> {
    let result = state
        .broker
        .redrive(req.queue.queue(), req.limit)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(result))
}

/// OpenAPI documentation for the queue administration surface.
#[derive(OpenApi)]
#[openapi(
    paths(queue_health, queue_dead_letters, queue_redrive),
    components(schemas(
        QueueName, HealthStatus, QueueHealthEntry, QueueHealthReport,
        DeadLetterQuery, DeadLetterResponse, RedriveRequest,
        BrokerStats, FailedEntry, RedriveResult,
    )),
    tags((name = "admin", description = "Queue backlog health, dead-letter inspection, and redrive"))
)]
pub struct ApiDoc;

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/v1/admin/queue-health", get(queue_health))
        .route("/v1/admin/queue-dead-letters", get(queue_dead_letters))
        .route("/v1/admin/queue-redrive", post(queue_redrive))
        .with_state(state)
}
