//! Reusable Axum handlers for worker liveness/readiness, queue stats, and
//! dead-letter administration.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::dlq::DlqManager;
use crate::metrics;

#[derive(Clone)]
pub struct HealthState {
    pub redis: Arc<ConnectionManager>,
    pub app_name: String,
    pub app_version: String,
    pub queue_name: String,
    pub group_name: String,
}

impl HealthState {
    pub fn new(
        redis: Arc<ConnectionManager>,
        app_name: impl Into<String>,
        app_version: impl Into<String>,
        queue_name: impl Into<String>,
    ) -> Self {
        let queue = queue_name.into();
        let group = format!("{}:group", queue);
        Self {
            redis,
            app_name: app_name.into(),
            app_version: app_version.into(),
            queue_name: queue,
            group_name: group,
        }
    }

    pub fn dlq_manager(&self) -> DlqManager {
        DlqManager::new(
            crate::broker::Broker::new((*self.redis).clone()),
            &self.queue_name,
            &self.group_name,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: String,
    pub version: String,
}

pub async fn health_handler(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        name: state.app_name,
        version: state.app_version,
    })
}

pub async fn ready_handler(
    State(state): State<HealthState>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let mut conn = (*state.redis).clone();
    let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;

    match result {
        Ok(response) if response == "PONG" => {
            Ok((StatusCode::OK, Json(json!({"status": "ready", "checks": {"redis": "ok"}}))))
        }
        Ok(response) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "not_ready", "checks": {"redis": format!("unexpected response: {response}")}})),
        )),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "not_ready", "checks": {"redis": format!("error: {e}")}})),
        )),
    }
}

pub async fn queue_info_handler(
    State(state): State<HealthState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let broker = crate::broker::Broker::new((*state.redis).clone());
    match broker.stats(&state.queue_name, &state.group_name).await {
        Ok(stats) => Ok(Json(json!({
            "queue": state.queue_name,
            "streamDepth": stats.stream_depth,
            "pending": stats.pending,
            "retryDepth": stats.retry_depth,
            "failedDepth": stats.failed_depth,
        }))),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.to_string()})))),
    }
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::get_metrics_handle() {
        Some(handle) => {
            let output = handle.render();
            (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], output).into_response()
        }
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "metrics not initialized".to_string(),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct DlqListParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct DlqRedriveParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

pub async fn dlq_stats_handler(State(state): State<HealthState>) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    state
        .dlq_manager()
        .stats()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.to_string()}))))
}

pub async fn dlq_list_handler(
    State(state): State<HealthState>,
    Query(params): Query<DlqListParams>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let limit = params.limit.min(100);
    state
        .dlq_manager()
        .list(limit, params.offset)
        .await
        .map(|entries| Json(json!({"entries": entries, "limit": limit, "offset": params.offset})))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.to_string()}))))
}

pub async fn dlq_redrive_handler(
    State(state): State<HealthState>,
    Query(params): Query<DlqRedriveParams>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let limit = params.limit.min(100);
    state
        .dlq_manager()
        .redrive(limit)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.to_string()}))))
}

/// Included for path-parameter symmetry with admin routers that key
/// redrive-of-one by dead-letter position; RetroSpec redrives oldest-first
/// in batches rather than by id, so this simply proxies to the batch path.
pub async fn dlq_redrive_one_handler(
    State(state): State<HealthState>,
    Path(_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    state
        .dlq_manager()
        .redrive(1)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.to_string()}))))
}

pub fn health_router(state: HealthState) -> axum::Router {
    use axum::routing::get;
    axum::Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/readyz", get(ready_handler))
        .route("/queue/info", get(queue_info_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

pub fn dlq_admin_router(state: HealthState) -> axum::Router {
    use axum::routing::{get, post};
    axum::Router::new()
        .route("/admin/queue-dead-letters", get(dlq_list_handler))
        .route("/admin/queue-dead-letters/stats", get(dlq_stats_handler))
        .route("/admin/queue-redrive", post(dlq_redrive_handler))
        .route("/admin/queue-redrive/{id}", post(dlq_redrive_one_handler))
        .with_state(state)
}

pub fn full_admin_router(state: HealthState) -> axum::Router {
    health_router(state.clone()).merge(dlq_admin_router(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let response = HealthResponse { status: "healthy", name: "w".into(), version: "0.1".into() };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
    }
}
