use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use domain_retro_core::{ClusterKey, ClusterState, FeedbackKind, IssueCluster};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::{ClusteringError, ClusteringResult};
use crate::repository::{ClusterRepository, FeedbackRepository, MarkerRepository};
use crate::service::ClusteringService;

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub project_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub project_id: String,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub project_id: String,
    #[serde(default = "default_stats_hours")]
    pub hours: i64,
}

fn default_stats_hours() -> i64 {
    24
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromoteResponse {
    pub promoted: Vec<IssueCluster>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    pub issues: Vec<IssueCluster>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub lookback_hours: i64,
    pub stats: Vec<crate::service::ClusterStat>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionsResponse {
    pub cluster_key: String,
    pub sessions: Vec<domain_retro_core::ReportCard>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStateRequest {
    pub project_id: String,
    pub state: ClusterState,
    pub assignee: Option<String>,
    pub muted_until: Option<DateTime<Utc>>,
    pub note: Option<String>,
    #[serde(default = "default_actor")]
    pub actor: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    pub project_id: String,
    pub kind: FeedbackKind,
    pub note: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default = "default_actor")]
    pub actor: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MergeRequest {
    pub project_id: String,
    pub target_key: String,
    pub source_keys: Vec<String>,
    pub note: Option<String>,
    #[serde(default = "default_actor")]
    pub actor: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SplitRequest {
    pub project_id: String,
    pub new_key: String,
    pub session_ids: Vec<String>,
    pub note: Option<String>,
    #[serde(default = "default_actor")]
    pub actor: String,
}

fn default_actor() -> String {
    "operator".to_string()
}

fn parse_state(state: &str) -> ClusteringResult<ClusterState> {
    state
        .parse()
        .map_err(|_| ClusteringError::Validation(format!("unknown cluster state '{state}'")))
}

#[utoipa::path(
    post,
    path = "/v1/issues/promote",
    tag = "issues",
    params(("project_id" = String, Query, description = "Project ID")),
    responses(
        (status = 200, description = "Clusters that crossed the promotion threshold", body = PromoteResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn promote<M: MarkerRepository + 'static, C: ClusterRepository + 'static, F: FeedbackRepository + 'static>(
    State(service): State<Arc<ClusteringService<M, C, F>>>,
    Query(query): Query<ProjectQuery>,
) -> ClusteringResult<Json<PromoteResponse>> {
    let promoted = service.promote(&query.project_id).await?;
    Ok(Json(PromoteResponse { promoted }))
}

#[utoipa::path(
    get,
    path = "/v1/issues",
    tag = "issues",
    params(
        ("project_id" = String, Query, description = "Project ID"),
        ("state" = Option<String>, Query, description = "Filter by cluster state; 'active' excludes resolved")
    ),
    responses(
        (status = 200, description = "Issue clusters for a project", body = ListResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_issues<M: MarkerRepository + 'static, C: ClusterRepository + 'static, F: FeedbackRepository + 'static>(
    State(service): State<Arc<ClusteringService<M, C, F>>>,
    Query(query): Query<ListQuery>,
) -> ClusteringResult<Json<ListResponse>> {
    let state = match query.state.as_deref() {
        None | Some("active") => None,
        Some(other) => Some(parse_state(other)?),
    };

    let mut issues = service.list(&query.project_id, state).await?;
    if query.state.as_deref() == Some("active") {
        issues.retain(|issue| !matches!(issue.state, ClusterState::Resolved));
    }

    Ok(Json(ListResponse { issues }))
}

#[utoipa::path(
    get,
    path = "/v1/issues/stats",
    tag = "issues",
    params(
        ("project_id" = String, Query, description = "Project ID"),
        ("hours" = Option<i64>, Query, description = "Lookback window in hours, defaults to 24")
    ),
    responses(
        (status = 200, description = "Cluster counts over the lookback window", body = StatsResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn stats<M: MarkerRepository + 'static, C: ClusterRepository + 'static, F: FeedbackRepository + 'static>(
    State(service): State<Arc<ClusteringService<M, C, F>>>,
    Query(query): Query<StatsQuery>,
) -> ClusteringResult<Json<StatsResponse>> {
    let stats = service.stats(&query.project_id, query.hours).await?;
    Ok(Json(StatsResponse { lookback_hours: query.hours, stats }))
}

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    pub project_id: String,
    pub limit: Option<usize>,
    pub report_status: Option<String>,
    pub min_confidence: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/v1/issues/{key}/sessions",
    tag = "issues",
    params(
        ("key" = String, Path, description = "Cluster key"),
        ("project_id" = String, Query, description = "Project ID"),
        ("limit" = Option<usize>, Query, description = "Maximum sessions to return"),
        ("report_status" = Option<String>, Query, description = "Filter by report status"),
        ("min_confidence" = Option<f64>, Query, description = "Minimum report confidence")
    ),
    responses(
        (status = 200, description = "Sessions attributed to a cluster", body = SessionsResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn sessions_for<M: MarkerRepository + 'static, C: ClusterRepository + 'static, F: FeedbackRepository + 'static>(
    State(service): State<Arc<ClusteringService<M, C, F>>>,
    Path(cluster_key): Path<String>,
    Query(query): Query<SessionsQuery>,
) -> ClusteringResult<Json<SessionsResponse>> {
    let key = ClusterKey(cluster_key);
    let filter = crate::service::SessionFilter {
        limit: query.limit,
        report_status: query.report_status,
        min_confidence: query.min_confidence,
    };
    let sessions = service.sessions_for(&query.project_id, &key, filter).await?;
    Ok(Json(SessionsResponse { cluster_key: key.0, sessions }))
}

#[utoipa::path(
    post,
    path = "/v1/issues/{key}/state",
    tag = "issues",
    params(("key" = String, Path, description = "Cluster key")),
    request_body = SetStateRequest,
    responses(
        (status = 200, description = "Updated cluster", body = IssueCluster),
        (status = 400, description = "Unknown cluster state")
    )
)]
pub async fn set_state<M: MarkerRepository + 'static, C: ClusterRepository + 'static, F: FeedbackRepository + 'static>(
    State(service): State<Arc<ClusteringService<M, C, F>>>,
    Path(cluster_key): Path<String>,
    Json(req): Json<SetStateRequest>,
) -> ClusteringResult<Json<IssueCluster>> {
    let stored = service
        .set_state(&req.project_id, &ClusterKey(cluster_key), req.state, req.assignee, req.muted_until, req.note, &req.actor)
        .await?;
    Ok(Json(stored))
}

#[utoipa::path(
    post,
    path = "/v1/issues/{key}/feedback",
    tag = "issues",
    params(("key" = String, Path, description = "Cluster key")),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback recorded"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_feedback<M: MarkerRepository + 'static, C: ClusterRepository + 'static, F: FeedbackRepository + 'static>(
    State(service): State<Arc<ClusteringService<M, C, F>>>,
    Path(cluster_key): Path<String>,
    Json(req): Json<FeedbackRequest>,
) -> ClusteringResult<Json<()>> {
    service
        .feedback(&req.project_id, &ClusterKey(cluster_key), req.kind, req.note, req.session_id, req.metadata, &req.actor)
        .await?;
    Ok(Json(()))
}

#[utoipa::path(
    post,
    path = "/v1/issues/merge",
    tag = "issues",
    request_body = MergeRequest,
    responses(
        (status = 200, description = "Clusters after the merge", body = ListResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn merge<M: MarkerRepository + 'static, C: ClusterRepository + 'static, F: FeedbackRepository + 'static>(
    State(service): State<Arc<ClusteringService<M, C, F>>>,
    Json(req): Json<MergeRequest>,
) -> ClusteringResult<Json<ListResponse>> {
    let sources: Vec<ClusterKey> = req.source_keys.into_iter().map(ClusterKey).collect();
    let issues = service
        .merge(&req.project_id, &ClusterKey(req.target_key), &sources, req.note, &req.actor)
        .await?;
    Ok(Json(ListResponse { issues }))
}

#[utoipa::path(
    post,
    path = "/v1/issues/{key}/split",
    tag = "issues",
    params(("key" = String, Path, description = "Cluster key")),
    request_body = SplitRequest,
    responses(
        (status = 200, description = "Clusters after the split", body = ListResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn split<M: MarkerRepository + 'static, C: ClusterRepository + 'static, F: FeedbackRepository + 'static>(
    State(service): State<Arc<ClusteringService<M, C, F>>>,
    Path(cluster_key): Path<String>,
    Json(req): Json<SplitRequest>,
) -> ClusteringResult<Json<ListResponse>> {
    let issues = service
        .split(&req.project_id, &ClusterKey(cluster_key), &ClusterKey(req.new_key), &req.session_ids, req.note, &req.actor)
        .await?;
    Ok(Json(ListResponse { issues }))
}

/// OpenAPI documentation for the issue-cluster surface.
#[derive(OpenApi)]
#[openapi(
    paths(promote, list_issues, stats, sessions_for, set_state, submit_feedback, merge, split),
    components(schemas(
        PromoteResponse, ListResponse, StatsResponse, SessionsResponse,
        SetStateRequest, FeedbackRequest, MergeRequest, SplitRequest,
        IssueCluster, crate::service::ClusterStat,
    )),
    tags((name = "issues", description = "Issue cluster lifecycle: promotion, triage, feedback, merge/split"))
)]
pub struct ApiDoc;

pub fn router<M: MarkerRepository + 'static, C: ClusterRepository + 'static, F: FeedbackRepository + 'static>(
    service: Arc<ClusteringService<M, C, F>>,
) -> Router {
    Router::new()
        .route("/v1/issues/promote", post(promote::<M, C, F>))
        .route("/v1/issues", get(list_issues::<M, C, F>))
        .route("/v1/issues/stats", get(stats::<M, C, F>))
        .route("/v1/issues/{key}/sessions", get(sessions_for::<M, C, F>))
        .route("/v1/issues/{key}/state", post(set_state::<M, C, F>))
        .route("/v1/issues/{key}/feedback", post(submit_feedback::<M, C, F>))
        .route("/v1/issues/{key}/split", post(split::<M, C, F>))
        .route("/v1/issues/merge", post(merge::<M, C, F>))
        .with_state(service)
}
