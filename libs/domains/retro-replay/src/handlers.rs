use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use domain_retro_analysis::{AnalysisService, ReportCardRepository};
use domain_retro_core::ReportCard;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ReplayResult;

/// Accepts the aggregated card the replay/visual stage produces. The router
/// this is mounted under applies the `X-Retrospec-Internal` header check,
/// not this handler. Shares the same `ReportCard` store as
/// `domain_retro_analysis::handlers::submit_analysis_report` — replay
/// results and text-analysis results are two callbacks into one table.
#[utoipa::path(
    post,
    path = "/v1/internal/replay-results",
    tag = "internal",
    request_body = ReportCard,
    responses(
        (status = 200, description = "Report card stored", body = ReportCard),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_replay_result<R: ReportCardRepository + 'static>(
    State(service): State<Arc<AnalysisService<R>>>,
    Json(card): Json<ReportCard>,
) -> ReplayResult<Json<ReportCard>> {
    let stored = service.repository_upsert(card).await.map_err(|e| crate::error::ReplayError::Database(e.to_string()))?;
    Ok(Json(stored))
}

/// OpenAPI documentation for the replay-result callback surface.
#[derive(OpenApi)]
#[openapi(
    paths(submit_replay_result),
    components(schemas(ReportCard)),
)]
pub struct ApiDoc;

pub fn router<R: ReportCardRepository + 'static>(service: Arc<AnalysisService<R>>) -> Router {
    Router::new().route("/v1/internal/replay-results", post(submit_replay_result::<R>)).with_state(service)
}
