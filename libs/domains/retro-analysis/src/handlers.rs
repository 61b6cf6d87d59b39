use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use domain_retro_core::ReportCard;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{AnalysisError, AnalysisResult};
use crate::repository::ReportCardRepository;
use crate::service::AnalysisService;

/// Accepts a report card pushed by an external analysis provider. The
/// `X-Retrospec-Internal` header check is applied by the router this is
/// mounted under, not here.
#[utoipa::path(
    post,
    path = "/v1/internal/analysis-reports",
    tag = "internal",
    request_body = ReportCard,
    responses(
        (status = 200, description = "Report card stored", body = ReportCard),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_analysis_report<R: ReportCardRepository + 'static>(
    State(service): State<Arc<AnalysisService<R>>>,
    Json(card): Json<ReportCard>,
) -> AnalysisResult<Json<ReportCard>> {
    let stored = service.repository_upsert(card).await?;
    Ok(Json(stored))
}

#[utoipa::path(
    get,
    path = "/v1/internal/analysis-reports/{project_id}/{session_id}",
    tag = "internal",
    params(
        ("project_id" = String, Path, description = "Project ID"),
        ("session_id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Report card found", body = ReportCard),
        (status = 404, description = "No report card for this session")
    )
)]
pub async fn get_analysis_report<R: ReportCardRepository + 'static>(
    State(service): State<Arc<AnalysisService<R>>>,
    Path((project_id, session_id)): Path<(String, String)>,
) -> AnalysisResult<Json<ReportCard>> {
    service
        .repository_get(&project_id, &session_id)
        .await?
        .map(Json)
        .ok_or_else(|| AnalysisError::Validation("no report card for this session".to_string()))
}

/// OpenAPI documentation for the analysis-report callback surface.
#[derive(OpenApi)]
#[openapi(
    paths(submit_analysis_report, get_analysis_report),
    components(schemas(ReportCard)),
)]
pub struct ApiDoc;

pub fn router<R: ReportCardRepository + 'static>(service: Arc<AnalysisService<R>>) -> Router {
    Router::new()
        .route("/v1/internal/analysis-reports", post(submit_analysis_report::<R>))
        .route(
            "/v1/internal/analysis-reports/{project_id}/{session_id}",
            get(get_analysis_report::<R>),
        )
        .with_state(service)
}
