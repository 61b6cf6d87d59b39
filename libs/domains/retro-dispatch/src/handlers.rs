use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use domain_retro_clustering::MarkerRepository;
use std::sync::Arc;
use utoipa::OpenApi;
use validator::Validate;

use crate::error::{DispatchError, DispatchResult};
use crate::models::{IngestSessionRequest, IngestSessionResponse};
use crate::service::DispatchService;

#[utoipa::path(
    post,
    path = "/v1/ingest/session",
    tag = "ingest",
    request_body = IngestSessionRequest,
    responses(
        (status = 202, description = "Session accepted and dispatched", body = IngestSessionResponse),
        (status = 400, description = "Invalid session payload"),
    )
)]
pub async fn ingest_session<M: MarkerRepository + 'static>(
    State(service): State<Arc<DispatchService<M>>>,
    Json(req): Json<IngestSessionRequest>,
) -> DispatchResult<impl IntoResponse> {
    req.validate()
        .map_err(|e| DispatchError::Validation(e.to_string()))?;

    let response = service.dispatch_session(req).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// OpenAPI documentation for the session-ingest surface.
#[derive(OpenApi)]
#[openapi(
    paths(ingest_session),
    components(schemas(IngestSessionRequest, IngestSessionResponse, crate::models::QueuedStatus)),
    tags((name = "ingest", description = "Session ingest and fan-out"))
)]
pub struct ApiDoc;

pub fn router<M: MarkerRepository + 'static>(service: Arc<DispatchService<M>>) -> Router {
    Router::new()
        .route("/v1/ingest/session", post(ingest_session::<M>))
        .with_state(service)
}
