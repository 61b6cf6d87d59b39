//! Guards the internal report-callback routes (`/v1/internal/...`) with a
//! shared-secret header instead of a user session: these calls originate
//! from the analysis/replay workers, not a browser.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_helpers::AppError;

const INTERNAL_HEADER: &str = "x-retrospec-internal";

pub async fn internal_api_guard(
    State(expected_key): State<String>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let provided = headers.get(INTERNAL_HEADER).and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected_key => Ok(next.run(request).await),
        _ => Err(AppError::Unauthorized("missing or invalid X-Retrospec-Internal header".to_string())),
    }
}
