// CSRF protection implementation
// This is a placeholder for future CSRF implementation with Redis backing

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};

/// Middleware for CSRF token validation.
///
/// TODO: Implement CSRF protection with Redis backing.
/// This is currently a no-op placeholder.
pub async fn csrf_validation_middleware(request: Request, next: Next) -> Response {
    // TODO: Implement CSRF validation logic
    // 1. Extract CSRF token from header (x-csrf-token)
    // 2. Validate token against Redis store
    // 3. Return 403 if invalid
    next.run(request).await
}
