//! Client-side gRPC interceptors
//!
//! These interceptors are used when making outgoing gRPC calls to inject
//! authentication, tracing context, metrics, and timeouts.

pub mod auth;
pub mod metrics;
pub mod timeout;
pub mod tracing;

pub use auth::AuthInterceptor;
pub use metrics::ClientMetricsInterceptor;
pub use timeout::TimeoutInterceptor;
pub use tracing::ClientTracingInterceptor;
