//! Combined OpenAPI documentation for the ingest/query/admin API.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RetroSpec API",
        version = "0.1.0",
        description = "Session ingest, issue-cluster triage, internal report callbacks, and queue administration"
    ),
    nest(
        (path = "", api = domain_retro_dispatch::ApiDoc),
        (path = "", api = domain_retro_clustering::ApiDoc),
        (path = "", api = domain_retro_analysis::ApiDoc),
        (path = "", api = domain_retro_replay::ApiDoc),
        (path = "", api = crate::admin::ApiDoc),
    ),
    tags(
        (name = "ingest", description = "Session ingest"),
        (name = "issues", description = "Issue cluster triage"),
        (name = "internal", description = "Worker report callbacks, guarded by X-Retrospec-Internal"),
        (name = "admin", description = "Queue administration")
    )
)]
pub struct ApiDoc;
