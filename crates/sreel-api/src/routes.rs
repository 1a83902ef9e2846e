//! API routes.

use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::jobs::{
    create_jobs, delete_job, get_job, list_jobs, publish_job, retry_job, run_jobs,
};
use crate::handlers::{health, ready};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let job_routes = Router::new()
        // Fan an idea out into render jobs
        .route("/ideas/:idea_id/render-jobs", post(create_jobs))
        // Job collection
        .route("/render-jobs", get(list_jobs))
        .route("/render-jobs/run", post(run_jobs))
        // Single job operations
        .route("/render-jobs/:job_id", get(get_job))
        .route("/render-jobs/:job_id", delete(delete_job))
        .route("/render-jobs/:job_id/retry", post(retry_job))
        .route("/render-jobs/:job_id/publish", post(publish_job));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    Router::new()
        .nest("/api", job_routes)
        .merge(health_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
