//! Render job handlers.
//!
//! The job API surface: create jobs for an idea, list/get/delete/retry
//! individual jobs, run queued jobs now, and request publishing of a
//! completed job.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use sreel_models::{BatchId, IdeaId, JobId, JobPriority, RenderJob, RenderStatus};
use sreel_publish::{publisher_for, Platform, PublishOutcome, PublishRequest, Publisher};
use sreel_scheduler::CreateJobsOptions;
use sreel_store::{JobFilter, JobStore};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Types
// ============================================================================

/// Body for POST /api/ideas/:idea_id/render-jobs.
#[derive(Debug, Default, Deserialize)]
pub struct CreateJobsBody {
    #[serde(default)]
    pub priority: Option<JobPriority>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// Response for job creation.
#[derive(Debug, Serialize)]
pub struct CreateJobsResponse {
    pub jobs_created: usize,
    pub skipped: usize,
    pub batch_id: BatchId,
    pub jobs: Vec<RenderJob>,
}

/// Query parameters for GET /api/render-jobs.
#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default)]
    pub status: Option<RenderStatus>,
    #[serde(default)]
    pub priority: Option<JobPriority>,
    #[serde(default)]
    pub idea_id: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
}

/// Response for job listing.
#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<RenderJob>,
}

/// Body for POST /api/render-jobs/run.
#[derive(Debug, Default, Deserialize)]
pub struct RunJobsBody {
    /// Jobs to run; all queued jobs when omitted
    #[serde(default)]
    pub job_ids: Option<Vec<String>>,
}

/// Response for the run-now operation.
#[derive(Debug, Serialize)]
pub struct RunJobsResponse {
    pub processed: Vec<RenderJob>,
}

/// Body for POST /api/render-jobs/:job_id/publish.
#[derive(Debug, Deserialize)]
pub struct PublishJobBody {
    pub platform: String,
    #[serde(default)]
    pub caption: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/ideas/:idea_id/render-jobs
///
/// Create queued jobs for every persona x country x post combination of
/// the idea. Existing combinations are skipped unless `force` is set.
pub async fn create_jobs(
    State(state): State<AppState>,
    Path(idea_id): Path<String>,
    Json(body): Json<CreateJobsBody>,
) -> ApiResult<Json<CreateJobsResponse>> {
    info!(
        "create_jobs idea_id={} force={} batch_id={:?}",
        idea_id, body.force, body.batch_id
    );

    let outcome = state
        .scheduler
        .create_jobs_for_idea(
            &IdeaId::from(idea_id),
            CreateJobsOptions {
                priority: body.priority.unwrap_or_default(),
                batch_id: body.batch_id.map(BatchId::from),
                force: body.force,
            },
        )
        .await?;

    Ok(Json(CreateJobsResponse {
        jobs_created: outcome.jobs_created,
        skipped: outcome.skipped(),
        batch_id: outcome.batch_id.clone(),
        jobs: outcome.jobs,
    }))
}

/// GET /api/render-jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> ApiResult<Json<ListJobsResponse>> {
    let filter = JobFilter {
        status: query.status,
        priority: query.priority,
        idea_id: query.idea_id.map(IdeaId::from),
        batch_id: query.batch_id.map(BatchId::from),
    };

    let jobs = state.store.list(&filter).await?;
    Ok(Json(ListJobsResponse { jobs }))
}

/// GET /api/render-jobs/:job_id
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<RenderJob>> {
    let job = state.store.get(&JobId::from(job_id)).await?;
    Ok(Json(job))
}

/// DELETE /api/render-jobs/:job_id
///
/// Refused with 409 while the job is in flight.
pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.executor.delete_job(&JobId::from(job_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/render-jobs/:job_id/retry
///
/// Legal only for complete/failed jobs; clears the previous outcome and
/// re-queues.
pub async fn retry_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<RenderJob>> {
    let job = state.executor.retry_job(&JobId::from(job_id)).await?;
    Ok(Json(job))
}

/// POST /api/render-jobs/run
///
/// Execute the given jobs (or all queued jobs) now, each independently.
pub async fn run_jobs(
    State(state): State<AppState>,
    Json(body): Json<RunJobsBody>,
) -> ApiResult<Json<RunJobsResponse>> {
    let ids = body
        .job_ids
        .map(|ids| ids.into_iter().map(JobId::from).collect());

    let processed = state.executor.run_jobs(ids).await?;
    info!("run_jobs processed {} jobs", processed.len());
    Ok(Json(RunJobsResponse { processed }))
}

/// POST /api/render-jobs/:job_id/publish
///
/// Ask a platform publisher to post a completed job's video. With no
/// platform integration configured this reports `not_configured`.
pub async fn publish_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(body): Json<PublishJobBody>,
) -> ApiResult<Json<PublishOutcome>> {
    let platform = Platform::parse(&body.platform)
        .ok_or_else(|| ApiError::bad_request(format!("unknown platform: {}", body.platform)))?;

    let job = state.store.get(&JobId::from(job_id)).await?;
    if job.status != RenderStatus::Complete {
        return Err(ApiError::conflict(format!(
            "cannot publish job with status: {}",
            job.status
        )));
    }
    let video_url = job
        .output_url
        .clone()
        .ok_or_else(|| ApiError::internal("complete job has no output URL"))?;

    let outcome = publisher_for(platform)
        .publish(&PublishRequest {
            video_url,
            caption: body.caption,
            country: job.country.clone(),
        })
        .await;

    Ok(Json(outcome))
}
