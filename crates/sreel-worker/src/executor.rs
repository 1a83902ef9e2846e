//! Job executor.
//!
//! Drives one render job through `queued -> generating -> encoding ->
//! uploading -> complete`, updating the store at every phase boundary so
//! observers can poll progress. No phase is ever skipped, and a failure in
//! any phase leaves the job terminal `failed` with the causing message.

use std::sync::Arc;

use tracing::warn;

use sreel_frames::{FrameSource, RenderFramesRequest};
use sreel_media::VideoCompiler;
use sreel_models::{JobId, RenderJob, RenderStatus};
use sreel_store::{JobFilter, JobPatch, JobStore};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;

/// Executes render jobs against the store, frame source and compiler.
///
/// Each call is a self-contained, externally triggered unit of work; the
/// host decides when (and how concurrently) to invoke it.
pub struct JobExecutor {
    store: Arc<dyn JobStore>,
    frames: Arc<dyn FrameSource>,
    compiler: Arc<VideoCompiler>,
    config: WorkerConfig,
}

impl JobExecutor {
    /// Create a new job executor.
    pub fn new(
        store: Arc<dyn JobStore>,
        frames: Arc<dyn FrameSource>,
        compiler: Arc<VideoCompiler>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            store,
            frames,
            compiler,
            config,
        }
    }

    /// Execute one queued job to a terminal state.
    ///
    /// Returns the final job row. Render failures are data, not transport
    /// errors: the row comes back `failed` with its error message. `Err`
    /// is reserved for jobs that cannot be run at all (missing, not
    /// queued) and for store-level failures.
    pub async fn run_job(&self, id: &JobId) -> WorkerResult<RenderJob> {
        let job = self.store.get(id).await?;
        if job.status != RenderStatus::Queued {
            return Err(WorkerError::invalid_transition(format!(
                "cannot run job with status: {}",
                job.status
            )));
        }

        let logger = JobLogger::new(&job.id, "render");
        logger.log_start(&format!("rendering {}", job.key()));

        let outcome = tokio::time::timeout(self.config.job_timeout, self.execute(&job, &logger));
        match outcome.await {
            Ok(Ok(output_url)) => {
                let row = self
                    .store
                    .update(id, JobPatch::completed(output_url))
                    .await?;
                logger.log_completion(row.output_url.as_deref().unwrap_or_default());
                Ok(row)
            }
            Ok(Err(WorkerError::Store(e))) => {
                // The store itself is unhealthy; marking the job failed
                // would go through the same store, so surface the error.
                logger.log_error(&e.to_string());
                Err(e.into())
            }
            Ok(Err(e)) => {
                logger.log_error(&e.to_string());
                let row = self.store.update(id, JobPatch::failed(e.to_string())).await?;
                Ok(row)
            }
            Err(_) => {
                let message = format!(
                    "render timed out after {} seconds",
                    self.config.job_timeout.as_secs()
                );
                logger.log_error(&message);
                let row = self.store.update(id, JobPatch::failed(message)).await?;
                Ok(row)
            }
        }
    }

    /// The three forward phases. Cancelling this future (timeout) aborts
    /// the encoder and releases the scratch workspace via its guard.
    async fn execute(&self, job: &RenderJob, logger: &JobLogger) -> WorkerResult<String> {
        logger.log_phase("generating");
        self.store
            .update(&job.id, JobPatch::status(RenderStatus::Generating))
            .await?;
        let slides = self
            .frames
            .render_frames(&RenderFramesRequest {
                idea_id: job.idea_id.clone(),
                persona: job.persona.clone(),
                country: job.country.clone(),
                post_index: job.post_index,
            })
            .await?;

        logger.log_phase("encoding");
        self.store
            .update(&job.id, JobPatch::status(RenderStatus::Encoding))
            .await?;
        let video = self
            .compiler
            .encode_frames(&slides.frames, slides.seconds_per_slide)
            .await?;

        logger.log_phase("uploading");
        self.store
            .update(&job.id, JobPatch::status(RenderStatus::Uploading))
            .await?;
        let (_, public_url) = self
            .compiler
            .upload_video(
                &job.idea_id,
                &job.persona,
                &job.country,
                &job.output_filename(),
                video,
            )
            .await?;

        Ok(public_url)
    }

    /// Execute a set of jobs (or all queued jobs) independently.
    ///
    /// Queued jobs picked implicitly are ordered by advisory priority,
    /// then age. One job's failure never blocks the rest.
    pub async fn run_jobs(&self, ids: Option<Vec<JobId>>) -> WorkerResult<Vec<RenderJob>> {
        let ids = match ids {
            Some(ids) => ids,
            None => {
                let mut queued = self
                    .store
                    .list(&JobFilter::by_status(RenderStatus::Queued))
                    .await?;
                queued.sort_by(|a, b| {
                    (a.priority.rank(), a.created_at).cmp(&(b.priority.rank(), b.created_at))
                });
                queued.into_iter().map(|j| j.id).collect()
            }
        };

        let mut processed = Vec::with_capacity(ids.len());
        for id in ids {
            match self.run_job(&id).await {
                Ok(job) => processed.push(job),
                Err(e) => {
                    warn!(job_id = %id, error = %e, "job not run");
                }
            }
        }
        Ok(processed)
    }

    /// Send a terminal job back to the queue.
    ///
    /// Clears `error_message` and `output_url`. Only `complete` and
    /// `failed` jobs may be retried.
    pub async fn retry_job(&self, id: &JobId) -> WorkerResult<RenderJob> {
        let job = self.store.get(id).await?;
        if !job.status.can_retry() {
            return Err(WorkerError::invalid_transition(format!(
                "cannot retry job with status: {}",
                job.status
            )));
        }
        Ok(self.store.update(id, JobPatch::retry()).await?)
    }

    /// Delete a job that is not in flight.
    ///
    /// The store refuses deletion of `generating | encoding | uploading`
    /// jobs with a conflict and leaves the row untouched.
    pub async fn delete_job(&self, id: &JobId) -> WorkerResult<()> {
        Ok(self.store.delete(id).await?)
    }
}
