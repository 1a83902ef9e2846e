//! The job store contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sreel_models::{BatchId, IdeaId, JobId, JobPriority, RenderJob, RenderStatus};

use crate::error::StoreResult;

/// Equality filters for listing jobs. Omitted fields match all rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFilter {
    pub status: Option<RenderStatus>,
    pub priority: Option<JobPriority>,
    pub idea_id: Option<IdeaId>,
    pub batch_id: Option<BatchId>,
}

impl JobFilter {
    pub fn by_status(status: RenderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn matches(&self, job: &RenderJob) -> bool {
        self.status.map_or(true, |s| job.status == s)
            && self.priority.map_or(true, |p| job.priority == p)
            && self.idea_id.as_ref().map_or(true, |i| &job.idea_id == i)
            && self.batch_id.as_ref().map_or(true, |b| job.batch_id.as_ref() == Some(b))
    }
}

/// Partial update applied atomically to one job row.
///
/// `updated_at` is bumped by the store on every applied patch. Clearing
/// flags run before the corresponding set, so a retry reset can clear both
/// terminal fields in the same patch that re-queues the job.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<RenderStatus>,
    pub error_message: Option<String>,
    pub output_url: Option<String>,
    pub clear_error: bool,
    pub clear_output: bool,
}

impl JobPatch {
    /// Move the job to a new lifecycle state.
    pub fn status(status: RenderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Terminal failure with the causing message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(RenderStatus::Failed),
            error_message: Some(error.into()),
            ..Self::default()
        }
    }

    /// Terminal success with the public output locator.
    pub fn completed(output_url: impl Into<String>) -> Self {
        Self {
            status: Some(RenderStatus::Complete),
            output_url: Some(output_url.into()),
            ..Self::default()
        }
    }

    /// Reset a terminal job back to the queue, clearing both outcomes.
    pub fn retry() -> Self {
        Self {
            status: Some(RenderStatus::Queued),
            clear_error: true,
            clear_output: true,
            ..Self::default()
        }
    }

    /// Apply this patch to a job row in place.
    pub fn apply(&self, job: &mut RenderJob) {
        if self.clear_error {
            job.error_message = None;
        }
        if self.clear_output {
            job.output_url = None;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(ref error) = self.error_message {
            job.error_message = Some(error.clone());
        }
        if let Some(ref url) = self.output_url {
            job.output_url = Some(url.clone());
        }
        job.updated_at = chrono::Utc::now();
    }
}

/// Persisted render job rows, one per job.
///
/// All mutations are atomic per row; no cross-job transactions exist.
/// Deleting an in-flight job is refused with `Conflict` so the compiler is
/// never pulled out from under running work.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a job unconditionally (the force-create path).
    async fn create(&self, job: RenderJob) -> StoreResult<JobId>;

    /// Insert a job only if no live job holds its natural key.
    ///
    /// Returns `DuplicateKey` when the key is taken. This is the
    /// compare-and-create replacement for a read-then-write existence
    /// check.
    async fn create_unique(&self, job: RenderJob) -> StoreResult<JobId>;

    /// Fetch one job, `NotFound` if absent.
    async fn get(&self, id: &JobId) -> StoreResult<RenderJob>;

    /// List jobs matching the filter.
    async fn list(&self, filter: &JobFilter) -> StoreResult<Vec<RenderJob>>;

    /// Apply a patch and return the updated row.
    async fn update(&self, id: &JobId, patch: JobPatch) -> StoreResult<RenderJob>;

    /// Remove a job. Fails with `Conflict` while the job is in flight.
    async fn delete(&self, id: &JobId) -> StoreResult<()>;

    /// Backend connectivity check for readiness probes.
    async fn ping(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sreel_models::{Country, Persona};

    fn job() -> RenderJob {
        RenderJob::new(
            IdeaId::from("idea-1"),
            Persona::from("founder"),
            Country::from("us"),
            1,
            JobPriority::Normal,
            None,
        )
    }

    #[test]
    fn test_retry_patch_clears_both_terminal_fields() {
        let mut row = job();
        JobPatch::failed("encoder exploded").apply(&mut row);
        assert_eq!(row.status, RenderStatus::Failed);
        assert!(row.error_message.is_some());

        JobPatch::retry().apply(&mut row);
        assert_eq!(row.status, RenderStatus::Queued);
        assert!(row.error_message.is_none());
        assert!(row.output_url.is_none());
    }

    #[test]
    fn test_completed_patch_sets_output_url() {
        let mut row = job();
        JobPatch::completed("https://cdn.example.com/v.mp4").apply(&mut row);
        assert_eq!(row.status, RenderStatus::Complete);
        assert_eq!(
            row.output_url.as_deref(),
            Some("https://cdn.example.com/v.mp4")
        );
        assert!(row.error_message.is_none());
    }

    #[test]
    fn test_filter_matches_on_equality() {
        let row = job();
        assert!(JobFilter::by_status(RenderStatus::Queued).matches(&row));
        assert!(!JobFilter::by_status(RenderStatus::Failed).matches(&row));

        let filter = JobFilter {
            idea_id: Some(IdeaId::from("idea-1")),
            priority: Some(JobPriority::Normal),
            ..JobFilter::default()
        };
        assert!(filter.matches(&row));

        let other_idea = JobFilter {
            idea_id: Some(IdeaId::from("idea-2")),
            ..JobFilter::default()
        };
        assert!(!other_idea.matches(&row));
    }

    #[test]
    fn test_patch_bumps_updated_at() {
        let mut row = job();
        let before = row.updated_at;
        JobPatch::status(RenderStatus::Generating).apply(&mut row);
        assert!(row.updated_at >= before);
    }
}
