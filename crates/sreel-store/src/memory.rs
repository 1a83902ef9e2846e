//! In-memory job store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use sreel_models::{JobId, RenderJob};

use crate::error::{StoreError, StoreResult};
use crate::store::{JobFilter, JobPatch, JobStore};

/// Job store backed by a process-local map.
///
/// The uniqueness check runs under the write lock, so `create_unique` is a
/// true compare-and-create here (unlike best-effort remote backends).
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, RenderJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: RenderJob) -> StoreResult<JobId> {
        let id = job.id.clone();
        self.jobs.write().await.insert(id.clone(), job);
        Ok(id)
    }

    async fn create_unique(&self, job: RenderJob) -> StoreResult<JobId> {
        let key = job.key();
        let mut jobs = self.jobs.write().await;
        if jobs.values().any(|existing| existing.key() == key) {
            return Err(StoreError::DuplicateKey(key.to_string()));
        }
        let id = job.id.clone();
        jobs.insert(id.clone(), job);
        Ok(id)
    }

    async fn get(&self, id: &JobId) -> StoreResult<RenderJob> {
        self.jobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id.as_str()))
    }

    async fn list(&self, filter: &JobFilter) -> StoreResult<Vec<RenderJob>> {
        let mut jobs: Vec<RenderJob> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(jobs)
    }

    async fn update(&self, id: &JobId, patch: JobPatch) -> StoreResult<RenderJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id.as_str()))?;
        patch.apply(job);
        Ok(job.clone())
    }

    async fn delete(&self, id: &JobId) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get(id)
            .ok_or_else(|| StoreError::not_found(id.as_str()))?;
        if !job.status.can_delete() {
            return Err(StoreError::conflict(format!(
                "cannot delete job with status: {}",
                job.status
            )));
        }
        jobs.remove(id);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
