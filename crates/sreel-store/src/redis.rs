//! Redis-backed job store.
//!
//! One JSON row per job under `{prefix}:job:{id}`, an index set of all job
//! ids, and a per-natural-key reservation implementing the uniqueness
//! constraint. The reservation is claimed with `SET NX`, so two racing
//! `create_unique` calls for the same key resolve to exactly one winner.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use sreel_models::{JobId, JobKey, RenderJob};

use crate::error::{StoreError, StoreResult};
use crate::store::{JobFilter, JobPatch, JobStore};

/// Redis store configuration.
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis URL
    pub redis_url: String,
    /// Key prefix for all store keys
    pub key_prefix: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            key_prefix: "sreel".to_string(),
        }
    }
}

impl RedisStoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            key_prefix: std::env::var("JOB_STORE_PREFIX").unwrap_or_else(|_| "sreel".to_string()),
        }
    }
}

/// Job store backed by Redis.
pub struct RedisJobStore {
    client: redis::Client,
    config: RedisStoreConfig,
}

impl RedisJobStore {
    /// Create a new Redis job store.
    pub fn new(config: RedisStoreConfig) -> StoreResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(RedisStoreConfig::from_env())
    }

    async fn conn(&self) -> StoreResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(StoreError::Redis)
    }

    fn job_key(&self, id: &JobId) -> String {
        format!("{}:job:{}", self.config.key_prefix, id)
    }

    fn index_key(&self) -> String {
        format!("{}:jobs", self.config.key_prefix)
    }

    fn natural_key(&self, key: &JobKey) -> String {
        format!("{}:jobkey:{}", self.config.key_prefix, key)
    }

    async fn write_row(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
        job: &RenderJob,
    ) -> StoreResult<()> {
        let payload = serde_json::to_string(job)?;
        conn.set::<_, _, ()>(self.job_key(&job.id), payload).await?;
        conn.sadd::<_, _, ()>(self.index_key(), job.id.as_str())
            .await?;
        Ok(())
    }

    async fn read_row(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
        id: &JobId,
    ) -> StoreResult<RenderJob> {
        let payload: Option<String> = conn.get(self.job_key(id)).await?;
        let payload = payload.ok_or_else(|| StoreError::not_found(id.as_str()))?;
        Ok(serde_json::from_str(&payload)?)
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn create(&self, job: RenderJob) -> StoreResult<JobId> {
        let mut conn = self.conn().await?;
        // Claim the reservation if nobody holds it, so later non-forced
        // creates still see the key as taken. Losing the race is fine.
        let _: bool = conn
            .set_nx(self.natural_key(&job.key()), job.id.as_str())
            .await?;
        self.write_row(&mut conn, &job).await?;
        Ok(job.id)
    }

    async fn create_unique(&self, job: RenderJob) -> StoreResult<JobId> {
        let mut conn = self.conn().await?;
        let key = job.key();
        let claimed: bool = conn
            .set_nx(self.natural_key(&key), job.id.as_str())
            .await?;
        if !claimed {
            debug!(key = %key, "natural key already reserved, skipping create");
            return Err(StoreError::DuplicateKey(key.to_string()));
        }
        self.write_row(&mut conn, &job).await?;
        Ok(job.id)
    }

    async fn get(&self, id: &JobId) -> StoreResult<RenderJob> {
        let mut conn = self.conn().await?;
        self.read_row(&mut conn, id).await
    }

    async fn list(&self, filter: &JobFilter) -> StoreResult<Vec<RenderJob>> {
        let mut conn = self.conn().await?;
        let ids: Vec<String> = conn.smembers(self.index_key()).await?;

        let mut jobs = Vec::with_capacity(ids.len());
        for id in ids {
            match self.read_row(&mut conn, &JobId::from(id)).await {
                Ok(job) if filter.matches(&job) => jobs.push(job),
                Ok(_) => {}
                // Index entries can outlive rows briefly; skip them.
                Err(StoreError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(jobs)
    }

    async fn update(&self, id: &JobId, patch: JobPatch) -> StoreResult<RenderJob> {
        let mut conn = self.conn().await?;
        let mut job = self.read_row(&mut conn, id).await?;
        patch.apply(&mut job);
        let payload = serde_json::to_string(&job)?;
        conn.set::<_, _, ()>(self.job_key(id), payload).await?;
        Ok(job)
    }

    async fn delete(&self, id: &JobId) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let job = self.read_row(&mut conn, id).await?;
        if !job.status.can_delete() {
            return Err(StoreError::conflict(format!(
                "cannot delete job with status: {}",
                job.status
            )));
        }

        // Release the reservation only if this row holds it; forced
        // duplicates never claimed it.
        let nat_key = self.natural_key(&job.key());
        let holder: Option<String> = conn.get(&nat_key).await?;
        if holder.as_deref() == Some(id.as_str()) {
            conn.del::<_, ()>(&nat_key).await?;
        }

        conn.del::<_, ()>(self.job_key(id)).await?;
        conn.srem::<_, _, ()>(self.index_key(), id.as_str()).await?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let _: () = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(StoreError::Redis)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let store = RedisJobStore::new(RedisStoreConfig::default()).unwrap();
        let id = JobId::from("j-1");
        assert_eq!(store.job_key(&id), "sreel:job:j-1");
        assert_eq!(store.index_key(), "sreel:jobs");
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_round_trip_against_redis() {
        use sreel_models::{Country, IdeaId, JobPriority, Persona, RenderStatus};

        let store = RedisJobStore::from_env().unwrap();
        let job = RenderJob::new(
            IdeaId::from("it-idea"),
            Persona::from("founder"),
            Country::from("us"),
            1,
            JobPriority::Normal,
            None,
        );
        let id = store.create(job).await.unwrap();

        let row = store.get(&id).await.unwrap();
        assert_eq!(row.status, RenderStatus::Queued);

        store.delete(&id).await.unwrap();
        assert!(matches!(
            store.get(&id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }
}
