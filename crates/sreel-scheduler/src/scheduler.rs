//! Job fan-out over persona x country x post-index combinations.

use std::sync::Arc;

use tracing::{debug, info};

use sreel_models::{BatchId, IdeaId, JobPriority, RenderJob};
use sreel_store::{JobStore, StoreError};

use crate::catalog::IdeaCatalog;
use crate::error::{SchedulerError, SchedulerResult};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How many posts each (persona, country) combination yields
    pub posts_per_combination: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            posts_per_combination: 7,
        }
    }
}

impl SchedulerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            posts_per_combination: std::env::var("POSTS_PER_COMBINATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
        }
    }
}

/// Options for one scheduling call.
#[derive(Debug, Clone, Default)]
pub struct CreateJobsOptions {
    /// Advisory priority for all created jobs
    pub priority: JobPriority,
    /// Batch to group the jobs under; generated when absent
    pub batch_id: Option<BatchId>,
    /// Create jobs even where a natural key is already taken
    pub force: bool,
}

/// What one scheduling call produced.
#[derive(Debug)]
pub struct CreateJobsOutcome {
    /// Jobs actually created (skips excluded)
    pub jobs_created: usize,
    /// Total combinations enumerated (personas x countries x posts)
    pub combinations: usize,
    /// Batch shared by every created job
    pub batch_id: BatchId,
    /// The created rows
    pub jobs: Vec<RenderJob>,
}

impl CreateJobsOutcome {
    /// Combinations that already had a job and were skipped.
    pub fn skipped(&self) -> usize {
        self.combinations - self.jobs_created
    }
}

/// Creates queued render jobs for an idea's configured combinations.
pub struct JobScheduler {
    store: Arc<dyn JobStore>,
    catalog: Arc<dyn IdeaCatalog>,
    config: SchedulerConfig,
}

impl JobScheduler {
    pub fn new(
        store: Arc<dyn JobStore>,
        catalog: Arc<dyn IdeaCatalog>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    /// Create queued jobs for every combination configured on the idea.
    ///
    /// With `force` unset, combinations whose natural key is already taken
    /// are skipped silently. With `force` set, a new job is created
    /// alongside any existing one; prior jobs are never deleted or merged.
    pub async fn create_jobs_for_idea(
        &self,
        idea_id: &IdeaId,
        options: CreateJobsOptions,
    ) -> SchedulerResult<CreateJobsOutcome> {
        let idea = self
            .catalog
            .get_idea(idea_id)
            .await?
            .ok_or_else(|| SchedulerError::IdeaNotFound(idea_id.to_string()))?;

        if idea.personas.is_empty() {
            return Err(SchedulerError::validation(
                "idea has no personas configured",
            ));
        }
        let combos = idea.combinations();
        if combos.is_empty() {
            return Err(SchedulerError::validation(
                "idea has no persona/country combinations",
            ));
        }

        let batch_id = options.batch_id.unwrap_or_default();
        let combinations = combos.len() * self.config.posts_per_combination as usize;
        let mut jobs = Vec::new();

        for (persona, country) in combos {
            for post_index in 1..=self.config.posts_per_combination {
                let job = RenderJob::new(
                    idea_id.clone(),
                    persona.clone(),
                    country.clone(),
                    post_index,
                    options.priority,
                    Some(batch_id.clone()),
                );

                let created = if options.force {
                    self.store.create(job.clone()).await.map(|_| true)?
                } else {
                    match self.store.create_unique(job.clone()).await {
                        Ok(_) => true,
                        Err(StoreError::DuplicateKey(key)) => {
                            debug!(key = %key, "job already exists, skipping");
                            false
                        }
                        Err(e) => return Err(e.into()),
                    }
                };

                if created {
                    jobs.push(job);
                }
            }
        }

        info!(
            idea_id = %idea_id,
            batch_id = %batch_id,
            created = jobs.len(),
            combinations,
            force = options.force,
            "Scheduled render jobs"
        );

        Ok(CreateJobsOutcome {
            jobs_created: jobs.len(),
            combinations,
            batch_id,
            jobs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryIdeaCatalog;
    use sreel_models::{Country, IdeaConfig, Persona, PersonaConfig, RenderStatus};
    use sreel_store::{JobFilter, MemoryJobStore};

    async fn fixture(posts: u8) -> (Arc<MemoryJobStore>, JobScheduler) {
        let store = Arc::new(MemoryJobStore::new());
        let catalog = Arc::new(MemoryIdeaCatalog::new());
        catalog
            .insert(IdeaConfig {
                id: IdeaId::from("idea-1"),
                personas: vec![PersonaConfig {
                    persona: Persona::from("founder"),
                    countries: vec![Country::from("us"), Country::from("de")],
                }],
            })
            .await;
        catalog
            .insert(IdeaConfig {
                id: IdeaId::from("idea-empty"),
                personas: vec![],
            })
            .await;

        let scheduler = JobScheduler::new(
            store.clone(),
            catalog,
            SchedulerConfig {
                posts_per_combination: posts,
            },
        );
        (store, scheduler)
    }

    #[tokio::test]
    async fn test_creates_full_cartesian_product() {
        let (store, scheduler) = fixture(7).await;

        let outcome = scheduler
            .create_jobs_for_idea(&IdeaId::from("idea-1"), CreateJobsOptions::default())
            .await
            .unwrap();

        // 1 persona x 2 countries x 7 posts
        assert_eq!(outcome.jobs_created, 14);
        assert_eq!(outcome.combinations, 14);
        assert_eq!(outcome.skipped(), 0);
        assert_eq!(store.len().await, 14);

        let queued = store
            .list(&JobFilter::by_status(RenderStatus::Queued))
            .await
            .unwrap();
        assert_eq!(queued.len(), 14);

        // Every job shares the batch
        assert!(outcome
            .jobs
            .iter()
            .all(|j| j.batch_id.as_ref() == Some(&outcome.batch_id)));
    }

    #[tokio::test]
    async fn test_second_call_skips_every_existing_combination() {
        let (store, scheduler) = fixture(7).await;
        let idea = IdeaId::from("idea-1");

        scheduler
            .create_jobs_for_idea(&idea, CreateJobsOptions::default())
            .await
            .unwrap();
        let second = scheduler
            .create_jobs_for_idea(&idea, CreateJobsOptions::default())
            .await
            .unwrap();

        assert_eq!(second.jobs_created, 0);
        assert_eq!(second.skipped(), 14);
        assert_eq!(store.len().await, 14);
    }

    #[tokio::test]
    async fn test_force_always_creates_alongside_existing_jobs() {
        let (store, scheduler) = fixture(2).await;
        let idea = IdeaId::from("idea-1");

        scheduler
            .create_jobs_for_idea(&idea, CreateJobsOptions::default())
            .await
            .unwrap();
        let forced = scheduler
            .create_jobs_for_idea(
                &idea,
                CreateJobsOptions {
                    force: true,
                    ..CreateJobsOptions::default()
                },
            )
            .await
            .unwrap();

        // Exactly one new job per combination, prior jobs untouched
        assert_eq!(forced.jobs_created, 4);
        assert_eq!(store.len().await, 8);
    }

    #[tokio::test]
    async fn test_idea_without_personas_is_a_validation_error() {
        let (_, scheduler) = fixture(7).await;

        let err = scheduler
            .create_jobs_for_idea(&IdeaId::from("idea-empty"), CreateJobsOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_idea_is_not_found() {
        let (_, scheduler) = fixture(7).await;

        let err = scheduler
            .create_jobs_for_idea(&IdeaId::from("nope"), CreateJobsOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulerError::IdeaNotFound(_)));
    }

    #[tokio::test]
    async fn test_supplied_batch_id_is_used() {
        let (_, scheduler) = fixture(1).await;
        let batch = BatchId::from("batch-42");

        let outcome = scheduler
            .create_jobs_for_idea(
                &IdeaId::from("idea-1"),
                CreateJobsOptions {
                    batch_id: Some(batch.clone()),
                    ..CreateJobsOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.batch_id, batch);
    }
}
