//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use sreel_frames::RendererClient;
use sreel_media::{CompilerConfig, VideoCompiler};
use sreel_scheduler::{JobScheduler, MemoryIdeaCatalog, SchedulerConfig};
use sreel_storage::{MemoryStorage, ObjectStorage, R2Client};
use sreel_store::{JobStore, MemoryJobStore, RedisJobStore};
use sreel_worker::{JobExecutor, WorkerConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn JobStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub scheduler: Arc<JobScheduler>,
    pub executor: Arc<JobExecutor>,
}

impl AppState {
    /// Create new application state, wiring every collaborator explicitly.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let storage: Arc<dyn ObjectStorage> = match backend("STORAGE_BACKEND").as_str() {
            "memory" => {
                warn!("Using in-memory object storage; uploads will not survive restarts");
                Arc::new(MemoryStorage::new())
            }
            _ => Arc::new(R2Client::from_env().await?),
        };

        let store: Arc<dyn JobStore> = match backend("JOB_STORE_BACKEND").as_str() {
            "memory" => {
                warn!("Using in-memory job store; jobs will not survive restarts");
                Arc::new(MemoryJobStore::new())
            }
            _ => Arc::new(RedisJobStore::from_env()?),
        };

        let catalog = match std::env::var("IDEA_CATALOG_PATH") {
            Ok(path) => {
                info!("Loading idea catalog from {}", path);
                Arc::new(MemoryIdeaCatalog::from_json_file(&path)?)
            }
            Err(_) => {
                warn!("IDEA_CATALOG_PATH not set; starting with an empty idea catalog");
                Arc::new(MemoryIdeaCatalog::new())
            }
        };

        let compiler = Arc::new(VideoCompiler::new(
            storage.clone(),
            CompilerConfig::from_env(),
        ));
        let frames = Arc::new(RendererClient::from_env()?);

        let scheduler = Arc::new(JobScheduler::new(
            store.clone(),
            catalog,
            SchedulerConfig::from_env(),
        ));
        let executor = Arc::new(JobExecutor::new(
            store.clone(),
            frames,
            compiler,
            WorkerConfig::from_env(),
        ));

        Ok(Self {
            config,
            store,
            storage,
            scheduler,
            executor,
        })
    }
}

fn backend(var: &str) -> String {
    std::env::var(var).unwrap_or_default().to_lowercase()
}
