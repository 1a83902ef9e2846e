//! End-to-end pipeline test: schedule an idea, run every job, reschedule.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use sreel_frames::{FrameResult, FrameSource, RenderFramesRequest, SlideSet};
use sreel_media::{CompilerConfig, VideoCompiler};
use sreel_models::{Country, IdeaConfig, IdeaId, Persona, PersonaConfig, RenderStatus, SlideFrame};
use sreel_scheduler::{CreateJobsOptions, JobScheduler, MemoryIdeaCatalog, SchedulerConfig};
use sreel_storage::{MemoryStorage, ObjectStorage};
use sreel_store::{JobFilter, JobStore, MemoryJobStore};
use sreel_worker::{JobExecutor, WorkerConfig};

struct StubFrames;

#[async_trait]
impl FrameSource for StubFrames {
    async fn render_frames(&self, request: &RenderFramesRequest) -> FrameResult<SlideSet> {
        Ok(SlideSet {
            seconds_per_slide: 4.0,
            frames: (1..=5)
                .map(|n| SlideFrame {
                    slide_number: n,
                    image: vec![request.post_index; 8],
                })
                .collect(),
        })
    }
}

fn write_stub_encoder(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = "#!/bin/sh\nout=\"\"\nfor a in \"$@\"; do out=\"$a\"; done\nprintf 'encoded-video' > \"$out\"\n";
    let bin = dir.join("stub-ffmpeg");
    std::fs::write(&bin, script).unwrap();
    let mut perms = std::fs::metadata(&bin).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&bin, perms).unwrap();
    bin
}

#[tokio::test]
async fn test_schedule_run_and_reschedule_an_idea() {
    let tools = tempfile::tempdir().unwrap();
    let encoder = write_stub_encoder(tools.path());

    let store: Arc<MemoryJobStore> = Arc::new(MemoryJobStore::new());
    let storage = Arc::new(MemoryStorage::new());

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

    let scheduler = JobScheduler::new(
        store.clone(),
        catalog,
        SchedulerConfig {
            posts_per_combination: 7,
        },
    );
    let executor = JobExecutor::new(
        store.clone(),
        Arc::new(StubFrames),
        Arc::new(VideoCompiler::new(
            storage.clone(),
            CompilerConfig {
                ffmpeg_binary: encoder.to_string_lossy().to_string(),
                work_root: Some(tools.path().join("work")),
                ..CompilerConfig::default()
            },
        )),
        WorkerConfig {
            job_timeout: Duration::from_secs(60),
        },
    );

    // 1 persona x 2 countries x 7 posts = 14 queued jobs
    let idea = IdeaId::from("idea-1");
    let outcome = scheduler
        .create_jobs_for_idea(&idea, CreateJobsOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome.jobs_created, 14);
    let queued = store
        .list(&JobFilter::by_status(RenderStatus::Queued))
        .await
        .unwrap();
    assert_eq!(queued.len(), 14);

    // Run everything; each job ends terminal independently
    let processed = executor.run_jobs(None).await.unwrap();
    assert_eq!(processed.len(), 14);
    assert!(processed
        .iter()
        .all(|job| job.status == RenderStatus::Complete));
    assert!(processed.iter().all(|job| job.output_url.is_some()));

    // One uploaded video per job
    assert_eq!(storage.len().await, 14);
    assert!(storage
        .exists("videos/idea-1/founder-de/post-7.mp4")
        .await
        .unwrap());

    // Rescheduling without force creates nothing new
    let again = scheduler
        .create_jobs_for_idea(&idea, CreateJobsOptions::default())
        .await
        .unwrap();
    assert_eq!(again.jobs_created, 0);
    assert_eq!(again.skipped(), 14);

    // The scratch area is empty once every compile has finished
    let leftovers = std::fs::read_dir(tools.path().join("work"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}
