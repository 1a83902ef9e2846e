//! Slideshow video compiler.
//!
//! Turns an ordered frame sequence into an encoded 9:16 video and uploads
//! it. The compiler knows nothing about render jobs; the worker drives it
//! per phase.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tracing::{debug, info};

use sreel_models::{
    CompiledVideo, Country, IdeaId, Persona, SlideFrame, VideoCompileRequest,
    VideoCompileUrlRequest,
};
use sreel_storage::{video_key, ObjectStorage};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::concat::{frame_filename, sort_slides, ConcatDescriptor};
use crate::error::{MediaError, MediaResult};

/// Fixed encode parameters for the vertical slideshow output.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Encoder binary (name on PATH or explicit path)
    pub ffmpeg_binary: String,
    /// Output canvas width
    pub width: u32,
    /// Output canvas height
    pub height: u32,
    /// Constant output frame rate
    pub fps: u32,
    /// x264 constant rate factor
    pub crf: u8,
    /// x264 preset
    pub preset: String,
    /// Wall-clock ceiling for one encode
    pub encode_timeout: Duration,
    /// Parent directory for scratch workspaces; system temp when unset
    pub work_root: Option<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_binary: "ffmpeg".to_string(),
            width: 1080,
            height: 1920,
            fps: 30,
            crf: 23,
            preset: "medium".to_string(),
            encode_timeout: Duration::from_secs(600),
            work_root: None,
        }
    }
}

impl CompilerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ffmpeg_binary: std::env::var("FFMPEG_BINARY")
                .unwrap_or(defaults.ffmpeg_binary),
            encode_timeout: Duration::from_secs(
                std::env::var("ENCODE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            work_root: std::env::var("COMPILE_WORK_DIR").ok().map(PathBuf::from),
            ..defaults
        }
    }

    /// The scale-then-center-pad filter filling the portrait canvas.
    fn letterbox_filter(&self) -> String {
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
            w = self.width,
            h = self.height
        )
    }
}

/// Frame-sequence-to-video compiler.
pub struct VideoCompiler {
    storage: Arc<dyn ObjectStorage>,
    http: reqwest::Client,
    config: CompilerConfig,
}

impl VideoCompiler {
    /// Create a new compiler over the given storage backend.
    pub fn new(storage: Arc<dyn ObjectStorage>, config: CompilerConfig) -> Self {
        Self {
            storage,
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a frame sequence and upload the result.
    ///
    /// The scratch workspace is removed on every exit path; a failure at
    /// any step yields an error and never a storage path.
    pub async fn compile_video(&self, request: &VideoCompileRequest) -> MediaResult<CompiledVideo> {
        let video = self
            .encode_frames(&request.frames, request.seconds_per_slide)
            .await?;
        let (storage_path, public_url) = self
            .upload_video(
                &request.idea_id,
                &request.persona,
                &request.country,
                &request.output_filename,
                video.clone(),
            )
            .await?;

        Ok(CompiledVideo {
            video,
            storage_path,
            public_url,
        })
    }

    /// Fetch URL-addressed frames, then compile.
    ///
    /// Downloads run sequentially; the first failure returns immediately
    /// without invoking the encoder or fetching further slides.
    pub async fn compile_video_from_urls(
        &self,
        request: VideoCompileUrlRequest,
    ) -> MediaResult<CompiledVideo> {
        let mut frames = Vec::with_capacity(request.frames.len());
        for slide in &request.frames {
            let image = self.download_frame(slide.slide_number, &slide.url).await?;
            frames.push(SlideFrame {
                slide_number: slide.slide_number,
                image,
            });
        }

        let request = request.with_frames(frames);
        self.compile_video(&request).await
    }

    /// Encode a frame sequence into video bytes.
    ///
    /// Frames are staged in a fresh scratch workspace in ascending slide
    /// order, the concat descriptor is written next to them, and the
    /// encoder runs with the fixed portrait parameters. The workspace is a
    /// scoped resource: it is deleted when this function returns, whatever
    /// the outcome (cleanup failures are swallowed by the tempdir guard).
    pub async fn encode_frames(
        &self,
        frames: &[SlideFrame],
        seconds_per_slide: f64,
    ) -> MediaResult<Vec<u8>> {
        if seconds_per_slide <= 0.0 {
            return Err(MediaError::invalid_request(format!(
                "seconds_per_slide must be positive, got {}",
                seconds_per_slide
            )));
        }
        let descriptor = ConcatDescriptor::for_slides(frames, seconds_per_slide)
            .ok_or_else(|| MediaError::invalid_request("no frames to compile"))?;

        let scratch = self.scratch_workspace()?;
        debug!("Staging {} frames in {:?}", frames.len(), scratch.path());

        for frame in sort_slides(frames) {
            let path = scratch.path().join(frame_filename(frame.slide_number));
            tokio::fs::write(&path, &frame.image).await?;
        }

        let list_path = scratch.path().join("frames.ffconcat");
        tokio::fs::write(&list_path, descriptor.to_script()).await?;

        let output_path = scratch.path().join("output.mp4");
        let cmd = FfmpegCommand::new(&list_path, &output_path)
            .input_args(["-f", "concat", "-safe", "0"])
            .video_filter(self.config.letterbox_filter())
            .frame_rate(self.config.fps)
            .video_codec("libx264")
            .crf(self.config.crf)
            .preset(self.config.preset.clone())
            .pixel_format("yuv420p")
            .faststart();

        FfmpegRunner::new(&self.config.ffmpeg_binary)
            .with_timeout(self.config.encode_timeout.as_secs())
            .run(&cmd)
            .await?;

        let video = tokio::fs::read(&output_path).await?;
        info!(
            "Encoded {} frames into {} bytes",
            frames.len(),
            video.len()
        );
        Ok(video)
    }

    /// Upload an encoded video and resolve its public locator.
    pub async fn upload_video(
        &self,
        idea_id: &IdeaId,
        persona: &Persona,
        country: &Country,
        filename: &str,
        video: Vec<u8>,
    ) -> MediaResult<(String, String)> {
        let key = video_key(idea_id, persona, country, filename);
        self.storage.upload(&key, video, "video/mp4").await?;
        let public_url = self.storage.public_url(&key);
        info!("Uploaded video to {}", key);
        Ok((key, public_url))
    }

    async fn download_frame(&self, slide_number: u32, url: &str) -> MediaResult<Vec<u8>> {
        debug!("Downloading slide {} from {}", slide_number, url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::download_failed(slide_number, e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::download_failed(
                slide_number,
                format!("HTTP {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::download_failed(slide_number, e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn scratch_workspace(&self) -> MediaResult<TempDir> {
        match &self.config.work_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                Ok(TempDir::with_prefix_in("compile-", root)?)
            }
            None => Ok(TempDir::with_prefix("sreel-compile-")?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use sreel_models::SlideFrameUrl;
    use sreel_storage::MemoryStorage;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn frame(slide_number: u32) -> SlideFrame {
        SlideFrame {
            slide_number,
            image: vec![0u8; 16],
        }
    }

    fn request(frames: Vec<SlideFrame>) -> VideoCompileRequest {
        VideoCompileRequest {
            idea_id: IdeaId::from("idea-1"),
            persona: Persona::from("founder"),
            country: Country::from("us"),
            output_filename: "post-1.mp4".to_string(),
            seconds_per_slide: 4.0,
            frames,
        }
    }

    /// Stand-in encoder: writes marker bytes to the output path (the last
    /// argument), like a successful FFmpeg run would.
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

    fn scratch_entries(work_root: &Path) -> usize {
        std::fs::read_dir(work_root).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_compile_video_uploads_and_cleans_scratch() {
        let tools = tempfile::tempdir().unwrap();
        let work_root = tools.path().join("work");
        let encoder = write_stub_encoder(tools.path());

        let storage = Arc::new(MemoryStorage::new());
        let compiler = VideoCompiler::new(
            storage.clone(),
            CompilerConfig {
                ffmpeg_binary: encoder.to_string_lossy().to_string(),
                work_root: Some(work_root.clone()),
                ..CompilerConfig::default()
            },
        );

        let result = compiler
            .compile_video(&request(vec![frame(1), frame(2), frame(3)]))
            .await
            .unwrap();

        assert_eq!(result.video, b"encoded-video");
        assert_eq!(result.storage_path, "videos/idea-1/founder-us/post-1.mp4");
        assert_eq!(
            result.public_url,
            "memory://bucket/videos/idea-1/founder-us/post-1.mp4"
        );
        assert!(storage.exists(&result.storage_path).await.unwrap());

        // Scratch workspace gone after success
        assert_eq!(scratch_entries(&work_root), 0);
    }

    #[tokio::test]
    async fn test_scratch_cleaned_after_encoder_failure() {
        let tools = tempfile::tempdir().unwrap();
        let work_root = tools.path().join("work");

        let storage = Arc::new(MemoryStorage::new());
        let compiler = VideoCompiler::new(
            storage.clone(),
            CompilerConfig {
                ffmpeg_binary: "sreel-no-such-encoder".to_string(),
                work_root: Some(work_root.clone()),
                ..CompilerConfig::default()
            },
        );

        let err = compiler
            .compile_video(&request(vec![frame(1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::EncoderNotFound(_)));

        // Scratch workspace gone after failure, nothing uploaded
        assert_eq!(scratch_entries(&work_root), 0);
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_frame_set_is_rejected() {
        let compiler = VideoCompiler::new(
            Arc::new(MemoryStorage::new()),
            CompilerConfig::default(),
        );
        let err = compiler.compile_video(&request(vec![])).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_url_download_short_circuits_on_first_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slides/1.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 8]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slides/2.png"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        // Slide 3 must never be fetched once slide 2 fails
        Mock::given(method("GET"))
            .and(path("/slides/3.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![3u8; 8]))
            .expect(0)
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        let compiler = VideoCompiler::new(
            storage.clone(),
            CompilerConfig {
                ffmpeg_binary: "sreel-no-such-encoder".to_string(),
                ..CompilerConfig::default()
            },
        );

        let url_request = VideoCompileUrlRequest {
            idea_id: IdeaId::from("idea-1"),
            persona: Persona::from("founder"),
            country: Country::from("us"),
            output_filename: "post-1.mp4".to_string(),
            seconds_per_slide: 4.0,
            frames: (1..=3)
                .map(|n| SlideFrameUrl {
                    slide_number: n,
                    url: format!("{}/slides/{}.png", server.uri(), n),
                })
                .collect(),
        };

        let err = compiler
            .compile_video_from_urls(url_request)
            .await
            .unwrap_err();

        match &err {
            MediaError::DownloadFailed { slide_number, .. } => assert_eq!(*slide_number, 2),
            other => panic!("expected DownloadFailed, got {other:?}"),
        }
        assert!(err.to_string().starts_with("failed to download slide 2"));

        // Encoder never ran, nothing uploaded
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_encode_timeout_kills_encoder() {
        use std::os::unix::fs::PermissionsExt;

        let tools = tempfile::tempdir().unwrap();
        let bin = tools.path().join("slow-ffmpeg");
        std::fs::write(&bin, "#!/bin/sh\nsleep 10\n").unwrap();
        let mut perms = std::fs::metadata(&bin).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&bin, perms).unwrap();

        let compiler = VideoCompiler::new(
            Arc::new(MemoryStorage::new()),
            CompilerConfig {
                ffmpeg_binary: bin.to_string_lossy().to_string(),
                encode_timeout: Duration::from_secs(1),
                work_root: Some(tools.path().join("work")),
                ..CompilerConfig::default()
            },
        );

        let err = compiler
            .compile_video(&request(vec![frame(1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Timeout(1)));
    }
}
