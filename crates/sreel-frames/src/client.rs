//! Layout renderer HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use sreel_models::SlideFrame;

use crate::error::{FrameError, FrameResult};
use crate::source::FrameSource;
use crate::types::{RenderFramesRequest, SlideManifest, SlideSet};

/// Configuration for the renderer client.
#[derive(Debug, Clone)]
pub struct RendererClientConfig {
    /// Base URL of the layout renderer service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for RendererClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8100".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl RendererClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("LAYOUT_RENDERER_URL")
                .unwrap_or_else(|_| "http://localhost:8100".to_string()),
            timeout: Duration::from_secs(
                std::env::var("LAYOUT_RENDERER_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        }
    }
}

/// HTTP client for the layout renderer service.
pub struct RendererClient {
    http: Client,
    config: RendererClientConfig,
}

impl RendererClient {
    /// Create a new renderer client.
    pub fn new(config: RendererClientConfig) -> FrameResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FrameError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> FrameResult<Self> {
        Self::new(RendererClientConfig::from_env())
    }

    /// Ask the renderer for the slide manifest of one unit of work.
    async fn fetch_manifest(&self, request: &RenderFramesRequest) -> FrameResult<SlideManifest> {
        let url = format!("{}/render", self.config.base_url);
        debug!(
            "Requesting slide manifest from {} for {}:{}:{}:{}",
            url, request.idea_id, request.persona, request.country, request.post_index
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(FrameError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FrameError::request_failed(format!(
                "renderer returned {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Download one composed frame.
    async fn fetch_frame(&self, slide_number: u32, url: &str) -> FrameResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FrameError::download_failed(slide_number, e.to_string()))?;

        if !response.status().is_success() {
            return Err(FrameError::download_failed(
                slide_number,
                format!("HTTP {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FrameError::download_failed(slide_number, e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FrameSource for RendererClient {
    async fn render_frames(&self, request: &RenderFramesRequest) -> FrameResult<SlideSet> {
        let manifest = self.fetch_manifest(request).await?;
        if manifest.frames.is_empty() {
            return Err(FrameError::InvalidResponse(
                "renderer returned an empty slide manifest".to_string(),
            ));
        }

        // Sequential fetch; the first failure aborts the whole set.
        let mut frames = Vec::with_capacity(manifest.frames.len());
        for slide in &manifest.frames {
            let image = self.fetch_frame(slide.slide_number, &slide.url).await?;
            frames.push(SlideFrame {
                slide_number: slide.slide_number,
                image,
            });
        }

        Ok(SlideSet {
            seconds_per_slide: manifest.seconds_per_slide,
            frames,
        })
    }
}
