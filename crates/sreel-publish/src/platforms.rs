//! Per-platform publisher variants.
//!
//! No platform account is wired up in this backend; each publisher
//! reports itself as not configured so the API surface stays honest about
//! what posting would do.

use async_trait::async_trait;
use tracing::info;

use crate::publisher::{Platform, PublishOutcome, PublishRequest, Publisher};

/// TikTok publisher. Integration not configured.
#[derive(Debug, Default)]
pub struct TikTokPublisher;

#[async_trait]
impl Publisher for TikTokPublisher {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    async fn publish(&self, request: &PublishRequest) -> PublishOutcome {
        info!(
            video_url = %request.video_url,
            country = %request.country,
            "TikTok publishing requested but not configured"
        );
        PublishOutcome::NotConfigured {
            platform: Platform::TikTok,
        }
    }
}

/// Instagram Reels publisher. Integration not configured.
#[derive(Debug, Default)]
pub struct InstagramPublisher;

#[async_trait]
impl Publisher for InstagramPublisher {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn publish(&self, request: &PublishRequest) -> PublishOutcome {
        info!(
            video_url = %request.video_url,
            country = %request.country,
            "Instagram publishing requested but not configured"
        );
        PublishOutcome::NotConfigured {
            platform: Platform::Instagram,
        }
    }
}

/// Look up the publisher for a platform.
pub fn publisher_for(platform: Platform) -> Box<dyn Publisher> {
    match platform {
        Platform::TikTok => Box::new(TikTokPublisher),
        Platform::Instagram => Box::new(InstagramPublisher),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sreel_models::Country;

    fn request() -> PublishRequest {
        PublishRequest {
            video_url: "https://cdn.example.com/v.mp4".to_string(),
            caption: "hello".to_string(),
            country: Country::from("us"),
        }
    }

    #[tokio::test]
    async fn test_every_platform_reports_not_configured() {
        for platform in [Platform::TikTok, Platform::Instagram] {
            let publisher = publisher_for(platform);
            assert_eq!(publisher.platform(), platform);

            match publisher.publish(&request()).await {
                PublishOutcome::NotConfigured { platform: reported } => {
                    assert_eq!(reported, platform)
                }
                other => panic!("expected NotConfigured, got {other:?}"),
            }
        }
    }
}
