//! The publishing contract.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sreel_models::Country;

/// Supported target platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[serde(rename = "tiktok")]
    TikTok,
    Instagram,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
        }
    }

    /// Parse a platform name as it appears in API requests.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tiktok" => Some(Platform::TikTok),
            "instagram" => Some(Platform::Instagram),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    /// Public URL of the rendered video
    pub video_url: String,
    /// Caption text
    pub caption: String,
    /// Target country the post is localized for
    pub country: Country,
}

/// Result of a publish attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// The post went out
    Posted { post_url: String },
    /// No credentials/integration configured for the platform
    NotConfigured { platform: Platform },
}

impl PublishOutcome {
    pub fn is_posted(&self) -> bool {
        matches!(self, PublishOutcome::Posted { .. })
    }
}

/// A platform-specific publishing capability.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Which platform this publisher targets.
    fn platform(&self) -> Platform;

    /// Attempt to publish; an unconfigured integration is a value, not an
    /// error.
    async fn publish(&self, request: &PublishRequest) -> PublishOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse_round_trip() {
        assert_eq!(Platform::parse("tiktok"), Some(Platform::TikTok));
        assert_eq!(Platform::parse("instagram"), Some(Platform::Instagram));
        assert_eq!(Platform::parse("myspace"), None);
        assert_eq!(Platform::parse(Platform::TikTok.as_str()), Some(Platform::TikTok));
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = PublishOutcome::NotConfigured {
            platform: Platform::TikTok,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "not_configured");
        assert_eq!(json["platform"], "tiktok");
    }
}
