//! Render job row and lifecycle states.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{BatchId, Country, IdeaId, JobId, Persona};

/// Lifecycle state of a render job.
///
/// Forward execution moves `queued -> generating -> encoding -> uploading
/// -> complete`. `failed` is reachable from any non-terminal state. Both
/// terminal states accept an explicit retry back to `queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    /// Waiting for an executor
    #[default]
    Queued,
    /// Slide frames are being produced
    Generating,
    /// Frames are being assembled into a video
    Encoding,
    /// Encoded video is being uploaded
    Uploading,
    /// Video uploaded, output URL available
    Complete,
    /// Job failed, error message available
    Failed,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::Queued => "queued",
            RenderStatus::Generating => "generating",
            RenderStatus::Encoding => "encoding",
            RenderStatus::Uploading => "uploading",
            RenderStatus::Complete => "complete",
            RenderStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RenderStatus::Complete | RenderStatus::Failed)
    }

    /// States in which the compiler may still be holding resources.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            RenderStatus::Generating | RenderStatus::Encoding | RenderStatus::Uploading
        )
    }

    /// Only terminal jobs may be sent back to the queue.
    pub fn can_retry(&self) -> bool {
        self.is_terminal()
    }

    /// In-flight jobs must never be deleted out from under the compiler.
    pub fn can_delete(&self) -> bool {
        !self.is_in_flight()
    }
}

impl fmt::Display for RenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Advisory ordering hint for executors; not enforced by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    High,
    #[default]
    Normal,
    Low,
}

impl JobPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPriority::High => "high",
            JobPriority::Normal => "normal",
            JobPriority::Low => "low",
        }
    }

    /// Sort key: lower runs first.
    pub fn rank(&self) -> u8 {
        match self {
            JobPriority::High => 0,
            JobPriority::Normal => 1,
            JobPriority::Low => 2,
        }
    }
}

impl fmt::Display for JobPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Natural key identifying a unique unit of rendering work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub idea_id: IdeaId,
    pub persona: Persona,
    pub country: Country,
    pub post_index: u8,
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.idea_id, self.persona, self.country, self.post_index
        )
    }
}

/// A persisted render job row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJob {
    /// Unique job ID, assigned at creation, immutable
    pub id: JobId,

    /// Idea this job renders content for
    pub idea_id: IdeaId,

    /// Persona type
    pub persona: Persona,

    /// Target country
    pub country: Country,

    /// Post index within the (idea, persona, country) combination
    pub post_index: u8,

    /// Lifecycle state
    #[serde(default)]
    pub status: RenderStatus,

    /// Advisory priority
    #[serde(default)]
    pub priority: JobPriority,

    /// Batch this job was created in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<BatchId>,

    /// Error message (present only when failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Public output URL (present only when complete)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, bumped on every status mutation
    pub updated_at: DateTime<Utc>,
}

impl RenderJob {
    /// Create a new queued job.
    pub fn new(
        idea_id: IdeaId,
        persona: Persona,
        country: Country,
        post_index: u8,
        priority: JobPriority,
        batch_id: Option<BatchId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            idea_id,
            persona,
            country,
            post_index,
            status: RenderStatus::Queued,
            priority,
            batch_id,
            error_message: None,
            output_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The natural key `(idea, persona, country, post_index)`.
    pub fn key(&self) -> JobKey {
        JobKey {
            idea_id: self.idea_id.clone(),
            persona: self.persona.clone(),
            country: self.country.clone(),
            post_index: self.post_index,
        }
    }

    /// Default output filename for this job's video.
    pub fn output_filename(&self) -> String {
        format!("post-{}.mp4", self.post_index)
    }
}
