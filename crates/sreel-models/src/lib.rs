//! Shared data models for the SlideReel backend.
//!
//! This crate provides Serde-serializable types for:
//! - Render jobs and their lifecycle states
//! - Idea configuration (persona x country combinations)
//! - Video compilation requests and results

pub mod compile;
pub mod id;
pub mod idea;
pub mod job;

// Re-export common types
pub use compile::{CompiledVideo, SlideFrame, SlideFrameUrl, VideoCompileRequest, VideoCompileUrlRequest};
pub use id::{BatchId, Country, IdeaId, JobId, Persona};
pub use idea::{IdeaConfig, PersonaConfig};
pub use job::{JobKey, JobPriority, RenderJob, RenderStatus};
