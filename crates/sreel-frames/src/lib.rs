//! Layout/frame source collaborator.
//!
//! The layout renderer is an external service that composes slide images
//! for a `(idea, persona, country, post_index)` unit of work. This crate
//! provides the [`FrameSource`] contract the executor consumes and an HTTP
//! client implementation against the renderer service.

pub mod client;
pub mod error;
pub mod source;
pub mod types;

pub use client::{RendererClient, RendererClientConfig};
pub use error::{FrameError, FrameResult};
pub use source::FrameSource;
pub use types::{RenderFramesRequest, SlideManifest, SlideSet};
