//! Video compilation request/result types.
//!
//! These are transient values passed to the compiler, never persisted.

use serde::{Deserialize, Serialize};

use crate::id::{Country, IdeaId, Persona};

/// A single rendered slide frame, by slide number.
///
/// Frames are assembled in ascending `slide_number` order regardless of
/// the order they arrive in.
#[derive(Debug, Clone)]
pub struct SlideFrame {
    pub slide_number: u32,
    pub image: Vec<u8>,
}

/// A slide frame addressed by URL, for remote frame sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideFrameUrl {
    pub slide_number: u32,
    pub url: String,
}

/// Request to compile an ordered frame sequence into a vertical video.
#[derive(Debug, Clone)]
pub struct VideoCompileRequest {
    /// Routing: which idea this video belongs to
    pub idea_id: IdeaId,
    /// Routing: persona segment of the storage path
    pub persona: Persona,
    /// Routing: country segment of the storage path
    pub country: Country,
    /// Name of the uploaded file, e.g. `post-3.mp4`
    pub output_filename: String,
    /// How long each slide stays on screen
    pub seconds_per_slide: f64,
    /// Rendered frames, one per slide
    pub frames: Vec<SlideFrame>,
}

/// Same as [`VideoCompileRequest`] but with frames addressed by URL.
#[derive(Debug, Clone)]
pub struct VideoCompileUrlRequest {
    pub idea_id: IdeaId,
    pub persona: Persona,
    pub country: Country,
    pub output_filename: String,
    pub seconds_per_slide: f64,
    pub frames: Vec<SlideFrameUrl>,
}

impl VideoCompileUrlRequest {
    /// Convert into a byte-backed request once every frame is fetched.
    pub fn with_frames(self, frames: Vec<SlideFrame>) -> VideoCompileRequest {
        VideoCompileRequest {
            idea_id: self.idea_id,
            persona: self.persona,
            country: self.country,
            output_filename: self.output_filename,
            seconds_per_slide: self.seconds_per_slide,
            frames,
        }
    }
}

/// A successfully compiled and uploaded video.
///
/// A storage path is never produced without a successful upload; failures
/// surface as typed errors instead of a partial result.
#[derive(Debug, Clone)]
pub struct CompiledVideo {
    /// The encoded video bytes
    pub video: Vec<u8>,
    /// Object key the video was uploaded to
    pub storage_path: String,
    /// Public locator for the uploaded video
    pub public_url: String,
}
