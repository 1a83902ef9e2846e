//! The frame source contract.

use async_trait::async_trait;

use crate::error::FrameResult;
use crate::types::{RenderFramesRequest, SlideSet};

/// Produces the ordered, already-composed slide frames for one unit of
/// rendering work. Layout composition itself is not this backend's
/// concern; implementations fetch the finished frames from wherever the
/// renderer put them.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn render_frames(&self, request: &RenderFramesRequest) -> FrameResult<SlideSet>;
}
