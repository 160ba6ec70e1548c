/// Render targets of one frame of one pipeline.

use crate::device::ImageHandle;
use crate::pipeline::PipelineId;
use super::attachment_cache::{Lease, RendererId};
use super::image::Extent2D;
use super::render_target::RenderTarget;

/// Every render target a pipeline needs for one frame.
///
/// `slots` holds one target per physical slot of the pipeline layout;
/// `passes` holds, per pass, the targets bound to that pass with the pass's
/// own load/store ops and clear values.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTargets {
    pipeline: PipelineId,
    renderer: RendererId,
    extent: Extent2D,
    sample_count: u32,
    slots: Vec<RenderTarget>,
    passes: Vec<Vec<RenderTarget>>,
    leases: Vec<Lease>,
}

impl FrameTargets {
    pub(crate) fn new(
        pipeline: PipelineId,
        renderer: RendererId,
        extent: Extent2D,
        sample_count: u32,
        slots: Vec<RenderTarget>,
        passes: Vec<Vec<RenderTarget>>,
        leases: Vec<Lease>,
    ) -> Self {
        Self { pipeline, renderer, extent, sample_count, slots, passes, leases }
    }

    pub fn pipeline_id(&self) -> PipelineId {
        self.pipeline
    }

    pub fn renderer(&self) -> RendererId {
        self.renderer
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    /// Effective sample count of the frame
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Targets bound to pass `index` (empty for an unknown pass)
    pub fn pass(&self, index: usize) -> &[RenderTarget] {
        self.passes.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable targets of a pass, e.g. to change a clear color for this frame
    pub fn pass_mut(&mut self, index: usize) -> Option<&mut [RenderTarget]> {
        self.passes.get_mut(index).map(Vec::as_mut_slice)
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Target of physical slot `index`
    pub fn slot(&self, index: usize) -> Option<&RenderTarget> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[RenderTarget] {
        &self.slots
    }

    /// Image a later pass samples for slot `index` (resolve image when present)
    pub fn sampled_image(&self, index: usize) -> Option<ImageHandle> {
        self.slots
            .get(index)
            .map(|t| t.resolve_target().unwrap_or(t.image()))
    }

    /// Whether `image` backs any target of the frame
    pub fn contains_image(&self, image: ImageHandle) -> bool {
        self.slots.iter().any(|t| t.uses_image(image))
    }

    pub(crate) fn leases(&self) -> &[Lease] {
        &self.leases
    }
}
