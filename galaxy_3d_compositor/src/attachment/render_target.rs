/// Render target: an attachment image bound for one frame.
///
/// Handed out by `AttachmentCache::create_render_targets()`, bound to each
/// pass's `RenderContext`, and given back to the cache at end of frame.
/// Targets wrapping a backbuffer are never tracked by the cache.

use crate::device::ImageHandle;
use crate::error::Result;
use crate::engine_bail;
use super::attachment_format::{AttachmentFormat, ClearValue, LoadOp, StoreOp};
use super::image::ImageDescription;

/// Where the image of a render target comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetOrigin {
    /// Pooled image owned by the attachment cache (physical slot index)
    Cache { slot: usize },
    /// Caller-supplied presentation image (index into the backbuffer list)
    Backbuffer { index: usize },
}

/// One bound attachment
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    image: ImageHandle,
    description: ImageDescription,
    format: AttachmentFormat,
    clear_value: ClearValue,
    load_op: LoadOp,
    store_op: StoreOp,
    resolve_target: Option<ImageHandle>,
    origin: TargetOrigin,
}

impl RenderTarget {
    pub(crate) fn new(
        image: ImageHandle,
        description: ImageDescription,
        format: AttachmentFormat,
        origin: TargetOrigin,
    ) -> Self {
        Self {
            image,
            description,
            format,
            clear_value: ClearValue::default_for(format.usage),
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            resolve_target: None,
            origin,
        }
    }

    pub(crate) fn with_ops(mut self, load_op: LoadOp, store_op: StoreOp) -> Self {
        self.load_op = load_op;
        self.store_op = store_op;
        self
    }

    /// Clear value already validated against the format by the pipeline compiler
    pub(crate) fn with_clear_value(mut self, clear_value: ClearValue) -> Self {
        self.clear_value = clear_value;
        self
    }

    pub(crate) fn with_resolve_target(mut self, image: ImageHandle) -> Self {
        self.resolve_target = Some(image);
        self
    }

    /// Image rendered into
    pub fn image(&self) -> ImageHandle {
        self.image
    }

    /// Single-sample image the multisampled contents resolve to, if any
    pub fn resolve_target(&self) -> Option<ImageHandle> {
        self.resolve_target
    }

    /// Whether `image` is this target's image or its resolve target
    pub fn uses_image(&self, image: ImageHandle) -> bool {
        self.image == image || self.resolve_target == Some(image)
    }

    pub fn description(&self) -> &ImageDescription {
        &self.description
    }

    pub fn format(&self) -> &AttachmentFormat {
        &self.format
    }

    pub fn width(&self) -> u32 {
        self.description.width()
    }

    pub fn height(&self) -> u32 {
        self.description.height()
    }

    pub fn sample_count(&self) -> u32 {
        self.description.samples()
    }

    pub fn origin(&self) -> TargetOrigin {
        self.origin
    }

    /// True when the target renders straight into a backbuffer
    pub fn is_backbuffer(&self) -> bool {
        matches!(self.origin, TargetOrigin::Backbuffer { .. })
    }

    pub fn clear_value(&self) -> ClearValue {
        self.clear_value
    }

    pub fn load_op(&self) -> LoadOp {
        self.load_op
    }

    pub fn store_op(&self) -> StoreOp {
        self.store_op
    }

    /// Set the clear value.
    ///
    /// # Errors
    ///
    /// Rejects a color clear on a depth target and vice versa.
    pub fn set_clear_value(&mut self, clear_value: ClearValue) -> Result<()> {
        if !clear_value.matches(self.format.usage) {
            engine_bail!("galaxy3d::RenderTarget", InvalidResource =>
                "Clear value {:?} does not match {:?} attachment",
                clear_value, self.format.usage);
        }
        self.clear_value = clear_value;
        Ok(())
    }
}

#[cfg(test)]
#[path = "render_target_tests.rs"]
mod tests;
