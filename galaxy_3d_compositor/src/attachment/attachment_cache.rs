/// Attachment cache: pooled attachment images reused across frames.
///
/// Images are cached per (pipeline, renderer, physical slot). A frame asks
/// for its targets with `create_render_targets()` and hands them back with
/// `release_render_targets()`, along with the fence guarding the GPU work
/// that used them. An image is reused as long as its description still
/// matches; otherwise it is replaced and the old image is destroyed once
/// its fence has signalled (`collect_garbage()`).
///
/// Backbuffers are never owned: presentation slots wrap the caller's image,
/// or use a cached multisampled image that resolves into it.

use std::time::Duration;
use rustc_hash::FxHashMap;
use crate::device::{FenceHandle, GraphicsDevice, ImageHandle};
use crate::error::Result;
use crate::pipeline::{CompiledRenderPipeline, PipelineId, SlotKind};
use crate::utils::SlotAllocator;
use crate::{engine_bail, engine_debug, engine_err, engine_trace, engine_warn};
use super::attachment_format::AttachmentFormat;
use super::frame_targets::FrameTargets;
use super::image::{Extent2D, ImageDescription, ImageUsage};
use super::render_target::{RenderTarget, TargetOrigin};

/// Identity of a registered renderer (window, offscreen view, editor viewport...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererId(u32);

impl RendererId {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pipeline: PipelineId,
    renderer: RendererId,
    slot: usize,
}

/// One cached image handed out to one frame.
///
/// The token is unique for the lifetime of the cache, so a frame released
/// after its renderer id was recycled never touches the new owner's images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Lease {
    key: CacheKey,
    token: u64,
}

#[derive(Debug)]
struct CachedImage {
    image: ImageHandle,
    description: ImageDescription,
    /// Fence of the last submission that used the image
    last_fence: Option<FenceHandle>,
    /// Token of the frame holding the image, if any
    lease: Option<u64>,
}

/// Evicted image waiting to be destroyed
#[derive(Debug)]
struct PendingDestroy {
    image: ImageHandle,
    fence: Option<FenceHandle>,
    /// Evicted while leased: token of the frame not released yet
    lease: Option<u64>,
}

/// Counters reported by `AttachmentCache::stats()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttachmentCacheStats {
    /// Images created
    pub allocations: u64,
    /// Cached images handed out again
    pub reuses: u64,
    /// Cached images replaced or dropped
    pub evictions: u64,
    /// Images destroyed on the device
    pub destroyed: u64,
    /// Images currently cached
    pub cached_images: usize,
    /// Evicted images waiting for their fence
    pub pending_destruction: usize,
}

pub struct AttachmentCache {
    entries: FxHashMap<CacheKey, CachedImage>,
    garbage: Vec<PendingDestroy>,
    renderers: SlotAllocator,
    reclaim_timeout: Duration,
    next_lease: u64,
    stats: AttachmentCacheStats,
}

impl AttachmentCache {
    /// Create an empty cache. `reclaim_timeout` bounds the wait for an
    /// image still used by in-flight GPU work.
    pub fn new(reclaim_timeout: Duration) -> Self {
        Self {
            entries: FxHashMap::default(),
            garbage: Vec::new(),
            renderers: SlotAllocator::new(),
            reclaim_timeout,
            next_lease: 0,
            stats: AttachmentCacheStats::default(),
        }
    }

    // ===== RENDERERS =====

    pub fn register_renderer(&mut self) -> RendererId {
        RendererId(self.renderers.alloc())
    }

    /// Forget a renderer; its cached images are destroyed once their fences signal.
    ///
    /// Returns false if the renderer is not registered.
    pub fn unregister_renderer(&mut self, renderer: RendererId) -> bool {
        if !self.renderers.free(renderer.0) {
            return false;
        }
        self.evict_where(|key| key.renderer == renderer);
        true
    }

    pub fn is_registered(&self, renderer: RendererId) -> bool {
        self.renderers.is_allocated(renderer.0)
    }

    /// Drop the images cached for a pipeline that will not be executed again
    pub fn evict_pipeline(&mut self, pipeline: PipelineId) -> usize {
        self.evict_where(|key| key.pipeline == pipeline)
    }

    // ===== FRAME TARGETS =====

    /// Build the render targets of one frame.
    ///
    /// # Errors
    ///
    /// * `InvalidResource` if the renderer is not registered, the size is
    ///   zero, the backbuffer count differs from the pipeline's presentation
    ///   count, or the targets of this frame are still leased.
    /// * `ResourceExhausted` if a cached image stays busy past the reclaim timeout.
    /// * Device errors from image creation.
    ///
    /// On error nothing stays leased.
    pub fn create_render_targets(
        &mut self,
        pipeline: &CompiledRenderPipeline,
        renderer: RendererId,
        size: Extent2D,
        sample_count: u32,
        backbuffers: &[ImageHandle],
        device: &dyn GraphicsDevice,
    ) -> Result<FrameTargets> {
        if !self.is_registered(renderer) {
            engine_bail!("galaxy3d::AttachmentCache", InvalidResource =>
                "Renderer {} is not registered", renderer.0);
        }
        if !size.is_valid() {
            engine_bail!("galaxy3d::AttachmentCache", InvalidResource =>
                "Invalid backbuffer size {}x{}", size.width, size.height);
        }
        let layout = pipeline.layout();
        if backbuffers.len() != layout.presentation_count() {
            engine_bail!("galaxy3d::AttachmentCache", InvalidResource =>
                "Pipeline '{}' expects {} backbuffer(s), got {}",
                pipeline.name(), layout.presentation_count(), backbuffers.len());
        }

        let samples = effective_sample_count(pipeline, sample_count, device);
        let mut leases = Vec::new();

        match self.acquire_slots(pipeline, renderer, size, samples, backbuffers, device, &mut leases) {
            Ok(slots) => {
                let passes = layout
                    .passes()
                    .iter()
                    .map(|pass| {
                        pass.attachments
                            .iter()
                            .map(|binding| {
                                slots[binding.slot]
                                    .clone()
                                    .with_ops(binding.load_op, binding.store_op)
                                    .with_clear_value(binding.clear_value)
                            })
                            .collect()
                    })
                    .collect();

                engine_trace!("galaxy3d::AttachmentCache",
                    "Targets for '{}' (renderer {}): {}x{} {}x, {} cached image(s)",
                    pipeline.name(), renderer.0, size.width, size.height, samples, leases.len());

                Ok(FrameTargets::new(pipeline.id(), renderer, size, samples, slots, passes, leases))
            }
            Err(e) => {
                self.return_leases(&leases, None);
                Err(e)
            }
        }
    }

    /// Give a frame's targets back to the cache.
    ///
    /// `fence` guards the GPU work that used them; `None` (aborted frame,
    /// nothing submitted) releases them as they were.
    pub fn release_render_targets(&mut self, targets: &FrameTargets, fence: Option<FenceHandle>) {
        self.return_leases(targets.leases(), fence);
    }

    /// Destroy evicted images whose fence has signalled. Returns how many were destroyed.
    pub fn collect_garbage(&mut self, device: &dyn GraphicsDevice) -> usize {
        let before = self.garbage.len();
        self.garbage.retain(|pending| {
            let idle = pending.lease.is_none()
                && pending.fence.map_or(true, |f| device.is_fence_signalled(f));
            if idle {
                device.destroy_image(pending.image);
            }
            !idle
        });
        let destroyed = before - self.garbage.len();
        self.stats.destroyed += destroyed as u64;
        if destroyed > 0 {
            engine_debug!("galaxy3d::AttachmentCache", "Destroyed {} evicted image(s)", destroyed);
        }
        destroyed
    }

    /// Destroy every image immediately. The caller guarantees the device is idle.
    pub fn clear(&mut self, device: &dyn GraphicsDevice) {
        let mut destroyed = 0;
        for (_, entry) in self.entries.drain() {
            device.destroy_image(entry.image);
            destroyed += 1;
        }
        for pending in self.garbage.drain(..) {
            device.destroy_image(pending.image);
            destroyed += 1;
        }
        self.stats.destroyed += destroyed;
    }

    pub fn stats(&self) -> AttachmentCacheStats {
        AttachmentCacheStats {
            cached_images: self.entries.len(),
            pending_destruction: self.garbage.len(),
            ..self.stats
        }
    }

    pub fn reclaim_timeout(&self) -> Duration {
        self.reclaim_timeout
    }

    // ===== INTERNALS =====

    #[allow(clippy::too_many_arguments)]
    fn acquire_slots(
        &mut self,
        pipeline: &CompiledRenderPipeline,
        renderer: RendererId,
        size: Extent2D,
        samples: u32,
        backbuffers: &[ImageHandle],
        device: &dyn GraphicsDevice,
        leases: &mut Vec<Lease>,
    ) -> Result<Vec<RenderTarget>> {
        let layout = pipeline.layout();
        let mut slots = Vec::with_capacity(layout.slots().len());

        for (slot_index, slot) in layout.slots().iter().enumerate() {
            let description = attachment_description(size, &slot.format, samples);
            let key = CacheKey { pipeline: pipeline.id(), renderer, slot: slot_index };

            let target = match slot.kind {
                SlotKind::Presentation { index } if samples == 1 => RenderTarget::new(
                    backbuffers[index],
                    description,
                    slot.format,
                    TargetOrigin::Backbuffer { index },
                ),
                SlotKind::Presentation { index } => {
                    let (image, lease) = self.acquire(key, description, device)?;
                    leases.push(lease);
                    RenderTarget::new(image, description, slot.format, TargetOrigin::Cache { slot: slot_index })
                        .with_resolve_target(backbuffers[index])
                }
                SlotKind::Transient => {
                    let (image, lease) = self.acquire(key, description, device)?;
                    leases.push(lease);
                    RenderTarget::new(image, description, slot.format, TargetOrigin::Cache { slot: slot_index })
                }
            };
            slots.push(target);
        }

        Ok(slots)
    }

    /// Lease the cached image for `key`, replacing it if its description changed
    fn acquire(
        &mut self,
        key: CacheKey,
        description: ImageDescription,
        device: &dyn GraphicsDevice,
    ) -> Result<(ImageHandle, Lease)> {
        self.next_lease += 1;
        let lease = Lease { key, token: self.next_lease };

        if let Some(entry) = self.entries.get_mut(&key) {
            if entry.lease.is_some() {
                engine_bail!("galaxy3d::AttachmentCache", InvalidResource =>
                    "Attachment slot {} of renderer {} is still leased by an unreleased frame",
                    key.slot, key.renderer.0);
            }

            if entry.description == description {
                if let Some(fence) = entry.last_fence {
                    if !device.wait_for_fence(fence, self.reclaim_timeout) {
                        return Err(engine_err!("galaxy3d::AttachmentCache", ResourceExhausted =>
                            "Attachment slot {} still in use after {:?}", key.slot, self.reclaim_timeout));
                    }
                }
                entry.last_fence = None;
                entry.lease = Some(lease.token);
                self.stats.reuses += 1;
                return Ok((entry.image, lease));
            }
        }

        if let Some(old) = self.entries.remove(&key) {
            engine_debug!("galaxy3d::AttachmentCache",
                "Slot {} changed ({}x{} -> {}x{}), replacing image",
                key.slot, old.description.width(), old.description.height(),
                description.width(), description.height());
            self.garbage.push(PendingDestroy { image: old.image, fence: old.last_fence, lease: None });
            self.stats.evictions += 1;
        }

        let image = device.create_image(&description)?;
        self.stats.allocations += 1;
        self.entries.insert(key, CachedImage {
            image,
            description,
            last_fence: None,
            lease: Some(lease.token),
        });
        Ok((image, lease))
    }

    fn return_leases(&mut self, leases: &[Lease], fence: Option<FenceHandle>) {
        for lease in leases {
            if let Some(entry) = self.entries.get_mut(&lease.key).filter(|e| e.lease == Some(lease.token)) {
                entry.lease = None;
                if fence.is_some() {
                    entry.last_fence = fence;
                }
            } else if let Some(pending) = self.garbage.iter_mut().find(|p| p.lease == Some(lease.token)) {
                pending.lease = None;
                if fence.is_some() {
                    pending.fence = fence;
                }
            }
        }
    }

    fn evict_where(&mut self, predicate: impl Fn(&CacheKey) -> bool) -> usize {
        let keys: Vec<CacheKey> = self.entries.keys().filter(|k| predicate(k)).copied().collect();
        for key in &keys {
            if let Some(entry) = self.entries.remove(key) {
                if entry.lease.is_some() {
                    engine_warn!("galaxy3d::AttachmentCache",
                        "Evicting attachment slot {} while its frame is in flight", key.slot);
                }
                self.garbage.push(PendingDestroy {
                    image: entry.image,
                    fence: entry.last_fence,
                    lease: entry.lease,
                });
            }
        }
        self.stats.evictions += keys.len() as u64;
        keys.len()
    }
}

/// Requested sample count clamped to the pipeline, rounded down to a power
/// of two the device supports for every slot format
fn effective_sample_count(pipeline: &CompiledRenderPipeline, requested: u32, device: &dyn GraphicsDevice) -> u32 {
    let clamped = requested.min(pipeline.max_sample_count()).max(1);
    let mut samples = 1 << (u32::BITS - 1 - clamped.leading_zeros());
    while samples > 1
        && !pipeline
            .layout()
            .slots()
            .iter()
            .all(|slot| device.supports_format(slot.format.format, samples))
    {
        samples /= 2;
    }
    if samples != requested {
        engine_trace!("galaxy3d::AttachmentCache",
            "Pipeline '{}': {} sample(s) requested, using {}", pipeline.name(), requested, samples);
    }
    samples
}

/// Description of the image backing an attachment slot
fn attachment_description(size: Extent2D, format: &AttachmentFormat, samples: u32) -> ImageDescription {
    let mut usage = if format.is_depth_stencil() {
        ImageUsage::DEPTH_STENCIL
    } else {
        ImageUsage::RENDER_TARGET | ImageUsage::TRANSFER_SRC
    };
    if samples == 1 {
        usage |= ImageUsage::SAMPLED;
    }

    ImageDescription::new(size.width, size.height, format.format)
        .with_color_space(format.color_space)
        .with_samples(samples)
        .with_usage(usage)
}

#[cfg(test)]
#[path = "attachment_cache_tests.rs"]
mod tests;
