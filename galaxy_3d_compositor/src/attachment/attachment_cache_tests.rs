/// Tests for AttachmentCache

use super::*;
use crate::attachment::{AttachmentRef, PassAttachment};
use crate::config::CompositorConfig;
use crate::device::mock_graphics_device::MockGraphicsDevice;
use crate::error::Error;
use crate::test_support::{self, color_format, TestPass};

// ============================================================================
// Helper Functions
// ============================================================================

const SIZE: Extent2D = Extent2D::new(128, 72);

fn pipeline(device: &MockGraphicsDevice, max_samples: u32) -> CompiledRenderPipeline {
    let config = CompositorConfig::default().with_max_sample_count(max_samples);
    test_support::compile(vec![TestPass::color_depth("opaque").boxed()], &config, device)
}

/// Opaque color + depth, then a pass presenting into the backbuffer
fn presenting_pipeline(device: &MockGraphicsDevice, max_samples: u32) -> CompiledRenderPipeline {
    let config = CompositorConfig::default().with_max_sample_count(max_samples);
    test_support::compile(vec![
        TestPass::color_depth("opaque").boxed(),
        TestPass::new("present", vec![PassAttachment::presentation(color_format())]).boxed(),
    ], &config, device)
}

fn cache() -> AttachmentCache {
    AttachmentCache::new(Duration::from_millis(5))
}

// ============================================================================
// Renderers
// ============================================================================

#[test]
fn test_register_and_unregister_renderer() {
    let mut cache = cache();
    let first = cache.register_renderer();
    let second = cache.register_renderer();

    assert_ne!(first, second);
    assert!(cache.is_registered(first));
    assert!(cache.unregister_renderer(first));
    assert!(!cache.is_registered(first));
    assert!(!cache.unregister_renderer(first));
}

#[test]
fn test_unregistered_renderer_is_rejected() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();
    cache.unregister_renderer(renderer);

    let result = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

// ============================================================================
// Allocation and reuse
// ============================================================================

#[test]
fn test_targets_match_pipeline_layout() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();

    let targets = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).unwrap();

    assert_eq!(targets.pipeline_id(), pipeline.id());
    assert_eq!(targets.renderer(), renderer);
    assert_eq!(targets.pass_count(), 1);
    assert_eq!(targets.pass(0).len(), 2);
    assert_eq!(device.created_image_count(), 2);
    for target in targets.slots() {
        assert_eq!((target.width(), target.height()), (128, 72));
        assert_eq!(target.sample_count(), 1);
        assert!(target.description().usage().contains(ImageUsage::SAMPLED));
        assert!(!target.is_backbuffer());
    }
    assert!(targets.slot(1).unwrap().format().is_depth_stencil());
    assert_eq!(cache.stats().allocations, 2);
}

#[test]
fn test_released_targets_are_reused() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();

    let first = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).unwrap();
    cache.release_render_targets(&first, None);
    let second = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).unwrap();

    assert_eq!(first.slots(), second.slots());
    assert_eq!(device.created_image_count(), 2);
    assert_eq!(cache.stats().reuses, 2);
}

#[test]
fn test_renderers_get_separate_images() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let left = cache.register_renderer();
    let right = cache.register_renderer();

    let a = cache.create_render_targets(&pipeline, left, SIZE, 1, &[], &device).unwrap();
    let b = cache.create_render_targets(&pipeline, right, SIZE, 1, &[], &device).unwrap();

    assert_ne!(a.slot(0).unwrap().image(), b.slot(0).unwrap().image());
    assert_eq!(cache.stats().cached_images, 4);
}

#[test]
fn test_leased_targets_cannot_be_acquired_twice() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();
    let _leased = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).unwrap();

    let result = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device);

    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_resize_replaces_images_after_fence() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();
    let small = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).unwrap();
    let fence = device.create_fence().unwrap();
    cache.release_render_targets(&small, Some(fence));

    let large = cache
        .create_render_targets(&pipeline, renderer, Extent2D::new(256, 144), 1, &[], &device)
        .unwrap();

    assert_eq!(large.slot(0).unwrap().width(), 256);
    assert_eq!(cache.stats().evictions, 2);
    assert_eq!(cache.collect_garbage(&device), 0);
    assert_eq!(cache.stats().pending_destruction, 2);

    device.signal_fence(fence);
    assert_eq!(cache.collect_garbage(&device), 2);
    assert!(device.destroyed_images().contains(&small.slot(0).unwrap().image()));
    assert_eq!(device.live_image_count(), 2);
}

#[test]
fn test_busy_image_times_out() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();
    let targets = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).unwrap();
    let fence = device.create_fence().unwrap();
    cache.release_render_targets(&targets, Some(fence));

    let result = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device);
    assert!(matches!(result, Err(Error::ResourceExhausted(_))));

    // Nothing stayed leased by the failed attempt
    device.signal_fence(fence);
    assert!(cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).is_ok());
}

#[test]
fn test_device_failure_is_propagated() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();

    device.set_fail_image_creation(true);
    let result = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device);
    assert!(matches!(result, Err(Error::OutOfMemory)));

    device.set_fail_image_creation(false);
    assert!(cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).is_ok());
}

#[test]
fn test_zero_size_is_rejected() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();

    let result = cache.create_render_targets(&pipeline, renderer, Extent2D::new(0, 72), 1, &[], &device);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(device.created_image_count(), 0);
}

// ============================================================================
// Sampling and presentation
// ============================================================================

#[test]
fn test_sample_count_is_clamped() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 4);
    let mut cache = cache();
    let renderer = cache.register_renderer();

    let targets = cache.create_render_targets(&pipeline, renderer, SIZE, 16, &[], &device).unwrap();

    assert_eq!(targets.sample_count(), 4);
    let color = targets.slot(0).unwrap();
    assert_eq!(color.sample_count(), 4);
    assert!(!color.description().usage().contains(ImageUsage::SAMPLED));
}

#[test]
fn test_sample_count_rounds_down_to_power_of_two() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 4);
    let mut cache = cache();
    let renderer = cache.register_renderer();

    let targets = cache.create_render_targets(&pipeline, renderer, SIZE, 3, &[], &device).unwrap();

    assert_eq!(targets.sample_count(), 2);
    assert!(device.created_images().iter().all(|d| d.samples() == 2));
}

#[test]
fn test_sample_count_skips_unsupported_counts() {
    let device = MockGraphicsDevice::new().with_unsupported_sample_count(4);
    let pipeline = pipeline(&device, 8);
    let mut cache = cache();
    let renderer = cache.register_renderer();

    let targets = cache.create_render_targets(&pipeline, renderer, SIZE, 4, &[], &device).unwrap();

    assert_eq!(targets.sample_count(), 2);
}

#[test]
fn test_backbuffer_count_must_match() {
    let device = MockGraphicsDevice::new();
    let pipeline = presenting_pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();

    let result = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_single_sampled_presentation_wraps_backbuffer() {
    let device = MockGraphicsDevice::new();
    let pipeline = presenting_pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();
    let backbuffer = ImageHandle::new(900);

    let targets = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[backbuffer], &device).unwrap();

    let present = &targets.pass(1)[0];
    assert_eq!(present.image(), backbuffer);
    assert!(present.is_backbuffer());
    assert_eq!(device.created_image_count(), 2);
    assert!(targets.contains_image(backbuffer));
}

#[test]
fn test_multisampled_presentation_resolves_into_backbuffer() {
    let device = MockGraphicsDevice::new();
    let pipeline = presenting_pipeline(&device, 4);
    let mut cache = cache();
    let renderer = cache.register_renderer();
    let backbuffer = ImageHandle::new(900);

    let targets = cache.create_render_targets(&pipeline, renderer, SIZE, 4, &[backbuffer], &device).unwrap();

    let present = &targets.pass(1)[0];
    assert_ne!(present.image(), backbuffer);
    assert_eq!(present.sample_count(), 4);
    assert_eq!(present.resolve_target(), Some(backbuffer));
    assert_eq!(targets.sampled_image(2), Some(backbuffer));
    assert_eq!(device.created_image_count(), 3);
}

#[test]
fn test_sampled_slot_uses_single_sample() {
    let device = MockGraphicsDevice::new();
    let config = CompositorConfig::default().with_max_sample_count(8);
    let pipeline = test_support::compile(vec![
        TestPass::color_depth("opaque").boxed(),
        TestPass::new("post", vec![PassAttachment::presentation(color_format())])
            .sampling(vec![AttachmentRef::new("opaque", 0)])
            .boxed(),
    ], &config, &device);
    let mut cache = cache();
    let renderer = cache.register_renderer();

    let targets = cache
        .create_render_targets(&pipeline, renderer, SIZE, 8, &[ImageHandle::new(900)], &device)
        .unwrap();

    assert_eq!(targets.sample_count(), 1);
    assert_eq!(targets.sampled_image(0), Some(targets.slot(0).unwrap().image()));
}

// ============================================================================
// Eviction
// ============================================================================

#[test]
fn test_evict_pipeline_destroys_its_images() {
    let device = MockGraphicsDevice::new();
    let kept = pipeline(&device, 1);
    let dropped = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();
    let a = cache.create_render_targets(&kept, renderer, SIZE, 1, &[], &device).unwrap();
    let b = cache.create_render_targets(&dropped, renderer, SIZE, 1, &[], &device).unwrap();
    cache.release_render_targets(&a, None);
    cache.release_render_targets(&b, None);

    assert_eq!(cache.evict_pipeline(dropped.id()), 2);
    assert_eq!(cache.collect_garbage(&device), 2);
    assert_eq!(cache.stats().cached_images, 2);
    assert_eq!(device.live_image_count(), 2);
}

#[test]
fn test_unregister_while_leased_waits_for_release() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();
    let targets = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).unwrap();

    cache.unregister_renderer(renderer);
    assert_eq!(cache.collect_garbage(&device), 0);

    let fence = device.create_fence().unwrap();
    cache.release_render_targets(&targets, Some(fence));
    assert_eq!(cache.collect_garbage(&device), 0);

    device.signal_fence(fence);
    assert_eq!(cache.collect_garbage(&device), 2);
    assert_eq!(device.live_image_count(), 0);
}

#[test]
fn test_stale_release_after_renderer_id_reuse() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();
    let old_frame = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).unwrap();
    cache.unregister_renderer(renderer);

    let reused = cache.register_renderer();
    assert_eq!(reused, renderer);
    let new_frame = cache.create_render_targets(&pipeline, reused, SIZE, 1, &[], &device).unwrap();

    // Releasing the old frame must not free the new frame's images
    cache.release_render_targets(&old_frame, None);
    let again = cache.create_render_targets(&pipeline, reused, SIZE, 1, &[], &device);
    assert!(matches!(again, Err(Error::InvalidResource(_))));

    // The evicted images of the old frame are destroyed
    assert_eq!(cache.collect_garbage(&device), 2);
    assert_eq!(cache.stats().pending_destruction, 0);

    cache.release_render_targets(&new_frame, None);
    assert!(cache.create_render_targets(&pipeline, reused, SIZE, 1, &[], &device).is_ok());
}

#[test]
fn test_clear_destroys_everything() {
    let device = MockGraphicsDevice::new();
    let pipeline = pipeline(&device, 1);
    let mut cache = cache();
    let renderer = cache.register_renderer();
    let targets = cache.create_render_targets(&pipeline, renderer, SIZE, 1, &[], &device).unwrap();
    cache.release_render_targets(&targets, None);

    cache.clear(&device);

    let stats = cache.stats();
    assert_eq!(stats.cached_images, 0);
    assert_eq!(stats.destroyed, 2);
    assert_eq!(device.live_image_count(), 0);
}
