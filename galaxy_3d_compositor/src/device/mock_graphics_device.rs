/// Mock graphics device for unit tests.
///
/// Tracks created and destroyed images, fence states and submissions
/// without any GPU. Fences signal on submission unless auto-signal is
/// turned off, which lets tests simulate in-flight work.

use std::sync::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::attachment::{ImageDescription, PixelFormat};
use crate::error::{Error, Result};
use super::{CommandList, FenceHandle, GraphicsDevice, ImageHandle, SemaphoreHandle};

/// One recorded `submit_commands` call
#[derive(Debug, Clone)]
pub struct MockSubmission {
    pub commands: CommandList,
    pub wait_semaphores: Vec<SemaphoreHandle>,
    pub signal_semaphores: Vec<SemaphoreHandle>,
    pub fence: Option<FenceHandle>,
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    live_images: FxHashMap<ImageHandle, ImageDescription>,
    created: Vec<ImageDescription>,
    destroyed: Vec<ImageHandle>,
    fences: FxHashMap<FenceHandle, bool>,
    unsupported: FxHashSet<PixelFormat>,
    unsupported_samples: FxHashSet<u32>,
    fail_image_creation: bool,
    manual_fences: bool,
    submissions: Vec<MockSubmission>,
}

impl MockState {
    fn next_handle(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MockGraphicsDevice {
    state: Mutex<MockState>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `format` as unsupported
    pub fn with_unsupported_format(self, format: PixelFormat) -> Self {
        self.state.lock().unwrap().unsupported.insert(format);
        self
    }

    /// Report every format as unsupported with `samples` samples per pixel
    pub fn with_unsupported_sample_count(self, samples: u32) -> Self {
        self.state.lock().unwrap().unsupported_samples.insert(samples);
        self
    }

    /// Fences stay unsignalled until `signal_fence` / `signal_all_fences`
    pub fn set_manual_fences(&self, manual: bool) {
        self.state.lock().unwrap().manual_fences = manual;
    }

    pub fn set_fail_image_creation(&self, fail: bool) {
        self.state.lock().unwrap().fail_image_creation = fail;
    }

    pub fn signal_fence(&self, fence: FenceHandle) {
        self.state.lock().unwrap().fences.insert(fence, true);
    }

    pub fn signal_all_fences(&self) {
        for signalled in self.state.lock().unwrap().fences.values_mut() {
            *signalled = true;
        }
    }

    pub fn created_image_count(&self) -> usize {
        self.state.lock().unwrap().created.len()
    }

    pub fn created_images(&self) -> Vec<ImageDescription> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn live_image_count(&self) -> usize {
        self.state.lock().unwrap().live_images.len()
    }

    pub fn destroyed_images(&self) -> Vec<ImageHandle> {
        self.state.lock().unwrap().destroyed.clone()
    }

    pub fn image_description(&self, image: ImageHandle) -> Option<ImageDescription> {
        self.state.lock().unwrap().live_images.get(&image).copied()
    }

    pub fn submissions(&self) -> Vec<MockSubmission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.state.lock().unwrap().submissions.len()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn acquire_backbuffer(&self) -> Result<ImageHandle> {
        let mut state = self.state.lock().unwrap();
        Ok(ImageHandle::new(state.next_handle()))
    }

    fn create_image(&self, description: &ImageDescription) -> Result<ImageHandle> {
        let mut state = self.state.lock().unwrap();
        if state.fail_image_creation {
            return Err(Error::OutOfMemory);
        }
        let image = ImageHandle::new(state.next_handle());
        state.live_images.insert(image, *description);
        state.created.push(*description);
        Ok(image)
    }

    fn destroy_image(&self, image: ImageHandle) {
        let mut state = self.state.lock().unwrap();
        state.live_images.remove(&image);
        state.destroyed.push(image);
    }

    fn create_fence(&self) -> Result<FenceHandle> {
        let mut state = self.state.lock().unwrap();
        let fence = FenceHandle::new(state.next_handle());
        state.fences.insert(fence, false);
        Ok(fence)
    }

    fn submit_commands(
        &self,
        commands: CommandList,
        wait_semaphores: &[SemaphoreHandle],
        signal_semaphores: &[SemaphoreHandle],
        fence: Option<FenceHandle>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(fence) = fence {
            let signalled = !state.manual_fences;
            state.fences.insert(fence, signalled);
        }
        state.submissions.push(MockSubmission {
            commands,
            wait_semaphores: wait_semaphores.to_vec(),
            signal_semaphores: signal_semaphores.to_vec(),
            fence,
        });
        Ok(())
    }

    fn is_fence_signalled(&self, fence: FenceHandle) -> bool {
        self.state.lock().unwrap().fences.get(&fence).copied().unwrap_or(true)
    }

    fn supports_format(&self, format: PixelFormat, samples: u32) -> bool {
        let state = self.state.lock().unwrap();
        !state.unsupported.contains(&format) && !state.unsupported_samples.contains(&samples)
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
