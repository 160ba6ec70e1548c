/// GraphicsDevice trait: the device layer consumed by the compositor.
///
/// Calls are synchronous on the CPU side; GPU completion is observed only
/// through fences. Implementations use interior mutability so one device
/// can be shared (`Arc<dyn GraphicsDevice>`) by every renderer.

use std::time::{Duration, Instant};
use crate::attachment::{ImageDescription, PixelFormat};
use crate::error::Result;
use super::command_list::CommandList;
use super::handles::{FenceHandle, ImageHandle, SemaphoreHandle};

pub trait GraphicsDevice: Send + Sync {
    /// Acquire the next presentation image
    fn acquire_backbuffer(&self) -> Result<ImageHandle>;

    /// Allocate an image
    fn create_image(&self, description: &ImageDescription) -> Result<ImageHandle>;

    /// Release an image. The caller guarantees no pending GPU work uses it.
    fn destroy_image(&self, image: ImageHandle);

    /// Create an unsignalled fence
    fn create_fence(&self) -> Result<FenceHandle>;

    /// Submit a recorded command list.
    ///
    /// `fence`, when given, is signalled once the GPU has finished the work.
    fn submit_commands(
        &self,
        commands: CommandList,
        wait_semaphores: &[SemaphoreHandle],
        signal_semaphores: &[SemaphoreHandle],
        fence: Option<FenceHandle>,
    ) -> Result<()>;

    /// Whether the GPU has finished the work guarded by `fence`
    fn is_fence_signalled(&self, fence: FenceHandle) -> bool;

    /// Wait until `fence` is signalled or `timeout` elapses.
    ///
    /// Returns `true` if the fence signalled in time. The default polls
    /// `is_fence_signalled`; backends with a native wait should override it.
    fn wait_for_fence(&self, fence: FenceHandle, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if self.is_fence_signalled(fence) {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::yield_now();
        }
    }

    /// Whether `format` can be rendered to with `samples` samples per pixel
    fn supports_format(&self, _format: PixelFormat, _samples: u32) -> bool {
        true
    }
}
