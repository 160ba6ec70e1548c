/// Per-frame context threaded through view creation, scene gathering and
/// pass execution. Replaces any global service lookup: the device, the
/// resource library and the configuration of the frame are all reachable
/// from here.

use std::time::Duration;
use crate::config::CompositorConfig;
use crate::device::{GraphicsDevice, SemaphoreHandle};
use crate::resource::ResourceLibrary;

/// Frame clock values
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTiming {
    /// Monotonic frame counter
    pub frame_index: u64,
    /// Time since the previous frame
    pub delta_time: Duration,
    /// Time since the first frame
    pub elapsed: Duration,
}

pub struct FrameContext<'a> {
    device: &'a dyn GraphicsDevice,
    resources: &'a ResourceLibrary,
    config: CompositorConfig,
    timing: FrameTiming,
    wait_semaphores: Vec<SemaphoreHandle>,
    signal_semaphores: Vec<SemaphoreHandle>,
}

impl<'a> FrameContext<'a> {
    pub fn new(device: &'a dyn GraphicsDevice, resources: &'a ResourceLibrary, config: &CompositorConfig) -> Self {
        Self {
            device,
            resources,
            config: config.clone(),
            timing: FrameTiming::default(),
            wait_semaphores: Vec::new(),
            signal_semaphores: Vec::new(),
        }
    }

    pub fn with_timing(mut self, timing: FrameTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Semaphores the frame's submission waits on and signals
    pub fn with_semaphores(mut self, wait: Vec<SemaphoreHandle>, signal: Vec<SemaphoreHandle>) -> Self {
        self.wait_semaphores = wait;
        self.signal_semaphores = signal;
        self
    }

    pub fn device(&self) -> &'a dyn GraphicsDevice {
        self.device
    }

    pub fn resources(&self) -> &'a ResourceLibrary {
        self.resources
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    pub fn wait_semaphores(&self) -> &[SemaphoreHandle] {
        &self.wait_semaphores
    }

    pub fn signal_semaphores(&self) -> &[SemaphoreHandle] {
        &self.signal_semaphores
    }
}

impl std::fmt::Debug for FrameContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameContext")
            .field("config", &self.config)
            .field("timing", &self.timing)
            .field("wait_semaphores", &self.wait_semaphores)
            .field("signal_semaphores", &self.signal_semaphores)
            .finish_non_exhaustive()
    }
}
