/// Compositor configuration.
///
/// Plain data with sensible defaults. Passed by reference to the
/// compositor, the pipeline compiler and the attachment cache.

use std::time::Duration;
use crate::error::Result;
use crate::log::LogSeverity;
use crate::engine_bail;

/// Compositor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorConfig {
    /// Highest MSAA sample count a pipeline may use (power of two, 1..=16)
    pub max_sample_count: u32,
    /// Upper bound on waiting for an in-flight attachment to be released by the GPU
    pub reclaim_timeout: Duration,
    /// Let scene passes drop objects outside the view frustum
    pub frustum_culling: bool,
    /// Minimum severity forwarded to the logger
    pub log_severity: LogSeverity,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            max_sample_count: 4,
            reclaim_timeout: Duration::from_millis(100),
            frustum_culling: true,
            log_severity: if cfg!(debug_assertions) {
                LogSeverity::Debug
            } else {
                LogSeverity::Info
            },
        }
    }
}

impl CompositorConfig {
    pub fn with_max_sample_count(mut self, samples: u32) -> Self {
        self.max_sample_count = samples;
        self
    }

    pub fn with_reclaim_timeout(mut self, timeout: Duration) -> Self {
        self.reclaim_timeout = timeout;
        self
    }

    pub fn with_frustum_culling(mut self, enabled: bool) -> Self {
        self.frustum_culling = enabled;
        self
    }

    pub fn with_log_severity(mut self, severity: LogSeverity) -> Self {
        self.log_severity = severity;
        self
    }

    /// Check the configuration before it is used
    pub fn validate(&self) -> Result<()> {
        let samples = self.max_sample_count;
        if samples == 0 || samples > 16 || !samples.is_power_of_two() {
            engine_bail!("galaxy3d::CompositorConfig", Configuration =>
                "max_sample_count must be a power of two in 1..=16, got {}", samples);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
