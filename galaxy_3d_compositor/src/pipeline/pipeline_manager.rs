/// Named store of compiled pipelines.
///
/// Renderers look their pipeline up by name each frame. Replacing a
/// pipeline means compiling a new one under a new name (or removing the
/// old one first); compiled pipelines are never edited in place.

use rustc_hash::FxHashMap;
use crate::config::CompositorConfig;
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::engine_bail;
use super::compiled_pipeline::{CompiledRenderPipeline, RenderPipelineDesc};

#[derive(Default)]
pub struct RenderPipelineManager {
    pipelines: FxHashMap<String, CompiledRenderPipeline>,
}

impl RenderPipelineManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `desc` and store it under its name
    ///
    /// # Errors
    ///
    /// Returns an error if a pipeline with the same name already exists or
    /// if compilation fails.
    pub fn create_pipeline(
        &mut self,
        desc: RenderPipelineDesc,
        config: &CompositorConfig,
        device: &dyn GraphicsDevice,
    ) -> Result<&mut CompiledRenderPipeline> {
        if self.pipelines.contains_key(&desc.name) {
            engine_bail!("galaxy3d::RenderPipelineManager", Configuration =>
                "Pipeline '{}' already exists", desc.name);
        }

        let pipeline = CompiledRenderPipeline::compile(desc, config, device)?;
        let name = pipeline.name().to_string();
        Ok(self.pipelines.entry(name).or_insert(pipeline))
    }

    pub fn pipeline(&self, name: &str) -> Option<&CompiledRenderPipeline> {
        self.pipelines.get(name)
    }

    pub fn pipeline_mut(&mut self, name: &str) -> Option<&mut CompiledRenderPipeline> {
        self.pipelines.get_mut(name)
    }

    /// Remove a pipeline. Its cached attachments stay in the attachment
    /// cache until `AttachmentCache::evict_pipeline` is called.
    pub fn remove_pipeline(&mut self, name: &str) -> Option<CompiledRenderPipeline> {
        self.pipelines.remove(name)
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    pub fn pipeline_names(&self) -> Vec<&str> {
        self.pipelines.keys().map(|k| k.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.pipelines.clear();
    }
}

#[cfg(test)]
#[path = "pipeline_manager_tests.rs"]
mod tests;
