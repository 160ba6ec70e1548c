/// Provider traits feeding the compositor each frame.
///
/// A `RenderViewProvider` creates the frame's `RenderView` (acquiring its
/// targets from the attachment cache); `SceneDataProvider`s then fill it
/// with objects and Global values before the pipeline executes.

use std::sync::Arc;
use crate::attachment::{AttachmentCache, Extent2D, FrameTargets, RendererId};
use crate::context::FrameContext;
use crate::device::ImageHandle;
use crate::error::Result;
use crate::pipeline::CompiledRenderPipeline;
use crate::uniform::{ShaderUniformData, ShaderUniformLayout};
use super::camera::Camera;
use super::render_view::RenderView;

/// Fills a view with the objects and Global values of one frame
pub trait SceneDataProvider: Send {
    fn gather_scene_data(&mut self, view: &mut RenderView, frame: &FrameContext<'_>) -> Result<()>;
}

impl<F> SceneDataProvider for F
where
    F: FnMut(&mut RenderView, &FrameContext<'_>) -> Result<()> + Send,
{
    fn gather_scene_data(&mut self, view: &mut RenderView, frame: &FrameContext<'_>) -> Result<()> {
        self(view, frame)
    }
}

/// Creates the view a pipeline renders in one frame
pub trait RenderViewProvider: Send {
    /// Build a set-up view whose targets come from `cache`.
    ///
    /// On error no targets stay leased.
    fn create_render_view(
        &mut self,
        cache: &mut AttachmentCache,
        pipeline: &CompiledRenderPipeline,
        renderer: RendererId,
        size: Extent2D,
        backbuffers: &[ImageHandle],
        frame: &FrameContext<'_>,
    ) -> Result<RenderView>;
}

/// View provider driven by a `Camera`
#[derive(Debug, Clone)]
pub struct CameraViewProvider {
    camera: Camera,
    /// `None`: as many samples as the pipeline allows
    sample_count: Option<u32>,
    global_layout: Arc<ShaderUniformLayout>,
    globals: ShaderUniformData,
}

impl CameraViewProvider {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            sample_count: None,
            global_layout: ShaderUniformLayout::camera_globals(),
            globals: ShaderUniformData::new(),
        }
    }

    pub fn with_sample_count(mut self, samples: u32) -> Self {
        self.sample_count = Some(samples);
        self
    }

    /// Global layout of the views (defaults to the camera globals)
    pub fn with_global_layout(mut self, layout: Arc<ShaderUniformLayout>) -> Self {
        self.global_layout = layout;
        self
    }

    /// Global values set on every view before the camera is published
    pub fn with_globals(mut self, globals: ShaderUniformData) -> Self {
        self.globals = globals;
        self
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}

impl RenderViewProvider for CameraViewProvider {
    fn create_render_view(
        &mut self,
        cache: &mut AttachmentCache,
        pipeline: &CompiledRenderPipeline,
        renderer: RendererId,
        size: Extent2D,
        backbuffers: &[ImageHandle],
        frame: &FrameContext<'_>,
    ) -> Result<RenderView> {
        let requested = self.sample_count.unwrap_or(pipeline.max_sample_count());
        let targets = cache.create_render_targets(pipeline, renderer, size, requested, backbuffers, frame.device())?;
        let leased = targets.clone();

        match self.build_view(targets, size) {
            Ok(view) => Ok(view),
            Err(e) => {
                cache.release_render_targets(&leased, None);
                Err(e)
            }
        }
    }
}

impl CameraViewProvider {
    fn build_view(&self, targets: FrameTargets, size: Extent2D) -> Result<RenderView> {
        let samples = targets.sample_count();
        let mut view = RenderView::new();
        view.set_global_uniform_values(&self.globals)?;
        view.setup(
            targets,
            self.camera.viewport_or_full(size),
            *self.camera.view_matrix(),
            *self.camera.projection_matrix(),
            *self.camera.frustum(),
            samples,
            Arc::clone(&self.global_layout),
        )?;
        view.set_scissor(self.camera.scissor().copied())?;
        Ok(view)
    }
}

#[cfg(test)]
#[path = "providers_tests.rs"]
mod tests;
