/// Compositor: runs compiled pipelines, one frame at a time.
///
/// A frame goes through four steps:
///
/// 1. a `RenderViewProvider` creates the view and leases its targets from
///    the attachment cache,
/// 2. every `SceneDataProvider` fills the view,
/// 3. the view is sealed and each pass is recorded in order
///    (`BeginPass`, prepare, execute, `EndPass`),
/// 4. the command list is submitted with a fresh fence and the targets go
///    back to the cache guarded by that fence.
///
/// A pass error or an abort request drops everything recorded for the
/// frame: nothing is submitted and the targets are released as they were.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use crate::attachment::{AttachmentCache, Extent2D, FrameTargets, RendererId};
use crate::config::CompositorConfig;
use crate::context::{FrameContext, RenderContext, RenderStats};
use crate::device::{Command, CommandList, FenceHandle, GraphicsDevice, ImageHandle};
use crate::engine::Engine;
use crate::error::Result;
use crate::pipeline::CompiledRenderPipeline;
use crate::resource::ResourceLibrary;
use crate::view::{RenderView, RenderViewProvider, SceneDataProvider};
use crate::{engine_bail, engine_debug, engine_err, engine_trace, engine_warn};

/// Cancels the frame being recorded; cloneable and usable from any thread.
///
/// The request is consumed by the frame that observes it.
#[derive(Debug, Clone, Default)]
pub struct FrameAbortHandle(Arc<AtomicBool>);

impl FrameAbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Withdraw a pending request
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Summary of one submitted frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub passes_executed: usize,
    /// Commands submitted
    pub commands: usize,
    pub draws: u32,
    pub skipped_draws: u32,
    pub shader_binds: u32,
    pub elided_binds: u32,
    pub uniform_uploads: u32,
    /// Signalled when the GPU has finished the frame
    pub fence: FenceHandle,
}

pub struct Compositor {
    config: CompositorConfig,
    cache: AttachmentCache,
    abort: FrameAbortHandle,
    frames_submitted: u64,
}

impl Compositor {
    /// Create a compositor and apply the configured log severity.
    ///
    /// # Errors
    ///
    /// `Configuration` if the configuration is invalid.
    pub fn new(config: CompositorConfig) -> Result<Self> {
        config.validate()?;
        Engine::set_min_severity(config.log_severity);
        engine_debug!("galaxy3d::Compositor",
            "Compositor created (max {}x MSAA, reclaim timeout {:?})",
            config.max_sample_count, config.reclaim_timeout);

        Ok(Self {
            cache: AttachmentCache::new(config.reclaim_timeout),
            config,
            abort: FrameAbortHandle::default(),
            frames_submitted: 0,
        })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Frame context for `device` and `resources` with this compositor's configuration
    pub fn frame_context<'a>(&self, device: &'a dyn GraphicsDevice, resources: &'a ResourceLibrary) -> FrameContext<'a> {
        FrameContext::new(device, resources, &self.config)
    }

    pub fn abort_handle(&self) -> FrameAbortHandle {
        self.abort.clone()
    }

    pub fn cache(&self) -> &AttachmentCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AttachmentCache {
        &mut self.cache
    }

    pub fn register_renderer(&mut self) -> RendererId {
        self.cache.register_renderer()
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Create, fill and execute the view of one frame
    #[allow(clippy::too_many_arguments)]
    pub fn render_frame(
        &mut self,
        pipeline: &mut CompiledRenderPipeline,
        view_provider: &mut dyn RenderViewProvider,
        scene_providers: &mut [Box<dyn SceneDataProvider>],
        frame: &FrameContext<'_>,
        renderer: RendererId,
        size: Extent2D,
        backbuffers: &[ImageHandle],
    ) -> Result<FrameReport> {
        let mut view = view_provider.create_render_view(&mut self.cache, pipeline, renderer, size, backbuffers, frame)?;

        for provider in scene_providers.iter_mut() {
            if let Err(e) = provider.gather_scene_data(&mut view, frame) {
                self.discard_view(view);
                return Err(e);
            }
        }

        self.execute_view(pipeline, &mut view, frame)
    }

    /// Give back the targets of a view that will not be executed
    pub fn discard_view(&mut self, view: RenderView) {
        if view.is_sealed() {
            return;
        }
        if let Some(targets) = view.targets() {
            self.cache.release_render_targets(targets, None);
        }
    }

    /// Record and submit every pass of `pipeline` for `view`.
    ///
    /// # Errors
    ///
    /// * `InvalidResource` if the view is not set up for this pipeline.
    /// * `ContractViolation` if the view was already executed.
    /// * `FrameAborted` if an abort was requested; nothing is submitted.
    /// * The first pass or device error; nothing is submitted.
    pub fn execute_view(
        &mut self,
        pipeline: &mut CompiledRenderPipeline,
        view: &mut RenderView,
        frame: &FrameContext<'_>,
    ) -> Result<FrameReport> {
        let targets = match view.targets() {
            Some(targets) if targets.pipeline_id() == pipeline.id() => targets.clone(),
            Some(_) => engine_bail!("galaxy3d::Compositor", InvalidResource =>
                "View targets were created for another pipeline than '{}'", pipeline.name()),
            None => engine_bail!("galaxy3d::Compositor", InvalidResource =>
                "View executed with pipeline '{}' before setup", pipeline.name()),
        };
        view.seal()?;
        pipeline.reset_passes();
        let view: &RenderView = view;

        let mut commands = CommandList::new();
        let mut stats = RenderStats::default();
        let recorded = self.record_passes(pipeline, view, &targets, frame, &mut commands, &mut stats);

        let passes_executed = match recorded {
            Ok(count) => count,
            Err(e) => {
                commands.discard();
                self.cache.release_render_targets(&targets, None);
                engine_warn!("galaxy3d::Compositor", "Frame of pipeline '{}' dropped: {}", pipeline.name(), e);
                return Err(e);
            }
        };

        let command_count = commands.len();
        let fence = match self.submit(commands, frame) {
            Ok(fence) => fence,
            Err(e) => {
                self.cache.release_render_targets(&targets, None);
                return Err(e);
            }
        };

        self.cache.release_render_targets(&targets, Some(fence));
        self.cache.collect_garbage(frame.device());
        self.frames_submitted += 1;

        engine_trace!("galaxy3d::Compositor",
            "Pipeline '{}': {} passes, {} commands, {} draws ({} skipped)",
            pipeline.name(), passes_executed, command_count, stats.draws, stats.skipped_draws);

        Ok(FrameReport {
            passes_executed,
            commands: command_count,
            draws: stats.draws,
            skipped_draws: stats.skipped_draws,
            shader_binds: stats.shader_binds,
            elided_binds: stats.elided_binds,
            uniform_uploads: stats.uniform_uploads,
            fence,
        })
    }

    /// Record every pass; returns how many were recorded
    fn record_passes(
        &self,
        pipeline: &mut CompiledRenderPipeline,
        view: &RenderView,
        targets: &FrameTargets,
        frame: &FrameContext<'_>,
        commands: &mut CommandList,
        stats: &mut RenderStats,
    ) -> Result<usize> {
        let pass_count = pipeline.pass_count();

        for index in 0..pass_count {
            let Some(layout) = pipeline.layout().pass(index) else {
                break;
            };
            let name = layout.name.clone();
            let sampled: Vec<ImageHandle> = layout
                .sampled_slots
                .iter()
                .filter_map(|&slot| targets.sampled_image(slot))
                .collect();

            if self.abort.take() {
                return Err(engine_err!("galaxy3d::Compositor", FrameAborted =>
                    "Frame aborted before pass '{}'", name));
            }

            let pass_targets = targets.pass(index);
            commands.begin_pass(&name, pass_targets.to_vec());
            commands.push(Command::SetViewport(*view.viewport()));
            commands.push(Command::SetScissor(view.scissor()));

            let Some(slot) = pipeline.pass_slot_mut(index) else {
                break;
            };
            let mut ctx = RenderContext::new(frame, view, commands, index, &name, pass_targets, sampled);
            slot.prepare(&mut ctx, view)?;
            ctx.begin_execute();
            slot.execute(&mut ctx, view)?;
            stats.accumulate(&ctx.finish());

            commands.end_pass();
        }

        if self.abort.take() {
            return Err(engine_err!("galaxy3d::Compositor", FrameAborted =>
                "Frame aborted before submission"));
        }
        Ok(pass_count)
    }

    fn submit(&self, commands: CommandList, frame: &FrameContext<'_>) -> Result<FenceHandle> {
        let device = frame.device();
        let fence = device.create_fence()?;
        device.submit_commands(commands, frame.wait_semaphores(), frame.signal_semaphores(), Some(fence))?;
        Ok(fence)
    }
}

#[cfg(test)]
#[path = "compositor_tests.rs"]
mod tests;
