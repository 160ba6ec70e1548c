/// Render pass contract and per-pass state machine.
///
/// A pass is a step of a compiled pipeline (opaque geometry, picking,
/// post-process, ...). It declares the attachments it renders into and the
/// earlier attachments it samples, then records its work through a
/// `RenderContext` in two phases: `prepare` (uniform setup, no draws) and
/// `execute` (draws).

use crate::attachment::{AttachmentRef, PassAttachment};
use crate::context::RenderContext;
use crate::error::Result;
use crate::engine_violation;
use crate::view::RenderView;

/// A step of a render pipeline
pub trait RenderPass: Send {
    /// Unique name within the pipeline. Shader variants are looked up by this name.
    fn name(&self) -> &str;

    /// Attachments rendered into, in binding order
    fn input_attachments(&self) -> &[PassAttachment];

    /// Attachments of earlier passes read as textures
    fn sampled_attachments(&self) -> &[AttachmentRef] {
        &[]
    }

    /// Whether the pass may render into multisampled attachments
    fn supports_msaa(&self) -> bool {
        true
    }

    /// Per-frame setup before any draw (uniforms only)
    fn prepare(&mut self, ctx: &mut RenderContext<'_>, view: &RenderView) -> Result<()>;

    /// Record the pass's draws
    fn execute(&mut self, ctx: &mut RenderContext<'_>, view: &RenderView) -> Result<()>;
}

/// Lifecycle state of a pass inside a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassState {
    /// Not yet part of a compiled pipeline
    Uncompiled,
    /// Compiled, waiting for this frame's `prepare`
    Ready,
    /// Prepared for this frame, waiting for `execute`
    Prepared,
    /// Done for this frame
    Executed,
}

/// A pass owned by a compiled pipeline, with its state
pub(crate) struct PassSlot {
    pass: Box<dyn RenderPass>,
    state: PassState,
}

impl PassSlot {
    pub(crate) fn new(pass: Box<dyn RenderPass>) -> Self {
        Self { pass, state: PassState::Uncompiled }
    }

    pub(crate) fn pass(&self) -> &dyn RenderPass {
        self.pass.as_ref()
    }

    pub(crate) fn pass_mut(&mut self) -> &mut dyn RenderPass {
        self.pass.as_mut()
    }

    pub(crate) fn state(&self) -> PassState {
        self.state
    }

    pub(crate) fn mark_compiled(&mut self) {
        self.state = PassState::Ready;
    }

    /// Start of a frame: compiled passes go back to `Ready`
    pub(crate) fn reset(&mut self) {
        if self.state != PassState::Uncompiled {
            self.state = PassState::Ready;
        }
    }

    pub(crate) fn prepare(&mut self, ctx: &mut RenderContext<'_>, view: &RenderView) -> Result<()> {
        if self.state != PassState::Ready {
            return Err(engine_violation!("galaxy3d::RenderPass",
                "Pass '{}' prepared in state {:?}", self.pass.name(), self.state));
        }
        self.pass.prepare(ctx, view)?;
        self.state = PassState::Prepared;
        Ok(())
    }

    pub(crate) fn execute(&mut self, ctx: &mut RenderContext<'_>, view: &RenderView) -> Result<()> {
        if self.state != PassState::Prepared {
            return Err(engine_violation!("galaxy3d::RenderPass",
                "Pass '{}' executed in state {:?}", self.pass.name(), self.state));
        }
        self.pass.execute(ctx, view)?;
        self.state = PassState::Executed;
        Ok(())
    }
}

#[cfg(test)]
#[path = "render_pass_tests.rs"]
mod tests;
