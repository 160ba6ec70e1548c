//! Render pipelines: the pass contract, the compiler producing frozen
//! pipelines, a named pipeline store, built-in passes and depth sorting.

mod compiled_pipeline;
mod pipeline_manager;
mod render_pass;
pub mod passes;
pub mod sorting;

pub use compiled_pipeline::{
    AttachmentBinding, CompiledRenderPipeline, PassLayout, PhysicalSlot, PipelineId, PipelineLayout,
    RenderPipelineDesc, SlotKind,
};
pub use pipeline_manager::RenderPipelineManager;
pub use render_pass::{PassState, RenderPass};
