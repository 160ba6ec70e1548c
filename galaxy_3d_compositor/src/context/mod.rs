//! Per-frame and per-pass execution contexts.
//!
//! `FrameContext` carries what a whole frame needs (device, resources,
//! configuration, timing). `RenderContext` is handed to each pass and is
//! the only path through which passes record GPU work.

mod frame_context;
mod render_context;

pub use frame_context::{FrameContext, FrameTiming};
pub use render_context::{DrawOutcome, PassPhase, RenderContext, RenderStats, SkipReason};
