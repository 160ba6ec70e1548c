/*!
# Galaxy 3D Compositor

Render pipeline compositor for the Galaxy 3D engine.

A pipeline is an ordered list of render passes compiled once into a frozen
layout of attachment slots. Each frame, a view provider creates a
`RenderView` (camera, render targets, objects, Global uniforms), scene data
providers fill it, and the compositor records every pass into an
API-agnostic command list submitted to a `GraphicsDevice`.

## Architecture

- **CompiledRenderPipeline**: validated pass list and attachment layout
- **AttachmentCache**: attachment images pooled across frames, fence-guarded
- **RenderView**: per-frame camera, targets, objects and Global values
- **RenderContext**: what a pass sees while recording (binding, uniforms, draws)
- **Compositor**: frame execution, abort and submission
- **GraphicsDevice**: the device layer a backend implements
*/

mod attachment;
mod compositor;
mod config;
mod context;
mod device;
mod engine;
mod error;
pub mod log;
mod pipeline;
mod resource;
mod uniform;
mod utils;
mod view;

#[cfg(test)]
pub(crate) mod test_support;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging entry point
    pub use crate::engine::Engine;

    pub use crate::compositor::{Compositor, FrameAbortHandle, FrameReport};
    pub use crate::config::CompositorConfig;

    // Logging sub-module (types only; the engine_* macros live at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger, MemoryLogger};
    }

    pub mod attachment {
        pub use crate::attachment::*;
    }

    pub mod context {
        pub use crate::context::*;
    }

    pub mod device {
        pub use crate::device::*;
    }

    pub mod pipeline {
        pub use crate::pipeline::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod uniform {
        pub use crate::uniform::*;
    }

    pub mod utils {
        pub use crate::utils::*;
    }

    pub mod view {
        pub use crate::view::*;
    }
}

// Re-export math library at crate root
pub use glam;
