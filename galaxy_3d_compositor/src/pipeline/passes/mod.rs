//! Built-in passes.

mod fullscreen_pass;
mod scene_pass;

pub use fullscreen_pass::FullscreenPass;
pub use scene_pass::{SceneKind, ScenePass};
