//! Graphics device layer contract.
//!
//! The compositor never talks to a graphics API directly. It records an
//! API-agnostic `CommandList` and hands it to a `GraphicsDevice`
//! implementation, which owns images, fences and submission.

mod command_list;
mod graphics_device;
mod handles;

#[cfg(test)]
pub(crate) mod mock_graphics_device;

pub use command_list::{Command, CommandList, Rect2D, Viewport};
pub use graphics_device::GraphicsDevice;
pub use handles::{FenceHandle, ImageHandle, SemaphoreHandle};
