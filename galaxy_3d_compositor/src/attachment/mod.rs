//! Attachments: image descriptions, attachment formats, render targets and
//! the cache that pools attachment images across frames.

mod attachment_cache;
mod attachment_format;
mod frame_targets;
mod image;
mod render_target;

pub use attachment_cache::{AttachmentCache, AttachmentCacheStats, RendererId};
pub use attachment_format::{
    AttachmentFormat, AttachmentRef, AttachmentSource, AttachmentUsage, ClearValue, LoadOp,
    PassAttachment, StoreOp,
};
pub use frame_targets::FrameTargets;
pub use image::{ColorSpace, Extent2D, ImageDescription, ImageDimension, ImageUsage, PixelFormat};
pub use render_target::{RenderTarget, TargetOrigin};
