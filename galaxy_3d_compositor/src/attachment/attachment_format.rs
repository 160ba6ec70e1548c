/// Attachment formats and the attachment declarations passes expose.
///
/// A pass declares, for each image it renders into, the expected format and
/// where the image comes from (cache-allocated, backbuffer, or an earlier
/// pass's attachment). The pipeline compiler checks these declarations.

use super::image::{ColorSpace, PixelFormat};

/// Whether an attachment receives color or depth/stencil output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentUsage {
    Color,
    DepthStencil,
}

/// Format of an attachment as declared by a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentFormat {
    pub format: PixelFormat,
    pub color_space: ColorSpace,
    /// Multisampled contents can be resolved to a single-sample image
    pub resolvable: bool,
    pub usage: AttachmentUsage,
}

impl AttachmentFormat {
    /// Color attachment. Integer formats are not resolvable.
    pub fn color(format: PixelFormat, color_space: ColorSpace) -> Self {
        Self {
            format,
            color_space,
            resolvable: !format.is_integer(),
            usage: AttachmentUsage::Color,
        }
    }

    /// Depth/stencil attachment (never resolved)
    pub fn depth_stencil(format: PixelFormat) -> Self {
        Self {
            format,
            color_space: ColorSpace::Linear,
            resolvable: false,
            usage: AttachmentUsage::DepthStencil,
        }
    }

    /// Compatible iff pixel format and color space match exactly
    pub fn is_compatible(&self, other: &AttachmentFormat) -> bool {
        self.format == other.format && self.color_space == other.color_space
    }

    pub fn is_depth_stencil(&self) -> bool {
        self.usage == AttachmentUsage::DepthStencil
    }
}

/// Attachment load operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOp {
    /// Load previous contents
    Load,
    /// Clear to the target's clear value
    Clear,
    /// Contents are undefined
    DontCare,
}

/// Attachment store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Store,
    DontCare,
}

/// Clear value, color or depth/stencil depending on the attachment kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    Color([f32; 4]),
    DepthStencil { depth: f32, stencil: u32 },
}

impl ClearValue {
    /// Opaque black for color, far plane for depth
    pub fn default_for(usage: AttachmentUsage) -> Self {
        match usage {
            AttachmentUsage::Color => ClearValue::Color([0.0, 0.0, 0.0, 1.0]),
            AttachmentUsage::DepthStencil => ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
        }
    }

    /// Whether this clear value can be applied to an attachment of `usage`
    pub fn matches(&self, usage: AttachmentUsage) -> bool {
        matches!(
            (self, usage),
            (ClearValue::Color(_), AttachmentUsage::Color)
                | (ClearValue::DepthStencil { .. }, AttachmentUsage::DepthStencil)
        )
    }
}

/// Where the image behind a pass attachment comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttachmentSource {
    /// Allocated (and reused across frames) by the attachment cache
    Transient,
    /// Caller-supplied presentation image
    Presentation,
    /// Same image as attachment `index` of the earlier pass `pass`
    Pass { pass: String, index: usize },
}

/// Reference to an attachment of another pass
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentRef {
    pub pass: String,
    pub index: usize,
}

impl AttachmentRef {
    pub fn new(pass: &str, index: usize) -> Self {
        Self { pass: pass.to_string(), index }
    }
}

/// One attachment declared by a pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassAttachment {
    pub format: AttachmentFormat,
    pub source: AttachmentSource,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_value: ClearValue,
}

impl PassAttachment {
    /// Cache-allocated attachment, cleared at pass start
    pub fn transient(format: AttachmentFormat) -> Self {
        Self {
            format,
            source: AttachmentSource::Transient,
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            clear_value: ClearValue::default_for(format.usage),
        }
    }

    /// Backbuffer attachment, cleared at pass start
    pub fn presentation(format: AttachmentFormat) -> Self {
        Self {
            source: AttachmentSource::Presentation,
            ..Self::transient(format)
        }
    }

    /// Continue rendering into an earlier pass's attachment (contents loaded)
    pub fn from_pass(pass: &str, index: usize, format: AttachmentFormat) -> Self {
        Self {
            source: AttachmentSource::Pass { pass: pass.to_string(), index },
            load_op: LoadOp::Load,
            ..Self::transient(format)
        }
    }

    pub fn with_clear_value(mut self, clear_value: ClearValue) -> Self {
        self.clear_value = clear_value;
        self
    }

    pub fn with_load_op(mut self, load_op: LoadOp) -> Self {
        self.load_op = load_op;
        self
    }

    pub fn with_store_op(mut self, store_op: StoreOp) -> Self {
        self.store_op = store_op;
        self
    }
}

#[cfg(test)]
#[path = "attachment_format_tests.rs"]
mod tests;
