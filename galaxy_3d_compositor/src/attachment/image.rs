/// Image description types shared by the attachment cache and the device layer.

use bitflags::bitflags;

/// Pixel formats the compositor can allocate attachments in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,
    R16G16B16A16_SFLOAT,
    R32G32B32A32_SFLOAT,
    R32_SFLOAT,
    R32_SINT,
    R32_UINT,
    D16_UNORM,
    D32_SFLOAT,
    D24_UNORM_S8_UINT,
    D32_SFLOAT_S8_UINT,
}

impl PixelFormat {
    /// Depth or depth/stencil format
    pub fn is_depth_stencil(&self) -> bool {
        matches!(
            self,
            PixelFormat::D16_UNORM
                | PixelFormat::D32_SFLOAT
                | PixelFormat::D24_UNORM_S8_UINT
                | PixelFormat::D32_SFLOAT_S8_UINT
        )
    }

    /// Format carries a stencil aspect
    pub fn has_stencil(&self) -> bool {
        matches!(self, PixelFormat::D24_UNORM_S8_UINT | PixelFormat::D32_SFLOAT_S8_UINT)
    }

    /// Integer color format (cannot be filtered or averaged on resolve)
    pub fn is_integer(&self) -> bool {
        matches!(self, PixelFormat::R32_SINT | PixelFormat::R32_UINT)
    }

    /// Size of one texel in bytes
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::R8G8B8A8_UNORM | PixelFormat::B8G8R8A8_UNORM => 4,
            PixelFormat::R16G16B16A16_SFLOAT => 8,
            PixelFormat::R32G32B32A32_SFLOAT => 16,
            PixelFormat::R32_SFLOAT | PixelFormat::R32_SINT | PixelFormat::R32_UINT => 4,
            PixelFormat::D16_UNORM => 2,
            PixelFormat::D32_SFLOAT | PixelFormat::D24_UNORM_S8_UINT => 4,
            PixelFormat::D32_SFLOAT_S8_UINT => 8,
        }
    }
}

/// How color values stored in an image are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Linear,
    Srgb,
}

/// Image dimensionality, derived from depth and layer count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageDimension {
    Tex2D,
    Array2D,
    Tex3D,
}

impl ImageDimension {
    /// Derive the dimension from (depth, layers)
    pub fn from_extent(depth: u32, layers: u32) -> Self {
        if depth > 1 {
            ImageDimension::Tex3D
        } else if layers > 1 {
            ImageDimension::Array2D
        } else {
            ImageDimension::Tex2D
        }
    }
}

bitflags! {
    /// How an image may be used by the GPU
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const SAMPLED       = 1 << 0;
        const RENDER_TARGET = 1 << 1;
        const DEPTH_STENCIL = 1 << 2;
        const TRANSFER_SRC  = 1 << 3;
        const TRANSFER_DST  = 1 << 4;
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are non-zero
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Full description of a GPU image.
///
/// The dimension is never set directly: it is derived from depth and layer
/// count whenever either changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDescription {
    width: u32,
    height: u32,
    depth: u32,
    layers: u32,
    mips: u32,
    samples: u32,
    format: PixelFormat,
    color_space: ColorSpace,
    dimension: ImageDimension,
    usage: ImageUsage,
}

impl ImageDescription {
    /// Single-layer, single-mip, single-sample 2D image
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let usage = if format.is_depth_stencil() {
            ImageUsage::DEPTH_STENCIL
        } else {
            ImageUsage::RENDER_TARGET | ImageUsage::SAMPLED
        };
        Self {
            width,
            height,
            depth: 1,
            layers: 1,
            mips: 1,
            samples: 1,
            format,
            color_space: ColorSpace::Linear,
            dimension: ImageDimension::Tex2D,
            usage,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth.max(1);
        self.dimension = ImageDimension::from_extent(self.depth, self.layers);
        self
    }

    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers.max(1);
        self.dimension = ImageDimension::from_extent(self.depth, self.layers);
        self
    }

    pub fn with_mips(mut self, mips: u32) -> Self {
        self.mips = mips.max(1);
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples.max(1);
        self
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    pub fn with_usage(mut self, usage: ImageUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn depth(&self) -> u32 { self.depth }
    pub fn layers(&self) -> u32 { self.layers }
    pub fn mips(&self) -> u32 { self.mips }
    pub fn samples(&self) -> u32 { self.samples }
    pub fn format(&self) -> PixelFormat { self.format }
    pub fn color_space(&self) -> ColorSpace { self.color_space }
    pub fn dimension(&self) -> ImageDimension { self.dimension }
    pub fn usage(&self) -> ImageUsage { self.usage }

    pub fn extent(&self) -> Extent2D {
        Extent2D::new(self.width, self.height)
    }

    /// Approximate size in bytes of the base mip level across all samples and layers
    pub fn byte_size(&self) -> u64 {
        self.width as u64
            * self.height as u64
            * self.depth as u64
            * self.layers as u64
            * self.samples as u64
            * self.format.bytes_per_pixel() as u64
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
