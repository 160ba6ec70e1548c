/// Uniform value types.

use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::device::ImageHandle;

/// Declared type of a uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Int,
    UInt,
    Mat4,
    Texture,
}

impl UniformType {
    /// Size in bytes inside a uniform block (textures are not stored in blocks)
    pub fn size(&self) -> u32 {
        match self {
            UniformType::Float | UniformType::Int | UniformType::UInt => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 12,
            UniformType::Vec4 => 16,
            UniformType::Mat4 => 64,
            UniformType::Texture => 0,
        }
    }

    /// Block alignment in bytes (std140 rules)
    pub fn alignment(&self) -> u32 {
        match self {
            UniformType::Float | UniformType::Int | UniformType::UInt => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 | UniformType::Vec4 | UniformType::Mat4 => 16,
            UniformType::Texture => 0,
        }
    }

    pub fn is_texture(&self) -> bool {
        *self == UniformType::Texture
    }
}

/// Texture filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
}

/// Texture addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    #[default]
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

/// Sampler state paired with a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplerDesc {
    pub filter: Filter,
    pub address_mode: AddressMode,
}

impl SamplerDesc {
    /// Unfiltered, clamped sampling (attachments read back in post passes)
    pub const POINT_CLAMP: SamplerDesc = SamplerDesc {
        filter: Filter::Nearest,
        address_mode: AddressMode::ClampToEdge,
    };
}

/// Texture + sampler reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureBinding {
    pub image: ImageHandle,
    pub sampler: SamplerDesc,
}

impl TextureBinding {
    pub fn new(image: ImageHandle, sampler: SamplerDesc) -> Self {
        Self { image, sampler }
    }

    /// Binding to the null image with the default sampler
    pub fn null() -> Self {
        Self { image: ImageHandle::NULL, sampler: SamplerDesc::default() }
    }
}

/// A uniform value: numeric, vector, matrix or texture reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Int(i32),
    UInt(u32),
    Mat4(Mat4),
    Texture(TextureBinding),
}

impl UniformValue {
    pub fn uniform_type(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Vec2(_) => UniformType::Vec2,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Vec4(_) => UniformType::Vec4,
            UniformValue::Int(_) => UniformType::Int,
            UniformValue::UInt(_) => UniformType::UInt,
            UniformValue::Mat4(_) => UniformType::Mat4,
            UniformValue::Texture(_) => UniformType::Texture,
        }
    }

    /// Raw bytes as written into a uniform block (empty for textures)
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            UniformValue::Float(v) => bytemuck::bytes_of(v),
            UniformValue::Vec2(v) => bytemuck::bytes_of(v),
            UniformValue::Vec3(v) => bytemuck::bytes_of(v),
            UniformValue::Vec4(v) => bytemuck::bytes_of(v),
            UniformValue::Int(v) => bytemuck::bytes_of(v),
            UniformValue::UInt(v) => bytemuck::bytes_of(v),
            UniformValue::Mat4(v) => bytemuck::bytes_of(v),
            UniformValue::Texture(_) => &[],
        }
    }

    pub fn as_mat4(&self) -> Option<Mat4> {
        match self {
            UniformValue::Mat4(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<TextureBinding> {
        match self {
            UniformValue::Texture(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self { UniformValue::Float(v) }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self { UniformValue::Vec2(v) }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self { UniformValue::Vec3(v) }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self { UniformValue::Vec4(v) }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self { UniformValue::Int(v) }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self { UniformValue::UInt(v) }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self { UniformValue::Mat4(v) }
}

impl From<TextureBinding> for UniformValue {
    fn from(v: TextureBinding) -> Self { UniformValue::Texture(v) }
}
