//! Uniform scoping system.
//!
//! A `ShaderUniformLayout` declares, per scope, which named values and
//! textures a shader expects together with their defaults. A
//! `ShaderUniformData` holds the values actually supplied for a frame,
//! keyed by `UniformKey` (a stable hash of the declared name). Resolving a
//! layout against data never yields an undeclared or garbage value: missing
//! entries fall back to the declared default.

mod uniform_data;
mod uniform_key;
mod uniform_layout;
mod uniform_value;

pub use uniform_data::{ResolvedUniforms, ShaderUniformData, UniformBlock};
pub use uniform_key::{builtin, UniformKey};
pub use uniform_layout::{
    ShaderUniformLayout, ShaderUniformLayoutBuilder, UniformDeclaration, UniformScope,
};
pub use uniform_value::{
    AddressMode, Filter, SamplerDesc, TextureBinding, UniformType, UniformValue,
};
