//! Resource library consumed by the compositor.
//!
//! Meshes, shaders and materials live in slot-map arenas and are addressed
//! by copyable handles. The compositor only reads them.

mod material;
mod mesh;
mod resource_library;
mod shader;

use slotmap::new_key_type;

new_key_type! {
    /// Stable key of a mesh in a `ResourceLibrary`
    pub struct MeshHandle;
    /// Stable key of a material in a `ResourceLibrary`
    pub struct MaterialHandle;
    /// Stable key of a shader in a `ResourceLibrary`
    pub struct ShaderHandle;
}

pub use material::{MaterialData, MaterialDesc};
pub use mesh::{
    MeshData, MeshDesc, SubMesh, VertexAttribute, VertexFormat, VertexLayout, VertexSemantic, AABB,
};
pub use resource_library::ResourceLibrary;
pub use shader::{ShaderData, ShaderDesc, ShaderVariant, ShaderVariantDesc, ShaderVariantId};
