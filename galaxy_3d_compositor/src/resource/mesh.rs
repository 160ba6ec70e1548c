/// Mesh data as seen by the compositor: vertex layout, submesh ranges and
/// local-space bounds. Vertex/index storage lives on the device side.

use glam::{Mat4, Vec3};
use crate::error::Result;
use crate::engine_bail;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` with half size `extent`
    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        Self { min: center - extent, max: center + extent }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Transform a local-space box, returning the enclosing box (Arvo method)
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }
}

/// Meaning of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Position,
    Normal,
    Tangent,
    Color,
    TexCoord0,
    TexCoord1,
    Joints,
    Weights,
}

/// Storage format of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum VertexFormat {
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,
    R8G8B8A8_UNORM,
    R16G16B16A16_UINT,
}

/// One vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub format: VertexFormat,
}

/// Set of vertex attributes provided by a mesh or expected by a shader
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, semantic: VertexSemantic, format: VertexFormat) -> Self {
        self.attributes.push(VertexAttribute { semantic, format });
        self
    }

    /// Position (float3) + normal (float3) + uv (float2)
    pub fn position_normal_uv() -> Self {
        Self::new()
            .with(VertexSemantic::Position, VertexFormat::R32G32B32_SFLOAT)
            .with(VertexSemantic::Normal, VertexFormat::R32G32B32_SFLOAT)
            .with(VertexSemantic::TexCoord0, VertexFormat::R32G32_SFLOAT)
    }

    pub fn attribute(&self, semantic: VertexSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }

    /// First attribute of `inputs` this layout does not provide with the same format
    pub fn missing_input(&self, inputs: &VertexLayout) -> Option<VertexAttribute> {
        inputs
            .attributes
            .iter()
            .find(|input| self.attribute(input.semantic) != Some(*input))
            .copied()
    }
}

/// Range of a mesh drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    pub first_index: u32,
    pub index_count: u32,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

/// Mesh creation descriptor
#[derive(Debug, Clone)]
pub struct MeshDesc {
    pub name: String,
    pub vertex_layout: VertexLayout,
    pub vertex_count: u32,
    /// 0 for non-indexed meshes
    pub index_count: u32,
    /// Empty means one submesh covering the whole mesh
    pub submeshes: Vec<SubMesh>,
    pub bounds: AABB,
}

/// Mesh resource snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    name: String,
    vertex_layout: VertexLayout,
    vertex_count: u32,
    index_count: u32,
    submeshes: Vec<SubMesh>,
    bounds: AABB,
}

impl MeshData {
    pub(crate) fn from_desc(desc: MeshDesc) -> Result<Self> {
        if desc.vertex_count == 0 {
            engine_bail!("galaxy3d::MeshData", InvalidResource =>
                "Mesh '{}' has no vertices", desc.name);
        }

        let submeshes = if desc.submeshes.is_empty() {
            vec![SubMesh {
                first_index: 0,
                index_count: desc.index_count,
                first_vertex: 0,
                vertex_count: desc.vertex_count,
            }]
        } else {
            desc.submeshes
        };

        for (i, sm) in submeshes.iter().enumerate() {
            let index_end = sm.first_index as u64 + sm.index_count as u64;
            let vertex_end = sm.first_vertex as u64 + sm.vertex_count as u64;
            if index_end > desc.index_count as u64 || vertex_end > desc.vertex_count as u64 {
                engine_bail!("galaxy3d::MeshData", InvalidResource =>
                    "Mesh '{}': submesh {} is out of range", desc.name, i);
            }
        }

        Ok(Self {
            name: desc.name,
            vertex_layout: desc.vertex_layout,
            vertex_count: desc.vertex_count,
            index_count: desc.index_count,
            submeshes,
            bounds: desc.bounds,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_layout(&self) -> &VertexLayout {
        &self.vertex_layout
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_indexed(&self) -> bool {
        self.index_count > 0
    }

    pub fn submesh(&self, index: usize) -> Option<&SubMesh> {
        self.submeshes.get(index)
    }

    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// Local-space bounds
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
