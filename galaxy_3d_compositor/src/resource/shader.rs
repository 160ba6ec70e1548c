/// Shader resource with per-pass variants.
///
/// A shader groups the variants used by each render pass under the pass
/// name: an object whose shader has both an "opaque" and a "picking"
/// variant is drawn by both passes, an object without a "picking" variant
/// is skipped by the picking pass.

use std::sync::Arc;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::Result;
use crate::engine_bail;
use crate::uniform::ShaderUniformLayout;
use super::mesh::VertexLayout;
use super::ShaderHandle;

/// Identifies one variant of one shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderVariantId {
    pub shader: ShaderHandle,
    pub variant: u32,
}

/// A shader variant bound by one pass
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderVariant {
    id: ShaderVariantId,
    pass_name: String,
    vertex_inputs: VertexLayout,
    uniforms: Arc<ShaderUniformLayout>,
}

impl ShaderVariant {
    pub fn id(&self) -> ShaderVariantId {
        self.id
    }

    /// Name of the pass this variant is used by
    pub fn pass_name(&self) -> &str {
        &self.pass_name
    }

    /// Vertex attributes the variant reads
    pub fn vertex_inputs(&self) -> &VertexLayout {
        &self.vertex_inputs
    }

    pub fn uniform_layout(&self) -> &Arc<ShaderUniformLayout> {
        &self.uniforms
    }
}

/// Shader creation descriptor
#[derive(Debug, Clone)]
pub struct ShaderDesc {
    pub name: String,
    pub variants: Vec<ShaderVariantDesc>,
}

/// Variant descriptor
#[derive(Debug, Clone)]
pub struct ShaderVariantDesc {
    pub pass_name: String,
    pub vertex_inputs: VertexLayout,
    pub uniforms: Arc<ShaderUniformLayout>,
}

/// Shader resource snapshot
#[derive(Debug, Clone)]
pub struct ShaderData {
    name: String,
    variants: Vec<ShaderVariant>,
    variant_names: FxHashMap<String, usize>,
}

impl ShaderData {
    /// Reject descriptors declaring two variants for the same pass
    pub(crate) fn validate(desc: &ShaderDesc) -> Result<()> {
        let mut seen = FxHashSet::default();
        for variant in &desc.variants {
            if !seen.insert(variant.pass_name.as_str()) {
                engine_bail!("galaxy3d::ShaderData", InvalidResource =>
                    "Shader '{}': duplicate variant for pass '{}'", desc.name, variant.pass_name);
            }
        }
        Ok(())
    }

    /// Build from a validated descriptor
    pub(crate) fn from_desc(handle: ShaderHandle, desc: ShaderDesc) -> Self {
        let mut variants = Vec::with_capacity(desc.variants.len());
        let mut variant_names = FxHashMap::default();
        for (index, variant) in desc.variants.into_iter().enumerate() {
            variant_names.insert(variant.pass_name.clone(), index);
            variants.push(ShaderVariant {
                id: ShaderVariantId { shader: handle, variant: index as u32 },
                pass_name: variant.pass_name,
                vertex_inputs: variant.vertex_inputs,
                uniforms: variant.uniforms,
            });
        }

        Self { name: desc.name, variants, variant_names }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variant registered for `pass_name`
    pub fn variant(&self, pass_name: &str) -> Option<&ShaderVariant> {
        self.variant_names.get(pass_name).map(|&i| &self.variants[i])
    }

    pub fn has_variant(&self, pass_name: &str) -> bool {
        self.variant_names.contains_key(pass_name)
    }

    pub fn variants(&self) -> &[ShaderVariant] {
        &self.variants
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
