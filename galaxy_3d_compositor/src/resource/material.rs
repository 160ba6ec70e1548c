/// Material resource.
///
/// A material references a shader and provides the Instance-scope values
/// (scalars, vectors, textures) shared by every draw that uses it.

use rustc_hash::FxHashSet;
use crate::error::Result;
use crate::engine_bail;
use crate::uniform::{ShaderUniformData, UniformKey, UniformValue};
use super::ShaderHandle;

// ===== DESCRIPTOR =====

/// Material creation descriptor
#[derive(Debug, Clone)]
pub struct MaterialDesc {
    pub name: String,
    pub shader: ShaderHandle,
    /// Named Instance-scope values
    pub params: Vec<(String, UniformValue)>,
}

// ===== MATERIAL =====

/// Material resource snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    name: String,
    shader: ShaderHandle,
    values: ShaderUniformData,
    param_names: Vec<String>,
}

impl MaterialData {
    /// Create material from descriptor (shader existence is checked by the library)
    pub(crate) fn from_desc(desc: MaterialDesc) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for (name, _) in &desc.params {
            if !seen.insert(name.as_str()) {
                engine_bail!("galaxy3d::MaterialData", InvalidResource =>
                    "Material '{}': duplicate parameter name '{}'", desc.name, name);
            }
        }

        let mut values = ShaderUniformData::new();
        let mut param_names = Vec::with_capacity(desc.params.len());
        for (name, value) in desc.params {
            values.set_named(&name, value);
            param_names.push(name);
        }

        Ok(Self {
            name: desc.name,
            shader: desc.shader,
            values,
            param_names,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shader(&self) -> ShaderHandle {
        self.shader
    }

    /// Instance-scope values
    pub fn values(&self) -> &ShaderUniformData {
        &self.values
    }

    pub fn param(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(UniformKey::from_name(name))
    }

    /// Parameter names in declaration order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
