/// Per-frame uniform values and resolved uniform blocks.

use rustc_hash::FxHashMap;
use super::uniform_key::UniformKey;
use super::uniform_value::{TextureBinding, UniformValue};

/// Values supplied for one scope, keyed by uniform key.
///
/// Frame-local: owned by the view, material or context that filled it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderUniformData {
    values: FxHashMap<UniformKey, UniformValue>,
}

impl ShaderUniformData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, key: UniformKey, value: impl Into<UniformValue>) -> Option<UniformValue> {
        self.values.insert(key, value.into())
    }

    /// Set a value by declared name
    pub fn set_named(&mut self, name: &str, value: impl Into<UniformValue>) -> Option<UniformValue> {
        self.set(UniformKey::from_name(name), value)
    }

    pub fn get(&self, key: UniformKey) -> Option<&UniformValue> {
        self.values.get(&key)
    }

    pub fn get_named(&self, name: &str) -> Option<&UniformValue> {
        self.get(UniformKey::from_name(name))
    }

    pub fn contains(&self, key: UniformKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn remove(&mut self, key: UniformKey) -> Option<UniformValue> {
        self.values.remove(&key)
    }

    /// Copy every value of `other` into `self`; `other` wins on conflicts
    pub fn merge(&mut self, other: &ShaderUniformData) {
        self.values.extend(other.values.iter().map(|(k, v)| (*k, *v)));
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UniformKey, &UniformValue)> {
        self.values.iter()
    }

    /// Texture images referenced by the values
    pub fn textures(&self) -> impl Iterator<Item = TextureBinding> + '_ {
        self.values.values().filter_map(UniformValue::as_texture)
    }
}

/// Packed uniform block for one scope, ready for upload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UniformBlock {
    bytes: Vec<u8>,
    values: Vec<(UniformKey, UniformValue)>,
}

impl UniformBlock {
    pub(crate) fn new(bytes: Vec<u8>, values: Vec<(UniformKey, UniformValue)>) -> Self {
        Self { bytes, values }
    }

    /// Packed block contents
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Resolved value of every declaration, textures included, in declaration order
    pub fn values(&self) -> &[(UniformKey, UniformValue)] {
        &self.values
    }

    pub fn value(&self, key: UniformKey) -> Option<&UniformValue> {
        self.values.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of resolving one scope of a layout
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedUniforms {
    pub block: UniformBlock,
    /// (binding, texture) for each texture declaration
    pub textures: Vec<(u32, TextureBinding)>,
}

#[cfg(test)]
#[path = "uniform_data_tests.rs"]
mod tests;
