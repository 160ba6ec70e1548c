/// Shader uniform layout: per-scope uniform declarations.
///
/// Layouts are built once (usually when a shader is loaded) and shared
/// read-only through `Arc` by every pass and frame that uses them. The
/// declared type of each uniform is the type of its default value.
///
/// Block offsets follow std140-style alignment so a scope's values can be
/// uploaded as one contiguous buffer. Textures are not part of the block;
/// they get a binding index within their scope instead.

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::Result;
use crate::engine_bail;
use super::uniform_data::{ResolvedUniforms, ShaderUniformData, UniformBlock};
use super::uniform_key::UniformKey;
use super::uniform_value::{UniformType, UniformValue};

/// Lifetime of a uniform value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UniformScope {
    /// Set once per view, visible to every pass and object
    Global,
    /// Set once per material, visible to all its draws within a pass
    Instance,
    /// Set per object, consumed by the next draw only
    Draw,
}

impl UniformScope {
    /// All scopes in flush order
    pub const ALL: [UniformScope; 3] = [UniformScope::Global, UniformScope::Instance, UniformScope::Draw];

    pub(crate) fn index(self) -> usize {
        match self {
            UniformScope::Global => 0,
            UniformScope::Instance => 1,
            UniformScope::Draw => 2,
        }
    }
}

/// One declared uniform
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDeclaration {
    name: String,
    key: UniformKey,
    scope: UniformScope,
    default: UniformValue,
    /// Byte offset in the scope block, or binding index for textures
    location: u32,
}

impl UniformDeclaration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> UniformKey {
        self.key
    }

    pub fn scope(&self) -> UniformScope {
        self.scope
    }

    pub fn uniform_type(&self) -> UniformType {
        self.default.uniform_type()
    }

    pub fn default_value(&self) -> &UniformValue {
        &self.default
    }

    /// Byte offset inside the scope block (non-texture uniforms)
    pub fn offset(&self) -> Option<u32> {
        (!self.uniform_type().is_texture()).then_some(self.location)
    }

    /// Binding index inside the scope (texture uniforms)
    pub fn binding(&self) -> Option<u32> {
        self.uniform_type().is_texture().then_some(self.location)
    }
}

/// Immutable set of uniform declarations
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderUniformLayout {
    declarations: Vec<UniformDeclaration>,
    by_key: FxHashMap<UniformKey, usize>,
    block_sizes: [u32; 3],
    texture_counts: [u32; 3],
}

impl ShaderUniformLayout {
    pub fn builder() -> ShaderUniformLayoutBuilder {
        ShaderUniformLayoutBuilder::default()
    }

    /// Layout declaring nothing
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Global layout declaring the camera values a `RenderView` publishes
    pub fn camera_globals() -> Arc<Self> {
        Self::builder()
            .global("ViewMatrix", Mat4::IDENTITY)
            .global("ProjectionMatrix", Mat4::IDENTITY)
            .global("ViewProjectionMatrix", Mat4::IDENTITY)
            .global("CameraPosition", Vec3::ZERO)
            .global("ViewportSize", Vec2::ZERO)
            .build()
            .unwrap_or_else(|_| Self::empty())
    }

    pub fn declarations(&self) -> &[UniformDeclaration] {
        &self.declarations
    }

    /// Declarations of one scope, in declaration order
    pub fn declarations_in(&self, scope: UniformScope) -> impl Iterator<Item = &UniformDeclaration> + '_ {
        self.declarations.iter().filter(move |d| d.scope == scope)
    }

    pub fn declaration(&self, key: UniformKey) -> Option<&UniformDeclaration> {
        self.by_key.get(&key).map(|&index| &self.declarations[index])
    }

    pub fn contains(&self, key: UniformKey) -> bool {
        self.by_key.contains_key(&key)
    }

    /// Size of the scope's uniform block in bytes (multiple of 16)
    pub fn block_size(&self, scope: UniformScope) -> u32 {
        self.block_sizes[scope.index()]
    }

    pub fn texture_count(&self, scope: UniformScope) -> u32 {
        self.texture_counts[scope.index()]
    }

    /// Whether the scope declares anything at all
    pub fn has_scope(&self, scope: UniformScope) -> bool {
        self.block_size(scope) > 0 || self.texture_count(scope) > 0
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Value one declaration resolves to, with the same rules as `resolve`.
    ///
    /// `None` if `key` is not declared in `scope`.
    pub fn resolve_value(&self, scope: UniformScope, key: UniformKey, sources: &[&ShaderUniformData]) -> Option<UniformValue> {
        let declaration = self.declaration(key).filter(|d| d.scope == scope)?;
        let supplied = sources.iter().find_map(|data| data.get(key));
        Some(match supplied {
            Some(value) if value.uniform_type() == declaration.uniform_type() => *value,
            _ => declaration.default,
        })
    }

    /// Resolve every declaration of `scope` against `sources`.
    ///
    /// Sources are searched in order; the first one holding the key wins.
    /// A missing key, or a supplied value whose type differs from the
    /// declaration, resolves to the declared default.
    pub fn resolve(&self, scope: UniformScope, sources: &[&ShaderUniformData]) -> ResolvedUniforms {
        let mut bytes = vec![0u8; self.block_size(scope) as usize];
        let mut values = Vec::new();
        let mut textures = Vec::new();

        for declaration in self.declarations_in(scope) {
            let supplied = sources.iter().find_map(|data| data.get(declaration.key));
            let value = match supplied {
                Some(value) if value.uniform_type() == declaration.uniform_type() => *value,
                Some(value) => {
                    crate::engine_warn!("galaxy3d::ShaderUniformLayout",
                        "Uniform '{}' expects {:?} but got {:?}, using default",
                        declaration.name, declaration.uniform_type(), value.uniform_type());
                    declaration.default
                }
                None => declaration.default,
            };

            match value {
                UniformValue::Texture(texture) => textures.push((declaration.location, texture)),
                _ => {
                    let raw = value.as_bytes();
                    let start = declaration.location as usize;
                    bytes[start..start + raw.len()].copy_from_slice(raw);
                }
            }
            values.push((declaration.key, value));
        }

        ResolvedUniforms {
            block: UniformBlock::new(bytes, values),
            textures,
        }
    }
}

/// Builder for `ShaderUniformLayout`
#[derive(Debug, Default)]
pub struct ShaderUniformLayoutBuilder {
    entries: Vec<(String, UniformScope, UniformValue)>,
}

impl ShaderUniformLayoutBuilder {
    /// Declare a uniform; its type is the type of `default`
    pub fn declare(mut self, scope: UniformScope, name: &str, default: impl Into<UniformValue>) -> Self {
        self.entries.push((name.to_string(), scope, default.into()));
        self
    }

    pub fn global(self, name: &str, default: impl Into<UniformValue>) -> Self {
        self.declare(UniformScope::Global, name, default)
    }

    pub fn instance(self, name: &str, default: impl Into<UniformValue>) -> Self {
        self.declare(UniformScope::Instance, name, default)
    }

    pub fn draw(self, name: &str, default: impl Into<UniformValue>) -> Self {
        self.declare(UniformScope::Draw, name, default)
    }

    /// Freeze the layout.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is declared twice or two names hash to the same key.
    pub fn build(self) -> Result<Arc<ShaderUniformLayout>> {
        let mut names = FxHashSet::default();
        let mut layout = ShaderUniformLayout::default();
        let mut cursors = [0u32; 3];

        for (name, scope, default) in self.entries {
            if !names.insert(name.clone()) {
                engine_bail!("galaxy3d::ShaderUniformLayout", InvalidResource =>
                    "Duplicate uniform name '{}'", name);
            }
            let key = UniformKey::from_name(&name);
            if layout.by_key.contains_key(&key) {
                engine_bail!("galaxy3d::ShaderUniformLayout", InvalidResource =>
                    "Uniform '{}' collides with another uniform key", name);
            }

            let ty = default.uniform_type();
            let scope_index = scope.index();
            let location = if ty.is_texture() {
                let binding = layout.texture_counts[scope_index];
                layout.texture_counts[scope_index] += 1;
                binding
            } else {
                let offset = align_up(cursors[scope_index], ty.alignment());
                cursors[scope_index] = offset + ty.size();
                offset
            };

            layout.by_key.insert(key, layout.declarations.len());
            layout.declarations.push(UniformDeclaration { name, key, scope, default, location });
        }

        for scope in UniformScope::ALL {
            layout.block_sizes[scope.index()] = align_up(cursors[scope.index()], 16);
        }

        Ok(Arc::new(layout))
    }
}

fn align_up(value: u32, alignment: u32) -> u32 {
    if alignment <= 1 {
        value
    } else {
        value.div_ceil(alignment) * alignment
    }
}

#[cfg(test)]
#[path = "uniform_layout_tests.rs"]
mod tests;
