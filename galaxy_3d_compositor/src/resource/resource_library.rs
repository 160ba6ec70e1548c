/// Resource library: slot-map arenas of immutable resource snapshots.
///
/// Each resource is stored as an `Arc` snapshot. Replacing a resource swaps
/// the snapshot under the same handle, so frames already holding the old
/// `Arc` keep a consistent view while later lookups see the new data.
/// Removing a resource frees its slot for reuse; stale handles then fail
/// lookups instead of aliasing the new occupant.

use std::sync::Arc;
use slotmap::SlotMap;
use crate::error::Result;
use crate::uniform::UniformKey;
use crate::{engine_bail, engine_debug, engine_warn};
use super::material::{MaterialData, MaterialDesc};
use super::mesh::{MeshData, MeshDesc};
use super::shader::{ShaderData, ShaderDesc};
use super::{MaterialHandle, MeshHandle, ShaderHandle};

#[derive(Default)]
pub struct ResourceLibrary {
    meshes: SlotMap<MeshHandle, Arc<MeshData>>,
    shaders: SlotMap<ShaderHandle, Arc<ShaderData>>,
    materials: SlotMap<MaterialHandle, Arc<MaterialData>>,
}

impl ResourceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== MESHES =====

    pub fn create_mesh(&mut self, desc: MeshDesc) -> Result<MeshHandle> {
        let mesh = MeshData::from_desc(desc)?;
        engine_debug!("galaxy3d::ResourceLibrary", "Created mesh '{}'", mesh.name());
        Ok(self.meshes.insert(Arc::new(mesh)))
    }

    pub fn mesh_data(&self, handle: MeshHandle) -> Option<&Arc<MeshData>> {
        self.meshes.get(handle)
    }

    /// Swap the mesh snapshot behind `handle`
    pub fn replace_mesh(&mut self, handle: MeshHandle, desc: MeshDesc) -> Result<()> {
        let mesh = MeshData::from_desc(desc)?;
        match self.meshes.get_mut(handle) {
            Some(slot) => {
                *slot = Arc::new(mesh);
                Ok(())
            }
            None => engine_bail!("galaxy3d::ResourceLibrary", InvalidResource =>
                "Cannot replace mesh '{}': handle is not valid", mesh.name()),
        }
    }

    pub fn remove_mesh(&mut self, handle: MeshHandle) -> Option<Arc<MeshData>> {
        self.meshes.remove(handle)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    // ===== SHADERS =====

    pub fn create_shader(&mut self, desc: ShaderDesc) -> Result<ShaderHandle> {
        ShaderData::validate(&desc)?;
        engine_debug!("galaxy3d::ResourceLibrary", "Created shader '{}'", desc.name);
        // Variant ids embed the handle
        Ok(self.shaders.insert_with_key(|handle| Arc::new(ShaderData::from_desc(handle, desc))))
    }

    pub fn shader_data(&self, handle: ShaderHandle) -> Option<&Arc<ShaderData>> {
        self.shaders.get(handle)
    }

    /// Swap the shader snapshot behind `handle` (hot reload)
    pub fn replace_shader(&mut self, handle: ShaderHandle, desc: ShaderDesc) -> Result<()> {
        if !self.shaders.contains_key(handle) {
            engine_bail!("galaxy3d::ResourceLibrary", InvalidResource =>
                "Cannot replace shader '{}': handle is not valid", desc.name);
        }
        ShaderData::validate(&desc)?;
        self.shaders[handle] = Arc::new(ShaderData::from_desc(handle, desc));
        Ok(())
    }

    /// Remove a shader. Materials still referencing it fail to resolve at draw time.
    pub fn remove_shader(&mut self, handle: ShaderHandle) -> Option<Arc<ShaderData>> {
        self.shaders.remove(handle)
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    // ===== MATERIALS =====

    pub fn create_material(&mut self, desc: MaterialDesc) -> Result<MaterialHandle> {
        let material = self.build_material(desc)?;
        Ok(self.materials.insert(Arc::new(material)))
    }

    pub fn material_data(&self, handle: MaterialHandle) -> Option<&Arc<MaterialData>> {
        self.materials.get(handle)
    }

    pub fn replace_material(&mut self, handle: MaterialHandle, desc: MaterialDesc) -> Result<()> {
        let material = self.build_material(desc)?;
        match self.materials.get_mut(handle) {
            Some(slot) => {
                *slot = Arc::new(material);
                Ok(())
            }
            None => engine_bail!("galaxy3d::ResourceLibrary", InvalidResource =>
                "Cannot replace material '{}': handle is not valid", material.name()),
        }
    }

    pub fn remove_material(&mut self, handle: MaterialHandle) -> Option<Arc<MaterialData>> {
        self.materials.remove(handle)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Drop every resource
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.shaders.clear();
        self.materials.clear();
    }

    fn build_material(&self, desc: MaterialDesc) -> Result<MaterialData> {
        let Some(shader) = self.shaders.get(desc.shader) else {
            engine_bail!("galaxy3d::ResourceLibrary", InvalidResource =>
                "Material '{}' references an unknown shader", desc.name);
        };

        let material = MaterialData::from_desc(desc)?;

        for name in material.param_names() {
            let declared = shader
                .variants()
                .iter()
                .any(|v| v.uniform_layout().contains(UniformKey::from_name(name)));
            if !declared {
                engine_warn!("galaxy3d::ResourceLibrary",
                    "Material '{}': parameter '{}' is not declared by shader '{}'",
                    material.name(), name, shader.name());
            }
        }

        Ok(material)
    }
}

#[cfg(test)]
#[path = "resource_library_tests.rs"]
mod tests;
