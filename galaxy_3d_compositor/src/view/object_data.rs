/// Per-object draw request stored in a `RenderView` for one frame.

use glam::Mat4;
use crate::resource::{MaterialHandle, MeshHandle};
use crate::error::Result;
use crate::uniform::ShaderUniformData;
use crate::engine_bail;

/// Identifier of the entity an object belongs to (written by the picking pass).
///
/// Picking targets are signed 32-bit, so only `0..=i32::MAX` can be picked;
/// `RenderView::add_entity_object` rejects anything above `EntityId::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Value written to picking targets for objects without an entity
    pub const NONE_PICK_VALUE: i32 = -1;

    /// Largest pickable id
    pub const MAX: EntityId = EntityId(i32::MAX as u32);

    /// # Errors
    ///
    /// `InvalidResource` if `raw` is above `EntityId::MAX`.
    pub fn new(raw: u32) -> Result<Self> {
        let id = EntityId(raw);
        if !id.is_pickable() {
            engine_bail!("galaxy3d::EntityId", InvalidResource =>
                "Entity id {} does not fit a picking target (max {})", raw, Self::MAX.0);
        }
        Ok(id)
    }

    pub fn is_pickable(&self) -> bool {
        self.0 <= Self::MAX.0
    }

    /// Value written to a signed integer picking target
    /// (`NONE_PICK_VALUE` for an id above `EntityId::MAX`)
    pub fn pick_value(&self) -> i32 {
        i32::try_from(self.0).unwrap_or(Self::NONE_PICK_VALUE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectData {
    pub mesh: MeshHandle,
    pub submesh: usize,
    pub material: MaterialHandle,
    /// Model (local to world) matrix
    pub transform: Mat4,
    pub entity: Option<EntityId>,
    /// Draw-scope values applied right before this object's draw
    pub overrides: ShaderUniformData,
}

impl ObjectData {
    pub fn new(mesh: MeshHandle, submesh: usize, transform: Mat4, material: MaterialHandle) -> Self {
        Self {
            mesh,
            submesh,
            material,
            transform,
            entity: None,
            overrides: ShaderUniformData::new(),
        }
    }

    pub fn pick_value(&self) -> i32 {
        self.entity.map_or(EntityId::NONE_PICK_VALUE, |e| e.pick_value())
    }
}
