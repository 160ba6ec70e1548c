/// RenderView: everything one frame renders, as seen from one camera.
///
/// A view is created empty, set up with the frame's render targets and
/// camera, then filled by scene data providers with objects and Global
/// uniform values. The executor seals it before the first pass; from then
/// on it is read-only. A view is valid for exactly one frame.
///
/// Views are `Send`: a producer thread can fill the next frame's view while
/// the current one executes.

use std::ops::Range;
use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3};
use rustc_hash::FxHashSet;
use crate::attachment::{Extent2D, FrameTargets};
use crate::device::{Rect2D, Viewport};
use crate::error::Result;
use crate::resource::{MaterialHandle, MeshHandle, ResourceLibrary};
use crate::uniform::{builtin, ShaderUniformData, ShaderUniformLayout, UniformKey, UniformValue};
use crate::utils::Generation;
use crate::{engine_bail, engine_trace, engine_violation};
use super::frustum::Frustum;
use super::object_data::{EntityId, ObjectData};

#[derive(Debug)]
pub struct RenderView {
    targets: Option<FrameTargets>,
    viewport: Viewport,
    scissor: Option<Rect2D>,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    frustum: Frustum,
    sample_count: u32,
    global_layout: Arc<ShaderUniformLayout>,
    globals: ShaderUniformData,
    /// Global keys last written by `setup` rather than by the caller
    camera_keys: FxHashSet<UniformKey>,
    global_generation: Generation,
    objects: Vec<ObjectData>,
    sealed: bool,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            targets: None,
            viewport: Viewport::from_size(0, 0),
            scissor: None,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::infinite(),
            sample_count: 1,
            global_layout: ShaderUniformLayout::empty(),
            globals: ShaderUniformData::new(),
            camera_keys: FxHashSet::default(),
            global_generation: Generation::INITIAL,
            objects: Vec::new(),
            sealed: false,
        }
    }
}

impl RenderView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the frame's targets and camera.
    ///
    /// Also publishes the camera as Global values (`ViewMatrix`,
    /// `ProjectionMatrix`, `ViewProjectionMatrix`, `CameraPosition`,
    /// `ViewportSize`) unless the caller already set them explicitly.
    ///
    /// # Errors
    ///
    /// `InvalidResource` if `sample_count` differs from the targets' sample
    /// count; `ContractViolation` once the view is sealed.
    #[allow(clippy::too_many_arguments)]
    pub fn setup(
        &mut self,
        targets: FrameTargets,
        viewport: Viewport,
        view_matrix: Mat4,
        projection_matrix: Mat4,
        frustum: Frustum,
        sample_count: u32,
        global_layout: Arc<ShaderUniformLayout>,
    ) -> Result<()> {
        self.ensure_writable("setup")?;
        if sample_count != targets.sample_count() {
            engine_bail!("galaxy3d::RenderView", InvalidResource =>
                "View sample count {} does not match its targets ({})",
                sample_count, targets.sample_count());
        }

        self.targets = Some(targets);
        self.viewport = viewport;
        self.view_matrix = view_matrix;
        self.projection_matrix = projection_matrix;
        self.frustum = frustum;
        self.sample_count = sample_count;
        self.global_layout = global_layout;

        let camera_values: [(UniformKey, UniformValue); 5] = [
            (builtin::VIEW_MATRIX, view_matrix.into()),
            (builtin::PROJECTION_MATRIX, projection_matrix.into()),
            (builtin::VIEW_PROJECTION_MATRIX, (projection_matrix * view_matrix).into()),
            (builtin::CAMERA_POSITION, self.camera_position().into()),
            (builtin::VIEWPORT_SIZE, Vec2::new(viewport.width, viewport.height).into()),
        ];
        for (key, value) in camera_values {
            if !self.globals.contains(key) || self.camera_keys.contains(&key) {
                self.globals.set(key, value);
                self.camera_keys.insert(key);
            }
        }
        self.global_generation.bump();
        Ok(())
    }

    pub fn is_setup(&self) -> bool {
        self.targets.is_some()
    }

    // ===== CAMERA & TARGETS =====

    pub fn targets(&self) -> Option<&FrameTargets> {
        self.targets.as_ref()
    }

    /// Mutable targets (clear colors...), only before sealing
    pub fn targets_mut(&mut self) -> Option<&mut FrameTargets> {
        if self.sealed {
            return None;
        }
        self.targets.as_mut()
    }

    pub fn extent(&self) -> Extent2D {
        self.targets.as_ref().map(FrameTargets::extent).unwrap_or_default()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Explicit scissor or the viewport bounds
    pub fn scissor(&self) -> Rect2D {
        self.scissor.unwrap_or_else(|| self.viewport.to_rect())
    }

    pub fn set_scissor(&mut self, scissor: Option<Rect2D>) -> Result<()> {
        self.ensure_writable("set_scissor")?;
        self.scissor = scissor;
        Ok(())
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    pub fn camera_position(&self) -> Vec3 {
        self.view_matrix.inverse().w_axis.truncate()
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    // ===== GLOBAL UNIFORMS =====

    pub fn global_layout(&self) -> &Arc<ShaderUniformLayout> {
        &self.global_layout
    }

    pub fn global_values(&self) -> &ShaderUniformData {
        &self.globals
    }

    /// Bumped on every Global write
    pub fn global_generation(&self) -> Generation {
        self.global_generation
    }

    /// Merge values into the Global scope (last write wins)
    pub fn set_global_uniform_values(&mut self, values: &ShaderUniformData) -> Result<()> {
        self.ensure_writable("set_global_uniform_values")?;
        self.globals.merge(values);
        for (key, _) in values.iter() {
            self.camera_keys.remove(key);
        }
        self.global_generation.bump();
        Ok(())
    }

    pub fn set_global_uniform(&mut self, key: UniformKey, value: impl Into<UniformValue>) -> Result<()> {
        self.ensure_writable("set_global_uniform")?;
        self.globals.set(key, value);
        self.camera_keys.remove(&key);
        self.global_generation.bump();
        Ok(())
    }

    // ===== OBJECTS =====

    /// Append an object; returns its index
    pub fn add_render_object(
        &mut self,
        mesh: MeshHandle,
        submesh: usize,
        transform: Mat4,
        material: MaterialHandle,
    ) -> Result<usize> {
        self.ensure_writable("add_render_object")?;
        self.objects.push(ObjectData::new(mesh, submesh, transform, material));
        Ok(self.objects.len() - 1)
    }

    /// Append an object owned by `entity` (pickable); returns its index.
    ///
    /// # Errors
    ///
    /// `InvalidResource` if `entity` is above `EntityId::MAX`.
    pub fn add_entity_object(
        &mut self,
        entity: EntityId,
        mesh: MeshHandle,
        submesh: usize,
        transform: Mat4,
        material: MaterialHandle,
    ) -> Result<usize> {
        let entity = EntityId::new(entity.0)?;
        let index = self.add_render_object(mesh, submesh, transform, material)?;
        self.objects[index].entity = Some(entity);
        Ok(index)
    }

    /// Per-object Draw-scope value
    pub fn set_object_uniform(&mut self, index: usize, key: UniformKey, value: impl Into<UniformValue>) -> Result<()> {
        self.ensure_writable("set_object_uniform")?;
        let count = self.objects.len();
        let Some(object) = self.objects.get_mut(index) else {
            engine_bail!("galaxy3d::RenderView", InvalidResource =>
                "Object index {} out of range ({} objects)", index, count);
        };
        object.overrides.set(key, value);
        Ok(())
    }

    pub fn render_objects(&self) -> &[ObjectData] {
        &self.objects
    }

    pub fn render_object(&self, index: usize) -> Option<&ObjectData> {
        self.objects.get(index)
    }

    pub fn render_object_indices(&self) -> Range<usize> {
        0..self.objects.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Drop indices whose world bounds lie fully outside the frustum.
    ///
    /// Conservative: objects whose mesh is unknown are kept.
    pub fn filter_outside_frustum(&self, indices: &mut Vec<usize>, resources: &ResourceLibrary) {
        let before = indices.len();
        indices.retain(|&index| {
            let Some(object) = self.objects.get(index) else {
                return false;
            };
            match resources.mesh_data(object.mesh) {
                Some(mesh) => self.frustum.intersects_aabb(&mesh.bounds().transformed(&object.transform)),
                None => true,
            }
        });
        if indices.len() != before {
            engine_trace!("galaxy3d::RenderView", "Frustum culled {} of {} objects",
                before - indices.len(), before);
        }
    }

    /// All object indices, frustum-filtered when `culling` is set
    pub fn visible_object_indices(&self, resources: &ResourceLibrary, culling: bool) -> Vec<usize> {
        let mut indices: Vec<usize> = self.render_object_indices().collect();
        if culling {
            self.filter_outside_frustum(&mut indices, resources);
        }
        indices
    }

    // ===== SEALING =====

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Freeze the view for execution
    pub(crate) fn seal(&mut self) -> Result<()> {
        self.ensure_writable("seal")?;
        self.sealed = true;
        Ok(())
    }

    fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.sealed {
            return Err(engine_violation!("galaxy3d::RenderView",
                "{} called on a sealed view", operation));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "render_view_tests.rs"]
mod tests;
