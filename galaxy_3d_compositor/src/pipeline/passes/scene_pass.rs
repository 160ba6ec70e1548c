/// Scene pass: draws the view's objects with the shader variant named
/// after the pass.
///
/// Three flavours share the same loop:
///
/// * opaque: objects in insertion order
/// * picking: writes each object's entity id (`EntityId` Draw value) into
///   a signed integer target, never multisampled
/// * transparent: objects sorted back to front from the camera
///
/// Objects whose material, shader or pass variant cannot be resolved are
/// skipped silently, so one object list can feed several scene passes.

use glam::Vec3;
use crate::attachment::{AttachmentFormat, ClearValue, ColorSpace, PassAttachment, PixelFormat};
use crate::context::RenderContext;
use crate::error::Result;
use crate::uniform::{builtin, ShaderUniformData, UniformKey, UniformScope, UniformValue};
use crate::view::{EntityId, ObjectData, RenderView};
use crate::engine_trace;
use super::super::render_pass::RenderPass;
use super::super::sorting::{sort_by_depth, SortOrder};

/// Flavour of a `ScenePass`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKind {
    Opaque,
    Picking,
    Transparent,
}

pub struct ScenePass {
    name: String,
    kind: SceneKind,
    attachments: Vec<PassAttachment>,
    /// Global values pushed after the camera in `prepare`
    globals: ShaderUniformData,
}

impl ScenePass {
    /// Opaque geometry into fresh color and depth attachments
    pub fn opaque(name: &str, color: AttachmentFormat, depth: AttachmentFormat) -> Self {
        Self::new(name, SceneKind::Opaque, vec![
            PassAttachment::transient(color),
            PassAttachment::transient(depth),
        ])
    }

    /// Entity ids into an `R32_SINT` target cleared to "no entity", with
    /// its own `D32_SFLOAT_S8_UINT` depth
    pub fn picking(name: &str) -> Self {
        let pick = AttachmentFormat::color(PixelFormat::R32_SINT, ColorSpace::Linear);
        let no_entity = EntityId::NONE_PICK_VALUE as f32;
        Self::new(name, SceneKind::Picking, vec![
            PassAttachment::transient(pick).with_clear_value(ClearValue::Color([no_entity, 0.0, 0.0, 0.0])),
            PassAttachment::transient(AttachmentFormat::depth_stencil(PixelFormat::D32_SFLOAT_S8_UINT)),
        ])
    }

    /// Blended geometry on top of attachments 0 (color) and 1 (depth) of `source_pass`
    pub fn transparent(name: &str, source_pass: &str, color: AttachmentFormat, depth: AttachmentFormat) -> Self {
        Self::new(name, SceneKind::Transparent, vec![
            PassAttachment::from_pass(source_pass, 0, color),
            PassAttachment::from_pass(source_pass, 1, depth),
        ])
    }

    fn new(name: &str, kind: SceneKind, attachments: Vec<PassAttachment>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            attachments,
            globals: ShaderUniformData::new(),
        }
    }

    /// Replace the default attachments
    pub fn with_attachments(mut self, attachments: Vec<PassAttachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Global value this pass overrides (e.g. a jittered projection)
    pub fn with_global(mut self, key: UniformKey, value: impl Into<UniformValue>) -> Self {
        self.globals.set(key, value);
        self
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    /// Indices drawn this frame, in draw order
    fn draw_list(&self, ctx: &RenderContext<'_>, view: &RenderView) -> Vec<usize> {
        let resources = ctx.resources();
        let mut indices = view.visible_object_indices(resources, ctx.config().frustum_culling);
        if self.kind == SceneKind::Transparent {
            let eye = view.camera_position();
            let objects = view.render_objects();
            sort_by_depth(
                &mut indices,
                |index| world_center(&objects[index], ctx).distance_squared(eye),
                SortOrder::BackToFront,
            );
        }
        indices
    }
}

impl RenderPass for ScenePass {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_attachments(&self) -> &[PassAttachment] {
        &self.attachments
    }

    fn supports_msaa(&self) -> bool {
        self.kind != SceneKind::Picking
    }

    fn prepare(&mut self, ctx: &mut RenderContext<'_>, view: &RenderView) -> Result<()> {
        // Values the view holds win over the raw camera matrices
        let camera: [(UniformKey, UniformValue); 4] = [
            (builtin::VIEW_MATRIX, (*view.view_matrix()).into()),
            (builtin::PROJECTION_MATRIX, (*view.projection_matrix()).into()),
            (builtin::VIEW_PROJECTION_MATRIX, view.view_projection_matrix().into()),
            (builtin::CAMERA_POSITION, view.camera_position().into()),
        ];
        for (key, fallback) in camera {
            let value = view.global_values().get(key).copied().unwrap_or(fallback);
            ctx.set_value(UniformScope::Global, key, value);
        }
        for (key, value) in self.globals.iter() {
            ctx.set_value(UniformScope::Global, *key, *value);
        }
        Ok(())
    }

    fn execute(&mut self, ctx: &mut RenderContext<'_>, view: &RenderView) -> Result<()> {
        let resources = ctx.resources();
        let objects = view.render_objects();

        for index in self.draw_list(ctx, view) {
            let object = &objects[index];
            let Some(material) = resources.material_data(object.material) else {
                engine_trace!("galaxy3d::ScenePass", "Pass '{}': object {} has no material", self.name, index);
                continue;
            };
            let Some(variant) = resources
                .shader_data(material.shader())
                .and_then(|shader| shader.variant(&self.name))
            else {
                engine_trace!("galaxy3d::ScenePass", "Pass '{}': material '{}' has no variant for this pass",
                    self.name, material.name());
                continue;
            };

            ctx.set_shader(variant);
            ctx.set_material(object.material)?;
            ctx.set_matrix4x4(UniformScope::Draw, builtin::MODEL_MATRIX, object.transform);
            if self.kind == SceneKind::Picking {
                ctx.set_int(UniformScope::Draw, builtin::ENTITY_ID, object.pick_value());
            }
            for (key, value) in object.overrides.iter() {
                ctx.set_value(UniformScope::Draw, *key, *value);
            }
            ctx.draw(object.mesh, object.submesh)?;
        }
        Ok(())
    }
}

/// World-space center of an object's bounds (its origin if the mesh is unknown)
fn world_center(object: &ObjectData, ctx: &RenderContext<'_>) -> Vec3 {
    let local = ctx
        .resources()
        .mesh_data(object.mesh)
        .map_or(Vec3::ZERO, |mesh| mesh.bounds().center());
    object.transform.transform_point3(local)
}

#[cfg(test)]
#[path = "scene_pass_tests.rs"]
mod tests;
