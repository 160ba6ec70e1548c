/// RenderContext: the only component emitting GPU-visible state during a pass.
///
/// One context is created per pass per frame. Passes bind shader variants,
/// stage uniform writes and issue draws through it; the context turns them
/// into commands, flushing uniforms in scope order (Global, Instance, Draw)
/// right before each draw.
///
/// * Global values come from the view, overridden by Global writes made on
///   this context. The resolved Global block is cached and only re-resolved
///   when a Global write moved its generation.
/// * Instance values come from the last `set_material` plus Instance
///   writes. They persist across draws until replaced.
/// * Draw values are consumed by the next draw attempt, drawn or skipped.
///
/// Every scope is resolved against its declared layout, so a draw never
/// sees an undeclared or uninitialised value: missing keys fall back to the
/// declared defaults.

use std::sync::Arc;
use glam::{Mat4, Vec3, Vec4};
use crate::attachment::RenderTarget;
use crate::config::CompositorConfig;
use crate::device::{Command, CommandList, ImageHandle, Rect2D, Viewport};
use crate::error::Result;
use crate::resource::{MaterialHandle, MeshData, MeshHandle, ResourceLibrary, ShaderVariant, ShaderVariantId, VertexLayout};
use crate::uniform::{
    ResolvedUniforms, ShaderUniformData, ShaderUniformLayout, TextureBinding, UniformKey, UniformScope,
    UniformValue,
};
use crate::utils::{Cached, Generation};
use crate::view::RenderView;
use crate::{engine_bail, engine_trace, engine_violation, engine_warn};
use super::frame_context::FrameContext;

/// Phase of the pass the context belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassPhase {
    /// Uniform setup only, draws are rejected
    Prepare,
    Execute,
}

/// Why a draw was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    UnknownMesh,
    UnknownSubmesh,
    /// Index range beyond the mesh's index buffer
    IndexRangeOutOfBounds,
    /// The mesh lacks a vertex input the bound variant reads
    VertexLayoutMismatch,
    /// A bound texture is also an attachment of the current pass
    AttachmentFeedback,
}

/// Result of a draw request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawOutcome {
    Drawn,
    Skipped(SkipReason),
}

impl DrawOutcome {
    pub fn is_drawn(&self) -> bool {
        *self == DrawOutcome::Drawn
    }
}

/// Per-pass counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub draws: u32,
    pub skipped_draws: u32,
    pub shader_binds: u32,
    /// Binds of the already bound variant (no command recorded)
    pub elided_binds: u32,
    /// Uniform blocks recorded
    pub uniform_uploads: u32,
}

impl RenderStats {
    pub(crate) fn accumulate(&mut self, other: &RenderStats) {
        self.draws += other.draws;
        self.skipped_draws += other.skipped_draws;
        self.shader_binds += other.shader_binds;
        self.elided_binds += other.elided_binds;
        self.uniform_uploads += other.uniform_uploads;
    }
}

#[derive(Debug, Clone)]
struct BoundShader {
    id: ShaderVariantId,
    uniforms: Arc<ShaderUniformLayout>,
    vertex_inputs: VertexLayout,
}

#[derive(Debug, Clone, Copy)]
enum DrawCall {
    Vertices {
        mesh: Option<MeshHandle>,
        vertex_count: u32,
        first_vertex: u32,
    },
    Indexed {
        mesh: MeshHandle,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    },
}

pub struct RenderContext<'a> {
    frame: &'a FrameContext<'a>,
    view: &'a RenderView,
    commands: &'a mut CommandList,
    pass_index: usize,
    pass_name: String,
    targets: &'a [RenderTarget],
    sampled: Vec<ImageHandle>,
    phase: PassPhase,
    bound: Option<BoundShader>,

    global_overrides: ShaderUniformData,
    global_generation: Generation,
    global_cache: Cached<ResolvedUniforms>,
    uploaded_global: Option<Generation>,

    instance_values: ShaderUniformData,
    instance_dirty: bool,
    current_material: Option<MaterialHandle>,

    draw_values: ShaderUniformData,
    bound_mesh: Option<MeshHandle>,
    stats: RenderStats,
}

impl<'a> RenderContext<'a> {
    /// Context for pass `pass_index`, starting in the prepare phase
    pub(crate) fn new(
        frame: &'a FrameContext<'a>,
        view: &'a RenderView,
        commands: &'a mut CommandList,
        pass_index: usize,
        pass_name: &str,
        targets: &'a [RenderTarget],
        sampled: Vec<ImageHandle>,
    ) -> Self {
        Self {
            frame,
            view,
            commands,
            pass_index,
            pass_name: pass_name.to_string(),
            targets,
            sampled,
            phase: PassPhase::Prepare,
            bound: None,
            global_overrides: ShaderUniformData::new(),
            global_generation: view.global_generation(),
            global_cache: Cached::new(),
            uploaded_global: None,
            instance_values: ShaderUniformData::new(),
            instance_dirty: true,
            current_material: None,
            draw_values: ShaderUniformData::new(),
            bound_mesh: None,
            stats: RenderStats::default(),
        }
    }

    pub(crate) fn begin_execute(&mut self) {
        self.phase = PassPhase::Execute;
    }

    // ===== ACCESSORS =====

    pub fn frame(&self) -> &'a FrameContext<'a> {
        self.frame
    }

    pub fn resources(&self) -> &'a ResourceLibrary {
        self.frame.resources()
    }

    pub fn config(&self) -> &'a CompositorConfig {
        self.frame.config()
    }

    pub fn view(&self) -> &'a RenderView {
        self.view
    }

    pub fn pass_index(&self) -> usize {
        self.pass_index
    }

    pub fn pass_name(&self) -> &str {
        &self.pass_name
    }

    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// Attachments the pass renders into
    pub fn targets(&self) -> &'a [RenderTarget] {
        self.targets
    }

    /// Image of the `index`-th sampled attachment of the pass
    pub fn sampled_attachment(&self, index: usize) -> Option<ImageHandle> {
        self.sampled.get(index).copied()
    }

    pub fn sampled_attachment_count(&self) -> usize {
        self.sampled.len()
    }

    pub fn bound_shader(&self) -> Option<ShaderVariantId> {
        self.bound.as_ref().map(|b| b.id)
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    // ===== STATE =====

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(Command::SetViewport(viewport));
    }

    pub fn set_scissor(&mut self, scissor: Rect2D) {
        self.commands.push(Command::SetScissor(scissor));
    }

    /// Bind a shader variant. Binding the variant already bound records nothing.
    pub fn set_shader(&mut self, variant: &ShaderVariant) {
        if self.bound.as_ref().is_some_and(|b| b.id == variant.id()) {
            self.stats.elided_binds += 1;
            return;
        }
        self.commands.push(Command::BindShader(variant.id()));
        self.bound = Some(BoundShader {
            id: variant.id(),
            uniforms: Arc::clone(variant.uniform_layout()),
            vertex_inputs: variant.vertex_inputs().clone(),
        });
        // New layout: the Instance block must be re-resolved against it
        self.instance_dirty = true;
        self.stats.shader_binds += 1;
    }

    /// Apply a material's Instance values and textures.
    ///
    /// Re-applying the material already applied is a no-op. Instance values
    /// set directly afterwards are replaced.
    ///
    /// # Errors
    ///
    /// `InvalidResource` if the material does not exist.
    pub fn set_material(&mut self, material: MaterialHandle) -> Result<()> {
        if self.current_material == Some(material) {
            return Ok(());
        }
        let Some(data) = self.frame.resources().material_data(material) else {
            engine_bail!("galaxy3d::RenderContext", InvalidResource =>
                "Pass '{}': unknown material", self.pass_name);
        };
        self.instance_values.clone_from(data.values());
        self.instance_dirty = true;
        self.current_material = Some(material);
        Ok(())
    }

    // ===== UNIFORM WRITES =====

    /// Stage a uniform write.
    ///
    /// Global writes override the view's values for the rest of this pass.
    /// Instance writes persist until the next material. Draw writes apply
    /// to the next draw only.
    pub fn set_value(&mut self, scope: UniformScope, key: UniformKey, value: impl Into<UniformValue>) {
        let value = value.into();
        match scope {
            UniformScope::Global => {
                self.global_overrides.set(key, value);
                self.global_generation.bump();
            }
            UniformScope::Instance => {
                self.instance_values.set(key, value);
                self.instance_dirty = true;
                self.current_material = None;
            }
            UniformScope::Draw => {
                self.draw_values.set(key, value);
            }
        }
    }

    pub fn set_matrix4x4(&mut self, scope: UniformScope, key: UniformKey, value: Mat4) {
        self.set_value(scope, key, value);
    }

    pub fn set_float4(&mut self, scope: UniformScope, key: UniformKey, value: Vec4) {
        self.set_value(scope, key, value);
    }

    pub fn set_float3(&mut self, scope: UniformScope, key: UniformKey, value: Vec3) {
        self.set_value(scope, key, value);
    }

    pub fn set_float(&mut self, scope: UniformScope, key: UniformKey, value: f32) {
        self.set_value(scope, key, value);
    }

    pub fn set_int(&mut self, scope: UniformScope, key: UniformKey, value: i32) {
        self.set_value(scope, key, value);
    }

    pub fn set_uint(&mut self, scope: UniformScope, key: UniformKey, value: u32) {
        self.set_value(scope, key, value);
    }

    pub fn set_texture(&mut self, scope: UniformScope, key: UniformKey, texture: TextureBinding) {
        self.set_value(scope, key, texture);
    }

    /// Value the next draw would see for `key`.
    ///
    /// `None` if `key` is not declared in `scope` (Global: by the view's
    /// global layout; Instance and Draw: by the bound variant).
    pub fn resolved_value(&self, scope: UniformScope, key: UniformKey) -> Option<UniformValue> {
        match scope {
            UniformScope::Global => self.view.global_layout().resolve_value(
                scope,
                key,
                &[&self.global_overrides, self.view.global_values()],
            ),
            UniformScope::Instance => self
                .bound
                .as_ref()
                .and_then(|b| b.uniforms.resolve_value(scope, key, &[&self.instance_values])),
            UniformScope::Draw => self
                .bound
                .as_ref()
                .and_then(|b| b.uniforms.resolve_value(scope, key, &[&self.draw_values])),
        }
    }

    // ===== DRAWS =====

    /// Draw one submesh of `mesh` with the bound variant
    pub fn draw(&mut self, mesh: MeshHandle, submesh: usize) -> Result<DrawOutcome> {
        let layout = self.ensure_can_draw("draw")?;
        let call = self.submesh_call(mesh, submesh);
        Ok(self.finish_draw(&layout, call))
    }

    /// Draw `index_count` indices of `mesh` starting at `index_offset`
    pub fn draw_indexed(&mut self, mesh: MeshHandle, index_offset: u32, index_count: u32) -> Result<DrawOutcome> {
        let layout = self.ensure_can_draw("draw_indexed")?;
        let call = self.indexed_call(mesh, index_offset, index_count);
        Ok(self.finish_draw(&layout, call))
    }

    /// Draw vertices generated by the shader, with no mesh bound
    pub fn draw_procedural(&mut self, vertex_count: u32) -> Result<DrawOutcome> {
        let layout = self.ensure_can_draw("draw_procedural")?;
        let call = Ok(DrawCall::Vertices { mesh: None, vertex_count, first_vertex: 0 });
        Ok(self.finish_draw(&layout, call))
    }

    /// Counters of the pass; the context is done
    pub(crate) fn finish(self) -> RenderStats {
        self.stats
    }

    // ===== INTERNALS =====

    /// Uniform layout of the bound variant, if drawing is allowed
    fn ensure_can_draw(&self, operation: &str) -> Result<Arc<ShaderUniformLayout>> {
        if self.phase == PassPhase::Prepare {
            return Err(engine_violation!("galaxy3d::RenderContext",
                "Pass '{}': {} called during prepare", self.pass_name, operation));
        }
        match &self.bound {
            Some(bound) => Ok(Arc::clone(&bound.uniforms)),
            None => Err(engine_violation!("galaxy3d::RenderContext",
                "Pass '{}': {} called with no shader bound", self.pass_name, operation)),
        }
    }

    fn submesh_call(&self, mesh: MeshHandle, submesh: usize) -> std::result::Result<DrawCall, SkipReason> {
        let data = self.mesh_for_draw(mesh)?;
        let Some(range) = data.submesh(submesh) else {
            return Err(SkipReason::UnknownSubmesh);
        };
        Ok(if data.is_indexed() {
            let Ok(vertex_offset) = i32::try_from(range.first_vertex) else {
                return Err(SkipReason::IndexRangeOutOfBounds);
            };
            DrawCall::Indexed {
                mesh,
                index_count: range.index_count,
                first_index: range.first_index,
                vertex_offset,
            }
        } else {
            DrawCall::Vertices {
                mesh: Some(mesh),
                vertex_count: range.vertex_count,
                first_vertex: range.first_vertex,
            }
        })
    }

    fn indexed_call(&self, mesh: MeshHandle, index_offset: u32, index_count: u32) -> std::result::Result<DrawCall, SkipReason> {
        let data = self.mesh_for_draw(mesh)?;
        let end = index_offset as u64 + index_count as u64;
        if !data.is_indexed() || end > data.index_count() as u64 {
            return Err(SkipReason::IndexRangeOutOfBounds);
        }
        Ok(DrawCall::Indexed { mesh, index_count, first_index: index_offset, vertex_offset: 0 })
    }

    /// Mesh data, checked against the bound variant's vertex inputs
    fn mesh_for_draw(&self, mesh: MeshHandle) -> std::result::Result<&'a MeshData, SkipReason> {
        let Some(data) = self.frame.resources().mesh_data(mesh) else {
            return Err(SkipReason::UnknownMesh);
        };
        if let Some(bound) = &self.bound {
            if let Some(missing) = data.vertex_layout().missing_input(&bound.vertex_inputs) {
                engine_trace!("galaxy3d::RenderContext",
                    "Mesh '{}' does not provide {:?} as {:?}", data.name(), missing.semantic, missing.format);
                return Err(SkipReason::VertexLayoutMismatch);
            }
        }
        Ok(data.as_ref())
    }

    /// Record the draw or log the skip; Draw values are consumed either way
    fn finish_draw(&mut self, layout: &ShaderUniformLayout, call: std::result::Result<DrawCall, SkipReason>) -> DrawOutcome {
        let outcome = match call {
            Ok(call) => self.record(layout, call),
            Err(reason) => DrawOutcome::Skipped(reason),
        };
        if let DrawOutcome::Skipped(reason) = outcome {
            engine_warn!("galaxy3d::RenderContext", "Pass '{}': draw skipped ({:?})", self.pass_name, reason);
            self.stats.skipped_draws += 1;
        }
        self.draw_values.clear();
        outcome
    }

    fn record(&mut self, layout: &ShaderUniformLayout, call: DrawCall) -> DrawOutcome {
        let view = self.view;
        let overrides = &self.global_overrides;

        let global = self.global_cache.get_or_update(self.global_generation, || {
            view.global_layout().resolve(UniformScope::Global, &[overrides, view.global_values()])
        });
        let instance = self
            .instance_dirty
            .then(|| layout.resolve(UniformScope::Instance, &[&self.instance_values]));
        let draw = layout.resolve(UniformScope::Draw, &[&self.draw_values]);

        let feedback = [Some(global), instance.as_ref(), Some(&draw)]
            .into_iter()
            .flatten()
            .any(|resolved| samples_target(self.targets, resolved));
        if feedback {
            return DrawOutcome::Skipped(SkipReason::AttachmentFeedback);
        }

        if self.uploaded_global != Some(self.global_generation) {
            if view.global_layout().has_scope(UniformScope::Global) {
                push_uniforms(self.commands, UniformScope::Global, global);
                self.stats.uniform_uploads += 1;
            }
            self.uploaded_global = Some(self.global_generation);
        }
        if let Some(instance) = &instance {
            if layout.has_scope(UniformScope::Instance) {
                push_uniforms(self.commands, UniformScope::Instance, instance);
                self.stats.uniform_uploads += 1;
            }
            self.instance_dirty = false;
        }
        if layout.has_scope(UniformScope::Draw) {
            push_uniforms(self.commands, UniformScope::Draw, &draw);
            self.stats.uniform_uploads += 1;
        }

        let mesh = match call {
            DrawCall::Vertices { mesh, .. } => mesh,
            DrawCall::Indexed { mesh, .. } => Some(mesh),
        };
        if let Some(mesh) = mesh {
            if self.bound_mesh != Some(mesh) {
                self.commands.push(Command::BindMesh(mesh));
                self.bound_mesh = Some(mesh);
            }
        }

        self.commands.push(match call {
            DrawCall::Vertices { vertex_count, first_vertex, .. } => Command::Draw { vertex_count, first_vertex },
            DrawCall::Indexed { index_count, first_index, vertex_offset, .. } => {
                Command::DrawIndexed { index_count, first_index, vertex_offset }
            }
        });
        self.stats.draws += 1;
        DrawOutcome::Drawn
    }
}

/// Whether any texture of `resolved` is one of the pass's own attachments
fn samples_target(targets: &[RenderTarget], resolved: &ResolvedUniforms) -> bool {
    resolved
        .textures
        .iter()
        .any(|(_, texture)| !texture.image.is_null() && targets.iter().any(|t| t.uses_image(texture.image)))
}

fn push_uniforms(commands: &mut CommandList, scope: UniformScope, resolved: &ResolvedUniforms) {
    if !resolved.block.bytes().is_empty() {
        commands.push(Command::SetUniforms { scope, block: resolved.block.clone() });
    }
    for &(binding, texture) in &resolved.textures {
        commands.push(Command::BindTexture { scope, binding, texture });
    }
}

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;
