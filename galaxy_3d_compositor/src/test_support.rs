//! Shared fixtures for unit tests: a scriptable pass, a small scene and
//! helpers to compile pipelines and build views against the mock device.

use std::sync::{Arc, Mutex};
use glam::{Mat4, Vec3, Vec4};
use crate::attachment::{
    AttachmentCache, AttachmentFormat, AttachmentRef, ColorSpace, Extent2D, PassAttachment, PixelFormat,
    RendererId,
};
use crate::config::CompositorConfig;
use crate::context::RenderContext;
use crate::device::mock_graphics_device::MockGraphicsDevice;
use crate::device::Viewport;
use crate::error::Result;
use crate::pipeline::{CompiledRenderPipeline, RenderPass, RenderPipelineDesc};
use crate::resource::{
    MaterialDesc, MaterialHandle, MeshDesc, MeshHandle, ResourceLibrary, ShaderDesc, ShaderHandle,
    ShaderVariantDesc, VertexFormat, VertexLayout, VertexSemantic, AABB,
};
use crate::uniform::{ShaderUniformLayout, TextureBinding, UniformValue};
use crate::view::{Camera, RenderView};
use crate::engine_err;

pub(crate) fn color_format() -> AttachmentFormat {
    AttachmentFormat::color(PixelFormat::R8G8B8A8_UNORM, ColorSpace::Srgb)
}

pub(crate) fn depth_format() -> AttachmentFormat {
    AttachmentFormat::depth_stencil(PixelFormat::D32_SFLOAT_S8_UINT)
}

// ============================================================================
// Scriptable pass
// ============================================================================

/// Pass that records its calls and can be told to fail
pub(crate) struct TestPass {
    name: String,
    attachments: Vec<PassAttachment>,
    sampled: Vec<AttachmentRef>,
    msaa: bool,
    fail_execute: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl TestPass {
    pub(crate) fn new(name: &str, attachments: Vec<PassAttachment>) -> Self {
        Self {
            name: name.to_string(),
            attachments,
            sampled: Vec::new(),
            msaa: true,
            fail_execute: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Transient color + depth pass
    pub(crate) fn color_depth(name: &str) -> Self {
        Self::new(name, vec![
            PassAttachment::transient(color_format()),
            PassAttachment::transient(depth_format()),
        ])
    }

    pub(crate) fn sampling(mut self, sampled: Vec<AttachmentRef>) -> Self {
        self.sampled = sampled;
        self
    }

    pub(crate) fn without_msaa(mut self) -> Self {
        self.msaa = false;
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    /// Shared log of "prepare:<name>" / "execute:<name>" entries
    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    pub(crate) fn boxed(self) -> Box<dyn RenderPass> {
        Box::new(self)
    }
}

impl RenderPass for TestPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_attachments(&self) -> &[PassAttachment] {
        &self.attachments
    }

    fn sampled_attachments(&self) -> &[AttachmentRef] {
        &self.sampled
    }

    fn supports_msaa(&self) -> bool {
        self.msaa
    }

    fn prepare(&mut self, _ctx: &mut RenderContext<'_>, _view: &RenderView) -> Result<()> {
        self.calls.lock().unwrap().push(format!("prepare:{}", self.name));
        Ok(())
    }

    fn execute(&mut self, _ctx: &mut RenderContext<'_>, _view: &RenderView) -> Result<()> {
        self.calls.lock().unwrap().push(format!("execute:{}", self.name));
        if self.fail_execute {
            return Err(engine_err!("galaxy3d::TestPass", BackendError => "pass '{}' failed", self.name));
        }
        Ok(())
    }
}

// ============================================================================
// Scene
// ============================================================================

pub(crate) struct SceneFixture {
    pub resources: ResourceLibrary,
    pub shader: ShaderHandle,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
}

/// Uniform layout of the fixture shader's variants
pub(crate) fn object_layout() -> Arc<ShaderUniformLayout> {
    ShaderUniformLayout::builder()
        .instance("BaseColor", Vec4::ONE)
        .instance("Roughness", 0.5f32)
        .draw("ModelMatrix", Mat4::IDENTITY)
        .draw("EntityId", -1i32)
        .draw("Overlay", TextureBinding::null())
        .build()
        .unwrap()
}

pub(crate) fn position_only() -> VertexLayout {
    VertexLayout::new().with(VertexSemantic::Position, VertexFormat::R32G32B32_SFLOAT)
}

/// One unit mesh, one shader with a variant per pass, one red material
pub(crate) fn scene_fixture(passes: &[&str]) -> SceneFixture {
    let mut resources = ResourceLibrary::new();
    let layout = object_layout();
    let shader = resources
        .create_shader(ShaderDesc {
            name: "lit".to_string(),
            variants: passes
                .iter()
                .map(|pass| ShaderVariantDesc {
                    pass_name: pass.to_string(),
                    vertex_inputs: position_only(),
                    uniforms: Arc::clone(&layout),
                })
                .collect(),
        })
        .unwrap();
    let mesh = resources
        .create_mesh(MeshDesc {
            name: "cube".to_string(),
            vertex_layout: VertexLayout::position_normal_uv(),
            vertex_count: 24,
            index_count: 36,
            submeshes: vec![],
            bounds: AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
        })
        .unwrap();
    let material = resources
        .create_material(MaterialDesc {
            name: "red".to_string(),
            shader,
            params: vec![("BaseColor".to_string(), UniformValue::Vec4(Vec4::new(1.0, 0.0, 0.0, 1.0)))],
        })
        .unwrap();

    SceneFixture { resources, shader, mesh, material }
}

/// Camera at (0, 0, 5) looking at the origin
pub(crate) fn test_camera() -> Camera {
    Camera::from_matrices(
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y),
        Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 1.0, 0.1, 100.0),
    )
}

// ============================================================================
// Pipelines and views
// ============================================================================

pub(crate) fn boxed(pass: impl RenderPass + 'static) -> Box<dyn RenderPass> {
    Box::new(pass)
}

pub(crate) fn compile(
    passes: Vec<Box<dyn RenderPass>>,
    config: &CompositorConfig,
    device: &MockGraphicsDevice,
) -> CompiledRenderPipeline {
    let desc = RenderPipelineDesc {
        name: "test".to_string(),
        passes,
        presentation_format: Some(color_format()),
    };
    CompiledRenderPipeline::compile(desc, config, device).unwrap()
}

/// View set up with fresh targets from `cache` and the test camera
pub(crate) fn setup_view(
    cache: &mut AttachmentCache,
    pipeline: &CompiledRenderPipeline,
    renderer: RendererId,
    size: Extent2D,
    device: &MockGraphicsDevice,
) -> RenderView {
    let backbuffers: Vec<_> = (0..pipeline.layout().presentation_count())
        .map(|i| crate::device::ImageHandle::new(1000 + i as u64))
        .collect();
    let targets = cache
        .create_render_targets(pipeline, renderer, size, pipeline.max_sample_count(), &backbuffers, device)
        .unwrap();
    let samples = targets.sample_count();
    let camera = test_camera();
    let mut view = RenderView::new();
    view.setup(
        targets,
        Viewport::from_size(size.width, size.height),
        *camera.view_matrix(),
        *camera.projection_matrix(),
        *camera.frustum(),
        samples,
        ShaderUniformLayout::camera_globals(),
    )
    .unwrap();
    view
}
