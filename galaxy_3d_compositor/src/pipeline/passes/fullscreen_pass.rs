/// Fullscreen pass: one shader variant over a procedural triangle.
///
/// Used for post-processing. Attachments of earlier passes are bound as
/// Instance textures, one uniform per sampled attachment.

use crate::attachment::{AttachmentRef, PassAttachment};
use crate::context::RenderContext;
use crate::error::Result;
use crate::resource::ShaderHandle;
use crate::uniform::{SamplerDesc, TextureBinding, UniformKey, UniformScope};
use crate::view::RenderView;
use crate::engine_warn;
use super::super::render_pass::RenderPass;

pub struct FullscreenPass {
    name: String,
    shader: ShaderHandle,
    attachments: Vec<PassAttachment>,
    sampled: Vec<AttachmentRef>,
    texture_keys: Vec<UniformKey>,
    sampler: SamplerDesc,
}

impl FullscreenPass {
    /// Draw `shader`'s variant named `name` into `attachments`
    pub fn new(name: &str, shader: ShaderHandle, attachments: Vec<PassAttachment>) -> Self {
        Self {
            name: name.to_string(),
            shader,
            attachments,
            sampled: Vec::new(),
            texture_keys: Vec::new(),
            sampler: SamplerDesc::POINT_CLAMP,
        }
    }

    /// Sample `source` through the texture uniform `uniform_name`
    pub fn sample(mut self, source: AttachmentRef, uniform_name: &str) -> Self {
        self.sampled.push(source);
        self.texture_keys.push(UniformKey::from_name(uniform_name));
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerDesc) -> Self {
        self.sampler = sampler;
        self
    }
}

impl RenderPass for FullscreenPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_attachments(&self) -> &[PassAttachment] {
        &self.attachments
    }

    fn sampled_attachments(&self) -> &[AttachmentRef] {
        &self.sampled
    }

    fn prepare(&mut self, _ctx: &mut RenderContext<'_>, _view: &RenderView) -> Result<()> {
        Ok(())
    }

    fn execute(&mut self, ctx: &mut RenderContext<'_>, _view: &RenderView) -> Result<()> {
        let Some(variant) = ctx
            .resources()
            .shader_data(self.shader)
            .and_then(|shader| shader.variant(&self.name))
        else {
            engine_warn!("galaxy3d::FullscreenPass",
                "Pass '{}': shader has no variant for this pass, nothing drawn", self.name);
            return Ok(());
        };

        ctx.set_shader(variant);
        for (index, key) in self.texture_keys.iter().enumerate() {
            if let Some(image) = ctx.sampled_attachment(index) {
                ctx.set_texture(UniformScope::Instance, *key, TextureBinding::new(image, self.sampler));
            }
        }
        ctx.draw_procedural(3)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "fullscreen_pass_tests.rs"]
mod tests;
