/// Compiled render pipeline.
///
/// Compilation turns an ordered list of passes into a frozen pipeline:
/// every pass attachment is resolved to a physical attachment slot (passes
/// continuing an earlier attachment share its slot), formats and sources
/// are validated, and the pipeline-wide sample count is fixed.
///
/// Passes run in declaration order. There is no dependency inference: a
/// pass may only reference attachments of passes declared before it.

use std::sync::atomic::{AtomicU64, Ordering};
use rustc_hash::FxHashSet;
use crate::attachment::{
    AttachmentFormat, AttachmentSource, ClearValue, LoadOp, StoreOp,
};
use crate::config::CompositorConfig;
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::{engine_bail, engine_debug, engine_info};
use super::render_pass::{PassSlot, PassState, RenderPass};

static NEXT_PIPELINE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a compiled pipeline (never reused within a process)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineId(u64);

impl PipelineId {
    fn next() -> Self {
        Self(NEXT_PIPELINE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Pipeline description handed to the compiler
pub struct RenderPipelineDesc {
    pub name: String,
    pub passes: Vec<Box<dyn RenderPass>>,
    /// Format of the backbuffers bound to `Presentation` attachments
    pub presentation_format: Option<AttachmentFormat>,
}

// ===== LAYOUT =====

/// Where a physical slot's image comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Allocated by the attachment cache
    Transient,
    /// Caller-supplied backbuffer (index into the backbuffer list)
    Presentation { index: usize },
}

/// One physical attachment shared by every pass bound to it
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalSlot {
    pub format: AttachmentFormat,
    pub kind: SlotKind,
    /// Pass that introduced the slot
    pub owner_pass: usize,
    /// Attachment index within the owner pass
    pub owner_index: usize,
    /// Read as a texture by a later pass
    pub sampled: bool,
}

/// A pass attachment resolved to its slot
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentBinding {
    pub slot: usize,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_value: ClearValue,
}

/// Resolved layout of one pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassLayout {
    pub name: String,
    pub attachments: Vec<AttachmentBinding>,
    /// Slots read as textures, in declaration order
    pub sampled_slots: Vec<usize>,
    pub supports_msaa: bool,
}

/// Structural result of compilation.
///
/// Two compilations of the same pass list produce equal layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineLayout {
    passes: Vec<PassLayout>,
    slots: Vec<PhysicalSlot>,
    max_sample_count: u32,
    presentation_count: usize,
    presentation_format: Option<AttachmentFormat>,
}

impl PipelineLayout {
    pub fn passes(&self) -> &[PassLayout] {
        &self.passes
    }

    pub fn pass(&self, index: usize) -> Option<&PassLayout> {
        self.passes.get(index)
    }

    pub fn pass_index(&self, name: &str) -> Option<usize> {
        self.passes.iter().position(|p| p.name == name)
    }

    pub fn slots(&self) -> &[PhysicalSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&PhysicalSlot> {
        self.slots.get(index)
    }

    /// Highest sample count any frame of this pipeline may use
    pub fn max_sample_count(&self) -> u32 {
        self.max_sample_count
    }

    /// Number of backbuffers a frame must supply
    pub fn presentation_count(&self) -> usize {
        self.presentation_count
    }

    pub fn presentation_format(&self) -> Option<&AttachmentFormat> {
        self.presentation_format.as_ref()
    }
}

// ===== COMPILED PIPELINE =====

/// Immutable, executable pipeline. Changing the pass list means compiling a new one.
pub struct CompiledRenderPipeline {
    id: PipelineId,
    name: String,
    layout: PipelineLayout,
    passes: Vec<PassSlot>,
}

impl CompiledRenderPipeline {
    /// Validate and freeze a pipeline description.
    ///
    /// # Errors
    ///
    /// `Configuration` for an empty pass list, duplicate pass names, a
    /// non-terminal pass without attachments, an attachment or sampled
    /// reference that does not resolve to a compatible earlier attachment,
    /// a presentation attachment incompatible with the presentation format,
    /// or a slot format the device cannot render.
    pub fn compile(
        desc: RenderPipelineDesc,
        config: &CompositorConfig,
        device: &dyn GraphicsDevice,
    ) -> Result<Self> {
        config.validate()?;
        let name = desc.name;

        if desc.passes.is_empty() {
            engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
                "Pipeline '{}' has no passes", name);
        }

        let mut seen = FxHashSet::default();
        for pass in &desc.passes {
            if !seen.insert(pass.name()) {
                engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
                    "Pipeline '{}': duplicate pass name '{}'", name, pass.name());
            }
        }

        let mut slots: Vec<PhysicalSlot> = Vec::new();
        let mut pass_layouts: Vec<PassLayout> = Vec::with_capacity(desc.passes.len());
        let mut presentation_count = 0;
        let last_pass = desc.passes.len() - 1;

        for (pass_index, pass) in desc.passes.iter().enumerate() {
            let pass_name = pass.name();
            let attachments = pass.input_attachments();

            if attachments.is_empty() && pass_index != last_pass {
                engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
                    "Pipeline '{}': non-terminal pass '{}' has no attachments", name, pass_name);
            }

            let mut bindings = Vec::with_capacity(attachments.len());
            for (attachment_index, attachment) in attachments.iter().enumerate() {
                if !attachment.clear_value.matches(attachment.format.usage) {
                    engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
                        "Pass '{}' attachment {}: clear value does not match a {:?} attachment",
                        pass_name, attachment_index, attachment.format.usage);
                }

                let slot = match &attachment.source {
                    AttachmentSource::Transient => {
                        slots.push(PhysicalSlot {
                            format: attachment.format,
                            kind: SlotKind::Transient,
                            owner_pass: pass_index,
                            owner_index: attachment_index,
                            sampled: false,
                        });
                        slots.len() - 1
                    }
                    AttachmentSource::Presentation => {
                        let Some(presentation) = desc.presentation_format else {
                            engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
                                "Pass '{}' attachment {}: pipeline '{}' has no presentation format",
                                pass_name, attachment_index, name);
                        };
                        if !presentation.is_compatible(&attachment.format) {
                            engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
                                "Pass '{}' attachment {}: {:?} is not compatible with presentation format {:?}",
                                pass_name, attachment_index, attachment.format.format, presentation.format);
                        }
                        slots.push(PhysicalSlot {
                            format: attachment.format,
                            kind: SlotKind::Presentation { index: presentation_count },
                            owner_pass: pass_index,
                            owner_index: attachment_index,
                            sampled: false,
                        });
                        presentation_count += 1;
                        slots.len() - 1
                    }
                    AttachmentSource::Pass { pass: source_pass, index } => {
                        let slot = resolve_reference(&pass_layouts, pass_name, attachment_index, source_pass, *index)?;
                        if !slots[slot].format.is_compatible(&attachment.format) {
                            engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
                                "Pass '{}' attachment {}: {:?} is not compatible with '{}' attachment {} ({:?})",
                                pass_name, attachment_index, attachment.format.format,
                                source_pass, index, slots[slot].format.format);
                        }
                        if bindings.iter().any(|b: &AttachmentBinding| b.slot == slot) {
                            engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
                                "Pass '{}' attachment {}: attachment bound twice", pass_name, attachment_index);
                        }
                        slot
                    }
                };

                bindings.push(AttachmentBinding {
                    slot,
                    load_op: attachment.load_op,
                    store_op: attachment.store_op,
                    clear_value: attachment.clear_value,
                });
            }

            let mut sampled_slots = Vec::with_capacity(pass.sampled_attachments().len());
            for (sampled_index, reference) in pass.sampled_attachments().iter().enumerate() {
                let slot = resolve_reference(&pass_layouts, pass_name, sampled_index, &reference.pass, reference.index)?;
                if bindings.iter().any(|b| b.slot == slot) {
                    engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
                        "Pass '{}' samples '{}' attachment {} which it also renders into",
                        pass_name, reference.pass, reference.index);
                }
                slots[slot].sampled = true;
                sampled_slots.push(slot);
            }

            pass_layouts.push(PassLayout {
                name: pass_name.to_string(),
                attachments: bindings,
                sampled_slots,
                supports_msaa: pass.supports_msaa(),
            });
        }

        let max_sample_count = pipeline_sample_count(&name, config, &pass_layouts, &slots);

        for (index, slot) in slots.iter().enumerate() {
            if !device.supports_format(slot.format.format, max_sample_count) {
                engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
                    "Pipeline '{}': slot {} format {:?} with {} sample(s) is not supported by the device",
                    name, index, slot.format.format, max_sample_count);
            }
        }

        let mut passes: Vec<PassSlot> = desc.passes.into_iter().map(PassSlot::new).collect();
        for pass in &mut passes {
            pass.mark_compiled();
        }

        let layout = PipelineLayout {
            passes: pass_layouts,
            slots,
            max_sample_count,
            presentation_count,
            presentation_format: desc.presentation_format,
        };

        engine_info!("galaxy3d::CompiledRenderPipeline",
            "Compiled pipeline '{}': {} passes, {} attachment slots, {}x MSAA",
            name, passes.len(), layout.slots.len(), max_sample_count);

        Ok(Self {
            id: PipelineId::next(),
            name,
            layout,
            passes,
        })
    }

    pub fn id(&self) -> PipelineId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &PipelineLayout {
        &self.layout
    }

    pub fn max_sample_count(&self) -> u32 {
        self.layout.max_sample_count
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn pass_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.layout.passes.iter().map(|p| p.name.as_str())
    }

    pub fn pass(&self, index: usize) -> Option<&dyn RenderPass> {
        self.passes.get(index).map(PassSlot::pass)
    }

    pub fn pass_mut(&mut self, index: usize) -> Option<&mut dyn RenderPass> {
        self.passes.get_mut(index).map(PassSlot::pass_mut)
    }

    pub fn pass_state(&self, index: usize) -> Option<PassState> {
        self.passes.get(index).map(PassSlot::state)
    }

    /// Start of a frame: every pass back to `Ready`
    pub(crate) fn reset_passes(&mut self) {
        for pass in &mut self.passes {
            pass.reset();
        }
    }

    pub(crate) fn pass_slot_mut(&mut self, index: usize) -> Option<&mut PassSlot> {
        self.passes.get_mut(index)
    }
}

impl std::fmt::Debug for CompiledRenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRenderPipeline")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("layout", &self.layout)
            .finish()
    }
}

/// Slot of attachment `index` of the earlier pass `source_pass`
fn resolve_reference(
    earlier: &[PassLayout],
    pass_name: &str,
    attachment_index: usize,
    source_pass: &str,
    index: usize,
) -> Result<usize> {
    let Some(source) = earlier.iter().find(|p| p.name == source_pass) else {
        engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
            "Pass '{}' attachment {}: pass '{}' does not precede it", pass_name, attachment_index, source_pass);
    };
    match source.attachments.get(index) {
        Some(binding) => Ok(binding.slot),
        None => engine_bail!("galaxy3d::CompiledRenderPipeline", Configuration =>
            "Pass '{}' attachment {}: pass '{}' has no attachment {}",
            pass_name, attachment_index, source_pass, index),
    }
}

/// Configured maximum when every pass supports MSAA, else 1.
///
/// Sampled slots are always single-sampled; a pass rendering into one
/// forces the whole pipeline to single sampling.
fn pipeline_sample_count(
    name: &str,
    config: &CompositorConfig,
    passes: &[PassLayout],
    slots: &[PhysicalSlot],
) -> u32 {
    if let Some(pass) = passes.iter().find(|p| !p.supports_msaa) {
        engine_debug!("galaxy3d::CompiledRenderPipeline",
            "Pipeline '{}': pass '{}' does not support MSAA, single sampling", name, pass.name);
        return 1;
    }
    if slots.iter().any(|s| s.sampled) && config.max_sample_count > 1 {
        engine_debug!("galaxy3d::CompiledRenderPipeline",
            "Pipeline '{}': sampled attachments require single sampling", name);
        return 1;
    }
    config.max_sample_count
}

#[cfg(test)]
#[path = "compiled_pipeline_tests.rs"]
mod tests;
