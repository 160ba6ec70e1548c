/// Recorded GPU command stream.
///
/// `RenderContext` appends commands while passes run; the finished list is
/// submitted to the `GraphicsDevice` once per frame. The list tracks whether
/// a pass is open so an aborted frame never leaves a dangling `BeginPass`.

use crate::attachment::RenderTarget;
use crate::resource::{MeshHandle, ShaderVariantId};
use crate::uniform::{TextureBinding, UniformBlock, UniformScope};

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-size viewport with the [0, 1] depth range
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Viewport bounds as a scissor rectangle
    pub fn to_rect(&self) -> Rect2D {
        Rect2D {
            x: self.x as i32,
            y: self.y as i32,
            width: self.width as u32,
            height: self.height as u32,
        }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One recorded command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginPass {
        pass: String,
        targets: Vec<RenderTarget>,
    },
    EndPass,
    SetViewport(Viewport),
    SetScissor(Rect2D),
    BindShader(ShaderVariantId),
    SetUniforms {
        scope: UniformScope,
        block: UniformBlock,
    },
    BindTexture {
        scope: UniformScope,
        binding: u32,
        texture: TextureBinding,
    },
    BindMesh(MeshHandle),
    Draw {
        vertex_count: u32,
        first_vertex: u32,
    },
    DrawIndexed {
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    },
}

/// Ordered list of recorded commands
#[derive(Debug, Default, Clone)]
pub struct CommandList {
    commands: Vec<Command>,
    open_pass: Option<String>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a pass. Any pass still open is closed first.
    pub fn begin_pass(&mut self, pass: &str, targets: Vec<RenderTarget>) {
        if self.open_pass.is_some() {
            self.end_pass();
        }
        self.commands.push(Command::BeginPass { pass: pass.to_string(), targets });
        self.open_pass = Some(pass.to_string());
    }

    /// Close the open pass (no-op when none is open)
    pub fn end_pass(&mut self) {
        if self.open_pass.take().is_some() {
            self.commands.push(Command::EndPass);
        }
    }

    /// Name of the pass currently open
    pub fn open_pass(&self) -> Option<&str> {
        self.open_pass.as_deref()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of `Draw` and `DrawIndexed` commands
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Draw { .. } | Command::DrawIndexed { .. }))
            .count()
    }

    /// Drop everything recorded, including an open pass
    pub fn discard(&mut self) {
        self.commands.clear();
        self.open_pass = None;
    }
}

#[cfg(test)]
#[path = "command_list_tests.rs"]
mod tests;
