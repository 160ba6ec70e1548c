/// Camera: passive container for view, projection, frustum and viewport.
///
/// The caller computes every field; the compositor only reads them when
/// building a `RenderView`.

use glam::{Mat4, Vec3};
use crate::attachment::Extent2D;
use crate::device::{Rect2D, Viewport};
use super::frustum::Frustum;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    frustum: Frustum,
    viewport: Option<Viewport>,
    scissor: Option<Rect2D>,
}

impl Camera {
    /// Camera with an explicit frustum. Viewport and scissor default to the full target.
    pub fn new(view: Mat4, projection: Mat4, frustum: Frustum) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            frustum,
            viewport: None,
            scissor: None,
        }
    }

    /// Camera whose frustum is extracted from `projection * view`
    pub fn from_matrices(view: Mat4, projection: Mat4) -> Self {
        let frustum = Frustum::from_view_projection(&(projection * view));
        Self::new(view, projection, frustum)
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

    /// World-space position (translation of the inverse view matrix)
    pub fn position(&self) -> Vec3 {
        self.view_matrix.inverse().w_axis.truncate()
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Explicit viewport, or one covering `size`
    pub fn viewport_or_full(&self, size: Extent2D) -> Viewport {
        self.viewport.unwrap_or_else(|| Viewport::from_size(size.width, size.height))
    }

    pub fn scissor(&self) -> Option<&Rect2D> {
        self.scissor.as_ref()
    }

    // ===== SETTERS =====

    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }

    pub fn set_frustum(&mut self, frustum: Frustum) {
        self.frustum = frustum;
    }

    /// `None` means the full render target
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    /// `None` means same as the viewport
    pub fn set_scissor(&mut self, scissor: Option<Rect2D>) {
        self.scissor = scissor;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
