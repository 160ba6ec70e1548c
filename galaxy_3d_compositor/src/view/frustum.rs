/// View frustum as six inward-facing planes.
///
/// Each plane is a Vec4 (A, B, C, D): a point P is on the visible side when
/// A*Px + B*Py + C*Pz + D >= 0. All tests are conservative: a box that
/// might be visible is never reported outside.

use glam::{Mat4, Vec3, Vec4};
use crate::resource::AABB;

/// Result of classifying a box against the frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    Outside,
    Inside,
    Partial,
}

pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the planes of a view-projection matrix (Gribb & Hartmann).
    ///
    /// Works for perspective and orthographic projections. The near plane
    /// uses the [-1, 1] clip range, which is also conservative for [0, 1]
    /// depth projections.
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let x = view_projection.row(0);
        let y = view_projection.row(1);
        let z = view_projection.row(2);
        let w = view_projection.row(3);

        let mut planes = [w + x, w - x, w + y, w - y, w + z, w - z];
        for plane in &mut planes {
            let length = plane.truncate().length();
            if length > 0.0 {
                *plane /= length;
            }
        }

        Self { planes }
    }

    /// Frustum that accepts everything
    pub fn infinite() -> Self {
        Self { planes: [Vec4::new(0.0, 0.0, 0.0, 1.0); 6] }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.truncate().dot(point) + p.w >= 0.0)
    }

    /// False only when the box is fully behind one plane
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| signed_distance(plane, positive_vertex(plane, aabb)) >= 0.0)
    }

    /// Three-way classification (positive / negative vertex test)
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut inside = true;
        for plane in &self.planes {
            if signed_distance(plane, positive_vertex(plane, aabb)) < 0.0 {
                return FrustumTest::Outside;
            }
            if signed_distance(plane, negative_vertex(plane, aabb)) < 0.0 {
                inside = false;
            }
        }
        if inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }
}

fn signed_distance(plane: &Vec4, point: Vec3) -> f32 {
    plane.truncate().dot(point) + plane.w
}

/// Corner furthest along the plane normal
fn positive_vertex(plane: &Vec4, aabb: &AABB) -> Vec3 {
    Vec3::select(plane.truncate().cmpge(Vec3::ZERO), aabb.max, aabb.min)
}

/// Corner furthest against the plane normal
fn negative_vertex(plane: &Vec4, aabb: &AABB) -> Vec3 {
    Vec3::select(plane.truncate().cmpge(Vec3::ZERO), aabb.min, aabb.max)
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
