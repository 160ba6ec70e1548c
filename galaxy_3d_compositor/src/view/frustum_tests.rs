use glam::{Mat4, Vec3};
use super::*;

fn camera_frustum() -> Frustum {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    Frustum::from_view_projection(&(projection * view))
}

fn unit_box_at(center: Vec3) -> AABB {
    AABB::from_center_extent(center, Vec3::splat(0.5))
}

// ============================================================================
// Plane extraction
// ============================================================================

#[test]
fn test_planes_are_normalized() {
    for plane in &camera_frustum().planes {
        assert!((plane.truncate().length() - 1.0).abs() < 1e-4);
    }
}

#[test]
fn test_orthographic_planes_are_normalized() {
    let frustum = Frustum::from_view_projection(&Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0));
    for plane in &frustum.planes {
        assert!((plane.truncate().length() - 1.0).abs() < 1e-4);
    }
}

#[test]
fn test_identity_frustum_is_ndc_cube() {
    let frustum = Frustum::from_view_projection(&Mat4::IDENTITY);
    assert!(frustum.contains_point(Vec3::ZERO));
    assert!(frustum.contains_point(Vec3::new(0.99, -0.99, 0.5)));
    assert!(!frustum.contains_point(Vec3::new(1.5, 0.0, 0.0)));
}

// ============================================================================
// AABB tests
// ============================================================================

#[test]
fn test_box_in_front_of_camera_is_visible() {
    let frustum = camera_frustum();
    assert!(frustum.intersects_aabb(&unit_box_at(Vec3::ZERO)));
    assert_eq!(frustum.classify_aabb(&unit_box_at(Vec3::ZERO)), FrustumTest::Inside);
}

#[test]
fn test_box_behind_camera_is_outside() {
    let frustum = camera_frustum();
    let behind = unit_box_at(Vec3::new(0.0, 0.0, 20.0));
    assert!(!frustum.intersects_aabb(&behind));
    assert_eq!(frustum.classify_aabb(&behind), FrustumTest::Outside);
}

#[test]
fn test_box_far_to_the_side_is_outside() {
    let frustum = camera_frustum();
    assert!(!frustum.intersects_aabb(&unit_box_at(Vec3::new(100.0, 0.0, 0.0))));
}

#[test]
fn test_box_beyond_far_plane_is_outside() {
    let frustum = camera_frustum();
    assert!(!frustum.intersects_aabb(&unit_box_at(Vec3::new(0.0, 0.0, -200.0))));
}

#[test]
fn test_box_straddling_plane_is_partial_and_kept() {
    let frustum = camera_frustum();
    // Huge box crossing every side plane
    let huge = AABB::from_center_extent(Vec3::ZERO, Vec3::splat(50.0));
    assert!(frustum.intersects_aabb(&huge));
    assert_eq!(frustum.classify_aabb(&huge), FrustumTest::Partial);
}

#[test]
fn test_infinite_frustum_accepts_everything() {
    let frustum = Frustum::infinite();
    assert!(frustum.intersects_aabb(&unit_box_at(Vec3::splat(1.0e6))));
    assert_eq!(frustum.classify_aabb(&unit_box_at(Vec3::splat(-1.0e6))), FrustumTest::Inside);
}

#[test]
fn test_intersects_never_drops_visible_points() {
    // Any box containing a point inside the frustum must be kept
    let frustum = camera_frustum();
    let samples = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, -10.0),
        Vec3::new(-3.0, 2.0, -20.0),
        Vec3::new(0.0, 0.0, 4.0),
    ];
    for point in samples {
        if frustum.contains_point(point) {
            let tiny = AABB::from_center_extent(point, Vec3::splat(0.01));
            assert!(frustum.intersects_aabb(&tiny), "visible point {point:?} culled");
        }
    }
}
