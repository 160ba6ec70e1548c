//! Views: what one frame renders, from which camera, and the providers
//! that build and fill them.

mod camera;
mod frustum;
mod object_data;
mod providers;
mod render_view;

pub use camera::Camera;
pub use frustum::{
    Frustum, FrustumTest, PLANE_BOTTOM, PLANE_FAR, PLANE_LEFT, PLANE_NEAR, PLANE_RIGHT, PLANE_TOP,
};
pub use object_data::{EntityId, ObjectData};
pub use providers::{CameraViewProvider, RenderViewProvider, SceneDataProvider};
pub use render_view::RenderView;
