//! The scene camera.
//!
//! An orthographic 2D camera where 1 world unit = 1 pixel at zoom 1.0. The
//! Scene owns exactly one camera, constructed during `init` and released in
//! `destroy`.

use crate::math::{Mat4, Vec3};

/// Default viewport size used for the projection until the editor resizes it.
const DEFAULT_VIEWPORT: (f32, f32) = (1920.0, 1080.0);

/// An orthographic camera positioned in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub zoom: f32,
    viewport_width: f32,
    viewport_height: f32,
}

impl Camera {
    /// Create a camera at the given position with the default viewport.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            zoom: 1.0,
            viewport_width: DEFAULT_VIEWPORT.0,
            viewport_height: DEFAULT_VIEWPORT.1,
        }
    }

    /// Resize the projection viewport, in pixels.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// The view matrix (inverse of the camera's translation).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    /// The orthographic projection matrix, origin at the viewport center.
    pub fn projection_matrix(&self) -> Mat4 {
        let half_w = self.viewport_width * 0.5 / self.zoom;
        let half_h = self.viewport_height * 0.5 / self.zoom;
        Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, -1.0, 1.0)
    }

    /// Combined view-projection matrix, the one shaders consume.
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}
