//! Camera collaborator surface consumed by picking, selection, and sculpting.
//!
//! The core never owns camera state; hosts hand in view/projection matrices
//! and this type provides the world/screen/ray conversions on top of them.
//! Screen coordinates are top-left-origin pixels.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::picking::Ray;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// View matrix (world -> camera)
    pub view: Mat4,
    /// Projection matrix (camera -> clip)
    pub projection: Mat4,
    /// Camera position in world space
    pub position: Vec3,
    /// Normalized world-space forward vector
    pub forward: Vec3,
}

impl Camera {
    /// Build from matrices supplied by the host; position and forward are
    /// recovered from the inverse view.
    pub fn from_matrices(view: Mat4, projection: Mat4) -> Self {
        let inv_view = view.inverse();
        let position = inv_view.transform_point3(Vec3::ZERO);
        let forward = inv_view.transform_vector3(Vec3::NEG_Z).normalize_or_zero();
        Self {
            view,
            projection,
            position,
            forward,
        }
    }

    /// Perspective camera looking from `eye` toward `target` (fov in radians)
    pub fn look_at(eye: Vec3, target: Vec3, fov: f32, aspect: f32) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(fov, aspect, 0.1, 200.0);
        Self {
            view,
            projection,
            position: eye,
            forward: (target - eye).normalize_or_zero(),
        }
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Camera right axis in world space
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.view.x_axis.x, self.view.y_axis.x, self.view.z_axis.x)
    }

    /// Camera up axis in world space
    pub fn up(&self) -> Vec3 {
        Vec3::new(self.view.x_axis.y, self.view.y_axis.y, self.view.z_axis.y)
    }

    /// Project a world-space point to screen pixels.
    /// Returns None for points at or behind the projection plane.
    pub fn world_to_screen(&self, point: Vec3, viewport: Vec2) -> Option<Vec2> {
        self.world_to_screen_depth(point, viewport).map(|(s, _)| s)
    }

    /// Project a world-space point to screen pixels, also returning the NDC
    /// depth (used to unproject at a consistent depth later).
    pub fn world_to_screen_depth(&self, point: Vec3, viewport: Vec2) -> Option<(Vec2, f32)> {
        let clip = self.view_projection() * Vec4::new(point.x, point.y, point.z, 1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let screen = Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        );
        Some((screen, ndc.z))
    }

    /// Unproject a screen position at the given NDC depth back to world space
    pub fn screen_to_world_point(&self, screen: Vec2, ndc_z: f32, viewport: Vec2) -> Vec3 {
        let ndc_x = screen.x / viewport.x * 2.0 - 1.0;
        let ndc_y = 1.0 - screen.y / viewport.y * 2.0;
        let world = self.view_projection().inverse() * Vec4::new(ndc_x, ndc_y, ndc_z, 1.0);
        world.truncate() / world.w
    }

    /// Cast a ray from a screen position into the scene
    pub fn screen_ray(&self, screen: Vec2, viewport: Vec2) -> Ray {
        let near = self.screen_to_world_point(screen, -1.0, viewport);
        let far = self.screen_to_world_point(screen, 1.0, viewport);
        Ray {
            origin: self.position,
            direction: (far - near).normalize_or_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn test_camera() -> Camera {
        Camera::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            45.0_f32.to_radians(),
            VIEWPORT.x / VIEWPORT.y,
        )
    }

    #[test]
    fn test_center_of_view_projects_to_center_of_screen() {
        let camera = test_camera();
        let screen = camera.world_to_screen(Vec3::ZERO, VIEWPORT).unwrap();
        assert!((screen.x - 400.0).abs() < 0.5);
        assert!((screen.y - 300.0).abs() < 0.5);
    }

    #[test]
    fn test_screen_y_is_inverted() {
        let camera = test_camera();
        let above = camera
            .world_to_screen(Vec3::new(0.0, 1.0, 0.0), VIEWPORT)
            .unwrap();
        // World up maps to smaller screen y
        assert!(above.y < 300.0);
    }

    #[test]
    fn test_point_behind_camera_is_rejected() {
        let camera = test_camera();
        assert!(camera
            .world_to_screen(Vec3::new(0.0, 0.0, 10.0), VIEWPORT)
            .is_none());
    }

    #[test]
    fn test_unproject_roundtrip() {
        let camera = test_camera();
        let point = Vec3::new(0.3, -0.2, 0.5);
        let (screen, depth) = camera.world_to_screen_depth(point, VIEWPORT).unwrap();
        let back = camera.screen_to_world_point(screen, depth, VIEWPORT);
        assert!(back.abs_diff_eq(point, 1e-3));
    }

    #[test]
    fn test_screen_ray_through_center_hits_target() {
        let camera = test_camera();
        let ray = camera.screen_ray(Vec2::new(400.0, 300.0), VIEWPORT);
        assert!(ray.origin.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-4));
    }

    #[test]
    fn test_from_matrices_recovers_pose() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(1.0, 1.5, 0.1, 200.0);
        let camera = Camera::from_matrices(view, projection);
        assert!(camera.position.abs_diff_eq(eye, 1e-4));
        assert!(camera
            .forward
            .abs_diff_eq((Vec3::ZERO - eye).normalize(), 1e-4));
    }

    #[test]
    fn test_right_and_up_are_orthonormal() {
        let camera = test_camera();
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-5));
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1e-5));
        assert!(camera.right().dot(camera.up()).abs() < 1e-5);
    }
}
