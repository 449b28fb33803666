//! Perspective look-at camera.
//!
//! # Coordinate System
//!
//! Uses a **right-handed** coordinate system:
//! - X: positive right
//! - Y: positive up
//! - Z: positive toward the viewer (the camera looks down its local -Z)

use crate::math::{Mat4, Vec3};

pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Camera positioned in world space and aimed at a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    fov_y: f32, // radians
    aspect: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// Creates a camera at `position` looking at the origin.
    pub fn new(position: Vec3, aspect: f32) -> Self {
        Self {
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: DEFAULT_FOV_DEGREES.to_radians(),
            aspect,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far.max(self.near * 2.0);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Combined `projection * view`.
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Orbit around the target by the given azimuth/elevation deltas
    /// (radians), keeping the distance. Elevation stops short of the poles.
    pub fn orbit(&mut self, d_azimuth: f32, d_elevation: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let azimuth = offset.x.atan2(offset.z) + d_azimuth;
        let limit = 89f32.to_radians();
        let elevation = ((offset.y / radius).clamp(-1.0, 1.0).asin() + d_elevation).clamp(-limit, limit);

        let (sin_el, cos_el) = elevation.sin_cos();
        let (sin_az, cos_az) = azimuth.sin_cos();
        self.position = self.target + Vec3::new(sin_az * cos_el, sin_el, cos_az * cos_el) * radius;
    }

    /// Move toward (`factor < 1`) or away from the target.
    pub fn dolly(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.position = self.target + (self.position - self.target) * factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn origin_projects_to_screen_center() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 25.0), 1.0);
        let clip = camera.view_projection() * crate::math::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-6);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-6);
        assert_relative_eq!(clip.w, 25.0, epsilon = 1e-4);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 25.0), 1.0);
        camera.orbit(0.7, 0.3);
        assert_relative_eq!(camera.position().length(), 25.0, epsilon = 1e-4);
        assert!(camera.position().y > 0.0);
    }

    #[test]
    fn dolly_rejects_non_positive_factors() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 25.0), 1.0);
        camera.dolly(0.0);
        camera.dolly(f32::NAN);
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 25.0));
        camera.dolly(0.5);
        assert_relative_eq!(camera.position().z, 12.5);
    }
}
