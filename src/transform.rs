//! Object placement: position, Euler rotation and scale.
//!
//! Rotation follows the XYZ Euler convention: the matrix is `Rx * Ry * Rz`,
//! so Z is applied first.

use crate::math::{Mat4, Vec3};

/// A 3D transform with position, rotation (Euler angles), and scale.
///
/// Builder methods consume and return `Self` for scene construction; the
/// `&mut self` setters chain for per-tick animation:
///
/// ```ignore
/// let plane = Transform::new()
///     .with_position(Vec3::new(0.0, -0.5, 0.0))
///     .with_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0));
/// pivot.rotate_x(0.005).rotate_y(0.005);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3, // radians about X, Y, Z
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_uniform_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::splat(s);
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_rotation(&mut self, rotation: Vec3) -> &mut Self {
        self.rotation = rotation;
        self
    }

    /// Set only the X angle, leaving Y and Z untouched.
    pub fn set_rotation_x(&mut self, angle: f32) -> &mut Self {
        self.rotation.x = angle;
        self
    }

    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        self.rotation.x += angle;
        self
    }

    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        self.rotation.y += angle;
        self
    }

    /// Model matrix: `Translation * Rx * Ry * Rz * Scale`.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::translation(self.position) * self.rotation_matrix() * Mat4::scaling(self.scale)
    }

    /// Inverse transpose of the rotation+scale part, for transforming normals.
    ///
    /// Falls back to the rotation alone when the scale is degenerate.
    pub fn normal_matrix(&self) -> Mat4 {
        let rotation_scale = self.rotation_matrix() * Mat4::scaling(self.scale);
        match rotation_scale.inverse() {
            Some(inverse) => inverse.transpose(),
            None => self.rotation_matrix(),
        }
    }

    fn rotation_matrix(&self) -> Mat4 {
        Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_z(self.rotation.z)
    }
}
