//! Small linear algebra toolkit: vectors and 4x4 matrices.

pub mod mat4;
pub mod vec2;
pub mod vec3;
pub mod vec4;

pub use mat4::Mat4;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;

/// Clamps to [0, 1], mapping NaN to 0.
#[inline]
pub fn saturate(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// GLSL `sign`: -1, 0 or 1. Unlike [`f32::signum`], zero maps to zero.
#[inline]
pub fn glsl_sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_maps_nan_to_zero() {
        assert_eq!(saturate(f32::NAN), 0.0);
        assert_eq!(saturate(-3.0), 0.0);
        assert_eq!(saturate(7.0), 1.0);
    }

    #[test]
    fn glsl_sign_of_zero_is_zero() {
        assert_eq!(glsl_sign(0.0), 0.0);
        assert_eq!(glsl_sign(-2.0), -1.0);
        assert!(glsl_sign(f32::NAN).is_nan());
    }
}
