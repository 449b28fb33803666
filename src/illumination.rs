//! Phong illumination model.
//!
//! [`evaluate`] computes the diffuse and specular intensities at a surface
//! point; [`IlluminationParams::compose`] mixes them with the base color and
//! the ambient/diffuse/specular coefficients:
//!
//! ```text
//! color = base * (diffuse * kd + ka) + specular * ks
//! ```
//!
//! Every shading strategy calls the same [`evaluate`]; they differ only in
//! where (per primitive, per vertex or per pixel) and with which inputs.

use crate::colors::Color;
use crate::math::{saturate, Vec3};

/// Diffuse and specular intensities, both in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Intensities {
    pub diffuse: f32,
    pub specular: f32,
}

impl Intensities {
    pub const fn new(diffuse: f32, specular: f32) -> Self {
        Self { diffuse, specular }
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.diffuse + (other.diffuse - self.diffuse) * t,
            self.specular + (other.specular - self.specular) * t,
        )
    }
}

/// Diffuse and specular intensities at `position` (all inputs in world space).
///
/// The normal is re-normalized here, so interpolated normals can be passed
/// as-is. Degenerate inputs never produce NaN: zero-length vectors normalize
/// to zero and every dot product is clamped with NaN mapped to 0.
///
/// `pow(0, 0)` is forced to 0: with a zero exponent, points where the
/// reflected light points away from the viewer get no highlight instead of a
/// full-intensity one.
pub fn evaluate(
    position: Vec3,
    normal: Vec3,
    camera_position: Vec3,
    light_position: Vec3,
    specular_exponent: f32,
) -> Intensities {
    let normal = normal.normalize();
    let to_light = (light_position - position).normalize();
    let to_camera = (camera_position - position).normalize();
    let reflected = (-to_light).reflect(normal).normalize();

    let exponent = if specular_exponent > 0.0 {
        specular_exponent
    } else {
        0.0
    };

    let diffuse = saturate(normal.dot(to_light));
    let alignment = saturate(reflected.dot(to_camera));
    let specular = if alignment == 0.0 && exponent == 0.0 {
        0.0
    } else {
        alignment.powf(exponent)
    };

    Intensities { diffuse, specular }
}

/// One of the three illumination terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Ambient,
    Diffuse,
    Specular,
}

pub const DEFAULT_AMBIENT: f32 = 0.3;
pub const DEFAULT_DIFFUSE: f32 = 0.9;
pub const DEFAULT_SPECULAR: f32 = 1.0;
pub const DEFAULT_EXPONENT: f32 = 50.0;
pub const DEFAULT_LIGHT_POSITION: Vec3 = Vec3::new(80.0, 40.0, 50.0);

/// Default base color, `rgb(33, 148, 206)`.
pub fn default_base_color() -> Color {
    Color::from_rgb8(33, 148, 206)
}

/// Coefficients, exponent, light position and base color of one material.
///
/// Each term can be switched off without losing its user-set fraction: a
/// disabled term contributes with coefficient 0 and re-enabling restores the
/// fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IlluminationParams {
    fractions: [f32; 3],
    enabled: [bool; 3],
    exponent: f32,
    pub light_position: Vec3,
    pub base_color: Color,
}

impl Default for IlluminationParams {
    fn default() -> Self {
        Self {
            fractions: [DEFAULT_AMBIENT, DEFAULT_DIFFUSE, DEFAULT_SPECULAR],
            enabled: [true; 3],
            exponent: DEFAULT_EXPONENT,
            light_position: DEFAULT_LIGHT_POSITION,
            base_color: default_base_color(),
        }
    }
}

impl IlluminationParams {
    /// Purely emissive material: ambient 1, no diffuse or specular.
    pub fn emissive(color: Color) -> Self {
        let mut params = Self {
            base_color: color,
            ..Self::default()
        };
        params.set_fraction(Term::Ambient, 1.0);
        params.set_fraction(Term::Diffuse, 0.0);
        params.set_fraction(Term::Specular, 0.0);
        params
    }

    /// The user-set fraction, regardless of the enable toggle.
    pub fn fraction(&self, term: Term) -> f32 {
        self.fractions[term as usize]
    }

    /// Set a term's fraction. Negative values clamp to 0 and NaN becomes 0.
    pub fn set_fraction(&mut self, term: Term, value: f32) {
        self.fractions[term as usize] = if value > 0.0 { value } else { 0.0 };
    }

    pub fn is_enabled(&self, term: Term) -> bool {
        self.enabled[term as usize]
    }

    pub fn set_enabled(&mut self, term: Term, enabled: bool) {
        self.enabled[term as usize] = enabled;
    }

    /// Effective coefficient: the fraction, or 0 while the term is disabled.
    pub fn coefficient(&self, term: Term) -> f32 {
        if self.is_enabled(term) {
            self.fraction(term)
        } else {
            0.0
        }
    }

    pub fn exponent(&self) -> f32 {
        self.exponent
    }

    /// Set the specular exponent. Negative or non-finite values become 0.
    pub fn set_exponent(&mut self, exponent: f32) {
        self.exponent = if exponent.is_finite() && exponent > 0.0 {
            exponent
        } else {
            0.0
        };
    }

    /// Intensities at a surface point lit by this material's light.
    pub fn evaluate(&self, position: Vec3, normal: Vec3, camera_position: Vec3) -> Intensities {
        evaluate(position, normal, camera_position, self.light_position, self.exponent)
    }

    /// Final illuminated color for a surface whose unlit color is `base`
    /// (the material color, or the texture color when texturing).
    pub fn compose(&self, base: Color, intensities: Intensities) -> Color {
        let kd = self.coefficient(Term::Diffuse);
        let ka = self.coefficient(Term::Ambient);
        let ks = self.coefficient(Term::Specular);
        base * (intensities.diffuse * kd + ka) + Color::splat(intensities.specular * ks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CAMERA: Vec3 = Vec3::new(0.0, 0.0, 25.0);

    #[test]
    fn intensities_stay_in_unit_range() {
        let normals = [
            Vec3::Z,
            Vec3::new(0.3, -0.8, 0.1),
            Vec3::new(-5.0, 2.0, 1.0),
            Vec3::ZERO,
        ];
        let lights = [
            DEFAULT_LIGHT_POSITION,
            Vec3::new(0.0, 0.0, -100.0),
            Vec3::ZERO,
            Vec3::new(1e5, 0.0, 0.0),
        ];
        let exponents = [0.0, 0.5, 1.0, 50.0, 1000.0, f32::INFINITY, -3.0, f32::NAN];

        for &n in &normals {
            for &l in &lights {
                for &e in &exponents {
                    let i = evaluate(Vec3::ZERO, n, CAMERA, l, e);
                    assert!((0.0..=1.0).contains(&i.diffuse), "diffuse {:?}", i);
                    assert!((0.0..=1.0).contains(&i.specular), "specular {:?}", i);
                }
            }
        }
    }

    #[test]
    fn zero_exponent_with_zero_alignment_has_no_highlight() {
        // Light behind the surface: the reflected ray points away from the viewer
        let i = evaluate(Vec3::ZERO, Vec3::Z, CAMERA, Vec3::new(0.0, 0.0, -10.0), 0.0);
        assert_eq!(i.specular, 0.0);
        assert_eq!(i.diffuse, 0.0);
    }

    #[test]
    fn zero_exponent_with_positive_alignment_is_full_highlight() {
        let i = evaluate(Vec3::ZERO, Vec3::Z, CAMERA, Vec3::new(10.0, 0.0, 10.0), 0.0);
        assert_eq!(i.specular, 1.0);
    }

    #[test]
    fn higher_exponent_sharpens_highlight() {
        let light = Vec3::new(10.0, 5.0, 10.0);
        let mut previous = f32::INFINITY;
        for e in [1.0, 2.0, 10.0, 50.0] {
            let s = evaluate(Vec3::ZERO, Vec3::Z, CAMERA, light, e).specular;
            assert!(s > 0.0 && s < previous, "exponent {} gave {}", e, s);
            previous = s;
        }
    }

    #[test]
    fn head_on_light_gives_full_diffuse() {
        let i = evaluate(Vec3::ZERO, Vec3::Z * 3.0, CAMERA, Vec3::new(0.0, 0.0, 40.0), 50.0);
        assert_relative_eq!(i.diffuse, 1.0);
        assert_relative_eq!(i.specular, 1.0);
    }

    #[test]
    fn compose_matches_formula() {
        let params = IlluminationParams::default();
        let base = default_base_color();
        let c = params.compose(base, Intensities::new(0.5, 0.25));
        assert_relative_eq!(c.r, base.r * (0.5 * 0.9 + 0.3) + 0.25);
        assert_relative_eq!(c.b, base.b * (0.5 * 0.9 + 0.3) + 0.25);
    }

    #[test]
    fn disabling_a_term_preserves_its_fraction() {
        let mut params = IlluminationParams::default();
        params.set_fraction(Term::Diffuse, 0.6);
        params.set_enabled(Term::Diffuse, false);
        assert_eq!(params.coefficient(Term::Diffuse), 0.0);
        assert_relative_eq!(params.fraction(Term::Diffuse), 0.6);
        params.set_enabled(Term::Diffuse, true);
        assert_relative_eq!(params.coefficient(Term::Diffuse), 0.6);
    }

    #[test]
    fn setters_sanitize_input() {
        let mut params = IlluminationParams::default();
        params.set_fraction(Term::Ambient, f32::NAN);
        params.set_fraction(Term::Specular, -1.0);
        params.set_exponent(f32::NAN);
        assert_eq!(params.fraction(Term::Ambient), 0.0);
        assert_eq!(params.fraction(Term::Specular), 0.0);
        assert_eq!(params.exponent(), 0.0);
    }

    #[test]
    fn emissive_ignores_lighting() {
        let params = IlluminationParams::emissive(Color::new(1.0, 0.0, 0.0));
        let c = params.compose(params.base_color, Intensities::new(1.0, 1.0));
        assert_eq!(c, Color::new(1.0, 0.0, 0.0));
    }
}
