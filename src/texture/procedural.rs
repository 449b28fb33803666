//! Built-in procedural images.
//!
//! These stand in for image files so every scene can render without
//! external assets: the checkerboard and its visible mip chain, pixel noise,
//! an egg-crate height field with its normal map, and a gradient sky.

use std::f32::consts::TAU;

use super::cubemap::{face_direction, EnvironmentMap};
use super::mipmap::VISIBLE_LEVELS;
use super::Texture;
use crate::colors::Color;
use crate::math::Vec3;

/// Tints of visible mip levels 1 through 6.
const LEVEL_TINTS: [u32; 6] = [0xE53935, 0x43A047, 0x1E88E5, 0xFDD835, 0x8E24AA, 0x00ACC1];

/// Black and white checkerboard with `cells` squares per side.
pub fn checkerboard(size: u32, cells: u32) -> Texture {
    tinted_checkerboard(size, cells, Color::WHITE)
}

fn tinted_checkerboard(size: u32, cells: u32, tint: Color) -> Texture {
    let cell = (size / cells.max(1)).max(1);
    Texture::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            tint
        } else {
            Color::BLACK
        }
    })
}

/// The eight levels of the visible chain: a 128x128 black and white
/// checkerboard, six tinted checkerboards and a flat gray 1x1 level.
pub fn visible_mip_levels() -> Vec<Texture> {
    let mut levels = Vec::with_capacity(VISIBLE_LEVELS);
    levels.push(checkerboard(128, 8));
    for (k, tint) in LEVEL_TINTS.iter().enumerate() {
        levels.push(tinted_checkerboard(128 >> (k + 1), 8, Color::from_hex(*tint)));
    }
    levels.push(Texture::solid(Color::splat(0.5)));
    levels
}

/// Deterministic per-texel color noise.
pub fn pixel_noise(size: u32, seed: u32) -> Texture {
    let mut state = seed.max(1);
    let mut next = move || {
        // xorshift32
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state & 0xFF) as u8
    };
    Texture::from_fn(size, size, |_, _| {
        let (r, g, b) = (next(), next(), next());
        Color::from_rgb8(r, g, b)
    })
}

/// Tileable egg-crate height field in [0, 1] with `bumps` periods per side.
pub fn egg_crate_height(size: u32, bumps: u32) -> Texture {
    let freq = TAU * bumps as f32 / size as f32;
    Texture::from_fn(size, size, |x, y| {
        let h = 0.5 + 0.25 * ((x as f32 * freq).sin() + (y as f32 * freq).sin());
        Color::splat(h)
    })
}

/// Tangent-space normal map of a height field, encoded as `n * 0.5 + 0.5`.
///
/// Red follows +U, green follows +V (up in the image), blue the surface
/// normal. `strength` scales the slopes.
pub fn normal_map_from_height(height: &Texture, strength: f32) -> Texture {
    let h = |x: i64, y: i64| height.texel(x, y).r;
    Texture::from_fn(height.width(), height.height(), |x, y| {
        let (x, y) = (x as i64, y as i64);
        let dh_du = (h(x + 1, y) - h(x - 1, y)) * 0.5 * strength;
        // Image rows grow downward while V grows upward
        let dh_dv = (h(x, y - 1) - h(x, y + 1)) * 0.5 * strength;
        let n = Vec3::new(-dh_du, -dh_dv, 1.0).normalize();
        Color::new(n.x * 0.5 + 0.5, n.y * 0.5 + 0.5, n.z * 0.5 + 0.5)
    })
    .with_wrap(height.wrap())
}

/// Gradient sky over a dark ground with alternating azimuth bands, so
/// reflections visibly rotate with the object.
pub fn sky_environment(face_size: u32) -> EnvironmentMap {
    let zenith = Color::new(0.25, 0.5, 0.9);
    let horizon = Color::new(0.9, 0.92, 0.95);
    let ground = Color::new(0.3, 0.26, 0.22);

    let face = |index: usize| {
        Texture::from_fn(face_size, face_size, |x, y| {
            let s = (x as f32 + 0.5) / face_size as f32;
            let t = (y as f32 + 0.5) / face_size as f32;
            let d = face_direction(index, s, t).normalize();

            let base = if d.y >= 0.0 {
                horizon.lerp(zenith, d.y.sqrt())
            } else {
                horizon.lerp(ground, (-d.y).sqrt())
            };
            let band = ((d.x.atan2(d.z) / TAU + 0.5) * 12.0).floor() as i32;
            if band % 2 == 0 {
                base
            } else {
                base * 0.85
            }
        })
    };

    EnvironmentMap::new([face(0), face(1), face(2), face(3), face(4), face(5)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn visible_levels_halve_in_size() {
        let levels = visible_mip_levels();
        assert_eq!(levels.len(), VISIBLE_LEVELS);
        for (i, level) in levels.iter().enumerate() {
            assert_eq!(level.width(), 128 >> i);
        }
    }

    #[test]
    fn checkerboard_alternates() {
        let tex = checkerboard(16, 2);
        assert_eq!(tex.texel(0, 0), Color::WHITE);
        assert_eq!(tex.texel(8, 0), Color::BLACK);
        assert_eq!(tex.texel(8, 8), Color::WHITE);
    }

    #[test]
    fn noise_is_deterministic() {
        assert_eq!(pixel_noise(8, 7), pixel_noise(8, 7));
        assert_ne!(pixel_noise(8, 7), pixel_noise(8, 8));
    }

    #[test]
    fn flat_height_gives_straight_up_normals() {
        let flat = Texture::solid(Color::splat(0.5));
        let n = normal_map_from_height(&flat, 4.0).texel(0, 0);
        assert_relative_eq!(n.r, 0.5);
        assert_relative_eq!(n.g, 0.5);
        assert_relative_eq!(n.b, 1.0);
    }

    #[test]
    fn slope_tilts_normal_against_gradient() {
        // Height increases to the right
        let ramp = Texture::from_fn(4, 1, |x, _| Color::splat(x as f32 / 4.0));
        let n = normal_map_from_height(&ramp.with_wrap(crate::texture::WrapMode::ClampToEdge), 4.0)
            .texel(1, 0);
        assert!(n.r < 0.5);
    }
}
