//! Supersampling antialiasing.
//!
//! At level `k > 0` a frame is rendered `2^k` times, each pass with the
//! projection shifted by a sub-pixel offset from the standard multisample
//! patterns, and the passes are averaged. Level 0 renders once with no
//! accumulation at all.

use crate::math::{Mat4, Vec2, Vec3};
use crate::render::Renderer;

/// Sample patterns in 1/16 pixel units, one table per level.
const PATTERNS: [&[(i8, i8)]; 6] = [
    &[(0, 0)],
    &[(4, 4), (-4, -4)],
    &[(-2, -6), (6, -2), (-6, 2), (2, 6)],
    &[
        (1, -3),
        (-1, 3),
        (5, 1),
        (-3, -5),
        (-5, 5),
        (-7, -1),
        (3, 7),
        (7, -7),
    ],
    &[
        (1, 1),
        (-1, -3),
        (-3, 2),
        (4, -1),
        (-5, -2),
        (2, 5),
        (5, 3),
        (3, -5),
        (-2, 6),
        (0, -7),
        (-4, -6),
        (-6, 4),
        (-8, 0),
        (7, -4),
        (6, 7),
        (-7, -8),
    ],
    &[
        (-4, -7),
        (-7, -5),
        (-3, -5),
        (-5, -4),
        (-1, -4),
        (-2, -2),
        (-6, -1),
        (-4, 0),
        (-7, 1),
        (-1, 2),
        (-6, 3),
        (-3, 3),
        (-7, 6),
        (-3, 6),
        (-5, 7),
        (-1, 7),
        (5, -7),
        (1, -6),
        (6, -5),
        (4, -4),
        (2, -3),
        (7, -2),
        (1, -1),
        (4, -1),
        (2, 1),
        (6, 2),
        (0, 4),
        (4, 4),
        (2, 5),
        (7, 5),
        (5, 6),
        (3, 7),
    ],
];

/// Supersampling level, always in 0..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SampleLevel(u8);

impl SampleLevel {
    pub const MAX: u8 = 5;

    /// Clamp any integer into range.
    pub fn new(level: i64) -> Self {
        Self(level.clamp(0, Self::MAX as i64) as u8)
    }

    /// NaN and negatives become 0, values above 5 become 5, fractions
    /// truncate.
    pub fn from_f32(level: f32) -> Self {
        if level.is_nan() || level <= 0.0 {
            return Self(0);
        }
        Self(level.min(Self::MAX as f32) as u8)
    }

    /// Parse user input. Anything that is not a number is level 0.
    pub fn parse(input: &str) -> Self {
        input
            .trim()
            .parse::<f32>()
            .map(Self::from_f32)
            .unwrap_or_default()
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn sample_count(self) -> usize {
        PATTERNS[self.0 as usize].len()
    }

    /// Sub-pixel sample positions relative to the pixel center, in pixels.
    pub fn offsets(self) -> impl Iterator<Item = Vec2> {
        PATTERNS[self.0 as usize]
            .iter()
            .map(|&(x, y)| Vec2::new(x as f32 / 16.0, y as f32 / 16.0))
    }
}

impl std::fmt::Display for SampleLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clip-space translation that moves the sample point of every pixel by
/// `offset` pixels. Premultiply it onto the view-projection matrix.
pub fn jitter_matrix(offset: Vec2, width: u32, height: u32) -> Mat4 {
    if offset == Vec2::ZERO || width == 0 || height == 0 {
        return Mat4::identity();
    }
    Mat4::translation(Vec3::new(
        -2.0 * offset.x / width as f32,
        2.0 * offset.y / height as f32,
        0.0,
    ))
}

/// Accumulates jittered passes and resolves their average into the
/// renderer's color buffer.
#[derive(Debug, Default)]
pub struct Compositor {
    accumulator: Vec<[u32; 3]>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one frame. `draw` renders a complete pass into the renderer
    /// given the sub-pixel offset to apply; at level 0 it is called once
    /// with a zero offset and the result is left untouched.
    pub fn render<F>(&mut self, renderer: &mut Renderer, level: SampleLevel, mut draw: F)
    where
        F: FnMut(&mut Renderer, Vec2),
    {
        if level.get() == 0 {
            draw(renderer, Vec2::ZERO);
            return;
        }

        let size = renderer.color_buffer().len();
        self.accumulator.clear();
        self.accumulator.resize(size, [0; 3]);

        let mut passes = 0u32;
        for offset in level.offsets() {
            draw(renderer, offset);
            for (sum, &argb) in self.accumulator.iter_mut().zip(renderer.color_buffer()) {
                sum[0] += (argb >> 16) & 0xFF;
                sum[1] += (argb >> 8) & 0xFF;
                sum[2] += argb & 0xFF;
            }
            passes += 1;
        }

        let half = passes / 2;
        for (out, sum) in renderer.color_buffer_mut().iter_mut().zip(&self.accumulator) {
            let r = (sum[0] + half) / passes;
            let g = (sum[1] + half) / passes;
            let b = (sum[2] + half) / passes;
            *out = 0xFF00_0000 | (r << 16) | (g << 8) | b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn level_clamps() {
        assert_eq!(SampleLevel::from_f32(-1.0).get(), 0);
        assert_eq!(SampleLevel::from_f32(7.0).get(), 5);
        assert_eq!(SampleLevel::from_f32(f32::NAN).get(), 0);
        assert_eq!(SampleLevel::from_f32(f32::INFINITY).get(), 5);
        assert_eq!(SampleLevel::from_f32(2.9).get(), 2);
        assert_eq!(SampleLevel::new(-4).get(), 0);
        assert_eq!(SampleLevel::new(99).get(), 5);
    }

    #[test]
    fn parse_rejects_non_numbers() {
        assert_eq!(SampleLevel::parse("3").get(), 3);
        assert_eq!(SampleLevel::parse(" 4 ").get(), 4);
        assert_eq!(SampleLevel::parse("lots").get(), 0);
        assert_eq!(SampleLevel::parse("NaN").get(), 0);
        assert_eq!(SampleLevel::parse("").get(), 0);
    }

    #[test]
    fn sample_counts_double_per_level() {
        for k in 0..=5 {
            assert_eq!(SampleLevel::new(k).sample_count(), 1 << k);
        }
    }

    #[test]
    fn patterns_stay_inside_the_pixel_and_are_centered() {
        for k in 0..=5 {
            let level = SampleLevel::new(k);
            let mut sum = Vec2::ZERO;
            for o in level.offsets() {
                assert!(o.x.abs() <= 0.5 && o.y.abs() <= 0.5);
                sum = sum + o;
            }
            let n = level.sample_count() as f32;
            assert!((sum.x / n).abs() <= 1.0 / 16.0);
            assert!((sum.y / n).abs() <= 1.0 / 16.0);
        }
    }

    #[test]
    fn jitter_shifts_ndc_by_pixel_fraction() {
        let m = jitter_matrix(Vec2::new(0.5, 0.25), 100, 50);
        let p = m * crate::math::Vec4::new(0.0, 0.0, 0.3, 2.0);
        assert_relative_eq!(p.x / p.w, -0.01);
        assert_relative_eq!(p.y / p.w, 0.01);
        assert_relative_eq!(p.z, 0.3);
        assert_eq!(jitter_matrix(Vec2::ZERO, 100, 50), Mat4::identity());
    }

    #[test]
    fn level_zero_bypasses_accumulation() {
        let mut renderer = Renderer::new(2, 2);
        let mut compositor = Compositor::new();
        let mut calls = 0;
        compositor.render(&mut renderer, SampleLevel::default(), |r, offset| {
            assert_eq!(offset, Vec2::ZERO);
            r.clear(0xFF12_3456);
            calls += 1;
        });
        assert_eq!(calls, 1);
        assert_eq!(renderer.pixel(0, 0), Some(0xFF12_3456));
        assert!(compositor.accumulator.is_empty());
    }

    #[test]
    fn passes_are_averaged() {
        let mut renderer = Renderer::new(2, 2);
        let mut compositor = Compositor::new();
        let mut pass = 0;
        compositor.render(&mut renderer, SampleLevel::new(1), |r, _| {
            r.clear(if pass == 0 { 0xFF00_0000 } else { 0xFFFF_FFFF });
            pass += 1;
        });
        assert_eq!(pass, 2);
        assert_eq!(renderer.pixel(1, 1), Some(0xFF80_8080));
    }
}
