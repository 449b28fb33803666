//! Linear RGB colors and conversion to the packed ARGB8888 frame format.

use std::ops::{Add, AddAssign, Mul};

/// RGB color with `f32` channels, nominally in [0, 1].
///
/// Channels are allowed to leave [0, 1] during shading (specular highlights
/// add on top of the lit base color); they are clamped only when packed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// Color from 8-bit channels, e.g. `rgb(33, 148, 206)`.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Color from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        Self::from_rgb8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Unpack an ARGB8888 pixel, ignoring alpha.
    pub fn from_argb(argb: u32) -> Self {
        Self::from_hex(argb & 0x00FF_FFFF)
    }

    /// Pack to ARGB8888 with full alpha. Channels are clamped to [0, 1]
    /// and NaN maps to 0.
    #[inline]
    pub fn to_argb(self) -> u32 {
        let channel = |c: f32| -> u32 { (crate::math::saturate(c) * 255.0 + 0.5) as u32 };
        0xFF00_0000 | (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn clamped(self) -> Self {
        use crate::math::saturate;
        Self::new(saturate(self.r), saturate(self.g), saturate(self.b))
    }

    /// Rec. 601 luma, used to read scalar maps such as height fields.
    pub fn luma(self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

/// Component-wise modulation.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

/// Default clear color of every scene.
pub const BACKGROUND: u32 = 0xFF77_7777;
/// Clear color of the aliasing scene.
pub const ALIASING_BACKGROUND: u32 = 0xFF21_94CE;
