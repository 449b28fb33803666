//! Textures, samplers and mip chains.
//!
//! A [`Texture`] is an immutable image asset. Filtering is not a property of
//! the asset: it comes from the current [`SamplingState`], and a texture is
//! combined with it into a [`BoundTexture`] whenever either changes.

pub mod cubemap;
pub mod mipmap;
pub mod procedural;
pub mod sampler;

pub use cubemap::EnvironmentMap;
pub use mipmap::{BoundTexture, MipChain, TexSample, UvDerivatives};
pub use sampler::{derive_sampler, FilterMode, MagFilter, MinFilter, MipMode, SamplerDesc, SamplingState};

use std::path::Path;

use crate::colors::Color;
use crate::error::AssetError;
use crate::math::Vec2;

/// How texel addresses outside the image are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    ClampToEdge,
}

/// A 2D image stored top row first.
///
/// # UV Coordinate Convention
/// - (0,0) is the bottom-left corner of the image, (1,1) the top-right
/// - Rows are stored top-down, so V is flipped on lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    texels: Vec<Color>,
    width: u32,
    height: u32,
    wrap: WrapMode,
}

impl Texture {
    /// Build a texture by evaluating `f(x, y)` for every texel (row 0 = top).
    ///
    /// Zero dimensions are bumped to 1.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Color) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut texels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                texels.push(f(x, y));
            }
        }
        Self {
            texels,
            width,
            height,
            wrap: WrapMode::default(),
        }
    }

    /// A 1x1 texture of a single color.
    pub fn solid(color: Color) -> Self {
        Self::from_fn(1, 1, |_, _| color)
    }

    /// Load a texture from an image file (PNG, JPG, etc.)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Self::from_fn(width, height, |x, y| {
            let [r, g, b] = img.get_pixel(x, y).0;
            Color::from_rgb8(r, g, b)
        }))
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn wrap(&self) -> WrapMode {
        self.wrap
    }

    /// Texel at integer coordinates, resolved with the wrap mode.
    #[inline]
    pub fn texel(&self, x: i64, y: i64) -> Color {
        let (w, h) = (self.width as i64, self.height as i64);
        let (x, y) = match self.wrap {
            WrapMode::Repeat => (x.rem_euclid(w), y.rem_euclid(h)),
            WrapMode::ClampToEdge => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
        };
        self.texels[(y * w + x) as usize]
    }

    /// Point sample: the texel containing `uv`.
    #[inline]
    pub fn sample_nearest(&self, uv: Vec2) -> Color {
        let (x, y) = self.texel_space(uv);
        let x = self.reduce(x.floor(), self.width);
        let y = self.reduce(y.floor(), self.height);
        self.texel(x, y)
    }

    /// Bilinear sample between the four texel centers surrounding `uv`.
    #[inline]
    pub fn sample_bilinear(&self, uv: Vec2) -> Color {
        let (x, y) = self.texel_space(uv);
        let (x, y) = (x - 0.5, y - 0.5);
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        let x0 = self.reduce(x0, self.width);
        let y0 = self.reduce(y0, self.height);
        if fx.is_nan() || fy.is_nan() {
            return self.texel(x0, y0);
        }

        let top = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), fx);
        let bottom = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), fx);
        top.lerp(bottom, fy)
    }

    /// Half-resolution copy using a 2x2 box filter, or `None` at 1x1.
    pub fn downsample(&self) -> Option<Texture> {
        if self.width == 1 && self.height == 1 {
            return None;
        }
        let width = (self.width / 2).max(1);
        let height = (self.height / 2).max(1);
        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let texels = self.texels.as_slice();
        let src_w = self.width as i64;
        let fetch = |x: i64, y: i64| texels[(y.min(max_y) * src_w + x.min(max_x)) as usize];

        let mut half = Texture::from_fn(width, height, |x, y| {
            let (sx, sy) = (x as i64 * 2, y as i64 * 2);
            (fetch(sx, sy) + fetch(sx + 1, sy) + fetch(sx, sy + 1) + fetch(sx + 1, sy + 1)) * 0.25
        });
        half.wrap = self.wrap;
        Some(half)
    }

    #[inline]
    fn texel_space(&self, uv: Vec2) -> (f32, f32) {
        (uv.x * self.width as f32, (1.0 - uv.y) * self.height as f32)
    }

    /// Bring a floored texel coordinate into a small range before it
    /// becomes an integer, so neighbor offsets cannot overflow. Repeat
    /// wraps into `[0, extent)`; clamp pins to one texel past either edge.
    /// NaN and infinities land on texel 0.
    #[inline]
    fn reduce(&self, coordinate: f32, extent: u32) -> i64 {
        let extent = extent as f32;
        let reduced = match self.wrap {
            WrapMode::Repeat => coordinate.rem_euclid(extent),
            WrapMode::ClampToEdge => coordinate.clamp(-1.0, extent),
        };
        if reduced.is_finite() {
            reduced as i64
        } else {
            0
        }
    }
}
