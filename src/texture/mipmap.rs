//! Mip chains and level-of-detail selection.

use std::sync::Arc;

use super::procedural;
use super::sampler::{derive_sampler, MagFilter, MinFilter, MipMode, SamplerDesc, SamplingState};
use super::Texture;
use crate::colors::Color;
use crate::error::AssetError;
use crate::math::Vec2;

/// Number of levels in the visible checkerboard chain (128x128 down to 1x1).
pub const VISIBLE_LEVELS: usize = 8;

/// An ordered list of mip levels, level 0 finest. Empty when mipmapping is off.
#[derive(Debug, Clone, Default)]
pub struct MipChain {
    levels: Vec<Arc<Texture>>,
}

impl MipChain {
    pub fn none() -> Self {
        Self::default()
    }

    /// Full chain down to 1x1, box filtered from `base`. Level 0 is `base`.
    pub fn generate(base: &Arc<Texture>) -> Self {
        let mut levels = vec![Arc::clone(base)];
        while let Some(next) = levels.last().and_then(|l| l.downsample()) {
            levels.push(Arc::new(next));
        }
        Self { levels }
    }

    /// The built-in color-coded chain.
    pub fn visible() -> Self {
        Self {
            levels: procedural::visible_mip_levels()
                .into_iter()
                .map(Arc::new)
                .collect(),
        }
    }

    /// A chain of exactly [`VISIBLE_LEVELS`] externally supplied images, each
    /// half the size of the previous one (rounding down, minimum 1).
    pub fn from_levels(levels: Vec<Texture>) -> Result<Self, AssetError> {
        if levels.len() != VISIBLE_LEVELS {
            return Err(AssetError::InvalidMipChain(format!(
                "expected {} levels, got {}",
                VISIBLE_LEVELS,
                levels.len()
            )));
        }
        for (i, pair) in levels.windows(2).enumerate() {
            let expected = ((pair[0].width() / 2).max(1), (pair[0].height() / 2).max(1));
            let actual = (pair[1].width(), pair[1].height());
            if actual != expected {
                return Err(AssetError::InvalidMipChain(format!(
                    "level {} is {}x{}, expected {}x{}",
                    i + 1,
                    actual.0,
                    actual.1,
                    expected.0,
                    expected.1
                )));
            }
        }
        Ok(Self {
            levels: levels.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> Option<&Texture> {
        self.levels.get(index).map(Arc::as_ref)
    }
}

/// Screen-space derivatives of the texture coordinate, in UV units per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UvDerivatives {
    pub dx: Vec2,
    pub dy: Vec2,
}

/// Result of a filtered lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexSample {
    pub color: Color,
    /// Mip level the color came from; fractional when two levels are blended.
    pub level: f32,
}

/// A texture asset combined with the sampler and mip chain it is read with.
///
/// Rebuilt whenever the sampling state or the bound texture changes.
#[derive(Debug, Clone)]
pub struct BoundTexture {
    base: Arc<Texture>,
    chain: MipChain,
    sampler: SamplerDesc,
}

impl BoundTexture {
    /// Bind `base` under `state`. In [`MipMode::Visible`] the shared
    /// `visible` chain replaces the image at every level.
    pub fn bind(base: Arc<Texture>, state: &SamplingState, visible: &MipChain) -> Self {
        let chain = match state.mip_mode {
            MipMode::Off => MipChain::none(),
            MipMode::Auto => MipChain::generate(&base),
            MipMode::Visible => visible.clone(),
        };
        Self {
            base,
            chain,
            sampler: derive_sampler(state),
        }
    }

    pub fn sampler(&self) -> SamplerDesc {
        self.sampler
    }

    pub fn mip_levels(&self) -> usize {
        self.chain.len()
    }

    /// Filtered lookup. Without derivatives (e.g. in the vertex stage) the
    /// lookup is treated as magnification of level 0.
    pub fn sample(&self, uv: Vec2, derivatives: Option<&UvDerivatives>) -> TexSample {
        let level0 = self.level(0);
        let lambda = derivatives
            .map(|d| lod(d, level0))
            .filter(|l| !l.is_nan())
            .unwrap_or(0.0);

        if lambda <= 0.0 {
            let color = match self.sampler.mag {
                MagFilter::Nearest => level0.sample_nearest(uv),
                MagFilter::Linear => level0.sample_bilinear(uv),
            };
            return TexSample { color, level: 0.0 };
        }

        let max_level = self.chain.len().saturating_sub(1) as f32;
        match self.sampler.min {
            MinFilter::Nearest => TexSample {
                color: level0.sample_nearest(uv),
                level: 0.0,
            },
            MinFilter::Linear => TexSample {
                color: level0.sample_bilinear(uv),
                level: 0.0,
            },
            MinFilter::NearestMipmapNearest => {
                let d = if lambda <= 0.5 {
                    0.0
                } else {
                    ((lambda + 0.5).ceil() - 1.0).min(max_level)
                };
                TexSample {
                    color: self.level(d as usize).sample_nearest(uv),
                    level: d,
                }
            }
            MinFilter::LinearMipmapLinear => {
                if lambda >= max_level {
                    return TexSample {
                        color: self.level(max_level as usize).sample_bilinear(uv),
                        level: max_level,
                    };
                }
                let d1 = lambda.floor();
                let t = lambda - d1;
                let fine = self.level(d1 as usize).sample_bilinear(uv);
                let coarse = self.level(d1 as usize + 1).sample_bilinear(uv);
                TexSample {
                    color: fine.lerp(coarse, t),
                    level: lambda,
                }
            }
        }
    }

    fn level(&self, index: usize) -> &Texture {
        self.chain.level(index).unwrap_or(&self.base)
    }
}

/// `log2` of the larger screen-axis footprint, measured in level-0 texels.
fn lod(d: &UvDerivatives, level0: &Texture) -> f32 {
    let (w, h) = (level0.width() as f32, level0.height() as f32);
    let rho_x = ((d.dx.x * w).powi(2) + (d.dx.y * h).powi(2)).sqrt();
    let rho_y = ((d.dy.x * w).powi(2) + (d.dy.y * h).powi(2)).sqrt();
    rho_x.max(rho_y).log2()
}
