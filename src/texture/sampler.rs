//! Sampling state and the filter policy derived from it.
//!
//! The user picks three independent settings (magnification filter,
//! minification filter, mip mode). [`derive_sampler`] turns them into the
//! filter pair used by every texture lookup:
//!
//! | minification | mip mode      | min filter               |
//! |--------------|---------------|--------------------------|
//! | nearest      | off           | `Nearest`                |
//! | nearest      | auto/visible  | `NearestMipmapNearest`   |
//! | bilinear     | off           | `Linear`                 |
//! | bilinear     | auto/visible  | `LinearMipmapLinear`     |

use crate::supersample::SampleLevel;

/// A user-facing filter choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Nearest,
    Bilinear,
}

impl FilterMode {
    /// 0 = nearest, anything else = bilinear.
    pub fn from_selector(selector: i64) -> Self {
        if selector <= 0 {
            FilterMode::Nearest
        } else {
            FilterMode::Bilinear
        }
    }

    pub fn selector(self) -> i64 {
        match self {
            FilterMode::Nearest => 0,
            FilterMode::Bilinear => 1,
        }
    }
}

/// Where mip levels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MipMode {
    /// No mip chain; minification samples the base image.
    #[default]
    Off,
    /// Box-filtered chain generated from the base image.
    Auto,
    /// Fixed chain of distinctly colored checkerboards.
    Visible,
}

impl MipMode {
    /// 0 = off, 1 = auto, 2 (or more) = visible. Negative clamps to off.
    pub fn from_selector(selector: i64) -> Self {
        match selector {
            i64::MIN..=0 => MipMode::Off,
            1 => MipMode::Auto,
            _ => MipMode::Visible,
        }
    }

    pub fn selector(self) -> i64 {
        match self {
            MipMode::Off => 0,
            MipMode::Auto => 1,
            MipMode::Visible => 2,
        }
    }
}

/// Filter used when a texel covers more than one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagFilter {
    Nearest,
    Linear,
}

/// Filter used when a pixel covers more than one texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    Linear,
    /// Nearest mip level, point sampled.
    NearestMipmapNearest,
    /// Trilinear: bilinear within the two nearest levels, blended.
    LinearMipmapLinear,
}

impl MinFilter {
    pub fn uses_mipmaps(self) -> bool {
        matches!(
            self,
            MinFilter::NearestMipmapNearest | MinFilter::LinearMipmapLinear
        )
    }
}

/// The filter pair applied by texture lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDesc {
    pub mag: MagFilter,
    pub min: MinFilter,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        derive_sampler(&SamplingState::default())
    }
}

/// User-selected sampling settings.
///
/// Reset to defaults on scene reset, mutated by configuration events and
/// consumed once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplingState {
    pub magnification: FilterMode,
    pub minification: FilterMode,
    pub mip_mode: MipMode,
    pub supersampling: SampleLevel,
}

impl SamplingState {
    /// Bilinear filtering with generated mips, used for maps that the
    /// aliasing controls do not govern (normal and displacement maps).
    pub fn trilinear() -> Self {
        Self {
            magnification: FilterMode::Bilinear,
            minification: FilterMode::Bilinear,
            mip_mode: MipMode::Auto,
            supersampling: SampleLevel::default(),
        }
    }
}

/// Derive the sampler filter pair from the sampling state.
pub fn derive_sampler(state: &SamplingState) -> SamplerDesc {
    let mag = match state.magnification {
        FilterMode::Nearest => MagFilter::Nearest,
        FilterMode::Bilinear => MagFilter::Linear,
    };
    let mipmapped = state.mip_mode != MipMode::Off;
    let min = match (state.minification, mipmapped) {
        (FilterMode::Nearest, false) => MinFilter::Nearest,
        (FilterMode::Nearest, true) => MinFilter::NearestMipmapNearest,
        (FilterMode::Bilinear, false) => MinFilter::Linear,
        (FilterMode::Bilinear, true) => MinFilter::LinearMipmapLinear,
    };
    SamplerDesc { mag, min }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table_covers_every_combination() {
        let filters = [FilterMode::Nearest, FilterMode::Bilinear];
        let mips = [MipMode::Off, MipMode::Auto, MipMode::Visible];

        for mag in filters {
            for min in filters {
                for mip in mips {
                    let state = SamplingState {
                        magnification: mag,
                        minification: min,
                        mip_mode: mip,
                        ..Default::default()
                    };
                    let desc = derive_sampler(&state);

                    let expected_mag = match mag {
                        FilterMode::Nearest => MagFilter::Nearest,
                        FilterMode::Bilinear => MagFilter::Linear,
                    };
                    let expected_min = match (min, mip) {
                        (FilterMode::Nearest, MipMode::Off) => MinFilter::Nearest,
                        (FilterMode::Nearest, _) => MinFilter::NearestMipmapNearest,
                        (FilterMode::Bilinear, MipMode::Off) => MinFilter::Linear,
                        (FilterMode::Bilinear, _) => MinFilter::LinearMipmapLinear,
                    };
                    assert_eq!(desc, SamplerDesc { mag: expected_mag, min: expected_min });
                }
            }
        }
    }

    #[test]
    fn magnification_is_independent_of_mip_mode() {
        let mut state = SamplingState {
            magnification: FilterMode::Bilinear,
            ..Default::default()
        };
        let before = derive_sampler(&state).mag;
        state.mip_mode = MipMode::Visible;
        assert_eq!(derive_sampler(&state).mag, before);
    }

    #[test]
    fn selectors_clamp() {
        assert_eq!(FilterMode::from_selector(-4), FilterMode::Nearest);
        assert_eq!(FilterMode::from_selector(9), FilterMode::Bilinear);
        assert_eq!(MipMode::from_selector(-1), MipMode::Off);
        assert_eq!(MipMode::from_selector(7), MipMode::Visible);
        for mode in [MipMode::Off, MipMode::Auto, MipMode::Visible] {
            assert_eq!(MipMode::from_selector(mode.selector()), mode);
        }
        for filter in [FilterMode::Nearest, FilterMode::Bilinear] {
            assert_eq!(FilterMode::from_selector(filter.selector()), filter);
        }
    }

    #[test]
    fn defaults_are_point_sampled_without_mips() {
        let desc = SamplerDesc::default();
        assert_eq!(desc.mag, MagFilter::Nearest);
        assert_eq!(desc.min, MinFilter::Nearest);
        assert!(!desc.min.uses_mipmaps());
    }
}
