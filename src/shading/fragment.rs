//! Pixel shaders for the three shading strategies.
//!
//! A shader is built per rasterized triangle from the three clipped
//! vertices' varyings and the primitive's flat attributes.

use super::{FlatAttributes, ShadingContext, SurfaceSample, Varyings};
use crate::colors::Color;
use crate::illumination::Intensities;
use crate::math::{Vec2, Vec3};
use crate::mesh::{spherical_uv, UvSource};
use crate::render::{Fragment, PixelShader};
use crate::texture::UvDerivatives;

/// A pixel shader that can be instantiated for one triangle of a draw call.
pub trait StrategyShader<'a>: PixelShader + Sized {
    fn new(ctx: ShadingContext<'a>, vertices: [Varyings; 3], flat: FlatAttributes) -> Self;
}

/// Interpolated inputs shared by all strategies.
struct Shaded {
    varyings: Varyings,
    surface: SurfaceSample,
    base: Color,
}

fn uv_at_weights(ctx: &ShadingContext, v: &[Varyings; 3], w: [f32; 3]) -> Vec2 {
    match ctx.uv_source {
        UvSource::Native => v[0].uv * w[0] + v[1].uv * w[1] + v[2].uv * w[2],
        UvSource::Spherical { center } => {
            let p: Vec3 =
                v[0].object_position * w[0] + v[1].object_position * w[1] + v[2].object_position * w[2];
            spherical_uv(p, center)
        }
    }
}

fn interpolate(ctx: &ShadingContext, v: &[Varyings; 3], fragment: &Fragment) -> Shaded {
    let varyings = Varyings::interpolate(v, fragment.weights);
    let uv = ctx.uv_at(&varyings);

    let wants_derivatives = ctx.maps.texture.is_some() || ctx.normal_map().is_some();
    let derivatives = match fragment.neighbors {
        Some([right, below]) if wants_derivatives => Some(UvDerivatives {
            dx: uv_at_weights(ctx, v, right) - uv,
            dy: uv_at_weights(ctx, v, below) - uv,
        }),
        _ => None,
    };

    Shaded {
        varyings,
        surface: ctx.surface(&varyings, uv, derivatives.as_ref()),
        base: ctx.base_color(uv, derivatives.as_ref()),
    }
}

fn finish(ctx: &ShadingContext, shaded: &Shaded, intensities: Intensities) -> u32 {
    // Shadow only removes the light's own contribution; ambient stays
    let intensities = match ctx.maps.shadow {
        Some(shadow) => {
            let visible = shadow.visibility(shaded.surface.position);
            Intensities::new(intensities.diffuse * visible, intensities.specular * visible)
        }
        None => intensities,
    };
    let lit = ctx.material.illumination.compose(shaded.base, intensities);
    ctx.apply_environment(lit, &shaded.surface).to_argb()
}

/// Per-pixel lighting with interpolated, re-normalized position and normal.
pub struct PhongShading<'a> {
    ctx: ShadingContext<'a>,
    vertices: [Varyings; 3],
}

impl<'a> StrategyShader<'a> for PhongShading<'a> {
    fn new(ctx: ShadingContext<'a>, vertices: [Varyings; 3], _flat: FlatAttributes) -> Self {
        Self { ctx, vertices }
    }
}

impl PixelShader for PhongShading<'_> {
    fn shade(&self, fragment: &Fragment) -> u32 {
        let shaded = interpolate(&self.ctx, &self.vertices, fragment);
        let intensities = self.ctx.material.illumination.evaluate(
            shaded.surface.position,
            shaded.surface.normal,
            self.ctx.camera_position,
        );
        finish(&self.ctx, &shaded, intensities)
    }
}

/// One lighting evaluation per primitive, at its provoking vertex.
pub struct FlatShading<'a> {
    ctx: ShadingContext<'a>,
    vertices: [Varyings; 3],
    intensities: Intensities,
}

impl<'a> StrategyShader<'a> for FlatShading<'a> {
    fn new(ctx: ShadingContext<'a>, vertices: [Varyings; 3], flat: FlatAttributes) -> Self {
        let intensities = ctx.material.illumination.evaluate(
            flat.world_position,
            flat.world_normal,
            ctx.camera_position,
        );
        Self {
            ctx,
            vertices,
            intensities,
        }
    }
}

impl PixelShader for FlatShading<'_> {
    fn shade(&self, fragment: &Fragment) -> u32 {
        let shaded = interpolate(&self.ctx, &self.vertices, fragment);
        finish(&self.ctx, &shaded, self.intensities)
    }
}

/// Per-vertex lighting; intensities are interpolated and composed per pixel.
pub struct GouraudShading<'a> {
    ctx: ShadingContext<'a>,
    vertices: [Varyings; 3],
}

impl<'a> StrategyShader<'a> for GouraudShading<'a> {
    fn new(ctx: ShadingContext<'a>, vertices: [Varyings; 3], _flat: FlatAttributes) -> Self {
        Self { ctx, vertices }
    }
}

impl PixelShader for GouraudShading<'_> {
    fn shade(&self, fragment: &Fragment) -> u32 {
        let shaded = interpolate(&self.ctx, &self.vertices, fragment);
        let intensities = shaded.varyings.intensities;
        finish(&self.ctx, &shaded, intensities)
    }
}
