//! Shading strategies.
//!
//! A draw call runs the [`vertex::VertexStage`] over every vertex, then
//! rasterizes with one of the three pixel shaders in [`fragment`]. The
//! strategy is chosen once per draw; all three end up in the same
//! illumination evaluator and differ only in where they call it:
//!
//! - **Phong**: per pixel, with interpolated and re-normalized inputs.
//! - **Flat**: once per primitive, with the attributes of its provoking vertex.
//! - **Gouraud**: per vertex; the intensities are interpolated and composed
//!   per pixel.

pub mod fragment;
pub mod vertex;

pub use fragment::{FlatShading, GouraudShading, PhongShading, StrategyShader};
pub use vertex::{ClipVertex, VertexOutput, VertexStage};

use crate::colors::Color;
use crate::illumination::Intensities;
use crate::material::MaterialConfig;
use crate::math::{saturate, Vec2, Vec3};
use crate::mesh::{spherical_uv, UvSource};
use crate::render::ShadowMap;
use crate::texture::cubemap::sample_or_black;
use crate::texture::{BoundTexture, EnvironmentMap, MipChain, SamplingState, UvDerivatives};

/// Refraction ratio used for see-through materials.
const REFRACTION_ETA: f32 = 0.9;

/// Where the illumination evaluator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingStrategy {
    #[default]
    Phong,
    Flat,
    Gouraud,
}

impl ShadingStrategy {
    pub const ALL: [ShadingStrategy; 3] = [
        ShadingStrategy::Phong,
        ShadingStrategy::Flat,
        ShadingStrategy::Gouraud,
    ];

    /// 0 = Phong, 1 = Flat, 2 = Gouraud. Out-of-range selectors clamp.
    pub fn from_selector(selector: i64) -> Self {
        match selector {
            i64::MIN..=0 => ShadingStrategy::Phong,
            1 => ShadingStrategy::Flat,
            _ => ShadingStrategy::Gouraud,
        }
    }

    pub fn selector(self) -> i64 {
        match self {
            ShadingStrategy::Phong => 0,
            ShadingStrategy::Flat => 1,
            ShadingStrategy::Gouraud => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShadingStrategy::Phong => "Phong",
            ShadingStrategy::Flat => "Flat",
            ShadingStrategy::Gouraud => "Gouraud",
        }
    }
}

impl std::fmt::Display for ShadingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-vertex attributes that are smoothly interpolated across a primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Varyings {
    pub world_position: Vec3,
    pub world_normal: Vec3,
    pub world_tangent: Vec3,
    /// Undisplaced object-space position, for the spherical UV fallback.
    pub object_position: Vec3,
    pub uv: Vec2,
    /// Evaluated per vertex by Gouraud; zero otherwise.
    pub intensities: Intensities,
}

impl Varyings {
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            world_position: self.world_position.lerp(other.world_position, t),
            world_normal: self.world_normal.lerp(other.world_normal, t),
            world_tangent: self.world_tangent.lerp(other.world_tangent, t),
            object_position: self.object_position.lerp(other.object_position, t),
            uv: self.uv.lerp(other.uv, t),
            intensities: self.intensities.lerp(other.intensities, t),
        }
    }

    /// Weighted sum of three vertices' attributes.
    pub fn interpolate(v: &[Varyings; 3], w: [f32; 3]) -> Self {
        let mix3 = |a: Vec3, b: Vec3, c: Vec3| a * w[0] + b * w[1] + c * w[2];
        Self {
            world_position: mix3(v[0].world_position, v[1].world_position, v[2].world_position),
            world_normal: mix3(v[0].world_normal, v[1].world_normal, v[2].world_normal),
            world_tangent: mix3(v[0].world_tangent, v[1].world_tangent, v[2].world_tangent),
            object_position: mix3(
                v[0].object_position,
                v[1].object_position,
                v[2].object_position,
            ),
            uv: v[0].uv * w[0] + v[1].uv * w[1] + v[2].uv * w[2],
            intensities: Intensities::new(
                v[0].intensities.diffuse * w[0]
                    + v[1].intensities.diffuse * w[1]
                    + v[2].intensities.diffuse * w[2],
                v[0].intensities.specular * w[0]
                    + v[1].intensities.specular * w[1]
                    + v[2].intensities.specular * w[2],
            ),
        }
    }
}

/// Attributes passed without interpolation: every fragment of a primitive
/// reads the values of its provoking vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlatAttributes {
    pub world_position: Vec3,
    pub world_normal: Vec3,
}

/// A fully resolved point on a surface, ready for illumination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    /// Unit normal, after normal mapping.
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub uv: Vec2,
}

/// Texture maps of a material sampled with their current sampler state.
///
/// Rebuilt when the sampling state or one of the material's slots changes.
#[derive(Debug, Clone, Default)]
pub struct MapBindings {
    texture: Option<BoundTexture>,
    normal: Option<BoundTexture>,
    displacement: Option<BoundTexture>,
}

impl MapBindings {
    /// Bind every loaded slot. The color texture follows the user's sampling
    /// state; normal and displacement maps are always filtered trilinearly.
    pub fn bind(material: &MaterialConfig, sampling: &SamplingState, visible: &MipChain) -> Self {
        let smooth = SamplingState::trilinear();
        let none = MipChain::none();
        Self {
            texture: material
                .texture_map
                .handle()
                .map(|t| BoundTexture::bind(t, sampling, visible)),
            normal: material
                .normal_map
                .handle()
                .map(|t| BoundTexture::bind(t, &smooth, &none)),
            displacement: material
                .displacement_map
                .handle()
                .map(|t| BoundTexture::bind(t, &smooth, &none)),
        }
    }

    /// The maps that actually take part in shading `material`: bound and
    /// switched on.
    pub fn resolve<'a>(&'a self, material: &'a MaterialConfig) -> BoundMaps<'a> {
        BoundMaps {
            texture: self.texture.as_ref().filter(|_| material.use_texture),
            normal: self.normal.as_ref().filter(|_| material.use_normal_map),
            displacement: self
                .displacement
                .as_ref()
                .filter(|_| material.use_displacement),
            environment: material.environment_map.ready(),
            shadow: None,
        }
    }
}

/// Active maps for one draw call. `None` means "use the fallback".
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundMaps<'a> {
    pub texture: Option<&'a BoundTexture>,
    pub normal: Option<&'a BoundTexture>,
    pub displacement: Option<&'a BoundTexture>,
    /// Absent reads as a black cube.
    pub environment: Option<&'a EnvironmentMap>,
    /// Set only for surfaces that receive shadows.
    pub shadow: Option<&'a ShadowMap>,
}

/// Uniform state shared by every vertex and fragment of a draw call.
#[derive(Debug, Clone, Copy)]
pub struct ShadingContext<'a> {
    pub material: &'a MaterialConfig,
    pub maps: BoundMaps<'a>,
    pub camera_position: Vec3,
    pub uv_source: UvSource,
    pub has_tangents: bool,
}

impl<'a> ShadingContext<'a> {
    /// Texture coordinate of an (interpolated) vertex.
    pub fn uv_at(&self, v: &Varyings) -> Vec2 {
        match self.uv_source {
            UvSource::Native => v.uv,
            UvSource::Spherical { center } => spherical_uv(v.object_position, center),
        }
    }

    /// Normal map, if it can be applied. Meshes without tangents skip it.
    pub fn normal_map(&self) -> Option<&'a BoundTexture> {
        self.maps.normal.filter(|_| self.has_tangents)
    }

    /// Resolve interpolated attributes into a surface sample, applying the
    /// normal map when active.
    pub fn surface(&self, v: &Varyings, uv: Vec2, derivatives: Option<&UvDerivatives>) -> SurfaceSample {
        let normal = v.world_normal.normalize();
        let tangent = v.world_tangent.normalize();
        let bitangent = normal.cross(tangent);
        let normal = match self.normal_map() {
            Some(map) => perturb_normal(normal, tangent, map.sample(uv, derivatives).color),
            None => normal,
        };
        SurfaceSample {
            position: v.world_position,
            normal,
            tangent,
            bitangent,
            uv,
        }
    }

    /// Unlit surface color: the texture at `uv * tiling` or the base color.
    pub fn base_color(&self, uv: Vec2, derivatives: Option<&UvDerivatives>) -> Color {
        match self.maps.texture {
            Some(texture) => {
                let tiling = self.material.tiling();
                if tiling != 1.0 {
                    let scaled = derivatives.map(|d| UvDerivatives {
                        dx: d.dx * tiling,
                        dy: d.dy * tiling,
                    });
                    texture.sample(uv * tiling, scaled.as_ref()).color
                } else {
                    texture.sample(uv, derivatives).color
                }
            }
            None => self.material.illumination.base_color,
        }
    }

    /// Blend environment reflection and refraction into an illuminated
    /// color. A mirror returns the reflected environment unchanged.
    pub fn apply_environment(&self, color: Color, surface: &SurfaceSample) -> Color {
        let m = self.material;
        if !(m.reflection || m.refraction || m.mirror) {
            return color;
        }

        let env = self.maps.environment;
        let to_camera = (self.camera_position - surface.position).normalize();
        let incident = -to_camera;
        let facing = saturate(to_camera.dot(surface.normal));
        let mut color = color;

        if m.reflection || m.mirror {
            let reflected = sample_or_black(env, incident.reflect(surface.normal));
            if m.mirror {
                return reflected;
            }
            let fresnel = 1.0 - facing;
            color = color * (1.0 - fresnel) + reflected * fresnel;
        }

        if m.refraction {
            let refracted = sample_or_black(env, incident.refract(surface.normal, REFRACTION_ETA));
            color = color * (1.2 - facing) + refracted * (0.8 * facing);
        }

        color
    }
}

/// Tilt `normal` by a tangent-space normal-map texel encoded as `n * 0.5 + 0.5`.
pub fn perturb_normal(normal: Vec3, tangent: Vec3, encoded: Color) -> Vec3 {
    let n = normal.normalize();
    let t = tangent.normalize();
    let b = n.cross(t);
    let m = Vec3::new(
        encoded.r * 2.0 - 1.0,
        encoded.g * 2.0 - 1.0,
        encoded.b * 2.0 - 1.0,
    )
    .normalize();
    (t * m.x + b * m.y + n * m.z).normalize()
}
