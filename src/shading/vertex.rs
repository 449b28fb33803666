//! Per-vertex stage: displacement, world transform, Gouraud lighting.

use super::{perturb_normal, FlatAttributes, ShadingContext, ShadingStrategy, Varyings};
use crate::illumination::Intensities;
use crate::math::{Mat4, Vec4};
use crate::mesh::{spherical_uv, UvSource, Vertex};

/// A vertex in homogeneous clip space together with its varyings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex {
    pub position: Vec4,
    pub varyings: Varyings,
}

impl ClipVertex {
    /// Interpolate position and every varying. Used where an edge crosses a
    /// clip plane.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            varyings: self.varyings.lerp(&other.varyings, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    pub clip: ClipVertex,
    pub flat: FlatAttributes,
}

/// Transforms mesh vertices for one draw call.
pub struct VertexStage<'a> {
    ctx: ShadingContext<'a>,
    model: Mat4,
    normal_matrix: Mat4,
    view_projection: Mat4,
}

impl<'a> VertexStage<'a> {
    pub fn new(ctx: ShadingContext<'a>, model: Mat4, normal_matrix: Mat4, view_projection: Mat4) -> Self {
        Self {
            ctx,
            model,
            normal_matrix,
            view_projection,
        }
    }

    pub fn run(&self, vertex: &Vertex) -> VertexOutput {
        let ctx = &self.ctx;
        let material = ctx.material;

        let uv = match ctx.uv_source {
            UvSource::Native => vertex.uv,
            UvSource::Spherical { center } => spherical_uv(vertex.position, center),
        };

        // Heights push along the object-space normal, normalized by the
        // object's scale so scaled-up meshes get the same relief
        let displaced = match ctx.maps.displacement {
            Some(map) => {
                let height = map.sample(uv, None).color.r;
                vertex.position + vertex.normal * (height / material.object_scale())
            }
            None => vertex.position,
        };

        let world_position = self.model.transform_point(displaced);
        let world_normal = self.normal_matrix.transform_direction(vertex.normal).normalize();
        let world_tangent = self.model.transform_direction(vertex.tangent.xyz()).normalize();

        // Flat and Gouraud only see per-vertex normals, so the normal map is
        // applied here for them
        let shaded_normal = match (material.strategy, ctx.normal_map()) {
            (ShadingStrategy::Phong, _) | (_, None) => world_normal,
            (_, Some(map)) => perturb_normal(world_normal, world_tangent, map.sample(uv, None).color),
        };

        let intensities = if material.strategy == ShadingStrategy::Gouraud {
            material
                .illumination
                .evaluate(world_position, shaded_normal, ctx.camera_position)
        } else {
            Intensities::default()
        };

        VertexOutput {
            clip: ClipVertex {
                position: self.view_projection * Vec4::point(world_position),
                varyings: Varyings {
                    world_position,
                    world_normal,
                    world_tangent,
                    object_position: vertex.position,
                    uv,
                    intensities,
                },
            },
            flat: FlatAttributes {
                world_position,
                world_normal: shaded_normal,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Color;
    use crate::material::{MapKind, MaterialConfig};
    use crate::math::{Vec2, Vec3};
    use crate::shading::{BoundMaps, MapBindings};
    use crate::texture::{MipChain, SamplingState, Texture};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn ctx<'a>(material: &'a MaterialConfig, maps: BoundMaps<'a>) -> ShadingContext<'a> {
        ShadingContext {
            material,
            maps,
            camera_position: Vec3::new(0.0, 0.0, 25.0),
            uv_source: UvSource::Native,
            has_tangents: true,
        }
    }

    fn vertex() -> Vertex {
        let mut v = Vertex::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z, Vec2::new(0.5, 0.5));
        v.tangent = Vec4::new(1.0, 0.0, 0.0, 1.0);
        v
    }

    #[test]
    fn displacement_is_scaled_by_object_scale() {
        let mut m = MaterialConfig::default();
        m.use_displacement = true;
        m.set_image(MapKind::Displacement, Arc::new(Texture::solid(Color::splat(1.0))));
        m.set_object_scale(4.0);
        let bindings = MapBindings::bind(&m, &SamplingState::default(), &MipChain::none());
        let stage = VertexStage::new(ctx(&m, bindings.resolve(&m)), Mat4::identity(), Mat4::identity(), Mat4::identity());

        let out = stage.run(&vertex());
        assert_relative_eq!(out.clip.varyings.world_position.z, 10.25);
        assert_relative_eq!(out.clip.varyings.object_position.z, 10.0);
    }

    #[test]
    fn only_gouraud_lights_vertices() {
        let mut m = MaterialConfig::default();
        for strategy in ShadingStrategy::ALL {
            m.strategy = strategy;
            let stage = VertexStage::new(ctx(&m, BoundMaps::default()), Mat4::identity(), Mat4::identity(), Mat4::identity());
            let lit = stage.run(&vertex()).clip.varyings.intensities;
            if strategy == ShadingStrategy::Gouraud {
                assert!(lit.diffuse > 0.0);
            } else {
                assert_eq!(lit, Intensities::default());
            }
        }
    }

    #[test]
    fn flat_normal_carries_the_normal_map() {
        let mut m = MaterialConfig::default();
        m.use_normal_map = true;
        m.set_image(MapKind::Normal, Arc::new(Texture::solid(Color::new(1.0, 0.5, 0.5))));
        let bindings = MapBindings::bind(&m, &SamplingState::default(), &MipChain::none());

        m.strategy = ShadingStrategy::Flat;
        let stage = VertexStage::new(ctx(&m, bindings.resolve(&m)), Mat4::identity(), Mat4::identity(), Mat4::identity());
        let out = stage.run(&vertex());
        assert!(out.flat.world_normal.x > 0.9);
        assert_eq!(out.clip.varyings.world_normal, Vec3::Z);

        m.strategy = ShadingStrategy::Phong;
        let stage = VertexStage::new(ctx(&m, bindings.resolve(&m)), Mat4::identity(), Mat4::identity(), Mat4::identity());
        assert_eq!(stage.run(&vertex()).flat.world_normal, Vec3::Z);
    }

    #[test]
    fn clip_position_uses_view_projection() {
        let m = MaterialConfig::default();
        let vp = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        let stage = VertexStage::new(ctx(&m, BoundMaps::default()), Mat4::identity(), Mat4::identity(), vp);
        let p = stage.run(&vertex()).clip.position;
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.z, 13.0);
        assert_relative_eq!(p.w, 1.0);
    }
}
