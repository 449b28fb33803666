//! Omnidirectional shadow map for the scene's point light.
//!
//! Casters are rendered into six 90 degree faces around the light through
//! the regular clipper and rasterizer. Each texel stores the distance from
//! the light to the nearest caster, as `f32` bits in the color plane, so a
//! receiver is lit when it is no farther away than what the light sees.
//! Lookups filter a 3x3 block of texels for a soft edge.

use std::f32::consts::FRAC_PI_2;

use super::clipper::{ClipPolygon, Clipper};
use super::framebuffer::{FrameBuffer, MAX_DEPTH};
use super::rasterizer::{rasterize_triangle, DepthMode, Fragment, PixelShader};
use super::renderer::to_screen;
use crate::math::{Mat4, Vec3, Vec4};
use crate::mesh::Mesh;
use crate::shading::{ClipVertex, Varyings};

/// Texels along each face edge.
pub const SHADOW_MAP_SIZE: u32 = 512;

const SHADOW_NEAR: f32 = 0.5;
const SHADOW_FAR: f32 = 1000.0;
/// Distance a receiver may sit behind the stored caster and still be lit.
const SHADOW_BIAS: f32 = 0.05;

/// View direction and up vector of each cube face: +X, -X, +Y, -Y, +Z, -Z.
const FACES: [(Vec3, Vec3); 6] = [
    (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
    (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
    (Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
    (Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
    (Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, -1.0, 0.0)),
    (Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, -1.0, 0.0)),
];

/// Writes the light distance of the interpolated world position.
struct DistanceShader {
    light: Vec3,
    positions: [Vec3; 3],
}

impl PixelShader for DistanceShader {
    fn shade(&self, fragment: &Fragment) -> u32 {
        let [a, b, c] = fragment.weights;
        let p = self.positions[0] * a + self.positions[1] * b + self.positions[2] * c;
        (p - self.light).length().to_bits()
    }
}

#[derive(Debug, Clone)]
pub struct ShadowMap {
    size: u32,
    light: Vec3,
    view_projections: [Mat4; 6],
    faces: Vec<Vec<u32>>,
    depth: Vec<u32>,
}

impl ShadowMap {
    /// An empty map: every point is lit until casters are rendered.
    pub fn new(size: u32) -> Self {
        let size = size.max(1);
        let texels = (size * size) as usize;
        Self {
            size,
            light: Vec3::ZERO,
            view_projections: [Mat4::identity(); 6],
            faces: vec![vec![f32::INFINITY.to_bits(); texels]; 6],
            depth: vec![MAX_DEPTH; texels],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn light(&self) -> Vec3 {
        self.light
    }

    /// Forget every caster.
    pub fn clear(&mut self) {
        for face in &mut self.faces {
            face.fill(f32::INFINITY.to_bits());
        }
    }

    /// Re-render the map for a light at `light`. Each caster is a mesh and
    /// its model matrix. Both faces of every triangle cast.
    pub fn render<'m>(&mut self, light: Vec3, casters: impl IntoIterator<Item = (&'m Mesh, Mat4)>) {
        self.light = light;
        let projection = Mat4::perspective_rh(FRAC_PI_2, 1.0, SHADOW_NEAR, SHADOW_FAR);
        for (vp, (direction, up)) in self.view_projections.iter_mut().zip(FACES) {
            *vp = projection * Mat4::look_at_rh(light, light + direction, up);
        }
        self.clear();

        let casters: Vec<(Vec<Vec3>, &[[u32; 3]])> = casters
            .into_iter()
            .map(|(mesh, model)| {
                let world = mesh
                    .vertices()
                    .iter()
                    .map(|v| model.transform_point(v.position))
                    .collect();
                (world, mesh.indices())
            })
            .collect();

        let clipper = Clipper::new();
        let extent = self.size as f32;
        for (face, vp) in self.faces.iter_mut().zip(self.view_projections) {
            self.depth.fill(MAX_DEPTH);
            let mut fb = FrameBuffer::new(face, &mut self.depth, self.size, self.size);

            for (world, indices) in &casters {
                for &[a, b, c] in indices.iter() {
                    let (Some(&pa), Some(&pb), Some(&pc)) = (
                        world.get(a as usize),
                        world.get(b as usize),
                        world.get(c as usize),
                    ) else {
                        continue;
                    };
                    let vertex = |p: Vec3| ClipVertex {
                        position: vp * Vec4::point(p),
                        varyings: Varyings {
                            world_position: p,
                            ..Default::default()
                        },
                    };
                    let polygon = clipper
                        .clip_polygon(ClipPolygon::from_triangle(vertex(pa), vertex(pb), vertex(pc)));

                    for [v0, v1, v2] in polygon.triangulate() {
                        let screen = [
                            to_screen(v0.position, extent, extent),
                            to_screen(v1.position, extent, extent),
                            to_screen(v2.position, extent, extent),
                        ];
                        let shader = DistanceShader {
                            light,
                            positions: [
                                v0.varyings.world_position,
                                v1.varyings.world_position,
                                v2.varyings.world_position,
                            ],
                        };
                        rasterize_triangle(&screen, &mut fb, &shader, DepthMode::Standard);
                    }
                }
            }
        }
    }

    /// Fraction of the 3x3 texel block around `position` that the light
    /// reaches, from 0 (fully shadowed) to 1.
    pub fn visibility(&self, position: Vec3) -> f32 {
        let offset = position - self.light;
        let distance = offset.length();
        if !distance.is_finite() {
            return 1.0;
        }
        let face = face_of(offset);
        let clip = self.view_projections[face] * Vec4::point(position);
        if clip.w <= 0.0 {
            return 1.0;
        }

        let extent = self.size as f32;
        let screen = to_screen(clip, extent, extent);
        let last = self.size as i64 - 1;
        // Clamp before the cast so the neighbor offsets stay in range
        let cx = screen.x.floor().clamp(0.0, last as f32) as i64;
        let cy = screen.y.floor().clamp(0.0, last as f32) as i64;

        let texels = &self.faces[face];
        let mut lit = 0u32;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let x = (cx + dx).clamp(0, last);
                let y = (cy + dy).clamp(0, last);
                let stored = f32::from_bits(texels[(y * self.size as i64 + x) as usize]);
                if distance <= stored + SHADOW_BIAS {
                    lit += 1;
                }
            }
        }
        lit as f32 / 9.0
    }
}

/// Cube face whose direction is the major axis of `offset`.
fn face_of(offset: Vec3) -> usize {
    let (ax, ay, az) = (offset.x.abs(), offset.y.abs(), offset.z.abs());
    if ax >= ay && ax >= az {
        if offset.x >= 0.0 {
            0
        } else {
            1
        }
    } else if ay >= az {
        if offset.y >= 0.0 {
            2
        } else {
            3
        }
    } else if offset.z >= 0.0 {
        4
    } else {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives;
    use crate::transform::Transform;
    use approx::assert_relative_eq;

    fn occluded_scene() -> ShadowMap {
        // A 10x10 plate halfway between the light and the origin
        let plate = primitives::plane(10.0, 10.0, 1, 1);
        let model = Transform::new()
            .with_position(Vec3::new(0.0, 10.0, 0.0))
            .with_rotation(Vec3::new(FRAC_PI_2, 0.0, 0.0))
            .to_matrix();
        let mut map = ShadowMap::new(64);
        map.render(Vec3::new(0.0, 20.0, 0.0), [(&plate, model)]);
        map
    }

    #[test]
    fn empty_map_lights_everything() {
        let map = ShadowMap::new(16);
        assert_relative_eq!(map.visibility(Vec3::new(3.0, -2.0, 1.0)), 1.0);
    }

    #[test]
    fn caster_shadows_the_point_behind_it() {
        let map = occluded_scene();
        assert_relative_eq!(map.visibility(Vec3::ZERO), 0.0);
        assert_relative_eq!(map.visibility(Vec3::new(1.0, -5.0, -1.0)), 0.0);
    }

    #[test]
    fn points_beside_or_before_the_caster_are_lit() {
        let map = occluded_scene();
        assert_relative_eq!(map.visibility(Vec3::new(40.0, 0.0, 0.0)), 1.0);
        assert_relative_eq!(map.visibility(Vec3::new(0.0, 15.0, 0.0)), 1.0);
        assert_relative_eq!(map.visibility(Vec3::new(0.0, 30.0, 0.0)), 1.0);
    }

    #[test]
    fn edge_of_the_shadow_is_partial() {
        let map = occluded_scene();
        // The plate edge at x = 5 projects to x = 10 at the origin's height
        let v = map.visibility(Vec3::new(10.0, 0.0, 0.0));
        assert!(v > 0.0 && v < 1.0, "visibility {}", v);
    }

    #[test]
    fn faces_follow_the_major_axis() {
        assert_eq!(face_of(Vec3::new(3.0, 1.0, -2.0)), 0);
        assert_eq!(face_of(Vec3::new(-3.0, 1.0, -2.0)), 1);
        assert_eq!(face_of(Vec3::new(0.0, 5.0, 4.9)), 2);
        assert_eq!(face_of(Vec3::new(0.0, -5.0, 4.9)), 3);
        assert_eq!(face_of(Vec3::new(1.0, 1.0, 2.0)), 4);
        assert_eq!(face_of(Vec3::new(1.0, 1.0, -2.0)), 5);
    }

    #[test]
    fn extreme_positions_do_not_panic() {
        let map = occluded_scene();
        for p in [
            Vec3::new(f32::MAX, 0.0, 0.0),
            Vec3::new(1e30, -1e30, 3.0),
            Vec3::new(f32::NAN, 0.0, 0.0),
        ] {
            let v = map.visibility(p);
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
