//! Indexed triangle meshes consumed by the vertex stage.
//!
//! Meshes carry per-vertex position, normal, texture coordinate and tangent.
//! Meshes without native texture coordinates are parameterized spherically
//! at shading time (see [`spherical_uv`]).

mod obj;
pub mod primitives;

pub use obj::load_obj;

use std::f32::consts::PI;

use crate::math::{glsl_sign, Vec2, Vec3, Vec4};

/// A single mesh vertex in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    /// Tangent in xyz, bitangent handedness in w. Zero when the mesh has no
    /// tangent data.
    pub tangent: Vec4,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
            tangent: Vec4::default(),
        }
    }
}

/// Where texture coordinates come from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UvSource {
    /// Per-vertex coordinates stored in the mesh.
    Native,
    /// Spherical parameterization about `center` (object space).
    Spherical { center: Vec3 },
}

/// An indexed triangle list.
#[derive(Clone, Debug)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<[u32; 3]>,
    uv_source: UvSource,
    has_tangents: bool,
}

impl Mesh {
    /// Build a mesh with native texture coordinates.
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<[u32; 3]>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
            uv_source: UvSource::Native,
            has_tangents: false,
        }
    }

    pub fn with_uv_source(mut self, uv_source: UvSource) -> Self {
        self.uv_source = uv_source;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn uv_source(&self) -> UvSource {
        self.uv_source
    }

    /// True once [`Mesh::compute_tangents`] has filled the tangent attribute.
    pub fn has_tangents(&self) -> bool {
        self.has_tangents
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            let p = v.position;
            (
                Vec3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Vec3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        }))
    }

    /// Replace vertex normals with area-weighted averages of the adjacent
    /// face normals.
    pub fn compute_vertex_normals(&mut self) {
        let mut accumulated = vec![Vec3::ZERO; self.vertices.len()];
        for &[a, b, c] in &self.indices {
            let (pa, pb, pc) = (
                self.vertices[a as usize].position,
                self.vertices[b as usize].position,
                self.vertices[c as usize].position,
            );
            // Unnormalized cross product weights by triangle area
            let face = (pc - pb).cross(pa - pb);
            for i in [a, b, c] {
                accumulated[i as usize] += face;
            }
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(accumulated) {
            vertex.normal = normal.normalize();
        }
    }

    /// Compute per-vertex tangents from positions and texture coordinates.
    ///
    /// Tangents are accumulated per triangle along the direction of
    /// increasing `u`, Gram-Schmidt orthogonalized against the normal, and
    /// tagged with the bitangent handedness in `w`. Requires native UVs;
    /// spherically mapped meshes are left without tangents.
    pub fn compute_tangents(&mut self) {
        if self.uv_source != UvSource::Native {
            return;
        }

        let mut tan = vec![Vec3::ZERO; self.vertices.len()];
        let mut bitan = vec![Vec3::ZERO; self.vertices.len()];

        for &[a, b, c] in &self.indices {
            let (va, vb, vc) = (
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
            );
            let e1 = vb.position - va.position;
            let e2 = vc.position - va.position;
            let d1 = vb.uv - va.uv;
            let d2 = vc.uv - va.uv;

            let det = d1.x * d2.y - d2.x * d1.y;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let sdir = (e1 * d2.y - e2 * d1.y) * r;
            let tdir = (e2 * d1.x - e1 * d2.x) * r;

            for i in [a, b, c] {
                tan[i as usize] += sdir;
                bitan[i as usize] += tdir;
            }
        }

        for (i, vertex) in self.vertices.iter_mut().enumerate() {
            let n = vertex.normal;
            let t = tan[i];
            let mut tangent = (t - n * n.dot(t)).normalize();
            if tangent == Vec3::ZERO {
                // Degenerate UVs around this vertex; pick any perpendicular
                let helper = if n.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
                tangent = (helper - n * n.dot(helper)).normalize();
            }
            let handedness = if n.cross(t).dot(bitan[i]) < 0.0 { -1.0 } else { 1.0 };
            vertex.tangent = Vec4::new(tangent.x, tangent.y, tangent.z, handedness);
        }

        self.has_tangents = true;
    }
}

/// Spherical texture coordinates of an object-space point about `center`.
///
/// The sphere's polar axis is object-space Y and the seam lies in the
/// -Z half plane:
///
/// ```text
/// x = p.z - c.z,  y = p.x - c.x,  z = p.y - c.y
/// u = sign(y) * acos(x / sqrt(x² + y²)) / 2π + 0.5
/// v = 1 - atan2(sqrt(x² + y²), z) / π
/// ```
///
/// `sign(0)` is 0, so points on the seam plane `y = 0` map to `u = 0.5`.
/// At the poles (`x = y = 0`) the division is 0/0 and `u` is NaN; callers
/// sampling with it get the texel that NaN coordinates resolve to.
pub fn spherical_uv(p: Vec3, center: Vec3) -> Vec2 {
    let x = p.z - center.z;
    let y = p.x - center.x;
    let z = p.y - center.y;
    let radial = (x * x + y * y).sqrt();

    let u = glsl_sign(y) * (x / radial).acos() / (2.0 * PI) + 0.5;
    let v = 1.0 - radial.atan2(z) / PI;
    Vec2::new(u, v)
}
