//! Parametric meshes: UV sphere, subdivided plane, subdivided box and
//! torus knot.
//!
//! Vertex layout, texture coordinates and winding (counter-clockwise when
//! seen from the front) follow the common WebGL-era geometry generators, so
//! texture seams and pole fans land where scene authors expect them.

use std::f32::consts::PI;

use super::{Mesh, Vertex};
use crate::math::{Vec2, Vec3};

/// UV sphere centered at the origin.
///
/// `width_segments` is clamped to at least 3 and `height_segments` to at
/// least 2. Pole rows get their `u` shifted by half a segment so each pole
/// triangle samples the middle of its column.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
    let mut grid = Vec::with_capacity((hs + 1) as usize);

    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        let u_offset = if iy == 0 {
            0.5 / ws as f32
        } else if iy == hs {
            -0.5 / ws as f32
        } else {
            0.0
        };

        let mut row = Vec::with_capacity((ws + 1) as usize);
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let (sin_phi, cos_phi) = (u * 2.0 * PI).sin_cos();
            let (sin_theta, cos_theta) = (v * PI).sin_cos();

            let position = Vec3::new(
                -radius * cos_phi * sin_theta,
                radius * cos_theta,
                radius * sin_phi * sin_theta,
            );
            row.push(vertices.len() as u32);
            vertices.push(Vertex::new(
                position,
                position.normalize(),
                Vec2::new(u + u_offset, 1.0 - v),
            ));
        }
        grid.push(row);
    }

    let mut indices = Vec::new();
    for iy in 0..hs as usize {
        for ix in 0..ws as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];

            // Pole rows collapse to single triangles
            if iy != 0 {
                indices.push([a, b, d]);
            }
            if iy != hs as usize - 1 {
                indices.push([b, c, d]);
            }
        }
    }

    Mesh::new("sphere", vertices, indices)
}

/// Plane in the XY plane facing +Z, centered at the origin.
pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    build_face(
        &mut vertices,
        &mut indices,
        FaceAxes { u: 0, v: 1, w: 2, u_dir: 1.0, v_dir: -1.0 },
        [width, height, 0.0],
        [width_segments, height_segments],
    );
    // The XY plane's normal is +Z regardless of the zero depth passed above
    for v in &mut vertices {
        v.normal = Vec3::Z;
    }
    Mesh::new("plane", vertices, indices)
}

/// Axis-aligned box centered at the origin with per-face texture coordinates.
pub fn cuboid(width: f32, height: f32, depth: f32, segments: [u32; 3]) -> Mesh {
    let [ws, hs, ds] = segments;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Face order: +X, -X, +Y, -Y, +Z, -Z
    let faces = [
        (FaceAxes { u: 2, v: 1, w: 0, u_dir: -1.0, v_dir: -1.0 }, [depth, height, width], [ds, hs]),
        (FaceAxes { u: 2, v: 1, w: 0, u_dir: 1.0, v_dir: -1.0 }, [depth, height, -width], [ds, hs]),
        (FaceAxes { u: 0, v: 2, w: 1, u_dir: 1.0, v_dir: 1.0 }, [width, depth, height], [ws, ds]),
        (FaceAxes { u: 0, v: 2, w: 1, u_dir: 1.0, v_dir: -1.0 }, [width, depth, -height], [ws, ds]),
        (FaceAxes { u: 0, v: 1, w: 2, u_dir: 1.0, v_dir: -1.0 }, [width, height, depth], [ws, hs]),
        (FaceAxes { u: 0, v: 1, w: 2, u_dir: -1.0, v_dir: -1.0 }, [width, height, -depth], [ws, hs]),
    ];
    for (axes, size, grid) in faces {
        build_face(&mut vertices, &mut indices, axes, size, grid);
    }

    Mesh::new("box", vertices, indices)
}

/// Tube swept along a `(p, q)` torus knot lying around the Z axis.
///
/// `radius` is the size of the underlying torus, `tube` the thickness.
/// The path winds `p` times around the axis and `q` times through the hole.
/// Segments are clamped to at least 3 along the path and 2 around the tube.
pub fn torus_knot(radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32, p: u32, q: u32) -> Mesh {
    let ts = tubular_segments.max(3);
    let rs = radial_segments.max(2);
    let (p, q) = (p.max(1) as f32, q.max(1) as f32);

    let curve = |u: f32| {
        let (su, cu) = u.sin_cos();
        let (sq, cq) = (q / p * u).sin_cos();
        Vec3::new(
            radius * (2.0 + cq) * 0.5 * cu,
            radius * (2.0 + cq) * 0.5 * su,
            radius * sq * 0.5,
        )
    };

    let mut vertices = Vec::with_capacity(((ts + 1) * (rs + 1)) as usize);
    for i in 0..=ts {
        let u = i as f32 / ts as f32 * p * 2.0 * PI;
        let here = curve(u);
        let ahead = curve(u + 0.01);

        // Frame from the finite-difference tangent and the outward direction
        let tangent = ahead - here;
        let bitangent = tangent.cross(ahead + here);
        let normal = bitangent.cross(tangent).normalize();
        let bitangent = bitangent.normalize();

        for j in 0..=rs {
            let v = j as f32 / rs as f32 * 2.0 * PI;
            let (sv, cv) = v.sin_cos();
            let position = here + normal * (-tube * cv) + bitangent * (tube * sv);
            vertices.push(Vertex::new(
                position,
                (position - here).normalize(),
                Vec2::new(i as f32 / ts as f32, j as f32 / rs as f32),
            ));
        }
    }

    let row = rs + 1;
    let mut indices = Vec::with_capacity((ts * rs * 2) as usize);
    for j in 1..=ts {
        for i in 1..=rs {
            let a = row * (j - 1) + (i - 1);
            let b = row * j + (i - 1);
            let c = row * j + i;
            let d = row * (j - 1) + i;
            indices.push([a, b, d]);
            indices.push([b, c, d]);
        }
    }

    Mesh::new("torus-knot", vertices, indices)
}

/// Which vector components the face's grid axes and normal map to.
#[derive(Clone, Copy)]
struct FaceAxes {
    u: usize,
    v: usize,
    w: usize,
    u_dir: f32,
    v_dir: f32,
}

/// Append one subdivided rectangular face. `size` is `[width, height, depth]`
/// in face space; the sign of `depth` selects which side the face sits on
/// and which way its normal points.
fn build_face(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<[u32; 3]>,
    axes: FaceAxes,
    size: [f32; 3],
    grid: [u32; 2],
) {
    let [width, height, depth] = size;
    let grid_x = grid[0].max(1);
    let grid_y = grid[1].max(1);
    let segment_width = width / grid_x as f32;
    let segment_height = height / grid_y as f32;
    let base = vertices.len() as u32;

    for iy in 0..=grid_y {
        let y = iy as f32 * segment_height - height / 2.0;
        for ix in 0..=grid_x {
            let x = ix as f32 * segment_width - width / 2.0;

            let mut position = Vec3::ZERO;
            position.set_axis(axes.u, x * axes.u_dir);
            position.set_axis(axes.v, y * axes.v_dir);
            position.set_axis(axes.w, depth / 2.0);

            let mut normal = Vec3::ZERO;
            normal.set_axis(axes.w, if depth > 0.0 { 1.0 } else { -1.0 });

            vertices.push(Vertex::new(
                position,
                normal,
                Vec2::new(ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32),
            ));
        }
    }

    let row = grid_x + 1;
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = base + ix + row * iy;
            let b = base + ix + row * (iy + 1);
            let c = base + (ix + 1) + row * (iy + 1);
            let d = base + (ix + 1) + row * iy;
            indices.push([a, b, d]);
            indices.push([b, c, d]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn face_normal(mesh: &Mesh, tri: [u32; 3]) -> Vec3 {
        let p = |i: u32| mesh.vertices()[i as usize].position;
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0])).normalize()
    }

    #[test]
    fn sphere_counts() {
        let mesh = sphere(10.0, 96, 48);
        assert_eq!(mesh.vertices().len(), 97 * 49);
        // Two triangles per quad minus one per pole quad
        assert_eq!(mesh.triangle_count(), 96 * 48 * 2 - 2 * 96);
    }

    #[test]
    fn sphere_segments_are_clamped() {
        let mesh = sphere(10.0, 1, 0);
        assert_eq!(mesh.vertices().len(), 4 * 3);
    }

    #[test]
    fn sphere_triangles_face_outward() {
        let mesh = sphere(6.0, 20, 10);
        for &tri in mesh.indices() {
            let centroid = tri
                .iter()
                .fold(Vec3::ZERO, |acc, &i| acc + mesh.vertices()[i as usize].position)
                / 3.0;
            assert!(face_normal(&mesh, tri).dot(centroid) > 0.0);
        }
    }

    #[test]
    fn plane_is_counter_clockwise_toward_plus_z() {
        let mesh = plane(30.0, 30.0, 1, 1);
        assert_eq!(mesh.triangle_count(), 2);
        for &tri in mesh.indices() {
            assert_relative_eq!(face_normal(&mesh, tri).z, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn box_faces_agree_with_vertex_normals() {
        let mesh = cuboid(15.0, 15.0, 15.0, [2, 2, 2]);
        assert_eq!(mesh.triangle_count(), 6 * 2 * 2 * 2);
        for &tri in mesh.indices() {
            let n = mesh.vertices()[tri[0] as usize].normal;
            assert_relative_eq!(face_normal(&mesh, tri).dot(n), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn torus_knot_counts_and_extent() {
        let mesh = torus_knot(6.0, 2.0, 64, 16, 2, 3);
        assert_eq!(mesh.vertices().len(), 65 * 17);
        assert_eq!(mesh.triangle_count(), 64 * 16 * 2);
        for v in mesh.vertices() {
            // Torus of radius 6 reaches 9 from the axis, plus the tube
            assert!(v.position.length() <= 11.0 + 1e-3);
            assert!(v.position.z.abs() <= 5.0 + 1e-3);
            assert_relative_eq!(v.normal.length(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn torus_knot_winds_outward() {
        let mesh = torus_knot(6.0, 2.0, 64, 16, 2, 3);
        for &tri in mesh.indices() {
            let n = mesh.vertices()[tri[0] as usize].normal;
            assert!(face_normal(&mesh, tri).dot(n) > 0.5);
        }
    }

    #[test]
    fn torus_knot_segments_are_clamped() {
        let mesh = torus_knot(6.0, 2.0, 0, 0, 2, 3);
        assert_eq!(mesh.vertices().len(), 4 * 3);
        assert_eq!(mesh.triangle_count(), 3 * 2 * 2);
    }
}
