//! Clip-space clipping against the homogeneous clip cube.
//!
//! Clipping happens after projection and before the perspective divide,
//! against the fixed planes
//!
//! ```text
//! -w <= x <= w
//! -w <= y <= w
//! -w <= z <= w
//! ```
//!
//! Vertices created on a plane interpolate every varying linearly in clip
//! space, which is exact for attributes that are later interpolated
//! perspective-correctly.

use crate::shading::ClipVertex;

/// The six planes of the clip cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipPlane {
    Left,
    Right,
    Bottom,
    Top,
    Near,
    Far,
}

impl ClipPlane {
    pub const ALL: [ClipPlane; 6] = [
        ClipPlane::Left,
        ClipPlane::Right,
        ClipPlane::Bottom,
        ClipPlane::Top,
        ClipPlane::Near,
        ClipPlane::Far,
    ];

    /// Signed distance to the plane, positive inside the clip volume.
    pub fn signed_distance(&self, v: &ClipVertex) -> f32 {
        let p = v.position;
        match self {
            Self::Left => p.w + p.x,
            Self::Right => p.w - p.x,
            Self::Bottom => p.w + p.y,
            Self::Top => p.w - p.y,
            Self::Near => p.w + p.z,
            Self::Far => p.w - p.z,
        }
    }
}

/// A convex polygon in clip space.
#[derive(Debug, Clone, Default)]
pub struct ClipPolygon {
    pub vertices: Vec<ClipVertex>,
}

impl ClipPolygon {
    pub fn from_triangle(v0: ClipVertex, v1: ClipVertex, v2: ClipVertex) -> Self {
        Self {
            vertices: vec![v0, v1, v2],
        }
    }

    /// Fewer than three vertices left: nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Whether every vertex is inside `plane`.
    fn inside(&self, plane: ClipPlane) -> bool {
        self.vertices.iter().all(|v| plane.signed_distance(v) >= 0.0)
    }

    /// One Sutherland-Hodgman pass against a single plane.
    pub fn clip_against_plane(&self, plane: ClipPlane) -> Self {
        if self.is_empty() {
            return Self::default();
        }

        let n = self.vertices.len();
        let mut output = Vec::with_capacity(n + 1);

        for i in 0..n {
            let current = &self.vertices[i];
            let next = &self.vertices[(i + 1) % n];

            let d1 = plane.signed_distance(current);
            let d2 = plane.signed_distance(next);

            if d1 >= 0.0 {
                output.push(*current);
                if d2 < 0.0 {
                    output.push(current.lerp(next, d1 / (d1 - d2)));
                }
            } else if d2 >= 0.0 {
                output.push(current.lerp(next, d1 / (d1 - d2)));
            }
        }

        Self { vertices: output }
    }

    /// Fan triangulation; valid because clipped polygons stay convex.
    pub fn triangulate(&self) -> impl Iterator<Item = [&ClipVertex; 3]> {
        (1..self.vertices.len().saturating_sub(1))
            .map(move |i| [&self.vertices[0], &self.vertices[i], &self.vertices[i + 1]])
    }
}

/// Clips polygons against all six planes of the clip cube.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clipper;

impl Clipper {
    pub fn new() -> Self {
        Self
    }

    /// Clip `polygon`. Polygons fully inside are returned unchanged.
    pub fn clip_polygon(&self, polygon: ClipPolygon) -> ClipPolygon {
        let mut result = polygon;
        for plane in ClipPlane::ALL {
            if result.is_empty() {
                break;
            }
            if !result.inside(plane) {
                result = result.clip_against_plane(plane);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vec2, Vec4};
    use crate::shading::Varyings;
    use approx::assert_relative_eq;

    fn vertex(x: f32, y: f32, z: f32, u: f32) -> ClipVertex {
        ClipVertex {
            position: Vec4::new(x, y, z, 1.0),
            varyings: Varyings {
                uv: Vec2::new(u, 0.0),
                ..Default::default()
            },
        }
    }

    #[test]
    fn inside_triangle_is_untouched() {
        let poly = ClipPolygon::from_triangle(
            vertex(-0.5, -0.5, 0.0, 0.0),
            vertex(0.5, -0.5, 0.0, 1.0),
            vertex(0.0, 0.5, 0.0, 0.5),
        );
        let clipped = Clipper::new().clip_polygon(poly.clone());
        assert_eq!(clipped.vertices, poly.vertices);
        assert_eq!(clipped.triangulate().count(), 1);
    }

    #[test]
    fn outside_triangle_is_removed() {
        let poly = ClipPolygon::from_triangle(
            vertex(2.0, 2.0, 0.0, 0.0),
            vertex(3.0, 2.0, 0.0, 1.0),
            vertex(2.5, 3.0, 0.0, 0.5),
        );
        assert!(Clipper::new().clip_polygon(poly).is_empty());
    }

    #[test]
    fn crossing_edge_interpolates_varyings() {
        let poly = ClipPolygon::from_triangle(
            vertex(0.0, -0.5, 0.0, 0.0),
            vertex(2.0, -0.5, 0.0, 1.0),
            vertex(0.0, 0.5, 0.0, 0.0),
        );
        let clipped = poly.clip_against_plane(ClipPlane::Right);
        assert_eq!(clipped.vertices.len(), 4);
        let on_plane = clipped.vertices.iter().find(|v| v.position.y == -0.5 && v.position.x > 0.0);
        let on_plane = on_plane.map(|v| (v.position.x, v.varyings.uv.x));
        let (x, u) = on_plane.unwrap_or_default();
        assert_relative_eq!(x, 1.0);
        assert_relative_eq!(u, 0.5);
        assert_eq!(clipped.triangulate().count(), 2);
    }
}
