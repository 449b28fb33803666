//! Edge function triangle rasterization.
//!
//! For an edge from A to B the edge function at P is the 2D cross product
//! (B - A) x (P - A):
//!
//! ```text
//! E(P) = (P.x - A.x) * (B.y - A.y) - (P.y - A.y) * (B.x - A.x)
//! ```
//!
//! A pixel is covered when all three edge functions share the sign of the
//! triangle's signed area, and `E_i / area` is the screen-space barycentric
//! weight of vertex `i`. Those weights interpolate window depth directly;
//! every other attribute is interpolated perspective-correctly.
//!
//! Because E is affine in P, the weights one pixel to the right or below
//! differ by constants, which gives the shader its screen-space derivatives
//! for free.
//!
//! Reference: Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)

use super::{perspective_weights, DepthMode, Fragment, PixelShader, ScreenVertex};
use crate::render::framebuffer::FrameBuffer;

/// Signed doubled area of the triangle (a, b, p). Positive when the screen
/// triangle is counter-clockwise in a y-up frame, i.e. front facing.
#[inline]
pub fn edge_function(a: &ScreenVertex, b: &ScreenVertex, p: (f32, f32)) -> f32 {
    (p.0 - a.x) * (b.y - a.y) - (p.1 - a.y) * (b.x - a.x)
}

/// Fill a triangle, depth testing each pixel before shading it.
pub fn rasterize_triangle<S: PixelShader>(
    v: &[ScreenVertex; 3],
    buffer: &mut FrameBuffer,
    shader: &S,
    depth_mode: DepthMode,
) {
    let [v0, v1, v2] = v;

    let area = edge_function(v0, v1, (v2.x, v2.y));
    if area.abs() < f32::EPSILON || !area.is_finite() {
        return;
    }
    let inv_area = 1.0 / area;

    let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i32).max(0);
    let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i32).min(buffer.width() as i32 - 1);
    let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i32).max(0);
    let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i32).min(buffer.height() as i32 - 1);

    let inv_w = [v0.inv_w, v1.inv_w, v2.inv_w];

    // Weight increments per pixel step in x and y
    let step_x = [
        (v2.y - v1.y) * inv_area,
        (v0.y - v2.y) * inv_area,
        (v1.y - v0.y) * inv_area,
    ];
    let step_y = [
        (v1.x - v2.x) * inv_area,
        (v2.x - v0.x) * inv_area,
        (v0.x - v1.x) * inv_area,
    ];

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = (x as f32 + 0.5, y as f32 + 0.5);

            let e0 = edge_function(v1, v2, p);
            let e1 = edge_function(v2, v0, p);
            let e2 = edge_function(v0, v1, p);

            let inside = if area > 0.0 {
                e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0
            } else {
                e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0
            };
            if !inside {
                continue;
            }

            let screen = [e0 * inv_area, e1 * inv_area, e2 * inv_area];
            let Some((weights, view_depth)) = perspective_weights(screen, inv_w) else {
                continue;
            };

            let z = screen[0] * v0.z + screen[1] * v1.z + screen[2] * v2.z;
            let depth = depth_mode.resolve(z, view_depth);
            if !buffer.passes_depth(x, y, depth) {
                continue;
            }

            let right = [screen[0] + step_x[0], screen[1] + step_x[1], screen[2] + step_x[2]];
            let below = [screen[0] + step_y[0], screen[1] + step_y[1], screen[2] + step_y[2]];
            let neighbors = match (
                perspective_weights(right, inv_w),
                perspective_weights(below, inv_w),
            ) {
                (Some((r, _)), Some((b, _))) => Some([r, b]),
                _ => None,
            };

            let color = shader.shade(&Fragment {
                x,
                y,
                weights,
                neighbors,
            });
            buffer.set_pixel_with_depth(x, y, depth, color);
        }
    }
}
