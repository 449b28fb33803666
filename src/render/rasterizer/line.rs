//! Bresenham line drawing for wireframe rendering.

use super::{perspective_weights, DepthMode, Fragment, PixelShader, ScreenVertex};
use crate::render::framebuffer::FrameBuffer;

/// Pulls wireframe lines slightly toward the camera so they win against
/// the faces they outline.
pub const WIREFRAME_DEPTH_BIAS: f32 = 1e-5;

/// A line endpoint and the barycentric weights it has in the primitive the
/// shader was built for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineEndpoint {
    pub vertex: ScreenVertex,
    pub weights: [f32; 3],
}

/// Draw a depth-tested line from `a` to `b`, shading every pixel.
///
/// Bresenham's algorithm steps along the major axis and keeps an integer
/// error term that decides when to also step along the minor axis. Depth is
/// interpolated linearly in screen space; weights perspective-correctly.
pub fn draw_line<S: PixelShader>(
    a: &LineEndpoint,
    b: &LineEndpoint,
    buffer: &mut FrameBuffer,
    shader: &S,
    depth_mode: DepthMode,
) {
    let (x0, y0) = (a.vertex.x.floor() as i32, a.vertex.y.floor() as i32);
    let (x1, y1) = (b.vertex.x.floor() as i32, b.vertex.y.floor() as i32);

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let steps = dx.max(dy);

    let x_step = if x0 < x1 { 1 } else { -1 };
    let y_step = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;
    let (mut x, mut y) = (x0, y0);
    let mut step = 0;

    loop {
        let t = if steps == 0 {
            0.0
        } else {
            step as f32 / steps as f32
        };
        plot(a, b, t, x, y, buffer, shader, depth_mode);

        if x == x1 && y == y1 {
            break;
        }
        step += 1;

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += x_step;
        }
        if e2 < dx {
            err += dx;
            y += y_step;
        }
    }
}

#[allow(clippy::too_many_arguments)]
#[inline]
fn plot<S: PixelShader>(
    a: &LineEndpoint,
    b: &LineEndpoint,
    t: f32,
    x: i32,
    y: i32,
    buffer: &mut FrameBuffer,
    shader: &S,
    depth_mode: DepthMode,
) {
    let Some((ab, view_depth)) =
        perspective_weights([1.0 - t, t, 0.0], [a.vertex.inv_w, b.vertex.inv_w, 0.0])
    else {
        return;
    };
    let z = a.vertex.z + (b.vertex.z - a.vertex.z) * t;
    let depth = depth_mode.resolve(z, view_depth) - WIREFRAME_DEPTH_BIAS;
    if !buffer.passes_depth(x, y, depth) {
        return;
    }

    let weights = [
        a.weights[0] * ab[0] + b.weights[0] * ab[1],
        a.weights[1] * ab[0] + b.weights[1] * ab[1],
        a.weights[2] * ab[0] + b.weights[2] * ab[1],
    ];
    let color = shader.shade(&Fragment {
        x,
        y,
        weights,
        neighbors: None,
    });
    buffer.set_pixel_with_depth(x, y, depth, color);
}
