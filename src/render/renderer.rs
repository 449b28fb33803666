//! The renderer owns the color and depth buffers and runs draw calls through
//! the vertex stage, clipper and rasterizer.

use super::clipper::{ClipPolygon, Clipper};
use super::framebuffer::{FrameBuffer, MAX_DEPTH};
use super::rasterizer::{
    draw_line, edge_function, rasterize_triangle, DepthMode, LineEndpoint, ScreenVertex,
};
use crate::colors;
use crate::math::{Mat4, Vec4};
use crate::mesh::Mesh;
use crate::shading::{
    FlatShading, GouraudShading, PhongShading, ShadingContext, ShadingStrategy, StrategyShader,
    VertexOutput, VertexStage,
};
use crate::texture::EnvironmentMap;

/// Matrices of one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTransforms {
    pub model: Mat4,
    pub normal_matrix: Mat4,
    pub view_projection: Mat4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawOptions {
    /// Draw back faces too.
    pub double_sided: bool,
    /// Draw triangle edges instead of filled triangles.
    pub wireframe: bool,
}

pub struct Renderer {
    color_buffer: Vec<u32>,
    depth_buffer: Vec<u32>,
    width: u32,
    height: u32,
    clipper: Clipper,
    depth_mode: DepthMode,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            color_buffer: vec![colors::BACKGROUND; size],
            depth_buffer: vec![MAX_DEPTH; size],
            width,
            height,
            clipper: Clipper::new(),
            depth_mode: DepthMode::Standard,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width * height) as usize;
        self.color_buffer = vec![colors::BACKGROUND; size];
        self.depth_buffer = vec![MAX_DEPTH; size];
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth_mode(&self) -> DepthMode {
        self.depth_mode
    }

    pub fn set_depth_mode(&mut self, mode: DepthMode) {
        self.depth_mode = mode;
    }

    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
    }

    pub fn clear_depth(&mut self) {
        self.depth_buffer.fill(MAX_DEPTH);
    }

    pub fn color_buffer(&self) -> &[u32] {
        &self.color_buffer
    }

    pub fn color_buffer_mut(&mut self) -> &mut [u32] {
        &mut self.color_buffer
    }

    /// ARGB8888 pixels as bytes, for streaming to a texture.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.color_buffer)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.color_buffer[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    pub fn as_framebuffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(
            &mut self.color_buffer,
            &mut self.depth_buffer,
            self.width,
            self.height,
        )
    }

    /// Fill the color buffer with the environment seen through each pixel
    /// center. `view_projection` must be the matrix used for the geometry.
    pub fn draw_skybox(&mut self, env: &EnvironmentMap, view_projection: &Mat4) {
        let Some(inverse) = view_projection.inverse() else {
            log::warn!("view-projection matrix is singular, skipping skybox");
            return;
        };
        let (w, h) = (self.width as f32, self.height as f32);
        let unproject = |x: f32, y: f32, z: f32| {
            let p = inverse * Vec4::new(x, y, z, 1.0);
            p.xyz() * (1.0 / p.w)
        };

        for y in 0..self.height {
            let ndc_y = 1.0 - 2.0 * (y as f32 + 0.5) / h;
            for x in 0..self.width {
                let ndc_x = 2.0 * (x as f32 + 0.5) / w - 1.0;
                let direction = unproject(ndc_x, ndc_y, 1.0) - unproject(ndc_x, ndc_y, -1.0);
                self.color_buffer[(y * self.width + x) as usize] = env.sample(direction).to_argb();
            }
        }
    }

    /// Draw `mesh` with the shading strategy of `ctx.material`.
    ///
    /// The strategy is resolved once here; the triangle loop is
    /// monomorphized per strategy.
    pub fn draw_mesh(
        &mut self,
        mesh: &Mesh,
        ctx: ShadingContext<'_>,
        transforms: &DrawTransforms,
        options: DrawOptions,
    ) {
        let stage = VertexStage::new(
            ctx,
            transforms.model,
            transforms.normal_matrix,
            transforms.view_projection,
        );
        let outputs: Vec<VertexOutput> = mesh.vertices().iter().map(|v| stage.run(v)).collect();

        match ctx.material.strategy {
            ShadingStrategy::Phong => {
                self.draw_triangles::<PhongShading>(ctx, mesh.indices(), &outputs, options)
            }
            ShadingStrategy::Flat => {
                self.draw_triangles::<FlatShading>(ctx, mesh.indices(), &outputs, options)
            }
            ShadingStrategy::Gouraud => {
                self.draw_triangles::<GouraudShading>(ctx, mesh.indices(), &outputs, options)
            }
        }
    }

    fn draw_triangles<'c, S: StrategyShader<'c>>(
        &mut self,
        ctx: ShadingContext<'c>,
        indices: &[[u32; 3]],
        outputs: &[VertexOutput],
        options: DrawOptions,
    ) {
        let (width, height) = (self.width as f32, self.height as f32);
        let clipper = self.clipper;
        let depth_mode = self.depth_mode;
        let mut fb = self.as_framebuffer();

        for &[a, b, c] in indices {
            let (Some(va), Some(vb), Some(vc)) = (
                outputs.get(a as usize),
                outputs.get(b as usize),
                outputs.get(c as usize),
            ) else {
                continue;
            };

            // The last vertex provokes the flat attributes, for every
            // sub-triangle the clipper produces
            let flat = vc.flat;
            let polygon = clipper.clip_polygon(ClipPolygon::from_triangle(va.clip, vb.clip, vc.clip));
            if polygon.is_empty() {
                continue;
            }

            if options.wireframe {
                let n = polygon.vertices.len();
                for i in 0..n {
                    let (p, q) = (&polygon.vertices[i], &polygon.vertices[(i + 1) % n]);
                    let shader = S::new(ctx, [p.varyings, q.varyings, q.varyings], flat);
                    draw_line(
                        &LineEndpoint {
                            vertex: to_screen(p.position, width, height),
                            weights: [1.0, 0.0, 0.0],
                        },
                        &LineEndpoint {
                            vertex: to_screen(q.position, width, height),
                            weights: [0.0, 1.0, 0.0],
                        },
                        &mut fb,
                        &shader,
                        depth_mode,
                    );
                }
                continue;
            }

            for [v0, v1, v2] in polygon.triangulate() {
                let screen = [
                    to_screen(v0.position, width, height),
                    to_screen(v1.position, width, height),
                    to_screen(v2.position, width, height),
                ];
                let area = edge_function(&screen[0], &screen[1], (screen[2].x, screen[2].y));
                if !options.double_sided && area <= 0.0 {
                    continue;
                }
                let shader = S::new(ctx, [v0.varyings, v1.varyings, v2.varyings], flat);
                rasterize_triangle(&screen, &mut fb, &shader, depth_mode);
            }
        }
    }
}

/// Perspective divide and viewport mapping. Window depth maps the clip
/// range [-1, 1] to [0, 1].
pub(crate) fn to_screen(clip: Vec4, width: f32, height: f32) -> ScreenVertex {
    let inv_w = 1.0 / clip.w;
    ScreenVertex::new(
        (clip.x * inv_w + 1.0) * 0.5 * width,
        (1.0 - clip.y * inv_w) * 0.5 * height,
        clip.z * inv_w * 0.5 + 0.5,
        inv_w,
    )
}
