//! Software rasterization pipeline: clipping, rasterization and the frame
//! buffer, driven by a [`Renderer`], plus the light's [`ShadowMap`].

pub mod clipper;
pub mod framebuffer;
pub mod rasterizer;
pub mod renderer;
pub mod shadow;

pub use clipper::{ClipPlane, ClipPolygon, Clipper};
pub use framebuffer::{quantize_depth, FrameBuffer, MAX_DEPTH};
pub use rasterizer::{
    draw_line, edge_function, rasterize_triangle, DepthMode, Fragment, LineEndpoint, PixelShader,
    ScreenVertex,
};
pub use renderer::{DrawOptions, DrawTransforms, Renderer};
pub use shadow::{ShadowMap, SHADOW_MAP_SIZE};
