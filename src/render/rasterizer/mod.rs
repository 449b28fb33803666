//! Triangle and line rasterization.
//!
//! The rasterizer owns coverage, depth and interpolation weights; color is
//! delegated to a [`PixelShader`], the way a GPU separates fixed-function
//! rasterization from programmable fragment shading.

mod edgefunction;
mod line;

pub use edgefunction::{edge_function, rasterize_triangle};
pub use line::{draw_line, LineEndpoint, WIREFRAME_DEPTH_BIAS};

/// A vertex after perspective divide and viewport mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    /// Pixel coordinates, origin top-left.
    pub x: f32,
    pub y: f32,
    /// Window depth in [0, 1], 0 at the near plane.
    pub z: f32,
    /// Reciprocal of clip-space w.
    pub inv_w: f32,
}

impl ScreenVertex {
    pub fn new(x: f32, y: f32, z: f32, inv_w: f32) -> Self {
        Self { x, y, z, inv_w }
    }
}

/// One covered pixel.
///
/// `weights` are perspective-correct barycentric weights of the primitive's
/// vertices at the pixel center. `neighbors` holds the same weights at
/// `(x + 1, y)` and `(x, y + 1)` so shaders can take screen-space
/// derivatives; lines do not provide them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub y: i32,
    pub weights: [f32; 3],
    pub neighbors: Option<[[f32; 3]; 2]>,
}

/// Per-pixel color computation.
///
/// The rasterizer calls `shade` for every fragment that passes the depth
/// test and writes the returned ARGB color.
pub trait PixelShader {
    fn shade(&self, fragment: &Fragment) -> u32;
}

/// How window depth is turned into the stored depth value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DepthMode {
    /// Window depth of the perspective projection, interpolated linearly in
    /// screen space.
    #[default]
    Standard,
    /// `log2(1 + w) / log2(1 + far)` of the interpolated view depth, which
    /// spreads precision evenly over distance.
    Logarithmic { far: f32 },
}

impl DepthMode {
    /// Stored depth for a fragment with screen-interpolated window depth `z`
    /// and view depth `w`.
    #[inline]
    pub fn resolve(self, z: f32, w: f32) -> f32 {
        match self {
            DepthMode::Standard => z,
            DepthMode::Logarithmic { far } => (1.0 + w).log2() / (1.0 + far).log2(),
        }
    }
}

/// Perspective-correct weights from screen-space weights. Returns the
/// weights and the interpolated view depth `w`.
#[inline]
pub(crate) fn perspective_weights(screen: [f32; 3], inv_w: [f32; 3]) -> Option<([f32; 3], f32)> {
    let q = [screen[0] * inv_w[0], screen[1] * inv_w[1], screen[2] * inv_w[2]];
    let sum = q[0] + q[1] + q[2];
    if sum.abs() < f32::MIN_POSITIVE || !sum.is_finite() {
        return None;
    }
    let inv = 1.0 / sum;
    Some(([q[0] * inv, q[1] * inv, q[2] * inv], inv))
}
