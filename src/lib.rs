//! A CPU-rendered lab for classic shading techniques.
//!
//! Every pixel is produced on the CPU by a small programmable pipeline:
//! a vertex stage, clipping, edge-function rasterization with a 24-bit
//! depth buffer, and one of three shading strategies (Phong, Flat,
//! Gouraud) sharing a single illumination evaluator. SDL2 is only used to
//! put the finished frame on screen.
//!
//! Six demonstration modes exercise the pipeline: illumination terms,
//! shading strategies side by side, texture/normal/displacement and
//! environment mapping, texture aliasing with mipmaps and supersampling,
//! and depth-buffer conflicts.
//!
//! # Quick Start
//!
//! ```ignore
//! use shadelab::prelude::*;
//!
//! let config = AppConfig::default();
//! let mut engine = Engine::new(800, 600, &config, DemoMode::Illumination);
//! engine.tick();
//! engine.render_frame();
//! let argb = engine.frame_buffer();
//! ```

pub mod assets;
pub mod camera;
pub mod colors;
pub mod config;
pub mod configurator;
pub mod engine;
pub mod error;
pub mod illumination;
pub mod material;
pub mod math;
pub mod mesh;
pub mod render;
pub mod shading;
pub mod supersample;
pub mod texture;
pub mod transform;
pub mod window;

pub use config::AppConfig;
pub use configurator::{ConfigEvent, Configurator, DemoMode};
pub use engine::Engine;
pub use error::{AssetError, ConfigError};
pub use mesh::Mesh;
pub use transform::Transform;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use shadelab::prelude::*;
/// ```
pub mod prelude {
    // Configuration
    pub use crate::config::AppConfig;
    pub use crate::configurator::{ConfigEvent, Configurator, DemoMode, ObjectKind};

    // Engine
    pub use crate::engine::Engine;

    // Materials
    pub use crate::illumination::{IlluminationParams, Term};
    pub use crate::texture::{FilterMode, MipMode};
    pub use crate::material::{Flag, MapKind, MaterialConfig};
    pub use crate::shading::ShadingStrategy;
    pub use crate::supersample::SampleLevel;

    // Scene
    pub use crate::camera::Camera;
    pub use crate::mesh::{primitives, Mesh};
    pub use crate::transform::Transform;

    // Math
    pub use crate::math::{Mat4, Vec2, Vec3, Vec4};

    // Window & Input
    pub use crate::window::{FrameLimiter, Key, Step, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{
        rasterize_triangle, DepthMode, DrawOptions, DrawTransforms, Fragment, FrameBuffer,
        PixelShader, Renderer, ScreenVertex,
    };
    pub use crate::shading::{MapBindings, ShadingContext};
}
