//! Error types for the fallible glue around the renderer.
//!
//! The shading core never fails; these cover asset I/O and configuration.

use std::path::PathBuf;

/// Failures while loading textures, environment maps, mip chains or meshes.
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to import OBJ {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ {0} contains no triangles")]
    EmptyMesh(PathBuf),

    #[error("invalid mip chain: {0}")]
    InvalidMipChain(String),

    #[error("unknown built-in asset '{0}'")]
    UnknownBuiltin(String),

    #[error("asset loader thread is no longer running")]
    LoaderGone,
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unknown demonstration mode name
    #[error("Unknown mode: {0}")]
    UnknownMode(String),
}
