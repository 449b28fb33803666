//! Cube environment maps.
//!
//! Faces are stored in the order +X, -X, +Y, -Y, +Z, -Z and addressed with
//! the usual cube-map face selection rules. Environment images are authored
//! for a left-handed cube, so lookups mirror the X component of the
//! direction first.

use std::path::Path;

use super::{Texture, WrapMode};
use crate::colors::Color;
use crate::error::AssetError;
use crate::math::{Vec2, Vec3};

/// File stems of the six faces, in storage order.
pub const FACE_NAMES: [&str; 6] = ["posx", "negx", "posy", "negy", "posz", "negz"];

const FACE_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    faces: [Texture; 6],
}

impl EnvironmentMap {
    pub fn new(faces: [Texture; 6]) -> Self {
        Self {
            faces: faces.map(|f| f.with_wrap(WrapMode::ClampToEdge)),
        }
    }

    /// Load `posx`, `negx`, `posy`, `negy`, `posz` and `negz` images from a
    /// directory, trying the jpg, png and jpeg extensions in turn.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        let load = |stem: &str| -> Result<Texture, AssetError> {
            let path = FACE_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{stem}.{ext}")))
                .find(|p| p.exists())
                .unwrap_or_else(|| dir.join(format!("{stem}.jpg")));
            Texture::from_file(path)
        };

        Ok(Self::new([
            load(FACE_NAMES[0])?,
            load(FACE_NAMES[1])?,
            load(FACE_NAMES[2])?,
            load(FACE_NAMES[3])?,
            load(FACE_NAMES[4])?,
            load(FACE_NAMES[5])?,
        ]))
    }

    /// Bilinear lookup along a world-space direction.
    ///
    /// A zero or non-finite direction has no face and reads as black.
    pub fn sample(&self, direction: Vec3) -> Color {
        let d = Vec3::new(-direction.x, direction.y, direction.z);
        if !d.is_finite() || d == Vec3::ZERO {
            return Color::BLACK;
        }
        let (face, st) = select_face(d);
        // Faces are stored top row first with t growing downward
        self.faces[face].sample_bilinear(Vec2::new(st.x, 1.0 - st.y))
    }
}

/// Environment color along `direction`; an absent map is a black cube.
pub fn sample_or_black(env: Option<&EnvironmentMap>, direction: Vec3) -> Color {
    env.map_or(Color::BLACK, |e| e.sample(direction))
}

/// Face index and (s, t) in [0, 1] for a non-zero direction.
fn select_face(d: Vec3) -> (usize, Vec2) {
    let (ax, ay, az) = (d.x.abs(), d.y.abs(), d.z.abs());
    let (face, sc, tc, ma) = if ax >= ay && ax >= az {
        if d.x > 0.0 {
            (0, -d.z, -d.y, ax)
        } else {
            (1, d.z, -d.y, ax)
        }
    } else if ay >= az {
        if d.y > 0.0 {
            (2, d.x, d.z, ay)
        } else {
            (3, d.x, -d.z, ay)
        }
    } else if d.z > 0.0 {
        (4, d.x, -d.y, az)
    } else {
        (5, -d.x, -d.y, az)
    };
    (face, Vec2::new((sc / ma + 1.0) * 0.5, (tc / ma + 1.0) * 0.5))
}

/// Direction through the (s, t) point of a face; inverse of the face
/// selection above, before the X mirror.
pub(crate) fn face_direction(face: usize, s: f32, t: f32) -> Vec3 {
    let (sc, tc) = (2.0 * s - 1.0, 2.0 * t - 1.0);
    match face {
        0 => Vec3::new(1.0, -tc, -sc),
        1 => Vec3::new(-1.0, -tc, sc),
        2 => Vec3::new(sc, 1.0, tc),
        3 => Vec3::new(sc, -1.0, -tc),
        4 => Vec3::new(sc, -tc, 1.0),
        _ => Vec3::new(-sc, -tc, -1.0),
    }
}
