use std::path::Path;

use super::{Mesh, UvSource, Vertex};
use crate::error::AssetError;
use crate::math::{Vec2, Vec3};

/// Import the first model of an OBJ file as a welded, smooth-shaded mesh.
///
/// Faces are triangulated and vertices are shared by position, file normals
/// are discarded and recomputed from the welded geometry. Imported meshes are
/// textured through the spherical parameterization about their bounding box
/// center and carry no tangents.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Mesh, AssetError> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: false,
            ..Default::default()
        },
    )
    .map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let model = models
        .into_iter()
        .find(|m| !m.mesh.indices.is_empty())
        .ok_or_else(|| AssetError::EmptyMesh(path.to_path_buf()))?;

    let vertices: Vec<Vertex> = model
        .mesh
        .positions
        .chunks_exact(3)
        .map(|p| Vertex::new(Vec3::new(p[0], p[1], p[2]), Vec3::ZERO, Vec2::ZERO))
        .collect();
    let vertex_count = vertices.len() as u32;

    let indices: Vec<[u32; 3]> = model
        .mesh
        .indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .filter(|t| t.iter().all(|&i| i < vertex_count))
        .collect();
    if indices.is_empty() {
        return Err(AssetError::EmptyMesh(path.to_path_buf()));
    }

    let name = if model.name.is_empty() {
        "imported".to_string()
    } else {
        model.name
    };

    let mut mesh = Mesh::new(name, vertices, indices);
    // Project about the bounding-box center so any imported mesh gets a
    // full wrap.
    let center = mesh
        .bounds()
        .map(|(lo, hi)| (lo + hi) * 0.5)
        .unwrap_or(Vec3::ZERO);
    mesh = mesh.with_uv_source(UvSource::Spherical { center });
    mesh.compute_vertex_normals();

    log::info!(
        "Imported {} ({} vertices, {} triangles)",
        path.display(),
        mesh.vertices().len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}
