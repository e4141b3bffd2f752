//! Wavefront OBJ loading for the room's furniture and chess pieces.
//!
//! Models are loaded into [`RawGeometry`] first so their local bounds can be
//! measured for collision and picking before the vertices are uploaded. All
//! shapes inside one OBJ file are merged into a single mesh; the game places
//! whole objects, never sub-parts.

use std::path::Path;

use glam::Vec3;
use thiserror::Error;

use crate::collide::Aabb;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Obj {
        path: String,
        source: tobj::LoadError,
    },
    #[error("{path} contains no geometry")]
    Empty { path: String },
}

/// Geometry on the CPU side, before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    pub vertices: Vec<Vertex3d>,
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Local-space bounding box over all vertices.
    pub fn bounds(&self) -> Aabb {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }
        Aabb::new(min, max)
    }

    /// Computes smooth vertex normals by area-weighted averaging of the
    /// adjacent face normals. Used for OBJ files that ship without normals.
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0, 0.0, 0.0];
        }

        for tri in self.indices.chunks_exact(3) {
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);

            // Unnormalized cross product weights by face area.
            let face_normal = (p1 - p0).cross(p2 - p0);
            for &i in &[i0, i1, i2] {
                self.vertices[i].normal[0] += face_normal.x;
                self.vertices[i].normal[1] += face_normal.y;
                self.vertices[i].normal[2] += face_normal.z;
            }
        }

        for v in &mut self.vertices {
            v.normal = Vec3::from(v.normal).normalize_or_zero().into();
        }
    }

    /// Uploads this geometry to the GPU as a [`Mesh`].
    pub fn upload(&self, gpu: &GpuContext) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices)
    }
}

/// Loads an OBJ file, merging every shape in it into one geometry.
pub fn load_obj(path: impl AsRef<Path>) -> Result<RawGeometry, GeometryError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| GeometryError::Obj {
        path: display.clone(),
        source,
    })?;

    let mut geometry = RawGeometry::default();
    let mut missing_normals = false;

    for model in &models {
        let mesh = &model.mesh;
        let base = geometry.vertices.len() as u32;

        missing_normals |= mesh.normals.is_empty();
        for (i, p) in mesh.positions.chunks_exact(3).enumerate() {
            let normal = if mesh.normals.len() >= (i + 1) * 3 {
                [
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                ]
            } else {
                [0.0, 0.0, 0.0]
            };
            geometry.vertices.push(Vertex3d::new([p[0], p[1], p[2]], normal));
        }
        geometry
            .indices
            .extend(mesh.indices.iter().map(|&i| base + i));
    }

    if geometry.vertices.is_empty() {
        return Err(GeometryError::Empty { path: display });
    }
    if missing_normals {
        geometry.recalculate_normals();
    }
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> RawGeometry {
        RawGeometry::new(
            vec![
                Vertex3d::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
                Vertex3d::new([1.0, 2.0, 3.0], [0.0, 0.0, 0.0]),
                Vertex3d::new([-1.0, -1.0, -1.0], [0.0, 0.0, 0.0]),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let bounds = triangle().bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn recalculated_normals_are_unit_length() {
        let mut geom = RawGeometry::new(
            vec![
                Vertex3d::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
                Vertex3d::new([1.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
                Vertex3d::new([0.0, 0.0, -1.0], [0.0, 0.0, 0.0]),
            ],
            vec![0, 1, 2],
        );
        geom.recalculate_normals();
        for v in &geom.vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            // This face lies in the XZ plane, so the normal points along Y.
            assert!(n.y.abs() > 0.99);
        }
    }

    #[test]
    fn missing_files_are_reported_with_their_path() {
        let err = load_obj("no/such/model.obj").unwrap_err();
        assert!(err.to_string().contains("model.obj"));
    }
}
