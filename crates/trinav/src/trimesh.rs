//! The triangle soup a [`NavmeshGraph`](crate::NavmeshGraph) is built from.

use glam::{UVec3, Vec3A};
use thiserror::Error;

use crate::math::Aabb3d;

/// A mesh used as input for [`NavmeshGraph`](crate::NavmeshGraph) construction.
///
/// Vertices may be duplicated: triangles that share a position but not an index are still
/// connected once the graph deduplicates them.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TriMesh {
    /// The vertices composing the mesh.
    /// Follows the convention of a triangle list.
    pub vertices: Vec<Vec3A>,

    /// The indices composing the mesh.
    /// Follows the convention of a triangle list.
    pub indices: Vec<UVec3>,

    /// Named ranges of [`TriMesh::indices`]. Every triangle should belong to exactly one part.
    pub parts: Vec<MeshPart>,
}

/// A contiguous range of triangles in a [`TriMesh`], e.g. one object of a scene.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshPart {
    /// Human readable name, not required to be unique.
    pub name: String,
    /// Index of the first triangle of this part in [`TriMesh::indices`].
    pub offset: usize,
    /// Number of triangles in this part.
    pub size: usize,
}

impl MeshPart {
    /// The range of [`TriMesh::indices`] covered by this part.
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.size
    }
}

/// Errors that can occur when validating a [`TriMesh`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TriMeshError {
    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references vertex {index}, but the mesh only has {vertex_count} vertices")]
    IndexOutOfBounds {
        /// Index of the offending triangle
        triangle: usize,
        /// The referenced vertex index
        index: u32,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },
    /// A mesh part covers triangles that do not exist.
    #[error("mesh part {part} covers triangles {start}..{end}, but the mesh only has {triangle_count} triangles")]
    PartOutOfBounds {
        /// Index of the offending part
        part: usize,
        /// First triangle covered by the part
        start: usize,
        /// One past the last triangle covered by the part
        end: usize,
        /// Number of triangles in the mesh
        triangle_count: usize,
    },
    /// Two mesh parts cover the same triangle.
    #[error("mesh parts {first} and {second} overlap")]
    OverlappingParts {
        /// The earlier part
        first: usize,
        /// The later part
        second: usize,
    },
    /// The mesh would contain more vertices than can be addressed by `u32` indices.
    #[error("a mesh cannot hold more than 2^32 vertices")]
    TooManyVertices,
}

impl TriMesh {
    /// Creates a mesh with a single part covering all triangles.
    pub fn from_triangles(vertices: Vec<Vec3A>, indices: Vec<UVec3>) -> Self {
        let parts = vec![MeshPart {
            name: String::new(),
            offset: 0,
            size: indices.len(),
        }];
        Self {
            vertices,
            indices,
            parts,
        }
    }

    /// Appends another mesh as a new part named `name`.
    /// The indices are offset by the number of vertices already in `self`.
    pub fn push_part(
        &mut self,
        name: impl Into<String>,
        vertices: impl IntoIterator<Item = Vec3A>,
        indices: impl IntoIterator<Item = UVec3>,
    ) -> Result<(), TriMeshError> {
        let next_vertex_index =
            u32::try_from(self.vertices.len()).map_err(|_| TriMeshError::TooManyVertices)?;
        self.vertices.extend(vertices);
        if self.vertices.len() > u32::MAX as usize {
            return Err(TriMeshError::TooManyVertices);
        }
        let offset = self.indices.len();
        self.indices
            .extend(indices.into_iter().map(|i| i + next_vertex_index));
        self.parts.push(MeshPart {
            name: name.into(),
            offset,
            size: self.indices.len() - offset,
        });
        Ok(())
    }

    /// Extends the mesh with the vertices, indices and parts of another mesh.
    /// The indices of `other` will be offset by the number of vertices in `self`,
    /// its parts by the number of triangles in `self`.
    pub fn extend(&mut self, other: TriMesh) -> Result<(), TriMeshError> {
        let next_vertex_index =
            u32::try_from(self.vertices.len()).map_err(|_| TriMeshError::TooManyVertices)?;
        if self.vertices.len() + other.vertices.len() > u32::MAX as usize {
            return Err(TriMeshError::TooManyVertices);
        }
        let next_triangle = self.indices.len();
        self.vertices.extend(other.vertices);
        self.indices
            .extend(other.indices.into_iter().map(|i| i + next_vertex_index));
        self.parts
            .extend(other.parts.into_iter().map(|part| MeshPart {
                offset: part.offset + next_triangle,
                ..part
            }));
        Ok(())
    }

    /// Number of triangles in the mesh.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Computes the AABB of the trimesh.
    /// Returns `None` if the trimesh is empty.
    pub fn compute_aabb(&self) -> Option<Aabb3d> {
        Aabb3d::from_verts(&self.vertices)
    }

    /// Checks that all indices and part ranges are in bounds and that parts do not overlap.
    pub fn validate(&self) -> Result<(), TriMeshError> {
        let vertex_count = self.vertices.len();
        for (triangle, indices) in self.indices.iter().enumerate() {
            if let Some(&index) = indices
                .to_array()
                .iter()
                .find(|&&index| index as usize >= vertex_count)
            {
                return Err(TriMeshError::IndexOutOfBounds {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }

        let triangle_count = self.triangle_count();
        for (part, mesh_part) in self.parts.iter().enumerate() {
            let range = mesh_part.range();
            if range.end > triangle_count {
                return Err(TriMeshError::PartOutOfBounds {
                    part,
                    start: range.start,
                    end: range.end,
                    triangle_count,
                });
            }
        }

        let mut sorted: Vec<_> = self
            .parts
            .iter()
            .enumerate()
            .filter(|(_, part)| part.size > 0)
            .collect();
        sorted.sort_by_key(|(_, part)| part.offset);
        // The part reaching furthest among those starting earlier.
        let mut furthest: Option<(usize, usize)> = None;
        for (part, mesh_part) in sorted {
            if let Some((other, end)) = furthest {
                if end > mesh_part.offset {
                    return Err(TriMeshError::OverlappingParts {
                        first: other.min(part),
                        second: other.max(part),
                    });
                }
            }
            let end = mesh_part.range().end;
            if furthest.is_none_or(|(_, furthest_end)| end > furthest_end) {
                furthest = Some((part, end));
            }
        }
        Ok(())
    }
}
