//! The triangle adjacency graph that paths are searched on.

use std::collections::HashMap;

use glam::Vec3A;
use slotmap::SlotMap;

use crate::{
    Edge, EdgeId, Triangle, TriangleId, TriangleSide, TriMesh, TriMeshError, Vertex, VertexKey,
    math::Aabb3d, vertex::position_key,
};

/// A navigation graph whose nodes are the triangles of a [`TriMesh`] and whose edges connect
/// triangles sharing a side.
///
/// Built once per mesh and read-only afterwards.
#[derive(Debug, Clone)]
pub struct NavmeshGraph {
    up: Vec3A,
    vertices: SlotMap<VertexKey, Vertex>,
    index_to_vertex: HashMap<u32, VertexKey>,
    triangles: Vec<Triangle>,
    edges: Vec<Edge>,
    mesh_parts: Vec<Vec<TriangleId>>,
}

impl Default for NavmeshGraph {
    fn default() -> Self {
        Self {
            up: Vec3A::Y,
            vertices: SlotMap::default(),
            index_to_vertex: HashMap::default(),
            triangles: Vec::default(),
            edges: Vec::default(),
            mesh_parts: Vec::default(),
        }
    }
}

impl NavmeshGraph {
    /// Builds the graph of `trimesh` with [`Vec3A::Y`] as the up axis.
    pub fn new(trimesh: &TriMesh) -> Result<Self, TriMeshError> {
        Self::with_up(trimesh, Vec3A::Y)
    }

    /// Builds the graph of `trimesh`.
    ///
    /// `up` is used to decide which endpoint of a shared side is on the left and which is on the
    /// right when walking from one triangle into the other. It is normalized, a zero vector falls
    /// back to [`Vec3A::Y`].
    pub fn with_up(trimesh: &TriMesh, up: Vec3A) -> Result<Self, TriMeshError> {
        trimesh.validate()?;

        let up = up.try_normalize().unwrap_or(Vec3A::Y);
        let mut graph = Self {
            up,
            ..Self::default()
        };
        graph.create_vertices(trimesh);
        graph.create_triangles(trimesh);
        graph.link_triangles(up);

        tracing::trace!(
            vertices = graph.vertices.len(),
            triangles = graph.triangles.len(),
            edges = graph.edges.len(),
            mesh_parts = graph.mesh_parts.len(),
            "Built navmesh graph."
        );
        Ok(graph)
    }

    /// Maps every raw index to a canonical vertex. The first index with a given position wins.
    fn create_vertices(&mut self, trimesh: &TriMesh) {
        let mut by_position = HashMap::new();
        for index in trimesh.indices.iter().flat_map(|indices| indices.to_array()) {
            if self.index_to_vertex.contains_key(&index) {
                continue;
            }
            let position = trimesh.vertices[index as usize];
            let vertices = &mut self.vertices;
            let key = *by_position
                .entry(position_key(position))
                .or_insert_with(|| vertices.insert(Vertex::new(index, position)));
            self.index_to_vertex.insert(index, key);
        }
    }

    fn create_triangles(&mut self, trimesh: &TriMesh) {
        for (part_index, part) in trimesh.parts.iter().enumerate() {
            let mut bucket = Vec::with_capacity(part.size);
            for indices in &trimesh.indices[part.range()] {
                let keys = indices.to_array().map(|index| self.index_to_vertex[&index]);
                let positions = keys.map(|key| self.vertices[key].position());
                let id = TriangleId(self.triangles.len());

                for (i, j) in TriangleSide::ALL.map(TriangleSide::vertex_indices) {
                    let (v, u) = (keys[i], keys[j]);
                    if v == u {
                        continue;
                    }
                    self.vertices[v].add_adjacent_vertex(u);
                    self.vertices[u].add_adjacent_vertex(v);
                }
                for key in keys {
                    self.vertices[key].add_adjacent_triangle(id);
                }

                self.triangles
                    .push(Triangle::new(id, part_index, keys, positions));
                bucket.push(id);
            }
            self.mesh_parts.push(bucket);
        }
    }

    fn link_triangles(&mut self, up: Vec3A) {
        for i in 0..self.triangles.len() {
            let triangle = TriangleId(i);
            for side in TriangleSide::ALL {
                if self.triangles[i].edge(side).is_none() {
                    self.link_side(triangle, side, up);
                }
            }
        }
    }

    fn link_side(&mut self, triangle: TriangleId, side: TriangleSide, up: Vec3A) {
        let (v, u) = self.triangles[triangle.0].side_vertices(side);
        if v == u {
            return;
        }
        let u_triangles = self.vertices[u].adjacent_triangles();
        let shared: Vec<TriangleId> = self.vertices[v]
            .adjacent_triangles()
            .iter()
            .filter(|&&other| other != triangle && u_triangles.contains(&other))
            .copied()
            .collect();

        let neighbor = match shared.as_slice() {
            [] => return,
            [neighbor] => *neighbor,
            _ => {
                tracing::debug!(
                    ?triangle,
                    ?side,
                    neighbors = shared.len(),
                    "Side is shared by more than two triangles, leaving it unlinked."
                );
                return;
            }
        };
        let Some(neighbor_side) = self.triangles[neighbor.0].side_between(v, u) else {
            return;
        };
        if self.triangles[neighbor.0].edge(neighbor_side).is_some() {
            return;
        }

        let (right_vertex, left_vertex) = self.orient_side(triangle, v, u, up);
        let forward = EdgeId(self.edges.len());
        let backward = EdgeId(forward.0 + 1);
        self.edges.push(Edge {
            from_node: triangle,
            to_node: neighbor,
            right_vertex,
            left_vertex,
            reverse: backward,
        });
        self.edges.push(Edge {
            from_node: neighbor,
            to_node: triangle,
            right_vertex: left_vertex,
            left_vertex: right_vertex,
            reverse: forward,
        });
        self.triangles[triangle.0].set_edge(side, forward);
        self.triangles[neighbor.0].set_edge(neighbor_side, backward);
    }

    /// Returns `(right, left)` for the side `v, u` as seen from the centroid of `triangle`.
    fn orient_side(
        &self,
        triangle: TriangleId,
        v: VertexKey,
        u: VertexKey,
        up: Vec3A,
    ) -> (VertexKey, VertexKey) {
        let v_position = self.vertices[v].position();
        let u_position = self.vertices[u].position();
        let midpoint = (v_position + u_position) * 0.5;
        let facing = midpoint - self.triangles[triangle.0].centroid();
        let right = facing.cross(up);
        // Degenerate cases fall back to the source winding.
        if (v_position - u_position).dot(right) < 0.0 {
            (u, v)
        } else {
            (v, u)
        }
    }

    /// The up axis the left and right endpoints of every edge were assigned with.
    #[inline]
    pub fn up(&self) -> Vec3A {
        self.up
    }

    /// Returns the triangle with the given graph index.
    ///
    /// # Panics
    ///
    /// Panics if the triangle does not exist.
    #[inline]
    pub fn triangle(&self, id: TriangleId) -> &Triangle {
        &self.triangles[id.0]
    }

    /// Returns the triangle with the given graph index, if it exists.
    #[inline]
    pub fn get_triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id.0)
    }

    /// All triangles, indexed by their graph index.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles in the graph.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the `index`th triangle of mesh part `part`.
    pub fn triangle_from_mesh_part(&self, part: usize, index: usize) -> Option<TriangleId> {
        self.mesh_parts.get(part)?.get(index).copied()
    }

    /// The triangles created from mesh part `part`.
    pub fn mesh_part_triangles(&self, part: usize) -> &[TriangleId] {
        self.mesh_parts
            .get(part)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of mesh parts the graph was built from.
    #[inline]
    pub fn mesh_part_count(&self) -> usize {
        self.mesh_parts.len()
    }

    /// Number of triangles in mesh part `part`.
    pub fn mesh_part_triangle_count(&self, part: usize) -> usize {
        self.mesh_part_triangles(part).len()
    }

    /// Returns the vertex for the given key.
    ///
    /// # Panics
    ///
    /// Panics if the vertex does not exist.
    #[inline]
    pub fn vertex(&self, key: VertexKey) -> &Vertex {
        &self.vertices[key]
    }

    /// All canonical vertices.
    #[inline]
    pub fn vertices(&self) -> &SlotMap<VertexKey, Vertex> {
        &self.vertices
    }

    /// Returns the canonical vertex for a raw mesh index.
    #[inline]
    pub fn vertex_for_index(&self, index: u32) -> Option<VertexKey> {
        self.index_to_vertex.get(&index).copied()
    }

    /// Returns the edge with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the edge does not exist.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// All directed edges.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The edges leaving `triangle`.
    #[inline]
    pub fn connections(&self, triangle: TriangleId) -> impl Iterator<Item = EdgeId> + '_ {
        self.triangles[triangle.0].connections()
    }

    /// The right and left endpoint positions of `edge`.
    #[inline]
    pub fn edge_positions(&self, edge: EdgeId) -> (Vec3A, Vec3A) {
        let edge = self.edge(edge);
        (
            self.vertices[edge.right_vertex].position(),
            self.vertices[edge.left_vertex].position(),
        )
    }

    /// Computes the AABB of all canonical vertices.
    /// Returns `None` if the graph is empty.
    pub fn compute_aabb(&self) -> Option<Aabb3d> {
        let positions: Vec<Vec3A> = self.vertices.values().map(Vertex::position).collect();
        Aabb3d::from_verts(&positions)
    }
}
