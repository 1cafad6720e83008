use glam::Vec3A;

use crate::TriangleId;

slotmap::new_key_type! {
    /// A key for a [`Vertex`] in a [`NavmeshGraph`](crate::NavmeshGraph).
    pub struct VertexKey;
}

/// A canonical vertex of the navmesh graph.
///
/// All mesh indices that point to the same position share one `Vertex`.
/// Two vertices compare equal if their positions are equal.
#[derive(Debug, Clone)]
pub struct Vertex {
    position: Vec3A,
    index: u32,
    adjacent_triangles: Vec<TriangleId>,
    adjacent_vertices: Vec<VertexKey>,
}

impl Vertex {
    pub(crate) fn new(index: u32, position: Vec3A) -> Self {
        Self {
            position,
            index,
            adjacent_triangles: Vec::new(),
            adjacent_vertices: Vec::new(),
        }
    }

    /// The position of the vertex.
    #[inline]
    pub fn position(&self) -> Vec3A {
        self.position
    }

    /// The mesh index of the first occurrence of this position in the index buffer.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Triangles using this vertex, in the order they were created.
    #[inline]
    pub fn adjacent_triangles(&self) -> &[TriangleId] {
        &self.adjacent_triangles
    }

    /// Vertices sharing a triangle side with this vertex, in the order they were discovered.
    #[inline]
    pub fn adjacent_vertices(&self) -> &[VertexKey] {
        &self.adjacent_vertices
    }

    pub(crate) fn add_adjacent_triangle(&mut self, triangle: TriangleId) {
        if !self.adjacent_triangles.contains(&triangle) {
            self.adjacent_triangles.push(triangle);
        }
    }

    pub(crate) fn add_adjacent_vertex(&mut self, vertex: VertexKey) {
        if !self.adjacent_vertices.contains(&vertex) {
            self.adjacent_vertices.push(vertex);
        }
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

/// Hashable identity of a position. `-0.0` and `0.0` map to the same key.
pub(crate) fn position_key(position: Vec3A) -> [u32; 3] {
    // Adding positive zero turns negative zero into positive zero and leaves everything else as is.
    let normalized = position + Vec3A::ZERO;
    [
        normalized.x.to_bits(),
        normalized.y.to_bits(),
        normalized.z.to_bits(),
    ]
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn equality_ignores_index() {
        let a = Vertex::new(0, Vec3A::new(1.0, 2.0, 3.0));
        let b = Vertex::new(7, Vec3A::new(1.0, 2.0, 3.0));
        let c = Vertex::new(0, Vec3A::new(1.0, 2.0, 3.5));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn adjacency_is_deduplicated_and_ordered() {
        let mut keys = SlotMap::<VertexKey, ()>::with_key();
        let first = keys.insert(());
        let second = keys.insert(());

        let mut vertex = Vertex::new(0, Vec3A::ZERO);
        vertex.add_adjacent_triangle(TriangleId(3));
        vertex.add_adjacent_triangle(TriangleId(1));
        vertex.add_adjacent_triangle(TriangleId(3));
        vertex.add_adjacent_vertex(second);
        vertex.add_adjacent_vertex(first);
        vertex.add_adjacent_vertex(second);

        assert_eq!(vertex.adjacent_triangles(), &[TriangleId(3), TriangleId(1)]);
        assert_eq!(vertex.adjacent_vertices(), &[second, first]);
    }

    #[test]
    fn negative_zero_has_the_same_key() {
        assert_eq!(
            position_key(Vec3A::new(-0.0, 1.0, -0.0)),
            position_key(Vec3A::new(0.0, 1.0, 0.0))
        );
        assert_ne!(
            position_key(Vec3A::new(0.0, 1.0, 0.0)),
            position_key(Vec3A::new(0.0, -1.0, 0.0))
        );
    }
}
