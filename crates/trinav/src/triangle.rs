use glam::Vec3A;
use rand::Rng;

use crate::{EdgeId, VertexKey};

/// The graph index of a [`Triangle`], dense and 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleId(pub usize);

impl From<TriangleId> for usize {
    fn from(id: TriangleId) -> Self {
        id.0
    }
}

/// One of the three sides of a [`Triangle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriangleSide {
    /// The side from `a` to `b`
    Ab,
    /// The side from `b` to `c`
    Bc,
    /// The side from `c` to `a`
    Ca,
}

impl TriangleSide {
    /// All sides in winding order.
    pub const ALL: [Self; 3] = [Self::Ab, Self::Bc, Self::Ca];

    /// Positions of the side's endpoints in the triangle's vertex array.
    #[inline]
    pub fn vertex_indices(self) -> (usize, usize) {
        match self {
            Self::Ab => (0, 1),
            Self::Bc => (1, 2),
            Self::Ca => (2, 0),
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self.vertex_indices().0
    }

    #[inline]
    fn flag(self) -> Sides {
        match self {
            Self::Ab => Sides::AB,
            Self::Bc => Sides::BC,
            Self::Ca => Sides::CA,
        }
    }
}

bitflags::bitflags! {
    /// A set of [`TriangleSide`]s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    pub struct Sides: u8 {
        /// The side from `a` to `b`
        const AB = 1 << 0;
        /// The side from `b` to `c`
        const BC = 1 << 1;
        /// The side from `c` to `a`
        const CA = 1 << 2;
    }
}

/// A triangle of the navmesh graph.
///
/// Vertices are stored in the winding of the source mesh. Positions are cached so that geometric
/// queries do not need to go through the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    graph_index: TriangleId,
    mesh_part_index: usize,
    vertices: [VertexKey; 3],
    positions: [Vec3A; 3],
    edges: [Option<EdgeId>; 3],
}

impl Triangle {
    pub(crate) fn new(
        graph_index: TriangleId,
        mesh_part_index: usize,
        vertices: [VertexKey; 3],
        positions: [Vec3A; 3],
    ) -> Self {
        Self {
            graph_index,
            mesh_part_index,
            vertices,
            positions,
            edges: [None; 3],
        }
    }

    /// The index of this triangle in [`NavmeshGraph::triangles`](crate::NavmeshGraph::triangles).
    #[inline]
    pub fn graph_index(&self) -> TriangleId {
        self.graph_index
    }

    /// The mesh part this triangle was created from.
    #[inline]
    pub fn mesh_part_index(&self) -> usize {
        self.mesh_part_index
    }

    /// The first vertex
    #[inline]
    pub fn a(&self) -> VertexKey {
        self.vertices[0]
    }

    /// The second vertex
    #[inline]
    pub fn b(&self) -> VertexKey {
        self.vertices[1]
    }

    /// The third vertex
    #[inline]
    pub fn c(&self) -> VertexKey {
        self.vertices[2]
    }

    /// All vertices in winding order.
    #[inline]
    pub fn vertices(&self) -> [VertexKey; 3] {
        self.vertices
    }

    /// All vertex positions in winding order.
    #[inline]
    pub fn positions(&self) -> [Vec3A; 3] {
        self.positions
    }

    /// Whether `vertex` is one of the corners of this triangle.
    #[inline]
    pub fn contains_vertex(&self, vertex: VertexKey) -> bool {
        self.vertices.contains(&vertex)
    }

    /// The endpoints of `side`.
    #[inline]
    pub fn side_vertices(&self, side: TriangleSide) -> (VertexKey, VertexKey) {
        let (i, j) = side.vertex_indices();
        (self.vertices[i], self.vertices[j])
    }

    /// The endpoint positions of `side`.
    #[inline]
    pub fn side_positions(&self, side: TriangleSide) -> (Vec3A, Vec3A) {
        let (i, j) = side.vertex_indices();
        (self.positions[i], self.positions[j])
    }

    /// Finds the side spanned by `v` and `u`, in either order.
    pub fn side_between(&self, v: VertexKey, u: VertexKey) -> Option<TriangleSide> {
        TriangleSide::ALL.into_iter().find(|&side| {
            let (first, second) = self.side_vertices(side);
            (first == v && second == u) || (first == u && second == v)
        })
    }

    /// The edge leaving through `side`, if that side is shared with another triangle.
    #[inline]
    pub fn edge(&self, side: TriangleSide) -> Option<EdgeId> {
        self.edges[side.slot()]
    }

    /// The edge leaving through the side from `a` to `b`.
    #[inline]
    pub fn ab(&self) -> Option<EdgeId> {
        self.edges[0]
    }

    /// The edge leaving through the side from `b` to `c`.
    #[inline]
    pub fn bc(&self) -> Option<EdgeId> {
        self.edges[1]
    }

    /// The edge leaving through the side from `c` to `a`.
    #[inline]
    pub fn ca(&self) -> Option<EdgeId> {
        self.edges[2]
    }

    pub(crate) fn set_edge(&mut self, side: TriangleSide, edge: EdgeId) {
        self.edges[side.slot()] = Some(edge);
    }

    /// All edges leaving this triangle, in the order `ab`, `bc`, `ca`.
    #[inline]
    pub fn connections(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().flatten().copied()
    }

    /// Sides that are not shared with any other triangle.
    pub fn boundary_sides(&self) -> Sides {
        TriangleSide::ALL
            .into_iter()
            .filter(|&side| self.edge(side).is_none())
            .fold(Sides::empty(), |sides, side| sides | side.flag())
    }

    /// The average of the three corners.
    #[inline]
    pub fn centroid(&self) -> Vec3A {
        let [a, b, c] = self.positions;
        (a + b + c) / 3.0
    }

    /// The midpoints of the sides `ab`, `bc` and `ca`.
    #[inline]
    pub fn side_midpoints(&self) -> [Vec3A; 3] {
        let [a, b, c] = self.positions;
        [(a + b) * 0.5, (b + c) * 0.5, (c + a) * 0.5]
    }

    /// The area of the triangle. Zero for degenerate triangles.
    #[inline]
    pub fn area(&self) -> f32 {
        let [a, b, c] = self.positions;
        (b - a).cross(c - a).length() * 0.5
    }

    /// The unit normal following the source winding, or zero for degenerate triangles.
    #[inline]
    pub fn normal(&self) -> Vec3A {
        let [a, b, c] = self.positions;
        (a - b).cross(b - c).normalize_or_zero()
    }

    /// The angle in radians between the triangle normal and `reference`, in `[0, PI]`.
    /// Returns `0.0` if either is degenerate.
    pub fn angle(&self, reference: Vec3A) -> f32 {
        let normal = self.normal();
        let Some(reference) = reference.try_normalize() else {
            return 0.0;
        };
        if normal == Vec3A::ZERO {
            return 0.0;
        }
        normal.dot(reference).clamp(-1.0, 1.0).acos()
    }

    /// Samples a point uniformly distributed over the triangle's surface.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3A {
        let [a, b, c] = self.positions;
        let sqrt_r1 = rng.gen_range(0.0_f32..=1.0).sqrt();
        let r2 = rng.gen_range(0.0_f32..=1.0);
        let k1 = 1.0 - sqrt_r1;
        let k2 = sqrt_r1 * (1.0 - r2);
        let k3 = sqrt_r1 * r2;
        a * k1 + b * k2 + c * k3
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::SeedableRng as _;
    use rand_chacha::ChaCha8Rng;
    use slotmap::SlotMap;

    use super::*;

    fn triangle() -> Triangle {
        let mut keys = SlotMap::<VertexKey, ()>::with_key();
        Triangle::new(
            TriangleId(0),
            0,
            [keys.insert(()), keys.insert(()), keys.insert(())],
            [
                Vec3A::new(0.0, 0.0, 0.0),
                Vec3A::new(0.0, 0.0, 3.0),
                Vec3A::new(3.0, 0.0, 0.0),
            ],
        )
    }

    #[test]
    fn derived_geometry() {
        let triangle = triangle();
        assert_relative_eq!(triangle.centroid(), Vec3A::new(1.0, 0.0, 1.0));
        assert_relative_eq!(triangle.area(), 4.5);
        assert_eq!(
            triangle.side_midpoints(),
            [
                Vec3A::new(0.0, 0.0, 1.5),
                Vec3A::new(1.5, 0.0, 1.5),
                Vec3A::new(1.5, 0.0, 0.0),
            ]
        );
        assert_relative_eq!(triangle.normal(), Vec3A::Y);
        assert_relative_eq!(triangle.angle(Vec3A::Y), 0.0);
        assert_relative_eq!(triangle.angle(Vec3A::X), std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(triangle.angle(Vec3A::ZERO), 0.0);
    }

    #[test]
    fn sides_and_edges() {
        let mut triangle = triangle();
        assert_eq!(triangle.boundary_sides(), Sides::all());
        assert_eq!(triangle.connections().count(), 0);

        triangle.set_edge(TriangleSide::Bc, EdgeId(4));
        assert_eq!(triangle.bc(), Some(EdgeId(4)));
        assert_eq!(triangle.ab(), None);
        assert_eq!(triangle.boundary_sides(), Sides::AB | Sides::CA);
        assert_eq!(triangle.connections().collect::<Vec<_>>(), vec![EdgeId(4)]);

        let (b, c) = triangle.side_vertices(TriangleSide::Bc);
        assert_eq!(triangle.side_between(c, b), Some(TriangleSide::Bc));
        assert_eq!(triangle.side_between(b, b), None);
    }

    #[test]
    fn random_points_lie_inside() {
        let triangle = triangle();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..100 {
            let point = triangle.random_point(&mut rng);
            assert!(point.is_finite());
            assert_relative_eq!(point.y, 0.0);
            assert!(point.x >= -1e-6 && point.z >= -1e-6);
            assert!(point.x + point.z <= 3.0 + 1e-5);
        }
    }

    #[test]
    fn degenerate_triangle_is_finite() {
        let mut keys = SlotMap::<VertexKey, ()>::with_key();
        let key = keys.insert(());
        let triangle = Triangle::new(TriangleId(0), 0, [key; 3], [Vec3A::ONE; 3]);
        assert_eq!(triangle.area(), 0.0);
        assert_eq!(triangle.normal(), Vec3A::ZERO);
        assert_eq!(triangle.angle(Vec3A::Y), 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_relative_eq!(triangle.random_point(&mut rng), Vec3A::ONE, epsilon = 1e-6);
    }
}
