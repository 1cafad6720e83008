use crate::{TriangleId, VertexKey};

/// An index into [`NavmeshGraph::edges`](crate::NavmeshGraph::edges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId(pub usize);

/// A directed connection between two triangles that share a side.
///
/// `right_vertex` and `left_vertex` are the endpoints of the shared side as seen from someone
/// standing in [`Edge::from_node`] and looking at [`Edge::to_node`].
/// The opposite direction is a separate edge, see [`Edge::reverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub(crate) from_node: TriangleId,
    pub(crate) to_node: TriangleId,
    pub(crate) right_vertex: VertexKey,
    pub(crate) left_vertex: VertexKey,
    pub(crate) reverse: EdgeId,
}

impl Edge {
    /// The cost of traversing any edge.
    pub const COST: f32 = 1.0;

    /// The triangle this edge leaves.
    #[inline]
    pub fn from_node(&self) -> TriangleId {
        self.from_node
    }

    /// The triangle this edge enters.
    #[inline]
    pub fn to_node(&self) -> TriangleId {
        self.to_node
    }

    /// The endpoint of the shared side on the right hand.
    #[inline]
    pub fn right_vertex(&self) -> VertexKey {
        self.right_vertex
    }

    /// The endpoint of the shared side on the left hand.
    #[inline]
    pub fn left_vertex(&self) -> VertexKey {
        self.left_vertex
    }

    /// The edge going from [`Edge::to_node`] back to [`Edge::from_node`].
    #[inline]
    pub fn reverse(&self) -> EdgeId {
        self.reverse
    }

    /// Traversal cost, always [`Edge::COST`].
    #[inline]
    pub fn cost(&self) -> f32 {
        Self::COST
    }
}
