//! Distance estimates between triangles used to guide the A* search.
//!
//! None of the estimates is admissible on every mesh: the true corridor cost counts doorways, not
//! distance. They are only used to order the search frontier.

use std::collections::HashSet;

use glam::Vec3A;

use crate::{NavmeshGraph, Triangle, TriangleId};

/// The available ways of estimating the distance between two triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum HeuristicKind {
    /// Distance between the centroids.
    ClosestCentroid,
    /// Smallest distance between any vertex of one triangle and any vertex of the other.
    ClosestVertices,
    /// Smallest distance between any side midpoint of one triangle and any side midpoint of the
    /// other.
    #[default]
    ClosestMidpoint,
}

impl HeuristicKind {
    /// All heuristic kinds.
    pub const ALL: [Self; 3] = [
        Self::ClosestCentroid,
        Self::ClosestVertices,
        Self::ClosestMidpoint,
    ];

    /// Estimates the distance between `a` and `b`. Symmetric and never negative.
    pub fn estimate(self, a: &Triangle, b: &Triangle) -> f32 {
        match self {
            Self::ClosestCentroid => a.centroid().distance(b.centroid()),
            Self::ClosestVertices => min_pairwise_distance(a.positions(), b.positions()),
            Self::ClosestMidpoint => min_pairwise_distance(a.side_midpoints(), b.side_midpoints()),
        }
    }
}

fn min_pairwise_distance(a: [Vec3A; 3], b: [Vec3A; 3]) -> f32 {
    a.iter()
        .flat_map(|p| b.iter().map(move |q| p.distance_squared(*q)))
        .fold(f32::INFINITY, f32::min)
        .sqrt()
}

/// A [`HeuristicKind`] plus a log of every triangle it was asked about.
///
/// The log is useful for visualizing which part of the mesh a search explored.
#[derive(Debug, Clone, Default)]
pub struct NavmeshHeuristic {
    kind: HeuristicKind,
    searched_nodes: Vec<TriangleId>,
    seen: HashSet<TriangleId>,
}

impl NavmeshHeuristic {
    /// Creates a heuristic with an empty log.
    pub fn new(kind: HeuristicKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// The active heuristic.
    #[inline]
    pub fn kind(&self) -> HeuristicKind {
        self.kind
    }

    /// Changes the active heuristic. The log is kept.
    #[inline]
    pub fn set_kind(&mut self, kind: HeuristicKind) {
        self.kind = kind;
    }

    /// Estimates the distance between `node` and `end` and records both in the log.
    pub fn estimate(&mut self, graph: &NavmeshGraph, node: TriangleId, end: TriangleId) -> f32 {
        self.record(node);
        self.record(end);
        self.kind
            .estimate(graph.triangle(node), graph.triangle(end))
    }

    fn record(&mut self, triangle: TriangleId) {
        if self.seen.insert(triangle) {
            self.searched_nodes.push(triangle);
        }
    }

    /// Every triangle passed to [`NavmeshHeuristic::estimate`] since the last clear, in the order
    /// they were first seen.
    #[inline]
    pub fn searched_nodes(&self) -> &[TriangleId] {
        &self.searched_nodes
    }

    /// Empties the log.
    pub fn clear_searched_nodes(&mut self) {
        self.searched_nodes.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::test_meshes;

    #[test]
    fn estimates_are_symmetric_and_non_negative() {
        let graph = NavmeshGraph::new(&test_meshes::l_corridor()).unwrap();
        for kind in HeuristicKind::ALL {
            for a in graph.triangles() {
                for b in graph.triangles() {
                    let ab = kind.estimate(a, b);
                    let ba = kind.estimate(b, a);
                    assert!(ab >= 0.0);
                    assert_eq!(ab, ba, "{kind:?} is not symmetric");
                }
                assert_eq!(kind.estimate(a, a), 0.0);
            }
        }
    }

    #[test]
    fn estimates_on_strip() {
        let graph = NavmeshGraph::new(&test_meshes::strip(4)).unwrap();
        let first = graph.triangle(TriangleId(0));
        let last = graph.triangle(TriangleId(7));

        // Centroids at (1/3, 1/3) and (3 + 2/3, 2/3).
        let expected = glam::Vec2::new(10.0 / 3.0, 1.0 / 3.0).length();
        assert_relative_eq!(
            HeuristicKind::ClosestCentroid.estimate(first, last),
            expected,
            epsilon = 1e-5
        );
        // Closest corners are (1, 0) and (3, 1).
        assert_relative_eq!(
            HeuristicKind::ClosestVertices.estimate(first, last),
            5.0_f32.sqrt(),
            epsilon = 1e-5
        );
        // Closest side midpoints are (0.5, 0.5) and (3.5, 0.5).
        assert_relative_eq!(
            HeuristicKind::ClosestMidpoint.estimate(first, last),
            3.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn log_records_each_triangle_once_in_order() {
        let graph = NavmeshGraph::new(&test_meshes::l_corridor()).unwrap();
        let mut heuristic = NavmeshHeuristic::new(HeuristicKind::ClosestCentroid);
        heuristic.estimate(&graph, TriangleId(2), TriangleId(0));
        heuristic.estimate(&graph, TriangleId(1), TriangleId(0));
        heuristic.estimate(&graph, TriangleId(2), TriangleId(0));
        assert_eq!(
            heuristic.searched_nodes(),
            &[TriangleId(2), TriangleId(0), TriangleId(1)]
        );

        heuristic.set_kind(HeuristicKind::ClosestVertices);
        assert_eq!(heuristic.searched_nodes().len(), 3);

        heuristic.clear_searched_nodes();
        assert!(heuristic.searched_nodes().is_empty());
        heuristic.estimate(&graph, TriangleId(1), TriangleId(1));
        assert_eq!(heuristic.searched_nodes(), &[TriangleId(1)]);
    }

    #[test]
    fn default_is_closest_midpoint() {
        assert_eq!(
            NavmeshHeuristic::default().kind(),
            HeuristicKind::ClosestMidpoint
        );
    }
}
