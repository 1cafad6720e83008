//! The results of path finding: a corridor of triangles and the waypoints through it.

use glam::Vec3A;

use crate::{EdgeId, NavmeshConfig, NavmeshGraph, TriangleId, funnel};

/// A corridor of triangles, expressed as the edges crossed between them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrianglePath {
    pub(crate) edges: Vec<EdgeId>,
    /// Where the path starts
    pub start: Vec3A,
    /// Where the path ends
    pub end: Vec3A,
    /// The triangle containing [`TrianglePath::start`]. `None` until a path was found.
    pub start_triangle: Option<TriangleId>,
}

impl TrianglePath {
    /// The edges in walking order. Each edge leaves the triangle the previous one entered.
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Number of edges crossed.
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether start and end lie in the same triangle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The triangle containing [`TrianglePath::end`].
    pub fn end_triangle(&self, graph: &NavmeshGraph) -> Option<TriangleId> {
        match self.edges.last() {
            Some(&edge) => Some(graph.edge(edge).to_node()),
            None => self.start_triangle,
        }
    }

    /// Every triangle of the corridor in walking order, starting with the start triangle.
    pub fn triangles<'a>(
        &'a self,
        graph: &'a NavmeshGraph,
    ) -> impl Iterator<Item = TriangleId> + 'a {
        self.start_triangle
            .into_iter()
            .chain(self.edges.iter().map(|&edge| graph.edge(edge).to_node()))
    }

    /// Resets the path so it can be reused.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.start = Vec3A::ZERO;
        self.end = Vec3A::ZERO;
        self.start_triangle = None;
    }
}

/// A doorway crossed strictly between two waypoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCrossing {
    /// The edge that was crossed
    pub edge: EdgeId,
    /// Where the straight segment crosses the edge
    pub position: Vec3A,
}

/// A waypoint of a [`PointPath`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathPoint {
    /// The position of the waypoint
    pub position: Vec3A,
    /// The triangle walked through to reach this point
    pub from_triangle: TriangleId,
    /// The triangle walked through when leaving this point
    pub to_triangle: TriangleId,
    /// Edges whose side passes exactly through this point
    pub crossed_edges: Vec<EdgeId>,
    /// Edges crossed strictly inside the segment from this point to the next one, in order
    pub segment_crossings: Vec<EdgeCrossing>,
}

impl PathPoint {
    pub(crate) fn new(position: Vec3A, from_triangle: TriangleId, to_triangle: TriangleId) -> Self {
        Self {
            position,
            from_triangle,
            to_triangle,
            crossed_edges: Vec::new(),
            segment_crossings: Vec::new(),
        }
    }

    pub(crate) fn add_crossed_edge(&mut self, edge: EdgeId) {
        if !self.crossed_edges.contains(&edge) {
            self.crossed_edges.push(edge);
        }
    }
}

/// The shortest sequence of straight segments through a [`TrianglePath`].
#[derive(Debug, Clone, Default)]
pub struct PointPath {
    points: Vec<PathPoint>,
    portals: Vec<funnel::Portal>,
}

impl PointPath {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the waypoints with the string-pulled version of `path`.
    ///
    /// A start point outside of the start triangle is first moved onto its nearest side.
    /// If `path` has no start triangle the result is empty.
    pub fn calculate(&mut self, graph: &NavmeshGraph, path: &TrianglePath, config: &NavmeshConfig) {
        funnel::string_pull(graph, path, config, &mut self.portals, &mut self.points);
    }

    /// The waypoints in walking order.
    #[inline]
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    /// Returns the waypoint at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&PathPoint> {
        self.points.get(index)
    }

    /// The waypoint positions in walking order.
    pub fn positions(&self) -> impl Iterator<Item = Vec3A> + '_ {
        self.points.iter().map(|point| point.position)
    }

    /// Number of waypoints.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no waypoints.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The summed length of all segments.
    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| pair[0].position.distance(pair[1].position))
            .sum()
    }

    /// Removes all waypoints. Scratch memory is kept.
    pub fn clear(&mut self) {
        self.points.clear();
        self.portals.clear();
    }
}
