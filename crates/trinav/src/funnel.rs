//! String pulling with the Simple Stupid Funnel Algorithm.
//!
//! The funnel is bounded by two vertical planes through the current pivot. The left plane is built
//! from `(pivot, pivot + up, left portal)`, the right plane is the same construction flipped, so
//! that for both of them the back side is inside the funnel.
//!
//! Points are classified relative to the pivot with a tolerance that scales with their distance
//! from it, so vertices collinear with a funnel side count as lying on it. When a candidate lies
//! on a side, the nearer of the two collinear vertices bounds the funnel.

use glam::Vec3A;

use crate::{
    EdgeId, NavmeshConfig, NavmeshGraph, Triangle, TriangleId, TrianglePath,
    math::{Plane, PlaneSide, Ray, intersect_ray_triangle, nearest_segment_point_squared_distance},
    path::{EdgeCrossing, PathPoint},
};

/// Squared distance below which two consecutive waypoints are considered the same.
const DUPLICATE_DISTANCE_SQUARED: f32 = 1e-12;

/// Distance to a funnel side, relative to the distance from the pivot, below which a point lies on
/// that side.
const COLLINEAR_TOLERANCE: f32 = 1e-6;

/// A doorway of the corridor. The last portal of a corridor collapses onto the end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Portal {
    left: Vec3A,
    right: Vec3A,
    from_node: TriangleId,
    to_node: TriangleId,
    edge: Option<EdgeId>,
}

impl Portal {
    fn from_edge(graph: &NavmeshGraph, id: EdgeId) -> Self {
        let edge = graph.edge(id);
        let (right, left) = graph.edge_positions(id);
        Self {
            left,
            right,
            from_node: edge.from_node(),
            to_node: edge.to_node(),
            edge: Some(id),
        }
    }

    fn touches(&self, point: Vec3A) -> bool {
        self.left == point || self.right == point
    }
}

#[derive(Debug)]
struct Funnel {
    up: Vec3A,
    pivot: Vec3A,
    left_plane: Plane,
    right_plane: Plane,
    left_portal: Vec3A,
    right_portal: Vec3A,
}

impl Funnel {
    fn new(up: Vec3A, pivot: Vec3A, portal: &Portal) -> Self {
        let mut funnel = Self {
            up,
            pivot,
            left_plane: Plane::default(),
            right_plane: Plane::default(),
            left_portal: pivot,
            right_portal: pivot,
        };
        funnel.set_planes(portal);
        funnel
    }

    fn set_left(&mut self, left: Vec3A) {
        self.left_plane = Plane::from_points(self.pivot, self.pivot + self.up, left);
        self.left_portal = left;
    }

    fn set_right(&mut self, right: Vec3A) {
        self.right_plane = Plane::from_points(self.pivot, self.pivot + self.up, right).flipped();
        self.right_portal = right;
    }

    fn set_planes(&mut self, portal: &Portal) {
        self.set_left(portal.left);
        self.set_right(portal.right);
    }

    fn classify(&self, plane: &Plane, point: Vec3A) -> PlaneSide {
        let offset = point - self.pivot;
        let distance = plane.normal.dot(offset);
        if distance.abs() <= COLLINEAR_TOLERANCE * offset.length() {
            PlaneSide::OnPlane
        } else if distance < 0.0 {
            PlaneSide::Back
        } else {
            PlaneSide::Front
        }
    }

    fn farther(&self, point: Vec3A, than: Vec3A) -> bool {
        self.pivot.distance_squared(point) > self.pivot.distance_squared(than)
    }

    /// Decides what a new right portal vertex does to the funnel.
    fn advance_right(&self, candidate: Vec3A) -> Advance {
        self.advance(
            (&self.right_plane, self.right_portal),
            (&self.left_plane, self.left_portal),
            candidate,
        )
    }

    /// Decides what a new left portal vertex does to the funnel.
    fn advance_left(&self, candidate: Vec3A) -> Advance {
        self.advance(
            (&self.left_plane, self.left_portal),
            (&self.right_plane, self.right_portal),
            candidate,
        )
    }

    fn advance(
        &self,
        (own_plane, own_portal): (&Plane, Vec3A),
        (other_plane, other_portal): (&Plane, Vec3A),
        candidate: Vec3A,
    ) -> Advance {
        match self.classify(own_plane, candidate) {
            PlaneSide::Front => return Advance::Keep,
            PlaneSide::OnPlane
                if own_portal != self.pivot && self.farther(candidate, own_portal) =>
            {
                return Advance::Keep;
            }
            _ => {}
        }
        if other_portal == self.pivot {
            return Advance::Tighten;
        }
        match self.classify(other_plane, candidate) {
            PlaneSide::Back => Advance::Tighten,
            PlaneSide::OnPlane if !self.farther(candidate, other_portal) => Advance::Tighten,
            _ => Advance::Cross,
        }
    }
}

/// Effect of one portal vertex on its side of the funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advance {
    /// The vertex narrows its side.
    Tighten,
    /// The vertex lies outside its side or further along it, the side stays.
    Keep,
    /// The vertex crosses the opposite side, whose portal becomes a corner.
    Cross,
}

/// Moves `start` onto `triangle` if a vertical probe through it misses the triangle.
fn constrain_start(triangle: &Triangle, start: Vec3A, config: &NavmeshConfig) -> Vec3A {
    let [a, b, c] = triangle.positions();
    let probe = Ray::new(start + config.up * config.probe_height, -config.up);
    if intersect_ray_triangle(&probe, a, b, c).is_some() {
        return start;
    }
    [(a, b), (b, c), (c, a)]
        .into_iter()
        .map(|(side_start, side_end)| {
            nearest_segment_point_squared_distance(side_start, side_end, start)
        })
        .min_by(|x, y| x.0.total_cmp(&y.0))
        .map_or(start, |(_, nearest)| nearest)
}

/// Computes the waypoints through `path` into `points`. `portals` is scratch space.
pub(crate) fn string_pull(
    graph: &NavmeshGraph,
    path: &TrianglePath,
    config: &NavmeshConfig,
    portals: &mut Vec<Portal>,
    points: &mut Vec<PathPoint>,
) {
    points.clear();
    portals.clear();
    let Some(start_triangle) = path.start_triangle else {
        return;
    };
    let Some(triangle) = graph.get_triangle(start_triangle) else {
        return;
    };
    let start = constrain_start(triangle, path.start, config);
    let end = path.end;

    if path.is_empty() {
        points.push(PathPoint::new(start, start_triangle, start_triangle));
        points.push(PathPoint::new(end, start_triangle, start_triangle));
        return;
    }

    portals.extend(
        path.edges()
            .iter()
            .map(|&edge| Portal::from_edge(graph, edge)),
    );
    let goal = portals
        .last()
        .map_or(start_triangle, |portal| portal.to_node);
    portals.push(Portal {
        left: end,
        right: end,
        from_node: goal,
        to_node: goal,
        edge: None,
    });

    let mut builder = PathBuilder {
        up: config.up,
        portals,
        points,
    };
    builder.walk(start, end);
}

struct PathBuilder<'a> {
    up: Vec3A,
    portals: &'a [Portal],
    points: &'a mut Vec<PathPoint>,
}

impl PathBuilder<'_> {
    fn walk(&mut self, start: Vec3A, end: Vec3A) {
        let portal_count = self.portals.len();
        let first = self.portals[0];
        self.points
            .push(PathPoint::new(start, first.from_node, first.from_node));

        let mut funnel = Funnel::new(self.up, start, &first);
        let mut left_index = 0;
        let mut right_index = 0;
        let mut last_restart = 0;

        let mut i = 1;
        while i < portal_count {
            let portal = self.portals[i];

            let mut corner = None;
            match funnel.advance_right(portal.right) {
                Advance::Tighten => {
                    funnel.set_right(portal.right);
                    right_index = i;
                }
                Advance::Keep => {}
                // The right side crossed over the left one, the left portal is a corner.
                Advance::Cross => corner = Some((funnel.left_portal, left_index)),
            }
            if corner.is_none() {
                match funnel.advance_left(portal.left) {
                    Advance::Tighten => {
                        funnel.set_left(portal.left);
                        left_index = i;
                    }
                    Advance::Keep => {}
                    Advance::Cross => corner = Some((funnel.right_portal, right_index)),
                }
            }

            if let Some((corner, corner_index)) = corner {
                self.add_segment(last_restart, corner_index, funnel.pivot, corner);
                i = corner_index;
                if !self.restart(&mut funnel, corner, i) {
                    break;
                }
                last_restart = i;
                left_index = i + 1;
                right_index = i + 1;
            }
            i += 1;
        }

        self.add_segment(last_restart, portal_count - 1, funnel.pivot, end);

        for i in 1..self.points.len() {
            self.points[i].from_triangle = self.points[i - 1].to_triangle;
        }
    }

    /// Moves the pivot to `corner` and reopens the funnel on the portal after `corner_index`.
    /// Returns `false` if there is no such portal.
    fn restart(&self, funnel: &mut Funnel, corner: Vec3A, corner_index: usize) -> bool {
        funnel.pivot = corner;
        match self.portals.get(corner_index + 1) {
            Some(next) => {
                funnel.set_planes(next);
                true
            }
            None => false,
        }
    }

    /// Appends the waypoint `end_point` and classifies the portals `start_index..end_index`
    /// against the segment from the last waypoint to it.
    fn add_segment(
        &mut self,
        start_index: usize,
        end_index: usize,
        start_point: Vec3A,
        end_point: Vec3A,
    ) {
        let portal_count = self.portals.len();
        if start_index >= portal_count || end_index >= portal_count {
            return;
        }
        let Some(start) = self.points.last_mut() else {
            return;
        };

        let crossing_plane = Plane::from_points(start_point, start_point + self.up, end_point);
        let mut end = PathPoint::new(
            end_point,
            self.portals[end_index].from_node,
            self.portals[end_index].to_node,
        );

        for k in start_index..end_index {
            let portal = self.portals[k];
            let Some(edge) = portal.edge else {
                continue;
            };
            if portal.touches(start_point) {
                start.to_triangle = portal.to_node;
                start.add_crossed_edge(edge);
            } else if portal.touches(end_point) {
                end.add_crossed_edge(edge);
            } else if k != start_index || k == 0 {
                if let Some(position) = crossing_plane.intersect_segment(portal.left, portal.right)
                {
                    start.segment_crossings.push(EdgeCrossing { edge, position });
                }
            }
        }
        if end_index + 1 < portal_count {
            if let Some(edge) = self.portals[end_index].edge {
                end.add_crossed_edge(edge);
            }
        }

        if start.position.distance_squared(end.position) <= DUPLICATE_DISTANCE_SQUARED {
            start.to_triangle = end.to_triangle;
            for edge in end.crossed_edges {
                start.add_crossed_edge(edge);
            }
            return;
        }
        self.points.push(end);
    }
}
