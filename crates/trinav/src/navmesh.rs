//! The high level entry point: a graph plus the scratch state needed to query it.

use glam::Vec3A;
use rand::Rng;

use crate::{
    HeuristicKind, NavmeshConfig, NavmeshGraph, NavmeshHeuristic, Pathfinder, PointPath,
    SearchMetrics, TriMesh, TriMeshError, TriangleId, TrianglePath, math::Ray,
};

/// Which mesh parts a query may use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MeshParts {
    /// Every part
    #[default]
    All,
    /// Only the parts with these indices
    Only(Vec<usize>),
}

impl MeshParts {
    /// Whether `part` is allowed.
    #[inline]
    pub fn contains(&self, part: usize) -> bool {
        match self {
            Self::All => true,
            Self::Only(parts) => parts.contains(&part),
        }
    }
}

/// A triangle found by a [`TriangleLocator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// The triangle that was hit
    pub triangle: TriangleId,
    /// Where it was hit
    pub point: Vec3A,
}

/// Resolves rays to navmesh triangles, usually backed by the host's physics or spatial index.
pub trait TriangleLocator {
    /// Returns the first triangle of an allowed mesh part hit by `ray` within `max_distance`.
    /// `max_distance` is measured in multiples of the ray direction's length.
    fn locate(&self, ray: &Ray, max_distance: f32, parts: &MeshParts) -> Option<TriangleHit>;
}

/// A navigation mesh ready to answer path queries.
#[derive(Debug, Clone)]
pub struct Navmesh {
    graph: NavmeshGraph,
    config: NavmeshConfig,
    heuristic: NavmeshHeuristic,
    pathfinder: Pathfinder,
}

impl Navmesh {
    /// Builds the graph of `trimesh` and prepares it for queries.
    pub fn new(trimesh: &TriMesh, config: NavmeshConfig) -> Result<Self, TriMeshError> {
        let graph = NavmeshGraph::with_up(trimesh, config.up)?;
        Ok(Self::from_graph(graph, config))
    }

    /// Wraps an existing graph.
    ///
    /// The graph's edges were oriented with [`NavmeshGraph::up`], which replaces `config.up`.
    pub fn from_graph(graph: NavmeshGraph, mut config: NavmeshConfig) -> Self {
        if config.up != graph.up() {
            tracing::debug!(
                config_up = %config.up,
                graph_up = %graph.up(),
                "Using the up axis of the graph instead of the configured one."
            );
            config.up = graph.up();
        }
        let pathfinder = Pathfinder::new(&graph).with_max_expansions(config.max_expansions);
        let heuristic = NavmeshHeuristic::new(config.heuristic);
        Self {
            graph,
            config,
            heuristic,
            pathfinder,
        }
    }

    /// The underlying graph.
    #[inline]
    pub fn graph(&self) -> &NavmeshGraph {
        &self.graph
    }

    /// The configuration the navmesh was created with.
    #[inline]
    pub fn config(&self) -> &NavmeshConfig {
        &self.config
    }

    /// The heuristic, including the log of triangles it was asked about.
    #[inline]
    pub fn heuristic(&self) -> &NavmeshHeuristic {
        &self.heuristic
    }

    /// Mutable access to the heuristic, e.g. to clear its log.
    #[inline]
    pub fn heuristic_mut(&mut self) -> &mut NavmeshHeuristic {
        &mut self.heuristic
    }

    /// Changes the heuristic used by subsequent searches.
    pub fn set_heuristic_kind(&mut self, kind: HeuristicKind) {
        self.heuristic.set_kind(kind);
        self.config.heuristic = kind;
    }

    /// Counters of the last search.
    #[inline]
    pub fn search_metrics(&self) -> SearchMetrics {
        self.pathfinder.metrics()
    }

    /// Searches a triangle corridor from `from_point` in `from_triangle` to `to_point` in
    /// `to_triangle`.
    ///
    /// Returns `false` and leaves `out_path` cleared if there is none.
    pub fn find_path(
        &mut self,
        from_triangle: TriangleId,
        from_point: Vec3A,
        to_triangle: TriangleId,
        to_point: Vec3A,
        out_path: &mut TrianglePath,
    ) -> bool {
        let found = self.pathfinder.search_connection_path(
            &self.graph,
            &mut self.heuristic,
            from_triangle,
            to_triangle,
            out_path,
        );
        if !found {
            tracing::debug!(?from_triangle, ?to_triangle, "Path not found.");
            return false;
        }
        out_path.start = from_point;
        out_path.end = to_point;
        out_path.start_triangle = Some(from_triangle);
        true
    }

    /// Like [`Navmesh::find_path`], but both endpoints are found by casting rays through
    /// `locator`.
    pub fn find_path_from_rays<L: TriangleLocator + ?Sized>(
        &mut self,
        locator: &L,
        from_ray: &Ray,
        to_ray: &Ray,
        parts: &MeshParts,
        max_distance: f32,
        out_path: &mut TrianglePath,
    ) -> bool {
        let Some(from) = locator.locate(from_ray, max_distance, parts) else {
            tracing::debug!(?from_ray, "Start triangle not found.");
            out_path.clear();
            return false;
        };
        self.find_path_from_triangle_to_ray(
            locator,
            from.triangle,
            from.point,
            to_ray,
            parts,
            max_distance,
            out_path,
        )
    }

    /// Like [`Navmesh::find_path`], but the end point is found by casting `to_ray` through
    /// `locator`.
    pub fn find_path_from_triangle_to_ray<L: TriangleLocator + ?Sized>(
        &mut self,
        locator: &L,
        from_triangle: TriangleId,
        from_point: Vec3A,
        to_ray: &Ray,
        parts: &MeshParts,
        max_distance: f32,
        out_path: &mut TrianglePath,
    ) -> bool {
        let Some(to) = locator.locate(to_ray, max_distance, parts) else {
            tracing::debug!(?to_ray, "End triangle not found.");
            out_path.clear();
            return false;
        };
        self.find_path(from_triangle, from_point, to.triangle, to.point, out_path)
    }

    /// Finds the triangle below or above `point` by casting a ray from half the probe height
    /// above it straight down.
    pub fn vertical_ray_test<L: TriangleLocator + ?Sized>(
        &self,
        locator: &L,
        point: Vec3A,
        parts: &MeshParts,
    ) -> Option<TriangleHit> {
        let ray = Ray::new(
            point + self.config.up * (self.config.probe_height * 0.5),
            -self.config.up,
        );
        locator.locate(&ray, self.config.probe_height, parts)
    }

    /// Reduces `path` to waypoints using the configured up axis.
    pub fn point_path(&self, path: &TrianglePath, out_path: &mut PointPath) {
        out_path.calculate(&self.graph, path, &self.config);
    }

    /// Picks a random triangle of the allowed mesh parts, weighted by area.
    ///
    /// Returns `None` if no allowed part has a triangle. If all allowed triangles are degenerate,
    /// the first one is returned.
    pub fn random_triangle<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        parts: &MeshParts,
    ) -> Option<TriangleId> {
        let mut total_area = 0.0;
        let cumulative: Vec<(f32, TriangleId)> = (0..self.graph.mesh_part_count())
            .filter(|&part| parts.contains(part))
            .flat_map(|part| self.graph.mesh_part_triangles(part))
            .map(|&triangle| {
                total_area += self.graph.triangle(triangle).area();
                (total_area, triangle)
            })
            .collect();
        let (_, last) = *cumulative.last()?;
        if total_area <= 0.0 {
            return cumulative.first().map(|&(_, triangle)| triangle);
        }

        let target = rng.gen_range(0.0..total_area);
        let index = cumulative.partition_point(|&(area, _)| area <= target);
        Some(cumulative.get(index).map_or(last, |&(_, triangle)| triangle))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::SeedableRng as _;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::{math::intersect_ray_triangle, test_meshes};

    /// Tests every triangle and keeps the closest hit.
    struct BruteForceLocator<'a>(&'a NavmeshGraph);

    impl TriangleLocator for BruteForceLocator<'_> {
        fn locate(&self, ray: &Ray, max_distance: f32, parts: &MeshParts) -> Option<TriangleHit> {
            self.0
                .triangles()
                .iter()
                .filter(|triangle| parts.contains(triangle.mesh_part_index()))
                .filter_map(|triangle| {
                    let [a, b, c] = triangle.positions();
                    let point = intersect_ray_triangle(ray, a, b, c)?;
                    let distance = point.distance(ray.origin) / ray.direction.length();
                    (distance <= max_distance).then_some((distance, triangle.graph_index(), point))
                })
                .min_by(|x, y| x.0.total_cmp(&y.0))
                .map(|(_, triangle, point)| TriangleHit { triangle, point })
        }
    }

    fn navmesh(mesh: TriMesh) -> Navmesh {
        Navmesh::new(&mesh, NavmeshConfig::default()).unwrap()
    }

    #[test]
    fn find_path_fills_in_endpoints() {
        let mut navmesh = navmesh(test_meshes::l_corridor());
        let mut path = TrianglePath::default();
        let start = Vec3A::new(2.8, 0.0, 0.5);
        let end = Vec3A::new(0.2, 0.0, 2.5);
        assert!(navmesh.find_path(TriangleId(0), start, TriangleId(2), end, &mut path));
        assert_eq!(path.start, start);
        assert_eq!(path.end, end);
        assert_eq!(path.start_triangle, Some(TriangleId(0)));
        assert_eq!(path.end_triangle(navmesh.graph()), Some(TriangleId(2)));
        assert_eq!(
            path.triangles(navmesh.graph()).collect::<Vec<_>>(),
            vec![TriangleId(0), TriangleId(1), TriangleId(2)]
        );
        assert!(navmesh.search_metrics().visited_nodes >= 3);

        let mut points = PointPath::new();
        navmesh.point_path(&path, &mut points);
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn wrapped_graph_keeps_its_up_axis() {
        let graph = NavmeshGraph::new(&test_meshes::l_corridor()).unwrap();
        assert_eq!(graph.up(), Vec3A::Y);
        let config = NavmeshConfig {
            up: Vec3A::Z,
            ..Default::default()
        };
        let mut navmesh = Navmesh::from_graph(graph, config);
        assert_eq!(navmesh.config().up, Vec3A::Y);

        let start = Vec3A::new(2.8, 0.0, 0.5);
        let end = Vec3A::new(0.2, 0.0, 2.5);
        let mut path = TrianglePath::default();
        assert!(navmesh.find_path(TriangleId(0), start, TriangleId(2), end, &mut path));
        let mut points = PointPath::new();
        navmesh.point_path(&path, &mut points);
        assert_eq!(
            points.positions().collect::<Vec<_>>(),
            vec![start, Vec3A::new(1.0, 0.0, 1.0), end]
        );
    }

    #[test]
    fn not_found_clears_path() {
        let mut navmesh = navmesh(test_meshes::two_islands());
        let mut path = TrianglePath::default();
        assert!(navmesh.find_path(
            TriangleId(0),
            Vec3A::new(3.0, 0.0, 0.5),
            TriangleId(1),
            Vec3A::new(0.5, 0.0, 1.5),
            &mut path
        ));
        assert!(!navmesh.find_path(
            TriangleId(0),
            Vec3A::new(3.0, 0.0, 0.5),
            TriangleId(2),
            Vec3A::new(10.5, 0.0, 10.5),
            &mut path
        ));
        assert!(path.is_empty());
        assert_eq!(path.start_triangle, None);
    }

    #[test]
    fn rays_are_resolved_through_the_locator() {
        let mut navmesh = navmesh(test_meshes::l_corridor());
        let graph = navmesh.graph().clone();
        let locator = BruteForceLocator(&graph);
        let from_ray = Ray::new(Vec3A::new(2.8, 5.0, 0.5), Vec3A::NEG_Y);
        let to_ray = Ray::new(Vec3A::new(0.2, 5.0, 2.5), Vec3A::NEG_Y);
        let mut path = TrianglePath::default();

        assert!(navmesh.find_path_from_rays(
            &locator,
            &from_ray,
            &to_ray,
            &MeshParts::All,
            10.0,
            &mut path
        ));
        assert_eq!(path.start_triangle, Some(TriangleId(0)));
        assert_eq!(path.end_triangle(&graph), Some(TriangleId(2)));
        assert_relative_eq!(path.start, Vec3A::new(2.8, 0.0, 0.5), epsilon = 1e-5);

        // Too short to reach the surface.
        assert!(!navmesh.find_path_from_rays(
            &locator,
            &from_ray,
            &to_ray,
            &MeshParts::All,
            1.0,
            &mut path
        ));
        assert!(path.is_empty());

        let missed = Ray::new(Vec3A::new(5.0, 5.0, 5.0), Vec3A::NEG_Y);
        assert!(!navmesh.find_path_from_triangle_to_ray(
            &locator,
            TriangleId(0),
            Vec3A::new(2.8, 0.0, 0.5),
            &missed,
            &MeshParts::All,
            10.0,
            &mut path
        ));
    }

    #[test]
    fn vertical_ray_test_respects_parts() {
        let navmesh = navmesh(test_meshes::two_islands());
        let locator = BruteForceLocator(navmesh.graph());
        let point = Vec3A::new(10.5, 3.0, 10.5);

        let hit = navmesh
            .vertical_ray_test(&locator, point, &MeshParts::All)
            .unwrap();
        assert_eq!(hit.triangle, TriangleId(2));
        assert_eq!(
            navmesh.vertical_ray_test(&locator, point, &MeshParts::Only(vec![0])),
            None
        );
    }

    #[test]
    fn random_triangle_is_weighted_and_respects_parts() {
        let navmesh = navmesh(test_meshes::two_islands());
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..50 {
            let triangle = navmesh
                .random_triangle(&mut rng, &MeshParts::Only(vec![1]))
                .unwrap();
            assert_eq!(triangle, TriangleId(2));
        }

        let mut counts = [0_usize; 3];
        for _ in 0..3000 {
            let triangle = navmesh.random_triangle(&mut rng, &MeshParts::All).unwrap();
            counts[triangle.0] += 1;
        }
        // Areas are 4, 4 and 2.
        assert!(counts[2] > 300 && counts[2] < 900, "{counts:?}");
        assert!(counts[0] > 900 && counts[1] > 900, "{counts:?}");

        assert_eq!(
            navmesh.random_triangle(&mut rng, &MeshParts::Only(vec![5])),
            None
        );
    }

    #[test]
    fn heuristic_can_be_switched() {
        let mut navmesh = navmesh(test_meshes::quad());
        navmesh.set_heuristic_kind(HeuristicKind::ClosestVertices);
        assert_eq!(navmesh.heuristic().kind(), HeuristicKind::ClosestVertices);
        assert_eq!(navmesh.config().heuristic, HeuristicKind::ClosestVertices);

        let mut path = TrianglePath::default();
        assert!(navmesh.find_path(
            TriangleId(0),
            Vec3A::new(3.0, 0.0, 0.5),
            TriangleId(1),
            Vec3A::new(0.5, 0.0, 1.5),
            &mut path
        ));
        assert!(!navmesh.heuristic().searched_nodes().is_empty());
        navmesh.heuristic_mut().clear_searched_nodes();
        assert!(navmesh.heuristic().searched_nodes().is_empty());
    }
}
