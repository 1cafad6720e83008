use glam::Vec3A;

use crate::HeuristicKind;

/// Specifies how a [`Navmesh`](crate::Navmesh) searches and smooths paths. Usually built using
/// [`NavmeshConfigBuilder`].
///
/// Units are world units (wu).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct NavmeshConfig {
    /// The up axis of the world. `[Limit: normalized]`
    ///
    /// Decides which endpoint of a shared side is left and which is right, which direction the
    /// funnel planes extend in, and which way point probes are cast.
    pub up: Vec3A,

    /// The length of vertical probes. `[Limit: > 0] [Units: wu]`
    ///
    /// When checking whether a start point lies on its triangle, a ray is cast from
    /// `probe_height` above the point straight down. Point lookups through a
    /// [`TriangleLocator`](crate::TriangleLocator) start half of it above the point and reach as
    /// far below it.
    pub probe_height: f32,

    /// The maximum number of triangles a single search may expand. `None` means unlimited.
    ///
    /// Searches that hit the limit report that no path exists.
    pub max_expansions: Option<usize>,

    /// The heuristic guiding the search.
    pub heuristic: HeuristicKind,
}

impl Default for NavmeshConfig {
    fn default() -> Self {
        NavmeshConfigBuilder::default().build()
    }
}

/// A builder for [`NavmeshConfig`].
/// The default values are chosen for worlds where walkable surfaces are less than 500 units
/// above or below any point you query with.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct NavmeshConfigBuilder {
    /// The up axis of the world. Does not need to be normalized.
    /// A zero vector falls back to [`Vec3A::Y`].
    pub up: Vec3A,
    /// The largest vertical distance between a queried point and the surface below or above it.
    /// `[Limit: > 0] [Units: wu]`
    pub max_height_difference: f32,
    /// The maximum number of triangles a single search may expand. `None` means unlimited.
    pub max_expansions: Option<usize>,
    /// The heuristic guiding the search.
    pub heuristic: HeuristicKind,
}

impl Default for NavmeshConfigBuilder {
    fn default() -> Self {
        Self {
            up: Vec3A::Y,
            max_height_difference: 500.0,
            max_expansions: None,
            heuristic: HeuristicKind::default(),
        }
    }
}

impl NavmeshConfigBuilder {
    /// Builds a [`NavmeshConfig`] from the current configuration.
    pub fn build(self) -> NavmeshConfig {
        NavmeshConfig {
            up: self.up.try_normalize().unwrap_or(Vec3A::Y),
            probe_height: (self.max_height_difference.abs() * 2.0).max(f32::EPSILON),
            max_expansions: self.max_expansions,
            heuristic: self.heuristic,
        }
    }
}
