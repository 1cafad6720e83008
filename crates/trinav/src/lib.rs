#![doc = include_str!("../../../readme.md")]

mod config;
mod edge;
mod funnel;
mod graph;
mod heuristic;
pub mod math;
mod navmesh;
mod path;
mod pathfinder;
#[cfg(test)]
mod test_meshes;
mod triangle;
mod trimesh;
mod vertex;

pub use config::{NavmeshConfig, NavmeshConfigBuilder};
pub use edge::{Edge, EdgeId};
pub use graph::NavmeshGraph;
pub use heuristic::{HeuristicKind, NavmeshHeuristic};
pub use math::Aabb3d;
pub use navmesh::{MeshParts, Navmesh, TriangleHit, TriangleLocator};
pub use path::{EdgeCrossing, PathPoint, PointPath, TrianglePath};
pub use pathfinder::{Pathfinder, SearchMetrics};
pub use triangle::{Sides, Triangle, TriangleId, TriangleSide};
pub use trimesh::{MeshPart, TriMesh, TriMeshError};
pub use vertex::{Vertex, VertexKey};
