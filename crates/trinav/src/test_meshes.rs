//! Small hand-made meshes shared by the unit tests. All of them lie in the XZ plane.

use glam::{UVec3, Vec3A};

use crate::TriMesh;

/// A 4 x 2 rectangle split along its diagonal from `(0, 0)` to `(4, 2)`.
/// Triangle 0 lies below the diagonal, triangle 1 above it.
pub(crate) fn quad() -> TriMesh {
    TriMesh::from_triangles(
        vec![
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(4.0, 0.0, 0.0),
            Vec3A::new(4.0, 0.0, 2.0),
            Vec3A::new(0.0, 0.0, 2.0),
        ],
        vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)],
    )
}

/// Three triangles fanned around the concave corner `(1, 0, 1)`.
/// The corridor runs from triangle 0 in the east leg to triangle 2 in the north leg.
pub(crate) fn l_corridor() -> TriMesh {
    TriMesh::from_triangles(
        vec![
            Vec3A::new(1.0, 0.0, 1.0),
            Vec3A::new(3.0, 0.0, 1.0),
            Vec3A::new(3.0, 0.0, 0.0),
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(0.0, 0.0, 3.0),
        ],
        vec![
            UVec3::new(0, 1, 2),
            UVec3::new(0, 2, 3),
            UVec3::new(0, 3, 4),
        ],
    )
}

/// A straight strip of `quads` unit squares along the x axis, two triangles each.
pub(crate) fn strip(quads: u32) -> TriMesh {
    let vertices = (0..=quads)
        .flat_map(|i| [Vec3A::new(i as f32, 0.0, 0.0), Vec3A::new(i as f32, 0.0, 1.0)])
        .collect();
    let indices = (0..quads)
        .flat_map(|i| {
            let base = 2 * i;
            [
                UVec3::new(base, base + 2, base + 1),
                UVec3::new(base + 1, base + 2, base + 3),
            ]
        })
        .collect();
    TriMesh::from_triangles(vertices, indices)
}

/// [`quad`] as part 0 and a lone triangle far away as part 1.
pub(crate) fn two_islands() -> TriMesh {
    let mut mesh = quad();
    mesh.parts[0].name = "ground".into();
    mesh.push_part(
        "island",
        [
            Vec3A::new(10.0, 0.0, 10.0),
            Vec3A::new(12.0, 0.0, 10.0),
            Vec3A::new(10.0, 0.0, 12.0),
        ],
        [UVec3::new(0, 1, 2)],
    )
    .unwrap();
    mesh
}

/// Four steps of two unit squares each, climbing from `(0, 0)` to `(5, 4)` in x and z.
/// The reflex corners `(2, 1)`, `(3, 2)` and `(4, 3)` of the lower boundary lie on one line.
/// Triangles are listed one after the other without shared indices.
pub(crate) fn staircase() -> TriMesh {
    const TRIANGLES: [[(f32, f32); 3]; 16] = [
        [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)],
        [(0.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
        [(1.0, 0.0), (2.0, 0.0), (1.0, 1.0)],
        [(2.0, 0.0), (2.0, 1.0), (1.0, 1.0)],
        [(1.0, 1.0), (2.0, 1.0), (1.0, 2.0)],
        [(2.0, 1.0), (2.0, 2.0), (1.0, 2.0)],
        [(2.0, 1.0), (3.0, 1.0), (2.0, 2.0)],
        [(3.0, 1.0), (3.0, 2.0), (2.0, 2.0)],
        [(2.0, 2.0), (3.0, 2.0), (2.0, 3.0)],
        [(3.0, 2.0), (3.0, 3.0), (2.0, 3.0)],
        [(3.0, 2.0), (4.0, 2.0), (4.0, 3.0)],
        [(3.0, 2.0), (4.0, 3.0), (3.0, 3.0)],
        [(3.0, 3.0), (4.0, 3.0), (4.0, 4.0)],
        [(3.0, 3.0), (4.0, 4.0), (3.0, 4.0)],
        [(4.0, 3.0), (5.0, 3.0), (5.0, 4.0)],
        [(4.0, 3.0), (5.0, 4.0), (4.0, 4.0)],
    ];
    let vertices = TRIANGLES
        .iter()
        .flatten()
        .map(|&(x, z)| Vec3A::new(x, 0.0, z))
        .collect();
    let indices = (0..TRIANGLES.len() as u32)
        .map(|i| UVec3::new(3 * i, 3 * i + 1, 3 * i + 2))
        .collect();
    TriMesh::from_triangles(vertices, indices)
}
