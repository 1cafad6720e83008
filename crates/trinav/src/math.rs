//! Geometry routines used by graph construction, the funnel and the navmesh facade.
//!
//! Everything in here is a pure function of its inputs. Degenerate input (zero-length segments,
//! zero-area triangles, rays parallel to a triangle) produces finite values or `None`, never NaN.

use glam::Vec3A;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb3d {
    /// The minimum corner
    pub min: Vec3A,
    /// The maximum corner
    pub max: Vec3A,
}

impl Aabb3d {
    /// Creates a new AABB from its corners.
    pub fn new(min: impl Into<Vec3A>, max: impl Into<Vec3A>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Computes the AABB enclosing all `verts`.
    /// Returns `None` if `verts` is empty.
    pub fn from_verts(verts: &[Vec3A]) -> Option<Self> {
        let mut iter = verts.iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((*first, *first), |(prev_min, prev_max), point| {
            (point.min(prev_min), point.max(prev_max))
        });
        Some(Self { min, max })
    }

    /// Returns `true` if `point` lies inside the box or on its boundary.
    #[inline]
    pub fn contains(&self, point: Vec3A) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// A half-line starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The start of the ray
    pub origin: Vec3A,
    /// The direction of the ray. Does not need to be normalized.
    pub direction: Vec3A,
}

impl Ray {
    /// Creates a new ray.
    pub fn new(origin: impl Into<Vec3A>, direction: impl Into<Vec3A>) -> Self {
        Self {
            origin: origin.into(),
            direction: direction.into(),
        }
    }

    /// Returns the point at parameter `t` along the ray.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3A {
        self.origin + self.direction * t
    }
}

/// Which side of a [`Plane`] a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneSide {
    /// The point lies exactly on the plane.
    OnPlane,
    /// The point lies on the side opposite to the normal.
    Back,
    /// The point lies on the side the normal points to.
    Front,
}

/// A plane in Hessian normal form: `normal · p + d = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    /// Unit normal of the plane, or zero for a degenerate plane
    pub normal: Vec3A,
    /// Distance term
    pub d: f32,
}

impl Plane {
    /// Builds the plane through three points. The normal is `(p1 - p2) × (p2 - p3)`, normalized.
    ///
    /// Collinear points produce a degenerate plane with a zero normal, on which every point
    /// reports [`PlaneSide::OnPlane`].
    pub fn from_points(p1: Vec3A, p2: Vec3A, p3: Vec3A) -> Self {
        let normal = (p1 - p2).cross(p2 - p3).normalize_or_zero();
        Self {
            normal,
            d: -p1.dot(normal),
        }
    }

    /// Returns the same plane facing the other way.
    #[inline]
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    /// Signed distance from `point` to the plane.
    #[inline]
    pub fn distance(&self, point: Vec3A) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Classifies `point` against the plane.
    #[inline]
    pub fn side(&self, point: Vec3A) -> PlaneSide {
        let distance = self.distance(point);
        if distance == 0.0 {
            PlaneSide::OnPlane
        } else if distance < 0.0 {
            PlaneSide::Back
        } else {
            PlaneSide::Front
        }
    }

    /// Intersects the segment `start..end` with the plane.
    /// Returns `None` if the segment is parallel to the plane or does not reach it.
    pub fn intersect_segment(&self, start: Vec3A, end: Vec3A) -> Option<Vec3A> {
        let direction = end - start;
        let denom = direction.dot(self.normal);
        if denom == 0.0 {
            return None;
        }
        let t = -(start.dot(self.normal) + self.d) / denom;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        let intersection = start + direction * t;
        intersection.is_finite().then_some(intersection)
    }
}

/// Finds the point on the segment `start..end` nearest to `point`.
///
/// Returns the squared distance between `point` and the nearest point, and the nearest point
/// itself. A zero-length segment yields `start`.
pub fn nearest_segment_point_squared_distance(
    start: Vec3A,
    end: Vec3A,
    point: Vec3A,
) -> (f32, Vec3A) {
    let ab = end - start;
    let ab_len2 = ab.length_squared();
    let nearest = if ab_len2 > 0.0 {
        let t = (point - start).dot(ab) / ab_len2;
        start + ab * t.clamp(0.0, 1.0)
    } else {
        start
    };
    (nearest.distance_squared(point), nearest)
}

/// Finds the point on the triangle `a, b, c` closest to `p`.
///
/// Classifies `p` into one of the seven Voronoi regions of the triangle (three vertex regions,
/// three edge regions, the face) and reconstructs the face case from barycentric coordinates.
/// See Ericson, "Real-Time Collision Detection", 5.1.5.
///
/// Returns the squared distance between `p` and the closest point, and the closest point.
pub fn closest_point_on_triangle(a: Vec3A, b: Vec3A, c: Vec3A, p: Vec3A) -> (f32, Vec3A) {
    let ab = b - a;
    let ac = c - a;

    // Vertex region outside A
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (p.distance_squared(a), a);
    }

    // Vertex region outside B
    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (p.distance_squared(b), b);
    }

    // Edge region of AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        let closest = a + ab * v;
        return (p.distance_squared(closest), closest);
    }

    // Vertex region outside C
    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (p.distance_squared(c), c);
    }

    // Edge region of AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        let closest = a + ac * w;
        return (p.distance_squared(closest), closest);
    }

    // Edge region of BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        let closest = b + (c - b) * w;
        return (p.distance_squared(closest), closest);
    }

    // Face region
    let denom = va + vb + vc;
    if denom == 0.0 || !denom.is_finite() {
        // Zero-area triangle: the closest point lies on one of its sides.
        return [(a, b), (b, c), (c, a)]
            .into_iter()
            .map(|(start, end)| nearest_segment_point_squared_distance(start, end, p))
            .fold((f32::INFINITY, a), |best, candidate| {
                if candidate.0 < best.0 { candidate } else { best }
            });
    }
    let v = vb / denom;
    let w = vc / denom;
    let closest = a + ab * v + ac * w;
    (p.distance_squared(closest), closest)
}

/// Intersects a ray with the triangle `a, b, c`, regardless of the triangle's facing.
///
/// Points on the triangle's boundary count as hits.
/// Returns the intersection point, or `None` if the ray misses or runs parallel to the triangle.
pub fn intersect_ray_triangle(ray: &Ray, a: Vec3A, b: Vec3A, c: Vec3A) -> Option<Vec3A> {
    const PARALLEL_EPSILON: f32 = 1e-12;

    let edge1 = b - a;
    let edge2 = c - a;
    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < PARALLEL_EPSILON || !det.is_finite() {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - a;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < 0.0 {
        return None;
    }
    Some(ray.point_at(t))
}
