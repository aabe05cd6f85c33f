//! Ray casting and point-in-mesh queries.
//!
//! These queries back the face classification used by [`crate::union`]: a
//! face belongs to the union boundary when its centroid lies outside the
//! other solid.

use holder_mesh::{Point3, TriMesh, Vector3};

/// Default epsilon for ray and containment queries.
pub const DEFAULT_QUERY_EPSILON: f64 = 1e-10;

/// Ray-triangle intersection using the Möller-Trumbore algorithm.
///
/// # Arguments
///
/// * `origin` - Ray origin point
/// * `direction` - Ray direction (need not be normalized)
/// * `v0`, `v1`, `v2` - Triangle vertices
/// * `epsilon` - Tolerance for parallelism and self-intersection
///
/// # Returns
///
/// The ray parameter `t` of the hit (`origin + t * direction`), or `None`
/// if the ray misses, is parallel to the triangle plane, or hits behind
/// the origin.
#[must_use]
pub fn ray_triangle_intersect(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
    epsilon: f64,
) -> Option<f64> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Ray parallel to triangle plane
    if a.abs() < epsilon {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    if t > epsilon {
        Some(t)
    } else {
        None
    }
}

/// Test whether a point lies inside a closed mesh by ray-crossing parity.
///
/// Casts a ray from `point` along `direction` and counts triangle
/// crossings; an odd count means the point is inside. The mesh must be
/// closed for the result to be meaningful.
///
/// A single ray can graze an edge or vertex and miscount; prefer
/// [`point_in_mesh_robust`] when the query point may sit close to mesh
/// features.
#[must_use]
pub fn point_in_mesh(
    point: &Point3<f64>,
    mesh: &TriMesh,
    direction: &Vector3<f64>,
    epsilon: f64,
) -> bool {
    let mut crossings = 0usize;

    for tri in mesh.triangles() {
        if ray_triangle_intersect(point, direction, &tri.v0, &tri.v1, &tri.v2, epsilon).is_some() {
            crossings += 1;
        }
    }

    crossings % 2 == 1
}

/// Robust point-in-mesh test by majority vote.
///
/// Casts rays along +X, +Y, and +Z and takes the majority verdict. Two
/// independent rays rarely graze mesh features at the same query point,
/// so this filters the double-count failure mode of a single ray.
#[must_use]
pub fn point_in_mesh_robust(point: &Point3<f64>, mesh: &TriMesh, epsilon: f64) -> bool {
    let axes = [Vector3::x(), Vector3::y(), Vector3::z()];

    let votes = axes
        .iter()
        .filter(|direction| point_in_mesh(point, mesh, direction, epsilon))
        .count();

    votes >= 2
}
