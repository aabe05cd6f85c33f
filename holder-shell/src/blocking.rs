//! Blocking-face removal.
//!
//! After hulling, the holder is a closed convex solid. The source object
//! has to slide into it from above, so every face whose outward normal
//! has an upward component is in the way and gets deleted. What remains
//! is an open shell: the underside and the vertical sides, including the
//! port tab (its deliberate tilt keeps its faces clear of the exactly
//! vertical boundary case).

use holder_mesh::{Transform3D, TriMesh, Vector3};
use holder_repair::remove_unreferenced_vertices;
use tracing::debug;

use crate::error::{ShellError, ShellResult};

/// Normal z-components within this tolerance of zero count as exactly
/// vertical, which is not blocking.
const VERTICAL_TOLERANCE: f64 = 1e-9;

/// Delete every face whose outward normal points less than 90 degrees
/// from world-up.
///
/// A face at exactly 90 degrees (a vertical wall) is kept. When the mesh
/// carries its own rotation that has not been baked into the vertices,
/// pass it as `world_rotation` so normals are judged in world space.
///
/// Vertices whose every incident face was blocking are deleted along
/// with the faces; leaving them behind would hand downstream stages
/// points that belong to no surface.
///
/// Returns the number of faces removed.
///
/// # Errors
///
/// - [`ShellError::EmptyMesh`] if the input has no geometry
/// - [`ShellError::NoShellRemains`] if every face was blocking, which
///   means nothing is left to thicken
///
/// # Example
///
/// ```
/// use holder_mesh::{cuboid, Point3, Vector3};
/// use holder_shell::remove_blocking_faces;
///
/// let mut solid = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));
/// let removed = remove_blocking_faces(&mut solid, None)?;
///
/// // Only the two top triangles face upward; the sides are exactly
/// // vertical and stay.
/// assert_eq!(removed, 2);
/// assert_eq!(solid.face_count(), 10);
/// # Ok::<(), holder_shell::ShellError>(())
/// ```
pub fn remove_blocking_faces(
    mesh: &mut TriMesh,
    world_rotation: Option<&Transform3D>,
) -> ShellResult<usize> {
    if mesh.is_empty() {
        return Err(ShellError::EmptyMesh {
            details: "blocking-face removal input has no geometry".to_string(),
        });
    }

    let before = mesh.face_count();
    let vertices = std::mem::take(&mut mesh.vertices);

    mesh.faces.retain(|&[i0, i1, i2]| {
        let v0 = vertices[i0 as usize];
        let v1 = vertices[i1 as usize];
        let v2 = vertices[i2 as usize];

        let mut normal = (v1 - v0).cross(&(v2 - v0));
        if let Some(rotation) = world_rotation {
            normal = rotation.transform_vector(normal);
        }

        !is_blocking(&normal)
    });

    mesh.vertices = vertices;

    let removed = before - mesh.face_count();
    if mesh.faces.is_empty() {
        return Err(ShellError::NoShellRemains { removed });
    }

    let stranded = remove_unreferenced_vertices(mesh);

    debug!(
        removed,
        stranded,
        remaining = mesh.face_count(),
        "blocking faces removed"
    );
    Ok(removed)
}

/// A face blocks insertion when its normal has any upward component,
/// i.e. its angle to world-up is strictly less than 90 degrees.
fn is_blocking(normal: &Vector3<f64>) -> bool {
    let length = normal.norm();
    if length < f64::EPSILON {
        // Degenerate faces do not block; repair passes deal with them.
        return false;
    }
    normal.z / length > VERTICAL_TOLERANCE
}
