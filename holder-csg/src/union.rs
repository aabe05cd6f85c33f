//! Mesh union via inside/outside face classification.
//!
//! Keeps the faces of each solid that lie outside the other and
//! concatenates them. The seam where the two surfaces cross is not
//! retriangulated: in the holder pipeline a convex hull immediately
//! follows the union and consumes only the vertex set, so seam-exact
//! stitching would be discarded work.

use crate::error::{CsgError, CsgResult};
use crate::query::{point_in_mesh_robust, DEFAULT_QUERY_EPSILON};
use holder_mesh::TriMesh;
use tracing::debug;

/// Boolean union of two closed meshes by face classification.
///
/// A face of one solid survives unless it lies inside the other: a face
/// of `base` is dropped when all three of its vertices and its centroid
/// are inside `tool`, and symmetrically for `tool` against `base`.
/// Non-overlapping solids therefore union to their plain concatenation.
///
/// Both inputs must be closed for the containment queries to be
/// meaningful.
///
/// # Errors
///
/// - [`CsgError::EmptyMesh`] if either input has no geometry
/// - [`CsgError::EmptyResult`] if classification drops every face,
///   which indicates the inputs were not valid closed solids
///
/// # Example
///
/// ```
/// use holder_csg::union_meshes;
/// use holder_mesh::{cuboid, Point3, Vector3};
///
/// let a = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));
/// let b = cuboid(Point3::new(5.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));
///
/// // Disjoint solids: the union keeps every face of both.
/// let joined = union_meshes(&a, &b)?;
/// assert_eq!(joined.face_count(), 24);
/// # Ok::<(), holder_csg::CsgError>(())
/// ```
pub fn union_meshes(base: &TriMesh, tool: &TriMesh) -> CsgResult<TriMesh> {
    if base.is_empty() {
        return Err(CsgError::EmptyMesh {
            details: "union base mesh has no geometry".to_string(),
        });
    }
    if tool.is_empty() {
        return Err(CsgError::EmptyMesh {
            details: "union tool mesh has no geometry".to_string(),
        });
    }

    let base_kept = keep_outside_faces(base, tool);
    let tool_kept = keep_outside_faces(tool, base);

    let base_dropped = base.face_count() - base_kept.face_count();
    let tool_dropped = tool.face_count() - tool_kept.face_count();

    let mut result = base_kept;
    result.merge(&tool_kept);

    if result.is_empty() {
        return Err(CsgError::EmptyResult {
            details: "union classification dropped every face of both inputs".to_string(),
        });
    }

    debug!(
        base_dropped,
        tool_dropped,
        result_faces = result.face_count(),
        "meshes unioned"
    );

    Ok(result)
}

/// The faces of `mesh` that are not buried inside `other`, with the
/// vertex set compacted to the kept faces.
fn keep_outside_faces(mesh: &TriMesh, other: &TriMesh) -> TriMesh {
    // Classify each vertex once; faces share the verdicts.
    let inside: Vec<bool> = mesh
        .vertices
        .iter()
        .map(|v| point_in_mesh_robust(v, other, DEFAULT_QUERY_EPSILON))
        .collect();

    let mut kept = TriMesh::new();
    let mut vertex_map: Vec<Option<u32>> = vec![None; mesh.vertex_count()];

    for (face_index, face) in mesh.faces.iter().enumerate() {
        let all_vertices_inside = face.iter().all(|&i| inside[i as usize]);
        if all_vertices_inside {
            // A large face can have all corners inside while its middle
            // pokes out; the centroid settles it.
            if let Some(tri) = mesh.triangle(face_index) {
                if point_in_mesh_robust(&tri.centroid(), other, DEFAULT_QUERY_EPSILON) {
                    continue;
                }
            }
        }

        let mapped = face.map(|i| remap(i, mesh, &mut kept, &mut vertex_map));
        kept.faces.push(mapped);
    }

    kept
}

#[allow(clippy::cast_possible_truncation)]
fn remap(index: u32, source: &TriMesh, target: &mut TriMesh, map: &mut [Option<u32>]) -> u32 {
    if let Some(mapped) = map[index as usize] {
        return mapped;
    }
    let new_index = target.vertices.len() as u32;
    target.vertices.push(source.vertices[index as usize]);
    map[index as usize] = Some(new_index);
    new_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use holder_mesh::{cuboid, Point3, Vector3};

    #[test]
    fn disjoint_union_concatenates() {
        let a = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));
        let b = cuboid(Point3::new(10.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));

        let joined = union_meshes(&a, &b).unwrap();
        assert_eq!(joined.vertex_count(), 16);
        assert_eq!(joined.face_count(), 24);
    }

    #[test]
    fn contained_tool_vanishes() {
        let big = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(10.0, 10.0, 10.0));
        let small = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));

        let joined = union_meshes(&big, &small).unwrap();
        assert_eq!(joined.face_count(), big.face_count());
        assert!((joined.volume() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn overlapping_union_drops_buried_faces() {
        let a = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 4.0, 4.0));
        // Shifted so one face of each lands inside the other
        let b = cuboid(Point3::new(3.0, 0.0, 0.0), Vector3::new(4.0, 4.0, 4.0));

        let joined = union_meshes(&a, &b).unwrap();
        assert!(joined.face_count() < a.face_count() + b.face_count());
        assert!(joined.face_count() >= 12);
    }

    #[test]
    fn empty_base_rejected() {
        let tool = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let result = union_meshes(&TriMesh::new(), &tool);
        assert!(matches!(result, Err(CsgError::EmptyMesh { .. })));
    }

    #[test]
    fn empty_tool_rejected() {
        let base = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let result = union_meshes(&base, &TriMesh::new());
        assert!(matches!(result, Err(CsgError::EmptyMesh { .. })));
    }

    #[test]
    fn tangent_port_tab_keeps_all_faces() {
        // The pipeline's port cuboid sits just outside the holder surface
        let body = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(10.0, 10.0, 10.0));
        let tab = cuboid(Point3::new(5.6, 0.0, 0.0), Vector3::new(1.0, 2.5, 2.5));

        let joined = union_meshes(&body, &tab).unwrap();
        assert_eq!(joined.face_count(), 24);

        let bounds = joined.bounds();
        assert!((bounds.max.x - 6.1).abs() < 1e-9);
    }
}
