//! Shell thickening.
//!
//! An open shell has no wall: it is a bare surface. Thickening offsets
//! every vertex along its area-weighted normal to build an outer
//! surface, keeps the original as the inner surface with reversed
//! winding, and stitches the two together with a rim of quads along
//! every boundary loop. The opening the loops bound stays open; it is
//! rimmed, never capped.

#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use holder_mesh::{TriMesh, Vector3};
use holder_repair::{trace_boundary_loops, MeshAdjacency};
use tracing::{debug, info, warn};

use crate::error::{ShellError, ShellResult};

/// Counts describing a thickening run.
#[derive(Debug, Clone, Default)]
pub struct ThickenSummary {
    /// Vertices on the inner surface.
    pub inner_vertex_count: usize,
    /// Vertices on the outer surface (equal to inner; 1:1 offset).
    pub outer_vertex_count: usize,
    /// Rim faces stitched along the boundary loops.
    pub rim_face_count: usize,
    /// Closed boundary loops found on the input shell.
    pub boundary_loop_count: usize,
    /// Faces in the thickened result.
    pub total_face_count: usize,
}

/// Thicken an open shell into a solid wall of the given thickness.
///
/// Positive thickness pushes the outer surface outward along the shell's
/// normals; negative thickness grows the wall inward. The inner surface
/// is the input shell with reversed winding, so the wall's enclosed
/// volume lies between the two surfaces.
///
/// # Errors
///
/// - [`ShellError::EmptyMesh`] if the input has no geometry
/// - [`ShellError::InvalidThickness`] if `thickness` is zero
///
/// # Example
///
/// ```
/// use holder_mesh::{cuboid, Point3, Vector3};
/// use holder_shell::{remove_blocking_faces, thicken_shell};
///
/// let mut shell = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(10.0, 10.0, 10.0));
/// remove_blocking_faces(&mut shell, None)?;
///
/// let (wall, summary) = thicken_shell(&shell, 1.0)?;
/// assert_eq!(summary.boundary_loop_count, 1);
/// assert!(wall.face_count() > shell.face_count() * 2);
/// # Ok::<(), holder_shell::ShellError>(())
/// ```
pub fn thicken_shell(shell: &TriMesh, thickness: f64) -> ShellResult<(TriMesh, ThickenSummary)> {
    if shell.is_empty() {
        return Err(ShellError::EmptyMesh {
            details: "thickening input has no geometry".to_string(),
        });
    }
    if thickness.abs() < f64::EPSILON {
        return Err(ShellError::InvalidThickness { value: thickness });
    }

    let n = shell.vertex_count();
    let normals = vertex_normals(shell);

    let mut wall = TriMesh::with_capacity(n * 2, shell.face_count() * 2);

    // Inner surface: the shell itself, wound toward the cavity.
    wall.vertices.extend(shell.vertices.iter().copied());
    for face in &shell.faces {
        wall.faces.push([face[0], face[2], face[1]]);
    }

    // Outer surface: offset 1:1 along vertex normals, original winding.
    for (vertex, normal) in shell.vertices.iter().zip(&normals) {
        wall.vertices.push(vertex + normal * thickness);
    }
    let offset = n as u32;
    for face in &shell.faces {
        wall.faces
            .push([face[0] + offset, face[1] + offset, face[2] + offset]);
    }

    debug!(inner = n, outer = n, "shell surfaces built");

    let adjacency = MeshAdjacency::build(&shell.faces);
    let loops = trace_boundary_loops(&adjacency);
    if loops.is_empty() {
        warn!("shell has no boundary loops, thickening a closed surface");
    }

    let rim_face_count = stitch_rim(shell, &adjacency, offset, &mut wall);

    let summary = ThickenSummary {
        inner_vertex_count: n,
        outer_vertex_count: n,
        rim_face_count,
        boundary_loop_count: loops.len(),
        total_face_count: wall.face_count(),
    };

    info!(
        vertices = wall.vertex_count(),
        faces = wall.face_count(),
        rim_faces = rim_face_count,
        loops = loops.len(),
        thickness,
        "shell thickened"
    );

    Ok((wall, summary))
}

/// Area-weighted vertex normals: each face's unnormalized cross product
/// (twice its area times its unit normal) accumulates onto its corners.
fn vertex_normals(mesh: &TriMesh) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); mesh.vertex_count()];

    for face in &mesh.faces {
        let v0 = mesh.vertices[face[0] as usize];
        let v1 = mesh.vertices[face[1] as usize];
        let v2 = mesh.vertices[face[2] as usize];

        let weighted = (v1 - v0).cross(&(v2 - v0));
        for &index in face {
            normals[index as usize] += weighted;
        }
    }

    for normal in &mut normals {
        let length = normal.norm();
        if length > 1e-12 {
            *normal /= length;
        } else {
            // Isolated or degenerate-only vertices fall back to up.
            *normal = Vector3::z();
        }
    }

    normals
}

/// Quad-stitch each boundary edge of the inner surface to its offset
/// twin on the outer surface. Edges are walked in the winding order of
/// the face that owns them so the rim faces outward.
fn stitch_rim(
    shell: &TriMesh,
    adjacency: &MeshAdjacency,
    offset: u32,
    wall: &mut TriMesh,
) -> usize {
    // An undirected boundary edge appears in exactly one face; find its
    // directed form from that face.
    let mut boundary: HashMap<(u32, u32), ()> = HashMap::new();
    for (a, b) in adjacency.boundary_edges() {
        boundary.insert(ordered(a, b), ());
    }

    let mut rim_faces = 0usize;
    for face in &shell.faces {
        for i in 0..3 {
            let a = face[i];
            let b = face[(i + 1) % 3];
            if boundary.contains_key(&ordered(a, b)) {
                wall.faces.push([a, a + offset, b + offset]);
                wall.faces.push([a, b + offset, b]);
                rim_faces += 2;
            }
        }
    }

    rim_faces
}

#[inline]
const fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
