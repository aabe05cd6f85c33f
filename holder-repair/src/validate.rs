//! Mesh health reporting.
//!
//! The pipeline gates its output on this report: a holder that is not
//! watertight, not manifold, or inside-out will not slice correctly.

use hashbrown::HashSet;

use holder_mesh::TriMesh;

use crate::repair::canonical_rotation;
use crate::MeshAdjacency;

/// Faces with area below this count as degenerate in the report.
const DEGENERATE_AREA: f64 = 1e-12;

/// Validation results for a mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,
    /// Total number of distinct undirected edges.
    pub edge_count: usize,

    /// Edges with only one adjacent face.
    pub boundary_edge_count: usize,
    /// Edges with more than two adjacent faces.
    pub non_manifold_edge_count: usize,
    /// Faces with zero or near-zero area.
    pub degenerate_face_count: usize,
    /// Faces repeating an earlier face's vertex set.
    pub duplicate_face_count: usize,

    /// No boundary edges.
    pub is_watertight: bool,
    /// No non-manifold edges.
    pub is_manifold: bool,
    /// Signed volume is negative, normals point inward.
    pub is_inside_out: bool,
}

impl MeshReport {
    /// Whether the mesh can go to a slicer as-is.
    ///
    /// Printable means watertight, manifold, and outward-facing
    /// normals.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.is_watertight && self.is_manifold && !self.is_inside_out
    }

    /// Whether any issue counter is non-zero.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }

    /// Sum of all issue counters.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.boundary_edge_count
            + self.non_manifold_edge_count
            + self.degenerate_face_count
            + self.duplicate_face_count
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} vertices, {} faces, {} edges",
            self.vertex_count, self.face_count, self.edge_count
        )?;
        writeln!(
            f,
            "  watertight: {}, manifold: {}, winding: {}",
            yes_no(self.is_watertight),
            yes_no(self.is_manifold),
            if self.is_inside_out {
                "inside-out"
            } else {
                "outward"
            }
        )?;

        if self.has_issues() {
            writeln!(f, "  issues:")?;
            if self.boundary_edge_count > 0 {
                writeln!(f, "    boundary edges: {}", self.boundary_edge_count)?;
            }
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
            if self.degenerate_face_count > 0 {
                writeln!(f, "    degenerate faces: {}", self.degenerate_face_count)?;
            }
            if self.duplicate_face_count > 0 {
                writeln!(f, "    duplicate faces: {}", self.duplicate_face_count)?;
            }
        }

        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Validate a mesh and report its issues.
///
/// # Example
///
/// ```
/// use holder_mesh::{Point3, TriMesh};
/// use holder_repair::validate_mesh;
///
/// let mut mesh = TriMesh::new();
/// mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// let report = validate_mesh(&mesh);
/// assert_eq!(report.boundary_edge_count, 3);
/// assert!(!report.is_printable());
/// ```
#[must_use]
pub fn validate_mesh(mesh: &TriMesh) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);

    let degenerate_face_count = mesh
        .triangles()
        .filter(|tri| tri.is_degenerate(DEGENERATE_AREA))
        .count();

    MeshReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        edge_count: adjacency.edge_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        degenerate_face_count,
        duplicate_face_count: count_duplicate_faces(&mesh.faces),
        is_watertight: adjacency.is_watertight(),
        is_manifold: adjacency.is_manifold(),
        is_inside_out: !mesh.faces.is_empty() && mesh.is_inside_out(),
    }
}

fn count_duplicate_faces(faces: &[[u32; 3]]) -> usize {
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(faces.len());
    let mut duplicates = 0;

    for face in faces {
        let forward = canonical_rotation(*face);
        let backward = canonical_rotation([face[0], face[2], face[1]]);
        if seen.contains(&forward) || seen.contains(&backward) {
            duplicates += 1;
        } else {
            seen.insert(forward);
        }
    }

    duplicates
}
