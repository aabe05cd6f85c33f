//! Winding-order repair.
//!
//! Joining two independently generated meshes and re-hulling them can
//! leave faces wound inconsistently. Consistent winding means every
//! shared edge is traversed in opposite directions by its two faces;
//! on top of that the whole surface must face outward.

use std::collections::VecDeque;

use hashbrown::HashMap;
use tracing::debug;

use holder_mesh::TriMesh;

use crate::{MeshAdjacency, RepairError, RepairResult};

/// Count edges whose two faces traverse them in the same direction.
///
/// Zero means the winding is consistent (though possibly inside-out as
/// a whole).
#[must_use]
pub fn count_inconsistent_edges(mesh: &TriMesh) -> usize {
    let mut directed: HashMap<(u32, u32), u32> = HashMap::with_capacity(mesh.faces.len() * 3);

    for face in &mesh.faces {
        for i in 0..3 {
            let edge = (face[i], face[(i + 1) % 3]);
            *directed.entry(edge).or_insert(0) += 1;
        }
    }

    // A consistently wound edge appears once per direction. The same
    // directed edge twice means its faces agree on direction.
    directed.values().filter(|&&count| count > 1).count()
}

/// Make face winding consistent and outward-facing.
///
/// Walks each connected component from a seed face, flipping faces
/// that traverse a shared edge in the same direction as their already
/// oriented neighbor. A component that ends up inside-out (negative
/// signed volume) is then flipped wholesale.
///
/// Returns the number of faces whose winding changed.
///
/// # Errors
///
/// Returns [`RepairError::NonManifold`] when an edge has more than two
/// faces, since orientation cannot propagate across such an edge.
pub fn fix_winding_order(mesh: &mut TriMesh) -> RepairResult<usize> {
    if mesh.faces.is_empty() {
        return Ok(0);
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    let non_manifold = adjacency.non_manifold_edge_count();
    if non_manifold > 0 {
        return Err(RepairError::NonManifold {
            details: format!("{non_manifold} edges shared by more than two faces"),
        });
    }

    let face_count = mesh.faces.len();
    let mut flip = vec![false; face_count];
    let mut visited = vec![false; face_count];
    let mut queue = VecDeque::new();

    for seed in 0..face_count {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            let face = oriented(mesh.faces[current], flip[current]);
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                if let Some(shared) = adjacency.faces_for_edge(a, b) {
                    for &neighbor in shared {
                        if neighbor == current || visited[neighbor] {
                            continue;
                        }
                        // Consistent neighbors traverse the shared edge
                        // in the opposite direction.
                        flip[neighbor] = traverses(mesh.faces[neighbor], a, b);
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    let mut flipped = 0usize;
    for (face, needs_flip) in mesh.faces.iter_mut().zip(&flip) {
        if *needs_flip {
            face.swap(1, 2);
            flipped += 1;
        }
    }

    // Consistent winding can still point inward everywhere.
    let mut changed = flipped;
    if mesh.is_inside_out() {
        mesh.flip_normals();
        changed = face_count - flipped;
    }

    if changed > 0 {
        debug!(faces_reoriented = changed, "fixed winding order");
    }

    Ok(changed)
}

/// Face as it reads after an optional flip.
fn oriented(face: [u32; 3], flipped: bool) -> [u32; 3] {
    if flipped {
        [face[0], face[2], face[1]]
    } else {
        face
    }
}

/// Whether the face contains the directed edge `a -> b`.
fn traverses(face: [u32; 3], a: u32, b: u32) -> bool {
    (face[0] == a && face[1] == b)
        || (face[1] == a && face[2] == b)
        || (face[2] == a && face[0] == b)
}
