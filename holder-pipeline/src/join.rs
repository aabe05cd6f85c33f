//! Holder/hanger joining.
//!
//! The holder's port tab and the hanger's mating face are disjoint
//! solids facing each other. Concatenating both meshes and re-hulling
//! the entire combined point set synthesizes a solid connecting arm
//! across the gap. The trade-off is documented and accepted: hulling
//! also covers unrelated concavities, but both parts are designed so
//! their connecting faces are locally convex and facing each other,
//! leaving the gap region as the main beneficiary.
//!
//! After hulling, a repair pass makes the result print-valid: globally
//! consistent outward winding, welded seam vertices, no degenerate or
//! duplicate faces, and a hard manifold gate at the end.

use holder_csg::{convex_hull, CsgError};
use holder_mesh::TriMesh;
use holder_repair::{fix_winding_order, repair_mesh, MeshAdjacency, RepairParams};
use tracing::{debug, warn};

use crate::error::{HolderError, HolderResult};
use crate::port::PortVertices;

/// Vertices closer than this to a selected port position count as that
/// port vertex surviving the hull.
const PORT_SURVIVAL_EPSILON: f64 = 1e-6;

/// Join the holder and hanger into one printable solid.
///
/// Merges the meshes without welding, hulls the combined point set, and
/// repairs the result. The port clusters selected earlier are checked
/// against the hull's vertices: a port vertex that vanished means the
/// hull swallowed part of the attachment interface, which is logged but
/// not fatal (the arm still spans the gap).
///
/// # Errors
///
/// - [`HolderError::DegenerateGeometry`] if the combined point set does
///   not span a volume
/// - [`HolderError::NonManifoldResult`] if repair cannot produce a
///   manifold mesh
pub fn join_holder_and_hanger(
    holder: &TriMesh,
    hanger: &TriMesh,
    holder_port: &PortVertices,
    hanger_port: &PortVertices,
) -> HolderResult<TriMesh> {
    let mut combined = holder.clone();
    combined.merge(hanger);

    let mut joined = convex_hull(&combined).map_err(|e| match e {
        CsgError::DegenerateGeometry { details } | CsgError::EmptyResult { details } => {
            HolderError::DegenerateGeometry { reason: details }
        }
        CsgError::EmptyMesh { details } | CsgError::OpenCrossSection { details } => {
            HolderError::InvalidMesh { reason: details }
        }
    })?;

    let summary = repair_mesh(&mut joined, &RepairParams::default());
    if summary.had_changes() {
        debug!(%summary, "joined mesh cleaned");
    }

    if let Err(e) = fix_winding_order(&mut joined) {
        let adjacency = MeshAdjacency::build(&joined.faces);
        warn!(error = %e, "winding repair failed on joined mesh");
        return Err(HolderError::NonManifoldResult {
            non_manifold_edges: adjacency.non_manifold_edge_count(),
        });
    }

    let adjacency = MeshAdjacency::build(&joined.faces);
    let non_manifold_edges = adjacency.non_manifold_edge_count();
    if non_manifold_edges > 0 {
        return Err(HolderError::NonManifoldResult { non_manifold_edges });
    }

    let surviving =
        count_surviving(holder_port, &joined) + count_surviving(hanger_port, &joined);
    if surviving < 8 {
        warn!(
            surviving,
            "hull swallowed part of the port interface; arm still spans the gap"
        );
    } else {
        debug!(surviving, "all port vertices survive on the joined hull");
    }

    Ok(joined)
}

/// How many of the cluster's positions appear among the mesh vertices.
fn count_surviving(port: &PortVertices, mesh: &TriMesh) -> usize {
    port.positions
        .iter()
        .filter(|p| {
            mesh.vertices
                .iter()
                .any(|v| (*p - v).norm() < PORT_SURVIVAL_EPSILON)
        })
        .count()
}
