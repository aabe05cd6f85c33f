//! Port-vertex selection.
//!
//! The holder's port tab and the hanger's mating face each contribute a
//! small cluster of four vertices that the joiner must bridge. Both
//! clusters sit at an x extreme: the holder's at maximum x (the tab
//! points +x), the hanger's at minimum x (its mating face looks back at
//! the holder).
//!
//! The two roles select differently. Hanger assets are controlled
//! geometry, so the first four vertices in ascending-x order are the
//! mating corners. The holder's tab tip, after the union and hull,
//! can carry many nearly coincident seam vertices; a greedy spacing
//! walk keeps the four selected points spread over the tab's real
//! footprint instead of piling onto one corner.

use holder_mesh::{Aabb, Point3, TriMesh};
use tracing::debug;

use crate::error::{HolderError, HolderResult};

/// Number of vertices that make up a port cluster.
pub const PORT_VERTEX_COUNT: usize = 4;

/// Which mesh a port cluster is selected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    /// The generated holder shell; selects at maximum x with spacing
    /// deduplication.
    Holder,
    /// The loaded hanger asset; selects at minimum x, no deduplication.
    Hanger,
}

impl std::fmt::Display for PortRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Holder => write!(f, "holder"),
            Self::Hanger => write!(f, "hanger"),
        }
    }
}

/// The four vertices of one attachment port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortVertices {
    /// Selected positions, in selection order.
    pub positions: [Point3<f64>; PORT_VERTEX_COUNT],
}

impl PortVertices {
    /// Smallest pairwise distance within the cluster.
    #[must_use]
    pub fn min_pairwise_distance(&self) -> f64 {
        let mut min = f64::INFINITY;
        for i in 0..PORT_VERTEX_COUNT {
            for j in (i + 1)..PORT_VERTEX_COUNT {
                min = min.min((self.positions[i] - self.positions[j]).norm());
            }
        }
        min
    }
}

/// Select the holder's port cluster: the four most extreme +x vertices
/// that are pairwise farther apart than the spacing threshold.
///
/// The threshold is `min(x_extent, y_extent) / dedup_divisor`, computed
/// from the bounds snapshot taken after clipping, so the same geometric
/// snapshot that sized the port tab also spaces its vertices.
///
/// The x sort is stable: vertices with equal x keep their original
/// relative order.
///
/// # Errors
///
/// Returns [`HolderError::InsufficientPortVertices`] if the sorted walk
/// exhausts the mesh before accepting four vertices.
pub fn select_holder_port_vertices(
    mesh: &TriMesh,
    bounds: &Aabb,
    dedup_divisor: f64,
) -> HolderResult<PortVertices> {
    let size = bounds.size();
    let threshold = size.x.min(size.y) / dedup_divisor;

    let mut order: Vec<usize> = (0..mesh.vertex_count()).collect();
    order.sort_by(|&a, &b| {
        mesh.vertices[b]
            .x
            .partial_cmp(&mesh.vertices[a].x)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut accepted: Vec<Point3<f64>> = Vec::with_capacity(PORT_VERTEX_COUNT);
    for index in order {
        let candidate = mesh.vertices[index];
        let spaced = accepted
            .iter()
            .all(|p| (candidate - p).norm() > threshold);
        if spaced {
            accepted.push(candidate);
            if accepted.len() == PORT_VERTEX_COUNT {
                break;
            }
        }
    }

    if accepted.len() < PORT_VERTEX_COUNT {
        return Err(HolderError::InsufficientPortVertices {
            role: PortRole::Holder,
            found: accepted.len(),
            required: PORT_VERTEX_COUNT,
        });
    }

    debug!(
        threshold,
        max_x = accepted[0].x,
        "holder port vertices selected"
    );

    Ok(PortVertices {
        positions: [accepted[0], accepted[1], accepted[2], accepted[3]],
    })
}

/// Select the hanger's port cluster: the first four vertices in
/// ascending-x order, no deduplication.
///
/// The sort is stable, so equal-x vertices keep their original relative
/// order. Hanger assets are modeled with exactly four clean corners on
/// the mating face, which is why no spacing filter is needed.
///
/// # Errors
///
/// Returns [`HolderError::InsufficientPortVertices`] if the hanger has
/// fewer than four vertices.
pub fn select_hanger_port_vertices(mesh: &TriMesh) -> HolderResult<PortVertices> {
    if mesh.vertex_count() < PORT_VERTEX_COUNT {
        return Err(HolderError::InsufficientPortVertices {
            role: PortRole::Hanger,
            found: mesh.vertex_count(),
            required: PORT_VERTEX_COUNT,
        });
    }

    let mut order: Vec<usize> = (0..mesh.vertex_count()).collect();
    order.sort_by(|&a, &b| {
        mesh.vertices[a]
            .x
            .partial_cmp(&mesh.vertices[b].x)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let positions = [
        mesh.vertices[order[0]],
        mesh.vertices[order[1]],
        mesh.vertices[order[2]],
        mesh.vertices[order[3]],
    ];

    debug!(min_x = positions[0].x, "hanger port vertices selected");

    Ok(PortVertices { positions })
}
