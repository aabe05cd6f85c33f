//! Boundary loop tracing.
//!
//! An open mesh ends in one or more rings of boundary edges. Tracing
//! those rings into ordered vertex loops is what lets a shell builder
//! stitch an inner and outer surface together at the rim.

use hashbrown::{HashMap, HashSet};
use tracing::warn;

use crate::MeshAdjacency;

/// A closed ring of boundary vertices, in walk order.
///
/// Consecutive entries (including last back to first) are boundary
/// edges of the source mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Vertex indices along the loop.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges in the loop, equal to the number of vertices.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// A loop needs at least three vertices to bound any area.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= 3
    }
}

/// Traces every closed boundary loop in the mesh.
///
/// Boundary edges that do not close into a ring (dangling fans,
/// non-manifold junctions along the boundary) are skipped with a
/// warning rather than returned as partial loops.
#[must_use]
pub fn trace_boundary_loops(adjacency: &MeshAdjacency) -> Vec<BoundaryLoop> {
    let boundary_edges: Vec<(u32, u32)> = adjacency.boundary_edges().collect();
    if boundary_edges.is_empty() {
        return Vec::new();
    }

    // Neighbor map restricted to boundary edges.
    let mut edge_neighbors: HashMap<u32, Vec<u32>> = HashMap::new();
    for &(v0, v1) in &boundary_edges {
        edge_neighbors.entry(v0).or_default().push(v1);
        edge_neighbors.entry(v1).or_default().push(v0);
    }

    let mut visited: HashSet<(u32, u32)> = HashSet::new();
    let mut loops = Vec::new();

    for &(start, next) in &boundary_edges {
        if visited.contains(&ordered(start, next)) {
            continue;
        }

        let mut ring = vec![start];
        let mut previous = start;
        let mut current = next;
        visited.insert(ordered(start, next));

        let closed = loop {
            if current == start {
                break true;
            }
            ring.push(current);

            let step = edge_neighbors.get(&current).and_then(|neighbors| {
                neighbors
                    .iter()
                    .copied()
                    .find(|&n| n != previous && !visited.contains(&ordered(current, n)))
            });

            match step {
                Some(n) => {
                    visited.insert(ordered(current, n));
                    previous = current;
                    current = n;
                }
                None => break false,
            }
        };

        if closed && ring.len() >= 3 {
            loops.push(BoundaryLoop { vertices: ring });
        } else if !closed {
            warn!(
                start_vertex = start,
                walked = ring.len(),
                "boundary walk hit a dead end, skipping partial loop"
            );
        }
    }

    loops
}

#[inline]
fn ordered(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_mesh_has_no_loops() {
        let faces = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let adjacency = MeshAdjacency::build(&faces);
        assert!(trace_boundary_loops(&adjacency).is_empty());
    }

    #[test]
    fn test_single_triangle_is_one_loop() {
        let adjacency = MeshAdjacency::build(&[[0, 1, 2]]);
        let loops = trace_boundary_loops(&adjacency);

        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].edge_count(), 3);
        assert!(loops[0].is_valid());
    }

    #[test]
    fn test_quad_strip_is_one_loop() {
        // Three quads in a row, six boundary vertices on each long side.
        let faces = [
            [0, 1, 5],
            [0, 5, 4],
            [1, 2, 6],
            [1, 6, 5],
            [2, 3, 7],
            [2, 7, 6],
        ];
        let adjacency = MeshAdjacency::build(&faces);
        let loops = trace_boundary_loops(&adjacency);

        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].edge_count(), 8);
    }

    #[test]
    fn test_two_disjoint_triangles_are_two_loops() {
        let faces = [[0, 1, 2], [3, 4, 5]];
        let adjacency = MeshAdjacency::build(&faces);
        let loops = trace_boundary_loops(&adjacency);

        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(BoundaryLoop::is_valid));
    }

    #[test]
    fn test_loop_edges_are_boundary_edges() {
        // Quad made of two triangles: the loop must walk the 4 outer
        // edges and never cross the (0, 2) diagonal.
        let faces = [[0, 1, 2], [0, 2, 3]];
        let adjacency = MeshAdjacency::build(&faces);
        let loops = trace_boundary_loops(&adjacency);

        assert_eq!(loops.len(), 1);
        let ring = &loops[0].vertices;
        assert_eq!(ring.len(), 4);
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            assert_ne!(ordered(a, b), (0, 2));
            let shared = adjacency.faces_for_edge(a, b).map_or(0, <[usize]>::len);
            assert_eq!(shared, 1);
        }
    }
}
