//! Edge-to-face adjacency for triangle meshes.
//!
//! Most repair and analysis passes need to answer the same question:
//! which faces share this edge? [`MeshAdjacency`] builds that map once
//! so the passes themselves stay simple.

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Edge adjacency information for a triangle mesh.
///
/// Edges are stored undirected, keyed by `(min, max)` vertex index.
/// A closed manifold mesh has exactly two faces on every edge; one
/// face means a boundary edge, three or more means non-manifold
/// geometry.
///
/// # Example
///
/// ```
/// use holder_repair::MeshAdjacency;
///
/// // Two triangles sharing the edge (0, 1).
/// let faces = [[0, 1, 2], [1, 0, 3]];
/// let adjacency = MeshAdjacency::build(&faces);
///
/// assert_eq!(adjacency.faces_for_edge(0, 1).map(<[usize]>::len), Some(2));
/// assert_eq!(adjacency.boundary_edge_count(), 4);
/// assert!(!adjacency.is_watertight());
/// ```
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    /// Map from undirected edge to the indices of faces containing it.
    edge_faces: HashMap<(u32, u32), SmallVec<[usize; 2]>>,
}

impl MeshAdjacency {
    /// Builds adjacency information from a face list.
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_faces: HashMap<(u32, u32), SmallVec<[usize; 2]>> =
            HashMap::with_capacity(faces.len() * 3 / 2);

        for (face_index, face) in faces.iter().enumerate() {
            for i in 0..3 {
                let edge = normalize_edge(face[i], face[(i + 1) % 3]);
                edge_faces.entry(edge).or_default().push(face_index);
            }
        }

        Self { edge_faces }
    }

    /// Returns the faces sharing the edge between two vertices, if the
    /// edge exists in the mesh.
    #[must_use]
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edge_faces
            .get(&normalize_edge(v0, v1))
            .map(SmallVec::as_slice)
    }

    /// Iterates over edges bordered by exactly one face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(edge, _)| *edge)
    }

    /// Number of boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_faces
            .values()
            .filter(|faces| faces.len() == 1)
            .count()
    }

    /// Returns edges shared by three or more faces.
    #[must_use]
    pub fn non_manifold_edges(&self) -> Vec<(u32, u32)> {
        self.edge_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(edge, _)| *edge)
            .collect()
    }

    /// Number of edges shared by three or more faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_faces
            .values()
            .filter(|faces| faces.len() > 2)
            .count()
    }

    /// True when no edge has more than two faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_faces.values().all(|faces| faces.len() <= 2)
    }

    /// True when every edge has at least two faces.
    ///
    /// A watertight mesh has no boundary edges. Note this does not
    /// imply manifoldness; an edge with three faces still counts.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_faces.values().all(|faces| faces.len() >= 2)
    }

    /// Total number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_faces.len()
    }
}

/// Canonical undirected form of an edge.
#[inline]
fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}
