//! Cleanup passes for meshes produced by boolean and hull stages.
//!
//! Hulling and joining leave behind near-duplicate vertices from
//! coincident input points, sliver faces, and vertices no face uses
//! anymore. Each pass here fixes one of those, and [`repair_mesh`]
//! runs them in the order that avoids re-introducing work.

use hashbrown::HashMap;
use hashbrown::HashSet;
use smallvec::SmallVec;
use tracing::debug;

use holder_mesh::{Point3, TriMesh, Triangle};

/// Thresholds for the repair passes.
///
/// All distances and areas are in mesh units (millimeters for holder
/// work).
///
/// # Example
///
/// ```
/// use holder_repair::RepairParams;
///
/// let params = RepairParams::default().with_weld_epsilon(1e-4);
/// assert!((params.weld_epsilon - 1e-4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct RepairParams {
    /// Vertices closer than this are merged into one.
    /// Default: `1e-6`
    pub weld_epsilon: f64,

    /// Faces with area below this are removed.
    /// Default: `1e-9`
    pub degenerate_area_threshold: f64,

    /// Whether to drop vertices no face references after the other
    /// passes run.
    /// Default: `true`
    pub remove_unreferenced: bool,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            weld_epsilon: 1e-6,
            degenerate_area_threshold: 1e-9,
            remove_unreferenced: true,
        }
    }
}

impl RepairParams {
    /// Set the vertex welding distance threshold.
    #[must_use]
    pub fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    /// Set the minimum face area threshold.
    #[must_use]
    pub fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }

    /// Set whether unreferenced vertices are removed.
    #[must_use]
    pub fn with_remove_unreferenced(mut self, remove: bool) -> Self {
        self.remove_unreferenced = remove;
        self
    }
}

/// Merge vertices closer than `epsilon` and drop faces the merge
/// collapses.
///
/// Uses a spatial hash so welding stays linear in vertex count.
/// Returns the number of vertices merged away.
///
/// # Example
///
/// ```
/// use holder_mesh::{Point3, TriMesh};
/// use holder_repair::weld_vertices;
///
/// let mut mesh = TriMesh::new();
/// mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(10.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(0.0, 10.0, 0.0));
/// mesh.vertices.push(Point3::new(10.0001, 0.0, 0.0)); // near vertex 1
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([0, 3, 2]);
///
/// assert_eq!(weld_vertices(&mut mesh, 0.001), 1);
/// assert_eq!(mesh.faces[1], [0, 1, 2]);
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn weld_vertices(mesh: &mut TriMesh, epsilon: f64) -> usize {
    if mesh.vertices.is_empty() {
        return 0;
    }

    // Cells twice the weld radius, so any pair within epsilon falls in
    // the same or an adjacent cell.
    let cell_size = epsilon * 2.0;

    let mut grid: HashMap<(i64, i64, i64), SmallVec<[u32; 4]>> =
        HashMap::with_capacity(mesh.vertices.len());
    for (index, position) in mesh.vertices.iter().enumerate() {
        grid.entry(grid_cell(position, cell_size))
            .or_default()
            .push(index as u32);
    }

    // Lowest index in each cluster becomes the canonical vertex.
    let mut remap: Vec<u32> = (0..mesh.vertices.len() as u32).collect();
    let mut merged = 0usize;

    for (index, position) in mesh.vertices.iter().enumerate() {
        let index = index as u32;
        if remap[index as usize] != index {
            continue;
        }

        let cell = grid_cell(position, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                    if let Some(candidates) = grid.get(&neighbor) {
                        for &other in candidates {
                            if other <= index || remap[other as usize] != other {
                                continue;
                            }
                            if (*position - mesh.vertices[other as usize]).norm() < epsilon {
                                remap[other as usize] = index;
                                merged += 1;
                            }
                        }
                    }
                }
            }
        }
    }

    if merged == 0 {
        return 0;
    }

    // Chase chains so every entry points at a canonical vertex.
    for i in 0..remap.len() {
        let mut target = remap[i];
        while remap[target as usize] != target {
            target = remap[target as usize];
        }
        remap[i] = target;
    }

    for face in &mut mesh.faces {
        for i in face {
            *i = remap[*i as usize];
        }
    }

    // Welding can collapse a face onto a repeated vertex.
    mesh.faces
        .retain(|&[i0, i1, i2]| i0 != i1 && i1 != i2 && i0 != i2);

    merged
}

#[allow(clippy::cast_possible_truncation)]
fn grid_cell(position: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (position.x / cell_size).floor() as i64,
        (position.y / cell_size).floor() as i64,
        (position.z / cell_size).floor() as i64,
    )
}

/// Remove faces whose area falls below `area_threshold`.
///
/// Returns the number of faces removed.
pub fn remove_degenerate_faces(mesh: &mut TriMesh, area_threshold: f64) -> usize {
    let before = mesh.faces.len();
    let vertices = &mesh.vertices;

    mesh.faces.retain(|&[i0, i1, i2]| {
        let tri = Triangle::new(
            vertices[i0 as usize],
            vertices[i1 as usize],
            vertices[i2 as usize],
        );
        !tri.is_degenerate(area_threshold)
    });

    before - mesh.faces.len()
}

/// Remove faces that repeat an earlier face's vertex set.
///
/// A rotated or winding-reversed copy counts as a duplicate. Returns
/// the number of faces removed.
pub fn remove_duplicate_faces(mesh: &mut TriMesh) -> usize {
    let before = mesh.faces.len();
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(before);

    mesh.faces.retain(|face| {
        let forward = canonical_rotation(*face);
        let backward = canonical_rotation([face[0], face[2], face[1]]);
        if seen.contains(&forward) || seen.contains(&backward) {
            false
        } else {
            seen.insert(forward);
            true
        }
    });

    before - mesh.faces.len()
}

/// Rotate a face so its smallest vertex index comes first, preserving
/// winding.
pub(crate) fn canonical_rotation(face: [u32; 3]) -> [u32; 3] {
    let start = (0..3).min_by_key(|&i| face[i]).unwrap_or(0);
    [face[start], face[(start + 1) % 3], face[(start + 2) % 3]]
}

/// Drop vertices no face references and compact the vertex array.
///
/// Returns the number of vertices removed.
#[allow(clippy::cast_possible_truncation)]
pub fn remove_unreferenced_vertices(mesh: &mut TriMesh) -> usize {
    let before = mesh.vertices.len();

    let mut used = vec![false; before];
    for face in &mesh.faces {
        for &i in face {
            if let Some(slot) = used.get_mut(i as usize) {
                *slot = true;
            }
        }
    }

    if used.iter().all(|&u| u) {
        return 0;
    }

    let mut remap = vec![u32::MAX; before];
    let mut kept = Vec::with_capacity(before);
    for (old, &position) in mesh.vertices.iter().enumerate() {
        if used[old] {
            remap[old] = kept.len() as u32;
            kept.push(position);
        }
    }

    for face in &mut mesh.faces {
        for i in face {
            *i = remap[*i as usize];
        }
    }

    mesh.vertices = kept;
    before - mesh.vertices.len()
}

/// Run all repair passes in order.
///
/// Degenerate faces go first so welding does not have to merge their
/// vertices, then welding, duplicate removal (welding can create
/// exact duplicates), and finally vertex compaction.
///
/// # Example
///
/// ```
/// use holder_mesh::{cuboid, Point3, Vector3};
/// use holder_repair::{repair_mesh, RepairParams};
///
/// let mut mesh = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
/// let summary = repair_mesh(&mut mesh, &RepairParams::default());
/// assert!(!summary.had_changes());
/// ```
#[must_use]
pub fn repair_mesh(mesh: &mut TriMesh, params: &RepairParams) -> RepairSummary {
    let initial_vertices = mesh.vertices.len();
    let initial_faces = mesh.faces.len();

    let degenerates_removed = remove_degenerate_faces(mesh, params.degenerate_area_threshold);
    let vertices_welded = weld_vertices(mesh, params.weld_epsilon);
    let duplicates_removed = remove_duplicate_faces(mesh);
    let unreferenced_removed = if params.remove_unreferenced {
        remove_unreferenced_vertices(mesh)
    } else {
        0
    };

    let summary = RepairSummary {
        initial_vertices,
        initial_faces,
        final_vertices: mesh.vertices.len(),
        final_faces: mesh.faces.len(),
        vertices_welded,
        degenerates_removed,
        duplicates_removed,
        unreferenced_removed,
    };

    if summary.had_changes() {
        debug!(%summary, "mesh repaired");
    }

    summary
}

/// Counts of what each repair pass changed.
#[derive(Debug, Clone, Default)]
pub struct RepairSummary {
    /// Vertices before repair.
    pub initial_vertices: usize,
    /// Faces before repair.
    pub initial_faces: usize,
    /// Vertices after repair.
    pub final_vertices: usize,
    /// Faces after repair.
    pub final_faces: usize,
    /// Vertices merged by welding.
    pub vertices_welded: usize,
    /// Degenerate faces removed.
    pub degenerates_removed: usize,
    /// Duplicate faces removed.
    pub duplicates_removed: usize,
    /// Unreferenced vertices removed.
    pub unreferenced_removed: usize,
}

impl RepairSummary {
    /// True if any pass changed the mesh.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.vertices_welded > 0
            || self.degenerates_removed > 0
            || self.duplicates_removed > 0
            || self.unreferenced_removed > 0
    }
}

impl std::fmt::Display for RepairSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "vertices {}->{} ({} welded, {} unreferenced), faces {}->{} ({} degenerate, {} duplicate)",
            self.initial_vertices,
            self.final_vertices,
            self.vertices_welded,
            self.unreferenced_removed,
            self.initial_faces,
            self.final_faces,
            self.degenerates_removed,
            self.duplicates_removed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holder_mesh::{cuboid, Vector3};

    fn right_triangle() -> TriMesh {
        let mut mesh = TriMesh::new();
        mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
        mesh.vertices.push(Point3::new(10.0, 0.0, 0.0));
        mesh.vertices.push(Point3::new(0.0, 10.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    #[test]
    fn test_weld_merges_near_pair() {
        let mut mesh = right_triangle();
        mesh.vertices.push(Point3::new(10.0001, 0.0, 0.0));
        mesh.faces.push([0, 3, 2]);

        assert_eq!(weld_vertices(&mut mesh, 0.001), 1);
        assert_eq!(mesh.faces[1], [0, 1, 2]);
    }

    #[test]
    fn test_weld_leaves_distant_vertices() {
        let mut mesh = right_triangle();
        assert_eq!(weld_vertices(&mut mesh, 0.001), 0);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_weld_empty() {
        let mut mesh = TriMesh::new();
        assert_eq!(weld_vertices(&mut mesh, 0.001), 0);
    }

    #[test]
    fn test_weld_cluster_collapses_to_lowest_index() {
        // Vertices 0, 1, 2 sit within epsilon of vertex 0; faces that
        // referenced the cluster end up on the lowest index.
        let mut mesh = TriMesh::new();
        mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
        mesh.vertices.push(Point3::new(0.0004, 0.0, 0.0));
        mesh.vertices.push(Point3::new(0.0008, 0.0, 0.0));
        mesh.vertices.push(Point3::new(5.0, 0.0, 0.0));
        mesh.vertices.push(Point3::new(0.0, 5.0, 0.0));
        mesh.faces.push([2, 3, 4]);

        assert_eq!(weld_vertices(&mut mesh, 0.001), 2);
        assert_eq!(mesh.faces[0], [0, 3, 4]);
    }

    #[test]
    fn test_weld_drops_collapsed_faces() {
        let mut mesh = right_triangle();
        // Pull vertex 1 onto vertex 0 so the face collapses.
        mesh.vertices[1] = Point3::new(0.0000005, 0.0, 0.0);

        assert_eq!(weld_vertices(&mut mesh, 1e-6), 1);
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn test_remove_degenerate_collinear() {
        let mut mesh = TriMesh::new();
        mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
        mesh.vertices.push(Point3::new(5.0, 0.0, 0.0));
        mesh.vertices.push(Point3::new(10.0, 0.0, 0.0));
        mesh.faces.push([0, 1, 2]);

        assert_eq!(remove_degenerate_faces(&mut mesh, 1e-9), 1);
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn test_remove_degenerate_keeps_valid() {
        let mut mesh = right_triangle();
        assert_eq!(remove_degenerate_faces(&mut mesh, 1e-9), 0);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_remove_duplicate_exact_and_rotated() {
        let mut mesh = right_triangle();
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([1, 2, 0]);

        assert_eq!(remove_duplicate_faces(&mut mesh), 2);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_remove_duplicate_reversed() {
        let mut mesh = right_triangle();
        mesh.faces.push([0, 2, 1]);

        assert_eq!(remove_duplicate_faces(&mut mesh), 1);
    }

    #[test]
    fn test_remove_unreferenced() {
        let mut mesh = right_triangle();
        mesh.vertices.push(Point3::new(100.0, 100.0, 100.0));

        assert_eq!(remove_unreferenced_vertices(&mut mesh), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.indices_valid());
    }

    #[test]
    fn test_remove_unreferenced_none() {
        let mut mesh = right_triangle();
        assert_eq!(remove_unreferenced_vertices(&mut mesh), 0);
    }

    #[test]
    fn test_canonical_rotation_preserves_winding() {
        assert_eq!(canonical_rotation([5, 1, 3]), [1, 3, 5]);
        assert_eq!(canonical_rotation([3, 5, 1]), [1, 3, 5]);
        assert_eq!(canonical_rotation([1, 3, 5]), [1, 3, 5]);
        // Reversed winding canonicalizes differently.
        assert_eq!(canonical_rotation([5, 3, 1]), [1, 5, 3]);
    }

    #[test]
    fn test_repair_clean_mesh_unchanged() {
        let mut mesh = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0));
        let summary = repair_mesh(&mut mesh, &RepairParams::default());

        assert!(!summary.had_changes());
        assert_eq!(summary.final_vertices, 8);
        assert_eq!(summary.final_faces, 12);
    }

    #[test]
    fn test_repair_full_run() {
        let mut mesh = right_triangle();
        mesh.vertices.push(Point3::new(10.0001, 0.0, 0.0)); // near vertex 1
        mesh.vertices.push(Point3::new(999.0, 999.0, 999.0)); // unreferenced
        mesh.faces.push([0, 3, 2]);

        let params = RepairParams::default().with_weld_epsilon(0.001);
        let summary = repair_mesh(&mut mesh, &params);

        assert_eq!(summary.vertices_welded, 1);
        assert!(summary.unreferenced_removed >= 1);
        assert!(summary.had_changes());
        assert!(mesh.indices_valid());
    }

    #[test]
    fn test_summary_display() {
        let summary = RepairSummary {
            initial_vertices: 100,
            initial_faces: 50,
            final_vertices: 95,
            final_faces: 48,
            vertices_welded: 3,
            degenerates_removed: 2,
            duplicates_removed: 0,
            unreferenced_removed: 2,
        };

        let text = summary.to_string();
        assert!(text.contains("100->95"));
        assert!(text.contains("3 welded"));
    }
}
