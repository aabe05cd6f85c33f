//! Property-based tests for repair operations.
//!
//! These tests use proptest to generate random meshes and verify invariants.
//!
//! Run with: cargo test -p holder-repair -- proptest

use holder_mesh::{cuboid, Point3, TriMesh, Vector3};
use holder_repair::{
    count_inconsistent_edges, fix_winding_order, repair_mesh, trace_boundary_loops, validate_mesh,
    weld_vertices, MeshAdjacency, RepairParams,
};
use proptest::prelude::*;

// =============================================================================
// Strategies for generating random meshes
// =============================================================================

/// Generate a random vertex position in a bounded range.
fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Generate a mesh whose face indices are all valid, with no other
/// guarantees about its shape.
fn arb_mesh(
    min_vertices: usize,
    max_vertices: usize,
    min_faces: usize,
    max_faces: usize,
) -> impl Strategy<Value = TriMesh> {
    (min_vertices..=max_vertices).prop_flat_map(move |num_vertices| {
        let vertices = prop::collection::vec(arb_point(), num_vertices);

        vertices.prop_flat_map(move |verts| {
            let n = verts.len() as u32;
            if n < 3 {
                return Just(TriMesh {
                    vertices: verts,
                    faces: Vec::new(),
                })
                .boxed();
            }

            let face = prop::array::uniform3(0..n);
            let faces = prop::collection::vec(face, min_faces..=max_faces);

            faces
                .prop_map(move |f| TriMesh {
                    vertices: verts.clone(),
                    faces: f,
                })
                .boxed()
        })
    })
}

// =============================================================================
// Property Tests: Validation
// =============================================================================

proptest! {
    /// Validation should never panic on any mesh.
    #[test]
    fn validation_never_panics(mesh in arb_mesh(3, 50, 0, 100)) {
        let _ = validate_mesh(&mesh);
    }

    /// Validation is read-only, so two runs must agree.
    #[test]
    fn validation_is_idempotent(mesh in arb_mesh(3, 30, 1, 50)) {
        let report1 = validate_mesh(&mesh);
        let report2 = validate_mesh(&mesh);

        prop_assert_eq!(report1.vertex_count, report2.vertex_count);
        prop_assert_eq!(report1.face_count, report2.face_count);
        prop_assert_eq!(report1.issue_count(), report2.issue_count());
        prop_assert_eq!(report1.is_manifold, report2.is_manifold);
        prop_assert_eq!(report1.is_watertight, report2.is_watertight);
    }
}

// =============================================================================
// Property Tests: Vertex Welding
// =============================================================================

proptest! {
    /// Welding should never increase the vertex count.
    #[test]
    fn weld_never_increases_vertices(mesh in arb_mesh(3, 30, 1, 50)) {
        let original_vertex_count = mesh.vertices.len();
        let mut welded = mesh.clone();

        weld_vertices(&mut welded, 0.001);

        prop_assert!(welded.vertices.len() <= original_vertex_count);
    }

    /// All face indices should stay valid after welding.
    #[test]
    fn weld_produces_valid_indices(mesh in arb_mesh(3, 30, 1, 50)) {
        let mut welded = mesh.clone();
        weld_vertices(&mut welded, 0.01);

        prop_assert!(welded.indices_valid());
    }

    /// After a full repair the surviving vertices are pairwise farther
    /// apart than the weld threshold, so a follow-up weld is a no-op.
    #[test]
    fn repair_leaves_nothing_to_weld(mesh in arb_mesh(3, 30, 1, 50)) {
        let params = RepairParams::default();
        let mut repaired = mesh.clone();
        let _ = repair_mesh(&mut repaired, &params);

        prop_assert_eq!(weld_vertices(&mut repaired, params.weld_epsilon), 0);
    }
}

// =============================================================================
// Property Tests: Full Repair
// =============================================================================

proptest! {
    /// Full repair should never panic.
    #[test]
    fn repair_never_panics(mesh in arb_mesh(3, 30, 1, 50)) {
        let mut repaired = mesh.clone();
        let _ = repair_mesh(&mut repaired, &RepairParams::default());
    }

    /// Repair only removes geometry, never invents it.
    #[test]
    fn repair_never_grows_mesh(mesh in arb_mesh(3, 30, 1, 50)) {
        let mut repaired = mesh.clone();
        let _ = repair_mesh(&mut repaired, &RepairParams::default());

        prop_assert!(repaired.vertices.len() <= mesh.vertices.len());
        prop_assert!(repaired.faces.len() <= mesh.faces.len());
        prop_assert!(repaired.indices_valid());
    }
}

// =============================================================================
// Property Tests: Winding and boundary loops
// =============================================================================

proptest! {
    /// Winding repair either succeeds or reports non-manifold input;
    /// it must not panic, and it never moves vertices.
    #[test]
    fn winding_repair_never_panics(mesh in arb_mesh(3, 20, 1, 30)) {
        let mut fixed = mesh.clone();
        let result = fix_winding_order(&mut fixed);

        let adjacency = MeshAdjacency::build(&mesh.faces);
        prop_assert_eq!(result.is_err(), !adjacency.is_manifold());
        prop_assert_eq!(fixed.vertices, mesh.vertices);
        prop_assert_eq!(fixed.faces.len(), mesh.faces.len());
    }

    /// Counting inconsistent edges is read-only and bounded by the
    /// edge count.
    #[test]
    fn inconsistent_edge_count_bounded(mesh in arb_mesh(3, 20, 1, 30)) {
        let adjacency = MeshAdjacency::build(&mesh.faces);
        prop_assert!(count_inconsistent_edges(&mesh) <= adjacency.edge_count());
    }

    /// Every traced boundary loop is a closed ring of at least three
    /// boundary edges.
    #[test]
    fn traced_loops_are_valid(mesh in arb_mesh(3, 20, 1, 30)) {
        let adjacency = MeshAdjacency::build(&mesh.faces);
        for ring in trace_boundary_loops(&adjacency) {
            prop_assert!(ring.is_valid());
            for i in 0..ring.vertices.len() {
                let a = ring.vertices[i];
                let b = ring.vertices[(i + 1) % ring.vertices.len()];
                let faces = adjacency.faces_for_edge(a, b);
                prop_assert_eq!(faces.map(<[usize]>::len), Some(1));
            }
        }
    }
}

// =============================================================================
// Deterministic invariants on a known-good solid
// =============================================================================

#[test]
fn cuboid_is_printable() {
    let mesh = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 2.0, 3.0));
    let report = validate_mesh(&mesh);

    assert!(report.is_printable());
    assert_eq!(report.issue_count(), 0);
}

#[test]
fn cuboid_repair_is_stable() {
    let mesh = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 2.0, 3.0));
    let mut repaired = mesh.clone();

    let first = repair_mesh(&mut repaired, &RepairParams::default());
    assert!(!first.had_changes());

    let second = repair_mesh(&mut repaired, &RepairParams::default());
    assert!(!second.had_changes());
    assert_eq!(repaired.vertex_count(), mesh.vertex_count());
    assert_eq!(repaired.face_count(), mesh.face_count());
}

#[test]
fn cuboid_winding_already_consistent() {
    let mut mesh = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(fix_winding_order(&mut mesh).unwrap(), 0);
}
