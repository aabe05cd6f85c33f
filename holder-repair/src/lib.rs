//! Mesh validation and repair for the holder pipeline.
//!
//! The pipeline's boolean, hull, and join stages can leave a mesh with
//! near-duplicate vertices, sliver faces, or inconsistent winding. This crate
//! provides the cleanup passes that turn such output back into a
//! 3D-print-valid surface, plus the adjacency and validation queries the
//! other crates use to decide whether a mesh is acceptable.
//!
//! # Example
//!
//! ```
//! use holder_mesh::{cuboid, Point3, Vector3};
//! use holder_repair::validate_mesh;
//!
//! let mesh = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
//! let report = validate_mesh(&mesh);
//!
//! assert!(report.is_watertight);
//! assert!(report.is_manifold);
//! assert!(report.is_printable());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod adjacency;
mod error;
mod loops;
mod repair;
mod validate;
mod winding;

pub use adjacency::MeshAdjacency;
pub use error::{RepairError, RepairResult};
pub use loops::{trace_boundary_loops, BoundaryLoop};
pub use repair::{
    remove_degenerate_faces, remove_duplicate_faces, remove_unreferenced_vertices, repair_mesh,
    weld_vertices, RepairParams, RepairSummary,
};
pub use validate::{validate_mesh, MeshReport};
pub use winding::{count_inconsistent_edges, fix_winding_order};
