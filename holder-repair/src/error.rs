//! Error types for mesh repair operations.

use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur during mesh repair.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Mesh is not manifold, so the operation is ill-defined.
    #[error("mesh is not manifold: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// Mesh has a face index pointing past the vertex array.
    #[error("invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// The invalid index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },
}
