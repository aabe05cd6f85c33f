//! Error types for solid-geometry operations.

use thiserror::Error;

/// Errors that can occur during clip, hull, and union operations.
#[derive(Debug, Error)]
pub enum CsgError {
    /// One or both input meshes are empty.
    #[error("empty mesh: {details}")]
    EmptyMesh {
        /// Description of which mesh is empty.
        details: String,
    },

    /// Input geometry is too degenerate for the operation.
    #[error("degenerate geometry: {details}")]
    DegenerateGeometry {
        /// Description of the degeneracy.
        details: String,
    },

    /// The operation consumed all geometry.
    #[error("empty result: {details}")]
    EmptyResult {
        /// Which operation produced nothing and why.
        details: String,
    },

    /// A cut produced a cross-section that does not close into loops,
    /// usually because the input mesh is open or non-manifold.
    #[error("open cross-section: {details}")]
    OpenCrossSection {
        /// Description of the failed cross-section.
        details: String,
    },
}

/// Result type for solid-geometry operations.
pub type CsgResult<T> = Result<T, CsgError>;
