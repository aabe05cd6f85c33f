//! Pipeline error taxonomy.
//!
//! Every variant is fatal to the run: the pipeline aborts, discards its
//! intermediate meshes, and leaves the caller's source untouched. The
//! per-crate errors of the geometry crates convert into these variants
//! at the pipeline boundary so callers see one taxonomy.

use thiserror::Error;

use crate::pipeline::Stage;
use crate::port::PortRole;

/// Result type for pipeline operations.
pub type HolderResult<T> = Result<T, HolderError>;

/// Errors that abort a holder-generation run.
#[derive(Debug, Error)]
pub enum HolderError {
    /// Invalid configuration, reported before any mesh is copied or
    /// mutated.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Which field failed and why.
        reason: String,
    },

    /// The source or hanger mesh is unusable (no vertices, dangling
    /// indices).
    #[error("invalid mesh: {reason}")]
    InvalidMesh {
        /// What made the mesh unusable.
        reason: String,
    },

    /// Geometry too degenerate to operate on (collinear/coplanar hull
    /// input, nothing left after opening the shell).
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry {
        /// Description of the degeneracy.
        reason: String,
    },

    /// A boolean stage produced an empty or broken result.
    #[error("boolean operation failed at stage {stage}: {reason}")]
    BooleanOperation {
        /// The pipeline stage that failed.
        stage: Stage,
        /// The underlying geometric failure.
        reason: String,
    },

    /// Port-vertex selection could not find enough spaced vertices.
    #[error(
        "insufficient port vertices on {role}: found {found} of {required} \
         (source mesh may be too small for the spacing threshold)"
    )]
    InsufficientPortVertices {
        /// Which mesh was being selected from.
        role: PortRole,
        /// Vertices that satisfied the spacing threshold.
        found: usize,
        /// Vertices required.
        required: usize,
    },

    /// The final join/repair pass could not produce a manifold mesh.
    #[error("joined mesh is not manifold: {non_manifold_edges} bad edges remain after repair")]
    NonManifoldResult {
        /// Edges still shared by more than two faces.
        non_manifold_edges: usize,
    },

    /// Loading the hanger asset failed.
    #[error("failed to load hanger asset: {0}")]
    HangerLoad(#[from] holder_io::IoError),
}
