//! Error types for shell building.

use thiserror::Error;

/// Errors that can occur while opening or thickening a shell.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The input mesh has no geometry.
    #[error("empty mesh: {details}")]
    EmptyMesh {
        /// Description of which input is empty.
        details: String,
    },

    /// Blocking-face removal deleted every face.
    #[error("no shell remains: all {removed} faces had an upward-facing normal")]
    NoShellRemains {
        /// Number of faces that were removed.
        removed: usize,
    },

    /// The requested wall thickness cannot produce a usable wall.
    #[error("invalid wall thickness {value}: must be non-zero")]
    InvalidThickness {
        /// The rejected thickness value.
        value: f64,
    },
}

/// Result type for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;
