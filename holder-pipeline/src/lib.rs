//! Holder-generation pipeline.
//!
//! Turns an arbitrary closed source mesh into a custom-fitted, printable
//! holder joined to a pre-made hanging fixture. The stages run strictly
//! in order on a working copy of the source:
//!
//! 1. clip away everything above the configured plane
//! 2. union on a protruding port tab
//! 3. hull the result and delete upward-facing faces, leaving an open
//!    shell the object can drop into
//! 4. scale for clearance and thicken into printable walls
//! 5. select the attachment-port vertices, load the hanger, and join
//!    both parts into one manifold solid
//!
//! The crates underneath do the geometry: `holder-csg` for booleans and
//! hulls, `holder-shell` for opening and thickening, `holder-repair`
//! for the final cleanup and health report, `holder-io` for STL assets.
//!
//! # Example
//!
//! ```no_run
//! use holder_mesh::icosphere;
//! use holder_pipeline::{generate_holder, HolderParams, StlHangerLoader};
//!
//! let source = icosphere(5.0, 3);
//! let params = HolderParams::new("assets/hangers");
//!
//! let output = generate_holder(&source, &params, &StlHangerLoader)?;
//! assert!(output.report.is_printable());
//! # Ok::<(), holder_pipeline::HolderError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod error;
mod hanger;
mod join;
mod params;
mod pipeline;
mod port;

pub use error::{HolderError, HolderResult};
pub use hanger::{HangerLoader, StlHangerLoader};
pub use join::join_holder_and_hanger;
pub use params::{HangerKind, HangerSpec, HolderParams};
pub use pipeline::{
    generate_holder, generate_holder_with_transform, HolderOutput, Stage,
};
pub use port::{
    select_hanger_port_vertices, select_holder_port_vertices, PortRole, PortVertices,
    PORT_VERTEX_COUNT,
};
