//! Shell building for the holder pipeline.
//!
//! Two stages turn a hulled solid into a wearable wall:
//!
//! - [`remove_blocking_faces`] opens the solid by deleting every face
//!   with an upward-facing normal component, so the source object can
//!   be inserted from above
//! - [`thicken_shell`] offsets the open shell along its vertex normals
//!   and stitches inner and outer surfaces with a rim, producing a
//!   printable wall without capping the opening
//!
//! # Example
//!
//! ```
//! use holder_mesh::{cuboid, Point3, Vector3};
//! use holder_shell::{remove_blocking_faces, thicken_shell};
//!
//! let mut shell = cuboid(Point3::new(0.0, 0.0, 0.0), Vector3::new(10.0, 10.0, 10.0));
//! remove_blocking_faces(&mut shell, None)?;
//! let (wall, summary) = thicken_shell(&shell, 2.0)?;
//!
//! assert_eq!(summary.boundary_loop_count, 1);
//! assert!(wall.face_count() > 0);
//! # Ok::<(), holder_shell::ShellError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod blocking;
mod error;
mod thicken;

pub use blocking::remove_blocking_faces;
pub use error::{ShellError, ShellResult};
pub use thicken::{thicken_shell, ThickenSummary};
