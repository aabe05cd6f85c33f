//! STL mesh I/O for the holder pipeline.
//!
//! The pipeline touches the filesystem in exactly two places: loading a
//! pre-built hanger asset and exporting the finished assembly. Both go
//! through this crate.
//!
//! - [`read_stl`] - load an STL file, autodetecting ASCII vs binary
//! - [`write_stl_binary`] - export a mesh as binary STL with recomputed
//!   normals
//!
//! # Example
//!
//! ```no_run
//! use holder_io::{read_stl, write_stl_binary};
//!
//! let hanger = read_stl("hangers/clamp_frame.stl")?;
//! write_stl_binary(&hanger, "out/hanger_check.stl")?;
//! # Ok::<(), holder_io::IoError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod error;
mod stl;

pub use error::{IoError, IoResult};
pub use stl::{read_stl, write_stl_binary};
