//! Solid-geometry operations for the holder pipeline.
//!
//! Three operations cover the pipeline's constructive stages:
//!
//! - [`clip_above`] - boolean difference against a half-space: removes
//!   everything above a horizontal plane and caps the cross-section
//! - [`union_meshes`] - boolean union via inside/outside face
//!   classification, used to attach the port tab
//! - [`convex_hull`] / [`convex_hull_of_points`] - quickhull over a
//!   vertex set, used for shell building and for joining holder to
//!   hanger
//!
//! The ray-casting queries in [`point_in_mesh_robust`] back the union's
//! classification and remain available as a standalone containment
//! primitive.
//!
//! # Example
//!
//! ```
//! use holder_csg::{clip_above, convex_hull};
//! use holder_mesh::icosphere;
//!
//! let sphere = icosphere(5.0, 2);
//! let hemisphere = clip_above(&sphere, 0.0)?;
//! let hull = convex_hull(&hemisphere)?;
//!
//! assert!(hull.bounds().max.z <= 1e-9);
//! # Ok::<(), holder_csg::CsgError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod clip;
mod error;
mod hull;
mod query;
mod union;

pub use clip::clip_above;
pub use error::{CsgError, CsgResult};
pub use hull::{convex_hull, convex_hull_of_points};
pub use query::{
    point_in_mesh, point_in_mesh_robust, ray_triangle_intersect, DEFAULT_QUERY_EPSILON,
};
pub use union::union_meshes;
