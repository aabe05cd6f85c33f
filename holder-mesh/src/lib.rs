//! Core mesh types for the holder-generation pipeline.
//!
//! This crate provides the foundational types the pipeline crates build on:
//!
//! - [`TriMesh`] - An indexed triangle mesh
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`Transform3D`] - 4x4 homogeneous transformation
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`. Downstream
//! crates (holder-shell, holder-pipeline) assume millimeters.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**:
//! - X: width (left/right)
//! - Y: depth (front/back)
//! - Z: height (up/down)
//!
//! Face winding is **counter-clockwise (CCW) when viewed from outside**.
//! Normals point outward by the right-hand rule. "Up" throughout the
//! pipeline means +Z.
//!
//! # Example
//!
//! ```
//! use holder_mesh::{TriMesh, Point3};
//!
//! let mut mesh = TriMesh::new();
//! mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
//! mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
//! mesh.vertices.push(Point3::new(0.5, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod bounds;
mod mesh;
mod transform;
mod triangle;

// Re-export core types
pub use bounds::Aabb;
pub use mesh::{cuboid, icosphere, TriMesh};
pub use transform::Transform3D;
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
