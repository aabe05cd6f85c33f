//! Hanger asset loading.
//!
//! The pipeline never hardcodes where hanger meshes come from: it asks
//! a [`HangerLoader`]. The production implementation reads the fixed
//! STL assets from the configured directory; tests substitute synthetic
//! hangers.

use holder_io::read_stl;
use holder_mesh::{Transform3D, TriMesh};
use tracing::debug;

use crate::error::{HolderError, HolderResult};
use crate::params::HangerSpec;

/// Supplies a positioned hanger mesh for a [`HangerSpec`].
///
/// Implementations must return the hanger already rotated per the
/// spec's `rotation_degrees`; the pipeline applies no further
/// transform.
pub trait HangerLoader {
    /// Load the hanger mesh the spec describes.
    ///
    /// # Errors
    ///
    /// Returns [`HolderError::HangerLoad`] when the asset cannot be
    /// read and [`HolderError::InvalidMesh`] when it parses to empty
    /// geometry.
    fn load(&self, spec: &HangerSpec) -> HolderResult<TriMesh>;
}

/// Loads hanger meshes from STL files in the spec's directory.
///
/// Filenames are fixed per mount kind (`clamp_frame.stl`,
/// `wall_mount.stl`, `ring_mount.stl`); the rotation about the mounting
/// (x) axis is applied after loading.
#[derive(Debug, Clone, Copy, Default)]
pub struct StlHangerLoader;

impl HangerLoader for StlHangerLoader {
    fn load(&self, spec: &HangerSpec) -> HolderResult<TriMesh> {
        let path = spec.asset_path();
        let mut mesh = read_stl(&path)?;

        if mesh.is_empty() {
            return Err(HolderError::InvalidMesh {
                reason: format!("hanger asset {} contains no geometry", path.display()),
            });
        }

        if spec.rotation_degrees.abs() > f64::EPSILON {
            mesh.transform(&Transform3D::rotation_x(spec.rotation_degrees.to_radians()));
        }

        debug!(
            kind = %spec.kind,
            path = %path.display(),
            faces = mesh.face_count(),
            rotation_degrees = spec.rotation_degrees,
            "hanger loaded"
        );

        Ok(mesh)
    }
}
