//! Pipeline configuration.
//!
//! All tunables live in [`HolderParams`], validated once before the
//! pipeline touches any geometry. The hanger-specific subset is handed
//! to the hanger loader as an immutable [`HangerSpec`].

use std::path::{Path, PathBuf};

use crate::error::{HolderError, HolderResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which pre-built hanging fixture to attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HangerKind {
    /// Table-clamp frame.
    #[default]
    Table,
    /// Flat wall mount.
    Wall,
    /// Ring mount.
    Ring,
}

impl HangerKind {
    /// Fixed asset filename for this mount kind.
    #[must_use]
    pub const fn asset_filename(self) -> &'static str {
        match self {
            Self::Table => "clamp_frame.stl",
            Self::Wall => "wall_mount.stl",
            Self::Ring => "ring_mount.stl",
        }
    }
}

impl std::fmt::Display for HangerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Wall => write!(f, "wall"),
            Self::Ring => write!(f, "ring"),
        }
    }
}

/// Immutable description of which hanger mesh to load and how to orient
/// it. Consumed once by the hanger loader.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HangerSpec {
    /// Mount kind, selects the asset file.
    pub kind: HangerKind,
    /// Rotation about the mounting (x) axis, degrees.
    pub rotation_degrees: f64,
    /// Directory holding the hanger asset files.
    pub dir: PathBuf,
}

impl HangerSpec {
    /// Full path of the asset file this spec names.
    #[must_use]
    pub fn asset_path(&self) -> PathBuf {
        self.dir.join(self.kind.asset_filename())
    }
}

/// Configuration bundle for one pipeline run.
///
/// `hanger_dir` is required; everything else has a working default.
/// `port_tilt_degrees` and `dedup_divisor` are empirical tunables: the
/// tilt keeps the port tab clear of the exactly-vertical classification
/// boundary during blocking-face removal, and the divisor sets how far
/// apart selected port vertices must be.
///
/// # Example
///
/// ```
/// use holder_pipeline::{HangerKind, HolderParams};
///
/// let params = HolderParams::new("hangers")
///     .with_hanger_kind(HangerKind::Wall)
///     .with_wall_thickness(5.0);
///
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HolderParams {
    /// Clip plane height in world z.
    pub z_offset: f64,
    /// Uniform clearance scale applied to the shell before thickening.
    /// Must be at least 1.0.
    pub shell_scaleup: f64,
    /// Signed wall thickness; positive thickens outward. Magnitude must
    /// be at least 1.0.
    pub wall_thickness: f64,
    /// Hanger rotation about the mounting axis, degrees in 0..=360.
    pub hanger_rotation_degrees: f64,
    /// Which mount to attach.
    pub hanger_kind: HangerKind,
    /// Directory holding the hanger asset files. Required.
    pub hanger_dir: PathBuf,
    /// Port tab tilt about the y axis, degrees.
    pub port_tilt_degrees: f64,
    /// Port-vertex spacing threshold is `min(x_extent, y_extent)`
    /// divided by this.
    pub dedup_divisor: f64,
}

impl Default for HolderParams {
    fn default() -> Self {
        Self {
            z_offset: 0.0,
            shell_scaleup: 1.05,
            wall_thickness: 10.0,
            hanger_rotation_degrees: 0.0,
            hanger_kind: HangerKind::default(),
            hanger_dir: PathBuf::new(),
            port_tilt_degrees: 2.0,
            dedup_divisor: 5.0,
        }
    }
}

impl HolderParams {
    /// Default parameters with the required hanger directory set.
    #[must_use]
    pub fn new(hanger_dir: impl AsRef<Path>) -> Self {
        Self {
            hanger_dir: hanger_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Set the clip plane height.
    #[must_use]
    pub fn with_z_offset(mut self, z_offset: f64) -> Self {
        self.z_offset = z_offset;
        self
    }

    /// Set the clearance scale factor.
    #[must_use]
    pub fn with_shell_scaleup(mut self, factor: f64) -> Self {
        self.shell_scaleup = factor;
        self
    }

    /// Set the signed wall thickness.
    #[must_use]
    pub fn with_wall_thickness(mut self, thickness: f64) -> Self {
        self.wall_thickness = thickness;
        self
    }

    /// Set the hanger rotation in degrees.
    #[must_use]
    pub fn with_hanger_rotation(mut self, degrees: f64) -> Self {
        self.hanger_rotation_degrees = degrees;
        self
    }

    /// Set the mount kind.
    #[must_use]
    pub fn with_hanger_kind(mut self, kind: HangerKind) -> Self {
        self.hanger_kind = kind;
        self
    }

    /// Set the port tab tilt in degrees.
    #[must_use]
    pub fn with_port_tilt(mut self, degrees: f64) -> Self {
        self.port_tilt_degrees = degrees;
        self
    }

    /// Set the port-vertex spacing divisor.
    #[must_use]
    pub fn with_dedup_divisor(mut self, divisor: f64) -> Self {
        self.dedup_divisor = divisor;
        self
    }

    /// The hanger subset of this configuration.
    #[must_use]
    pub fn hanger_spec(&self) -> HangerSpec {
        HangerSpec {
            kind: self.hanger_kind,
            rotation_degrees: self.hanger_rotation_degrees,
            dir: self.hanger_dir.clone(),
        }
    }

    /// Check every field before the pipeline runs.
    ///
    /// # Errors
    ///
    /// Returns [`HolderError::Configuration`] naming the first failing
    /// field. Validation happens before any mesh is copied or mutated.
    pub fn validate(&self) -> HolderResult<()> {
        if self.hanger_dir.as_os_str().is_empty() {
            return Err(HolderError::Configuration {
                reason: "hanger directory is required but empty".to_string(),
            });
        }
        if !self.shell_scaleup.is_finite() || self.shell_scaleup < 1.0 {
            return Err(HolderError::Configuration {
                reason: format!(
                    "shell_scaleup must be at least 1.0, got {}",
                    self.shell_scaleup
                ),
            });
        }
        if !self.wall_thickness.is_finite() || self.wall_thickness.abs() < 1.0 {
            return Err(HolderError::Configuration {
                reason: format!(
                    "wall_thickness magnitude must be at least 1.0, got {}",
                    self.wall_thickness
                ),
            });
        }
        if !(0.0..=360.0).contains(&self.hanger_rotation_degrees) {
            return Err(HolderError::Configuration {
                reason: format!(
                    "hanger_rotation must be within 0..=360 degrees, got {}",
                    self.hanger_rotation_degrees
                ),
            });
        }
        if !self.z_offset.is_finite() {
            return Err(HolderError::Configuration {
                reason: format!("z_offset must be finite, got {}", self.z_offset),
            });
        }
        if !self.port_tilt_degrees.is_finite() {
            return Err(HolderError::Configuration {
                reason: format!(
                    "port_tilt_degrees must be finite, got {}",
                    self.port_tilt_degrees
                ),
            });
        }
        if !self.dedup_divisor.is_finite() || self.dedup_divisor <= 0.0 {
            return Err(HolderError::Configuration {
                reason: format!(
                    "dedup_divisor must be positive, got {}",
                    self.dedup_divisor
                ),
            });
        }
        Ok(())
    }
}
