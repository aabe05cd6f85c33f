//! Pipeline orchestration.
//!
//! A linear state machine: each stage consumes the working mesh the
//! previous stage produced, and a failure at any stage aborts the run
//! and discards every intermediate. The caller's source mesh is copied
//! at entry and never mutated.
//!
//! Bounds snapshots thread through explicitly: the post-clip [`Aabb`]
//! sizes both the port tab and, later, the port-vertex spacing
//! threshold, so those two decisions always observe the same geometry.

use std::time::Instant;

use holder_csg::{clip_above, convex_hull, union_meshes, CsgError};
use holder_mesh::{cuboid, Aabb, Point3, Transform3D, TriMesh, Vector3};
use holder_repair::{validate_mesh, MeshReport};
use holder_shell::{remove_blocking_faces, thicken_shell, ShellError};
use tracing::{debug, info, warn};

use crate::error::{HolderError, HolderResult};
use crate::hanger::HangerLoader;
use crate::params::HolderParams;
use crate::port::{
    select_hanger_port_vertices, select_holder_port_vertices, PortVertices,
};

/// Per-axis margin added to the clip cuboid so it covers the mesh's
/// full footprint with room to spare.
const CLIP_SAFETY_MARGIN: f64 = 10.0;

/// Gap between the mesh's max-x extreme and the port tab's center.
const PORT_OUTWARD_OFFSET: f64 = 1.0;

/// Full x dimension of the port tab.
const PORT_DEPTH: f64 = 1.0;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Parameter validation, before any mesh is touched.
    Validate,
    /// Boolean difference removing everything above the clip plane.
    Clip,
    /// Boolean union attaching the port tab.
    AddPort,
    /// Convex hull of the ported mesh.
    Hull,
    /// Deletion of upward-facing (blocking) faces.
    RemoveBlockingFaces,
    /// Uniform clearance scale.
    Scale,
    /// Wall thickening with rim stitching.
    Thicken,
    /// Port-vertex selection on the thickened holder shell.
    SelectHolderPortVertices,
    /// Port-vertex selection on the loaded hanger.
    SelectHangerPortVertices,
    /// Hanger asset loading.
    LoadHanger,
    /// Final holder/hanger join and repair.
    Join,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validate => "validate",
            Self::Clip => "clip",
            Self::AddPort => "add-port",
            Self::Hull => "hull",
            Self::RemoveBlockingFaces => "remove-blocking-faces",
            Self::Scale => "scale",
            Self::Thicken => "thicken",
            Self::SelectHolderPortVertices => "select-holder-port-vertices",
            Self::SelectHangerPortVertices => "select-hanger-port-vertices",
            Self::LoadHanger => "load-hanger",
            Self::Join => "join",
        };
        write!(f, "{name}")
    }
}

/// Everything a completed run produces.
#[derive(Debug, Clone)]
pub struct HolderOutput {
    /// The joined, repaired holder-plus-hanger solid.
    pub mesh: TriMesh,
    /// Health report of the final mesh.
    pub report: MeshReport,
    /// Port cluster selected on the thickened holder shell.
    pub holder_port: PortVertices,
    /// Port cluster selected on the hanger.
    pub hanger_port: PortVertices,
}

/// Generate a holder for `source` using its coordinates as-is.
///
/// See [`generate_holder_with_transform`] for the variant that bakes a
/// world transform into the copy first.
///
/// # Errors
///
/// Any [`HolderError`]; every failure aborts the run with the caller's
/// source untouched.
pub fn generate_holder(
    source: &TriMesh,
    params: &HolderParams,
    loader: &dyn HangerLoader,
) -> HolderResult<HolderOutput> {
    generate_holder_with_transform(source, None, params, loader)
}

/// Generate a holder for `source`, optionally baking `world_transform`
/// into the working copy first.
///
/// Runs the full stage sequence: validate, copy, clip at `z_offset`,
/// attach the port tab, hull, open the shell by deleting blocking
/// faces, scale for clearance, thicken, select port vertices, load the
/// hanger, and join. The returned [`HolderOutput`] carries the final
/// mesh together with its health report and both port clusters.
///
/// # Errors
///
/// - [`HolderError::Configuration`] for invalid parameters, raised
///   before any geometry is copied
/// - [`HolderError::InvalidMesh`] for an empty source or dangling face
///   indices
/// - [`HolderError::BooleanOperation`] when the clip or the port union
///   fails
/// - [`HolderError::DegenerateGeometry`] when hulling or shell opening
///   leaves nothing to work with
/// - [`HolderError::InsufficientPortVertices`],
///   [`HolderError::HangerLoad`], [`HolderError::NonManifoldResult`]
///   from the later stages
pub fn generate_holder_with_transform(
    source: &TriMesh,
    world_transform: Option<&Transform3D>,
    params: &HolderParams,
    loader: &dyn HangerLoader,
) -> HolderResult<HolderOutput> {
    timed(Stage::Validate, || params.validate())?;

    // Copy: the pipeline owns its working mesh; the world transform is
    // baked here so every later stage sees world coordinates
    let mut mesh = source.clone();
    if let Some(transform) = world_transform {
        mesh.transform(transform);
    }
    if mesh.is_empty() {
        return Err(HolderError::InvalidMesh {
            reason: "source mesh has no geometry".to_string(),
        });
    }
    if !mesh.indices_valid() {
        return Err(HolderError::InvalidMesh {
            reason: "source mesh has face indices past the vertex count".to_string(),
        });
    }

    let source_bounds = mesh.bounds();
    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        max_z = source_bounds.max.z,
        "working copy ready"
    );

    // Clip: difference against an oversized cuboid whose bottom face
    // defines the clip plane
    let cutter = clip_cuboid(&source_bounds, params.z_offset);
    let plane_z = cutter.bounds().min.z;
    mesh = timed(Stage::Clip, || {
        clip_above(&mesh, plane_z).map_err(|e| boolean_failure(Stage::Clip, &e))
    })?;

    // Bounds snapshot after clipping; sizes the port tab and the
    // port-vertex spacing threshold
    let clipped_bounds = mesh.bounds();

    let port_tool = port_cuboid(&clipped_bounds, params);
    mesh = timed(Stage::AddPort, || {
        union_meshes(&mesh, &port_tool).map_err(|e| boolean_failure(Stage::AddPort, &e))
    })?;

    mesh = timed(Stage::Hull, || {
        convex_hull(&mesh).map_err(|e| hull_failure(&e))
    })?;

    timed(Stage::RemoveBlockingFaces, || {
        // The world transform was baked at Copy, so normals are already
        // in world space
        remove_blocking_faces(&mut mesh, None).map_err(shell_failure)
    })?;

    timed(Stage::Scale, || {
        mesh.scale(params.shell_scaleup);
        Ok(())
    })?;

    mesh = timed(Stage::Thicken, || {
        let (thickened, summary) = thicken_shell(&mesh, params.wall_thickness)
            .map_err(shell_failure)?;
        debug!(
            rim_faces = summary.rim_face_count,
            boundary_loops = summary.boundary_loop_count,
            "shell thickened"
        );
        Ok(thickened)
    })?;

    let holder_port = timed(Stage::SelectHolderPortVertices, || {
        select_holder_port_vertices(&mesh, &clipped_bounds, params.dedup_divisor)
    })?;

    let hanger = timed(Stage::LoadHanger, || loader.load(&params.hanger_spec()))?;

    let hanger_port = timed(Stage::SelectHangerPortVertices, || {
        select_hanger_port_vertices(&hanger)
    })?;

    let joined = timed(Stage::Join, || {
        crate::join::join_holder_and_hanger(&mesh, &hanger, &holder_port, &hanger_port)
    })?;

    let report = validate_mesh(&joined);
    info!(
        vertices = report.vertex_count,
        faces = report.face_count,
        printable = report.is_printable(),
        "holder generated"
    );

    Ok(HolderOutput {
        mesh: joined,
        report,
        holder_port,
        hanger_port,
    })
}

/// Run one stage with timing instrumentation.
fn timed<T>(stage: Stage, run: impl FnOnce() -> HolderResult<T>) -> HolderResult<T> {
    let start = Instant::now();
    let result = run();
    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!(%stage, ?elapsed, "stage completed"),
        Err(error) => warn!(%stage, ?elapsed, %error, "stage failed"),
    }
    result
}

/// The oversized cuboid whose subtraction realizes the clip.
///
/// Half-extents exceed the mesh extents by [`CLIP_SAFETY_MARGIN`] on
/// every axis and the center sits at `z_offset + hz`, so the bottom
/// face lies exactly at the clip plane.
fn clip_cuboid(bounds: &Aabb, z_offset: f64) -> TriMesh {
    let hx = bounds.min.x.abs().max(bounds.max.x.abs()) + CLIP_SAFETY_MARGIN;
    let hy = bounds.min.y.abs().max(bounds.max.y.abs()) + CLIP_SAFETY_MARGIN;
    let hz = bounds.min.z.abs().max(bounds.max.z.abs()) + CLIP_SAFETY_MARGIN;

    cuboid(
        Point3::new(0.0, 0.0, z_offset + hz),
        Vector3::new(2.0 * hx, 2.0 * hy, 2.0 * hz),
    )
}

/// The thin tab unioned onto the clipped mesh at its max-x extreme.
///
/// Sits [`PORT_OUTWARD_OFFSET`] beyond `max_x`, vertically centered
/// just below the clip plane, and is tilted about y through its own
/// center by minus the configured tilt so none of its faces land on the
/// exact-vertical classification boundary of the blocking-face stage.
fn port_cuboid(bounds: &Aabb, params: &HolderParams) -> TriMesh {
    let size = bounds.size();
    let center = Point3::new(
        bounds.max.x + PORT_OUTWARD_OFFSET,
        f64::midpoint(bounds.min.y, bounds.max.y),
        params.z_offset - size.z / 8.0,
    );

    let mut tool = cuboid(center, Vector3::new(PORT_DEPTH, size.y / 4.0, size.z / 4.0));

    let tilt = -params.port_tilt_degrees.to_radians();
    if tilt.abs() > f64::EPSILON {
        let rotation = Transform3D::rotation_y(tilt);
        tool.transform(&Transform3D::rotation_about_point(&rotation, center));
    }

    tool
}

fn boolean_failure(stage: Stage, error: &CsgError) -> HolderError {
    HolderError::BooleanOperation {
        stage,
        reason: error.to_string(),
    }
}

fn hull_failure(error: &CsgError) -> HolderError {
    match error {
        CsgError::EmptyMesh { details } => HolderError::InvalidMesh {
            reason: details.clone(),
        },
        CsgError::DegenerateGeometry { details }
        | CsgError::EmptyResult { details }
        | CsgError::OpenCrossSection { details } => HolderError::DegenerateGeometry {
            reason: details.clone(),
        },
    }
}

fn shell_failure(error: ShellError) -> HolderError {
    match error {
        ShellError::EmptyMesh { details } => HolderError::InvalidMesh { reason: details },
        ShellError::NoShellRemains { removed } => HolderError::DegenerateGeometry {
            reason: format!("no shell remains after deleting {removed} blocking faces"),
        },
        ShellError::InvalidThickness { value } => HolderError::Configuration {
            reason: format!("wall thickness {value} is not usable"),
        },
    }
}
