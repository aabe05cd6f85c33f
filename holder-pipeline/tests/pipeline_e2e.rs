//! End-to-end pipeline scenarios on synthetic source meshes.

use holder_io::write_stl_binary;
use holder_mesh::{cuboid, icosphere, Point3, Transform3D, TriMesh, Vector3};
use holder_pipeline::{
    generate_holder, generate_holder_with_transform, HangerLoader, HangerSpec, HolderError,
    HolderParams, StlHangerLoader,
};

/// Hands the pipeline a fixed synthetic hanger, skipping asset files.
struct FixedHanger(TriMesh);

impl HangerLoader for FixedHanger {
    fn load(&self, _spec: &HangerSpec) -> Result<TriMesh, HolderError> {
        Ok(self.0.clone())
    }
}

fn synthetic_hanger() -> TriMesh {
    cuboid(Point3::new(25.0, 0.0, 0.0), Vector3::new(4.0, 4.0, 4.0))
}

#[test]
fn sphere_source_yields_printable_holder() {
    let source = icosphere(5.0, 2);
    let params = HolderParams::new("hangers");
    let loader = FixedHanger(synthetic_hanger());

    let output = generate_holder(&source, &params, &loader).unwrap();

    assert!(output.report.is_printable(), "report: {}", output.report);

    // The holder opens upward: nothing climbs above the source's top
    let bounds = output.mesh.bounds();
    assert!(bounds.max.z <= source.bounds().max.z);

    // The joined solid reaches the hanger's far face
    assert!((bounds.max.x - 27.0).abs() < 1e-6);

    // The holder's port cluster protrudes past the source geometry
    for p in &output.holder_port.positions {
        assert!(p.x > 5.0, "port vertex {p:?} not on the protruding tab");
    }

    // The hanger's mating corners all sit on its min-x face
    for p in &output.hanger_port.positions {
        assert!((p.x - 23.0).abs() < 1e-9);
    }
}

#[test]
fn plane_above_the_source_keeps_output_bounded() {
    // z_offset above the whole sphere: the clip removes nothing, so the
    // port tab hangs just below the plane and nothing in the output may
    // climb past it. Blocking-face removal strands the hull's upper
    // vertices here; if they leaked through, thickening would raise
    // them far above the plane.
    let source = icosphere(5.0, 2);
    let params = HolderParams::new("hangers").with_z_offset(10.0);
    let loader = FixedHanger(synthetic_hanger());

    let output = generate_holder(&source, &params, &loader).unwrap();

    assert!(output.report.is_printable(), "report: {}", output.report);

    let max_z = output.mesh.bounds().max.z;
    let ceiling = params.z_offset * params.shell_scaleup + 0.1;
    assert!(max_z <= ceiling, "max_z = {max_z}, expected at most {ceiling}");
}

#[test]
fn plane_through_the_source_clips_at_that_height() {
    let source = icosphere(5.0, 2);
    let params = HolderParams::new("hangers").with_z_offset(2.0);
    let loader = FixedHanger(synthetic_hanger());

    let output = generate_holder(&source, &params, &loader).unwrap();

    assert!(output.report.is_printable());

    // Holder geometry stays at or below the scaled clip height; only
    // the hanger (top at z = 2) may match it
    let max_z = output.mesh.bounds().max.z;
    assert!(max_z <= 2.0 * params.shell_scaleup + 0.2, "max_z = {max_z}");
    assert!(max_z < source.bounds().max.z);
}

#[test]
fn world_transform_is_baked_before_clipping() {
    // An off-center sphere pushed back over the origin by the transform
    let mut source = icosphere(5.0, 2);
    source.translate(Vector3::new(0.0, 0.0, 40.0));

    let params = HolderParams::new("hangers");
    let loader = FixedHanger(synthetic_hanger());
    let shift = Transform3D::translation(0.0, 0.0, -40.0);

    let output =
        generate_holder_with_transform(&source, Some(&shift), &params, &loader).unwrap();

    assert!(output.report.is_printable());
    assert!(output.mesh.bounds().max.z <= 5.0);
}

#[test]
fn stl_backed_hanger_runs_the_full_path() {
    let dir = tempfile::tempdir().unwrap();
    write_stl_binary(
        &synthetic_hanger(),
        dir.path().join("clamp_frame.stl"),
    )
    .unwrap();

    let source = icosphere(5.0, 2);
    let params = HolderParams::new(dir.path());

    let output = generate_holder(&source, &params, &StlHangerLoader).unwrap();
    assert!(output.report.is_printable());
}

#[test]
fn invalid_configuration_aborts_before_any_geometry() {
    let source = icosphere(5.0, 1);
    let params = HolderParams::default(); // hanger_dir missing
    let loader = FixedHanger(synthetic_hanger());

    let result = generate_holder(&source, &params, &loader);
    assert!(matches!(result, Err(HolderError::Configuration { .. })));
}

#[test]
fn empty_source_is_rejected() {
    let params = HolderParams::new("hangers");
    let loader = FixedHanger(synthetic_hanger());

    let result = generate_holder(&TriMesh::new(), &params, &loader);
    assert!(matches!(result, Err(HolderError::InvalidMesh { .. })));
}

#[test]
fn dangling_face_index_is_rejected() {
    let mut source = icosphere(5.0, 1);
    source.faces.push([0, 1, 9999]);

    let params = HolderParams::new("hangers");
    let loader = FixedHanger(synthetic_hanger());

    let result = generate_holder(&source, &params, &loader);
    assert!(matches!(result, Err(HolderError::InvalidMesh { .. })));
}

#[test]
fn source_entirely_above_the_plane_fails_the_clip() {
    let mut source = icosphere(5.0, 1);
    source.translate(Vector3::new(0.0, 0.0, 20.0));

    let params = HolderParams::new("hangers");
    let loader = FixedHanger(synthetic_hanger());

    let result = generate_holder(&source, &params, &loader);
    assert!(matches!(
        result,
        Err(HolderError::BooleanOperation { .. })
    ));
}

#[test]
fn caller_source_is_never_mutated() {
    let source = icosphere(5.0, 2);
    let before_vertices = source.vertices.clone();
    let before_faces = source.faces.clone();

    let params = HolderParams::new("hangers");
    let loader = FixedHanger(synthetic_hanger());
    let _ = generate_holder(&source, &params, &loader).unwrap();

    assert_eq!(source.vertices, before_vertices);
    assert_eq!(source.faces, before_faces);
}
