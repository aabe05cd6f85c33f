//! Benchmarks for shell building.
//!
//! Run with: cargo bench -p holder-shell

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use holder_csg::{clip_above, convex_hull};
use holder_mesh::{icosphere, TriMesh};
use holder_shell::{remove_blocking_faces, thicken_shell};
use std::hint::black_box;

/// An upward-open shell the way the pipeline produces one: clipped
/// sphere, hulled, blocking faces removed.
fn open_shell(subdivisions: u32) -> TriMesh {
    let sphere = icosphere(5.0, subdivisions);
    let clipped = clip_above(&sphere, 0.0).unwrap();
    let mut hull = convex_hull(&clipped).unwrap();
    remove_blocking_faces(&mut hull, None).unwrap();
    hull
}

fn bench_blocking_removal(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_blocking_faces");

    for subdivisions in [2u32, 3, 4] {
        let sphere = icosphere(5.0, subdivisions);
        let hull = convex_hull(&clip_above(&sphere, 0.0).unwrap()).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(hull.face_count()),
            &hull,
            |b, mesh| {
                b.iter(|| {
                    let mut working = mesh.clone();
                    remove_blocking_faces(black_box(&mut working), None)
                });
            },
        );
    }

    group.finish();
}

fn bench_thicken(c: &mut Criterion) {
    let mut group = c.benchmark_group("thicken_shell");

    for subdivisions in [2u32, 3, 4] {
        let shell = open_shell(subdivisions);
        group.bench_with_input(
            BenchmarkId::from_parameter(shell.face_count()),
            &shell,
            |b, mesh| b.iter(|| thicken_shell(black_box(mesh), 2.0)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_blocking_removal, bench_thicken);
criterion_main!(benches);
