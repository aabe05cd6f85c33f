//! Benchmarks for solid-geometry operations.
//!
//! Run with: cargo bench -p holder-csg

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use holder_csg::{clip_above, convex_hull, union_meshes};
use holder_mesh::{cuboid, icosphere, Point3, Vector3};
use std::hint::black_box;

fn bench_clip(c: &mut Criterion) {
    let mut group = c.benchmark_group("clip_above");

    for subdivisions in [2u32, 3, 4] {
        let sphere = icosphere(5.0, subdivisions);
        group.bench_with_input(
            BenchmarkId::from_parameter(sphere.face_count()),
            &sphere,
            |b, mesh| b.iter(|| clip_above(black_box(mesh), 0.0)),
        );
    }

    group.finish();
}

fn bench_hull(c: &mut Criterion) {
    let mut group = c.benchmark_group("convex_hull");

    for subdivisions in [2u32, 3, 4] {
        let sphere = icosphere(5.0, subdivisions);
        group.bench_with_input(
            BenchmarkId::from_parameter(sphere.vertex_count()),
            &sphere,
            |b, mesh| b.iter(|| convex_hull(black_box(mesh))),
        );
    }

    group.finish();
}

fn bench_union(c: &mut Criterion) {
    let mut group = c.benchmark_group("union_meshes");

    for subdivisions in [1u32, 2, 3] {
        let body = icosphere(5.0, subdivisions);
        let tab = cuboid(Point3::new(6.0, 0.0, -0.6), Vector3::new(1.0, 2.5, 1.25));
        group.bench_with_input(
            BenchmarkId::from_parameter(body.face_count()),
            &(body, tab),
            |b, (body, tab)| b.iter(|| union_meshes(black_box(body), black_box(tab))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_clip, bench_hull, bench_union);
criterion_main!(benches);
