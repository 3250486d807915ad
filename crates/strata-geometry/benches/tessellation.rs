//! Benchmarks for fill and stroke tessellation

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec2;
use strata_geometry::raster::{fill_path, stroke_path};
use strata_geometry::tess::HalfEdgeMesh;
use strata_geometry::{LineJoin, Mesh, Path, PathBuilder, StrokeStyle};

fn star(points: usize) -> Path {
    let vertices: Vec<Vec2> = (0..points * 2)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::PI / points as f32;
            let radius = if i % 2 == 0 { 100.0 } else { 40.0 };
            Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect();
    let mut builder = PathBuilder::new();
    builder.polygon(&vertices);
    builder.build()
}

fn circles(count: usize) -> Path {
    let mut builder = PathBuilder::new();
    for i in 0..count {
        builder.circle(Vec2::new(i as f32 * 30.0, 0.0), 12.0);
    }
    builder.build()
}

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_path");

    for points in [5, 50, 500] {
        let path = star(points);
        group.throughput(Throughput::Elements(points as u64 * 2));

        group.bench_with_input(BenchmarkId::new("star", points), &path, |b, path| {
            let mut mesh = Mesh::new();
            b.iter(|| {
                mesh.reset();
                fill_path(&mut mesh, black_box(path))
            });
        });
    }

    group.finish();
}

fn bench_stroke(c: &mut Criterion) {
    let mut group = c.benchmark_group("stroke_path");

    for count in [1, 10, 100] {
        let path = circles(count);
        group.throughput(Throughput::Elements(count as u64));

        for join in [LineJoin::Miter, LineJoin::Round] {
            let style = StrokeStyle::new(4.0).with_join(join);
            let id = BenchmarkId::new(format!("circles_{:?}", join), count);
            group.bench_with_input(id, &path, |b, path| {
                let mut mesh = Mesh::new();
                b.iter(|| {
                    mesh.reset();
                    stroke_path(&mut mesh, black_box(path), style)
                });
            });
        }
    }

    group.finish();
}

fn bench_half_edge(c: &mut Criterion) {
    let mut group = c.benchmark_group("half_edge_triangulate");

    for sides in [8, 64, 512] {
        let points: Vec<Vec2> = (0..sides)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / sides as f32;
                Vec2::new(angle.cos(), angle.sin()) * 100.0
            })
            .collect();
        group.throughput(Throughput::Elements(sides as u64));

        group.bench_with_input(BenchmarkId::from_parameter(sides), &points, |b, points| {
            b.iter(|| {
                let mut mesh = HalfEdgeMesh::new();
                if let Some(e) = mesh.add_polygon(black_box(points)) {
                    if let Some(face) = mesh.l_face(e) {
                        mesh.triangulate_face(face);
                    }
                }
                mesh
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fill, bench_stroke, bench_half_edge);
criterion_main!(benches);
