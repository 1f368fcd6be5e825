use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::DVec3;
use tessella_mesh::*;

/// A jagged ring of `points * 2` positions in the xy plane.
fn star(points: usize) -> Polygon {
    let ring = (0..points * 2)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::PI / points as f64;
            let r = if i % 2 == 0 { 100.0 } else { 60.0 };
            DVec3::new(r * angle.cos(), r * angle.sin(), 12.0)
        })
        .collect();
    Polygon::new(ring)
}

fn flat_xy(polygon: &Polygon) -> Vec<f64> {
    polygon.exterior.iter().flat_map(|p| [p.x, p.y]).collect()
}

fn bench_delaunay_star(c: &mut Criterion) {
    let coords = flat_xy(&star(256));
    c.bench_function("delaunay_star_512", |bencher| {
        bencher.iter(|| black_box(ConstrainedDelaunay.triangulate(black_box(&coords), &[])))
    });
}

fn bench_ear_clipping_star(c: &mut Criterion) {
    let coords = flat_xy(&star(256));
    c.bench_function("ear_clipping_star_512", |bencher| {
        bencher.iter(|| black_box(EarClipping.triangulate(black_box(&coords), &[])))
    });
}

fn bench_mesh_builder(c: &mut Criterion) {
    let polygons: Vec<Polygon> = (0..64).map(|_| star(16)).collect();
    let geometry = Geometry::MultiPolygon(polygons);
    c.bench_function("mesh_builder_64_stars", |bencher| {
        bencher.iter(|| {
            let mut builder = MeshBuilder::new(MeshOptions::default());
            builder.add_geometry("bench", black_box(&geometry));
            black_box(builder.build())
        })
    });
}

criterion_group!(
    benches,
    bench_delaunay_star,
    bench_ear_clipping_star,
    bench_mesh_builder
);
criterion_main!(benches);
