//! Benchmark full-scan integration.

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vastu_voxel::{
    CellFusion, ConstantRay, DenseGrid, HashedBlocks, Index3D, MapBounds, Point3D,
    PosedPointCloud, RayTracingIntegrator, RayTracingIntegratorConfig, Transformation3D,
    VolumetricMap,
};

/// Spinning-lidar scan inside a box room centred on the sensor.
fn room_scan(half_extent: f32, rings: usize, points_per_ring: usize) -> PosedPointCloud {
    let mut points = Vec::with_capacity(rings * points_per_ring);
    for ring in 0..rings {
        let elevation = -PI / 8.0 + (PI / 4.0) * ring as f32 / rings.max(1) as f32;
        for i in 0..points_per_ring {
            let azimuth = TAU * i as f32 / points_per_ring as f32;
            let direction = Point3D::new(
                elevation.cos() * azimuth.cos(),
                elevation.cos() * azimuth.sin(),
                elevation.sin(),
            )
            .coords;
            // Distance to the nearest wall along this direction
            let range = direction
                .iter()
                .filter(|d| d.abs() > 1e-6)
                .map(|d| half_extent / d.abs())
                .fold(f32::INFINITY, f32::min);
            points.push(Point3D::from(direction * range));
        }
    }
    PosedPointCloud::new(Transformation3D::identity(), points)
}

fn make_integrator<M: VolumetricMap + ?Sized>(map: Arc<M>) -> RayTracingIntegrator<M> {
    RayTracingIntegrator::new(
        RayTracingIntegratorConfig::default(),
        ConstantRay::default(),
        map,
    )
    .unwrap()
}

fn bench_scan_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate_hashed_blocks");

    for points_per_ring in [256, 1024].iter() {
        let scan = room_scan(5.0, 16, *points_per_ring);
        let map = Arc::new(HashedBlocks::new(0.1, CellFusion::DEFAULT_SATURATION));
        let integrator = make_integrator(map);

        // Warm up: allocate blocks
        integrator.integrate_with_stats(&scan);

        group.bench_with_input(
            BenchmarkId::from_parameter(scan.len()),
            &scan,
            |b, scan| b.iter(|| black_box(integrator.integrate_with_stats(black_box(scan)))),
        );
    }

    group.finish();
}

fn bench_dense_grid(c: &mut Criterion) {
    let scan = room_scan(5.0, 16, 512);
    let bounds = MapBounds::new(Index3D::splat(-64), Index3D::splat(63));
    let map = Arc::new(DenseGrid::new(0.1, CellFusion::DEFAULT_SATURATION, bounds));
    let integrator = make_integrator(map);

    c.bench_function("integrate_dense_grid_8192pts", |b| {
        b.iter(|| black_box(integrator.integrate_with_stats(black_box(&scan))))
    });
}

fn bench_prune(c: &mut Criterion) {
    let scan = room_scan(5.0, 16, 512);
    let map = Arc::new(HashedBlocks::new(0.1, CellFusion::Unbounded));
    make_integrator(map.clone()).integrate_with_stats(&scan);

    c.bench_function("prune_hashed_blocks", |b| b.iter(|| map.prune()));
}

criterion_group!(benches, bench_scan_sizes, bench_dense_grid, bench_prune);
criterion_main!(benches);
