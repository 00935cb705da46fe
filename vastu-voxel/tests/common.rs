//! Test utilities for VastuVoxel integration tests.
//!
//! Helpers for building maps, integrators, and synthetic scans.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::{Translation3, UnitQuaternion};
use rand::prelude::*;
use vastu_voxel::{
    CellFusion, ConstantRay, DenseGrid, HashedBlocks, Index3D, MapBounds, Point3D,
    PosedPointCloud, RayTracingIntegrator, RayTracingIntegratorConfig, Transformation3D,
    VolumetricMap,
};

/// Default free-space update of the constant-ray model.
pub const FREE: f32 = -0.4;

/// Default occupied update of the constant-ray model.
pub const OCCUPIED: f32 = 0.85;

/// Sparse map with 1 m cells, so metric coordinates read as indices.
pub fn unit_map() -> Arc<HashedBlocks> {
    Arc::new(HashedBlocks::new(1.0, CellFusion::Unbounded))
}

/// Dense map with 1 m cells covering `[-half, half - 1]` on every axis.
pub fn unit_dense_map(half: i32) -> Arc<DenseGrid> {
    let bounds = MapBounds::new(Index3D::splat(-half), Index3D::splat(half - 1));
    Arc::new(DenseGrid::new(1.0, CellFusion::Unbounded, bounds))
}

/// Default-configured integrator over `map`.
pub fn integrator_for<M: VolumetricMap + ?Sized>(map: Arc<M>) -> RayTracingIntegrator<M> {
    RayTracingIntegrator::new(
        RayTracingIntegratorConfig::default(),
        ConstantRay::default(),
        map,
    )
    .unwrap()
}

/// Sensor pose at `position` with yaw only.
pub fn pose(position: [f32; 3], yaw: f32) -> Transformation3D {
    Transformation3D::from_parts(
        Translation3::new(position[0], position[1], position[2]),
        UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
    )
}

/// Cloud with an unrotated sensor at `origin` observing world-frame points.
pub fn cloud_at(origin: [f32; 3], world_points: &[[f32; 3]]) -> PosedPointCloud {
    let points = world_points
        .iter()
        .map(|p| Point3D::new(p[0] - origin[0], p[1] - origin[1], p[2] - origin[2]))
        .collect();
    PosedPointCloud::new(pose(origin, 0.0), points)
}

/// Random scan of `n` points within `radius` of a random origin near zero.
pub fn random_scan(rng: &mut StdRng, n: usize, radius: f32) -> PosedPointCloud {
    let origin = [
        rng.gen_range(-2.0..2.0),
        rng.gen_range(-2.0..2.0),
        rng.gen_range(-1.0..1.0),
    ];
    let yaw = rng.gen_range(-3.1..3.1);
    let points = (0..n)
        .map(|_| {
            Point3D::new(
                rng.gen_range(-radius..radius),
                rng.gen_range(-radius..radius),
                rng.gen_range(-radius / 4.0..radius / 4.0),
            )
        })
        .collect();
    PosedPointCloud::new(pose(origin, yaw), points)
}

/// Every non-zero cell of a map.
pub fn snapshot(map: &dyn VolumetricMap) -> HashMap<Index3D, f32> {
    let mut cells = HashMap::new();
    map.for_each_leaf(&mut |index, value| {
        if value != 0.0 {
            cells.insert(index, value);
        }
    });
    cells
}

/// Assert two snapshots hold the same cells with values within `epsilon`.
pub fn assert_snapshots_close(a: &HashMap<Index3D, f32>, b: &HashMap<Index3D, f32>, epsilon: f32) {
    assert_eq!(a.len(), b.len(), "different number of non-zero cells");
    for (index, value) in a {
        let other = b
            .get(index)
            .unwrap_or_else(|| panic!("cell {} missing from second map", index));
        assert!(
            (value - other).abs() <= epsilon * (1.0 + value.abs()),
            "cell {}: {} vs {}",
            index,
            value,
            other
        );
    }
}
