//! Ray-tracing integrator.
//!
//! For every point of a scan:
//! 1. Transform the point into the map frame
//! 2. Skip it if it is non-finite or closer than `min_range`
//! 3. Clip the ray to `max_range` (a clipped ray observed no surface)
//! 4. Walk the cells along the ray at the map's finest resolution
//! 5. Apply the measurement model's update to each cell
//!
//! Points are processed in parallel on the rayon pool. Cells shared by several
//! rays receive one update per ray.

use std::ops::{Add, AddAssign};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::Integrator;
use crate::config::validate::{require_gt, require_lt};
use crate::config::{ConfigError, ParamMap, ValidatedConfig};
use crate::core::{Point3D, PosedPointCloud};
use crate::map::VolumetricMap;
use crate::measurement::{ConstantRay, MeasurementModel};
use crate::traversal::GridRay;

/// Range limits for [`RayTracingIntegrator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RayTracingIntegratorConfig {
    /// Returns closer than this are discarded (meters).
    pub min_range: f32,

    /// Rays are clipped to this length (meters).
    ///
    /// Returns beyond it only mark free space.
    pub max_range: f32,
}

impl Default for RayTracingIntegratorConfig {
    fn default() -> Self {
        Self {
            min_range: 0.5,
            max_range: 20.0,
        }
    }
}

impl ValidatedConfig for RayTracingIntegratorConfig {
    const NAME: &'static str = "RayTracingIntegratorConfig";

    fn validation_errors(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        require_gt(&mut errors, "min_range", self.min_range, 0.0);
        require_lt(&mut errors, "min_range", self.min_range, self.max_range);
        errors
    }

    fn parse_params(params: &ParamMap) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            min_range: params.get_f32("min_range", defaults.min_range)?,
            max_range: params.get_f32("max_range", defaults.max_range)?,
        })
    }
}

/// Per-scan integration counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Rays that ended on an observed surface
    pub surface_rays: usize,
    /// Rays clipped to `max_range`
    pub clipped_rays: usize,
    /// Points closer than `min_range`
    pub too_close: usize,
    /// Points with NaN or infinite coordinates
    pub non_finite: usize,
    /// Cell updates applied
    pub cell_updates: usize,
    /// Cell updates the map rejected
    pub failed_updates: usize,
}

impl ScanStats {
    /// Points that produced a ray.
    pub fn rays(&self) -> usize {
        self.surface_rays + self.clipped_rays
    }

    /// Points skipped without touching the map.
    pub fn skipped(&self) -> usize {
        self.too_close + self.non_finite
    }
}

impl Add for ScanStats {
    type Output = ScanStats;

    fn add(mut self, rhs: ScanStats) -> ScanStats {
        self += rhs;
        self
    }
}

impl AddAssign for ScanStats {
    fn add_assign(&mut self, rhs: ScanStats) {
        self.surface_rays += rhs.surface_rays;
        self.clipped_rays += rhs.clipped_rays;
        self.too_close += rhs.too_close;
        self.non_finite += rhs.non_finite;
        self.cell_updates += rhs.cell_updates;
        self.failed_updates += rhs.failed_updates;
    }
}

/// Integrator that traces one ray per point.
///
/// Generic over the map representation and the measurement model; the default
/// parameters give a type-erased map with the constant-ray model.
pub struct RayTracingIntegrator<M: VolumetricMap + ?Sized = dyn VolumetricMap, R = ConstantRay>
where
    R: MeasurementModel,
{
    config: RayTracingIntegratorConfig,
    model: R,
    map: Arc<M>,
}

impl<M: VolumetricMap + ?Sized, R: MeasurementModel> RayTracingIntegrator<M, R> {
    /// Create an integrator over a shared map.
    ///
    /// Fails if `config` violates `0 < min_range < max_range`.
    pub fn new(
        config: RayTracingIntegratorConfig,
        model: R,
        map: Arc<M>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.check_valid()?,
            model,
            map,
        })
    }

    /// Validated configuration
    pub fn config(&self) -> &RayTracingIntegratorConfig {
        &self.config
    }

    /// Measurement model
    pub fn model(&self) -> &R {
        &self.model
    }

    /// Shared map handle
    pub fn map(&self) -> &Arc<M> {
        &self.map
    }

    /// Fuse a scan and report what happened to its points.
    pub fn integrate_with_stats(&self, cloud: &PosedPointCloud) -> ScanStats {
        let origin = cloud.origin();
        let pose = cloud.pose();
        cloud
            .points_local()
            .par_iter()
            .map(|local| {
                if !local.coords.iter().all(|c| c.is_finite()) {
                    return ScanStats {
                        non_finite: 1,
                        ..ScanStats::default()
                    };
                }
                self.integrate_ray(&origin, &pose.transform_point(local))
            })
            .reduce(ScanStats::default, |a, b| a + b)
    }

    /// Fuse a single ray from `origin` to `endpoint`, both in the map frame.
    pub fn integrate_ray(&self, origin: &Point3D, endpoint: &Point3D) -> ScanStats {
        let mut stats = ScanStats::default();
        let offset = endpoint - origin;
        let range = offset.norm();

        if range < self.config.min_range {
            stats.too_close = 1;
            return stats;
        }

        let (end, clipped) = if range > self.config.max_range {
            (origin + offset * (self.config.max_range / range), true)
        } else {
            (*endpoint, false)
        };

        let ray = GridRay::new(origin, &end, self.map.min_cell_width());
        // A clipped ray has no surface on it: every cell is free space.
        let ray_length = if clipped { f32::INFINITY } else { ray.length() };

        for step in ray {
            let update = self.model.update_at(step.distance, ray_length);
            match self.map.add_to_cell_value(step.index, update) {
                Ok(()) => stats.cell_updates += 1,
                Err(e) => {
                    log::trace!("Skipping cell update: {}", e);
                    stats.failed_updates += 1;
                }
            }
        }

        if clipped {
            stats.clipped_rays = 1;
        } else {
            stats.surface_rays = 1;
        }
        stats
    }
}

impl<M: VolumetricMap + ?Sized, R: MeasurementModel> Integrator for RayTracingIntegrator<M, R> {
    fn integrate_pointcloud(&self, cloud: &PosedPointCloud) {
        let stats = self.integrate_with_stats(cloud);
        log::debug!(
            "Integrated {} points: {} surface, {} clipped, {} skipped, {} cell updates",
            cloud.len(),
            stats.surface_rays,
            stats.clipped_rays,
            stats.skipped(),
            stats.cell_updates
        );
        if stats.failed_updates > 0 {
            log::debug!("{} cell updates rejected by the map", stats.failed_updates);
        }
    }
}

impl<M: VolumetricMap + ?Sized, R: MeasurementModel + std::fmt::Debug> std::fmt::Debug
    for RayTracingIntegrator<M, R>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RayTracingIntegrator")
            .field("config", &self.config)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Index3D, Transformation3D};
    use crate::map::{CellFusion, HashedBlocks};

    const FREE: f32 = -0.4;
    const OCCUPIED: f32 = 0.85;

    fn create_integrator() -> RayTracingIntegrator<HashedBlocks> {
        let map = Arc::new(HashedBlocks::new(1.0, CellFusion::Unbounded));
        RayTracingIntegrator::new(
            RayTracingIntegratorConfig::default(),
            ConstantRay::default(),
            map,
        )
        .unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RayTracingIntegratorConfig::default();
        assert_eq!(config.min_range, 0.5);
        assert_eq!(config.max_range, 20.0);
        assert!(config.is_valid(false));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let map = Arc::new(HashedBlocks::new(1.0, CellFusion::Unbounded));
        for (min_range, max_range) in [(0.0, 20.0), (-1.0, 20.0), (5.0, 5.0), (10.0, 2.0)] {
            let config = RayTracingIntegratorConfig {
                min_range,
                max_range,
            };
            assert!(!config.is_valid(false));
            assert!(
                RayTracingIntegrator::new(config, ConstantRay::default(), map.clone()).is_err()
            );
        }
    }

    #[test]
    fn test_surface_ray_marks_endpoint() {
        let integrator = create_integrator();
        let stats = integrator.integrate_ray(&Point3D::origin(), &Point3D::new(3.5, 0.5, 0.5));
        assert_eq!(stats.surface_rays, 1);
        assert_eq!(stats.cell_updates, 4);

        let map = integrator.map();
        assert_eq!(map.get_cell_value(Index3D::new(3, 0, 0)), OCCUPIED);
        for x in 0..3 {
            assert_eq!(map.get_cell_value(Index3D::new(x, 0, 0)), FREE);
        }
    }

    #[test]
    fn test_clipped_ray_has_no_occupied_cell() {
        let integrator = create_integrator();
        let stats = integrator.integrate_ray(&Point3D::origin(), &Point3D::new(30.0, 0.0, 0.0));
        assert_eq!(stats.clipped_rays, 1);

        let mut occupied = 0;
        integrator.map().for_each_leaf(&mut |_, value| {
            if value > 0.0 {
                occupied += 1;
            }
        });
        assert_eq!(occupied, 0);
        assert_eq!(integrator.map().get_cell_value(Index3D::new(20, 0, 0)), FREE);
        assert_eq!(integrator.map().get_cell_value(Index3D::new(21, 0, 0)), 0.0);
    }

    #[test]
    fn test_close_point_skipped() {
        let integrator = create_integrator();
        let stats = integrator.integrate_ray(&Point3D::origin(), &Point3D::new(0.1, 0.0, 0.0));
        assert_eq!(stats.too_close, 1);
        assert!(integrator.map().is_empty());
    }

    #[test]
    fn test_non_finite_points_skipped() {
        let integrator = create_integrator();
        let cloud = PosedPointCloud::new(
            Transformation3D::identity(),
            vec![
                Point3D::new(f32::NAN, 0.0, 0.0),
                Point3D::new(5.5, 0.5, 0.5),
                Point3D::new(0.0, f32::INFINITY, 0.0),
            ],
        );
        let stats = integrator.integrate_with_stats(&cloud);
        assert_eq!(stats.non_finite, 2);
        assert_eq!(stats.surface_rays, 1);
        assert_eq!(integrator.map().get_cell_value(Index3D::new(5, 0, 0)), OCCUPIED);
    }

    #[test]
    fn test_failed_updates_do_not_abort_ray() {
        use crate::map::{DenseGrid, MapBounds};

        let bounds = MapBounds::new(Index3D::splat(-2), Index3D::splat(2));
        let map = Arc::new(DenseGrid::new(1.0, CellFusion::Unbounded, bounds));
        let integrator = RayTracingIntegrator::new(
            RayTracingIntegratorConfig::default(),
            ConstantRay::default(),
            map,
        )
        .unwrap();

        let stats = integrator.integrate_ray(&Point3D::origin(), &Point3D::new(5.5, 0.5, 0.5));
        assert_eq!(stats.cell_updates, 3);
        assert_eq!(stats.failed_updates, 3);
        assert_eq!(integrator.map().get_cell_value(Index3D::new(2, 0, 0)), FREE);
    }

    #[test]
    fn test_scan_stats_accumulate() {
        let a = ScanStats {
            surface_rays: 1,
            cell_updates: 4,
            ..ScanStats::default()
        };
        let b = ScanStats {
            too_close: 2,
            ..ScanStats::default()
        };
        let total = a + b;
        assert_eq!(total.rays(), 1);
        assert_eq!(total.skipped(), 2);
        assert_eq!(total.cell_updates, 4);
    }
}
