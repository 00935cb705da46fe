//! Integrators fuse posed sensor measurements into a shared map.
//!
//! An integrator holds an immutable, validated configuration and a shared map
//! handle. It keeps no mutable state between calls, so any number of threads
//! may call it at once; the map serialises concurrent cell updates.

mod ray_tracing;

pub use ray_tracing::{RayTracingIntegrator, RayTracingIntegratorConfig, ScanStats};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ParamMap, ValidatedConfig};
use crate::core::{PosedDepthImage, PosedPointCloud, SensorInput};
use crate::map::SharedMap;
use crate::measurement::{ConstantRay, ConstantRayConfig};

/// Fuses sensor measurements into a map.
pub trait Integrator: Send + Sync {
    /// Fuse one posed point cloud. Returns once every point has been applied.
    fn integrate_pointcloud(&self, cloud: &PosedPointCloud);

    /// Fuse a depth image by back-projecting it to a point cloud.
    fn integrate_depth_image(&self, image: &PosedDepthImage) {
        self.integrate_pointcloud(&image.to_pointcloud());
    }

    /// Fuse any supported sensor input.
    fn integrate(&self, input: &SensorInput) {
        match input {
            SensorInput::Pointcloud(cloud) => self.integrate_pointcloud(cloud),
            SensorInput::DepthImage(image) => self.integrate_depth_image(image),
        }
    }
}

/// Available integration strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorType {
    /// [`RayTracingIntegrator`]
    #[default]
    RayTracing,
}

impl IntegratorType {
    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegratorType::RayTracing => "ray_tracing",
        }
    }
}

impl FromStr for IntegratorType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ray_tracing" => Ok(IntegratorType::RayTracing),
            other => Err(ConfigError::UnknownVariant {
                kind: "integrator type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for IntegratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build an integrator from parameter sections.
///
/// `integrator_params` selects the strategy through its `type` key
/// (default `ray_tracing`) and carries that strategy's parameters;
/// `model_params` configures the measurement model.
pub fn build_integrator(
    integrator_params: &ParamMap,
    model_params: &ParamMap,
    map: SharedMap,
) -> Result<Box<dyn Integrator>, ConfigError> {
    let integrator_type: IntegratorType = integrator_params
        .get_str("type", IntegratorType::default().as_str())?
        .parse()?;
    log::info!("Integrator: {}", integrator_type);

    match integrator_type {
        IntegratorType::RayTracing => {
            let config = RayTracingIntegratorConfig::from_params(integrator_params)?;
            let model = ConstantRay::new(ConstantRayConfig::from_params(model_params)?)?;
            Ok(Box::new(RayTracingIntegrator::new(config, model, map)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapConfig;

    #[test]
    fn test_build_default_integrator() {
        let map = MapConfig::default().build().unwrap();
        assert!(build_integrator(&ParamMap::new(), &ParamMap::new(), map).is_ok());
    }

    #[test]
    fn test_build_rejects_unknown_type() {
        let map = MapConfig::default().build().unwrap();
        let params = ParamMap::new().with("type", "projective");
        let result = build_integrator(&params, &ParamMap::new(), map);
        assert!(matches!(result, Err(ConfigError::UnknownVariant { .. })));
    }

    #[test]
    fn test_build_rejects_invalid_range() {
        let map = MapConfig::default().build().unwrap();
        let params = ParamMap::new().with("min_range", 5.0).with("max_range", 1.0);
        assert!(build_integrator(&params, &ParamMap::new(), map).is_err());
    }
}
