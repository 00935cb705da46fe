//! Unified YAML configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigLoadError};
use super::param::ParamMap;
use super::validate::ValidatedConfig;
use crate::integrator::{Integrator, RayTracingIntegratorConfig, build_integrator};
use crate::map::{MapConfig, SharedMap};
use crate::measurement::ConstantRayConfig;

/// Full configuration loaded from YAML.
///
/// Each section is kept as a raw parameter map and parsed by the component
/// it configures, so unknown sections and keys are ignored and missing keys
/// fall back to defaults.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct VoxelConfig {
    /// Map representation and resolution
    #[serde(default)]
    pub map: ParamMap,

    /// Integration strategy and range limits
    #[serde(default)]
    pub integrator: ParamMap,

    /// Measurement model magnitudes
    #[serde(default)]
    pub measurement_model: ParamMap,
}

impl VoxelConfig {
    /// Default config file location, relative to the working directory.
    pub const DEFAULT_PATH: &'static str = "configs/config.yaml";

    /// Load from YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/config.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new(Self::DEFAULT_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Validated map configuration
    pub fn map_config(&self) -> Result<MapConfig, ConfigError> {
        MapConfig::from_params(&self.map)
    }

    /// Validated ray-tracing integrator configuration
    pub fn integrator_config(&self) -> Result<RayTracingIntegratorConfig, ConfigError> {
        RayTracingIntegratorConfig::from_params(&self.integrator)
    }

    /// Validated measurement model configuration
    pub fn measurement_config(&self) -> Result<ConstantRayConfig, ConfigError> {
        ConstantRayConfig::from_params(&self.measurement_model)
    }

    /// Build the configured map.
    pub fn build_map(&self) -> Result<SharedMap, ConfigError> {
        self.map_config()?.build()
    }

    /// Build the configured integrator over `map`.
    pub fn build_integrator(&self, map: SharedMap) -> Result<Box<dyn Integrator>, ConfigError> {
        build_integrator(&self.integrator, &self.measurement_model, map)
    }
}
