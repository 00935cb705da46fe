//! Configuration: parameter maps, validated component configs, and the
//! unified YAML file.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vastu_voxel::config::VoxelConfig;
//!
//! // Load from default path (configs/config.yaml), or defaults if absent
//! let config = VoxelConfig::load_default()?;
//!
//! let map = config.build_map()?;
//! let integrator = config.build_integrator(map.clone())?;
//! ```
//!
//! ## Sections
//!
//! | Section | Parsed by |
//! |---------|-----------|
//! | `map` | [`MapConfig`](crate::map::MapConfig) |
//! | `integrator` | [`RayTracingIntegratorConfig`](crate::integrator::RayTracingIntegratorConfig) |
//! | `measurement_model` | [`ConstantRayConfig`](crate::measurement::ConstantRayConfig) |
//!
//! ## Example YAML
//!
//! ```yaml
//! map:
//!   kind: hashed_blocks
//!   min_cell_width: 0.1
//!   fusion: saturating
//!
//! integrator:
//!   type: ray_tracing
//!   min_range: 0.5
//!   max_range: 20.0
//!
//! measurement_model:
//!   log_odds_free: -0.4
//!   log_odds_occupied: 0.85
//! ```

mod error;
mod param;
pub(crate) mod validate;
mod voxel;

pub use error::{ConfigError, ConfigLoadError};
pub use param::{ParamMap, ParamValue};
pub use validate::ValidatedConfig;
pub use voxel::VoxelConfig;
