//! # VastuVoxel
//!
//! 3D probabilistic occupancy mapping from range measurements.
//!
//! ## Overview
//!
//! Each range measurement (a point observed from a known sensor pose) is
//! turned into a ray. Cells the ray passes through gain evidence of free
//! space; the cell holding the return gains evidence of a surface. Evidence is
//! stored per cell as additive log-odds:
//!
//! - **Unknown** - `0.0`, never observed
//! - **Free** - negative log-odds
//! - **Occupied** - positive log-odds
//!
//! ## Features
//!
//! - **Grid Ray Traversal**: exact 3D voxel walk (Amanatides–Woo)
//! - **Measurement Models**: constant free/occupied updates along a ray
//! - **Volumetric Maps**: sparse hashed blocks or a bounded dense grid, both
//!   safe for concurrent updates through a shared handle
//! - **Ray-Tracing Integrator**: parallel per-point fusion of posed point
//!   clouds and depth images with range gating
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vastu_voxel::{Integrator, PosedPointCloud, Point3D, Transformation3D, VoxelConfig};
//!
//! let config = VoxelConfig::default();
//! let map = config.build_map()?;
//! let integrator = config.build_integrator(map.clone())?;
//!
//! let cloud = PosedPointCloud::new(
//!     Transformation3D::identity(),
//!     vec![Point3D::new(10.0, 0.0, 0.0)],
//! );
//! integrator.integrate_pointcloud(&cloud);
//!
//! assert!(map.is_occupied(&Point3D::new(10.05, 0.05, 0.05)));
//! ```
//!
//! ## Coordinate System
//!
//! Right-handed, meters. Cell `i` along an axis covers
//! `[i * width, (i + 1) * width)`.

#![warn(missing_docs)]

// Core types
pub mod core;

// Parameter maps and validated configuration
pub mod config;

// Cell walk along a segment
pub mod traversal;

// Ray measurement models
pub mod measurement;

// Map representations
pub mod map;

// Sensor fusion
pub mod integrator;

// Scenario replay and statistics
pub mod io;

// Re-export commonly used types
pub use core::{
    Index3D, PinholeIntrinsics, Point3D, PosedDepthImage, PosedPointCloud, SensorError,
    SensorInput, Transformation3D, Vector3D,
};

pub use config::{ConfigError, ConfigLoadError, ParamMap, ParamValue, ValidatedConfig, VoxelConfig};

pub use traversal::{GridRay, RayStep};

pub use measurement::{ConstantRay, ConstantRayConfig, MeasurementModel};

pub use map::{
    CellFusion, DenseGrid, HashedBlocks, MapBounds, MapConfig, MapError, MapKind, SharedMap,
    VolumetricMap,
};

pub use integrator::{
    Integrator, IntegratorType, RayTracingIntegrator, RayTracingIntegratorConfig, ScanStats,
    build_integrator,
};

pub use io::{MapStatistics, Scenario};
