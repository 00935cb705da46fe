//! Core types for the vastu-voxel library.
//!
//! All metric quantities are in meters and expressed in the map frame unless
//! a type says otherwise (sensor-frame points inside a [`PosedPointCloud`]).
//!
//! ## Type Categories
//!
//! ### Coordinates
//! - [`Point3D`]: Floating-point map coordinates
//! - [`Index3D`]: Integer cell indices at the finest map resolution
//! - [`Transformation3D`]: Rigid-body sensor pose
//!
//! ### Sensors
//! - [`PosedPointCloud`]: Sensor-frame points plus one pose
//! - [`PosedDepthImage`]: Depth image plus pinhole intrinsics and pose
//! - [`SensorInput`]: Either of the above, dispatched by the integrators
//!
//! ## Example
//!
//! ```rust,ignore
//! use vastu_voxel::core::{Index3D, Point3D, PosedPointCloud, Transformation3D};
//!
//! let cloud = PosedPointCloud::new(Transformation3D::identity(), points);
//! for point in cloud.points_global() {
//!     let index = Index3D::from_point(&point, 1.0 / 0.1);
//! }
//! ```

mod index;
mod sensors;

pub use index::{Index3D, Point3D, Transformation3D, Vector3D};
pub use sensors::{
    PinholeIntrinsics, PosedDepthImage, PosedPointCloud, SensorError, SensorInput,
};
