//! Grid traversal primitives.
//!
//! - [`GridRay`]: enumerate every cell a metric segment passes through, in
//!   order, at a fixed cell width (3-D Amanatides–Woo boundary crossing).

mod grid_ray;

pub use grid_ray::{GridRay, RayStep, cells_along_segment};
