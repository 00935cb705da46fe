//! Point and cell index types for the volumetric map.

use nalgebra::{Isometry3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Metric point in the map frame (meters).
pub type Point3D = Point3<f32>;

/// Metric vector in the map frame (meters).
pub type Vector3D = Vector3<f32>;

/// Rigid-body transform from a sensor frame to the map frame.
pub type Transformation3D = Isometry3<f32>;

/// Integer cell index at the map's finest resolution.
///
/// Cell `(x, y, z)` covers `[x * w, (x + 1) * w)` along each axis, where `w` is
/// the cell width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Index3D {
    /// X index
    pub x: i32,
    /// Y index
    pub y: i32,
    /// Z index
    pub z: i32,
}

impl Index3D {
    /// Create a new cell index
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Index with the same value on every axis
    #[inline]
    pub const fn splat(value: i32) -> Self {
        Self::new(value, value, value)
    }

    /// Index of the cell containing `point`, given the inverse cell width.
    #[inline]
    pub fn from_point(point: &Point3D, cell_width_inv: f32) -> Self {
        Self::new(
            (point.x * cell_width_inv).floor() as i32,
            (point.y * cell_width_inv).floor() as i32,
            (point.z * cell_width_inv).floor() as i32,
        )
    }

    /// Center of this cell in metric coordinates.
    #[inline]
    pub fn center_point(&self, cell_width: f32) -> Point3D {
        Point3D::new(
            (self.x as f32 + 0.5) * cell_width,
            (self.y as f32 + 0.5) * cell_width,
            (self.z as f32 + 0.5) * cell_width,
        )
    }

    /// Minimum corner of this cell in metric coordinates.
    #[inline]
    pub fn min_corner(&self, cell_width: f32) -> Point3D {
        Point3D::new(
            self.x as f32 * cell_width,
            self.y as f32 * cell_width,
            self.z as f32 * cell_width,
        )
    }

    /// Access an axis by number (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn axis(&self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Mutable access to an axis by number.
    #[inline]
    pub fn axis_mut(&mut self, axis: usize) -> &mut i32 {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => &mut self.z,
        }
    }

    /// Chebyshev distance. Consecutive cells of a traversal are at distance 1.
    #[inline]
    pub fn chebyshev_distance(&self, other: &Index3D) -> i32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// Manhattan distance to another index
    #[inline]
    pub fn manhattan_distance(&self, other: &Index3D) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }

    /// Component-wise minimum
    #[inline]
    pub fn cwise_min(&self, other: &Index3D) -> Index3D {
        Index3D::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum
    #[inline]
    pub fn cwise_max(&self, other: &Index3D) -> Index3D {
        Index3D::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Floor division of every component (used for block addressing).
    #[inline]
    pub fn div_floor(&self, divisor: i32) -> Index3D {
        Index3D::new(
            self.x.div_euclid(divisor),
            self.y.div_euclid(divisor),
            self.z.div_euclid(divisor),
        )
    }

    /// Non-negative remainder of every component.
    #[inline]
    pub fn rem_floor(&self, divisor: i32) -> Index3D {
        Index3D::new(
            self.x.rem_euclid(divisor),
            self.y.rem_euclid(divisor),
            self.z.rem_euclid(divisor),
        )
    }

    /// Scale every component.
    #[inline]
    pub fn scale(&self, factor: i32) -> Index3D {
        Index3D::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl Add for Index3D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Index3D::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Index3D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Index3D::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::fmt::Display for Index3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
