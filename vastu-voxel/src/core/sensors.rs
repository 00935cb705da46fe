//! Sensor input types consumed by the integrators.
//!
//! Every modality carries a single rigid-body pose (sensor frame → map frame)
//! shared by all of its measurements, and can be reduced to a
//! [`PosedPointCloud`]:
//!
//! | Input | Produced by | Conversion |
//! |-------|-------------|------------|
//! | [`PosedPointCloud`] | lidar / stereo adapters | identity |
//! | [`PosedDepthImage`] | depth camera adapters | pinhole back-projection |
//!
//! ## Sensor Coordinate Frame
//!
//! Points are expressed in the sensor frame:
//! - Origin: optical center
//! - +Z: viewing direction (depth images)
//!
//! The pose maps them into the map frame. A malformed pose (non-finite
//! values) must be rejected by the adapter that produced it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::index::{Point3D, Transformation3D};

/// Errors raised while assembling sensor inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    /// Depth buffer size does not match the image dimensions
    #[error("depth buffer has {actual} values, expected {expected} ({width}x{height})")]
    DimensionMismatch {
        /// Expected number of pixels
        expected: usize,
        /// Number of values supplied
        actual: usize,
        /// Image width in pixels
        width: usize,
        /// Image height in pixels
        height: usize,
    },
}

/// Ordered point set sharing one sensor pose.
///
/// Points are stored in the sensor frame. [`points_global`](Self::points_global)
/// lazily maps them into the map frame.
#[derive(Clone, Debug)]
pub struct PosedPointCloud {
    pose: Transformation3D,
    points_local: Vec<Point3D>,
}

impl PosedPointCloud {
    /// Create a cloud from sensor-frame points and the sensor pose.
    pub fn new(pose: Transformation3D, points_local: Vec<Point3D>) -> Self {
        Self { pose, points_local }
    }

    /// Sensor pose (sensor frame → map frame).
    #[inline]
    pub fn pose(&self) -> &Transformation3D {
        &self.pose
    }

    /// Sensor origin in the map frame.
    #[inline]
    pub fn origin(&self) -> Point3D {
        Point3D::from(self.pose.translation.vector)
    }

    /// Points in the sensor frame.
    #[inline]
    pub fn points_local(&self) -> &[Point3D] {
        &self.points_local
    }

    /// Points mapped into the map frame.
    pub fn points_global(&self) -> impl Iterator<Item = Point3D> + '_ {
        self.points_local
            .iter()
            .map(move |p| self.pose.transform_point(p))
    }

    /// Number of points
    #[inline]
    pub fn len(&self) -> usize {
        self.points_local.len()
    }

    /// Is the cloud empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points_local.is_empty()
    }
}

/// Pinhole camera intrinsics (pixels).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinholeIntrinsics {
    /// Focal length along u
    pub fx: f32,
    /// Focal length along v
    pub fy: f32,
    /// Principal point u
    pub cx: f32,
    /// Principal point v
    pub cy: f32,
}

impl PinholeIntrinsics {
    /// Back-project pixel `(u, v)` at `depth` into the camera frame.
    #[inline]
    pub fn back_project(&self, u: f32, v: f32, depth: f32) -> Point3D {
        Point3D::new(
            (u - self.cx) * depth / self.fx,
            (v - self.cy) * depth / self.fy,
            depth,
        )
    }
}

/// Row-major depth image with its camera pose.
///
/// A depth of `0.0` or a non-finite value means "no return" and produces no
/// point.
#[derive(Clone, Debug)]
pub struct PosedDepthImage {
    pose: Transformation3D,
    intrinsics: PinholeIntrinsics,
    width: usize,
    height: usize,
    depths: Vec<f32>,
}

impl PosedDepthImage {
    /// Create a depth image. `depths` must hold `width * height` values.
    pub fn new(
        pose: Transformation3D,
        intrinsics: PinholeIntrinsics,
        width: usize,
        height: usize,
        depths: Vec<f32>,
    ) -> Result<Self, SensorError> {
        let expected = width * height;
        if depths.len() != expected {
            return Err(SensorError::DimensionMismatch {
                expected,
                actual: depths.len(),
                width,
                height,
            });
        }
        Ok(Self {
            pose,
            intrinsics,
            width,
            height,
            depths,
        })
    }

    /// Camera pose (camera frame → map frame).
    #[inline]
    pub fn pose(&self) -> &Transformation3D {
        &self.pose
    }

    /// Camera intrinsics
    #[inline]
    pub fn intrinsics(&self) -> &PinholeIntrinsics {
        &self.intrinsics
    }

    /// Image width in pixels
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Depth at pixel `(u, v)`, if inside the image.
    #[inline]
    pub fn depth_at(&self, u: usize, v: usize) -> Option<f32> {
        if u < self.width && v < self.height {
            Some(self.depths[v * self.width + u])
        } else {
            None
        }
    }

    /// Back-project all valid pixels into a posed point cloud.
    pub fn to_pointcloud(&self) -> PosedPointCloud {
        let mut points = Vec::with_capacity(self.depths.len());
        for v in 0..self.height {
            for u in 0..self.width {
                let depth = self.depths[v * self.width + u];
                if depth > 0.0 && depth.is_finite() {
                    points.push(self.intrinsics.back_project(u as f32, v as f32, depth));
                }
            }
        }
        PosedPointCloud::new(self.pose, points)
    }
}

/// A measurement from any supported sensor modality.
#[derive(Clone, Debug)]
pub enum SensorInput {
    /// Point cloud (lidar, stereo)
    Pointcloud(PosedPointCloud),
    /// Depth image (structured light, ToF)
    DepthImage(PosedDepthImage),
}

impl SensorInput {
    /// Short modality name for logging.
    pub fn modality(&self) -> &'static str {
        match self {
            SensorInput::Pointcloud(_) => "pointcloud",
            SensorInput::DepthImage(_) => "depth_image",
        }
    }

    /// Sensor pose of this input.
    pub fn pose(&self) -> &Transformation3D {
        match self {
            SensorInput::Pointcloud(cloud) => cloud.pose(),
            SensorInput::DepthImage(image) => image.pose(),
        }
    }

    /// Posed point cloud for this input, back-projecting depth images.
    pub fn to_pointcloud(&self) -> std::borrow::Cow<'_, PosedPointCloud> {
        match self {
            SensorInput::Pointcloud(cloud) => std::borrow::Cow::Borrowed(cloud),
            SensorInput::DepthImage(image) => std::borrow::Cow::Owned(image.to_pointcloud()),
        }
    }
}

impl From<PosedPointCloud> for SensorInput {
    fn from(cloud: PosedPointCloud) -> Self {
        SensorInput::Pointcloud(cloud)
    }
}

impl From<PosedDepthImage> for SensorInput {
    fn from(image: PosedDepthImage) -> Self {
        SensorInput::DepthImage(image)
    }
}
