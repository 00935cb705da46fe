//! Scenario YAML parsing for scan replay.
//!
//! A scenario lists named input streams, each an ordered sequence of posed
//! scans. Streams model independent sensors (e.g. a lidar and a depth camera)
//! that deliver scans concurrently into one map.
//!
//! ```yaml
//! name: corridor
//! streams:
//!   - name: lidar
//!     scans:
//!       - pose: { position: [0, 0, 0], rotation_rpy: [0, 0, 0] }
//!         points: [[10, 0, 0], [5, 2, 0]]
//!   - name: camera
//!     scans:
//!       - pose: { position: [0, 0, 1] }
//!         depth_image:
//!           width: 2
//!           height: 1
//!           intrinsics: { fx: 1.0, fy: 1.0, cx: 0.5, cy: 0.5 }
//!           depths: [3.0, 3.0]
//! ```

use std::path::Path;

use nalgebra::{Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    PinholeIntrinsics, Point3D, PosedDepthImage, PosedPointCloud, SensorError, SensorInput,
    Transformation3D,
};

/// Scenario loading failures.
#[derive(Debug, Clone, Error)]
pub enum ScenarioError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// YAML did not match the scenario schema
    #[error("Parse error: {0}")]
    Parse(String),

    /// A scan entry cannot be turned into a sensor input
    #[error("stream '{stream}' scan {index}: {reason}")]
    InvalidScan {
        /// Stream name
        stream: String,
        /// Scan position within the stream
        index: usize,
        /// What is wrong
        reason: String,
    },
}

/// A replay scenario loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable scenario name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: String,

    /// Independent input streams
    pub streams: Vec<StreamSpec>,
}

/// One sensor's scan sequence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamSpec {
    /// Stream name (used in logs)
    pub name: String,

    /// Scans in delivery order
    #[serde(default)]
    pub scans: Vec<ScanSpec>,
}

/// Sensor pose as position and roll/pitch/yaw
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseSpec {
    /// Position in meters
    #[serde(default)]
    pub position: [f32; 3],

    /// Roll, pitch, yaw in radians
    #[serde(default)]
    pub rotation_rpy: [f32; 3],
}

impl PoseSpec {
    /// Rigid transform (sensor frame → map frame).
    pub fn to_transformation(&self) -> Transformation3D {
        let [x, y, z] = self.position;
        let [roll, pitch, yaw] = self.rotation_rpy;
        Transformation3D::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }

    fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(self.rotation_rpy.iter())
            .all(|v| v.is_finite())
    }
}

/// Depth image block of a scan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepthImageSpec {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Pinhole intrinsics
    pub intrinsics: PinholeIntrinsics,
    /// Row-major depths in meters
    pub depths: Vec<f32>,
}

/// One posed scan: either points or a depth image
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanSpec {
    /// Sensor pose at capture time
    #[serde(default)]
    pub pose: PoseSpec,

    /// Points in the sensor frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<[f32; 3]>>,

    /// Depth image in the sensor frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_image: Option<DepthImageSpec>,
}

impl ScanSpec {
    /// Convert to a sensor input.
    ///
    /// Non-finite poses are rejected here so the integrator never sees them.
    pub fn to_sensor_input(&self) -> Result<SensorInput, String> {
        if !self.pose.is_finite() {
            return Err("pose has non-finite values".to_string());
        }
        let pose = self.pose.to_transformation();
        match (&self.points, &self.depth_image) {
            (Some(points), None) => {
                let points = points.iter().map(|&[x, y, z]| Point3D::new(x, y, z)).collect();
                Ok(PosedPointCloud::new(pose, points).into())
            }
            (None, Some(image)) => PosedDepthImage::new(
                pose,
                image.intrinsics,
                image.width,
                image.height,
                image.depths.clone(),
            )
            .map(SensorInput::from)
            .map_err(|e: SensorError| e.to_string()),
            (Some(_), Some(_)) => Err("scan has both points and depth_image".to_string()),
            (None, None) => Err("scan has neither points nor depth_image".to_string()),
        }
    }
}

impl StreamSpec {
    /// All scans of this stream as sensor inputs.
    pub fn sensor_inputs(&self) -> Result<Vec<SensorInput>, ScenarioError> {
        self.scans
            .iter()
            .enumerate()
            .map(|(index, scan)| {
                scan.to_sensor_input()
                    .map_err(|reason| ScenarioError::InvalidScan {
                        stream: self.name.clone(),
                        index,
                        reason,
                    })
            })
            .collect()
    }
}

impl Scenario {
    /// Load scenario from YAML file
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ScenarioError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Parse scenario from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioError> {
        serde_yaml::from_str(yaml).map_err(|e| ScenarioError::Parse(e.to_string()))
    }

    /// Total number of scans across all streams
    pub fn num_scans(&self) -> usize {
        self.streams.iter().map(|s| s.scans.len()).sum()
    }

    /// Check every scan converts, reporting the first bad one.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for stream in &self.streams {
            stream.sensor_inputs()?;
        }
        Ok(())
    }
}
