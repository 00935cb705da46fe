//! Scenario replay input and map summaries.
//!
//! - **Scenario parsing**: YAML files listing concurrent scan streams
//! - **Statistics**: occupied/free counts and extents of a map
//!
//! ```rust,ignore
//! use vastu_voxel::io::{MapStatistics, Scenario};
//! use std::path::Path;
//!
//! let scenario = Scenario::load(Path::new("scenarios/corridor.yaml"))?;
//! for stream in &scenario.streams {
//!     for input in stream.sensor_inputs()? {
//!         integrator.integrate(&input);
//!     }
//! }
//! map.prune();
//! log::info!("{}", MapStatistics::compute(map.as_ref()));
//! ```

pub mod scenario;
pub mod stats;

pub use scenario::{DepthImageSpec, PoseSpec, ScanSpec, Scenario, ScenarioError, StreamSpec};
pub use stats::MapStatistics;
