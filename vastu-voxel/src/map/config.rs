//! Map selection and construction.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{CellFusion, DenseGrid, HashedBlocks, SharedMap};
use crate::config::validate::require_gt;
use crate::config::{ConfigError, ParamMap, ValidatedConfig};
use crate::core::Index3D;

/// Largest dense grid [`MapConfig`] accepts, in cells (512 MB of `f32`).
const MAX_DENSE_CELLS: usize = 1 << 27;

/// Map representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    /// [`HashedBlocks`]
    #[default]
    HashedBlocks,
    /// [`DenseGrid`]
    DenseGrid,
}

impl MapKind {
    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapKind::HashedBlocks => "hashed_blocks",
            MapKind::DenseGrid => "dense_grid",
        }
    }
}

impl FromStr for MapKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hashed_blocks" => Ok(MapKind::HashedBlocks),
            "dense_grid" => Ok(MapKind::DenseGrid),
            other => Err(ConfigError::UnknownVariant {
                kind: "map kind",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive index box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapBounds {
    /// Smallest index in the box
    pub min: Index3D,
    /// Largest index in the box
    pub max: Index3D,
}

impl MapBounds {
    /// Box from `min` to `max`, both inclusive.
    pub const fn new(min: Index3D, max: Index3D) -> Self {
        Self { min, max }
    }

    /// True if `max >= min` on every axis.
    pub fn is_valid(&self) -> bool {
        self.max.x >= self.min.x && self.max.y >= self.min.y && self.max.z >= self.min.z
    }

    /// Whether `index` lies inside the box.
    #[inline]
    pub fn contains(&self, index: Index3D) -> bool {
        (self.min.x..=self.max.x).contains(&index.x)
            && (self.min.y..=self.max.y).contains(&index.y)
            && (self.min.z..=self.max.z).contains(&index.z)
    }

    /// Cells per axis. Zero on any axis of an invalid box.
    pub fn dims(&self) -> [usize; 3] {
        let extent = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1).max(0) as usize;
        [
            extent(self.min.x, self.max.x),
            extent(self.min.y, self.max.y),
            extent(self.min.z, self.max.z),
        ]
    }

    /// Total number of cells.
    pub fn num_cells(&self) -> usize {
        self.dims().iter().product()
    }
}

impl Default for MapBounds {
    fn default() -> Self {
        Self::new(Index3D::new(-128, -128, -32), Index3D::new(127, 127, 31))
    }
}

/// Map construction parameters.
///
/// ```yaml
/// map:
///   kind: dense_grid        # or hashed_blocks
///   min_cell_width: 0.1     # meters
///   fusion: saturating      # or unbounded
///   fusion_min: -2.0
///   fusion_max: 3.5
///   bounds_min: [-128, -128, -32]
///   bounds_max: [127, 127, 31]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Representation
    pub kind: MapKind,
    /// Finest cell edge length, meters (must be > 0)
    pub min_cell_width: f32,
    /// Per-cell fusion rule
    pub fusion: CellFusion,
    /// Index box for [`MapKind::DenseGrid`]; ignored otherwise
    pub bounds: MapBounds,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            kind: MapKind::HashedBlocks,
            min_cell_width: 0.1,
            fusion: CellFusion::Unbounded,
            bounds: MapBounds::default(),
        }
    }
}

impl MapConfig {
    /// Build the configured map behind a shared handle.
    pub fn build(self) -> Result<SharedMap, ConfigError> {
        let config = self.check_valid()?;
        log::info!(
            "Map: {} at {:.3} m, fusion {:?}",
            config.kind,
            config.min_cell_width,
            config.fusion
        );
        let map: SharedMap = match config.kind {
            MapKind::HashedBlocks => {
                Arc::new(HashedBlocks::new(config.min_cell_width, config.fusion))
            }
            MapKind::DenseGrid => Arc::new(DenseGrid::new(
                config.min_cell_width,
                config.fusion,
                config.bounds,
            )),
        };
        Ok(map)
    }
}

impl ValidatedConfig for MapConfig {
    const NAME: &'static str = "MapConfig";

    fn validation_errors(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        require_gt(&mut errors, "min_cell_width", self.min_cell_width, 0.0);
        errors.extend(self.fusion.validation_errors());
        if self.kind == MapKind::DenseGrid {
            if !self.bounds.is_valid() {
                errors.push(ConfigError::invalid(
                    "bounds",
                    format!("empty box {} .. {}", self.bounds.min, self.bounds.max),
                ));
            } else if self.bounds.num_cells() > MAX_DENSE_CELLS {
                errors.push(ConfigError::invalid(
                    "bounds",
                    format!(
                        "{} cells exceeds the dense grid limit of {}",
                        self.bounds.num_cells(),
                        MAX_DENSE_CELLS
                    ),
                ));
            }
        }
        errors
    }

    fn parse_params(params: &ParamMap) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let kind: MapKind = params.get_str("kind", defaults.kind.as_str())?.parse()?;
        let min_cell_width = params.get_f32("min_cell_width", defaults.min_cell_width)?;

        let fusion = match params.get_str("fusion", "unbounded")? {
            "unbounded" => CellFusion::Unbounded,
            "saturating" => CellFusion::Saturating {
                min: params.get_f32("fusion_min", CellFusion::DEFAULT_SATURATION_MIN)?,
                max: params.get_f32("fusion_max", CellFusion::DEFAULT_SATURATION_MAX)?,
            },
            other => {
                return Err(ConfigError::UnknownVariant {
                    kind: "cell fusion",
                    value: other.to_string(),
                });
            }
        };

        let to_index = |v: [i32; 3]| Index3D::new(v[0], v[1], v[2]);
        let bounds = MapBounds::new(
            params
                .get_i32x3("bounds_min")?
                .map_or(defaults.bounds.min, to_index),
            params
                .get_i32x3("bounds_max")?
                .map_or(defaults.bounds.max, to_index),
        );

        Ok(Self {
            kind,
            min_cell_width,
            fusion,
            bounds,
        })
    }
}
