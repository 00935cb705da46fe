//! Volumetric occupancy maps.
//!
//! A map stores one log-odds occupancy value per cell at its finest
//! resolution. Cells never written read as `0.0` (unknown). Every method takes
//! `&self`: implementations synchronise internally, so one map can be shared
//! through an `Arc` by any number of integrator threads.
//!
//! ## Representations
//!
//! | Type | Extent | Concurrency |
//! |------|--------|-------------|
//! | [`HashedBlocks`] | unbounded, allocates on write | per-block mutex |
//! | [`DenseGrid`] | fixed index box | lock-free atomics |
//!
//! Pick one at configuration time through [`MapConfig::build`].

mod cell;
mod config;
mod dense_grid;
mod hashed_blocks;

pub use cell::CellFusion;
pub use config::{MapBounds, MapConfig, MapKind};
pub use dense_grid::DenseGrid;
pub use hashed_blocks::{BLOCK_CELLS, BLOCK_SIZE, HashedBlocks};

use thiserror::Error;

use crate::core::{Index3D, Point3D};

/// Failure to apply an update to a single cell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Cell lies outside a bounded map
    #[error("cell {index} is outside the map bounds")]
    OutOfBounds {
        /// Rejected cell
        index: Index3D,
    },

    /// Update is NaN or infinite
    #[error("non-finite update {update} for cell {index}")]
    NonFiniteUpdate {
        /// Target cell
        index: Index3D,
        /// Rejected update
        update: f32,
    },
}

/// Shared-ownership handle to a map of any representation.
pub type SharedMap = std::sync::Arc<dyn VolumetricMap>;

/// Contract every map representation fulfils.
///
/// Updates are additive: applying `a` then `b` to a cell leaves the same
/// value as `b` then `a` (up to saturation bounds, see [`CellFusion`]).
pub trait VolumetricMap: Send + Sync {
    /// Edge length of the finest cells, in meters.
    fn min_cell_width(&self) -> f32;

    /// Fuse `update` into the cell at `index`.
    fn add_to_cell_value(&self, index: Index3D, update: f32) -> Result<(), MapError>;

    /// Current value of a cell, `0.0` if never written.
    fn get_cell_value(&self, index: Index3D) -> f32;

    /// Overwrite a cell's value.
    fn set_cell_value(&self, index: Index3D, value: f32) -> Result<(), MapError>;

    /// Compact internal storage without changing any queried value.
    fn prune(&self);

    /// Reset every cell to unknown.
    fn clear(&self);

    /// True when no cell is stored.
    fn is_empty(&self) -> bool;

    /// Number of stored cells.
    ///
    /// Sparse maps count allocated cells, including zeros not yet pruned.
    fn size(&self) -> usize;

    /// Component-wise minimum over stored cells, `None` if nothing is stored.
    fn min_index(&self) -> Option<Index3D>;

    /// Component-wise maximum over stored cells, `None` if nothing is stored.
    fn max_index(&self) -> Option<Index3D>;

    /// Visit every stored cell with its value.
    ///
    /// The visitor may call back into the map. Updates it makes are not
    /// guaranteed to be visited in the same pass.
    fn for_each_leaf(&self, visitor: &mut dyn FnMut(Index3D, f32));

    /// Approximate heap usage in bytes.
    fn memory_usage(&self) -> usize;

    /// Index of the cell containing a world point.
    fn index_of(&self, point: &Point3D) -> Index3D {
        Index3D::from_point(point, 1.0 / self.min_cell_width())
    }

    /// Fuse `update` into the cell containing `point`.
    fn apply_update(&self, point: &Point3D, update: f32) -> Result<(), MapError> {
        self.add_to_cell_value(self.index_of(point), update)
    }

    /// Value of the cell containing `point`.
    fn get_value_at(&self, point: &Point3D) -> f32 {
        self.get_cell_value(self.index_of(point))
    }

    /// Log-odds strictly above zero.
    fn is_occupied(&self, point: &Point3D) -> bool {
        self.get_value_at(point) > 0.0
    }

    /// Log-odds strictly below zero.
    fn is_free(&self, point: &Point3D) -> bool {
        self.get_value_at(point) < 0.0
    }
}

fn check_update(index: Index3D, update: f32) -> Result<(), MapError> {
    if update.is_finite() {
        Ok(())
    } else {
        Err(MapError::NonFiniteUpdate { index, update })
    }
}
