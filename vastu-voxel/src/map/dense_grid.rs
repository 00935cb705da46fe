//! Bounded dense map with lock-free cells.
//!
//! Cells are `f32` values stored as `AtomicU32` bit patterns. Updates use a
//! compare-exchange loop, so any number of threads can fuse into the same cell
//! without a lock and without losing updates.

use std::sync::atomic::{AtomicU32, Ordering};

use super::{CellFusion, MapBounds, MapError, VolumetricMap, check_update};
use crate::core::Index3D;

/// Dense occupancy map over a fixed, inclusive index box.
///
/// A cell counts as stored when its value is non-zero; `prune` has nothing to
/// compact.
pub struct DenseGrid {
    min_cell_width: f32,
    fusion: CellFusion,
    bounds: MapBounds,
    dims: [usize; 3],
    cells: Box<[AtomicU32]>,
}

impl DenseGrid {
    /// Allocate a zeroed grid covering `bounds`.
    ///
    /// Bounds and cell width are validated by
    /// [`MapConfig`](super::MapConfig) before calling this.
    pub fn new(min_cell_width: f32, fusion: CellFusion, bounds: MapBounds) -> Self {
        let dims = bounds.dims();
        let len = dims[0] * dims[1] * dims[2];
        let cells = (0..len).map(|_| AtomicU32::new(0)).collect();
        log::debug!(
            "DenseGrid: {}x{}x{} cells ({:.1} MB)",
            dims[0],
            dims[1],
            dims[2],
            (len * std::mem::size_of::<AtomicU32>()) as f64 / 1e6
        );
        Self {
            min_cell_width,
            fusion,
            bounds,
            dims,
            cells,
        }
    }

    /// Index box covered by this grid.
    pub fn bounds(&self) -> MapBounds {
        self.bounds
    }

    #[inline]
    fn offset(&self, index: Index3D) -> Option<usize> {
        if !self.bounds.contains(index) {
            return None;
        }
        let local = index - self.bounds.min;
        Some(
            local.x as usize
                + self.dims[0] * (local.y as usize + self.dims[1] * local.z as usize),
        )
    }

    #[inline]
    fn index_at(&self, offset: usize) -> Index3D {
        let x = offset % self.dims[0];
        let y = (offset / self.dims[0]) % self.dims[1];
        let z = offset / (self.dims[0] * self.dims[1]);
        self.bounds.min + Index3D::new(x as i32, y as i32, z as i32)
    }

    fn cell(&self, index: Index3D) -> Result<&AtomicU32, MapError> {
        self.offset(index)
            .map(|offset| &self.cells[offset])
            .ok_or(MapError::OutOfBounds { index })
    }

    fn stored(&self) -> impl Iterator<Item = (Index3D, f32)> + '_ {
        self.cells.iter().enumerate().filter_map(|(offset, cell)| {
            let value = f32::from_bits(cell.load(Ordering::Relaxed));
            (value != 0.0).then(|| (self.index_at(offset), value))
        })
    }
}

impl VolumetricMap for DenseGrid {
    fn min_cell_width(&self) -> f32 {
        self.min_cell_width
    }

    fn add_to_cell_value(&self, index: Index3D, update: f32) -> Result<(), MapError> {
        check_update(index, update)?;
        let cell = self.cell(index)?;
        let fusion = self.fusion;
        let mut current = cell.load(Ordering::Relaxed);
        loop {
            let fused = fusion.fuse(f32::from_bits(current), update).to_bits();
            match cell.compare_exchange_weak(current, fused, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    fn get_cell_value(&self, index: Index3D) -> f32 {
        self.offset(index)
            .map_or(0.0, |offset| f32::from_bits(self.cells[offset].load(Ordering::Acquire)))
    }

    fn set_cell_value(&self, index: Index3D, value: f32) -> Result<(), MapError> {
        check_update(index, value)?;
        self.cell(index)?
            .store(self.fusion.clamp(value).to_bits(), Ordering::Release);
        Ok(())
    }

    fn prune(&self) {}

    fn clear(&self) {
        for cell in self.cells.iter() {
            cell.store(0, Ordering::Relaxed);
        }
    }

    fn is_empty(&self) -> bool {
        self.stored().next().is_none()
    }

    fn size(&self) -> usize {
        self.stored().count()
    }

    fn min_index(&self) -> Option<Index3D> {
        self.stored().map(|(index, _)| index).reduce(|a, b| a.cwise_min(&b))
    }

    fn max_index(&self) -> Option<Index3D> {
        self.stored().map(|(index, _)| index).reduce(|a, b| a.cwise_max(&b))
    }

    fn for_each_leaf(&self, visitor: &mut dyn FnMut(Index3D, f32)) {
        for (index, value) in self.stored() {
            visitor(index, value);
        }
    }

    fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.cells.len() * std::mem::size_of::<AtomicU32>()
    }
}

impl std::fmt::Debug for DenseGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseGrid")
            .field("min_cell_width", &self.min_cell_width)
            .field("fusion", &self.fusion)
            .field("bounds", &self.bounds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> DenseGrid {
        let bounds = MapBounds::new(Index3D::splat(-4), Index3D::new(7, 3, 1));
        DenseGrid::new(0.1, CellFusion::Unbounded, bounds)
    }

    #[test]
    fn test_offset_roundtrip() {
        let grid = grid();
        for index in [
            Index3D::splat(-4),
            Index3D::new(7, 3, 1),
            Index3D::new(0, -1, 0),
        ] {
            let offset = grid.offset(index).unwrap();
            assert_eq!(grid.index_at(offset), index);
        }
    }

    #[test]
    fn test_out_of_bounds() {
        let grid = grid();
        let index = Index3D::new(8, 0, 0);
        assert_eq!(
            grid.add_to_cell_value(index, 1.0),
            Err(MapError::OutOfBounds { index })
        );
        assert_eq!(grid.get_cell_value(index), 0.0);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let grid = grid();
        let index = Index3D::new(1, 1, 1);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        grid.add_to_cell_value(index, 0.5).unwrap();
                    }
                });
            }
        });
        assert_eq!(grid.get_cell_value(index), 4000.0);
    }

    #[test]
    fn test_size_counts_non_zero_cells() {
        let grid = grid();
        grid.set_cell_value(Index3D::new(0, 0, 0), 1.0).unwrap();
        grid.set_cell_value(Index3D::new(1, 0, 0), 0.0).unwrap();
        assert_eq!(grid.size(), 1);
        assert_eq!(grid.min_index(), Some(Index3D::new(0, 0, 0)));
        grid.clear();
        assert!(grid.is_empty());
    }
}
