//! Map summary statistics.

use std::fmt;

use crate::core::Index3D;
use crate::map::VolumetricMap;

/// Summary of a map's contents.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MapStatistics {
    /// Stored cells (see [`VolumetricMap::size`])
    pub stored_cells: usize,
    /// Cells with log-odds > 0
    pub occupied_cells: usize,
    /// Cells with log-odds < 0
    pub free_cells: usize,
    /// Smallest stored index
    pub min_index: Option<Index3D>,
    /// Largest stored index
    pub max_index: Option<Index3D>,
    /// Approximate heap usage in bytes
    pub memory_usage: usize,
}

impl MapStatistics {
    /// Walk every leaf of `map` once.
    pub fn compute(map: &dyn VolumetricMap) -> Self {
        let mut stats = MapStatistics {
            stored_cells: map.size(),
            min_index: map.min_index(),
            max_index: map.max_index(),
            memory_usage: map.memory_usage(),
            ..Default::default()
        };
        map.for_each_leaf(&mut |_, value| {
            if value > 0.0 {
                stats.occupied_cells += 1;
            } else if value < 0.0 {
                stats.free_cells += 1;
            }
        });
        stats
    }

    /// Cells holding any evidence.
    pub fn observed_cells(&self) -> usize {
        self.occupied_cells + self.free_cells
    }
}

impl fmt::Display for MapStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} stored, {} occupied, {} free, {:.1} KB",
            self.stored_cells,
            self.occupied_cells,
            self.free_cells,
            self.memory_usage as f64 / 1024.0
        )?;
        if let (Some(min), Some(max)) = (self.min_index, self.max_index) {
            write!(f, ", bounds {} .. {}", min, max)?;
        }
        Ok(())
    }
}
