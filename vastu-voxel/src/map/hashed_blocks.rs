//! Sparse block-hashed map.
//!
//! Space is split into cubic blocks of [`BLOCK_SIZE`]³ cells. Blocks are
//! allocated on first write and live in a hash map keyed by block index, so
//! the map grows without bounds in every direction.
//!
//! ## Locking
//!
//! ```text
//! blocks: RwLock<HashMap<block index, Mutex<Block>>>
//!
//! write to existing block:  read lock (shared)  -> block mutex
//! write to new block:       write lock (exclusive), allocate, write
//! prune / clear:            write lock (exclusive)
//! ```
//!
//! Writers to different blocks proceed in parallel; writers to the same block
//! serialise on its mutex only.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use super::{CellFusion, MapError, VolumetricMap, check_update};
use crate::core::Index3D;

/// Cells per block edge.
pub const BLOCK_SIZE: i32 = 16;

/// Cells per block.
pub const BLOCK_CELLS: usize = (BLOCK_SIZE * BLOCK_SIZE * BLOCK_SIZE) as usize;

/// Dense storage for one block, x-fastest.
struct Block {
    values: Box<[f32]>,
}

impl Block {
    fn new() -> Self {
        Self {
            values: vec![0.0; BLOCK_CELLS].into_boxed_slice(),
        }
    }

    #[inline]
    fn offset(local: Index3D) -> usize {
        (local.x + BLOCK_SIZE * (local.y + BLOCK_SIZE * local.z)) as usize
    }

    #[inline]
    fn local_index(offset: usize) -> Index3D {
        let offset = offset as i32;
        Index3D::new(
            offset % BLOCK_SIZE,
            (offset / BLOCK_SIZE) % BLOCK_SIZE,
            offset / (BLOCK_SIZE * BLOCK_SIZE),
        )
    }

    fn is_all_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

/// Split a cell index into (block index, index within block).
#[inline]
fn split(index: Index3D) -> (Index3D, Index3D) {
    (index.div_floor(BLOCK_SIZE), index.rem_floor(BLOCK_SIZE))
}

/// Sparse, unbounded occupancy map.
pub struct HashedBlocks {
    min_cell_width: f32,
    fusion: CellFusion,
    blocks: RwLock<HashMap<Index3D, Mutex<Block>>>,
}

impl HashedBlocks {
    /// Create an empty map.
    ///
    /// `min_cell_width` must be positive; [`MapConfig`](super::MapConfig)
    /// validates it before calling this.
    pub fn new(min_cell_width: f32, fusion: CellFusion) -> Self {
        Self {
            min_cell_width,
            fusion,
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Fusion rule applied by [`add_to_cell_value`](VolumetricMap::add_to_cell_value).
    pub fn fusion(&self) -> CellFusion {
        self.fusion
    }

    /// Number of allocated blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.read().len()
    }

    /// Run `op` on the cell, allocating its block if needed.
    fn with_cell_mut(&self, index: Index3D, op: impl FnOnce(&mut f32)) {
        let (block_index, local) = split(index);
        let offset = Block::offset(local);

        {
            let blocks = self.blocks.read();
            if let Some(block) = blocks.get(&block_index) {
                op(&mut block.lock().values[offset]);
                return;
            }
        }

        let mut blocks = self.blocks.write();
        let block = blocks
            .entry(block_index)
            .or_insert_with(|| Mutex::new(Block::new()));
        op(&mut block.get_mut().values[offset]);
    }
}

impl VolumetricMap for HashedBlocks {
    fn min_cell_width(&self) -> f32 {
        self.min_cell_width
    }

    fn add_to_cell_value(&self, index: Index3D, update: f32) -> Result<(), MapError> {
        check_update(index, update)?;
        let fusion = self.fusion;
        self.with_cell_mut(index, |value| *value = fusion.fuse(*value, update));
        Ok(())
    }

    fn get_cell_value(&self, index: Index3D) -> f32 {
        let (block_index, local) = split(index);
        self.blocks
            .read()
            .get(&block_index)
            .map_or(0.0, |block| block.lock().values[Block::offset(local)])
    }

    fn set_cell_value(&self, index: Index3D, value: f32) -> Result<(), MapError> {
        check_update(index, value)?;
        let value = self.fusion.clamp(value);
        self.with_cell_mut(index, |cell| *cell = value);
        Ok(())
    }

    fn prune(&self) {
        let mut blocks = self.blocks.write();
        let before = blocks.len();
        blocks.retain(|_, block| !block.get_mut().is_all_zero());
        blocks.shrink_to_fit();
        log::debug!("Pruned {} of {} blocks", before - blocks.len(), before);
    }

    fn clear(&self) {
        let mut blocks = self.blocks.write();
        blocks.clear();
        blocks.shrink_to_fit();
    }

    fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    fn size(&self) -> usize {
        self.blocks.read().len() * BLOCK_CELLS
    }

    fn min_index(&self) -> Option<Index3D> {
        self.blocks
            .read()
            .keys()
            .copied()
            .reduce(|a, b| a.cwise_min(&b))
            .map(|block| block.scale(BLOCK_SIZE))
    }

    fn max_index(&self) -> Option<Index3D> {
        self.blocks
            .read()
            .keys()
            .copied()
            .reduce(|a, b| a.cwise_max(&b))
            .map(|block| block.scale(BLOCK_SIZE) + Index3D::splat(BLOCK_SIZE - 1))
    }

    fn for_each_leaf(&self, visitor: &mut dyn FnMut(Index3D, f32)) {
        // Visit a copy so the visitor can call back into the map without
        // contending for the block table or a block mutex.
        let snapshot: Vec<(Index3D, Box<[f32]>)> = {
            let blocks = self.blocks.read();
            blocks
                .iter()
                .map(|(block_index, block)| (*block_index, block.lock().values.clone()))
                .collect()
        };
        for (block_index, values) in snapshot {
            let origin = block_index.scale(BLOCK_SIZE);
            for (offset, &value) in values.iter().enumerate() {
                visitor(origin + Block::local_index(offset), value);
            }
        }
    }

    fn memory_usage(&self) -> usize {
        let blocks = self.blocks.read();
        std::mem::size_of::<Self>()
            + blocks.capacity()
                * (std::mem::size_of::<Index3D>() + std::mem::size_of::<Mutex<Block>>())
            + blocks.len() * BLOCK_CELLS * std::mem::size_of::<f32>()
    }
}

impl std::fmt::Debug for HashedBlocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashedBlocks")
            .field("min_cell_width", &self.min_cell_width)
            .field("fusion", &self.fusion)
            .field("num_blocks", &self.num_blocks())
            .finish()
    }
}
