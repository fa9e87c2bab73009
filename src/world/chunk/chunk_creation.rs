//! # Chunk Creation Module
//!
//! A builder that fills a chunk one block at a time in storage order.

use cgmath::Point3;

use crate::world::block::BlockType;

use super::{Chunk, CHUNK_DIMENSION, CHUNK_SIZE};

/// Builds a `Chunk` by pushing blocks in x, y, z order.
///
/// The builder tracks the local position of the next cell so generators can
/// ask where they are without keeping their own counters.
pub struct ChunkBuilder {
    /// The chunk coordinates of the chunk being created
    position: Point3<i32>,
    /// Blocks pushed so far
    blocks: Vec<BlockType>,
    /// Number of non-air blocks pushed so far
    non_air: usize,
}

impl ChunkBuilder {
    /// Creates a builder for the chunk at `position`.
    pub fn new(position: Point3<i32>) -> Self {
        ChunkBuilder {
            position,
            blocks: Vec::with_capacity(CHUNK_SIZE as usize),
            non_air: 0,
        }
    }

    /// The chunk-relative position the next pushed block will occupy.
    pub fn next_local(&self) -> Point3<i32> {
        let index = self.blocks.len() as i32;
        Point3::new(
            index % CHUNK_DIMENSION,
            (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
            index / (CHUNK_DIMENSION * CHUNK_DIMENSION),
        )
    }

    /// Returns `true` once every cell has a block.
    pub fn is_full(&self) -> bool {
        self.blocks.len() >= CHUNK_SIZE as usize
    }

    /// Adds a block at the current position and advances.
    ///
    /// Blocks pushed after the chunk is full are dropped.
    pub fn push_block_type(&mut self, block_type: BlockType) {
        if self.is_full() {
            return;
        }
        if !block_type.is_air() {
            self.non_air += 1;
        }
        self.blocks.push(block_type);
    }

    /// Finalizes the chunk. Cells never pushed are filled with void air.
    pub fn finish(mut self) -> Chunk {
        self.blocks.resize(CHUNK_SIZE as usize, BlockType::VoidAir);
        Chunk {
            position: self.position,
            blocks: self.blocks,
            non_air: self.non_air,
        }
    }
}
