//! # Chunk Module
//!
//! This module provides the `Chunk` struct which stores a 16x16x16 block of cells,
//! and the helpers that map world coordinates onto chunks.
//!
//! ## Storage
//!
//! Blocks are stored densely, one `BlockType` per cell, with X varying fastest,
//! then Y, then Z. A running count of non-air cells lets callers skip empty chunks
//! without touching the block array.

use cgmath::Point3;

use crate::geometry::GridPoint;

use super::block::BlockType;

mod chunk_creation;

pub use chunk_creation::ChunkBuilder;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// A 16x16x16 collection of blocks.
///
/// # Fields
/// - `position`: chunk coordinates (not block coordinates)
/// - `blocks`: `CHUNK_SIZE` cells in x, y, z order
/// - `non_air`: number of cells that are not air
pub struct Chunk {
    /// The position of this chunk in chunk coordinates.
    pub position: Point3<i32>,
    blocks: Vec<BlockType>,
    non_air: usize,
}

impl Chunk {
    /// Creates a chunk filled with a single block type.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `block` - The block placed in every cell
    pub fn filled(position: Point3<i32>, block: BlockType) -> Self {
        let mut builder = ChunkBuilder::new(position);
        for _ in 0..CHUNK_SIZE {
            builder.push_block_type(block);
        }
        builder.finish()
    }

    /// Reads the block at chunk-relative coordinates.
    ///
    /// # Returns
    /// `None` if `local` is outside `0..CHUNK_DIMENSION` on any axis.
    pub fn block_at(&self, local: Point3<i32>) -> Option<BlockType> {
        Self::index(local).map(|index| self.blocks[index])
    }

    /// Replaces the block at chunk-relative coordinates.
    ///
    /// # Returns
    /// The previous block, or `None` if `local` is out of bounds.
    pub fn set_block_at(&mut self, local: Point3<i32>, block: BlockType) -> Option<BlockType> {
        let index = Self::index(local)?;
        let previous = std::mem::replace(&mut self.blocks[index], block);
        match (previous.is_air(), block.is_air()) {
            (true, false) => self.non_air += 1,
            (false, true) => self.non_air -= 1,
            _ => {}
        }
        Some(previous)
    }

    /// Returns `true` if every cell is air.
    pub fn is_empty(&self) -> bool {
        self.non_air == 0
    }

    /// Number of cells that are not air.
    pub fn non_air_count(&self) -> usize {
        self.non_air
    }

    fn index(local: Point3<i32>) -> Option<usize> {
        let range = 0..CHUNK_DIMENSION;
        if !(range.contains(&local.x) && range.contains(&local.y) && range.contains(&local.z)) {
            return None;
        }
        usize::try_from(local.x + CHUNK_DIMENSION * local.y + CHUNK_PLANE_SIZE * local.z).ok()
    }
}

/// Splits a world position into the chunk that holds it and the offset inside that chunk.
///
/// # Examples
///
/// ```
/// use ambient_scan::geometry::GridPoint;
/// use ambient_scan::world::chunk::split_position;
///
/// let (chunk, local) = split_position(GridPoint::new(-1, 17, 0));
/// assert_eq!(chunk, GridPoint::new(-1, 1, 0));
/// assert_eq!(local, GridPoint::new(15, 1, 0));
/// ```
pub fn split_position(point: GridPoint) -> (Point3<i32>, Point3<i32>) {
    let chunk = Point3::new(
        point.x.div_euclid(CHUNK_DIMENSION),
        point.y.div_euclid(CHUNK_DIMENSION),
        point.z.div_euclid(CHUNK_DIMENSION),
    );
    let local = Point3::new(
        point.x.rem_euclid(CHUNK_DIMENSION),
        point.y.rem_euclid(CHUNK_DIMENSION),
        point.z.rem_euclid(CHUNK_DIMENSION),
    );
    (chunk, local)
}

/// The world position of a chunk's first cell.
pub fn chunk_origin(chunk: Point3<i32>) -> GridPoint {
    GridPoint::new(
        chunk.x * CHUNK_DIMENSION,
        chunk.y * CHUNK_DIMENSION,
        chunk.z * CHUNK_DIMENSION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_chunk_reads_back() {
        let chunk = Chunk::filled(Point3::new(0, 0, 0), BlockType::Stone);
        assert_eq!(chunk.block_at(Point3::new(15, 15, 15)), Some(BlockType::Stone));
        assert_eq!(chunk.block_at(Point3::new(16, 0, 0)), None);
        assert_eq!(chunk.block_at(Point3::new(0, -1, 0)), None);
        assert_eq!(chunk.non_air_count(), CHUNK_SIZE as usize);
    }

    #[test]
    fn edits_track_non_air_count() {
        let mut chunk = Chunk::filled(Point3::new(2, 0, -1), BlockType::Air);
        assert!(chunk.is_empty());

        let local = Point3::new(3, 4, 5);
        assert_eq!(chunk.set_block_at(local, BlockType::Lava), Some(BlockType::Air));
        assert_eq!(chunk.non_air_count(), 1);
        assert_eq!(chunk.set_block_at(local, BlockType::CaveAir), Some(BlockType::Lava));
        assert!(chunk.is_empty());
        assert_eq!(chunk.set_block_at(Point3::new(0, 0, 16), BlockType::Stone), None);
    }

    #[test]
    fn split_position_handles_negative_coordinates() {
        for point in [
            GridPoint::new(0, 0, 0),
            GridPoint::new(-1, -16, -17),
            GridPoint::new(31, 32, -33),
        ] {
            let (chunk, local) = split_position(point);
            let origin = chunk_origin(chunk);
            assert_eq!(
                GridPoint::new(origin.x + local.x, origin.y + local.y, origin.z + local.z),
                point
            );
            assert!((0..CHUNK_DIMENSION).contains(&local.x));
            assert!((0..CHUNK_DIMENSION).contains(&local.y));
            assert!((0..CHUNK_DIMENSION).contains(&local.z));
        }
    }
}
