//! # Voxel World
//!
//! A chunked voxel world generated from noise. It is the grid the demo driver
//! scans and the reference implementation of the scanner collaborator traits.
//!
//! ## Architecture
//!
//! * **Block**: cell values and column biomes
//! * **Chunk**: 16x16x16 dense block storage
//! * **Terrain**: deterministic generation of chunks from Perlin noise
//! * **NoiseWorld**: the sparse chunk map, block edits and the world epoch
//!
//! ## Loading
//!
//! Reads never generate terrain: a `GridAccessor` only gets `&self`. Callers
//! load the chunks around the observer with `NoiseWorld::load_around` before
//! ticking, and reads outside the loaded area fail with `GridError::Unloaded`.

use std::collections::HashMap;

use cgmath::Point3;
use log::{debug, info};

use crate::error::GridError;
use crate::geometry::GridPoint;
use crate::scanner::GridAccessor;
use crate::survey::SurveySource;

pub mod block;
pub mod chunk;
pub mod terrain;

use block::{Biome, BlockType};
use chunk::{split_position, Chunk};
use terrain::TerrainGenerator;

/// A sparse voxel world made of generated chunks.
///
/// # Fields
/// - `terrain`: generator for chunks that are not loaded yet
/// - `chunks`: loaded chunks keyed by chunk coordinates
/// - `epoch`: bumped every time the world is replaced
/// - `uniform_biome`: when set, every column reports this biome and surveys treat
///   the world as a single area
///
/// # Examples
///
/// ```
/// use ambient_scan::geometry::GridPoint;
/// use ambient_scan::scanner::GridAccessor;
/// use ambient_scan::world::{block::BlockType, NoiseWorld};
///
/// let mut world = NoiseWorld::new(7);
/// let point = GridPoint::new(3, 1, 3);
/// assert!(world.cell_at(point).is_err());
///
/// world.load_around(point, 0);
/// world.set_block(point, BlockType::Torch).unwrap();
/// assert_eq!(world.cell_at(point).unwrap(), BlockType::Torch);
/// ```
pub struct NoiseWorld {
    terrain: TerrainGenerator,
    chunks: HashMap<Point3<i32>, Chunk>,
    epoch: u64,
    uniform_biome: Option<Biome>,
}

impl NoiseWorld {
    /// Creates an empty world using `seed` for terrain generation.
    pub fn new(seed: u32) -> Self {
        NoiseWorld {
            terrain: TerrainGenerator::new(seed),
            chunks: HashMap::new(),
            epoch: 0,
            uniform_biome: None,
        }
    }

    /// Makes every column report `biome`.
    pub fn with_uniform_biome(mut self, biome: Biome) -> Self {
        self.uniform_biome = Some(biome);
        self
    }

    /// The seed of the current terrain.
    pub fn seed(&self) -> u32 {
        self.terrain.seed()
    }

    /// The current world epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The terrain generator.
    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    /// Number of chunks currently loaded.
    pub fn loaded_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if the chunk holding `point` is loaded.
    pub fn is_loaded(&self, point: GridPoint) -> bool {
        self.chunks.contains_key(&split_position(point).0)
    }

    /// Generates the chunk at `position` unless it is already loaded.
    ///
    /// # Returns
    /// `true` if a chunk was generated.
    pub fn add_chunk_at(&mut self, position: Point3<i32>) -> bool {
        if self.chunks.contains_key(&position) {
            return false;
        }
        let chunk = self.terrain.generate_chunk(position);
        self.chunks.insert(position, chunk);
        true
    }

    /// Loads every chunk within `radius` chunks of the chunk holding `center`.
    ///
    /// # Returns
    /// The number of chunks generated.
    pub fn load_around(&mut self, center: GridPoint, radius: i32) -> usize {
        let (middle, _) = split_position(center);
        let mut generated = 0;
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    let position = Point3::new(middle.x + dx, middle.y + dy, middle.z + dz);
                    if self.add_chunk_at(position) {
                        generated += 1;
                    }
                }
            }
        }
        if generated > 0 {
            debug!("generated {} chunks around {:?}", generated, center);
        }
        generated
    }

    /// Drops chunks farther than `radius` chunks from the chunk holding `center`.
    ///
    /// # Returns
    /// The number of chunks dropped.
    pub fn unload_outside(&mut self, center: GridPoint, radius: i32) -> usize {
        let (middle, _) = split_position(center);
        let before = self.chunks.len();
        self.chunks.retain(|position, _| {
            (position.x - middle.x).abs() <= radius
                && (position.y - middle.y).abs() <= radius
                && (position.z - middle.z).abs() <= radius
        });
        before - self.chunks.len()
    }

    /// Replaces the block at `point`.
    ///
    /// # Returns
    /// The previous block, or `GridError::Unloaded` if the chunk is not loaded.
    pub fn set_block(&mut self, point: GridPoint, block: BlockType) -> Result<BlockType, GridError> {
        let (position, local) = split_position(point);
        self.chunks
            .get_mut(&position)
            .and_then(|chunk| chunk.set_block_at(local, block))
            .ok_or(GridError::Unloaded(point))
    }

    /// Throws away every chunk and starts over with new terrain.
    ///
    /// The epoch is bumped so scanners discard their state.
    pub fn switch_world(&mut self, seed: u32) {
        self.terrain = TerrainGenerator::new(seed);
        self.chunks.clear();
        self.epoch = self.epoch.wrapping_add(1);
        info!("switched to world seed {} (epoch {})", seed, self.epoch);
    }
}

impl GridAccessor for NoiseWorld {
    type Cell = BlockType;

    fn cell_at(&self, point: GridPoint) -> Result<BlockType, GridError> {
        let (position, local) = split_position(point);
        self.chunks
            .get(&position)
            .and_then(|chunk| chunk.block_at(local))
            .ok_or(GridError::Unloaded(point))
    }
}

impl SurveySource for NoiseWorld {
    type Category = Biome;

    fn category_at(&self, x: i32, z: i32) -> Biome {
        match self.uniform_biome {
            Some(biome) => biome,
            None => self.terrain.biome_at(x, z),
        }
    }

    fn is_uniform(&self) -> bool {
        self.uniform_biome.is_some()
    }
}
