//! # Terrain Module
//!
//! Deterministic terrain generation from Perlin noise.
//!
//! ## Layers
//!
//! 1. A 2D height field gives the surface of each column
//! 2. Two 2D climate fields (temperature and humidity) give the biome
//! 3. A 3D field carves caves below the surface; deep caves flood with lava
//! 4. Columns below sea level are flooded with water
//!
//! Every sample is a pure function of the seed and the position, so a chunk can
//! be regenerated at any time and always comes out the same.

use cgmath::Point3;
use fastrand::Rng;
use noise::{NoiseFn, Perlin};

use crate::geometry::GridPoint;

use super::block::{Biome, BlockType};
use super::chunk::{chunk_origin, Chunk, ChunkBuilder, CHUNK_DIMENSION};

/// Scaling factor applied to world coordinates when sampling the height field.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;
/// Scaling factor for the climate fields; biomes are much larger than hills.
pub const CLIMATE_SCALE_FACTOR: f64 = 0.004;
/// Scaling factor for the cave field.
pub const CAVE_SCALE_FACTOR: f64 = 0.06;
/// Cave cells are those whose noise sample lies within this distance of zero.
pub const CAVE_THRESHOLD: f64 = 0.06;
/// Surface height of a column where the height field is zero.
pub const BASE_HEIGHT: i32 = 32;
/// Maximum distance of the surface from `BASE_HEIGHT`.
pub const HEIGHT_AMPLITUDE: f64 = 14.0;
/// Highest Y filled with water in open air.
pub const SEA_LEVEL: i32 = 28;
/// Highest Y where caves fill with lava.
pub const LAVA_LEVEL: i32 = 8;
/// Depth of the soil layer under the surface block.
pub const SOIL_DEPTH: i32 = 3;

/// Samples the noise fields that make up the world.
pub struct TerrainGenerator {
    seed: u32,
    height: Perlin,
    temperature: Perlin,
    humidity: Perlin,
    caves: Perlin,
}

impl TerrainGenerator {
    /// Creates a generator; each noise field gets its own seed derived from `seed`.
    pub fn new(seed: u32) -> Self {
        TerrainGenerator {
            seed,
            height: Perlin::new(seed),
            temperature: Perlin::new(seed.wrapping_add(1)),
            humidity: Perlin::new(seed.wrapping_add(2)),
            caves: Perlin::new(seed.wrapping_add(3)),
        }
    }

    /// The seed the generator was created with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The Y of the topmost terrain block in column `(x, z)`.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let sample = self.height.get(to_perlin_pos_2d(x, z, PERLIN_SCALE_FACTOR));
        BASE_HEIGHT + (sample * HEIGHT_AMPLITUDE).round() as i32
    }

    /// The biome of column `(x, z)`.
    pub fn biome_at(&self, x: i32, z: i32) -> Biome {
        let position = to_perlin_pos_2d(x, z, CLIMATE_SCALE_FACTOR);
        Biome::classify(self.temperature.get(position), self.humidity.get(position))
    }

    /// Generates the block at a single world position.
    pub fn block_at(&self, point: GridPoint) -> BlockType {
        if point.y < 0 {
            return BlockType::VoidAir;
        }
        let height = self.surface_height(point.x, point.z);
        self.block_in_column(point, height, self.biome_at(point.x, point.z))
    }

    /// Generates a whole chunk.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the chunk to generate
    pub fn generate_chunk(&self, position: Point3<i32>) -> Chunk {
        let origin = chunk_origin(position);
        let mut builder = ChunkBuilder::new(position);

        // Column samples are shared by every Y in a z plane.
        let mut columns = Vec::new();
        let mut cached_z = None;
        while !builder.is_full() {
            let local = builder.next_local();
            if cached_z != Some(local.z) {
                cached_z = Some(local.z);
                columns = (0..CHUNK_DIMENSION)
                    .map(|dx| {
                        let (x, z) = (origin.x + dx, origin.z + local.z);
                        (self.surface_height(x, z), self.biome_at(x, z))
                    })
                    .collect();
            }

            let point = GridPoint::new(origin.x + local.x, origin.y + local.y, origin.z + local.z);
            let block = if point.y < 0 {
                BlockType::VoidAir
            } else {
                let (height, biome) = columns[local.x as usize];
                self.block_in_column(point, height, biome)
            };
            builder.push_block_type(block);
        }

        builder.finish()
    }

    fn block_in_column(&self, point: GridPoint, height: i32, biome: Biome) -> BlockType {
        if point.y > height {
            if point.y <= SEA_LEVEL {
                return BlockType::Water;
            }
            if point.y == height + 1 && self.has_foliage(point.x, point.z, biome) {
                return BlockType::Leaves;
            }
            return BlockType::Air;
        }

        if point.y > 0 && point.y < height - 1 && self.is_cave(point) {
            return if point.y <= LAVA_LEVEL {
                BlockType::Lava
            } else {
                BlockType::CaveAir
            };
        }

        if point.y == height {
            if height < SEA_LEVEL {
                BlockType::Sand
            } else {
                biome.surface_block()
            }
        } else if point.y >= height - SOIL_DEPTH {
            BlockType::Dirt
        } else {
            BlockType::Stone
        }
    }

    fn is_cave(&self, point: GridPoint) -> bool {
        let sample = self.caves.get([
            point.x as f64 * CAVE_SCALE_FACTOR,
            point.y as f64 * CAVE_SCALE_FACTOR,
            point.z as f64 * CAVE_SCALE_FACTOR,
        ]);
        sample.abs() < CAVE_THRESHOLD
    }

    fn has_foliage(&self, x: i32, z: i32, biome: Biome) -> bool {
        let column = (x as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (z as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
            ^ u64::from(self.seed);
        Rng::with_seed(column).f64() < biome.foliage_density()
    }
}

/// Converts a column position to coordinates for 2D noise sampling.
fn to_perlin_pos_2d(x: i32, z: i32, scale_factor: f64) -> [f64; 2] {
    [x as f64 * scale_factor, z as f64 * scale_factor]
}
