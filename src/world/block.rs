//! # Block Module
//!
//! The cell values stored in a `NoiseWorld` and the column categories used by surveys.

use serde::{Deserialize, Serialize};

/// Enumerates all block types in the voxel world.
///
/// Three kinds of air exist so that generated caves and the void below the
/// world can be told apart from open sky. Scanners treat all three as empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockType {
    /// Open air above the terrain
    Air,
    /// Air carved out of the terrain
    CaveAir,
    /// Air outside any generated terrain
    VoidAir,
    /// Bare rock
    Stone,
    /// Soil under the surface
    Dirt,
    /// Top layer of soil in temperate biomes
    Grass,
    /// Top layer in deserts and on beaches
    Sand,
    /// Still water filling low terrain
    Water,
    /// Molten rock pooling in deep caves
    Lava,
    /// Foliage scattered on the surface
    Leaves,
    /// A light placed by hand
    Torch,
}

/// The empty block types, least common first.
///
/// Scanners search their ignore list from the end, so `Air` is matched first.
pub const AIR_TYPES: [BlockType; 3] = [BlockType::VoidAir, BlockType::CaveAir, BlockType::Air];

impl BlockType {
    /// Returns `true` for any of the three air types.
    pub fn is_air(self) -> bool {
        AIR_TYPES.contains(&self)
    }

    /// Returns `true` for blocks that keep producing an effect while nearby.
    pub fn is_emitter(self) -> bool {
        matches!(self, BlockType::Lava | BlockType::Torch | BlockType::Water)
    }

    /// Returns `true` for blocks that count as a roof overhead.
    ///
    /// Only blocks that stop movement qualify, and foliage never does.
    pub fn acts_as_ceiling(self) -> bool {
        matches!(
            self,
            BlockType::Stone | BlockType::Dirt | BlockType::Grass | BlockType::Sand
        )
    }

    /// Returns `true` for blocks that occasionally produce an effect when sampled.
    pub fn is_ambient(self) -> bool {
        matches!(
            self,
            BlockType::Leaves | BlockType::Water | BlockType::Lava | BlockType::Grass
        )
    }
}

/// The category of a world column, used to weight area effects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    /// Cold and wet
    Taiga,
    /// Mild and wet
    Forest,
    /// Mild and dry
    Plains,
    /// Hot and dry
    Desert,
    /// Hot and wet
    Swamp,
}

impl Biome {
    /// Picks a biome from temperature and humidity samples in `-1.0..=1.0`.
    ///
    /// # Arguments
    /// * `temperature` - Noise sample; higher is warmer
    /// * `humidity` - Noise sample; higher is wetter
    pub fn classify(temperature: f64, humidity: f64) -> Self {
        match (temperature, humidity) {
            (t, h) if t < -0.25 && h >= 0.0 => Biome::Taiga,
            (t, _) if t < -0.25 => Biome::Plains,
            (t, h) if t > 0.25 && h < 0.0 => Biome::Desert,
            (t, _) if t > 0.25 => Biome::Swamp,
            (_, h) if h >= 0.0 => Biome::Forest,
            _ => Biome::Plains,
        }
    }

    /// The block placed on top of the soil.
    pub fn surface_block(self) -> BlockType {
        match self {
            Biome::Desert => BlockType::Sand,
            _ => BlockType::Grass,
        }
    }

    /// Chance in `0.0..1.0` that a surface cell grows foliage.
    pub fn foliage_density(self) -> f64 {
        match self {
            Biome::Forest => 0.2,
            Biome::Taiga | Biome::Swamp => 0.1,
            Biome::Plains => 0.02,
            Biome::Desert => 0.0,
        }
    }
}
