//! # Effect Handlers
//!
//! The two `ScanHandler`s a `ScanSession` plugs into its scanners:
//! * `EmitterRegistry` keeps every emitter block inside the always-on window
//! * `AmbientTally` counts the ambient blocks hit by the random samplers and
//!   rolls whether each hit triggers an effect

use std::collections::HashMap;

use fastrand::Rng;

use crate::geometry::GridPoint;
use crate::scanner::ScanHandler;
use crate::world::block::BlockType;

/// Blocks that keep producing an effect while they are inside the always-on window.
#[derive(Default)]
pub struct EmitterRegistry {
    emitters: HashMap<GridPoint, BlockType>,
    registered: u64,
    removed: u64,
}

impl EmitterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emitters currently registered.
    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    /// Returns `true` if no emitter is registered.
    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    /// The emitter at `point`, if any.
    pub fn get(&self, point: GridPoint) -> Option<BlockType> {
        self.emitters.get(&point).copied()
    }

    /// Number of registered emitters of a given block type.
    pub fn count_of(&self, block: BlockType) -> usize {
        self.emitters.values().filter(|emitter| **emitter == block).count()
    }

    /// All registered emitters.
    pub fn iter(&self) -> impl Iterator<Item = (GridPoint, BlockType)> + '_ {
        self.emitters.iter().map(|(point, block)| (*point, *block))
    }

    /// Removes the emitter at `point`, if any.
    pub fn forget(&mut self, point: GridPoint) -> Option<BlockType> {
        let removed = self.emitters.remove(&point);
        if removed.is_some() {
            self.removed += 1;
        }
        removed
    }

    /// Lifetime count of registrations.
    pub fn registered(&self) -> u64 {
        self.registered
    }

    /// Lifetime count of removals.
    pub fn removed(&self) -> u64 {
        self.removed
    }
}

impl ScanHandler for EmitterRegistry {
    type Cell = BlockType;

    fn is_interesting(&self, cell: &BlockType) -> bool {
        cell.is_emitter()
    }

    fn on_cell_entered(&mut self, cell: BlockType, point: GridPoint, _rng: &mut Rng) {
        if self.emitters.insert(point, cell).is_none() {
            self.registered += 1;
        }
    }

    fn on_cell_exited(&mut self, _cell: BlockType, point: GridPoint, _rng: &mut Rng) {
        self.forget(point);
    }

    fn on_scan_reset(&mut self) {
        self.removed += self.emitters.len() as u64;
        self.emitters.clear();
    }
}

/// Counts of the ambient blocks hit by a random sampler.
///
/// Counts for the current tick are cleared at the start of every tick;
/// lifetime totals are kept separately.
pub struct AmbientTally {
    trigger_chance: f32,
    hits: HashMap<BlockType, u32>,
    triggered: u32,
    total_hits: u64,
    total_triggered: u64,
}

impl AmbientTally {
    /// Creates a tally where each hit triggers an effect with probability `trigger_chance`.
    pub fn new(trigger_chance: f32) -> Self {
        AmbientTally {
            trigger_chance: trigger_chance.clamp(0.0, 1.0),
            hits: HashMap::new(),
            triggered: 0,
            total_hits: 0,
            total_triggered: 0,
        }
    }

    /// Hits per block type during the last tick.
    pub fn hits(&self) -> &HashMap<BlockType, u32> {
        &self.hits
    }

    /// Hits of a single block type during the last tick.
    pub fn hits_of(&self, block: BlockType) -> u32 {
        self.hits.get(&block).copied().unwrap_or(0)
    }

    /// Effects triggered during the last tick.
    pub fn triggered(&self) -> u32 {
        self.triggered
    }

    /// Lifetime number of hits.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Lifetime number of triggered effects.
    pub fn total_triggered(&self) -> u64 {
        self.total_triggered
    }
}

impl ScanHandler for AmbientTally {
    type Cell = BlockType;

    fn is_interesting(&self, cell: &BlockType) -> bool {
        cell.is_ambient()
    }

    fn on_cell_entered(&mut self, cell: BlockType, _point: GridPoint, rng: &mut Rng) {
        *self.hits.entry(cell).or_insert(0) += 1;
        self.total_hits += 1;
        if rng.f32() < self.trigger_chance {
            self.triggered += 1;
            self.total_triggered += 1;
        }
    }

    fn pre_scan(&mut self) {
        self.hits.clear();
        self.triggered = 0;
    }
}
