//! # Scan Session
//!
//! Runs the scanners that drive ambient effects around one observer.
//!
//! ## Components
//!
//! * **Near sampler**: a `RandomScanner` over a small range, tallying ambient blocks
//! * **Far sampler**: the same over a larger range
//! * **Always-on window**: a `CuboidScanner` with exit notifications that keeps an
//!   `EmitterRegistry` of every emitter block in range
//! * **Area survey**: biome weights around the observer
//! * **Ceiling coverage**: whether the observer is under a roof
//!
//! ## Block Updates
//!
//! Block changes reported by the world are expanded to the 3x3x3 neighbourhood
//! of each changed cell and rechecked by the always-on window directly, so the
//! registry stays current without a rescan. The time spent doing so is tracked
//! with a moving average.
//!
//! Changes can be applied at once with `on_block_update`, or queued with
//! `queue_block_update` and applied `BLOCK_UPDATE_DELAY` ticks later, so a cell
//! that is broken and refilled in quick succession is only rechecked once.
//! Queued changes are dropped when the world epoch changes.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use log::{debug, info};
use web_time::Instant;

use crate::config::SessionConfig;
use crate::error::ConfigError;
use crate::geometry::GridPoint;
use crate::scanner::{CentroidProvider, CuboidScanner, GridAccessor, RandomScanner, TickReport};
use crate::survey::{AreaSurvey, CeilingCoverage, SurveySource};
use crate::world::block::{Biome, BlockType, AIR_TYPES};

pub mod effects;
pub mod timer;

use effects::{AmbientTally, EmitterRegistry};
use timer::{TimerEma, DEFAULT_PERIODS};

/// Chance that a random sample on an ambient block triggers an effect.
pub const AMBIENT_TRIGGER_CHANCE: f32 = 0.05;
/// Ticks a queued block change waits before it is applied.
pub const BLOCK_UPDATE_DELAY: u64 = 10;

/// What every component of a session did during one tick.
#[derive(Clone, Debug, Default)]
pub struct SessionReport {
    /// The near sampler's report
    pub near: TickReport,
    /// The far sampler's report
    pub far: TickReport,
    /// The always-on window's report
    pub always_on: TickReport,
    /// Whether the area survey was redone
    pub survey_refreshed: bool,
    /// Whether the ceiling coverage was redone
    pub ceiling_refreshed: bool,
    /// Queued block changes applied this tick
    pub block_updates: usize,
}

/// The scanners and survey for a single observer.
pub struct ScanSession {
    config: SessionConfig,
    near: RandomScanner<AmbientTally>,
    far: RandomScanner<AmbientTally>,
    always_on: CuboidScanner<EmitterRegistry>,
    survey: AreaSurvey<Biome>,
    ceiling: CeilingCoverage,
    block_updates: TimerEma,
    pending_update_time: Duration,
    queued_updates: VecDeque<(u64, GridPoint)>,
    queued_epoch: u64,
    ticks: u64,
}

impl ScanSession {
    /// Builds a session from a validated configuration.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let near = RandomScanner::new(
            format!("random scanner {}", config.near_range),
            config.near_scanner(),
            AmbientTally::new(AMBIENT_TRIGGER_CHANCE),
        )?
        .with_ignored(AIR_TYPES);
        let far = RandomScanner::new(
            format!("random scanner {}", config.far_range),
            config.far_scanner(),
            AmbientTally::new(AMBIENT_TRIGGER_CHANCE),
        )?
        .with_ignored(AIR_TYPES);
        let always_on = CuboidScanner::new(
            "always-on scanner",
            config.always_on_scanner(),
            EmitterRegistry::new(),
        )?
        .with_ignored(AIR_TYPES);
        let survey = AreaSurvey::new(config.survey_range, config.survey_refresh_interval);

        info!(
            "scan session ready: near {}, far {}, always-on {}",
            config.near_range, config.far_range, config.effect_range
        );
        Ok(ScanSession {
            config,
            near,
            far,
            always_on,
            survey,
            ceiling: CeilingCoverage::new(),
            block_updates: TimerEma::new("area block update", DEFAULT_PERIODS),
            pending_update_time: Duration::ZERO,
            queued_updates: VecDeque::new(),
            queued_epoch: 0,
            ticks: 0,
        })
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Ambient hits of the near sampler.
    pub fn near(&self) -> &AmbientTally {
        self.near.handler()
    }

    /// Ambient hits of the far sampler.
    pub fn far(&self) -> &AmbientTally {
        self.far.handler()
    }

    /// The always-on window.
    pub fn always_on(&self) -> &CuboidScanner<EmitterRegistry> {
        &self.always_on
    }

    /// Emitters inside the always-on window.
    pub fn emitters(&self) -> &EmitterRegistry {
        self.always_on.handler()
    }

    /// Biome weights around the observer.
    pub fn survey(&self) -> &AreaSurvey<Biome> {
        &self.survey
    }

    /// Ceiling coverage around the observer.
    pub fn ceiling(&self) -> &CeilingCoverage {
        &self.ceiling
    }

    /// Whether the observer is under a roof.
    pub fn is_really_inside(&self) -> bool {
        self.ceiling.is_really_inside()
    }

    /// Number of queued block changes not yet applied.
    pub fn queued_block_updates(&self) -> usize {
        self.queued_updates.len()
    }

    /// Moving average of the time spent handling block updates per tick.
    pub fn block_update_timer(&self) -> &TimerEma {
        &self.block_updates
    }

    /// Number of ticks run.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Applies the block changes that are due, then runs every scanner and survey once.
    ///
    /// # Arguments
    /// * `world` - Cells and column biomes
    /// * `centroid` - The observer position and world epoch
    pub fn tick<W, P>(&mut self, world: &W, centroid: &P) -> SessionReport
    where
        W: GridAccessor<Cell = BlockType> + SurveySource<Category = Biome>,
        P: CentroidProvider,
    {
        if centroid.epoch() != self.queued_epoch {
            if !self.queued_updates.is_empty() {
                debug!(
                    "dropping {} queued block updates after a world change",
                    self.queued_updates.len()
                );
            }
            self.queued_updates.clear();
            self.queued_epoch = centroid.epoch();
        }
        let due = self.take_due_updates();
        if !due.is_empty() {
            self.on_block_update(world, &due);
        }

        let report = SessionReport {
            near: self.near.tick(world, centroid),
            far: self.far.tick(world, centroid),
            always_on: self.always_on.tick(world, centroid),
            survey_refreshed: self.survey.tick(world, centroid),
            ceiling_refreshed: self
                .ceiling
                .tick(world, centroid, |block| block.acts_as_ceiling()),
            block_updates: due.len(),
        };

        self.block_updates.update(self.pending_update_time);
        self.pending_update_time = Duration::ZERO;
        self.ticks += 1;

        debug!(
            "tick {}: near {} hits, far {} hits, {} emitters ({:?})",
            self.ticks,
            report.near.reported,
            report.far.reported,
            self.emitters().len(),
            report.always_on.action
        );
        report
    }

    /// Rechecks the neighbourhood of changed blocks right away.
    ///
    /// Emitters that are gone, or can no longer be read, are dropped from the
    /// registry. Emitters that are still present stay registered, and new ones
    /// are added.
    ///
    /// # Returns
    /// The number of emitters newly registered by the recheck.
    pub fn on_block_update<W>(&mut self, world: &W, changed: &[GridPoint]) -> usize
    where
        W: GridAccessor<Cell = BlockType>,
    {
        let start = Instant::now();
        let registered_before = self.always_on.handler().registered();
        for point in expand_positions(changed) {
            let known = self.always_on.handler().get(point).is_some();
            if !self.always_on.on_cell_update(world, point) && known {
                self.always_on.handler_mut().forget(point);
            }
        }
        self.pending_update_time += start.elapsed();
        (self.always_on.handler().registered() - registered_before) as usize
    }

    /// Queues changed blocks to be rechecked `BLOCK_UPDATE_DELAY` ticks from now.
    pub fn queue_block_update(&mut self, changed: &[GridPoint]) {
        let due = self.ticks + BLOCK_UPDATE_DELAY;
        self.queued_updates.extend(changed.iter().map(|point| (due, *point)));
    }

    fn take_due_updates(&mut self) -> Vec<GridPoint> {
        let mut due = HashSet::new();
        while let Some(&(tick, point)) = self.queued_updates.front() {
            if tick > self.ticks {
                break;
            }
            self.queued_updates.pop_front();
            due.insert(point);
        }
        due.into_iter().collect()
    }
}

/// The deduplicated 3x3x3 neighbourhood of every changed cell.
pub fn expand_positions(changed: &[GridPoint]) -> HashSet<GridPoint> {
    let mut expanded = HashSet::with_capacity(changed.len() * 27);
    for center in changed {
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    expanded.insert(GridPoint::new(center.x + dx, center.y + dy, center.z + dz));
                }
            }
        }
    }
    expanded
}
