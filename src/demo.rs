//! # Demo Driver
//!
//! Walks an observer across a `NoiseWorld` and runs a `ScanSession` every tick.
//!
//! ## Walk
//!
//! 1. The observer steps along +X with a random sideways drift, staying a couple
//!    of cells above the terrain surface
//! 2. Chunks around the observer are loaded before each tick and far chunks are dropped
//! 3. Every `TORCH_INTERVAL` ticks a torch is placed next to the observer and
//!    queued as a block update
//! 4. On `switch_world_at` the world is regenerated with a new seed

use cgmath::Vector3;
use fastrand::Rng;
use log::{info, warn};

use crate::config::DemoConfig;
use crate::error::ConfigError;
use crate::geometry::GridPoint;
use crate::scanner::{Observer, TickAction};
use crate::session::ScanSession;
use crate::world::block::BlockType;
use crate::world::terrain::SEA_LEVEL;
use crate::world::NoiseWorld;

/// Ticks between torch placements.
pub const TORCH_INTERVAL: u64 = 10;
/// Height of the observer above the terrain surface.
pub const EYE_HEIGHT: i32 = 2;

/// Totals collected over a demo run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DemoSummary {
    /// Ticks run
    pub ticks: u64,
    /// Full rescans started by the always-on window
    pub rescans: u64,
    /// Delta updates started by the always-on window
    pub deltas: u64,
    /// Cells the always-on window failed to read
    pub failed_reads: u64,
    /// Torches placed
    pub torches: u64,
    /// Emitters registered when the run ended
    pub emitters: usize,
    /// Ambient hits of both random samplers
    pub ambient_hits: u64,
    /// Ticks the observer spent under a roof
    pub inside_ticks: u64,
    /// World epoch when the run ended
    pub epoch: u64,
}

/// Runs the demo described by `config`.
pub fn run_demo(config: &DemoConfig) -> Result<DemoSummary, ConfigError> {
    config.validate()?;
    let mut session = ScanSession::new(config.session.clone())?;
    let mut world = NoiseWorld::new(config.world_seed);
    let mut rng = Rng::with_seed(u64::from(config.world_seed));
    let mut observer = Observer::new(standing_point(&world, 0, 0));
    let mut summary = DemoSummary::default();

    for tick in 1..=config.ticks {
        if config.switch_world_at > 0 && tick == config.switch_world_at {
            world.switch_world(world.seed().wrapping_add(1));
            observer.epoch = world.epoch();
            observer.move_to(standing_point(&world, observer.position.x, observer.position.z));
        }

        world.load_around(observer.position, config.load_radius);
        world.unload_outside(observer.position, config.load_radius + 1);

        let report = session.tick(&world, &observer);
        match report.always_on.action {
            TickAction::Rescan(_) => summary.rescans += 1,
            TickAction::Delta => summary.deltas += 1,
            _ => {}
        }
        summary.failed_reads += report.always_on.failed as u64;
        summary.ambient_hits += (report.near.reported + report.far.reported) as u64;
        if session.is_really_inside() {
            summary.inside_ticks += 1;
        }

        if tick % TORCH_INTERVAL == 0 {
            let spot = observer.position + Vector3::new(1, 0, 0);
            match world.set_block(spot, BlockType::Torch) {
                Ok(_) => {
                    session.queue_block_update(&[spot]);
                    summary.torches += 1;
                }
                Err(err) => warn!("could not place torch: {}", err),
            }
        }

        let x = observer.position.x + 1;
        let z = observer.position.z + rng.i32(-1..=1);
        observer.move_to(standing_point(&world, x, z));
    }

    summary.ticks = config.ticks;
    summary.emitters = session.emitters().len();
    summary.epoch = world.epoch();
    info!(
        "demo finished after {} ticks: {} rescans, {} deltas, {} emitters, {} ambient hits, {} ticks inside, block updates {:?} on average",
        summary.ticks,
        summary.rescans,
        summary.deltas,
        summary.emitters,
        summary.ambient_hits,
        summary.inside_ticks,
        session.block_update_timer().average()
    );
    Ok(summary)
}

/// The observer position above column `(x, z)`.
fn standing_point(world: &NoiseWorld, x: i32, z: i32) -> GridPoint {
    let surface = world.terrain().surface_height(x, z);
    GridPoint::new(x, surface.max(SEA_LEVEL) + EYE_HEIGHT, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;

    fn small_config() -> DemoConfig {
        DemoConfig {
            session: SessionConfig {
                effect_range: 16,
                near_range: 8,
                far_range: 16,
                random_iterations: 100,
                seed: Some(4),
                ..Default::default()
            },
            world_seed: 3,
            ticks: 30,
            switch_world_at: 25,
            load_radius: 2,
        }
    }

    #[test]
    fn demo_runs_and_switches_worlds() {
        let summary = run_demo(&small_config()).unwrap();
        assert_eq!(summary.ticks, 30);
        assert_eq!(summary.epoch, 1);
        assert!(summary.rescans >= 2);
        assert!(summary.deltas > 0);
        assert_eq!(summary.torches, 3);
        assert!(summary.inside_ticks <= summary.ticks);
    }

    #[test]
    fn invalid_demo_config_fails_early() {
        let config = DemoConfig {
            load_radius: -1,
            ..small_config()
        };
        assert!(run_demo(&config).is_err());
    }
}
