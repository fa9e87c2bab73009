//! # Scanner Walk Integration Test
//!
//! Walks observers through generated worlds and checks that what the scanners
//! report matches the world.

use std::collections::HashMap;
use std::io::Write;

use ambient_scan::config::{DemoConfig, SessionConfig};
use ambient_scan::demo::run_demo;
use ambient_scan::geometry::GridPoint;
use ambient_scan::scanner::{
    CuboidScanner, GridAccessor, Observer, RescanReason, ScanHandler, ScannerConfig, TickAction,
};
use ambient_scan::session::{ScanSession, BLOCK_UPDATE_DELAY};
use ambient_scan::world::block::{BlockType, AIR_TYPES};
use ambient_scan::world::NoiseWorld;
use fastrand::Rng;

/// Mirrors the solid blocks inside the scan window.
#[derive(Default)]
struct Mirror {
    cells: HashMap<GridPoint, BlockType>,
}

impl ScanHandler for Mirror {
    type Cell = BlockType;

    fn is_interesting(&self, cell: &BlockType) -> bool {
        !cell.is_air()
    }

    fn on_cell_entered(&mut self, cell: BlockType, point: GridPoint, _rng: &mut Rng) {
        self.cells.insert(point, cell);
    }

    fn on_cell_exited(&mut self, _cell: BlockType, point: GridPoint, _rng: &mut Rng) {
        self.cells.remove(&point);
    }

    fn on_scan_reset(&mut self) {
        self.cells.clear();
    }
}

fn settle(scanner: &mut CuboidScanner<Mirror>, world: &NoiseWorld, observer: &Observer) {
    for _ in 0..1000 {
        if scanner.tick(world, observer).scan_finished {
            return;
        }
    }
    panic!("scan never finished");
}

fn assert_mirrors_world(scanner: &CuboidScanner<Mirror>, world: &NoiseWorld) {
    let window = scanner.active_cuboid().expect("window should be tracked");
    let mut expected = HashMap::new();
    for point in window.points() {
        let cell = world.cell_at(point).expect("window should be loaded");
        if !cell.is_air() {
            expected.insert(point, cell);
        }
    }
    assert_eq!(scanner.handler().cells, expected);
}

/// Test: the mirror stays exact while the observer wanders.
#[test]
fn test_mirror_follows_random_walk() {
    let mut world = NoiseWorld::new(42);
    let config = ScannerConfig::cubic(6)
        .with_cells_per_tick(400)
        .with_exit_notifications(true);
    let mut scanner = CuboidScanner::new("mirror", config, Mirror::default())
        .unwrap()
        .with_ignored(AIR_TYPES);
    let mut observer = Observer::new(GridPoint::new(0, 40, 0));
    let mut rng = Rng::with_seed(8);

    for step in 0..60 {
        world.load_around(observer.position, 1);
        settle(&mut scanner, &world, &observer);
        if step % 10 == 0 {
            assert_mirrors_world(&scanner, &world);
        }
        observer.move_by(cgmath::Vector3::new(
            rng.i32(-2..=2),
            rng.i32(-1..=1),
            rng.i32(-2..=2),
        ));
    }
    assert_mirrors_world(&scanner, &world);
}

/// Test: a world switch replaces everything the scanner knew.
#[test]
fn test_world_switch_rescans() {
    let mut world = NoiseWorld::new(5);
    let config = ScannerConfig::cubic(4).with_cells_per_tick(1000);
    let mut scanner = CuboidScanner::new("mirror", config, Mirror::default())
        .unwrap()
        .with_ignored(AIR_TYPES);
    let mut observer = Observer::new(GridPoint::new(10, 25, -10));

    world.load_around(observer.position, 1);
    settle(&mut scanner, &world, &observer);
    assert_mirrors_world(&scanner, &world);

    world.switch_world(6);
    observer.epoch = world.epoch();
    world.load_around(observer.position, 1);
    let report = scanner.tick(&world, &observer);
    assert_eq!(report.action, TickAction::Rescan(RescanReason::EpochChanged));
    settle(&mut scanner, &world, &observer);
    assert_mirrors_world(&scanner, &world);
}

/// Test: unloaded cells are skipped instead of stopping the scan.
#[test]
fn test_unloaded_cells_are_skipped() {
    let world = NoiseWorld::new(1);
    let config = ScannerConfig::cubic(2).with_cells_per_tick(1000);
    let mut scanner = CuboidScanner::new("unloaded", config, Mirror::default()).unwrap();

    let report = scanner.tick(&world, &Observer::new(GridPoint::new(0, 20, 0)));
    assert_eq!(report.failed, 125);
    assert!(report.scan_finished);
    assert!(scanner.handler().cells.is_empty());
}

/// Test: block edits reach the session's emitter registry.
#[test]
fn test_session_sees_placed_emitters() {
    let mut world = NoiseWorld::new(11);
    let observer = Observer::new(GridPoint::new(0, 60, 0));
    world.load_around(observer.position, 2);
    let config = SessionConfig {
        effect_range: 16,
        seed: Some(2),
        ..Default::default()
    };
    let mut session = ScanSession::new(config).unwrap();
    for _ in 0..40 {
        session.tick(&world, &observer);
    }
    let before = session.emitters().len();

    let spot = GridPoint::new(3, 62, -4);
    world.set_block(spot, BlockType::Torch).unwrap();
    assert_eq!(session.on_block_update(&world, &[spot]), 1);
    assert_eq!(session.emitters().len(), before + 1);
    assert_eq!(session.emitters().get(spot), Some(BlockType::Torch));
}

/// Test: queued block edits reach the registry after the delay.
#[test]
fn test_session_applies_queued_edits() {
    let mut world = NoiseWorld::new(11);
    let observer = Observer::new(GridPoint::new(0, 60, 0));
    world.load_around(observer.position, 2);
    let config = SessionConfig {
        effect_range: 16,
        seed: Some(2),
        ..Default::default()
    };
    let mut session = ScanSession::new(config).unwrap();
    while !session.tick(&world, &observer).always_on.scan_finished {}

    let spot = GridPoint::new(-2, 61, 5);
    world.set_block(spot, BlockType::Lava).unwrap();
    session.queue_block_update(&[spot]);
    assert_eq!(session.queued_block_updates(), 1);

    let mut applied = 0;
    for _ in 0..=BLOCK_UPDATE_DELAY {
        applied += session.tick(&world, &observer).block_updates;
    }
    assert_eq!(applied, 1);
    assert_eq!(session.emitters().get(spot), Some(BlockType::Lava));
}

/// Test: the demo runs from a configuration file.
#[test]
fn test_demo_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "world_seed": 9,
            "ticks": 12,
            "switch_world_at": 0,
            "load_radius": 2,
            "session": {{ "effect_range": 16, "random_iterations": 50, "seed": 1 }}
        }}"#
    )
    .unwrap();

    let config = DemoConfig::from_path(file.path()).unwrap();
    let summary = run_demo(&config).unwrap();
    assert_eq!(summary.ticks, 12);
    assert_eq!(summary.epoch, 0);
    assert_eq!(summary.rescans, 1);
    assert_eq!(summary.torches, 1);
}
