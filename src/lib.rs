#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Ambient Scan
//!
//! Incremental scanning of the voxel region around a moving observer.
//!
//! The crate finds "interesting" cells near an observer in a large voxel grid and
//! reports them to a handler, spreading the work over ticks with a per-tick cell
//! budget. It is the engine behind ambient effects such as emitters that stay
//! active while they are in range and random effects sampled near the observer.
//!
//! ## Key Modules
//!
//! * `geometry` - Inclusive integer boxes and the iterators that walk them
//! * `scanner` - The cuboid and random scanners and the traits they are driven through
//! * `survey` - Category (biome) weights and ceiling coverage around the observer
//! * `session` - A ready-made set of scanners for ambient effects
//! * `world` - A chunked noise-generated voxel world to scan
//! * `config` - JSON configuration
//!
//! ## Usage
//!
//! ```rust
//! use ambient_scan::config::SessionConfig;
//! use ambient_scan::scanner::Observer;
//! use ambient_scan::session::ScanSession;
//! use ambient_scan::world::NoiseWorld;
//!
//! let mut world = NoiseWorld::new(1);
//! let observer = Observer::new(ambient_scan::geometry::GridPoint::new(0, 40, 0));
//! world.load_around(observer.position, 2);
//!
//! let mut session = ScanSession::new(SessionConfig::default()).unwrap();
//! let report = session.tick(&world, &observer);
//! assert!(report.always_on.examined > 0);
//! ```
//!
//! The binary runs a demo walk through a generated world:
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- demo.json
//! ```

use log::info;

pub mod config;
pub mod demo;
pub mod error;
pub mod geometry;
pub mod scanner;
pub mod session;
pub mod survey;
pub mod world;

use config::DemoConfig;
use error::ConfigError;

/// Initializes logging and runs the demo driver.
///
/// The first command line argument, if any, names a JSON `DemoConfig` file.
pub fn run() -> Result<(), ConfigError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => DemoConfig::from_path(path)?,
        None => DemoConfig::default(),
    };
    demo::run_demo(&config)?;
    Ok(())
}
