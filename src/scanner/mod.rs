//! # Scanner Module
//!
//! Tick-driven scanners that look for interesting cells around a moving observer.
//!
//! ## Architecture
//!
//! A scanner never owns the world. Each tick it is handed two collaborators:
//! * a `GridAccessor` that reads cells
//! * a `CentroidProvider` that reports the observer position and a world epoch
//!
//! and it reports what it finds to the `ScanHandler` it owns.
//!
//! Two strategies are provided:
//! * `CuboidScanner`: keeps a window of cells around the observer, visits every
//!   cell of it once, then only visits the cells that enter or leave the window
//!   as the observer moves
//! * `RandomScanner`: probes a fixed number of random cells near the observer
//!   every tick, with no memory between ticks
//!
//! Both spread their work over ticks using a per-tick cell budget, so a large
//! window is scanned over several frames instead of stalling one.
//!
//! ## Threading
//!
//! Scanners are plain single-threaded state machines driven by `&mut self`.
//! Work left over at the end of a tick is kept as an iterator and resumed on
//! the next call.

use cgmath::Vector3;
use fastrand::Rng;

use crate::error::GridError;
use crate::geometry::GridPoint;

pub mod config;
pub mod cuboid_scanner;
pub mod random_scanner;
pub mod scan_base;

pub use config::{ScannerConfig, MAX_CELLS_PER_TICK, MAX_HALF_EXTENT};
pub use cuboid_scanner::{CuboidScanner, ScanPhase};
pub use random_scanner::RandomScanner;
pub use scan_base::{Probe, RescanReason, ScanCore, TickAction, TickReport};

/// Read access to the cells of a voxel grid.
///
/// Implementations must be cheap: a scanner may call `cell_at` for every cell it visits.
pub trait GridAccessor {
    /// The opaque cell value stored at each grid point.
    type Cell;

    /// Returns the cell stored at `point`.
    fn cell_at(&self, point: GridPoint) -> Result<Self::Cell, GridError>;
}

/// Supplies the observation center and the identity of the world it is in.
pub trait CentroidProvider {
    /// The cell the scan window is centered on.
    fn center(&self) -> GridPoint;

    /// A token that changes whenever the world under the observer is swapped out.
    ///
    /// Scanners discard all accumulated state when the epoch changes.
    fn epoch(&self) -> u64;
}

/// Receives the cells a scanner finds.
///
/// The scanner calls `is_interesting` to classify a cell, then `on_cell_entered`
/// for every interesting cell it discovers. A `CuboidScanner` configured with
/// exit notifications also calls `on_cell_exited` for interesting cells that
/// leave its window.
pub trait ScanHandler {
    /// The cell type this handler understands.
    type Cell: Copy + PartialEq;

    /// Decides whether a cell is worth reporting.
    fn is_interesting(&self, cell: &Self::Cell) -> bool;

    /// Called for every interesting cell found by a scan.
    ///
    /// # Arguments
    /// * `cell` - The cell value
    /// * `point` - Where the cell is
    /// * `rng` - The scanner's random number generator, for effects that need one
    fn on_cell_entered(&mut self, cell: Self::Cell, point: GridPoint, rng: &mut Rng);

    /// Called for every interesting cell that leaves the scan window.
    fn on_cell_exited(&mut self, _cell: Self::Cell, _point: GridPoint, _rng: &mut Rng) {}

    /// Called when a `CuboidScanner` discards its window without reporting exits.
    ///
    /// Every cell reported so far should be considered gone.
    fn on_scan_reset(&mut self) {}

    /// Called at the start of every tick that does scan work.
    fn pre_scan(&mut self) {}

    /// Called at the end of every tick that does scan work.
    fn post_scan(&mut self) {}
}

/// A minimal `CentroidProvider` holding a position and an epoch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Observer {
    /// Current cell of the observer
    pub position: GridPoint,
    /// Current world epoch
    pub epoch: u64,
}

impl Observer {
    /// Creates an observer at `position` in epoch 0.
    pub fn new(position: GridPoint) -> Self {
        Observer { position, epoch: 0 }
    }

    /// Moves the observer to `position`.
    pub fn move_to(&mut self, position: GridPoint) {
        self.position = position;
    }

    /// Moves the observer by `offset`.
    pub fn move_by(&mut self, offset: Vector3<i32>) {
        self.position += offset;
    }

    /// Signals that the observer now stands in a different world.
    pub fn switch_world(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }
}

impl CentroidProvider for Observer {
    fn center(&self) -> GridPoint {
        self.position
    }

    fn epoch(&self) -> u64 {
        self.epoch
    }
}
