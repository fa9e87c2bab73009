//! # Cuboid Scanner
//!
//! An exhaustive scanner that keeps a window of cells around the observer.
//!
//! ## Tick Logic
//!
//! 1. A center below the floor drops the window and the scanner idles
//! 2. With no window, or after an epoch change, the whole window is rescanned
//! 3. An unchanged center only resumes unfinished work
//! 4. A moved center is compared against the old window:
//!    - no overlap, or at least half the window changed: full rescan
//!    - small move with no pending work: delta update of the cells that left
//!      and entered the window
//!    - small move while work is pending: the pending work is finished first and
//!      the delta is picked up on a later tick
//!
//! Full scans and delta updates draw from the same per-tick cell budget and are
//! resumed across ticks until they complete.

use log::{debug, error, info};

use crate::error::ConfigError;
use crate::geometry::{ComplementPointIterator, Cuboid, CuboidPointIterator, GridPoint};

use super::scan_base::Notify;
use super::{
    CentroidProvider, GridAccessor, RescanReason, ScanCore, ScanHandler, ScannerConfig,
    TickAction, TickReport,
};

/// The externally visible state of a `CuboidScanner`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScanPhase {
    /// No window is tracked
    Idle,
    /// A full scan of the window is in progress
    FullScan,
    /// A delta update is in progress
    Delta,
    /// Every cell of the window has been visited
    Complete,
}

/// Work that survives between ticks.
enum ScanWork {
    Full(CuboidPointIterator),
    Delta {
        exited: Option<ComplementPointIterator>,
        entered: ComplementPointIterator,
    },
}

/// Scans a window of cells around the observer and keeps it up to date as the observer moves.
///
/// # Fields
/// - `core`: budget, ignore list and random source
/// - `handler`: receives the cells found
/// - `active`: the window currently tracked
/// - `last_center` / `last_epoch`: the observer state the window was built for
/// - `work`: unfinished scan work, resumed on the next tick
///
/// # Examples
///
/// ```
/// use ambient_scan::error::GridError;
/// use ambient_scan::geometry::GridPoint;
/// use ambient_scan::scanner::{CuboidScanner, GridAccessor, Observer, ScanHandler, ScannerConfig};
///
/// struct Flat;
/// impl GridAccessor for Flat {
///     type Cell = bool;
///     fn cell_at(&self, point: GridPoint) -> Result<bool, GridError> {
///         Ok(point.y == 1)
///     }
/// }
///
/// #[derive(Default)]
/// struct Count(usize);
/// impl ScanHandler for Count {
///     type Cell = bool;
///     fn is_interesting(&self, cell: &bool) -> bool {
///         *cell
///     }
///     fn on_cell_entered(&mut self, _: bool, _: GridPoint, _: &mut fastrand::Rng) {
///         self.0 += 1;
///     }
/// }
///
/// let config = ScannerConfig::cubic(1).with_cells_per_tick(100);
/// let mut scanner = CuboidScanner::new("doc", config, Count::default()).unwrap();
/// scanner.tick(&Flat, &Observer::new(GridPoint::new(0, 1, 0)));
/// assert!(scanner.is_scan_finished());
/// assert_eq!(scanner.handler().0, 9);
/// ```
pub struct CuboidScanner<H: ScanHandler> {
    core: ScanCore<H::Cell>,
    handler: H,
    active: Option<Cuboid>,
    last_center: GridPoint,
    last_epoch: u64,
    work: Option<ScanWork>,
}

impl<H: ScanHandler> CuboidScanner<H> {
    /// Creates an idle scanner.
    ///
    /// # Arguments
    /// * `name` - Label used in log messages
    /// * `config` - Window size, budget and notification settings
    /// * `handler` - Receives the cells the scanner finds
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if `config` fails validation.
    pub fn new(
        name: impl Into<String>,
        config: ScannerConfig,
        handler: H,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let core = ScanCore::new(name, config);
        info!(
            "{}: window volume {}, {} cells per tick",
            core.name(),
            core.config().window_volume(),
            core.cells_per_tick()
        );
        Ok(CuboidScanner {
            core,
            handler,
            active: None,
            last_center: GridPoint::new(0, 0, 0),
            last_epoch: 0,
            work: None,
        })
    }

    /// Adds cell values that are skipped without consulting the handler.
    pub fn with_ignored(mut self, cells: impl IntoIterator<Item = H::Cell>) -> Self {
        self.core = self.core.with_ignored(cells);
        self
    }

    /// The label used in log messages.
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// The scanner configuration.
    pub fn config(&self) -> &ScannerConfig {
        self.core.config()
    }

    /// The handler receiving scan results.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutable access to the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// The window currently tracked, if any.
    pub fn active_cuboid(&self) -> Option<Cuboid> {
        self.active
    }

    /// Returns `true` when a window is tracked and every cell of it has been visited.
    pub fn is_scan_finished(&self) -> bool {
        self.active.is_some() && self.work.is_none()
    }

    /// Returns `true` if `point` lies inside the tracked window.
    pub fn is_tracked(&self, point: GridPoint) -> bool {
        self.active.map_or(false, |cuboid| cuboid.contains(point))
    }

    /// The current state of the scanner.
    pub fn phase(&self) -> ScanPhase {
        match (&self.active, &self.work) {
            (None, _) => ScanPhase::Idle,
            (Some(_), Some(ScanWork::Full(_))) => ScanPhase::FullScan,
            (Some(_), Some(ScanWork::Delta { .. })) => ScanPhase::Delta,
            (Some(_), None) => ScanPhase::Complete,
        }
    }

    /// The window the scanner would track for an observer at `center`.
    pub fn volume_for(&self, center: GridPoint) -> Cuboid {
        let config = self.core.config();
        Cuboid::centered(center, config.half_extents()).clamp_min_y(config.floor_y)
    }

    /// Advances the scanner by one tick.
    ///
    /// # Arguments
    /// * `grid` - Read access to the cells
    /// * `centroid` - The observer position and world epoch
    ///
    /// # Returns
    /// A summary of the decision taken and the cells examined.
    pub fn tick<G, P>(&mut self, grid: &G, centroid: &P) -> TickReport
    where
        G: GridAccessor<Cell = H::Cell>,
        P: CentroidProvider,
    {
        let center = centroid.center();
        let epoch = centroid.epoch();

        if center.y < self.core.config().floor_y {
            if self.active.take().is_some() {
                debug!("{}: center {:?} is below the floor, dropping window", self.name(), center);
                self.handler.on_scan_reset();
            }
            self.work = None;
            return TickReport::new(TickAction::Idle);
        }

        let action = match self.active {
            None => self.reset_full_scan(center, epoch, RescanReason::Initial),
            Some(_) if epoch != self.last_epoch => {
                self.reset_full_scan(center, epoch, RescanReason::EpochChanged)
            }
            Some(_) if center == self.last_center => {
                if self.work.is_none() {
                    let mut report = TickReport::new(TickAction::Unchanged);
                    report.scan_finished = true;
                    return report;
                }
                TickAction::Continued
            }
            Some(old) => self.handle_move(old, center, epoch),
        };

        let mut report = TickReport::new(action);
        self.handler.pre_scan();
        self.run_work(grid, &mut report);
        self.handler.post_scan();
        report.scan_finished = self.work.is_none();
        report
    }

    /// Rechecks a single cell that changed outside of the normal scan.
    ///
    /// If the cell is inside the tracked window and interesting it is reported
    /// to the handler as entered. Accessor failures are logged and swallowed.
    ///
    /// # Returns
    /// `true` if the handler was notified.
    pub fn on_cell_update<G>(&mut self, grid: &G, point: GridPoint) -> bool
    where
        G: GridAccessor<Cell = H::Cell>,
    {
        if !self.is_tracked(point) {
            return false;
        }
        match grid.cell_at(point) {
            Ok(cell) => {
                if self.core.is_ignored(&cell) || !self.handler.is_interesting(&cell) {
                    return false;
                }
                self.handler.on_cell_entered(cell, point, self.core.rng());
                true
            }
            Err(err) => {
                error!("{}: cell update failed: {}", self.name(), err);
                false
            }
        }
    }

    fn handle_move(&mut self, old: Cuboid, center: GridPoint, epoch: u64) -> TickAction {
        let new = self.volume_for(center);
        let intersect = match old.intersection(&new) {
            None => return self.reset_full_scan(center, epoch, RescanReason::NoOverlap),
            Some(intersect) => intersect,
        };

        if (old.volume() - intersect.volume()) * 2 >= old.volume() {
            return self.reset_full_scan(center, epoch, RescanReason::LargeMove);
        }

        if self.work.is_some() {
            return TickAction::Deferred;
        }

        let exited = self
            .core
            .config()
            .notify_exits
            .then(|| ComplementPointIterator::new(&old, &intersect));
        let entered = ComplementPointIterator::new(&new, &intersect);
        debug!(
            "{}: delta update {:?} -> {:?}, {} cells entering",
            self.name(),
            self.last_center,
            center,
            entered.remaining()
        );

        self.active = Some(new);
        self.last_center = center;
        self.work = Some(ScanWork::Delta { exited, entered });
        TickAction::Delta
    }

    fn reset_full_scan(&mut self, center: GridPoint, epoch: u64, reason: RescanReason) -> TickAction {
        let volume = self.volume_for(center);
        match reason {
            RescanReason::Initial | RescanReason::EpochChanged => {
                info!("{}: full scan of {:?} ({:?})", self.name(), volume, reason)
            }
            RescanReason::NoOverlap | RescanReason::LargeMove => {
                debug!("{}: full scan of {:?} ({:?})", self.name(), volume, reason)
            }
        }

        if self.active.is_some() {
            self.handler.on_scan_reset();
        }
        self.active = Some(volume);
        self.last_center = center;
        self.last_epoch = epoch;
        self.work = Some(ScanWork::Full(volume.points()));
        TickAction::Rescan(reason)
    }

    fn run_work<G>(&mut self, grid: &G, report: &mut TickReport)
    where
        G: GridAccessor<Cell = H::Cell>,
    {
        let mut budget = self.core.cells_per_tick();
        let finished = match &mut self.work {
            None => return,
            Some(ScanWork::Full(iter)) => self.core.drain(
                iter,
                &mut budget,
                grid,
                &mut self.handler,
                Notify::Entered,
                report,
            ),
            Some(ScanWork::Delta { exited, entered }) => {
                let exits_done = match exited {
                    Some(iter) => self.core.drain(
                        iter,
                        &mut budget,
                        grid,
                        &mut self.handler,
                        Notify::Exited,
                        report,
                    ),
                    None => true,
                };
                exits_done
                    && self.core.drain(
                        entered,
                        &mut budget,
                        grid,
                        &mut self.handler,
                        Notify::Entered,
                        report,
                    )
            }
        };

        if finished {
            self.work = None;
            debug!(
                "{}: scan finished, {} cells examined this tick",
                self.name(),
                report.examined
            );
        }
    }
}
