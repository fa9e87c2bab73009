//! # Scan Base
//!
//! The state and per-cell logic shared by every scanner: the budget, the ignore
//! list, the random number generator and the probe of a single cell.

use fastrand::Rng;
use log::warn;

use crate::geometry::{GridPoint, PointIterator};

use super::{GridAccessor, ScanHandler, ScannerConfig};

/// Why a `CuboidScanner` threw its window away and started over.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RescanReason {
    /// No window was tracked yet
    Initial,
    /// The world epoch changed
    EpochChanged,
    /// The new window does not overlap the old one
    NoOverlap,
    /// At least half of the old window would have changed
    LargeMove,
}

/// What a scanner decided to do during a tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TickAction {
    /// The center is invalid; nothing is tracked
    Idle,
    /// Nothing moved and no work was pending
    #[default]
    Unchanged,
    /// A full scan of a new window started
    Rescan(RescanReason),
    /// Pending work was resumed with the center unchanged
    Continued,
    /// The center moved but earlier work has to finish first
    Deferred,
    /// An incremental update for a small move started
    Delta,
    /// Random cells were sampled
    Sampled,
}

/// The fate of a single probed cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Probe {
    /// The point is below the floor and was not read
    BelowFloor,
    /// The accessor failed
    Failed,
    /// The cell is on the ignore list
    Ignored,
    /// The handler did not want the cell
    Uninteresting,
    /// The handler was notified
    Reported,
}

/// Which handler callback a probe should invoke.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Notify {
    Entered,
    Exited,
}

/// Summary of the work done in one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// What the scanner decided to do
    pub action: TickAction,
    /// Cells taken from the budget
    pub examined: usize,
    /// Cells passed to the handler
    pub reported: usize,
    /// Cells skipped through the ignore list
    pub ignored: usize,
    /// Cells the accessor failed to read
    pub failed: usize,
    /// Whether the scanner has no work left after this tick
    pub scan_finished: bool,
}

impl TickReport {
    /// An empty report for `action`.
    pub fn new(action: TickAction) -> Self {
        TickReport {
            action,
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, probe: Probe) {
        self.examined += 1;
        match probe {
            Probe::Reported => self.reported += 1,
            Probe::Ignored => self.ignored += 1,
            Probe::Failed => self.failed += 1,
            Probe::BelowFloor | Probe::Uninteresting => {}
        }
    }
}

/// State shared by all scanner strategies.
///
/// # Fields
/// - `name`: label used in log messages
/// - `config`: the scanner's configuration
/// - `cells_per_tick`: the effective budget derived from `config`
/// - `ignored`: cell values skipped before the handler is asked
/// - `rng`: random source handed to the handler and used for sampling
pub struct ScanCore<C> {
    name: String,
    config: ScannerConfig,
    cells_per_tick: usize,
    ignored: Vec<C>,
    rng: Rng,
}

impl<C: Copy + PartialEq> ScanCore<C> {
    /// Creates the shared state for a scanner called `name`.
    ///
    /// The random number generator is seeded from `config.seed` when present.
    pub fn new(name: impl Into<String>, config: ScannerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        ScanCore {
            name: name.into(),
            cells_per_tick: config.effective_cells_per_tick(),
            config,
            ignored: Vec::new(),
            rng,
        }
    }

    /// Adds cell values that are skipped without consulting the handler.
    ///
    /// List the most common value last; lookups search from the end.
    pub fn with_ignored(mut self, cells: impl IntoIterator<Item = C>) -> Self {
        self.ignored.extend(cells);
        self
    }

    /// The label used in log messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scanner configuration.
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// The effective per-tick budget.
    pub fn cells_per_tick(&self) -> usize {
        self.cells_per_tick
    }

    /// Returns `true` if `cell` is on the ignore list.
    pub fn is_ignored(&self, cell: &C) -> bool {
        self.ignored.iter().rev().any(|ignored| ignored == cell)
    }

    /// The scanner's random number generator.
    pub fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }

    /// Reads one cell and hands it to the handler if it passes the filters.
    pub(crate) fn probe<G, H>(
        &mut self,
        grid: &G,
        handler: &mut H,
        point: GridPoint,
        notify: Notify,
    ) -> Probe
    where
        G: GridAccessor<Cell = C>,
        H: ScanHandler<Cell = C>,
    {
        if point.y < self.config.floor_y {
            return Probe::BelowFloor;
        }

        let cell = match grid.cell_at(point) {
            Ok(cell) => cell,
            Err(err) => {
                warn!("{}: skipping cell: {}", self.name, err);
                return Probe::Failed;
            }
        };

        if self.is_ignored(&cell) {
            return Probe::Ignored;
        }
        if !handler.is_interesting(&cell) {
            return Probe::Uninteresting;
        }

        match notify {
            Notify::Entered => handler.on_cell_entered(cell, point, &mut self.rng),
            Notify::Exited => handler.on_cell_exited(cell, point, &mut self.rng),
        }
        Probe::Reported
    }

    /// Probes points from `iter` until it runs dry or `budget` reaches zero.
    ///
    /// # Returns
    /// `true` if the iterator is exhausted.
    pub(crate) fn drain<I, G, H>(
        &mut self,
        iter: &mut I,
        budget: &mut usize,
        grid: &G,
        handler: &mut H,
        notify: Notify,
        report: &mut TickReport,
    ) -> bool
    where
        I: PointIterator,
        G: GridAccessor<Cell = C>,
        H: ScanHandler<Cell = C>,
    {
        while *budget > 0 {
            let Some(point) = iter.next() else {
                return true;
            };
            *budget -= 1;
            let probe = self.probe(grid, handler, point, notify);
            report.record(probe);
        }
        iter.is_exhausted()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::GridError;
    use crate::geometry::Cuboid;

    struct Cells(HashMap<GridPoint, u8>);

    impl GridAccessor for Cells {
        type Cell = u8;

        fn cell_at(&self, point: GridPoint) -> Result<u8, GridError> {
            self.0.get(&point).copied().ok_or(GridError::Unloaded(point))
        }
    }

    #[derive(Default)]
    struct Collect {
        entered: Vec<(u8, GridPoint)>,
        exited: Vec<(u8, GridPoint)>,
    }

    impl ScanHandler for Collect {
        type Cell = u8;

        fn is_interesting(&self, cell: &u8) -> bool {
            *cell >= 2
        }

        fn on_cell_entered(&mut self, cell: u8, point: GridPoint, _rng: &mut Rng) {
            self.entered.push((cell, point));
        }

        fn on_cell_exited(&mut self, cell: u8, point: GridPoint, _rng: &mut Rng) {
            self.exited.push((cell, point));
        }
    }

    fn p(x: i32, y: i32, z: i32) -> GridPoint {
        GridPoint::new(x, y, z)
    }

    #[test]
    fn probe_applies_filters_in_order() {
        let grid = Cells(HashMap::from([
            (p(0, 1, 0), 0u8),
            (p(1, 1, 0), 1),
            (p(2, 1, 0), 3),
        ]));
        let mut core = ScanCore::new("test", ScannerConfig::cubic(1)).with_ignored([0u8]);
        let mut handler = Collect::default();

        assert_eq!(core.probe(&grid, &mut handler, p(0, 1, 0), Notify::Entered), Probe::Ignored);
        assert_eq!(
            core.probe(&grid, &mut handler, p(1, 1, 0), Notify::Entered),
            Probe::Uninteresting
        );
        assert_eq!(core.probe(&grid, &mut handler, p(2, 1, 0), Notify::Exited), Probe::Reported);
        assert_eq!(core.probe(&grid, &mut handler, p(9, 1, 0), Notify::Entered), Probe::Failed);
        assert_eq!(
            core.probe(&grid, &mut handler, p(2, -1, 0), Notify::Entered),
            Probe::BelowFloor
        );

        assert!(handler.entered.is_empty());
        assert_eq!(handler.exited, vec![(3, p(2, 1, 0))]);
    }

    #[test]
    fn drain_respects_budget_and_resumes() {
        let cuboid = Cuboid::new(p(0, 0, 0), p(1, 1, 1));
        let grid = Cells(cuboid.points().map(|point| (point, 2u8)).collect());
        let mut core = ScanCore::new("test", ScannerConfig::cubic(1));
        let mut handler = Collect::default();
        let mut iter = cuboid.points();
        let mut report = TickReport::default();

        let mut budget = 5;
        let done = core.drain(&mut iter, &mut budget, &grid, &mut handler, Notify::Entered, &mut report);
        assert!(!done);
        assert_eq!(budget, 0);
        assert_eq!(report.examined, 5);

        let mut budget = 5;
        let done = core.drain(&mut iter, &mut budget, &grid, &mut handler, Notify::Entered, &mut report);
        assert!(done);
        assert_eq!(budget, 2);
        assert_eq!(handler.entered.len(), 8);
        assert_eq!(report.reported, 8);
    }

    #[test]
    fn drain_reports_exhaustion_at_exact_budget() {
        let cuboid = Cuboid::new(p(0, 0, 0), p(0, 0, 3));
        let grid = Cells(cuboid.points().map(|point| (point, 0u8)).collect());
        let mut core = ScanCore::new("test", ScannerConfig::cubic(1));
        let mut handler = Collect::default();
        let mut iter = cuboid.points();
        let mut report = TickReport::default();

        let mut budget = 4;
        assert!(core.drain(&mut iter, &mut budget, &grid, &mut handler, Notify::Entered, &mut report));
    }

    #[test]
    fn seeded_cores_share_a_sequence() {
        let config = ScannerConfig::cubic(1).with_seed(99);
        let mut a: ScanCore<u8> = ScanCore::new("a", config.clone());
        let mut b: ScanCore<u8> = ScanCore::new("b", config);
        let left: Vec<u32> = (0..8).map(|_| a.rng().u32(..)).collect();
        let right: Vec<u32> = (0..8).map(|_| b.rng().u32(..)).collect();
        assert_eq!(left, right);
    }
}
