//! # Random Scanner
//!
//! A stateless scanner that probes random cells near the observer.
//!
//! Each axis offset is the difference of two uniform draws from `0..range`, so
//! samples cluster around the observer and thin out toward the edge of the window.

use fastrand::Rng;
use log::trace;

use crate::error::ConfigError;
use crate::geometry::cuboid::offset_point;
use crate::geometry::HalfExtents;

use super::scan_base::Notify;
use super::{
    CentroidProvider, GridAccessor, ScanCore, ScanHandler, ScannerConfig, TickAction, TickReport,
};

/// Samples `cells_per_tick` random cells around the observer every tick.
///
/// Nothing is remembered between ticks; the same cell may be reported many times.
pub struct RandomScanner<H: ScanHandler> {
    core: ScanCore<H::Cell>,
    handler: H,
}

impl<H: ScanHandler> RandomScanner<H> {
    /// Creates a random scanner.
    ///
    /// # Arguments
    /// * `name` - Label used in log messages
    /// * `config` - Sampling range and budget; `cells_per_tick` is the sample count
    /// * `handler` - Receives the sampled cells
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if `config` fails validation.
    pub fn new(
        name: impl Into<String>,
        config: ScannerConfig,
        handler: H,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(RandomScanner {
            core: ScanCore::new(name, config),
            handler,
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

    /// The handler receiving sampled cells.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutable access to the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Probes one batch of random cells around the observer.
    pub fn tick<G, P>(&mut self, grid: &G, centroid: &P) -> TickReport
    where
        G: GridAccessor<Cell = H::Cell>,
        P: CentroidProvider,
    {
        let mut report = TickReport::new(TickAction::Sampled);
        let center = centroid.center();
        if center.y < self.core.config().floor_y {
            report.action = TickAction::Idle;
            return report;
        }

        let (x_range, y_range, z_range) = {
            let config = self.core.config();
            (config.x_range, config.y_range, config.z_range)
        };

        self.handler.pre_scan();
        for _ in 0..self.core.cells_per_tick() {
            let rng = self.core.rng();
            let offset = HalfExtents::new(
                random_offset(rng, x_range),
                random_offset(rng, y_range),
                random_offset(rng, z_range),
            );
            let point = offset_point(center, offset);
            let probe = self.core.probe(grid, &mut self.handler, point, Notify::Entered);
            report.record(probe);
        }
        self.handler.post_scan();

        report.scan_finished = true;
        trace!(
            "{}: sampled {} cells, {} reported",
            self.name(),
            report.examined,
            report.reported
        );
        report
    }
}

/// A center-weighted offset in `-(range - 1)..=(range - 1)`.
///
/// Non-positive ranges always give 0.
pub fn random_offset(rng: &mut Rng, range: i32) -> i32 {
    if range <= 0 {
        return 0;
    }
    rng.i32(0..range) - rng.i32(0..range)
}
