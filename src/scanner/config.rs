//! # Scanner Configuration
//!
//! Plain configuration values handed to a scanner at construction.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::HalfExtents;

/// Hard ceiling on the number of cells a scanner examines in one tick.
pub const MAX_CELLS_PER_TICK: usize = 6000;

/// Largest half extent a scanner accepts on any axis.
pub const MAX_HALF_EXTENT: i32 = 1024;

/// When no budget is configured, a scanner examines `volume / AUTO_BUDGET_DIVISOR`
/// cells per tick, so a full window takes about this many ticks.
pub const AUTO_BUDGET_DIVISOR: u64 = 20;

/// Settings for a single scanner.
///
/// Every field has a default, so a JSON object only needs to name the fields it changes.
///
/// # Examples
///
/// ```
/// use ambient_scan::scanner::ScannerConfig;
///
/// let config = ScannerConfig::cubic(2).with_cells_per_tick(10);
/// assert_eq!(config.window_volume(), 125);
/// assert_eq!(config.effective_cells_per_tick(), 10);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Half extent of the window along X
    pub x_range: i32,
    /// Half extent of the window along Y
    pub y_range: i32,
    /// Half extent of the window along Z
    pub z_range: i32,
    /// Cells examined per tick; 0 picks a budget from the window volume
    pub cells_per_tick: usize,
    /// Whether cells leaving the window are reported
    pub notify_exits: bool,
    /// Lowest valid Y; centers below it are ignored and windows never reach below it
    pub floor_y: i32,
    /// Seed for the scanner's random number generator
    pub seed: Option<u64>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            x_range: 16,
            y_range: 16,
            z_range: 16,
            cells_per_tick: 0,
            notify_exits: false,
            floor_y: 0,
            seed: None,
        }
    }
}

impl ScannerConfig {
    /// A configuration with the same half extent on every axis.
    pub fn cubic(range: i32) -> Self {
        ScannerConfig {
            x_range: range,
            y_range: range,
            z_range: range,
            ..Default::default()
        }
    }

    /// Sets the per-tick cell budget.
    pub fn with_cells_per_tick(mut self, cells_per_tick: usize) -> Self {
        self.cells_per_tick = cells_per_tick;
        self
    }

    /// Turns exit notifications on or off.
    pub fn with_exit_notifications(mut self, notify_exits: bool) -> Self {
        self.notify_exits = notify_exits;
        self
    }

    /// Sets the lowest valid Y coordinate.
    pub fn with_floor(mut self, floor_y: i32) -> Self {
        self.floor_y = floor_y;
        self
    }

    /// Seeds the scanner's random number generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The half extents as a vector.
    pub fn half_extents(&self) -> HalfExtents {
        HalfExtents::new(self.x_range, self.y_range, self.z_range)
    }

    /// Number of cells in a full (unclamped) window.
    pub fn window_volume(&self) -> u64 {
        let span = |range: i32| 2 * u64::from(range.unsigned_abs()) + 1;
        span(self.x_range) * span(self.y_range) * span(self.z_range)
    }

    /// The budget actually used per tick.
    ///
    /// An explicit budget is capped at `MAX_CELLS_PER_TICK`. Without one, the
    /// budget is a twentieth of the window volume, under the same cap. The
    /// result is never zero, so every scan makes progress.
    pub fn effective_cells_per_tick(&self) -> usize {
        let budget = if self.cells_per_tick == 0 {
            usize::try_from(self.window_volume() / AUTO_BUDGET_DIVISOR).unwrap_or(usize::MAX)
        } else {
            self.cells_per_tick
        };
        budget.clamp(1, MAX_CELLS_PER_TICK)
    }

    /// Checks that every half extent is within `0..=MAX_HALF_EXTENT`.
    ///
    /// Scanner constructors call this, so a scanner never sees a negative range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("x_range", self.x_range),
            ("y_range", self.y_range),
            ("z_range", self.z_range),
        ] {
            if !(0..=MAX_HALF_EXTENT).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be within 0..={}, got {}", MAX_HALF_EXTENT, value),
                });
            }
        }
        Ok(())
    }
}
