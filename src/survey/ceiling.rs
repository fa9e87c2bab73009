//! # Ceiling Coverage
//!
//! Decides whether the observer is really inside, meaning under a roof, by
//! looking for cover above the columns around it.
//!
//! Each column of a 7x7 square around the observer is worth points, more the
//! closer it is to the center: `min(range - |dx| + 1, range - |dz| + 1)²`. A column
//! scores its points when nothing that acts as a ceiling is found between the top
//! of the scanned span and the observer's head. The observer is inside when the
//! covered share of the points is above `INSIDE_THRESHOLD`.

use log::trace;

use crate::geometry::GridPoint;
use crate::scanner::{CentroidProvider, GridAccessor};

/// Ticks between coverage surveys.
pub const SURVEY_INTERVAL: u64 = 4;
/// Half width of the surveyed square.
pub const INSIDE_SURVEY_RANGE: i32 = 3;
/// Covered share of the points above which the observer counts as inside.
pub const INSIDE_THRESHOLD: f32 = 1.0 - 65.0 / 176.0;
/// Cells above the observer's head checked in each column.
pub const DEFAULT_SCAN_HEIGHT: i32 = 32;

/// A surveyed column and the points it is worth.
#[derive(Copy, Clone, Debug)]
struct Column {
    dx: i32,
    dz: i32,
    points: f32,
}

/// Tracks whether the observer is under cover.
///
/// # Examples
///
/// ```
/// use ambient_scan::error::GridError;
/// use ambient_scan::geometry::GridPoint;
/// use ambient_scan::scanner::{GridAccessor, Observer};
/// use ambient_scan::survey::CeilingCoverage;
///
/// struct Cave;
/// impl GridAccessor for Cave {
///     type Cell = bool;
///     fn cell_at(&self, point: GridPoint) -> Result<bool, GridError> {
///         Ok(point.y >= 10)
///     }
/// }
///
/// let mut ceiling = CeilingCoverage::new();
/// ceiling.tick(&Cave, &Observer::new(GridPoint::new(0, 5, 0)), |solid| *solid);
/// assert!(ceiling.is_really_inside());
/// ```
pub struct CeilingCoverage {
    columns: Vec<Column>,
    total_points: f32,
    scan_height: i32,
    ticks: u64,
    coverage: f32,
    really_inside: bool,
}

impl Default for CeilingCoverage {
    fn default() -> Self {
        Self::new()
    }
}

impl CeilingCoverage {
    /// Creates a tracker that scans `DEFAULT_SCAN_HEIGHT` cells above the head.
    pub fn new() -> Self {
        Self::with_scan_height(DEFAULT_SCAN_HEIGHT)
    }

    /// Creates a tracker that scans `scan_height` cells above the head of each column.
    pub fn with_scan_height(scan_height: i32) -> Self {
        let range = INSIDE_SURVEY_RANGE;
        let mut columns = Vec::with_capacity(((2 * range + 1) * (2 * range + 1)) as usize);
        for dx in -range..=range {
            for dz in -range..=range {
                let candidate = (range - dx.abs() + 1).min(range - dz.abs() + 1) as f32;
                columns.push(Column {
                    dx,
                    dz,
                    points: candidate * candidate,
                });
            }
        }
        // Heavy columns first.
        columns.sort_by(|a, b| b.points.total_cmp(&a.points));
        let total_points = columns.iter().map(|column| column.points).sum();

        CeilingCoverage {
            columns,
            total_points,
            scan_height: scan_height.max(0),
            ticks: 0,
            coverage: 0.0,
            really_inside: false,
        }
    }

    /// Whether the last survey found the observer under cover.
    pub fn is_really_inside(&self) -> bool {
        self.really_inside
    }

    /// Covered share of the points found by the last survey, in `0.0..=1.0`.
    pub fn coverage(&self) -> f32 {
        self.coverage
    }

    /// Sum of the points of every column.
    pub fn total_points(&self) -> f32 {
        self.total_points
    }

    /// Advances by one tick, surveying every `SURVEY_INTERVAL` ticks.
    ///
    /// Cells that cannot be read count as open sky.
    ///
    /// # Arguments
    /// * `grid` - Read access to the cells
    /// * `centroid` - The observer position
    /// * `is_cover` - Returns `true` for cells that act as a ceiling
    ///
    /// # Returns
    /// `true` if a survey ran.
    pub fn tick<G, P, F>(&mut self, grid: &G, centroid: &P, is_cover: F) -> bool
    where
        G: GridAccessor,
        P: CentroidProvider,
        F: Fn(&G::Cell) -> bool,
    {
        let tick = self.ticks;
        self.ticks = self.ticks.wrapping_add(1);
        if tick % SURVEY_INTERVAL != 0 {
            return false;
        }

        let center = centroid.center();
        let open: f32 = self
            .columns
            .iter()
            .filter(|column| !self.is_column_covered(grid, center, column, &is_cover))
            .map(|column| column.points)
            .sum();

        self.coverage = 1.0 - open / self.total_points;
        self.really_inside = self.coverage > INSIDE_THRESHOLD;
        trace!(
            "ceiling coverage {:.3} around {:?}, inside: {}",
            self.coverage,
            center,
            self.really_inside
        );
        true
    }

    fn is_column_covered<G, F>(
        &self,
        grid: &G,
        center: GridPoint,
        column: &Column,
        is_cover: &F,
    ) -> bool
    where
        G: GridAccessor,
        F: Fn(&G::Cell) -> bool,
    {
        let x = center.x.saturating_add(column.dx);
        let z = center.z.saturating_add(column.dz);
        let head = center.y.saturating_add(1);
        let top = head.saturating_add(self.scan_height);

        // Scan down from the top, stopping above the head.
        (head.saturating_add(1)..=top)
            .rev()
            .any(|y| match grid.cell_at(GridPoint::new(x, y, z)) {
                Ok(cell) => is_cover(&cell),
                Err(_) => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::GridError;
    use crate::scanner::Observer;

    /// Solid roof cells at a fixed height; everything else is open.
    struct Roof {
        height: i32,
        columns: HashSet<(i32, i32)>,
    }

    impl Roof {
        /// A roof over every column within `reach` of the origin.
        fn square(height: i32, reach: i32) -> Self {
            let mut columns = HashSet::new();
            for x in -reach..=reach {
                for z in -reach..=reach {
                    columns.insert((x, z));
                }
            }
            Roof { height, columns }
        }
    }

    impl GridAccessor for Roof {
        type Cell = bool;

        fn cell_at(&self, point: GridPoint) -> Result<bool, GridError> {
            Ok(point.y == self.height && self.columns.contains(&(point.x, point.z)))
        }
    }

    fn survey(roof: &Roof, center: GridPoint) -> CeilingCoverage {
        let mut ceiling = CeilingCoverage::new();
        assert!(ceiling.tick(roof, &Observer::new(center), |solid| *solid));
        ceiling
    }

    #[test]
    fn column_points_add_up() {
        let ceiling = CeilingCoverage::new();
        assert_eq!(ceiling.total_points(), 176.0);
        assert_eq!(ceiling.columns.len(), 49);
        assert_eq!(ceiling.columns[0].points, 16.0);
        assert_eq!((ceiling.columns[0].dx, ceiling.columns[0].dz), (0, 0));
    }

    #[test]
    fn open_sky_is_outside() {
        let ceiling = survey(&Roof::square(10, -1), GridPoint::new(0, 5, 0));
        assert!(!ceiling.is_really_inside());
        assert_eq!(ceiling.coverage(), 0.0);
    }

    #[test]
    fn full_roof_is_inside() {
        let ceiling = survey(&Roof::square(10, 3), GridPoint::new(0, 5, 0));
        assert!(ceiling.is_really_inside());
        assert_eq!(ceiling.coverage(), 1.0);
    }

    #[test]
    fn small_roof_is_not_enough() {
        // 16 + 8 * 9 = 88 of 176 points covered.
        let ceiling = survey(&Roof::square(10, 1), GridPoint::new(0, 5, 0));
        assert!(!ceiling.is_really_inside());
        assert!((ceiling.coverage() - 0.5).abs() < 1e-6);

        // Adding the next ring brings 152 points.
        let ceiling = survey(&Roof::square(10, 2), GridPoint::new(0, 5, 0));
        assert!(ceiling.is_really_inside());
    }

    #[test]
    fn cover_at_head_height_does_not_count() {
        let ceiling = survey(&Roof::square(6, 3), GridPoint::new(0, 5, 0));
        assert!(!ceiling.is_really_inside());

        let ceiling = survey(&Roof::square(7, 3), GridPoint::new(0, 5, 0));
        assert!(ceiling.is_really_inside());
    }

    #[test]
    fn roof_above_scan_height_is_ignored() {
        let mut ceiling = CeilingCoverage::with_scan_height(4);
        let roof = Roof::square(20, 3);
        ceiling.tick(&roof, &Observer::new(GridPoint::new(0, 5, 0)), |solid| *solid);
        assert!(!ceiling.is_really_inside());
    }

    #[test]
    fn non_cover_cells_are_skipped() {
        let mut ceiling = CeilingCoverage::new();
        let roof = Roof::square(10, 3);
        ceiling.tick(&roof, &Observer::new(GridPoint::new(0, 5, 0)), |_| false);
        assert!(!ceiling.is_really_inside());
    }

    #[test]
    fn surveys_every_fourth_tick() {
        let roof = Roof::square(10, 3);
        let mut observer = Observer::new(GridPoint::new(0, 5, 0));
        let mut ceiling = CeilingCoverage::new();

        let surveyed: Vec<bool> = (0..9)
            .map(|_| ceiling.tick(&roof, &observer, |solid| *solid))
            .collect();
        assert_eq!(
            surveyed,
            vec![true, false, false, false, true, false, false, false, true]
        );
        assert!(ceiling.is_really_inside());

        // Stepping out from under the roof is only noticed on the next survey.
        observer.move_to(GridPoint::new(50, 5, 0));
        for _ in 0..3 {
            ceiling.tick(&roof, &observer, |solid| *solid);
            assert!(ceiling.is_really_inside());
        }
        ceiling.tick(&roof, &observer, |solid| *solid);
        assert!(!ceiling.is_really_inside());
    }
}
