//! # Area Survey
//!
//! Counts the categories (biomes) of the columns in a square around the observer,
//! giving the relative weight of each category in the local area.
//!
//! A survey is cheap compared to a cell scan, but still touches `(2r + 1)²`
//! columns, so it only refreshes when its fingerprint changes or on a fixed
//! tick interval:
//! * the observer center moved
//! * the world epoch changed
//! * the category under the observer changed
//! * `refresh_interval` ticks passed since the last survey

use std::collections::HashMap;
use std::hash::Hash;

use log::trace;

use crate::geometry::GridPoint;
use crate::scanner::CentroidProvider;

pub mod ceiling;

pub use ceiling::CeilingCoverage;

/// Default half width of the surveyed square.
pub const DEFAULT_SURVEY_RANGE: i32 = 18;
/// Default number of ticks between forced refreshes.
pub const DEFAULT_REFRESH_INTERVAL: u64 = 20;
/// Intensity of a category that covers none of the area but is still present.
pub const MIN_INTENSITY: f32 = 0.05;

/// Supplies the category of each world column.
pub trait SurveySource {
    /// The category type, typically a biome.
    type Category: Copy + Eq + Hash;

    /// The category of column `(x, z)`.
    fn category_at(&self, x: i32, z: i32) -> Self::Category;

    /// Returns `true` when the whole context has a single category and no
    /// spatial survey is meaningful.
    fn is_uniform(&self) -> bool {
        false
    }
}

/// The last survey's inputs; a survey is redone when any of them change.
#[derive(Clone, Debug, PartialEq)]
struct Fingerprint<K> {
    center: GridPoint,
    epoch: u64,
    category: K,
}

/// Relative weights of the categories around the observer.
///
/// # Examples
///
/// ```
/// use ambient_scan::geometry::GridPoint;
/// use ambient_scan::scanner::Observer;
/// use ambient_scan::survey::{AreaSurvey, SurveySource};
///
/// struct Halves;
/// impl SurveySource for Halves {
///     type Category = bool;
///     fn category_at(&self, x: i32, _z: i32) -> bool {
///         x >= 0
///     }
/// }
///
/// let mut survey = AreaSurvey::new(1, 20);
/// survey.tick(&Halves, &Observer::new(GridPoint::new(0, 0, 0)));
/// assert_eq!(survey.area(), 9);
/// assert_eq!(survey.weight(&true), 6);
/// ```
pub struct AreaSurvey<K> {
    range: i32,
    refresh_interval: u64,
    ticks: u64,
    area: u64,
    weights: HashMap<K, u64>,
    fingerprint: Option<Fingerprint<K>>,
}

impl<K: Copy + Eq + Hash> AreaSurvey<K> {
    /// Creates a survey that has not run yet.
    ///
    /// # Arguments
    /// * `range` - Half width of the surveyed square; negative values are treated as 0
    /// * `refresh_interval` - Ticks between forced refreshes; 0 disables them
    pub fn new(range: i32, refresh_interval: u64) -> Self {
        AreaSurvey {
            range: range.max(0),
            refresh_interval,
            ticks: 0,
            area: 0,
            weights: HashMap::new(),
            fingerprint: None,
        }
    }

    /// The number of columns in a full survey.
    pub fn max_area(&self) -> u64 {
        let side = 2 * u64::from(self.range.unsigned_abs()) + 1;
        side * side
    }

    /// Number of columns counted by the last survey.
    pub fn area(&self) -> u64 {
        self.area
    }

    /// Column counts per category from the last survey.
    pub fn weights(&self) -> &HashMap<K, u64> {
        &self.weights
    }

    /// Column count of a single category.
    pub fn weight(&self, category: &K) -> u64 {
        self.weights.get(category).copied().unwrap_or(0)
    }

    /// Share of the area covered by `category`, in `0.0..=1.0`.
    pub fn fraction(&self, category: &K) -> f32 {
        if self.area == 0 {
            return 0.0;
        }
        self.weight(category) as f32 / self.area as f32
    }

    /// Effect intensity for a category present in the area.
    ///
    /// Scales linearly from `MIN_INTENSITY` to 1.0 with the covered fraction.
    ///
    /// # Returns
    /// `None` if the category was not found by the last survey.
    pub fn intensity(&self, category: &K) -> Option<f32> {
        self.weights
            .contains_key(category)
            .then(|| MIN_INTENSITY + (1.0 - MIN_INTENSITY) * self.fraction(category))
    }

    /// Intensities of every category found by the last survey.
    pub fn intensities(&self) -> impl Iterator<Item = (K, f32)> + '_ {
        self.weights.keys().map(move |category| {
            let intensity = MIN_INTENSITY + (1.0 - MIN_INTENSITY) * self.fraction(category);
            (*category, intensity)
        })
    }

    /// Advances the survey by one tick, resurveying if needed.
    ///
    /// # Returns
    /// `true` if the survey was refreshed.
    pub fn tick<S, P>(&mut self, source: &S, centroid: &P) -> bool
    where
        S: SurveySource<Category = K>,
        P: CentroidProvider,
    {
        let tick = self.ticks;
        self.ticks = self.ticks.wrapping_add(1);

        let center = centroid.center();
        let fingerprint = Fingerprint {
            center,
            epoch: centroid.epoch(),
            category: source.category_at(center.x, center.z),
        };
        let interval_due = self.refresh_interval > 0 && tick % self.refresh_interval == 0;
        if !interval_due && self.fingerprint.as_ref() == Some(&fingerprint) {
            return false;
        }

        self.weights.clear();
        if source.is_uniform() {
            self.weights.insert(fingerprint.category, 1);
            self.area = 1;
        } else {
            for dz in -self.range..=self.range {
                for dx in -self.range..=self.range {
                    let x = center.x.saturating_add(dx);
                    let category = source.category_at(x, center.z.saturating_add(dz));
                    *self.weights.entry(category).or_insert(0) += 1;
                }
            }
            self.area = self.max_area();
        }
        trace!(
            "surveyed {} columns around {:?}, {} categories",
            self.area,
            center,
            self.weights.len()
        );
        self.fingerprint = Some(fingerprint);
        true
    }
}
