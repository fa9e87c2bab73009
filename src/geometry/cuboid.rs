//! # Cuboid Module
//!
//! Axis-aligned integer boxes with inclusive bounds.

use std::fmt;

use cgmath::Vector3;

use super::{CuboidPointIterator, GridPoint, HalfExtents};

/// An axis-aligned box on the grid.
///
/// Both corners are inclusive, so a cuboid always holds at least one cell.
/// Construction normalizes the two corners into `min` and `max`, which means
/// any pair of opposite corners describes the same box.
///
/// # Examples
///
/// ```
/// use ambient_scan::geometry::{Cuboid, GridPoint};
///
/// let a = Cuboid::new(GridPoint::new(4, 0, 4), GridPoint::new(0, 4, 0));
/// assert_eq!(a.min(), GridPoint::new(0, 0, 0));
/// assert_eq!(a.volume(), 125);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cuboid {
    min: GridPoint,
    max: GridPoint,
}

impl Cuboid {
    /// Creates a cuboid spanning the two given corners.
    ///
    /// # Arguments
    /// * `a` - Any corner of the box
    /// * `b` - The corner diagonally opposite `a`
    pub fn new(a: GridPoint, b: GridPoint) -> Self {
        Cuboid {
            min: GridPoint::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: GridPoint::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates the box reaching `half_extents` cells out from `center` on each axis.
    ///
    /// Negative extents are treated as 0. Corners that would pass the `i32`
    /// limits are clamped to them.
    pub fn centered(center: GridPoint, half_extents: HalfExtents) -> Self {
        let h = Vector3::new(
            half_extents.x.max(0),
            half_extents.y.max(0),
            half_extents.z.max(0),
        );
        Cuboid::new(offset_point(center, -h), offset_point(center, h))
    }

    /// The corner with the smallest coordinates.
    pub fn min(&self) -> GridPoint {
        self.min
    }

    /// The corner with the largest coordinates.
    pub fn max(&self) -> GridPoint {
        self.max
    }

    /// Number of cells along each axis.
    pub fn size(&self) -> Vector3<i64> {
        Vector3::new(
            i64::from(self.max.x) - i64::from(self.min.x) + 1,
            i64::from(self.max.y) - i64::from(self.min.y) + 1,
            i64::from(self.max.z) - i64::from(self.min.z) + 1,
        )
    }

    /// Total number of cells inside the box.
    pub fn volume(&self) -> u64 {
        let size = self.size();
        (size.x * size.y * size.z) as u64
    }

    /// Returns `true` if `point` lies inside the box (bounds inclusive).
    pub fn contains(&self, point: GridPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Returns `true` if every cell of `other` is also inside this box.
    pub fn contains_cuboid(&self, other: &Cuboid) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// Computes the region shared by both boxes.
    ///
    /// # Returns
    /// - `Some(cuboid)` covering exactly the cells in both `self` and `other`
    /// - `None` if the boxes do not overlap
    ///
    /// The result does not depend on argument order.
    pub fn intersection(&self, other: &Cuboid) -> Option<Cuboid> {
        let min = GridPoint::new(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.min.z.max(other.min.z),
        );
        let max = GridPoint::new(
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
            self.max.z.min(other.max.z),
        );

        if min.x > max.x || min.y > max.y || min.z > max.z {
            return None;
        }

        Some(Cuboid { min, max })
    }

    /// Returns a copy of this box moved by `offset`.
    ///
    /// Corners saturate at the `i32` limits.
    pub fn translated(&self, offset: Vector3<i32>) -> Self {
        Cuboid {
            min: offset_point(self.min, offset),
            max: offset_point(self.max, offset),
        }
    }

    /// Raises the bottom face to `floor_y` if the box reaches below it.
    ///
    /// A box that lies entirely below the floor collapses to the single layer at
    /// `floor_y`, keeping the min <= max invariant intact.
    pub fn clamp_min_y(&self, floor_y: i32) -> Self {
        if self.min.y >= floor_y {
            return *self;
        }
        let mut min = self.min;
        let mut max = self.max;
        min.y = floor_y;
        max.y = max.y.max(floor_y);
        Cuboid { min, max }
    }

    /// Creates an iterator over every cell of the box.
    pub fn points(&self) -> CuboidPointIterator {
        CuboidPointIterator::new(self)
    }
}

/// `point + offset`, saturating per axis.
pub(crate) fn offset_point(point: GridPoint, offset: Vector3<i32>) -> GridPoint {
    GridPoint::new(
        point.x.saturating_add(offset.x),
        point.y.saturating_add(offset.y),
        point.z.saturating_add(offset.z),
    )
}

impl fmt::Debug for Cuboid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cuboid[({}, {}, {})..=({}, {}, {})]",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}
