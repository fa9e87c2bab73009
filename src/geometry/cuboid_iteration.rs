//! # Cuboid Iteration Module
//!
//! This module provides a peeking iterator that walks every cell of a cuboid.
//!
//! ## Scan Order
//!
//! Cells are visited in nested-loop order: X is the outer loop, Y the middle
//! loop and Z the inner loop. The order is fixed so that a scan which is split
//! across several ticks resumes exactly where it stopped.

use super::{Cuboid, GridPoint};

/// An iterator over grid points that can look at the next point without consuming it.
///
/// Both the full-box and the complement iterators implement this, which lets the
/// scanners treat them interchangeably.
pub trait PointIterator: Iterator<Item = GridPoint> {
    /// Returns the point the next call to `next()` would yield, without advancing.
    fn peek(&self) -> Option<GridPoint>;

    /// Returns `true` once every point has been consumed.
    fn is_exhausted(&self) -> bool {
        self.peek().is_none()
    }
}

/// A cursor over every integer point inside a `Cuboid`.
///
/// The iterator is single use and not restartable. It keeps the next point to
/// hand out in `peeked`, so `peek()` is free and `next()` only has to compute
/// the successor.
#[derive(Clone, Debug)]
pub struct CuboidPointIterator {
    /// Lower corner of the box being walked
    min: GridPoint,
    /// Upper corner of the box being walked
    max: GridPoint,
    /// The point the next call to `next()` returns
    peeked: Option<GridPoint>,
    /// Number of points not yet handed out
    remaining: u64,
}

impl CuboidPointIterator {
    /// Creates an iterator positioned at the first point of `cuboid`.
    pub fn new(cuboid: &Cuboid) -> Self {
        CuboidPointIterator {
            min: cuboid.min(),
            max: cuboid.max(),
            peeked: Some(cuboid.min()),
            remaining: cuboid.volume(),
        }
    }

    /// Creates an iterator that yields nothing.
    ///
    /// Used for the axes of a complement that have no slab.
    pub fn empty() -> Self {
        CuboidPointIterator {
            min: GridPoint::new(0, 0, 0),
            max: GridPoint::new(0, 0, 0),
            peeked: None,
            remaining: 0,
        }
    }

    /// Number of points this iterator will still yield.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn successor(&self, point: GridPoint) -> Option<GridPoint> {
        let mut next = point;
        if next.z < self.max.z {
            next.z += 1;
            return Some(next);
        }
        next.z = self.min.z;
        if next.y < self.max.y {
            next.y += 1;
            return Some(next);
        }
        next.y = self.min.y;
        if next.x < self.max.x {
            next.x += 1;
            return Some(next);
        }
        None
    }
}

impl Iterator for CuboidPointIterator {
    type Item = GridPoint;

    fn next(&mut self) -> Option<GridPoint> {
        let current = self.peeked?;
        self.peeked = self.successor(current);
        self.remaining -= 1;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl PointIterator for CuboidPointIterator {
    fn peek(&self) -> Option<GridPoint> {
        self.peeked
    }
}
