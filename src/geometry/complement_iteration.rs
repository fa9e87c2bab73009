//! # Complement Iteration Module
//!
//! Walks the cells of a volume `V` that are not inside a second box `I`.
//!
//! ## Slab Decomposition
//!
//! `V \ I` is split into disjoint axis slabs:
//! - X slabs span the full Y and Z range of `V`
//! - Y slabs span the X range of `I` and the full Z range of `V`
//! - Z slabs span the X and Y range of `I`
//!
//! Each axis contributes a slab below `I` and a slab above it. When `I` is the
//! intersection of `V` with a translated box of the same size, `I` shares at
//! least one corner with `V`, so only one slab per axis is ever non-empty and
//! the complement is covered by at most three slabs.

use super::{Cuboid, CuboidPointIterator, GridPoint, PointIterator};

const SLAB_COUNT: usize = 6;

/// A peeking iterator over the points of `volume` that are not in `intersect`.
///
/// `intersect` is expected to lie inside `volume`. If it does not, only the part
/// of it that overlaps `volume` is excluded; a disjoint `intersect` means every
/// point of `volume` is yielded.
#[derive(Clone, Debug)]
pub struct ComplementPointIterator {
    segments: [CuboidPointIterator; SLAB_COUNT],
    active_segment: usize,
}

impl ComplementPointIterator {
    /// Builds the slab iterators for `volume \ intersect`.
    ///
    /// # Arguments
    /// * `volume` - The full box whose cells are walked
    /// * `intersect` - The box whose cells are skipped
    pub fn new(volume: &Cuboid, intersect: &Cuboid) -> Self {
        let mut segments: [CuboidPointIterator; SLAB_COUNT] =
            std::array::from_fn(|_| CuboidPointIterator::empty());

        let Some(inner) = volume.intersection(intersect) else {
            segments[0] = volume.points();
            return ComplementPointIterator {
                segments,
                active_segment: 0,
            };
        };

        let (vmin, vmax) = (volume.min(), volume.max());
        let (imin, imax) = (inner.min(), inner.max());

        if vmin.x < imin.x {
            segments[0] = slab(
                GridPoint::new(vmin.x, vmin.y, vmin.z),
                GridPoint::new(imin.x - 1, vmax.y, vmax.z),
            );
        }
        if vmax.x > imax.x {
            segments[1] = slab(
                GridPoint::new(imax.x + 1, vmin.y, vmin.z),
                GridPoint::new(vmax.x, vmax.y, vmax.z),
            );
        }
        if vmin.y < imin.y {
            segments[2] = slab(
                GridPoint::new(imin.x, vmin.y, vmin.z),
                GridPoint::new(imax.x, imin.y - 1, vmax.z),
            );
        }
        if vmax.y > imax.y {
            segments[3] = slab(
                GridPoint::new(imin.x, imax.y + 1, vmin.z),
                GridPoint::new(imax.x, vmax.y, vmax.z),
            );
        }
        if vmin.z < imin.z {
            segments[4] = slab(
                GridPoint::new(imin.x, imin.y, vmin.z),
                GridPoint::new(imax.x, imax.y, imin.z - 1),
            );
        }
        if vmax.z > imax.z {
            segments[5] = slab(
                GridPoint::new(imin.x, imin.y, imax.z + 1),
                GridPoint::new(imax.x, imax.y, vmax.z),
            );
        }

        let mut iter = ComplementPointIterator {
            segments,
            active_segment: 0,
        };
        iter.skip_exhausted();
        iter
    }

    /// Number of points this iterator will still yield.
    pub fn remaining(&self) -> u64 {
        self.segments[self.active_segment.min(SLAB_COUNT - 1)..]
            .iter()
            .map(CuboidPointIterator::remaining)
            .sum()
    }

    /// Number of slabs that contribute at least one point.
    pub fn slab_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| !segment.is_exhausted())
            .count()
    }

    fn skip_exhausted(&mut self) {
        while self.active_segment < SLAB_COUNT && self.segments[self.active_segment].is_exhausted()
        {
            self.active_segment += 1;
        }
    }
}

fn slab(a: GridPoint, b: GridPoint) -> CuboidPointIterator {
    Cuboid::new(a, b).points()
}

impl Iterator for ComplementPointIterator {
    type Item = GridPoint;

    fn next(&mut self) -> Option<GridPoint> {
        if self.active_segment >= SLAB_COUNT {
            return None;
        }
        let point = self.segments[self.active_segment].next();
        self.skip_exhausted();
        point
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl PointIterator for ComplementPointIterator {
    fn peek(&self) -> Option<GridPoint> {
        self.segments.get(self.active_segment)?.peek()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use cgmath::Vector3;

    use super::*;

    fn p(x: i32, y: i32, z: i32) -> GridPoint {
        GridPoint::new(x, y, z)
    }

    fn expected_complement(volume: &Cuboid, intersect: &Cuboid) -> HashSet<GridPoint> {
        volume
            .points()
            .filter(|point| !intersect.contains(*point))
            .collect()
    }

    fn assert_exact(volume: &Cuboid, intersect: &Cuboid) {
        let yielded: Vec<GridPoint> = ComplementPointIterator::new(volume, intersect).collect();
        let unique: HashSet<GridPoint> = yielded.iter().copied().collect();
        assert_eq!(unique.len(), yielded.len(), "duplicate points yielded");
        assert_eq!(unique, expected_complement(volume, intersect));
    }

    #[test]
    fn single_axis_move() {
        let old = Cuboid::centered(p(0, 0, 0), Vector3::new(2, 2, 2));
        let new = Cuboid::centered(p(1, 0, 0), Vector3::new(2, 2, 2));
        let intersect = old.intersection(&new).unwrap();

        let exited: Vec<GridPoint> = ComplementPointIterator::new(&old, &intersect).collect();
        assert_eq!(exited.len(), 25);
        assert!(exited.iter().all(|point| point.x == -2));

        let entered: Vec<GridPoint> = ComplementPointIterator::new(&new, &intersect).collect();
        assert_eq!(entered.len(), 25);
        assert!(entered.iter().all(|point| point.x == 3));
    }

    #[test]
    fn diagonal_moves_use_at_most_three_slabs() {
        let extents = Vector3::new(3, 2, 4);
        let old = Cuboid::centered(p(0, 0, 0), extents);
        for offset in [
            Vector3::new(1, 1, 1),
            Vector3::new(-2, 1, -3),
            Vector3::new(0, -1, 2),
            Vector3::new(-1, 0, 0),
        ] {
            let new = old.translated(offset);
            let intersect = old.intersection(&new).unwrap();
            assert!(ComplementPointIterator::new(&old, &intersect).slab_count() <= 3);
            assert!(ComplementPointIterator::new(&new, &intersect).slab_count() <= 3);
            assert_exact(&old, &intersect);
            assert_exact(&new, &intersect);
        }
    }

    #[test]
    fn identical_boxes_have_empty_complement() {
        let volume = Cuboid::new(p(0, 0, 0), p(3, 3, 3));
        let mut iter = ComplementPointIterator::new(&volume, &volume);
        assert_eq!(iter.peek(), None);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.remaining(), 0);
    }

    #[test]
    fn centered_hole_is_excluded() {
        // Not produced by the scanner, but the decomposition still has to be exact.
        let volume = Cuboid::new(p(-3, -3, -3), p(3, 3, 3));
        let hole = Cuboid::new(p(-1, -1, -1), p(1, 1, 1));
        assert_exact(&volume, &hole);
    }

    #[test]
    fn intersect_outside_volume_is_clamped() {
        let volume = Cuboid::new(p(0, 0, 0), p(4, 4, 4));
        let overhanging = Cuboid::new(p(2, -5, 2), p(9, 9, 9));
        assert_exact(&volume, &overhanging);

        let disjoint = Cuboid::new(p(10, 10, 10), p(12, 12, 12));
        let all: Vec<GridPoint> = ComplementPointIterator::new(&volume, &disjoint).collect();
        assert_eq!(all.len() as u64, volume.volume());
    }

    #[test]
    fn peek_matches_next() {
        let old = Cuboid::new(p(0, 0, 0), p(2, 2, 2));
        let new = old.translated(Vector3::new(1, 1, 0));
        let intersect = old.intersection(&new).unwrap();
        let mut iter = ComplementPointIterator::new(&new, &intersect);
        let total = iter.remaining();
        let mut seen = 0;
        while let Some(peeked) = iter.peek() {
            assert_eq!(iter.next(), Some(peeked));
            seen += 1;
        }
        assert_eq!(seen, total);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn random_translations_are_exact() {
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..50 {
            let extents = Vector3::new(rng.i32(0..4), rng.i32(0..4), rng.i32(0..4));
            let old = Cuboid::centered(p(rng.i32(-5..5), rng.i32(-5..5), rng.i32(-5..5)), extents);
            let new = old.translated(Vector3::new(rng.i32(-3..4), rng.i32(-3..4), rng.i32(-3..4)));
            if let Some(intersect) = old.intersection(&new) {
                assert_exact(&old, &intersect);
                assert_exact(&new, &intersect);
            }
        }
    }
}
