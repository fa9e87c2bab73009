//! # Geometry Module
//!
//! Integer grid primitives used by the scanners.
//!
//! ## Key Components
//! - `GridPoint`: an integer cell coordinate
//! - `Cuboid`: an axis-aligned box with inclusive bounds
//! - `CuboidPointIterator`: walks every cell of a cuboid
//! - `ComplementPointIterator`: walks the cells of one cuboid that are not in another
//!
//! All iterators hand out `GridPoint` values by copy, so a point returned from
//! `next()` stays valid no matter how far the iterator advances afterwards.

use cgmath::{Point3, Vector3};

pub mod complement_iteration;
pub mod cuboid;
pub mod cuboid_iteration;

pub use complement_iteration::ComplementPointIterator;
pub use cuboid::Cuboid;
pub use cuboid_iteration::{CuboidPointIterator, PointIterator};

/// A single cell coordinate on the voxel grid.
pub type GridPoint = Point3<i32>;

/// Per-axis half extents of a scan window.
pub type HalfExtents = Vector3<i32>;
