//! Coordinate transformation of chained polylines.

mod coords;

pub use coords::CoordinateTransform;
