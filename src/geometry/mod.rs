//! 3D shapes and their intersection with the cutting plane.

pub mod cache;
pub mod engine;
pub mod kernel;
pub mod openings;
pub mod polyhedral;
pub mod sew;
mod shape;

pub use cache::{CachedShape, ShapeCache};
pub use engine::GeometryEngine;
pub use kernel::{GeometryKernel, GeometrySettings, KernelError, SectionPlane, Segment3};
pub use polyhedral::PolyhedralKernel;
pub use shape::{Aabb, Shape, Shell};
