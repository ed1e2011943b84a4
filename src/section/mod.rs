//! Section processing: plane cut, edges and chained polylines.

pub mod chain;
pub mod cut;
mod polyline;

pub use chain::{chain_edges, chain_edges_per_element};
pub use cut::{cut, SectionOptions, ShapeEntry, StoreyResult};
pub use polyline::{Bounds2D, Edge, ElementRef, Polyline2D};
