//! Data model types for building models and resolved storeys.

mod class;
mod document;
mod storey;

pub use class::ElementClass;
pub use document::{
    Element, LengthUnit, ModelDocument, Opening, Placement, RepresentationItem, StoreyRecord,
    UnitAssignment,
};
pub use storey::{BuildingStorey, FilteredElement, StoreyPlan};
