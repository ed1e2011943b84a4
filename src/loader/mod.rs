//! Model loading: opening, unit detection, storey planning and filtering.

mod filter;
mod model;
mod units;

pub use filter::ClassFilter;
pub use model::{open_model, plan_storeys, LoadedModel, SUPPORTED_SCHEMAS};
pub use units::{length_unit_scale, resolve_unit_scale, scales, UnitScale, UnitSource};
