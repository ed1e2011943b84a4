//! Configuration and model validation.

mod validate;

pub use validate::*;
