//! ifc-floorplan-rs - Floor plan generation from building models.
//!
//! This library cuts every storey of a building model with a horizontal
//! plane, chains the cut edges into 2D polylines and writes one SVG drawing
//! per storey, optional GeoJSON exports and a reproducibility manifest.
//!
//! # Example
//!
//! ```no_run
//! use ifc_floorplan_rs::{generate_floor_plans, FloorPlanConfig};
//!
//! let mut config = FloorPlanConfig::new("building.json", "plans");
//! config.performance.parallel = true;
//! let report = generate_floor_plans(config).unwrap();
//! for result in &report.results {
//!     println!("{}: {} polylines", result.storey.name, result.polylines.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod loader;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod section;
pub mod transform;
pub mod validation;

// Re-exports for convenience
pub use config::{FloorPlanConfig, SectionScope};
pub use error::{ErrorCode, Issue, PlanError, Result, Severity};
pub use geometry::{GeometryEngine, GeometryKernel, GeometrySettings, PolyhedralKernel};
pub use loader::{open_model, plan_storeys, resolve_unit_scale, UnitScale};
pub use manifest::{Manifest, StoreySummary};
pub use model::{BuildingStorey, ElementClass};
pub use pipeline::{validate_only, FloorPlanGenerator, RunReport};
pub use section::{Polyline2D, StoreyResult};
pub use validation::{validate_config, ValidationResult};

/// Generate the floor plans of one model.
///
/// Validates the configuration, then runs the full pipeline:
/// 1. Open the model and resolve storeys
/// 2. Build element shapes and cut each storey
/// 3. Chain, transform and render the polylines
/// 4. Write the manifest
pub fn generate_floor_plans(config: FloorPlanConfig) -> Result<RunReport> {
    FloorPlanGenerator::new(config)?.run()
}
