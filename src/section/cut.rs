//! Storey cut: plane intersection plus chaining.

use std::sync::Arc;

use tracing::{debug, warn};

use super::chain::{chain_edges, chain_edges_per_element};
use super::{Bounds2D, Edge, Polyline2D};
use crate::config::SectionConfig;
use crate::error::Issue;
use crate::generator::OutputFile;
use crate::geometry::{GeometryEngine, SectionPlane, Shape};
use crate::loader::UnitScale;
use crate::model::{BuildingStorey, ElementClass};

/// Tolerances in model units plus chaining mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionOptions {
    /// Plane-side classification tolerance.
    pub tolerance: f64,
    /// Endpoint merge distance.
    pub chaining_tolerance: f64,
    pub per_element_chaining: bool,
}

impl SectionOptions {
    /// Convert the configured (meter) tolerances into model units.
    pub fn from_config(config: &SectionConfig, scale: &UnitScale) -> Self {
        Self {
            tolerance: scale.meters_to_model(config.tolerance),
            chaining_tolerance: scale.meters_to_model(config.chaining_tolerance),
            per_element_chaining: config.per_element_chaining,
        }
    }
}

/// An element offered to a cut with its shape, if one could be built.
#[derive(Debug, Clone)]
pub struct ShapeEntry {
    pub guid: String,
    pub class: ElementClass,
    pub shape: Option<Arc<Shape>>,
}

/// Outcome of processing one storey.
#[derive(Debug, Clone)]
pub struct StoreyResult {
    pub storey: BuildingStorey,
    pub polylines: Vec<Polyline2D>,
    /// Edges collected before chaining.
    pub edge_count: usize,
    /// Elements offered to the cut.
    pub element_count: usize,
    pub issues: Vec<Issue>,
    pub outputs: Vec<OutputFile>,
    /// Bounds of the polylines in output coordinates.
    pub bounds: Option<Bounds2D>,
    /// True when the storey was never started.
    pub skipped: bool,
}

impl StoreyResult {
    pub fn new(storey: BuildingStorey) -> Self {
        Self {
            storey,
            polylines: Vec::new(),
            edge_count: 0,
            element_count: 0,
            issues: Vec::new(),
            outputs: Vec::new(),
            bounds: None,
            skipped: false,
        }
    }

    /// Placeholder for a storey not started before the run deadline.
    pub fn timed_out(storey: BuildingStorey) -> Self {
        let issue = Issue::timed_out(&storey.id);
        let mut result = Self::new(storey);
        result.issues.push(issue);
        result.skipped = true;
        result
    }

    pub fn closed_count(&self) -> usize {
        self.polylines.iter().filter(|p| p.closed).count()
    }

    /// Recompute `bounds` from the current polylines.
    pub fn update_bounds(&mut self) {
        self.bounds = Bounds2D::of_polylines(&self.polylines).non_empty();
    }
}

/// Cut every shape with the storey's horizontal plane and chain the edges.
pub fn cut(
    storey: &BuildingStorey,
    shapes: &[ShapeEntry],
    engine: &GeometryEngine,
    options: &SectionOptions,
) -> StoreyResult {
    let plane = SectionPlane::horizontal(storey.cut_elevation, options.tolerance);
    let mut result = StoreyResult::new(storey.clone());
    result.element_count = shapes.len();

    let mut edges: Vec<Edge> = Vec::new();
    for entry in shapes {
        let Some(shape) = &entry.shape else {
            continue;
        };
        match engine.section(shape, &plane) {
            Ok(segments) => edges.extend(
                segments
                    .into_iter()
                    .map(|s| Edge::new(s, entry.class.clone(), entry.guid.as_str())),
            ),
            Err(issue) => {
                warn!("{} (storey {})", issue, storey.id);
                result.issues.push(issue.with_storey(storey.id.as_str()));
            }
        }
    }
    result.edge_count = edges.len();

    if edges.is_empty() {
        warn!(
            "Storey {} has no geometry at cut elevation {:.3}",
            storey.display_name(),
            storey.cut_elevation
        );
        result
            .issues
            .push(Issue::empty_cut(&storey.id, storey.cut_elevation));
        return result;
    }

    result.polylines = if options.per_element_chaining {
        chain_edges_per_element(&edges, options.chaining_tolerance)
    } else {
        chain_edges(&edges, options.chaining_tolerance)
    };
    debug!(
        "Storey {}: {} edges -> {} polylines ({} closed)",
        storey.display_name(),
        result.edge_count,
        result.polylines.len(),
        result.closed_count()
    );
    result
}
