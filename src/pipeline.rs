//! Run orchestration.
//!
//! One unit of work per storey: shapes, cut, transform, render. Units run
//! either sequentially or on a rayon pool; the shape cache inside the
//! geometry engine is the only state they share. Results are put back in
//! storey order before the manifest is assembled.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::config::{FloorPlanConfig, OutputConfig};
use crate::error::{Issue, PlanError, Result};
use crate::generator::{
    expand_pattern, render_geojson, render_svg, write_output, OutputKind, StyleSheet, SvgOptions,
};
use crate::geometry::{GeometryEngine, GeometryKernel, GeometrySettings, PolyhedralKernel};
use crate::loader::{open_model, plan_storeys, resolve_unit_scale, LoadedModel, UnitScale};
use crate::manifest::{write_manifest, Manifest};
use crate::model::StoreyPlan;
use crate::section::{cut, SectionOptions, ShapeEntry, StoreyResult};
use crate::transform::CoordinateTransform;
use crate::validation::{validate_config, validate_model, ValidationResult};

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub manifest: Manifest,
    /// Where the manifest was written, if it could be.
    pub manifest_path: Option<PathBuf>,
    /// Manifest write failure, if any.
    pub manifest_issue: Option<Issue>,
    /// Per-storey results in storey order.
    pub results: Vec<StoreyResult>,
}

impl RunReport {
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.results
            .iter()
            .flat_map(|r| r.issues.iter())
            .chain(self.manifest_issue.iter())
    }

    pub fn has_errors(&self) -> bool {
        self.issues().any(Issue::is_error)
    }
}

/// Everything a storey unit needs, shared read-only across workers.
struct StoreyContext<'a> {
    engine: &'a GeometryEngine,
    options: SectionOptions,
    transform: CoordinateTransform,
    styles: StyleSheet,
    svg: SvgOptions,
    output: &'a OutputConfig,
    output_dir: &'a Path,
}

impl StoreyContext<'_> {
    fn process(&self, plan: &StoreyPlan<'_>) -> StoreyResult {
        let storey = &plan.storey;
        let mut shape_issues = Vec::new();
        let entries: Vec<ShapeEntry> = plan
            .elements
            .iter()
            .map(|element| {
                let shape = match self.engine.get_shape(element) {
                    Ok(shape) => Some(shape),
                    Err(issue) => {
                        shape_issues.push(issue.with_storey(storey.id.as_str()));
                        None
                    }
                };
                ShapeEntry {
                    guid: element.guid().to_string(),
                    class: element.class.clone(),
                    shape,
                }
            })
            .collect();

        let mut result = cut(storey, &entries, self.engine, &self.options);
        shape_issues.append(&mut result.issues);
        result.issues = shape_issues;

        result.polylines = self.transform.apply(&result.polylines);
        result.update_bounds();

        self.render(&mut result);
        info!(
            "Storey {} '{}': {} polyline(s), {} issue(s)",
            storey.index,
            storey.display_name(),
            result.polylines.len(),
            result.issues.len()
        );
        result
    }

    fn render(&self, result: &mut StoreyResult) {
        let storey = &result.storey;

        let svg = render_svg(storey, &result.polylines, &self.styles, &self.svg);
        let file = expand_pattern(&self.output.drawing_pattern, storey);
        let (output, issue) = write_output(self.output_dir, &file, OutputKind::Drawing, &svg);
        result.outputs.push(output);
        let mut issues: Vec<Issue> = issue.into_iter().collect();

        if self.output.geometry_enabled {
            let file = expand_pattern(&self.output.geometry_pattern, storey);
            match render_geojson(storey, &result.polylines) {
                Ok(json) => {
                    let (output, issue) =
                        write_output(self.output_dir, &file, OutputKind::Geometry, &json);
                    result.outputs.push(output);
                    issues.extend(issue);
                }
                Err(e) => issues.push(Issue::write_failed(self.output_dir.join(&file), e)),
            }
        }

        let storey_id = result.storey.id.clone();
        result
            .issues
            .extend(issues.into_iter().map(|i| i.with_storey(storey_id.as_str())));
    }
}

/// Floor plan generator for one configuration.
pub struct FloorPlanGenerator {
    config: FloorPlanConfig,
    kernel: Arc<dyn GeometryKernel>,
}

impl FloorPlanGenerator {
    /// Validate the configuration and create a generator over the built-in
    /// polyhedral kernel.
    pub fn new(config: FloorPlanConfig) -> Result<Self> {
        Ok(Self {
            config: config.validated()?,
            kernel: Arc::new(PolyhedralKernel::new()),
        })
    }

    /// Use another shape kernel.
    pub fn with_kernel(mut self, kernel: Arc<dyn GeometryKernel>) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn config(&self) -> &FloorPlanConfig {
        &self.config
    }

    /// Run the whole pipeline.
    ///
    /// Fatal errors (model open, no storeys, output directory) are returned
    /// before anything is written. Everything else is recorded per storey.
    pub fn run(&self) -> Result<RunReport> {
        let config = &self.config;
        info!("Opening model {}", config.input.display());
        let mut model = open_model(&config.input)?;

        let (scale, unit_warning) = resolve_unit_scale(&model.document, &config.units);
        if let Some(warning) = unit_warning {
            warn!("{}", warning);
            model.warnings.push(warning);
        }
        info!(
            "Unit scale {} ({:?}{})",
            scale.factor,
            scale.source,
            scale
                .unit
                .as_deref()
                .map(|u| format!(", {}", u))
                .unwrap_or_default()
        );

        let plans = plan_storeys(&model, config, &scale)?;

        std::fs::create_dir_all(&config.output_dir).map_err(|source| PlanError::WriteFailed {
            path: config.output_dir.clone(),
            source,
        })?;

        let settings = GeometrySettings::from_config(
            &config.geometry,
            scale.meters_to_model(config.section.tolerance),
        );
        let engine = GeometryEngine::new(
            Arc::clone(&self.kernel),
            settings,
            config.performance.cache_enabled,
        );
        let context = StoreyContext {
            engine: &engine,
            options: SectionOptions::from_config(&config.section, &scale),
            transform: CoordinateTransform::new(scale.factor, config.rendering.invert_y),
            styles: StyleSheet::from_config(&config.rendering),
            svg: SvgOptions {
                background: config.rendering.background.clone(),
                margin: config.rendering.margin,
            },
            output: &config.output,
            output_dir: &config.output_dir,
        };

        let deadline = config
            .performance
            .timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let unit = |plan: &StoreyPlan<'_>| {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!("Timeout reached; skipping storey {}", plan.storey.display_name());
                return StoreyResult::timed_out(plan.storey.clone());
            }
            context.process(plan)
        };

        let mut results = if config.performance.parallel {
            run_parallel(&plans, config.performance.workers, unit)
        } else {
            plans.iter().map(unit).collect()
        };
        results.sort_by_key(|r| r.storey.index);

        debug!("{} shape(s) cached", engine.cached_shapes());
        self.finish(&model, &scale, results, engine.kernel_name())
    }

    fn finish(
        &self,
        model: &LoadedModel,
        scale: &UnitScale,
        results: Vec<StoreyResult>,
        kernel: &str,
    ) -> Result<RunReport> {
        let config = &self.config;
        let manifest = Manifest::build(model, scale, &results, config, kernel);
        let (manifest_path, manifest_issue) =
            match write_manifest(&manifest, &config.output_dir, &config.output.manifest_name) {
                Ok(path) => (Some(path), None),
                Err(issue) => (None, Some(issue)),
            };

        let totals = &manifest.totals;
        info!(
            "Done: {} storey(s), {} polyline(s), {} file(s) written, {} error(s), {} warning(s)",
            totals.storeys, totals.polylines, totals.files_written, totals.errors, totals.warnings
        );

        Ok(RunReport {
            manifest,
            manifest_path,
            manifest_issue,
            results,
        })
    }
}

fn run_parallel<'m, F>(plans: &[StoreyPlan<'m>], workers: usize, unit: F) -> Vec<StoreyResult>
where
    F: Fn(&StoreyPlan<'m>) -> StoreyResult + Sync,
{
    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => {
            debug!("Processing {} storey(s) on {} worker(s)", plans.len(), pool.current_num_threads());
            pool.install(|| plans.par_iter().map(&unit).collect())
        }
        Err(e) => {
            error!("Failed to build worker pool ({}); running sequentially", e);
            plans.iter().map(unit).collect()
        }
    }
}

/// Check configuration and model without writing anything.
pub fn validate_only(config: &FloorPlanConfig) -> Result<ValidationResult> {
    let mut result = validate_config(config);
    if !result.passed {
        return Ok(result);
    }

    let model = open_model(&config.input)?;
    result.merge(validate_model(&model));

    let (scale, unit_warning) = resolve_unit_scale(&model.document, &config.units);
    if let Some(warning) = unit_warning {
        result.add_warning(warning);
    }
    let plans = plan_storeys(&model, config, &scale)?;
    for plan in &plans {
        if plan.elements.is_empty() {
            result.add_warning(format!(
                "Storey {} '{}': no elements pass the class filter",
                plan.storey.index,
                plan.storey.display_name()
            ));
        }
    }
    Ok(result)
}
