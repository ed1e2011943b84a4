//! Run manifest: the reproducibility record written once per run.
//!
//! The manifest carries no timestamps, so two identical runs produce
//! byte-identical files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::FloorPlanConfig;
use crate::error::{Issue, Severity};
use crate::generator::{OutputFile, OutputStatus};
use crate::loader::{LoadedModel, UnitScale};
use crate::section::{Bounds2D, StoreyResult};

/// Per-storey record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreySummary {
    pub id: String,
    pub name: String,
    pub index: usize,
    /// Base elevation (model units).
    pub elevation: f64,
    /// Cut elevation (model units).
    pub cut_elevation: f64,
    /// Cut elevation in meters.
    pub cut_elevation_m: f64,
    pub polylines: usize,
    pub closed_polylines: usize,
    pub elements: usize,
    pub edges: usize,
    pub outputs: Vec<OutputFile>,
    pub bounds: Option<Bounds2D>,
    pub issues: Vec<Issue>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl StoreySummary {
    pub fn from_result(result: &StoreyResult, scale: &UnitScale) -> Self {
        let storey = &result.storey;
        Self {
            id: storey.id.clone(),
            name: storey.name.clone(),
            index: storey.index,
            elevation: storey.elevation,
            cut_elevation: storey.cut_elevation,
            cut_elevation_m: storey.cut_elevation * scale.factor,
            polylines: result.polylines.len(),
            closed_polylines: result.closed_count(),
            elements: result.element_count,
            edges: result.edge_count,
            outputs: result.outputs.clone(),
            bounds: result.bounds,
            issues: result.issues.clone(),
            skipped: result.skipped,
        }
    }
}

/// Run-wide counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub storeys: usize,
    pub polylines: usize,
    pub closed_polylines: usize,
    pub files_written: usize,
    pub files_failed: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub tool: String,
    pub version: String,
    pub input: PathBuf,
    pub schema: String,
    pub project: String,
    pub kernel: String,
    pub unit_scale: UnitScale,
    pub model_warnings: Vec<String>,
    pub storeys: Vec<StoreySummary>,
    /// Union of all storey bounds (output coordinates).
    pub bounds: Option<Bounds2D>,
    pub totals: Totals,
    pub config: FloorPlanConfig,
}

impl Manifest {
    /// Assemble the manifest. `results` must already be in storey order.
    pub fn build(
        model: &LoadedModel,
        scale: &UnitScale,
        results: &[StoreyResult],
        config: &FloorPlanConfig,
        kernel: &str,
    ) -> Self {
        let storeys: Vec<StoreySummary> = results
            .iter()
            .map(|r| StoreySummary::from_result(r, scale))
            .collect();

        let mut bounds = Bounds2D::empty();
        let mut totals = Totals {
            storeys: storeys.len(),
            ..Totals::default()
        };
        for summary in &storeys {
            if let Some(b) = &summary.bounds {
                bounds.merge(b);
            }
            totals.polylines += summary.polylines;
            totals.closed_polylines += summary.closed_polylines;
            for output in &summary.outputs {
                match output.status {
                    OutputStatus::Written => totals.files_written += 1,
                    OutputStatus::Failed => totals.files_failed += 1,
                }
            }
            for issue in &summary.issues {
                match issue.severity {
                    Severity::Error => totals.errors += 1,
                    Severity::Warning => totals.warnings += 1,
                }
            }
        }

        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            input: model.path.clone(),
            schema: model.document.schema.clone(),
            project: model.document.name.clone(),
            kernel: kernel.to_string(),
            unit_scale: scale.clone(),
            model_warnings: model.warnings.clone(),
            storeys,
            bounds: bounds.non_empty(),
            totals,
            config: config.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Write the manifest into `dir`. Failures are reported as a `WriteFailed`
/// issue; they never invalidate the storey outputs already written.
pub fn write_manifest(manifest: &Manifest, dir: &Path, name: &str) -> std::result::Result<PathBuf, Issue> {
    let path = dir.join(name);
    let json = manifest
        .to_json()
        .map_err(|e| Issue::write_failed(&path, e))?;
    match std::fs::write(&path, json) {
        Ok(()) => {
            info!("Manifest written to {}", path.display());
            Ok(path)
        }
        Err(e) => {
            error!("Failed to write manifest {}: {}", path.display(), e);
            Err(Issue::write_failed(path, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::OutputKind;
    use crate::model::{BuildingStorey, ModelDocument};
    use crate::section::{ElementRef, Polyline2D};
    use nalgebra::Point2;

    fn model() -> LoadedModel {
        LoadedModel {
            path: PathBuf::from("model.json"),
            document: ModelDocument {
                schema: "IFC4".to_string(),
                name: "Test".to_string(),
                ..Default::default()
            },
            warnings: vec!["Duplicate element GUID x".to_string()],
        }
    }

    fn result(index: usize, x: f64) -> StoreyResult {
        let mut result = StoreyResult::new(BuildingStorey::new(
            format!("S{}", index),
            format!("Level {}", index),
            index,
            3.0 * index as f64,
            1.2,
        ));
        result.polylines.push(Polyline2D::new(
            vec![Point2::new(x, 0.0), Point2::new(x + 1.0, 0.0), Point2::new(x, 1.0)],
            true,
            vec![ElementRef {
                guid: "w".to_string(),
                class: crate::model::ElementClass::Wall,
            }],
        ));
        result.update_bounds();
        result.outputs.push(OutputFile {
            kind: OutputKind::Drawing,
            file: format!("{:02}.svg", index),
            status: OutputStatus::Written,
        });
        result
    }

    #[test]
    fn test_totals_and_bounds() {
        let mut second = result(1, 5.0);
        second.issues.push(Issue::empty_cut("S1", 4.2));
        let config = FloorPlanConfig::new("model.json", "out");
        let manifest = Manifest::build(
            &model(),
            &UnitScale::identity(),
            &[result(0, 0.0), second],
            &config,
            "polyhedral",
        );

        assert_eq!(manifest.totals.storeys, 2);
        assert_eq!(manifest.totals.polylines, 2);
        assert_eq!(manifest.totals.closed_polylines, 2);
        assert_eq!(manifest.totals.files_written, 2);
        assert_eq!(manifest.totals.warnings, 1);
        assert_eq!(manifest.totals.errors, 0);
        let bounds = manifest.bounds.unwrap();
        assert_eq!((bounds.min_x, bounds.max_x), (0.0, 6.0));
        assert_eq!(manifest.model_warnings.len(), 1);
        assert!((manifest.storeys[1].cut_elevation_m - 4.2).abs() < 1e-12);
    }

    #[test]
    fn test_manifest_is_deterministic() {
        let config = FloorPlanConfig::new("model.json", "out");
        let build = || {
            Manifest::build(&model(), &UnitScale::identity(), &[result(0, 0.0)], &config, "polyhedral")
                .to_json()
                .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_write_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = FloorPlanConfig::new("model.json", dir.path());
        let manifest = Manifest::build(&model(), &UnitScale::identity(), &[], &config, "polyhedral");
        let path = write_manifest(&manifest, dir.path(), "manifest.json").unwrap();

        let parsed: Manifest =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, manifest);
        assert!(parsed.bounds.is_none());
    }

    #[test]
    fn test_write_manifest_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = FloorPlanConfig::new("model.json", dir.path());
        let manifest = Manifest::build(&model(), &UnitScale::identity(), &[], &config, "polyhedral");
        let issue = write_manifest(&manifest, &dir.path().join("nope"), "manifest.json").unwrap_err();
        assert_eq!(issue.code, crate::error::ErrorCode::WriteFailed);
    }
}
