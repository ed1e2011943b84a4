//! Opening building models and planning per-storey work.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::filter::ClassFilter;
use super::units::UnitScale;
use crate::config::{FloorPlanConfig, SectionScope};
use crate::error::{PlanError, Result};
use crate::model::{BuildingStorey, FilteredElement, ModelDocument, StoreyPlan};

/// Schemas the loader accepts.
pub const SUPPORTED_SCHEMAS: &[&str] = &["IFC2X3", "IFC4", "IFC4X1", "IFC4X3"];

/// A model that has been read and sanity-checked.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub path: PathBuf,
    pub document: ModelDocument,
    /// Non-fatal problems found while loading.
    pub warnings: Vec<String>,
}

/// Open and validate a building model file.
///
/// Fails with [`PlanError::ModelOpenFailed`] when the file is unreadable, not a
/// model document, or declares an unsupported schema.
pub fn open_model(path: &Path) -> Result<LoadedModel> {
    let open_failed = |reason: String| PlanError::ModelOpenFailed {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| open_failed(e.to_string()))?;
    if content.trim().is_empty() {
        return Err(open_failed("file is empty".to_string()));
    }

    let mut document: ModelDocument = serde_json::from_str(&content)
        .map_err(|e| open_failed(format!("invalid model document: {}", e)))?;

    let schema = document.schema.trim().to_ascii_uppercase();
    if !SUPPORTED_SCHEMAS.contains(&schema.as_str()) {
        return Err(open_failed(format!(
            "unsupported schema '{}'",
            document.schema
        )));
    }
    document.schema = schema;

    let warnings = sanitize_document(&mut document);
    for warning in &warnings {
        warn!("{}", warning);
    }

    info!(
        "Opened {} model '{}': {} storey(s), {} element(s)",
        document.schema,
        document.name,
        document.storeys.len(),
        document.elements.len()
    );

    Ok(LoadedModel {
        path: path.to_path_buf(),
        document,
        warnings,
    })
}

/// Drop elements without identity or with duplicate GUIDs and clear dangling
/// storey references.
fn sanitize_document(document: &mut ModelDocument) -> Vec<String> {
    let mut warnings = Vec::new();
    let storey_ids: HashSet<String> = document.storeys.iter().map(|s| s.id.clone()).collect();
    let mut seen: HashSet<String> = HashSet::new();

    document.elements.retain_mut(|element| {
        if element.guid.trim().is_empty() {
            warnings.push(format!(
                "Element '{}' ({}) has no GUID and was skipped",
                element.name, element.class
            ));
            return false;
        }
        if !seen.insert(element.guid.clone()) {
            warnings.push(format!(
                "Duplicate element GUID {}; keeping the first occurrence",
                element.guid
            ));
            return false;
        }
        if let Some(storey) = &element.storey {
            if !storey_ids.contains(storey) {
                warnings.push(format!(
                    "Element {} references unknown storey '{}'",
                    element.guid, storey
                ));
                element.storey = None;
            }
        }
        true
    });

    warnings
}

/// Resolve storeys and their candidate elements.
///
/// Storeys are ordered by base elevation (ties keep model order). Cut offsets
/// from the configuration are meters and are converted with `scale`.
pub fn plan_storeys<'m>(
    model: &'m LoadedModel,
    config: &FloorPlanConfig,
    scale: &UnitScale,
) -> Result<Vec<StoreyPlan<'m>>> {
    let document = &model.document;
    if document.storeys.is_empty() {
        return Err(PlanError::NoStoreysFound {
            path: model.path.clone(),
        });
    }

    let mut order: Vec<usize> = (0..document.storeys.len()).collect();
    order.sort_by(|&a, &b| {
        document.storeys[a]
            .elevation
            .total_cmp(&document.storeys[b].elevation)
    });

    let filter = ClassFilter::from_config(&config.filter);
    let filtered: Vec<FilteredElement<'m>> = document
        .elements
        .iter()
        .filter_map(|element| {
            let class = element.class_tag();
            filter
                .accepts(&class)
                .then_some(FilteredElement { element, class })
        })
        .collect();

    debug!(
        "{} of {} element(s) passed the class filter",
        filtered.len(),
        document.elements.len()
    );

    let plans = order
        .into_iter()
        .enumerate()
        .map(|(index, record_idx)| {
            let record = &document.storeys[record_idx];
            let offset_m = config.cut_offset_for(&record.name, &record.id);
            let storey = BuildingStorey::new(
                record.id.clone(),
                record.name.clone(),
                index,
                record.elevation,
                scale.meters_to_model(offset_m),
            );

            let elements: Vec<FilteredElement<'m>> = match config.section.scope {
                SectionScope::Storey => filtered
                    .iter()
                    .filter(|f| f.element.storey.as_deref() == Some(record.id.as_str()))
                    .cloned()
                    .collect(),
                SectionScope::Model => filtered.clone(),
            };

            debug!(
                "Storey {} '{}': cut at {:.3}, {} candidate element(s)",
                index,
                storey.display_name(),
                storey.cut_elevation,
                elements.len()
            );

            StoreyPlan { storey, elements }
        })
        .collect();

    Ok(plans)
}
