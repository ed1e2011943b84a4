//! Resolved storeys and the elements offered to their cut.

use serde::{Deserialize, Serialize};

use super::{Element, ElementClass};

/// A storey with its cut elevation resolved for this run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingStorey {
    pub id: String,
    pub name: String,
    /// Position in elevation order, 0-based.
    pub index: usize,
    /// Base elevation (model units).
    pub elevation: f64,
    /// Offset above the base (model units).
    pub cut_offset: f64,
    /// `elevation + cut_offset` (model units).
    pub cut_elevation: f64,
}

impl BuildingStorey {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        index: usize,
        elevation: f64,
        cut_offset: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            index,
            elevation,
            cut_offset,
            cut_elevation: elevation + cut_offset,
        }
    }

    /// Name if present, otherwise the id.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// An element that survived class filtering.
#[derive(Debug, Clone)]
pub struct FilteredElement<'m> {
    pub element: &'m Element,
    pub class: ElementClass,
}

impl<'m> FilteredElement<'m> {
    pub fn guid(&self) -> &'m str {
        &self.element.guid
    }
}

/// One unit of sectioning work: a storey and its candidate elements.
#[derive(Debug, Clone)]
pub struct StoreyPlan<'m> {
    pub storey: BuildingStorey,
    pub elements: Vec<FilteredElement<'m>>,
}
