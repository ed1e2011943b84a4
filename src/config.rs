//! Configuration constants and settings for floor plan generation.
//!
//! All lengths in the configuration are meters. They are converted into model
//! units with the resolved unit scale before sectioning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{PlanError, Result};

/// Default cut height above the storey base (m).
pub const DEFAULT_CUT_OFFSET_M: f64 = 1.2;

/// Default tolerance for classifying vertices against the section plane (m).
pub const DEFAULT_SECTION_TOLERANCE_M: f64 = 1e-6;

/// Default endpoint tolerance for chaining edges into polylines (m).
pub const DEFAULT_CHAINING_TOLERANCE_M: f64 = 1e-3;

/// Default stroke colour.
pub const DEFAULT_COLOR: &str = "#000000";

/// Default stroke width (px, non-scaling).
pub const DEFAULT_LINE_WIDTH: f64 = 1.0;

/// Default drawing file pattern.
pub const DEFAULT_DRAWING_PATTERN: &str = "{index}_{name}.svg";

/// Default geometry file pattern.
pub const DEFAULT_GEOMETRY_PATTERN: &str = "{index}_{name}.geojson";

/// Default manifest file name.
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.json";

/// Default worker count for parallel runs.
pub const DEFAULT_WORKERS: usize = 4;

/// Upper bound accepted for the worker count.
pub const MAX_WORKERS: usize = 256;

/// Which elements are offered to a storey's section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionScope {
    /// Elements contained in the storey.
    #[default]
    Storey,
    /// Every filtered element of the model.
    Model,
}

/// Cut elevation and chaining settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionConfig {
    /// Height of the cut plane above each storey base (m).
    pub default_cut_offset: f64,
    /// Per-storey offsets keyed by storey name (or id) (m).
    pub storey_offsets: BTreeMap<String, f64>,
    /// Plane classification tolerance (m).
    pub tolerance: f64,
    /// Endpoint merge tolerance for chaining (m).
    pub chaining_tolerance: f64,
    /// Chain each element's edges separately.
    pub per_element_chaining: bool,
    pub scope: SectionScope,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            default_cut_offset: DEFAULT_CUT_OFFSET_M,
            storey_offsets: BTreeMap::new(),
            tolerance: DEFAULT_SECTION_TOLERANCE_M,
            chaining_tolerance: DEFAULT_CHAINING_TOLERANCE_M,
            per_element_chaining: false,
            scope: SectionScope::Storey,
        }
    }
}

/// Element class filter. Class names are IFC entity names, e.g. `IfcWall`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Classes to keep. Empty keeps every structurally relevant class.
    pub include: Vec<String>,
    /// Classes to drop. Wins over `include`.
    pub exclude: Vec<String>,
}

/// Unit handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitsConfig {
    pub auto_detect: bool,
    /// Model-unit-to-meter factor. Skips detection when set.
    pub manual_scale: Option<f64>,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            auto_detect: true,
            manual_scale: None,
        }
    }
}

/// Shape construction flags passed to the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    pub world_coordinates: bool,
    pub subtract_openings: bool,
    pub sew_shells: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            world_coordinates: true,
            subtract_openings: true,
            sew_shells: false,
        }
    }
}

/// Per-class style override. Missing fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleOverride {
    pub color: Option<String>,
    pub line_width: Option<f64>,
}

/// Drawing options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderingConfig {
    pub default_color: String,
    pub default_line_width: f64,
    /// Overrides keyed by IFC class name.
    pub styles: BTreeMap<String, StyleOverride>,
    pub background: Option<String>,
    /// Negate Y so plans read top-down in screen coordinates.
    pub invert_y: bool,
    /// Viewport margin as a fraction of the larger extent.
    pub margin: f64,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_COLOR.to_string(),
            default_line_width: DEFAULT_LINE_WIDTH,
            styles: BTreeMap::new(),
            background: None,
            invert_y: true,
            margin: 0.05,
        }
    }
}

/// Output naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub drawing_pattern: String,
    pub geometry_pattern: String,
    pub manifest_name: String,
    /// Write GeoJSON files next to the drawings.
    pub geometry_enabled: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            drawing_pattern: DEFAULT_DRAWING_PATTERN.to_string(),
            geometry_pattern: DEFAULT_GEOMETRY_PATTERN.to_string(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            geometry_enabled: false,
        }
    }
}

/// Scheduling options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceConfig {
    pub parallel: bool,
    /// Worker threads; 0 lets rayon pick.
    pub workers: usize,
    pub cache_enabled: bool,
    /// Stop starting new storeys after this many seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            workers: DEFAULT_WORKERS,
            cache_enabled: true,
            timeout_secs: None,
        }
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FloorPlanConfig {
    #[serde(default)]
    pub input: PathBuf,
    #[serde(default)]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub section: SectionConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub units: UnitsConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub rendering: RenderingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl FloorPlanConfig {
    /// Create a configuration with defaults for everything but the paths.
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            section: SectionConfig::default(),
            filter: FilterConfig::default(),
            units: UnitsConfig::default(),
            geometry: GeometryConfig::default(),
            rendering: RenderingConfig::default(),
            output: OutputConfig::default(),
            performance: PerformanceConfig::default(),
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PlanError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Load a configuration file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PlanError::InvalidConfig {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate and return the configuration, logging warnings.
    pub fn validated(self) -> Result<Self> {
        let result = crate::validation::validate_config(&self);
        for warning in &result.warnings {
            tracing::warn!("{}", warning);
        }
        if !result.passed {
            return Err(PlanError::InvalidConfig {
                message: result.errors.join("; "),
            });
        }
        Ok(self)
    }

    /// Cut offset for a storey: override by name, then by id, else the default.
    pub fn cut_offset_for(&self, name: &str, id: &str) -> f64 {
        self.section
            .storey_offsets
            .get(name)
            .or_else(|| self.section.storey_offsets.get(id))
            .copied()
            .unwrap_or(self.section.default_cut_offset)
    }
}

/// Utility functions for floating-point comparisons.
pub mod float_cmp {
    /// Check if two floats are equal within `tol`.
    #[inline]
    pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    /// Check that a value is finite and strictly positive.
    #[inline]
    pub fn is_positive(a: f64) -> bool {
        a.is_finite() && a > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FloorPlanConfig::new("model.json", "out");
        assert_eq!(config.section.default_cut_offset, DEFAULT_CUT_OFFSET_M);
        assert!(config.geometry.world_coordinates);
        assert!(config.geometry.subtract_openings);
        assert!(!config.geometry.sew_shells);
        assert!(config.rendering.invert_y);
        assert!(!config.performance.parallel);
        assert!(config.performance.cache_enabled);
    }

    #[test]
    fn test_from_toml_minimal() {
        let config = FloorPlanConfig::from_toml_str(
            r#"
            input = "model.json"
            output_dir = "plans"
            "#,
        )
        .expect("minimal config should parse");
        assert_eq!(config.input, PathBuf::from("model.json"));
        assert_eq!(config.output.manifest_name, DEFAULT_MANIFEST_NAME);
    }

    #[test]
    fn test_from_toml_full() {
        let config = FloorPlanConfig::from_toml_str(
            r##"
            input = "model.json"
            output_dir = "plans"

            [section]
            default_cut_offset = 1.0
            chaining_tolerance = 0.01
            scope = "model"

            [section.storey_offsets]
            "Ground Floor" = 1.5

            [filter]
            include = ["IfcWall", "IfcSlab"]
            exclude = ["IfcSlab"]

            [units]
            manual_scale = 0.001

            [rendering.styles.IfcWall]
            color = "#ff0000"
            line_width = 2.0

            [performance]
            parallel = true
            workers = 8
            "##,
        )
        .expect("full config should parse");
        assert_eq!(config.section.scope, SectionScope::Model);
        assert_eq!(config.cut_offset_for("Ground Floor", "S1"), 1.5);
        assert_eq!(config.cut_offset_for("Level 1", "S2"), 1.0);
        assert_eq!(config.units.manual_scale, Some(0.001));
        assert_eq!(
            config.rendering.styles["IfcWall"].color.as_deref(),
            Some("#ff0000")
        );
        assert_eq!(config.performance.workers, 8);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = FloorPlanConfig::from_toml_str(
            r#"
            input = "model.json"
            output_dir = "plans"
            [section]
            cut_height = 1.0
            "#,
        );
        assert!(matches!(result, Err(PlanError::InvalidConfig { .. })));
    }

    #[test]
    fn test_offset_lookup_by_id() {
        let mut config = FloorPlanConfig::new("m.json", "out");
        config.section.storey_offsets.insert("S2".to_string(), 0.8);
        assert_eq!(config.cut_offset_for("Level 2", "S2"), 0.8);
    }
}
