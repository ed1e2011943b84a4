//! Validation of run configuration and loaded models.

use crate::config::{float_cmp, FloorPlanConfig, MAX_WORKERS};
use crate::loader::{ClassFilter, LoadedModel};

/// Validation result with warnings.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Whether validation passed.
    pub passed: bool,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Error messages.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn ok() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    /// Create a failing result with an error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            errors: vec![message.into()],
            ..Default::default()
        }
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.passed = false;
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
        if !other.passed {
            self.passed = false;
        }
    }
}

/// `#rgb`, `#rrggbb` or a bare lowercase colour keyword.
pub fn is_valid_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !color.is_empty() && color.chars().all(|c| c.is_ascii_lowercase()),
    }
}

fn check_pattern(result: &mut ValidationResult, field: &str, pattern: &str) {
    if pattern.trim().is_empty() {
        result.add_error(format!("{}: pattern is empty", field));
    } else if pattern.contains('/') || pattern.contains('\\') {
        result.add_error(format!(
            "{}: pattern '{}' must not contain path separators",
            field, pattern
        ));
    } else if !pattern.contains("{index}") && !pattern.contains("{name}") {
        result.add_warning(format!(
            "{}: pattern '{}' has no {{index}} or {{name}} placeholder; storeys will overwrite each other",
            field, pattern
        ));
    }
}

/// Validate configuration ranges and consistency.
pub fn validate_config(config: &FloorPlanConfig) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if config.input.as_os_str().is_empty() {
        result.add_error("input: no model path given");
    }
    if config.output_dir.as_os_str().is_empty() {
        result.add_error("output_dir: no output directory given");
    }

    // Section
    let section = &config.section;
    if !section.default_cut_offset.is_finite() {
        result.add_error("section.default_cut_offset must be finite");
    }
    for (storey, offset) in &section.storey_offsets {
        if !offset.is_finite() {
            result.add_error(format!("section.storey_offsets.{} must be finite", storey));
        }
    }
    if !float_cmp::is_positive(section.tolerance) {
        result.add_error(format!(
            "section.tolerance must be > 0 (got {})",
            section.tolerance
        ));
    }
    if !float_cmp::is_positive(section.chaining_tolerance) {
        result.add_error(format!(
            "section.chaining_tolerance must be > 0 (got {})",
            section.chaining_tolerance
        ));
    } else if section.chaining_tolerance > 0.1 {
        result.add_warning(format!(
            "section.chaining_tolerance {} m is large; distinct outlines may merge",
            section.chaining_tolerance
        ));
    }

    // Filter
    let filter = ClassFilter::from_config(&config.filter);
    for class in filter.overlap() {
        result.add_warning(format!(
            "filter: {} is both included and excluded; exclude wins",
            class.ifc_name()
        ));
    }

    // Units
    if let Some(scale) = config.units.manual_scale {
        if !float_cmp::is_positive(scale) {
            result.add_error(format!("units.manual_scale must be > 0 (got {})", scale));
        }
    }

    // Rendering
    let rendering = &config.rendering;
    if !is_valid_color(&rendering.default_color) {
        result.add_error(format!(
            "rendering.default_color: invalid colour '{}'",
            rendering.default_color
        ));
    }
    if !float_cmp::is_positive(rendering.default_line_width) {
        result.add_error(format!(
            "rendering.default_line_width must be > 0 (got {})",
            rendering.default_line_width
        ));
    }
    if let Some(background) = &rendering.background {
        if !is_valid_color(background) {
            result.add_error(format!("rendering.background: invalid colour '{}'", background));
        }
    }
    if !(rendering.margin.is_finite() && rendering.margin >= 0.0) {
        result.add_error(format!(
            "rendering.margin must be >= 0 (got {})",
            rendering.margin
        ));
    }
    for (class, style) in &rendering.styles {
        if let Some(color) = &style.color {
            if !is_valid_color(color) {
                result.add_error(format!("rendering.styles.{}: invalid colour '{}'", class, color));
            }
        }
        if let Some(width) = style.line_width {
            if !float_cmp::is_positive(width) {
                result.add_error(format!(
                    "rendering.styles.{}: line_width must be > 0 (got {})",
                    class, width
                ));
            }
        }
    }

    // Output
    check_pattern(&mut result, "output.drawing_pattern", &config.output.drawing_pattern);
    if config.output.geometry_enabled {
        check_pattern(&mut result, "output.geometry_pattern", &config.output.geometry_pattern);
    }
    if config.output.manifest_name.trim().is_empty()
        || config.output.manifest_name.contains(['/', '\\'])
    {
        result.add_error(format!(
            "output.manifest_name: invalid file name '{}'",
            config.output.manifest_name
        ));
    }

    // Performance
    if config.performance.workers > MAX_WORKERS {
        result.add_error(format!(
            "performance.workers must be <= {} (got {})",
            MAX_WORKERS, config.performance.workers
        ));
    }
    if config.performance.timeout_secs == Some(0) {
        result.add_warning("performance.timeout_secs = 0: no storey will be processed");
    }

    result
}

/// Check a loaded model for problems that will degrade the plans.
pub fn validate_model(model: &LoadedModel) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let document = &model.document;

    if document.storeys.is_empty() {
        result.add_error("Model has no storeys");
    }
    for warning in &model.warnings {
        result.add_warning(warning.clone());
    }

    let mut uncontained = 0;
    for element in &document.elements {
        if element.items.is_empty() {
            result.add_warning(format!(
                "Element {} ({}) has no representation items",
                element.guid, element.class
            ));
        }
        if element.storey.is_none() {
            uncontained += 1;
        }
    }
    if uncontained > 0 {
        result.add_warning(format!(
            "{} element(s) are not contained in any storey",
            uncontained
        ));
    }

    for storey in &document.storeys {
        if !storey.elevation.is_finite() {
            result.add_error(format!("Storey {}: elevation is not finite", storey.id));
        }
        let contained = document
            .elements
            .iter()
            .filter(|e| e.storey.as_deref() == Some(storey.id.as_str()))
            .count();
        if contained == 0 {
            result.add_warning(format!("Storey {} ('{}') contains no elements", storey.id, storey.name));
        }
    }

    result
}
