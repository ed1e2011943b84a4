//! Line styles per element class.

use std::collections::BTreeMap;

use crate::config::RenderingConfig;
use crate::model::ElementClass;

/// Stroke of one polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
}

/// Class to style map with a single default.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    default: LineStyle,
    by_class: BTreeMap<ElementClass, LineStyle>,
}

impl StyleSheet {
    pub fn new(default: LineStyle) -> Self {
        Self {
            default,
            by_class: BTreeMap::new(),
        }
    }

    /// Styles from the rendering options. Override keys are IFC class names
    /// and missing override fields fall back to the defaults.
    pub fn from_config(config: &RenderingConfig) -> Self {
        let mut sheet = Self::new(LineStyle {
            color: config.default_color.clone(),
            width: config.default_line_width,
        });
        for (class_name, style) in &config.styles {
            sheet.by_class.insert(
                ElementClass::from_ifc_name(class_name),
                LineStyle {
                    color: style
                        .color
                        .clone()
                        .unwrap_or_else(|| config.default_color.clone()),
                    width: style.line_width.unwrap_or(config.default_line_width),
                },
            );
        }
        sheet
    }

    pub fn with_style(mut self, class: ElementClass, style: LineStyle) -> Self {
        self.by_class.insert(class, style);
        self
    }

    pub fn default_style(&self) -> &LineStyle {
        &self.default
    }

    pub fn resolve(&self, class: &ElementClass) -> &LineStyle {
        self.by_class.get(class).unwrap_or(&self.default)
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::from_config(&RenderingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleOverride;

    #[test]
    fn test_override_and_fallback() {
        let mut config = RenderingConfig::default();
        config.styles.insert(
            "IfcWall".to_string(),
            StyleOverride {
                color: Some("#ff0000".to_string()),
                line_width: None,
            },
        );
        let sheet = StyleSheet::from_config(&config);

        let wall = sheet.resolve(&ElementClass::Wall);
        assert_eq!(wall.color, "#ff0000");
        assert_eq!(wall.width, config.default_line_width);

        let slab = sheet.resolve(&ElementClass::Slab);
        assert_eq!(slab, sheet.default_style());
    }

    #[test]
    fn test_override_key_case_insensitive() {
        let mut config = RenderingConfig::default();
        config.styles.insert(
            "IFCCOLUMN".to_string(),
            StyleOverride {
                color: None,
                line_width: Some(2.5),
            },
        );
        let sheet = StyleSheet::from_config(&config);
        assert_eq!(sheet.resolve(&ElementClass::Column).width, 2.5);
    }
}
