//! Length unit detection.
//!
//! Produces the factor that converts model lengths into meters.

use serde::{Deserialize, Serialize};

use crate::config::UnitsConfig;
use crate::model::{LengthUnit, ModelDocument};

/// Common unit scales to meters.
pub mod scales {
    pub const METRE: f64 = 1.0;
    pub const MILLIMETRE: f64 = 0.001;
    pub const CENTIMETRE: f64 = 0.01;
    pub const INCH: f64 = 0.0254;
    pub const FOOT: f64 = 0.3048;
    pub const YARD: f64 = 0.9144;
    pub const MILE: f64 = 1609.344;
}

/// Where the unit scale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSource {
    Manual,
    Detected,
    Default,
}

/// Resolved model-unit-to-meter factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitScale {
    pub factor: f64,
    pub source: UnitSource,
    /// Declared unit, e.g. `MILLIMETRE` or `FOOT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl UnitScale {
    pub fn identity() -> Self {
        Self {
            factor: 1.0,
            source: UnitSource::Default,
            unit: None,
        }
    }

    /// Convert a length in meters into model units.
    pub fn meters_to_model(&self, meters: f64) -> f64 {
        meters / self.factor
    }
}

fn prefix_scale(prefix: &str) -> Option<f64> {
    let scale = match prefix.trim().trim_matches('.').to_ascii_uppercase().as_str() {
        "EXA" => 1e18,
        "PETA" => 1e15,
        "TERA" => 1e12,
        "GIGA" => 1e9,
        "MEGA" => 1e6,
        "KILO" => 1e3,
        "HECTO" => 1e2,
        "DECA" => 1e1,
        "DECI" => 1e-1,
        "CENTI" => 1e-2,
        "MILLI" => 1e-3,
        "MICRO" => 1e-6,
        "NANO" => 1e-9,
        "PICO" => 1e-12,
        "FEMTO" => 1e-15,
        "ATTO" => 1e-18,
        _ => return None,
    };
    Some(scale)
}

/// Scale of a declared length unit, if recognised.
pub fn length_unit_scale(unit: &LengthUnit) -> Option<f64> {
    if let Some(factor) = unit.conversion_factor {
        return (factor.is_finite() && factor > 0.0).then_some(factor);
    }

    let name = unit.name.trim().trim_matches('.').to_ascii_uppercase();
    let base = match name.as_str() {
        "METRE" | "METER" => scales::METRE,
        "MILLIMETRE" | "MILLIMETER" => scales::MILLIMETRE,
        "CENTIMETRE" | "CENTIMETER" => scales::CENTIMETRE,
        "INCH" => scales::INCH,
        "FOOT" => scales::FOOT,
        "YARD" => scales::YARD,
        "MILE" => scales::MILE,
        _ => return None,
    };

    match unit.prefix.as_deref() {
        None | Some("") | Some("$") => Some(base),
        // Prefixes only apply to the SI base unit
        Some(prefix) if name == "METRE" || name == "METER" => {
            prefix_scale(prefix).map(|p| p * base)
        }
        Some(_) => None,
    }
}

fn unit_label(unit: &LengthUnit) -> String {
    let clean = |s: &str| s.trim().trim_matches('.').to_ascii_uppercase();
    match unit.prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() && prefix != "$" => {
            format!("{}{}", clean(prefix), clean(&unit.name))
        }
        _ => clean(&unit.name),
    }
}

/// Resolve the unit scale for a run.
///
/// A manual scale short-circuits detection. Returns a warning when detection
/// was requested but the model's unit could not be recognised.
pub fn resolve_unit_scale(
    document: &ModelDocument,
    config: &UnitsConfig,
) -> (UnitScale, Option<String>) {
    if let Some(factor) = config.manual_scale {
        return (
            UnitScale {
                factor,
                source: UnitSource::Manual,
                unit: None,
            },
            None,
        );
    }

    if !config.auto_detect {
        return (UnitScale::identity(), None);
    }

    let declared = document.units.as_ref().and_then(|u| u.length.as_ref());
    match declared {
        Some(unit) => match length_unit_scale(unit) {
            Some(factor) => (
                UnitScale {
                    factor,
                    source: UnitSource::Detected,
                    unit: Some(unit_label(unit)),
                },
                None,
            ),
            None => (
                UnitScale::identity(),
                Some(format!(
                    "Unrecognised length unit '{}', assuming meters",
                    unit_label(unit)
                )),
            ),
        },
        None => (
            UnitScale::identity(),
            Some("Model declares no length unit, assuming meters".to_string()),
        ),
    }
}
