//! Building model document as read from disk.

use nalgebra::{Isometry3, Vector3};
use serde::{Deserialize, Serialize};

use super::ElementClass;

/// Top-level model document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Schema identifier (`IFC2X3`, `IFC4`, ...).
    pub schema: String,
    /// Project name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub units: Option<UnitAssignment>,
    #[serde(default)]
    pub storeys: Vec<StoreyRecord>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Unit assignment of the project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitAssignment {
    #[serde(default)]
    pub length: Option<LengthUnit>,
}

/// Declared length unit.
///
/// SI units use `name = "METRE"` with an optional prefix. Conversion based
/// units carry their own name and optionally an explicit factor to meters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LengthUnit {
    pub name: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub conversion_factor: Option<f64>,
}

/// A storey as declared in the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreyRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Base elevation in model units.
    #[serde(default)]
    pub elevation: f64,
}

/// Placement of an element: translation plus rotation about +Z.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default)]
    pub location: [f64; 3],
    /// Rotation about +Z in degrees.
    #[serde(default)]
    pub rotation: f64,
}

impl Placement {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let [x, y, z] = self.location;
        Isometry3::new(
            Vector3::new(x, y, z),
            Vector3::z() * self.rotation.to_radians(),
        )
    }
}

/// Geometric representation item of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepresentationItem {
    /// Planar profile in the XY plane extruded along +Z.
    Extrusion {
        profile: Vec<[f64; 2]>,
        depth: f64,
        #[serde(default)]
        base: f64,
    },
    /// Axis-aligned box.
    Box { min: [f64; 3], max: [f64; 3] },
    /// Polygon faces over a vertex list.
    Mesh {
        vertices: Vec<[f64; 3]>,
        faces: Vec<Vec<usize>>,
    },
}

/// Opening voiding its host element. Placement is relative to the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Opening {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub items: Vec<RepresentationItem>,
}

/// A building element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Element {
    pub guid: String,
    /// IFC entity name, e.g. `IfcWall`.
    pub class: String,
    #[serde(default)]
    pub name: String,
    /// Id of the containing storey.
    #[serde(default)]
    pub storey: Option<String>,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub items: Vec<RepresentationItem>,
    #[serde(default)]
    pub openings: Vec<Opening>,
}

impl Element {
    pub fn class_tag(&self) -> ElementClass {
        ElementClass::from_ifc_name(&self.class)
    }
}
