//! Element class tags.

use serde::{Deserialize, Serialize};

/// Closed set of element classes the pipeline distinguishes, plus a catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementClass {
    Wall,
    CurtainWall,
    Slab,
    Roof,
    Column,
    Beam,
    Member,
    Plate,
    Footing,
    Door,
    Window,
    Stair,
    Ramp,
    Railing,
    Covering,
    Furniture,
    Space,
    Opening,
    /// Any other IFC entity name, kept verbatim.
    Other(String),
}

impl ElementClass {
    /// Resolve an IFC entity name (`IfcWall`, `IFCWALLSTANDARDCASE`, ...).
    pub fn from_ifc_name(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        let base = upper
            .strip_suffix("STANDARDCASE")
            .or_else(|| upper.strip_suffix("ELEMENTEDCASE"))
            .unwrap_or(&upper);

        match base {
            "IFCWALL" => ElementClass::Wall,
            "IFCCURTAINWALL" => ElementClass::CurtainWall,
            "IFCSLAB" => ElementClass::Slab,
            "IFCROOF" => ElementClass::Roof,
            "IFCCOLUMN" => ElementClass::Column,
            "IFCBEAM" => ElementClass::Beam,
            "IFCMEMBER" => ElementClass::Member,
            "IFCPLATE" => ElementClass::Plate,
            "IFCFOOTING" => ElementClass::Footing,
            "IFCDOOR" => ElementClass::Door,
            "IFCWINDOW" => ElementClass::Window,
            "IFCSTAIR" | "IFCSTAIRFLIGHT" => ElementClass::Stair,
            "IFCRAMP" | "IFCRAMPFLIGHT" => ElementClass::Ramp,
            "IFCRAILING" => ElementClass::Railing,
            "IFCCOVERING" => ElementClass::Covering,
            "IFCFURNISHINGELEMENT" | "IFCFURNITURE" => ElementClass::Furniture,
            "IFCSPACE" => ElementClass::Space,
            "IFCOPENINGELEMENT" => ElementClass::Opening,
            _ => ElementClass::Other(name.trim().to_string()),
        }
    }

    /// Canonical IFC entity name.
    pub fn ifc_name(&self) -> &str {
        match self {
            ElementClass::Wall => "IfcWall",
            ElementClass::CurtainWall => "IfcCurtainWall",
            ElementClass::Slab => "IfcSlab",
            ElementClass::Roof => "IfcRoof",
            ElementClass::Column => "IfcColumn",
            ElementClass::Beam => "IfcBeam",
            ElementClass::Member => "IfcMember",
            ElementClass::Plate => "IfcPlate",
            ElementClass::Footing => "IfcFooting",
            ElementClass::Door => "IfcDoor",
            ElementClass::Window => "IfcWindow",
            ElementClass::Stair => "IfcStair",
            ElementClass::Ramp => "IfcRamp",
            ElementClass::Railing => "IfcRailing",
            ElementClass::Covering => "IfcCovering",
            ElementClass::Furniture => "IfcFurnishingElement",
            ElementClass::Space => "IfcSpace",
            ElementClass::Opening => "IfcOpeningElement",
            ElementClass::Other(name) => name,
        }
    }

    /// Human-readable category used by the GeoJSON export.
    pub fn category(&self) -> &'static str {
        match self {
            ElementClass::Wall => "Wall",
            ElementClass::CurtainWall => "Curtain Wall",
            ElementClass::Slab => "Slab",
            ElementClass::Roof => "Roof",
            ElementClass::Column => "Column",
            ElementClass::Beam => "Beam",
            ElementClass::Member => "Member",
            ElementClass::Plate => "Plate",
            ElementClass::Footing => "Footing",
            ElementClass::Door => "Door",
            ElementClass::Window => "Window",
            ElementClass::Stair => "Stair",
            ElementClass::Ramp => "Ramp",
            ElementClass::Railing => "Railing",
            ElementClass::Covering => "Covering",
            ElementClass::Furniture => "Furniture",
            ElementClass::Space => "Space",
            ElementClass::Opening => "Opening",
            ElementClass::Other(_) => "Other",
        }
    }

    /// Classes drawn when no include list is configured.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            ElementClass::Furniture
                | ElementClass::Space
                | ElementClass::Opening
                | ElementClass::Other(_)
        )
    }
}

impl From<String> for ElementClass {
    fn from(name: String) -> Self {
        ElementClass::from_ifc_name(&name)
    }
}

impl From<&str> for ElementClass {
    fn from(name: &str) -> Self {
        ElementClass::from_ifc_name(name)
    }
}

impl From<ElementClass> for String {
    fn from(class: ElementClass) -> Self {
        class.ifc_name().to_string()
    }
}

impl std::fmt::Display for ElementClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ifc_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ifc_name_case_insensitive() {
        assert_eq!(ElementClass::from_ifc_name("IfcWall"), ElementClass::Wall);
        assert_eq!(ElementClass::from_ifc_name("IFCWALL"), ElementClass::Wall);
        assert_eq!(
            ElementClass::from_ifc_name("IfcWallStandardCase"),
            ElementClass::Wall
        );
        assert_eq!(
            ElementClass::from_ifc_name("IfcSlabElementedCase"),
            ElementClass::Slab
        );
    }

    #[test]
    fn test_unknown_class_kept_verbatim() {
        let class = ElementClass::from_ifc_name("IfcFlowTerminal");
        assert_eq!(class, ElementClass::Other("IfcFlowTerminal".to_string()));
        assert_eq!(class.ifc_name(), "IfcFlowTerminal");
        assert_eq!(class.category(), "Other");
        assert!(!class.is_structural());
    }

    #[test]
    fn test_structural_set() {
        assert!(ElementClass::Wall.is_structural());
        assert!(ElementClass::Door.is_structural());
        assert!(!ElementClass::Space.is_structural());
        assert!(!ElementClass::Furniture.is_structural());
    }

    #[test]
    fn test_serde_uses_ifc_name() {
        let json = serde_json::to_string(&ElementClass::Column).unwrap();
        assert_eq!(json, "\"IfcColumn\"");
        let parsed: ElementClass = serde_json::from_str("\"IfcColumn\"").unwrap();
        assert_eq!(parsed, ElementClass::Column);
    }
}
