//! GeoJSON export of storey polylines.
//!
//! Semantic only: one `LineString` feature per polyline carrying class and
//! provenance properties, no styling. Closed polylines repeat their first
//! point at the end, as GeoJSON rings do.

use serde::{Deserialize, Serialize};

use crate::model::BuildingStorey;
use crate::section::Polyline2D;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: LineString,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub category: String,
    /// Class of the first contributing element.
    pub ifc_class: String,
    /// Every contributing class, in order of first contribution.
    pub ifc_classes: Vec<String>,
    pub storey: String,
    pub storey_index: usize,
    pub guids: Vec<String>,
    pub closed: bool,
}

impl Feature {
    pub fn from_polyline(polyline: &Polyline2D, storey: &BuildingStorey) -> Self {
        let mut coordinates: Vec<[f64; 2]> = polyline.points.iter().map(|p| [p.x, p.y]).collect();
        if polyline.closed {
            if let Some(&first) = coordinates.first() {
                coordinates.push(first);
            }
        }
        let class = polyline.primary_class();
        Self {
            kind: "Feature".to_string(),
            geometry: LineString {
                kind: "LineString".to_string(),
                coordinates,
            },
            properties: FeatureProperties {
                category: class.category().to_string(),
                ifc_class: class.ifc_name().to_string(),
                ifc_classes: polyline
                    .classes()
                    .iter()
                    .map(|c| c.ifc_name().to_string())
                    .collect(),
                storey: storey.display_name().to_string(),
                storey_index: storey.index,
                guids: polyline.guids(),
                closed: polyline.closed,
            },
        }
    }
}

/// Build the feature collection of one storey.
pub fn feature_collection(storey: &BuildingStorey, polylines: &[Polyline2D]) -> FeatureCollection {
    FeatureCollection {
        kind: "FeatureCollection".to_string(),
        features: polylines
            .iter()
            .map(|p| Feature::from_polyline(p, storey))
            .collect(),
    }
}

/// Serialise one storey to a GeoJSON string.
pub fn render_geojson(
    storey: &BuildingStorey,
    polylines: &[Polyline2D],
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&feature_collection(storey, polylines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementClass;
    use crate::section::ElementRef;
    use nalgebra::Point2;
    use pretty_assertions::assert_eq;

    fn storey() -> BuildingStorey {
        BuildingStorey::new("S1", "First Floor", 1, 3.0, 1.2)
    }

    #[test]
    fn test_closed_feature_properties() {
        let polyline = Polyline2D::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
            ],
            true,
            vec![
                ElementRef {
                    guid: "c1".to_string(),
                    class: ElementClass::Column,
                },
                ElementRef {
                    guid: "w1".to_string(),
                    class: ElementClass::Wall,
                },
            ],
        );
        let feature = Feature::from_polyline(&polyline, &storey());
        assert_eq!(
            feature.properties,
            FeatureProperties {
                category: "Column".to_string(),
                ifc_class: "IfcColumn".to_string(),
                ifc_classes: vec!["IfcColumn".to_string(), "IfcWall".to_string()],
                storey: "First Floor".to_string(),
                storey_index: 1,
                guids: vec!["c1".to_string(), "w1".to_string()],
                closed: true,
            }
        );
        assert_eq!(feature.geometry.coordinates.len(), 4);
        assert_eq!(feature.geometry.coordinates[0], feature.geometry.coordinates[3]);
    }

    #[test]
    fn test_collection_json_shape() {
        let polyline = Polyline2D::new(
            vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)],
            false,
            vec![ElementRef {
                guid: "b1".to_string(),
                class: ElementClass::Beam,
            }],
        );
        let json = render_geojson(&storey(), &[polyline]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["geometry"]["type"], "LineString");
        assert_eq!(value["features"][0]["properties"]["closed"], false);
        assert_eq!(value["features"][0]["geometry"]["coordinates"][1][0], 2.0);
        assert!(value["features"][0]["properties"].get("stroke").is_none());
    }

    #[test]
    fn test_empty_collection() {
        let collection = feature_collection(&storey(), &[]);
        assert!(collection.features.is_empty());
    }
}
