//! Cut edges and the polylines chained from them.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geometry::Segment3;
use crate::model::ElementClass;

/// One segment of a plane/shape intersection, tagged with its source element.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub segment: Segment3,
    pub class: ElementClass,
    pub guid: String,
}

impl Edge {
    pub fn new(segment: Segment3, class: ElementClass, guid: impl Into<String>) -> Self {
        Self {
            segment,
            class,
            guid: guid.into(),
        }
    }

    pub fn start_xy(&self) -> Point2<f64> {
        self.segment.start.xy()
    }

    pub fn end_xy(&self) -> Point2<f64> {
        self.segment.end.xy()
    }

    /// Length in the XY plane.
    pub fn length_xy(&self) -> f64 {
        (self.end_xy() - self.start_xy()).norm()
    }
}

/// An element contributing to a polyline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub guid: String,
    pub class: ElementClass,
}

/// A chained outline in the section plane.
///
/// Always holds at least two points. When `closed`, the last point connects
/// back to the first and is not repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline2D {
    pub points: Vec<Point2<f64>>,
    pub closed: bool,
    /// Contributing elements in order of first contribution.
    pub elements: Vec<ElementRef>,
}

impl Polyline2D {
    pub fn new(points: Vec<Point2<f64>>, closed: bool, elements: Vec<ElementRef>) -> Self {
        Self {
            points,
            closed,
            elements,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Class used for styling: the first contributing element's class.
    pub fn primary_class(&self) -> ElementClass {
        self.elements
            .first()
            .map(|e| e.class.clone())
            .unwrap_or_else(|| ElementClass::Other(String::new()))
    }

    /// Distinct contributing classes in order of first contribution.
    pub fn classes(&self) -> Vec<ElementClass> {
        let mut classes: Vec<ElementClass> = Vec::new();
        for e in &self.elements {
            if !classes.contains(&e.class) {
                classes.push(e.class.clone());
            }
        }
        classes
    }

    pub fn guids(&self) -> Vec<String> {
        self.elements.iter().map(|e| e.guid.clone()).collect()
    }

    pub fn bounds(&self) -> Bounds2D {
        let mut bounds = Bounds2D::empty();
        for p in &self.points {
            bounds.include(p);
        }
        bounds
    }

    /// Total length, including the closing segment.
    pub fn length(&self) -> f64 {
        let open: f64 = self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) => open + (first - last).norm(),
            _ => open,
        }
    }
}

/// 2D bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2D {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds2D {
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn include(&mut self, p: &Point2<f64>) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn merge(&mut self, other: &Bounds2D) {
        if !other.is_empty() {
            self.include(&Point2::new(other.min_x, other.min_y));
            self.include(&Point2::new(other.max_x, other.max_y));
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// `None` when empty, for serialisation.
    pub fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }

    /// Union of several polylines' bounds.
    pub fn of_polylines<'a>(polylines: impl IntoIterator<Item = &'a Polyline2D>) -> Self {
        let mut bounds = Self::empty();
        for polyline in polylines {
            bounds.merge(&polyline.bounds());
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(closed: bool) -> Polyline2D {
        Polyline2D::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            closed,
            vec![ElementRef {
                guid: "w".to_string(),
                class: ElementClass::Wall,
            }],
        )
    }

    #[test]
    fn test_length_closed_and_open() {
        assert!((square(true).length() - 6.0).abs() < 1e-12);
        assert!((square(false).length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds() {
        let b = square(true).bounds();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (0.0, 0.0, 2.0, 1.0));
        assert!((b.width() - 2.0).abs() < 1e-12);
        assert!(Bounds2D::empty().non_empty().is_none());
    }

    #[test]
    fn test_primary_class() {
        assert_eq!(square(true).primary_class(), ElementClass::Wall);
        assert_eq!(square(true).guids(), vec!["w".to_string()]);
    }

    #[test]
    fn test_classes_are_distinct_in_order() {
        let refs = [("c1", ElementClass::Column), ("w1", ElementClass::Wall), ("c2", ElementClass::Column)]
            .into_iter()
            .map(|(guid, class)| ElementRef {
                guid: guid.to_string(),
                class,
            })
            .collect();
        let polyline = Polyline2D::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)], false, refs);
        assert_eq!(polyline.classes(), vec![ElementClass::Column, ElementClass::Wall]);
        assert_eq!(polyline.primary_class(), ElementClass::Column);
    }
}
