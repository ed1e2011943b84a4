//! Model-to-output coordinate normalisation.

use nalgebra::Point2;

use crate::section::Polyline2D;

/// Unit scale followed by an optional Y flip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    /// Model units to meters.
    pub scale: f64,
    /// Negate Y so the plan reads top-down in image space.
    pub invert_y: bool,
}

impl CoordinateTransform {
    pub fn new(scale: f64, invert_y: bool) -> Self {
        Self { scale, invert_y }
    }

    pub fn identity() -> Self {
        Self::new(1.0, false)
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && !self.invert_y
    }

    #[inline]
    pub fn apply_point(&self, p: &Point2<f64>) -> Point2<f64> {
        let y = p.y * self.scale;
        Point2::new(p.x * self.scale, if self.invert_y { -y } else { y })
    }

    pub fn apply_polyline(&self, polyline: &Polyline2D) -> Polyline2D {
        Polyline2D {
            points: polyline.points.iter().map(|p| self.apply_point(p)).collect(),
            closed: polyline.closed,
            elements: polyline.elements.clone(),
        }
    }

    /// Transform every polyline. Identity returns an unchanged copy.
    pub fn apply(&self, polylines: &[Polyline2D]) -> Vec<Polyline2D> {
        if self.is_identity() {
            return polylines.to_vec();
        }
        polylines.iter().map(|p| self.apply_polyline(p)).collect()
    }
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::identity()
    }
}
