//! Shape kernel capability.
//!
//! The pipeline only talks to shape construction and plane intersection
//! through [`GeometryKernel`], so another kernel can be plugged in without
//! touching the section or rendering code.

use nalgebra::{Point3, Vector3};
use thiserror::Error;

use super::Shape;
use crate::config::GeometryConfig;
use crate::model::Element;

/// Errors raised by a kernel.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("element has no representation items")]
    EmptyRepresentation,

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("invalid extrusion depth {0}")]
    InvalidDepth(f64),

    #[error("invalid box: max corner must exceed min corner on every axis")]
    InvalidBox,

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),

    #[error("opening {guid}: {reason}")]
    InvalidOpening { guid: String, reason: String },

    #[error("intersection failed: {0}")]
    Intersection(String),
}

/// Flags and tolerance for shape construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrySettings {
    pub world_coordinates: bool,
    pub subtract_openings: bool,
    pub sew_shells: bool,
    /// Vertex welding tolerance (model units).
    pub tolerance: f64,
}

impl GeometrySettings {
    pub fn from_config(config: &GeometryConfig, tolerance: f64) -> Self {
        Self {
            world_coordinates: config.world_coordinates,
            subtract_openings: config.subtract_openings,
            sew_shells: config.sew_shells,
            tolerance,
        }
    }
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self::from_config(
            &GeometryConfig::default(),
            crate::config::DEFAULT_SECTION_TOLERANCE_M,
        )
    }
}

/// Cutting plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionPlane {
    /// Unit normal.
    pub normal: Vector3<f64>,
    /// Signed distance of the plane from the origin along `normal`.
    pub elevation: f64,
    /// Vertices closer than this count as on the plane.
    pub tolerance: f64,
}

impl SectionPlane {
    /// Horizontal plane at `elevation` with an upward normal.
    pub fn horizontal(elevation: f64, tolerance: f64) -> Self {
        Self {
            normal: Vector3::z(),
            elevation,
            tolerance,
        }
    }

    /// Signed distance of a point from the plane.
    #[inline]
    pub fn distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) - self.elevation
    }
}

/// A straight segment in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment3 {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Segment3 {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Shape construction and plane intersection.
pub trait GeometryKernel: Send + Sync {
    /// Kernel name for logs and the manifest.
    fn name(&self) -> &str;

    /// Build the 3D shape of one element.
    fn build_shape(
        &self,
        element: &Element,
        settings: &GeometrySettings,
    ) -> std::result::Result<Shape, KernelError>;

    /// Intersect a shape with a plane, returning the cut segments.
    fn intersect_with_plane(
        &self,
        shape: &Shape,
        plane: &SectionPlane,
    ) -> std::result::Result<Vec<Segment3>, KernelError>;
}
