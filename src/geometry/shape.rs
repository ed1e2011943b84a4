//! Polyhedral shapes.

use nalgebra::{Isometry3, Point3, Vector3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn include(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub fn merge(&mut self, other: &Aabb) {
        if !other.is_empty() {
            self.include(&other.min);
            self.include(&other.max);
        }
    }

    /// Whether the Z range reaches `z` within `tol`.
    pub fn spans_z(&self, z: f64, tol: f64) -> bool {
        !self.is_empty() && self.min.z - tol <= z && z <= self.max.z + tol
    }
}

/// A closed (or open) polyhedral surface: planar polygon faces over shared
/// vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shell {
    pub vertices: Vec<Point3<f64>>,
    /// Vertex index loops, counter-clockwise seen from outside.
    pub faces: Vec<Vec<usize>>,
}

impl Shell {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Self {
        Self { vertices, faces }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for v in &self.vertices {
            aabb.include(v);
        }
        aabb
    }

    pub fn transformed(mut self, iso: &Isometry3<f64>) -> Self {
        for v in &mut self.vertices {
            *v = iso.transform_point(v);
        }
        self
    }

    /// Face normal by Newell's method (not normalised).
    pub fn face_normal(&self, face: &[usize]) -> Vector3<f64> {
        let mut n = Vector3::zeros();
        for (i, &a) in face.iter().enumerate() {
            let p = &self.vertices[a];
            let q = &self.vertices[face[(i + 1) % face.len()]];
            n.x += (p.y - q.y) * (p.z + q.z);
            n.y += (p.z - q.z) * (p.x + q.x);
            n.z += (p.x - q.x) * (p.y + q.y);
        }
        n
    }
}

/// The 3D representation of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub guid: String,
    pub shells: Vec<Shell>,
    /// Opening volumes to remove from the section of `shells`.
    pub openings: Vec<Shell>,
    pub bounds: Aabb,
}

impl Shape {
    pub fn new(guid: impl Into<String>, shells: Vec<Shell>, openings: Vec<Shell>) -> Self {
        let mut bounds = Aabb::empty();
        for shell in &shells {
            bounds.merge(&shell.bounds());
        }
        Self {
            guid: guid.into(),
            shells,
            openings,
            bounds,
        }
    }

    pub fn face_count(&self) -> usize {
        self.shells.iter().map(|s| s.faces.len()).sum()
    }
}
