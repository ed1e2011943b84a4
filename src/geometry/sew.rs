//! Shell sewing: weld coincident vertices and drop internal faces.

use nalgebra::Point3;
use rustc_hash::FxHashMap;

use super::Shell;

/// Spatial hash of welded vertices.
struct VertexWelder {
    tolerance: f64,
    cells: FxHashMap<(i64, i64, i64), Vec<usize>>,
    vertices: Vec<Point3<f64>>,
}

impl VertexWelder {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(f64::EPSILON),
            cells: FxHashMap::default(),
            vertices: Vec::new(),
        }
    }

    fn cell(&self, p: &Point3<f64>) -> (i64, i64, i64) {
        (
            (p.x / self.tolerance).floor() as i64,
            (p.y / self.tolerance).floor() as i64,
            (p.z / self.tolerance).floor() as i64,
        )
    }

    /// Index of an existing vertex within tolerance, or a new one.
    fn weld(&mut self, p: Point3<f64>) -> usize {
        let (cx, cy, cz) = self.cell(&p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        for &idx in bucket {
                            if (self.vertices[idx] - p).norm() <= self.tolerance {
                                return idx;
                            }
                        }
                    }
                }
            }
        }
        let idx = self.vertices.len();
        self.vertices.push(p);
        self.cells.entry((cx, cy, cz)).or_default().push(idx);
        idx
    }
}

/// Sew several shells into one.
///
/// Vertices closer than `tolerance` are merged, faces that collapse below
/// three vertices are dropped, and faces shared by two shells (same vertex
/// set after welding) are removed as internal.
pub fn sew_shells(shells: &[Shell], tolerance: f64) -> Shell {
    let mut welder = VertexWelder::new(tolerance);
    let mut faces: Vec<Vec<usize>> = Vec::new();

    for shell in shells {
        let remap: Vec<usize> = shell.vertices.iter().map(|&v| welder.weld(v)).collect();
        for face in &shell.faces {
            let mut loop_: Vec<usize> = face.iter().map(|&i| remap[i]).collect();
            loop_.dedup();
            while loop_.len() > 1 && loop_.first() == loop_.last() {
                loop_.pop();
            }
            if loop_.len() >= 3 {
                faces.push(loop_);
            }
        }
    }

    let key = |face: &Vec<usize>| {
        let mut k = face.clone();
        k.sort_unstable();
        k
    };
    let mut counts: FxHashMap<Vec<usize>, usize> = FxHashMap::default();
    for face in &faces {
        *counts.entry(key(face)).or_default() += 1;
    }
    faces.retain(|face| counts.get(&key(face)).copied().unwrap_or(0) < 2);

    Shell::new(welder.vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polyhedral::box_shell;

    #[test]
    fn test_sew_welds_shared_vertices() {
        let a = box_shell([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = box_shell([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
        let sewn = sew_shells(&[a, b], 1e-9);
        // 8 + 8 corners with 4 shared
        assert_eq!(sewn.vertices.len(), 12);
        // 6 + 6 faces minus the shared pair
        assert_eq!(sewn.faces.len(), 10);
    }

    #[test]
    fn test_sew_disjoint_keeps_everything() {
        let a = box_shell([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = box_shell([5.0, 0.0, 0.0], [6.0, 1.0, 1.0]);
        let sewn = sew_shells(&[a, b], 1e-9);
        assert_eq!(sewn.vertices.len(), 16);
        assert_eq!(sewn.faces.len(), 12);
    }

    #[test]
    fn test_sew_drops_collapsed_faces() {
        let shell = Shell::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1e-12, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        );
        let sewn = sew_shells(&[shell], 1e-9);
        assert!(sewn.faces.is_empty());
    }
}
