//! Built-in polyhedral kernel.
//!
//! Representation items become planar polygon shells. A section walks every
//! face, collects the points where its boundary crosses the plane and pairs
//! them along the face/plane intersection line.

use nalgebra::{Isometry3, Point2, Point3};

use super::kernel::{GeometryKernel, GeometrySettings, KernelError, SectionPlane, Segment3};
use super::openings::{subtract_openings, Segment2};
use super::sew::sew_shells;
use super::{Aabb, Shape, Shell};
use crate::model::{Element, RepresentationItem};

type KernelResult<T> = std::result::Result<T, KernelError>;

/// Kernel over planar polygon shells.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolyhedralKernel;

impl PolyhedralKernel {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryKernel for PolyhedralKernel {
    fn name(&self) -> &str {
        "polyhedral"
    }

    fn build_shape(&self, element: &Element, settings: &GeometrySettings) -> KernelResult<Shape> {
        if element.items.is_empty() {
            return Err(KernelError::EmptyRepresentation);
        }

        let host_iso = element.placement.to_isometry();
        let place = |shell: Shell, iso: &Isometry3<f64>| {
            if settings.world_coordinates {
                shell.transformed(iso)
            } else {
                shell
            }
        };

        let mut shells = Vec::with_capacity(element.items.len());
        for item in &element.items {
            shells.push(place(build_item(item)?, &host_iso));
        }
        if settings.sew_shells && shells.len() > 1 {
            shells = vec![sew_shells(&shells, settings.tolerance)];
        }

        let mut openings = Vec::new();
        if settings.subtract_openings {
            for opening in &element.openings {
                let invalid = |reason: String| KernelError::InvalidOpening {
                    guid: opening.guid.clone(),
                    reason,
                };
                if opening.items.is_empty() {
                    return Err(invalid("no representation items".to_string()));
                }
                // Opening placement is relative to the host.
                let iso = if settings.world_coordinates {
                    host_iso * opening.placement.to_isometry()
                } else {
                    opening.placement.to_isometry()
                };
                let mut opening_shells = Vec::with_capacity(opening.items.len());
                for item in &opening.items {
                    let shell = build_item(item).map_err(|e| invalid(e.to_string()))?;
                    opening_shells.push(shell.transformed(&iso));
                }
                openings.push(sew_shells(&opening_shells, settings.tolerance));
            }
        }

        Ok(Shape::new(element.guid.clone(), shells, openings))
    }

    fn intersect_with_plane(
        &self,
        shape: &Shape,
        plane: &SectionPlane,
    ) -> KernelResult<Vec<Segment3>> {
        if !plane.normal.iter().all(|c| c.is_finite()) || plane.normal.norm() == 0.0 {
            return Err(KernelError::Intersection("degenerate plane normal".to_string()));
        }
        if !aabb_reaches_plane(&shape.bounds, plane) {
            return Ok(Vec::new());
        }

        let mut segments = Vec::new();
        for shell in &shape.shells {
            section_shell(shell, plane, &mut segments);
        }
        if shape.openings.is_empty() || segments.is_empty() {
            return Ok(segments);
        }

        let host: Vec<Segment2> = segments.iter().map(to_2d).collect();
        let openings: Vec<Vec<Segment2>> = shape
            .openings
            .iter()
            .map(|opening| {
                let mut cut = Vec::new();
                section_shell(opening, plane, &mut cut);
                cut.iter().map(to_2d).collect()
            })
            .collect();

        let z = plane.elevation;
        Ok(subtract_openings(&host, &openings, plane.tolerance)
            .into_iter()
            .map(|(a, b)| Segment3::new(Point3::new(a.x, a.y, z), Point3::new(b.x, b.y, z)))
            .collect())
    }
}

fn to_2d(seg: &Segment3) -> Segment2 {
    (seg.start.xy(), seg.end.xy())
}

fn check_finite<'a>(mut coords: impl Iterator<Item = &'a f64>, what: &'static str) -> KernelResult<()> {
    if coords.all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(KernelError::NonFinite(what))
    }
}

/// Build one representation item in its local coordinates.
fn build_item(item: &RepresentationItem) -> KernelResult<Shell> {
    match item {
        RepresentationItem::Extrusion {
            profile,
            depth,
            base,
        } => build_extrusion(profile, *depth, *base),
        RepresentationItem::Box { min, max } => {
            check_finite(min.iter().chain(max.iter()), "box")?;
            if (0..3).any(|i| max[i] <= min[i]) {
                return Err(KernelError::InvalidBox);
            }
            Ok(box_shell(*min, *max))
        }
        RepresentationItem::Mesh { vertices, faces } => build_mesh(vertices, faces),
    }
}

fn build_extrusion(profile: &[[f64; 2]], depth: f64, base: f64) -> KernelResult<Shell> {
    check_finite(profile.iter().flatten(), "extrusion profile")?;
    if !depth.is_finite() || !base.is_finite() {
        return Err(KernelError::NonFinite("extrusion depth"));
    }
    if depth <= 0.0 {
        return Err(KernelError::InvalidDepth(depth));
    }

    let mut points: Vec<Point2<f64>> = profile.iter().map(|&[x, y]| Point2::new(x, y)).collect();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return Err(KernelError::InvalidProfile(format!(
            "expected at least 3 distinct points, got {}",
            points.len()
        )));
    }

    let area = signed_area(&points);
    if area.abs() <= f64::EPSILON {
        return Err(KernelError::InvalidProfile("zero area".to_string()));
    }
    if area < 0.0 {
        points.reverse();
    }

    Ok(prism(&points, base, base + depth))
}

fn build_mesh(vertices: &[[f64; 3]], faces: &[Vec<usize>]) -> KernelResult<Shell> {
    check_finite(vertices.iter().flatten(), "mesh vertices")?;
    if vertices.is_empty() || faces.is_empty() {
        return Err(KernelError::InvalidMesh("no vertices or faces".to_string()));
    }
    for (i, face) in faces.iter().enumerate() {
        if face.len() < 3 {
            return Err(KernelError::InvalidMesh(format!(
                "face {} has {} vertices",
                i,
                face.len()
            )));
        }
        if let Some(&bad) = face.iter().find(|&&v| v >= vertices.len()) {
            return Err(KernelError::InvalidMesh(format!(
                "face {} references vertex {} of {}",
                i,
                bad,
                vertices.len()
            )));
        }
    }
    Ok(Shell::new(
        vertices
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect(),
        faces.to_vec(),
    ))
}

/// Shoelace area, positive for counter-clockwise.
fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        * 0.5
}

/// Right prism over a counter-clockwise profile.
fn prism(profile: &[Point2<f64>], z0: f64, z1: f64) -> Shell {
    let n = profile.len();
    let mut vertices = Vec::with_capacity(2 * n);
    vertices.extend(profile.iter().map(|p| Point3::new(p.x, p.y, z0)));
    vertices.extend(profile.iter().map(|p| Point3::new(p.x, p.y, z1)));

    let mut faces = Vec::with_capacity(n + 2);
    faces.push((0..n).rev().collect());
    faces.push((n..2 * n).collect());
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push(vec![i, j, n + j, n + i]);
    }
    Shell::new(vertices, faces)
}

/// Axis-aligned box shell with quad faces.
pub fn box_shell(min: [f64; 3], max: [f64; 3]) -> Shell {
    let profile = [
        Point2::new(min[0], min[1]),
        Point2::new(max[0], min[1]),
        Point2::new(max[0], max[1]),
        Point2::new(min[0], max[1]),
    ];
    prism(&profile, min[2], max[2])
}

fn aabb_reaches_plane(aabb: &Aabb, plane: &SectionPlane) -> bool {
    if aabb.is_empty() {
        return false;
    }
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for i in 0..8 {
        let corner = Point3::new(
            if i & 1 == 0 { aabb.min.x } else { aabb.max.x },
            if i & 2 == 0 { aabb.min.y } else { aabb.max.y },
            if i & 4 == 0 { aabb.min.z } else { aabb.max.z },
        );
        let d = plane.distance(&corner);
        lo = lo.min(d);
        hi = hi.max(d);
    }
    lo <= plane.tolerance && hi >= -plane.tolerance
}

fn section_shell(shell: &Shell, plane: &SectionPlane, out: &mut Vec<Segment3>) {
    let distances: Vec<f64> = shell.vertices.iter().map(|v| plane.distance(v)).collect();
    for face in &shell.faces {
        section_face(shell, face, &distances, plane, out);
    }
}

/// Intersect one planar face with the plane.
fn section_face(
    shell: &Shell,
    face: &[usize],
    distances: &[f64],
    plane: &SectionPlane,
    out: &mut Vec<Segment3>,
) {
    let above = |i: usize| distances[i] >= -plane.tolerance;

    let mut crossings: Vec<Point3<f64>> = Vec::new();
    for (k, &a) in face.iter().enumerate() {
        let b = face[(k + 1) % face.len()];
        if above(a) == above(b) {
            continue;
        }
        let (da, db) = (distances[a], distances[b]);
        let t = (da / (da - db)).clamp(0.0, 1.0);
        let (pa, pb) = (shell.vertices[a], shell.vertices[b]);
        crossings.push(pa + (pb - pa) * t);
    }
    if crossings.len() < 2 {
        return;
    }

    // Faces parallel to the plane contribute nothing.
    let direction = shell.face_normal(face).cross(&plane.normal);
    if direction.norm() <= f64::EPSILON {
        return;
    }
    crossings.sort_by(|p, q| direction.dot(&p.coords).total_cmp(&direction.dot(&q.coords)));

    for pair in crossings.chunks_exact(2) {
        let segment = Segment3::new(pair[0], pair[1]);
        if segment.length() > plane.tolerance {
            out.push(segment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Opening, Placement};

    const TOL: f64 = 1e-9;

    fn wall(items: Vec<RepresentationItem>) -> Element {
        Element {
            guid: "wall-1".to_string(),
            class: "IfcWall".to_string(),
            items,
            ..Default::default()
        }
    }

    fn rect_extrusion(w: f64, d: f64, h: f64) -> RepresentationItem {
        RepresentationItem::Extrusion {
            profile: vec![[0.0, 0.0], [w, 0.0], [w, d], [0.0, d]],
            depth: h,
            base: 0.0,
        }
    }

    fn section(element: &Element, settings: &GeometrySettings, z: f64) -> Vec<Segment3> {
        let kernel = PolyhedralKernel::new();
        let shape = kernel.build_shape(element, settings).unwrap();
        kernel
            .intersect_with_plane(&shape, &SectionPlane::horizontal(z, TOL))
            .unwrap()
    }

    fn total_length(segments: &[Segment3]) -> f64 {
        segments.iter().map(Segment3::length).sum()
    }

    // ==================== Construction tests ====================

    #[test]
    fn test_extrusion_faces() {
        let shell = build_extrusion(&[[0.0, 0.0], [4.0, 0.0], [4.0, 0.2], [0.0, 0.2]], 3.0, 0.0)
            .unwrap();
        assert_eq!(shell.vertices.len(), 8);
        assert_eq!(shell.faces.len(), 6);
    }

    #[test]
    fn test_extrusion_clockwise_profile_reoriented() {
        let shell = build_extrusion(&[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]], 1.0, 0.0)
            .unwrap();
        // Top cap normal points up
        assert!(shell.face_normal(&shell.faces[1]).z > 0.0);
    }

    #[test]
    fn test_extrusion_rejects_bad_input() {
        assert_eq!(
            build_extrusion(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]], 0.0, 0.0),
            Err(KernelError::InvalidDepth(0.0))
        );
        assert!(matches!(
            build_extrusion(&[[0.0, 0.0], [1.0, 0.0]], 1.0, 0.0),
            Err(KernelError::InvalidProfile(_))
        ));
        assert!(matches!(
            build_extrusion(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]], 1.0, 0.0),
            Err(KernelError::InvalidProfile(_))
        ));
        assert_eq!(
            build_extrusion(&[[0.0, 0.0], [f64::NAN, 0.0], [1.0, 1.0]], 1.0, 0.0),
            Err(KernelError::NonFinite("extrusion profile"))
        );
    }

    #[test]
    fn test_box_and_mesh_validation() {
        assert_eq!(
            build_item(&RepresentationItem::Box {
                min: [0.0, 0.0, 0.0],
                max: [1.0, 0.0, 1.0]
            }),
            Err(KernelError::InvalidBox)
        );
        assert!(matches!(
            build_mesh(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[vec![0, 1, 5]]),
            Err(KernelError::InvalidMesh(_))
        ));
        assert!(matches!(
            build_mesh(&[[0.0, 0.0, 0.0]], &[vec![0, 0]]),
            Err(KernelError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_empty_representation() {
        let kernel = PolyhedralKernel::new();
        let result = kernel.build_shape(&wall(vec![]), &GeometrySettings::default());
        assert_eq!(result, Err(KernelError::EmptyRepresentation));
    }

    // ==================== Section tests ====================

    #[test]
    fn test_rectangular_wall_gives_four_segments() {
        let element = wall(vec![rect_extrusion(4.0, 0.2, 3.0)]);
        let segments = section(&element, &GeometrySettings::default(), 1.2);
        assert_eq!(segments.len(), 4);
        assert!((total_length(&segments) - 8.4).abs() < 1e-9);
        assert!(segments.iter().all(|s| (s.start.z - 1.2).abs() < 1e-12));
    }

    #[test]
    fn test_plane_outside_shape() {
        let element = wall(vec![rect_extrusion(4.0, 0.2, 3.0)]);
        assert!(section(&element, &GeometrySettings::default(), 5.0).is_empty());
        assert!(section(&element, &GeometrySettings::default(), -1.0).is_empty());
    }

    #[test]
    fn test_plane_at_top_face() {
        let element = wall(vec![rect_extrusion(1.0, 1.0, 3.0)]);
        let segments = section(&element, &GeometrySettings::default(), 3.0);
        assert_eq!(segments.len(), 4);
    }

    #[test]
    fn test_world_coordinates_flag() {
        let mut element = wall(vec![rect_extrusion(1.0, 1.0, 3.0)]);
        element.placement = Placement {
            location: [10.0, 0.0, 0.0],
            rotation: 0.0,
        };

        let world = section(&element, &GeometrySettings::default(), 1.0);
        assert!(world.iter().all(|s| s.start.x >= 10.0 - 1e-9));

        let local_settings = GeometrySettings {
            world_coordinates: false,
            ..GeometrySettings::default()
        };
        let local = section(&element, &local_settings, 1.0);
        assert!(local.iter().all(|s| s.start.x <= 1.0 + 1e-9));
    }

    #[test]
    fn test_opening_subtracted() {
        let mut element = wall(vec![rect_extrusion(4.0, 0.2, 3.0)]);
        element.placement.location = [5.0, 5.0, 0.0];
        element.openings.push(Opening {
            guid: "door-1".to_string(),
            placement: Placement {
                location: [1.0, -0.1, 0.0],
                rotation: 0.0,
            },
            items: vec![RepresentationItem::Box {
                min: [0.0, 0.0, 0.0],
                max: [1.0, 0.4, 2.1],
            }],
        });

        let cut = section(&element, &GeometrySettings::default(), 1.2);
        let expected = 2.0 * (1.0 + 0.2) + 2.0 * (2.0 + 0.2);
        assert!((total_length(&cut) - expected).abs() < 1e-9);

        // Above the door head the wall is intact
        let above = section(&element, &GeometrySettings::default(), 2.5);
        assert!((total_length(&above) - 8.4).abs() < 1e-9);

        let keep = GeometrySettings {
            subtract_openings: false,
            ..GeometrySettings::default()
        };
        assert!((total_length(&section(&element, &keep, 1.2)) - 8.4).abs() < 1e-9);
    }

    #[test]
    fn test_flush_opening_subtracted() {
        let mut element = wall(vec![rect_extrusion(4.0, 0.2, 3.0)]);
        element.openings.push(Opening {
            guid: "door-2".to_string(),
            placement: Placement {
                location: [1.0, 0.0, 0.0],
                rotation: 0.0,
            },
            items: vec![RepresentationItem::Box {
                min: [0.0, 0.0, 0.0],
                max: [1.0, 0.2, 2.1],
            }],
        });

        let cut = section(&element, &GeometrySettings::default(), 1.2);
        assert_eq!(cut.len(), 8);
        let expected = 2.0 * (1.0 + 0.2) + 2.0 * (2.0 + 0.2);
        assert!((total_length(&cut) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_opening_fails_host() {
        let mut element = wall(vec![rect_extrusion(4.0, 0.2, 3.0)]);
        element.openings.push(Opening {
            guid: "bad".to_string(),
            ..Default::default()
        });
        let kernel = PolyhedralKernel::new();
        let result = kernel.build_shape(&element, &GeometrySettings::default());
        assert!(matches!(result, Err(KernelError::InvalidOpening { ref guid, .. }) if guid == "bad"));
    }

    #[test]
    fn test_sewn_items_drop_shared_face() {
        let element = wall(vec![
            RepresentationItem::Box {
                min: [0.0, 0.0, 0.0],
                max: [1.0, 1.0, 1.0],
            },
            RepresentationItem::Box {
                min: [1.0, 0.0, 0.0],
                max: [2.0, 1.0, 1.0],
            },
        ]);
        let sewn = GeometrySettings {
            sew_shells: true,
            ..GeometrySettings::default()
        };
        let kernel = PolyhedralKernel::new();
        let shape = kernel.build_shape(&element, &sewn).unwrap();
        assert_eq!(shape.shells.len(), 1);
        assert_eq!(shape.face_count(), 10);

        let segments = section(&element, &sewn, 0.5);
        assert!((total_length(&segments) - 6.0).abs() < 1e-9);
    }
}
