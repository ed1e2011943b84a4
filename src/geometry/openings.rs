//! Opening subtraction in the section plane.
//!
//! Host and opening sections arrive as unordered segment soups. Segments are
//! split where the two soups cross, then every piece is classified by sampling
//! both of its sides, which leaves the boundary of `host - openings`. Openings
//! flush with a host face are handled the same way as through openings.

use nalgebra::{Point2, Vector2};

/// 2D segment.
pub type Segment2 = (Point2<f64>, Point2<f64>);

/// Even-odd point containment against a closed segment soup.
pub fn inside_soup(p: &Point2<f64>, soup: &[Segment2]) -> bool {
    let mut inside = false;
    for (a, b) in soup {
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if x > p.x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Parameter along `s` where it properly crosses `o`, if any.
fn crossing_param(s: &Segment2, o: &Segment2, tol: f64) -> Option<f64> {
    let r = s.1 - s.0;
    let q = o.1 - o.0;
    let denom = r.perp(&q);
    if denom.abs() <= f64::EPSILON * r.norm() * q.norm() {
        return None;
    }
    let w = o.0 - s.0;
    let t = w.perp(&q) / denom;
    let u = w.perp(&r) / denom;
    let len = r.norm();
    let t_tol = if len > 0.0 { tol / len } else { 0.0 };
    let u_tol = if q.norm() > 0.0 { tol / q.norm() } else { 0.0 };
    if t > t_tol && t < 1.0 - t_tol && u >= -u_tol && u <= 1.0 + u_tol {
        Some(t)
    } else {
        None
    }
}

/// Split `seg` at every crossing with `others`.
fn split_segment(seg: &Segment2, others: &[Segment2], tol: f64) -> Vec<Segment2> {
    let mut params: Vec<f64> = others
        .iter()
        .filter_map(|o| crossing_param(seg, o, tol))
        .collect();
    if params.is_empty() {
        return vec![*seg];
    }
    params.sort_by(f64::total_cmp);
    params.dedup_by(|a, b| (*a - *b).abs() <= f64::EPSILON);

    let at = |t: f64| seg.0 + (seg.1 - seg.0) * t;
    let mut pieces = Vec::with_capacity(params.len() + 1);
    let mut start = 0.0;
    for t in params.into_iter().chain(std::iter::once(1.0)) {
        let (a, b) = (at(start), at(t));
        if (b - a).norm() > tol {
            pieces.push((a, b));
        }
        start = t;
    }
    pieces
}

fn midpoint(seg: &Segment2) -> Point2<f64> {
    nalgebra::center(&seg.0, &seg.1)
}

fn distance_to_segment(p: &Point2<f64>, seg: &Segment2) -> f64 {
    let e = seg.1 - seg.0;
    let len2 = e.norm_squared();
    if len2 == 0.0 {
        return (p - seg.0).norm();
    }
    let t = ((p - seg.0).dot(&e) / len2).clamp(0.0, 1.0);
    (p - (seg.0 + e * t)).norm()
}

fn distance_to_line(p: &Point2<f64>, seg: &Segment2) -> f64 {
    let e = seg.1 - seg.0;
    let len = e.norm();
    if len == 0.0 {
        return (p - seg.0).norm();
    }
    e.perp(&(p - seg.0)).abs() / len
}

/// Whether `piece` runs along a segment of `soup` within `tol`.
fn on_boundary(piece: &Segment2, soup: &[Segment2], tol: f64) -> bool {
    let mid = midpoint(piece);
    soup.iter().any(|s| {
        distance_to_segment(&mid, s) <= tol
            && distance_to_line(&piece.0, s) <= tol
            && distance_to_line(&piece.1, s) <= tol
    })
}

/// Whether `piece` separates a region where `inside` holds from one where it
/// does not. Both sides are sampled just off the piece's midpoint.
fn separates(piece: &Segment2, tol: f64, inside: &dyn Fn(&Point2<f64>) -> bool) -> bool {
    let d = piece.1 - piece.0;
    let len = d.norm();
    if len <= tol {
        return false;
    }
    let normal = Vector2::new(-d.y, d.x) / len;
    let step = (tol * 10.0).max(f64::EPSILON).min(len * 0.25);
    let mid = midpoint(piece);
    inside(&(mid + normal * step)) != inside(&(mid - normal * step))
}

/// Remove opening volumes from a host section.
///
/// A piece is kept when the region `host - openings` lies on exactly one side
/// of it. Opening pieces running along the host boundary, or along an earlier
/// opening, are left to the piece already emitted there.
pub fn subtract_openings(host: &[Segment2], openings: &[Vec<Segment2>], tol: f64) -> Vec<Segment2> {
    let openings: Vec<&Vec<Segment2>> = openings.iter().filter(|o| !o.is_empty()).collect();
    if host.is_empty() || openings.is_empty() {
        return host.to_vec();
    }

    let in_result =
        |p: &Point2<f64>| inside_soup(p, host) && !openings.iter().any(|o| inside_soup(p, o));
    let all_openings: Vec<Segment2> = openings.iter().flat_map(|o| o.iter().copied()).collect();
    let mut result = Vec::new();

    for seg in host {
        for piece in split_segment(seg, &all_openings, tol) {
            if separates(&piece, tol, &in_result) {
                result.push(piece);
            }
        }
    }

    for (idx, opening) in openings.iter().enumerate() {
        let mut cutters: Vec<Segment2> = host.to_vec();
        for (other_idx, other) in openings.iter().enumerate() {
            if other_idx != idx {
                cutters.extend(other.iter().copied());
            }
        }
        for seg in opening.iter() {
            for piece in split_segment(seg, &cutters, tol) {
                let shared = on_boundary(&piece, host, tol)
                    || openings[..idx].iter().any(|o| on_boundary(&piece, o, tol));
                if !shared && separates(&piece, tol, &in_result) {
                    result.push(piece);
                }
            }
        }
    }

    result
}
