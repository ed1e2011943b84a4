//! Edge chaining.
//!
//! Edges are joined end to end into polylines by repeatedly picking the
//! nearest unconsumed endpoint within tolerance of an open chain end. A
//! uniform grid with cell size equal to the tolerance keeps the lookup local:
//! any endpoint within tolerance lies in one of the 3x3 neighbouring cells.

use std::collections::VecDeque;

use nalgebra::Point2;
use rustc_hash::FxHashMap;

use super::{Edge, ElementRef, Polyline2D};

type Cell = (i64, i64);

/// Grid index over edge endpoints.
struct EndpointGrid {
    cell_size: f64,
    cells: FxHashMap<Cell, Vec<(usize, usize)>>,
}

impl EndpointGrid {
    fn build(endpoints: &[[Point2<f64>; 2]], cell_size: f64) -> Self {
        let mut grid = Self {
            cell_size,
            cells: FxHashMap::default(),
        };
        for (edge, ends) in endpoints.iter().enumerate() {
            for (end, p) in ends.iter().enumerate() {
                let cell = grid.cell(p);
                grid.cells.entry(cell).or_default().push((edge, end));
            }
        }
        grid
    }

    fn cell(&self, p: &Point2<f64>) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    /// Nearest unconsumed endpoint within `tolerance` of `p`. Ties go to the
    /// lower edge index, then the start endpoint.
    fn nearest(
        &self,
        p: &Point2<f64>,
        endpoints: &[[Point2<f64>; 2]],
        consumed: &[bool],
        tolerance: f64,
    ) -> Option<(usize, usize)> {
        let (cx, cy) = self.cell(p);
        let mut best: Option<(f64, usize, usize)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &(edge, end) in bucket {
                    if consumed[edge] {
                        continue;
                    }
                    let d = (endpoints[edge][end] - p).norm();
                    if d > tolerance {
                        continue;
                    }
                    let better = match best {
                        None => true,
                        Some((bd, be, bend)) => {
                            d < bd || (d == bd && (edge, end) < (be, bend))
                        }
                    };
                    if better {
                        best = Some((d, edge, end));
                    }
                }
            }
        }
        best.map(|(_, edge, end)| (edge, end))
    }
}

fn add_ref(refs: &mut Vec<ElementRef>, edge: &Edge) {
    if !refs.iter().any(|r| r.guid == edge.guid) {
        refs.push(ElementRef {
            guid: edge.guid.clone(),
            class: edge.class.clone(),
        });
    }
}

fn within(a: &Point2<f64>, b: &Point2<f64>, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance
}

/// Which end of a chain is being extended.
#[derive(Clone, Copy, PartialEq)]
enum Side {
    Tail,
    Head,
}

struct ChainBuilder<'a> {
    edges: &'a [&'a Edge],
    endpoints: &'a [[Point2<f64>; 2]],
    grid: &'a EndpointGrid,
    consumed: Vec<bool>,
    tolerance: f64,
}

impl ChainBuilder<'_> {
    fn chain_from(&mut self, seed: usize) -> Option<Polyline2D> {
        self.consumed[seed] = true;
        let mut points: VecDeque<Point2<f64>> = self.endpoints[seed].iter().copied().collect();
        let mut refs = Vec::new();
        add_ref(&mut refs, self.edges[seed]);

        let mut closed = false;
        for side in [Side::Tail, Side::Head] {
            if closed {
                break;
            }
            closed = self.extend(&mut points, &mut refs, side);
        }

        (points.len() >= 2).then(|| Polyline2D::new(points.into(), closed, refs))
    }

    /// Extend one end until no endpoint is in reach. Returns true when the
    /// chain closed.
    fn extend(
        &mut self,
        points: &mut VecDeque<Point2<f64>>,
        refs: &mut Vec<ElementRef>,
        side: Side,
    ) -> bool {
        loop {
            let last = points.len() - 1;
            let (open_end, neighbour, other_end) = match side {
                Side::Tail => (points[last], points[last - 1], points[0]),
                Side::Head => (points[0], points[1], points[last]),
            };

            let nearest = self
                .grid
                .nearest(&open_end, self.endpoints, &self.consumed, self.tolerance);
            let Some((edge, end)) = nearest else {
                return false;
            };
            self.consumed[edge] = true;
            add_ref(refs, self.edges[edge]);

            // The accepted endpoint snaps onto the open end; only the far
            // endpoint is added.
            let far = self.endpoints[edge][1 - end];

            if points.len() >= 3 && within(&far, &other_end, self.tolerance) {
                return true;
            }
            if within(&far, &neighbour, self.tolerance) || within(&far, &open_end, self.tolerance) {
                // Doubles back onto the chain: consumed, nothing appended.
                continue;
            }
            match side {
                Side::Tail => points.push_back(far),
                Side::Head => points.push_front(far),
            }
        }
    }
}

/// Chain edges into polylines, in edge order.
///
/// Edges no longer than `tolerance` in XY are dropped first.
pub fn chain_edges(edges: &[Edge], tolerance: f64) -> Vec<Polyline2D> {
    let usable: Vec<&Edge> = edges.iter().filter(|e| e.length_xy() > tolerance).collect();
    if usable.is_empty() {
        return Vec::new();
    }
    let endpoints: Vec<[Point2<f64>; 2]> = usable
        .iter()
        .map(|e| [e.start_xy(), e.end_xy()])
        .collect();
    let cell_size = if tolerance > 0.0 { tolerance } else { f64::EPSILON };
    let grid = EndpointGrid::build(&endpoints, cell_size);

    let mut builder = ChainBuilder {
        edges: &usable,
        endpoints: &endpoints,
        grid: &grid,
        consumed: vec![false; usable.len()],
        tolerance,
    };

    let mut polylines = Vec::new();
    for seed in 0..usable.len() {
        if builder.consumed[seed] {
            continue;
        }
        if let Some(polyline) = builder.chain_from(seed) {
            polylines.push(polyline);
        }
    }
    polylines
}

/// Chain each element's edges on their own, elements in order of first edge.
pub fn chain_edges_per_element(edges: &[Edge], tolerance: f64) -> Vec<Polyline2D> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: FxHashMap<&str, Vec<Edge>> = FxHashMap::default();
    for edge in edges {
        let group = groups.entry(edge.guid.as_str()).or_insert_with(|| {
            order.push(edge.guid.as_str());
            Vec::new()
        });
        group.push(edge.clone());
    }
    order
        .into_iter()
        .flat_map(|guid| chain_edges(&groups[guid], tolerance))
        .collect()
}
