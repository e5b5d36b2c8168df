//! Zone traversal and hexagonal cells
//!
//! `iterate_zone` is a predicate-bounded 4-connected flood fill. Cells that
//! pass the predicate form the zone; neighbours that fail it form the
//! border. Traversal is read-only: callers collect the zone first and mutate
//! the world afterwards, so the predicate may freely borrow the world.
//!
//! The hex helpers map any coordinate to the nearest point of a hexagonal
//! lattice. Sampling noise at the centroid instead of the pixel gives a pass
//! a cellular grain; `Grain` lets the same generator run either way.

use std::collections::{HashSet, VecDeque};

use crate::point::{Point, Rect};

/// Result of a flood fill.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Zone {
    /// Cells that passed, in visit order.
    pub cells: Vec<Point>,
    /// In-bounds neighbours that failed, each listed once.
    pub border: Vec<Point>,
}

impl Zone {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

/// Flood fill from `start` over 4-connected neighbours inside `bounds`.
///
/// Every cell is tested at most once. An always-true predicate visits the
/// whole of `bounds`, so callers supply spatially limited predicates.
pub fn iterate_zone<F>(start: Point, bounds: Rect, mut is_valid: F) -> Zone
where
    F: FnMut(Point) -> bool,
{
    let mut zone = Zone::default();
    if !bounds.contains(start) {
        return zone;
    }
    let mut seen: HashSet<Point> = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start);
    queue.push_back(start);
    while let Some(pt) = queue.pop_front() {
        if !is_valid(pt) {
            zone.border.push(pt);
            continue;
        }
        zone.cells.push(pt);
        for next in pt.neighbors() {
            if bounds.contains(next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    zone
}

// =============================================================================
// Hex lattice
// =============================================================================

/// Centre coordinates of lattice node `(col, row)` at `scale`.
///
/// Columns are `1.5 * scale` apart, rows `sqrt(3) * scale` apart, and odd
/// columns are shifted down by half a row. The origin node sits at
/// `(scale / 2, scale / 2)`.
fn lattice_node(col: i64, row: i64, scale: f64) -> (f64, f64) {
    let row_step = 3f64.sqrt() * scale;
    let shift = if col.rem_euclid(2) == 1 { 0.5 } else { 0.0 };
    (
        0.5 * scale + 1.5 * scale * col as f64,
        0.5 * scale + row_step * (row as f64 + shift),
    )
}

/// Nearest lattice node to `(x, y)`, picked from the four candidates in the
/// two bracketing columns.
pub fn hex_centroid(x: i32, y: i32, scale: i32) -> Point {
    let scale = f64::from(scale.max(1));
    let (fx, fy) = (f64::from(x), f64::from(y));
    let row_step = 3f64.sqrt() * scale;
    let col0 = ((fx - 0.5 * scale) / (1.5 * scale)).floor() as i64;

    let mut best = (f64::MAX, 0.0, 0.0);
    for col in [col0, col0 + 1] {
        let shift = if col.rem_euclid(2) == 1 { 0.5 } else { 0.0 };
        let row0 = ((fy - 0.5 * scale) / row_step - shift).floor() as i64;
        for row in [row0, row0 + 1] {
            let (cx, cy) = lattice_node(col, row, scale);
            let dist = (cx - fx).powi(2) + (cy - fy).powi(2);
            if dist < best.0 {
                best = (dist, cx, cy);
            }
        }
    }
    Point::new(best.1.round() as i32, best.2.round() as i32)
}

pub fn hex_centroid_of(pt: Point, scale: i32) -> Point {
    hex_centroid(pt.x, pt.y, scale)
}

/// Flood fill the hex cell containing `start`. The border holds the
/// neighbouring cells' edge pixels.
pub fn iterate_hex(start: Point, scale: i32, bounds: Rect) -> Zone {
    let centroid = hex_centroid_of(start, scale);
    iterate_zone(start, bounds, |pt| hex_centroid_of(pt, scale) == centroid)
}

/// Every lattice node whose centre lies inside `bounds`.
pub fn hex_lattice(bounds: Rect, scale: i32) -> Vec<Point> {
    let s = f64::from(scale.max(1));
    let row_step = 3f64.sqrt() * s;
    let max_col = (f64::from(bounds.x + bounds.width) / (1.5 * s)).ceil() as i64 + 1;
    let max_row = (f64::from(bounds.y + bounds.height) / row_step).ceil() as i64 + 1;
    let min_col = (f64::from(bounds.x) / (1.5 * s)).floor() as i64 - 1;
    let min_row = (f64::from(bounds.y) / row_step).floor() as i64 - 1;
    let mut nodes = Vec::new();
    for col in min_col..=max_col {
        for row in min_row..=max_row {
            let (cx, cy) = lattice_node(col, row, s);
            let pt = Point::new(cx.round() as i32, cy.round() as i32);
            if bounds.contains(pt) {
                nodes.push(pt);
            }
        }
    }
    nodes
}

// =============================================================================
// Grain
// =============================================================================

/// Spatial grain a pass samples its shaping noise at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Grain {
    /// Every tile samples its own position.
    #[default]
    Pixel,
    /// Every tile samples the centre of its hex cell at this scale.
    Hex(i32),
}

impl Grain {
    /// Position to sample for tile `(x, y)`.
    pub fn anchor(self, x: i32, y: i32) -> Point {
        match self {
            Grain::Pixel => Point::new(x, y),
            Grain::Hex(scale) => hex_centroid(x, y, scale),
        }
    }

    pub fn is_hex(self) -> bool {
        matches!(self, Grain::Hex(_))
    }
}
