//! Polygon kernel for the packing engine.
//!
//! All coordinates are f64 millimeters. Rotation is restricted to right
//! angles and computed by exact coordinate swaps, so a rotated polygon never
//! accumulates trigonometric drift relative to the DXF writer downstream.

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{
    Area, BooleanOps, BoundingRect, Centroid, Contains, Coord, EuclideanDistance, Intersects,
    MapCoords, MultiPolygon, Point, Polygon, Rect, Translate,
};

/// A right-angle rotation, the only rotations the cutter supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// All rotations in the order the placer tries them.
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Counter-clockwise angle in degrees, for reporting.
    pub fn degrees(self) -> f64 {
        match self {
            Rotation::R0 => 0.0,
            Rotation::R90 => 90.0,
            Rotation::R180 => 180.0,
            Rotation::R270 => 270.0,
        }
    }
}

/// Axis-aligned bounding box of a polygon. `None` for an empty ring.
pub fn bounds(p: &Polygon<f64>) -> Option<Rect<f64>> {
    p.bounding_rect()
}

pub fn area(p: &Polygon<f64>) -> f64 {
    p.unsigned_area()
}

pub fn centroid(p: &Polygon<f64>) -> Option<Point<f64>> {
    p.centroid()
}

pub fn translate(p: &Polygon<f64>, dx: f64, dy: f64) -> Polygon<f64> {
    p.translate(dx, dy)
}

/// Rotate counter-clockwise about an arbitrary pivot by exact coordinate
/// swap. No trigonometry, so 90-degree steps are bit-reproducible.
pub fn rotate_about(p: &Polygon<f64>, rotation: Rotation, pivot: Coord<f64>) -> Polygon<f64> {
    match rotation {
        Rotation::R0 => p.clone(),
        Rotation::R90 => p.map_coords(|c| Coord {
            x: pivot.x - (c.y - pivot.y),
            y: pivot.y + (c.x - pivot.x),
        }),
        Rotation::R180 => p.map_coords(|c| Coord {
            x: 2.0 * pivot.x - c.x,
            y: 2.0 * pivot.y - c.y,
        }),
        Rotation::R270 => p.map_coords(|c| Coord {
            x: pivot.x + (c.y - pivot.y),
            y: pivot.y - (c.x - pivot.x),
        }),
    }
}

/// Rotate about the polygon's centroid, the canonical pivot shared with the
/// DXF writer. Degenerate rings (no centroid) are rejected at ingest; the
/// origin fallback only exists so pre-validation calls cannot panic.
pub fn rotate_about_centroid(p: &Polygon<f64>, rotation: Rotation) -> Polygon<f64> {
    if rotation == Rotation::R0 {
        return p.clone();
    }
    let pivot = p.centroid().map(|c| c.0).unwrap_or(Coord { x: 0.0, y: 0.0 });
    rotate_about(p, rotation, pivot)
}

pub fn contains_point(p: &Polygon<f64>, x: f64, y: f64) -> bool {
    p.contains(&Point::new(x, y))
}

/// Union of a set of polygons into one (multi-)region.
pub fn union_all(polygons: &[Polygon<f64>]) -> MultiPolygon<f64> {
    let mut iter = polygons.iter();
    let Some(first) = iter.next() else {
        return MultiPolygon::new(Vec::new());
    };
    let mut acc = MultiPolygon::new(vec![first.clone()]);
    for p in iter {
        acc = acc.union(&MultiPolygon::new(vec![p.clone()]));
    }
    acc
}

/// Minimum Euclidean distance between two polygons. Zero when they touch or
/// overlap.
pub fn min_distance(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
    a.euclidean_distance(b)
}

/// True iff `a` and `b` intersect or come closer than `min_gap`.
///
/// With `min_gap > 0` touching counts as a collision. `min_gap <= 0` falls
/// back to strict interior overlap: touching boundaries are allowed and the
/// threshold is a non-sliver intersection area. A non-finite distance is
/// treated as a collision and the position skipped.
pub fn collides(a: &Polygon<f64>, b: &Polygon<f64>, min_gap: f64) -> bool {
    if min_gap <= 0.0 {
        if !a.intersects(b) {
            return false;
        }
        return a.intersection(b).unsigned_area() > 1e-6;
    }
    if a.intersects(b) {
        return true;
    }
    let d = a.euclidean_distance(b);
    if !d.is_finite() {
        tracing::warn!("non-finite polygon distance, treating as collision");
        return true;
    }
    d < min_gap
}

/// True iff the bounding boxes are closer than `gap` in both axes.
pub fn bbox_close(a: &Rect<f64>, b: &Rect<f64>, gap: f64) -> bool {
    if a.max().x + gap < b.min().x {
        return false;
    }
    if b.max().x + gap < a.min().x {
        return false;
    }
    if a.max().y + gap < b.min().y {
        return false;
    }
    if b.max().y + gap < a.min().y {
        return false;
    }
    true
}

/// Distance between two bounding boxes; zero when they overlap.
pub fn bbox_distance(a: &Rect<f64>, b: &Rect<f64>) -> f64 {
    let dx = (a.min().x - b.max().x).max(b.min().x - a.max().x).max(0.0);
    let dy = (a.min().y - b.max().y).max(b.min().y - a.max().y).max(0.0);
    (dx * dx + dy * dy).sqrt()
}

/// True iff the polygon lies within the `[0, width] x [0, height]` sheet
/// rectangle, allowing `tol` of slack on every side.
pub fn within_sheet(p: &Polygon<f64>, width: f64, height: f64, tol: f64) -> bool {
    let Some(b) = p.bounding_rect() else {
        return false;
    };
    b.min().x >= -tol && b.min().y >= -tol && b.max().x <= width + tol && b.max().y <= height + tol
}

/// Validate a polygon as a simple closed region: at least 3 distinct
/// vertices, finite coordinates, positive area, no self-intersecting
/// exterior ring. Returns the reason on failure.
pub fn validate_polygon(p: &Polygon<f64>) -> Result<(), String> {
    let exterior = p.exterior();
    // The closing coordinate repeats the first; don't count it.
    let vertex_count = exterior.0.len().saturating_sub(1);
    if vertex_count < 3 {
        return Err(format!("fewer than 3 vertices ({vertex_count})"));
    }
    for ring in std::iter::once(exterior).chain(p.interiors().iter()) {
        if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err("non-finite coordinate".into());
        }
    }
    if p.unsigned_area() <= 0.0 {
        return Err("zero area".into());
    }
    if ring_self_intersects(exterior) {
        return Err("self-intersecting exterior ring".into());
    }
    Ok(())
}

/// Pairwise segment test over the exterior ring. O(n^2); carpet outlines are
/// small enough that this runs once per carpet at ingest.
fn ring_self_intersects(ring: &geo::LineString<f64>) -> bool {
    let segments: Vec<geo::Line<f64>> = ring.lines().collect();
    let n = segments.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(segments[i], segments[j]) {
                Some(LineIntersection::SinglePoint { is_proper, .. }) => {
                    if is_proper {
                        return true;
                    }
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    // Adjacent collinear segments sharing more than the joint
                    // vertex form a spike folded back on itself.
                    let overlap = (intersection.end.x - intersection.start.x).abs()
                        + (intersection.end.y - intersection.start.y).abs();
                    if !adjacent || overlap > 1e-9 {
                        return true;
                    }
                }
                None => {}
            }
        }
    }
    false
}
