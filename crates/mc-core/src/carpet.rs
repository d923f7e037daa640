use std::fmt;

use geo::{Area, BoundingRect, Polygon, Rect, Translate};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::{self, Rotation};

/// Unique carpet identity within a run, assigned at ingest. The scheduler
/// tracks placement by id, never by list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CarpetId(pub u32);

impl fmt::Display for CarpetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Placement priority: must-place work vs opportunistic backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Must,
    Backfill,
}

impl Priority {
    /// Parse the numeric level used in job files (1 or 2).
    pub fn from_level(level: u8) -> Option<Priority> {
        match level {
            1 => Some(Priority::Must),
            2 => Some(Priority::Backfill),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Priority::Must => 1,
            Priority::Backfill => 2,
        }
    }
}

/// One part to be cut. Immutable after ingest; coordinates in millimeters.
#[derive(Debug, Clone)]
pub struct Carpet {
    pub polygon: Polygon<f64>,
    /// Opaque identifier linking back to the source DXF file.
    pub filename: String,
    pub color: String,
    pub order_id: String,
    pub priority: Priority,
    pub carpet_id: CarpetId,
}

impl Carpet {
    pub fn new(
        polygon: Polygon<f64>,
        filename: impl Into<String>,
        color: impl Into<String>,
        order_id: impl Into<String>,
        priority: Priority,
        carpet_id: CarpetId,
    ) -> Self {
        Self {
            polygon,
            filename: filename.into(),
            color: color.into(),
            order_id: order_id.into(),
            priority,
            carpet_id,
        }
    }

    /// Fail-fast polygon validation, naming this carpet in the error.
    pub fn validate(&self) -> Result<(), Error> {
        geometry::validate_polygon(&self.polygon).map_err(|reason| Error::InvalidPolygon {
            carpet_id: self.carpet_id,
            reason,
        })
    }

    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.polygon.bounding_rect()
    }
}

/// A carpet plus its placement on a sheet.
///
/// `polygon` is cached but always the product of the one canonical
/// transform: rotate about the original centroid, then translate by the
/// offsets. The DXF writer applies the same transform from the same fields,
/// so what was collision-checked is what gets cut.
#[derive(Debug, Clone)]
pub struct PlacedCarpet {
    pub carpet: Carpet,
    pub x_offset: f64,
    pub y_offset: f64,
    pub rotation: Rotation,
    pub polygon: Polygon<f64>,
}

impl PlacedCarpet {
    pub fn place(carpet: Carpet, rotation: Rotation, x_offset: f64, y_offset: f64) -> Self {
        let polygon =
            geometry::rotate_about_centroid(&carpet.polygon, rotation).translate(x_offset, y_offset);
        Self {
            carpet,
            x_offset,
            y_offset,
            rotation,
            polygon,
        }
    }

    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.polygon.bounding_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;

    fn rect_poly(x: f64, y: f64, w: f64, h: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)]),
            vec![],
        )
    }

    fn carpet(polygon: Polygon<f64>, id: u32) -> Carpet {
        Carpet::new(polygon, "mat.dxf", "black", "A", Priority::Must, CarpetId(id))
    }

    #[test]
    fn test_priority_levels() {
        assert_eq!(Priority::from_level(1), Some(Priority::Must));
        assert_eq!(Priority::from_level(2), Some(Priority::Backfill));
        assert_eq!(Priority::from_level(3), None);
        assert_eq!(Priority::Backfill.level(), 2);
    }

    #[test]
    fn test_validate_names_carpet() {
        let bad = carpet(
            Polygon::new(LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]), vec![]),
            42,
        );
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("carpet 42"));
    }

    #[test]
    fn test_place_applies_canonical_transform() {
        let c = carpet(rect_poly(0.0, 0.0, 400.0, 100.0), 1);
        let placed = PlacedCarpet::place(c, Rotation::R90, 50.0, 30.0);
        let b = placed.bounds().unwrap();
        // Rotation about the centroid (200, 50) maps the bbox to
        // [150, -150]..[250, 250]; the offset shifts it from there.
        assert!((b.min().x - 200.0).abs() < 1e-9);
        assert!((b.min().y - -120.0).abs() < 1e-9);
        assert!((b.width() - 100.0).abs() < 1e-9);
        assert!((b.height() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_placed_polygon_matches_reapplied_transform() {
        // Rebuilding the polygon from the recorded fields must reproduce the
        // cached polygon exactly; this is the writer-drift guard.
        let c = carpet(rect_poly(10.0, 20.0, 300.0, 200.0), 2);
        let placed = PlacedCarpet::place(c.clone(), Rotation::R270, 12.5, 7.25);
        let rebuilt = geometry::rotate_about_centroid(&c.polygon, placed.rotation)
            .translate(placed.x_offset, placed.y_offset);
        for (a, b) in placed
            .polygon
            .exterior()
            .0
            .iter()
            .zip(rebuilt.exterior().0.iter())
        {
            assert!((a.x - b.x).abs() < 1e-9);
            assert!((a.y - b.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_area_preserved_under_placement() {
        let c = carpet(rect_poly(0.0, 0.0, 250.0, 100.0), 3);
        let area = c.area();
        let placed = PlacedCarpet::place(c, Rotation::R180, 100.0, 100.0);
        assert!((placed.area() - area).abs() < 1e-9);
    }
}
