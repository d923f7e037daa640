//! Layout record assembly. The scheduler is the sole emitter; this module
//! just computes the usage metrics and order bookkeeping for a record.

use std::collections::BTreeSet;

use mc_core::carpet::PlacedCarpet;
use mc_core::sheet::{Layout, SheetSpec};
use serde::Serialize;

/// Package one consumed sheet into its emitted record.
pub fn build_layout(spec: &SheetSpec, sheet_number: u32, placed: Vec<PlacedCarpet>) -> Layout {
    let mut layout = Layout {
        sheet_name: spec.name.clone(),
        sheet_number,
        width_mm: spec.width_mm(),
        height_mm: spec.height_mm(),
        color: spec.color.clone(),
        placed,
        usage_percent: 0.0,
        orders_on_sheet: BTreeSet::new(),
    };
    refresh_layout(&mut layout);
    layout
}

/// Recompute usage and the order set after the placed list changed
/// (priority-2 backfill extends layouts in place).
pub fn refresh_layout(layout: &mut Layout) {
    let sheet_area = layout.sheet_area_mm2();
    layout.usage_percent = if sheet_area > 0.0 {
        layout.placed_area_mm2() / sheet_area * 100.0
    } else {
        0.0
    };
    layout.orders_on_sheet = layout
        .placed
        .iter()
        .map(|p| p.carpet.order_id.clone())
        .collect();
}

/// Run-level metrics over all emitted layouts.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSummary {
    pub sheets_used: u32,
    pub placed_count: usize,
    pub unplaced_count: usize,
    /// Total placed area over total consumed sheet area, as a percentage.
    pub overall_usage_percent: f64,
}

pub fn summarize(layouts: &[Layout], unplaced_count: usize) -> ScheduleSummary {
    let placed_count: usize = layouts.iter().map(|l| l.placed.len()).sum();
    let total_sheet_area: f64 = layouts.iter().map(Layout::sheet_area_mm2).sum();
    let total_placed_area: f64 = layouts.iter().map(Layout::placed_area_mm2).sum();
    ScheduleSummary {
        sheets_used: layouts.len() as u32,
        placed_count,
        unplaced_count,
        overall_usage_percent: if total_sheet_area > 0.0 {
            total_placed_area / total_sheet_area * 100.0
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};
    use mc_core::carpet::{Carpet, CarpetId, Priority};
    use mc_core::geometry::Rotation;

    fn placed_square(side_mm: f64, id: u32, order: &str, x: f64, y: f64) -> PlacedCarpet {
        let polygon = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (side_mm, 0.0),
                (side_mm, side_mm),
                (0.0, side_mm),
            ]),
            vec![],
        );
        let carpet = Carpet::new(
            polygon,
            format!("c{id}.dxf"),
            "black",
            order,
            Priority::Must,
            CarpetId(id),
        );
        PlacedCarpet::place(carpet, Rotation::R0, x, y)
    }

    fn spec() -> SheetSpec {
        SheetSpec {
            name: "100x100 black".into(),
            width_cm: 100.0,
            height_cm: 100.0,
            color: "black".into(),
            count: 1,
            used: 0,
        }
    }

    #[test]
    fn test_build_layout_metrics() {
        let layout = build_layout(
            &spec(),
            1,
            vec![
                placed_square(400.0, 1, "A", 0.0, 0.0),
                placed_square(400.0, 2, "B", 500.0, 0.0),
            ],
        );
        assert_eq!(layout.sheet_number, 1);
        assert!((layout.usage_percent - 32.0).abs() < 1e-9);
        let orders: Vec<&String> = layout.orders_on_sheet.iter().collect();
        assert_eq!(orders, vec!["A", "B"]);
    }

    #[test]
    fn test_refresh_after_backfill() {
        let mut layout = build_layout(&spec(), 1, vec![placed_square(400.0, 1, "A", 0.0, 0.0)]);
        assert!((layout.usage_percent - 16.0).abs() < 1e-9);
        layout.placed.push(placed_square(200.0, 2, "C", 500.0, 0.0));
        refresh_layout(&mut layout);
        assert!((layout.usage_percent - 20.0).abs() < 1e-9);
        assert!(layout.orders_on_sheet.contains("C"));
    }

    #[test]
    fn test_summarize() {
        let layouts = vec![
            build_layout(&spec(), 1, vec![placed_square(400.0, 1, "A", 0.0, 0.0)]),
            build_layout(&spec(), 2, vec![placed_square(600.0, 2, "A", 0.0, 0.0)]),
        ];
        let summary = summarize(&layouts, 3);
        assert_eq!(summary.sheets_used, 2);
        assert_eq!(summary.placed_count, 2);
        assert_eq!(summary.unplaced_count, 3);
        // (16% + 36%) over two equal sheets = 26%.
        assert!((summary.overall_usage_percent - 26.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[], 0);
        assert_eq!(summary.sheets_used, 0);
        assert_eq!(summary.overall_usage_percent, 0.0);
    }
}
