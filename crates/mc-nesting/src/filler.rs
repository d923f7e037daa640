//! Greedy fill of a single sheet.
//!
//! Phase A places must-place carpets, phase B backfills priority-2 carpets
//! into the leftover gaps. Backfill is skipped on sheets already fuller than
//! the high-fill threshold; the remaining gaps are then too small to be
//! worth the search.

use geo::{Area, ConvexHull};
use mc_core::carpet::{Carpet, PlacedCarpet, Priority};
use mc_core::index::ObstacleIndex;

use crate::config::NestingConfig;
use crate::placer;
use crate::scheduler::OrderRanges;

/// Constraints the scheduler imposes on one fill pass.
pub struct FillContext<'a> {
    /// Sheet number the fill is targeting (1-based).
    pub prospective_sheet: u32,
    /// Sheets every order already touches; carpets whose order span would
    /// exceed the configured range on this sheet are withheld.
    pub order_ranges: &'a OrderRanges,
}

/// Fill one sheet from `pending`, honoring color, priority phases, and
/// order-range constraints. `already_placed` seeds the obstacle set when
/// extending an existing layout. Returns the newly placed carpets in
/// placement order; the caller reconciles its pending list against them.
pub fn fill_sheet(
    pending: &[Carpet],
    sheet_w: f64,
    sheet_h: f64,
    sheet_color: &str,
    already_placed: &[PlacedCarpet],
    ctx: &FillContext<'_>,
    config: &NestingConfig,
) -> Vec<PlacedCarpet> {
    let sheet_area = sheet_w * sheet_h;
    let mut index =
        ObstacleIndex::bulk_load(already_placed.iter().map(|p| p.polygon.clone()).collect());
    let mut placed_area: f64 = already_placed.iter().map(PlacedCarpet::area).sum();
    let mut newly: Vec<PlacedCarpet> = Vec::new();

    for priority in [Priority::Must, Priority::Backfill] {
        if priority == Priority::Backfill && sheet_area > 0.0 {
            let usage = placed_area / sheet_area * 100.0;
            if usage > config.backfill_usage_threshold {
                tracing::debug!(
                    "skipping backfill on sheet {} at {:.1}% usage",
                    ctx.prospective_sheet,
                    usage
                );
                break;
            }
        }

        for carpet in eligible(pending, sheet_color, priority, ctx, config) {
            match placer::place(carpet, &index, sheet_w, sheet_h, config) {
                Some(placement) => {
                    placed_area += placement.area();
                    index.push(placement.polygon.clone());
                    if config.verbose {
                        tracing::info!(
                            "placed {} on sheet {} at ({:.1}, {:.1}) rotated {}",
                            carpet.filename,
                            ctx.prospective_sheet,
                            placement.x_offset,
                            placement.y_offset,
                            placement.rotation.degrees()
                        );
                    } else {
                        tracing::debug!(
                            "placed carpet {} on sheet {}",
                            carpet.carpet_id,
                            ctx.prospective_sheet
                        );
                    }
                    newly.push(placement);
                }
                None => {
                    tracing::debug!(
                        "no collision-free position for {} on sheet {}",
                        carpet.filename,
                        ctx.prospective_sheet
                    );
                }
            }
        }
    }

    newly
}

/// Carpets of the matching color and priority whose order-range constraint
/// holds on the prospective sheet, sorted large-and-awkward first: by
/// descending bounding-box area, then by descending difficulty (how far the
/// shape is from its convex hull), so concave shapes try while gaps are
/// still big. Carpet id breaks remaining ties to keep runs reproducible.
fn eligible<'a>(
    pending: &'a [Carpet],
    sheet_color: &str,
    priority: Priority,
    ctx: &FillContext<'_>,
    config: &NestingConfig,
) -> Vec<&'a Carpet> {
    let mut keyed: Vec<(f64, f64, &Carpet)> = pending
        .iter()
        .filter(|c| c.priority == priority && c.color == sheet_color)
        .filter(|c| {
            ctx.order_ranges.permits(
                &c.order_id,
                ctx.prospective_sheet,
                config.max_sheet_range_per_order,
            )
        })
        .map(|c| {
            let bbox_area = c
                .bounds()
                .map(|b| b.width() * b.height())
                .unwrap_or_default();
            let hull_area = c.polygon.convex_hull().unsigned_area();
            let difficulty = if hull_area > 0.0 {
                1.0 - c.area() / hull_area
            } else {
                0.0
            };
            (bbox_area, difficulty, c)
        })
        .collect();
    keyed.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then(b.1.total_cmp(&a.1))
            .then(a.2.carpet_id.cmp(&b.2.carpet_id))
    });
    keyed.into_iter().map(|(_, _, c)| c).collect()
}
