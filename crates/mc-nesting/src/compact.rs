//! Within-sheet relocation pass.
//!
//! After a sheet is filled, the topmost carpets are offered a lower
//! collision-free position on a coarse grid. Lowering the packed height
//! keeps the unused area in one contiguous band at the top of the sheet,
//! where the backfill sweep and the cutter can still use it.

use mc_core::carpet::PlacedCarpet;
use mc_core::geometry;
use mc_core::index::ObstacleIndex;

use crate::config::NestingConfig;

/// Relocation grid step.
const RELOCATE_STEP: f64 = 20.0;

/// A move must lower the packed height by at least this much.
const MIN_IMPROVEMENT: f64 = 5.0;

/// How many of the topmost carpets are tried per pass.
const CARPETS_PER_PASS: usize = 3;

/// Relocate carpets on one sheet to lower the packed height. Placement
/// invariants (containment, minimum gap, the canonical transform) are
/// re-checked for every move. Returns the number of relocations applied.
pub fn compact_sheet(
    placed: &mut [PlacedCarpet],
    sheet_w: f64,
    sheet_h: f64,
    config: &NestingConfig,
) -> u32 {
    if placed.len() < 2 {
        return 0;
    }

    let mut moves = 0;
    for _ in 0..config.compaction_passes {
        let mut improved = false;

        // Topmost carpets first; moving them down pays the most.
        let mut indices: Vec<usize> = (0..placed.len()).collect();
        indices.sort_by(|&a, &b| top_of(&placed[b]).total_cmp(&top_of(&placed[a])).then(a.cmp(&b)));

        for &idx in indices.iter().take(CARPETS_PER_PASS) {
            if let Some(relocated) = try_relocate(idx, placed, sheet_w, sheet_h, config) {
                tracing::debug!(
                    "relocated {} to ({:.0}, {:.0})",
                    placed[idx].carpet.filename,
                    relocated.x_offset,
                    relocated.y_offset
                );
                placed[idx] = relocated;
                improved = true;
                moves += 1;
            }
        }

        if !improved {
            break;
        }
    }
    moves
}

fn top_of(placed: &PlacedCarpet) -> f64 {
    placed.bounds().map(|b| b.max().y).unwrap_or(0.0)
}

/// Best strictly-improving position for one carpet against the others, or
/// `None` when no move lowers the packed height by the minimum amount.
fn try_relocate(
    idx: usize,
    placed: &[PlacedCarpet],
    sheet_w: f64,
    sheet_h: f64,
    config: &NestingConfig,
) -> Option<PlacedCarpet> {
    let carpet = &placed[idx];
    let bounds = carpet.bounds()?;
    let (w, h) = (bounds.width(), bounds.height());

    let others = ObstacleIndex::bulk_load(
        placed
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, p)| p.polygon.clone())
            .collect(),
    );
    let current_max = placed.iter().map(top_of).fold(0.0, f64::max);
    let others_max = placed
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != idx)
        .map(|(_, p)| top_of(p))
        .fold(0.0, f64::max);

    let mut best_improvement = MIN_IMPROVEMENT;
    let mut best: Option<PlacedCarpet> = None;

    let mut y = 0.0;
    while y + h <= sheet_h {
        let mut x = 0.0;
        while x + w <= sheet_w {
            let dx = x - bounds.min().x;
            let dy = y - bounds.min().y;
            let test = geometry::translate(&carpet.polygon, dx, dy);
            if geometry::within_sheet(&test, sheet_w, sheet_h, config.boundary_tol_mm)
                && !others.collides_with(&test, config.min_gap_mm)
            {
                let new_max = others_max.max(y + h);
                let improvement = current_max - new_max;
                if improvement > best_improvement {
                    best_improvement = improvement;
                    best = Some(PlacedCarpet::place(
                        carpet.carpet.clone(),
                        carpet.rotation,
                        carpet.x_offset + dx,
                        carpet.y_offset + dy,
                    ));
                }
            }
            x += RELOCATE_STEP;
        }
        y += RELOCATE_STEP;
    }

    best
}
