//! Multi-sheet scheduling over the stock inventory.
//!
//! The scheduler walks the inventory first-fit per color while must-place
//! work remains, emits a layout per consumed sheet, then sweeps the emitted
//! layouts least-filled-first to backfill priority-2 carpets. Placement
//! failure is never an error: whatever cannot be placed comes back in
//! `unplaced`.

use std::collections::{BTreeMap, BTreeSet};

use mc_core::carpet::{Carpet, CarpetId, Priority};
use mc_core::sheet::{Layout, SheetSpec};

use crate::compact;
use crate::config::NestingConfig;
use crate::error::NestingError;
use crate::filler::{self, FillContext};
use crate::layout::{self, ScheduleSummary};

/// Sheet-number span each order currently touches. The constraint is
/// `max - min + 1 <= limit`, so an order's carpets land on a narrow band of
/// consecutive-ish sheets and ship together.
#[derive(Debug, Default)]
pub struct OrderRanges {
    spans: BTreeMap<String, (u32, u32)>,
}

impl OrderRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Would placing this order on `sheet` keep its span within `limit`?
    pub fn permits(&self, order_id: &str, sheet: u32, limit: Option<u32>) -> bool {
        let Some(limit) = limit else {
            return true;
        };
        match self.spans.get(order_id) {
            None => limit >= 1,
            Some(&(lo, hi)) => hi.max(sheet) - lo.min(sheet) + 1 <= limit,
        }
    }

    pub fn note(&mut self, order_id: &str, sheet: u32) {
        self.spans
            .entry(order_id.to_string())
            .and_modify(|(lo, hi)| {
                *lo = (*lo).min(sheet);
                *hi = (*hi).max(sheet);
            })
            .or_insert((sheet, sheet));
    }

    pub fn span(&self, order_id: &str) -> Option<(u32, u32)> {
        self.spans.get(order_id).copied()
    }
}

/// Everything a schedule run produces.
#[derive(Debug)]
pub struct ScheduleOutcome {
    pub layouts: Vec<Layout>,
    pub unplaced: Vec<Carpet>,
    pub summary: ScheduleSummary,
}

/// Fail-fast validation of every carpet polygon and sheet spec. Runs before
/// any placement work.
pub fn validate_inputs(carpets: &[Carpet], inventory: &[SheetSpec]) -> Result<(), NestingError> {
    for carpet in carpets {
        carpet.validate()?;
    }
    for spec in inventory {
        spec.validate()?;
    }
    Ok(())
}

/// Schedule without progress reporting.
pub fn schedule(
    carpets: Vec<Carpet>,
    inventory: &mut [SheetSpec],
    config: &NestingConfig,
) -> Result<ScheduleOutcome, NestingError> {
    schedule_with_progress(carpets, inventory, config, None)
}

/// Schedule the whole batch onto the available stock.
///
/// `inventory` order is consumption order; each spec's `used` counter is
/// incremented as its sheets are consumed. The optional callback is invoked
/// synchronously after each filled sheet, between phases, and at completion
/// with 100.
pub fn schedule_with_progress(
    carpets: Vec<Carpet>,
    inventory: &mut [SheetSpec],
    config: &NestingConfig,
    mut progress: Option<&mut dyn FnMut(u32, &str)>,
) -> Result<ScheduleOutcome, NestingError> {
    config.validate()?;
    validate_inputs(&carpets, inventory)?;

    let total = carpets.len();
    report(&mut progress, 0, "input validated");

    // Carpets no available sheet can hold (wrong color or oversize in both
    // orientations) are classified unplaceable up front, consuming nothing.
    let tol = config.boundary_tol_mm;
    let mut pending: Vec<Carpet> = Vec::with_capacity(total);
    let mut unplaced: Vec<Carpet> = Vec::new();
    for carpet in carpets {
        let fits = carpet.bounds().is_some_and(|b| {
            inventory.iter().any(|s| {
                s.is_available()
                    && s.color == carpet.color
                    && s.fits_bbox(b.width(), b.height(), tol)
            })
        });
        if fits {
            pending.push(carpet);
        } else {
            tracing::warn!(
                "no available sheet can hold carpet {} ({})",
                carpet.carpet_id,
                carpet.filename
            );
            unplaced.push(carpet);
        }
    }

    let mut layouts: Vec<Layout> = Vec::new();
    let mut placed_ids: BTreeSet<CarpetId> = BTreeSet::new();
    let mut order_ranges = OrderRanges::new();
    let mut disqualified: BTreeSet<usize> = BTreeSet::new();
    let mut next_sheet: u32 = 1;

    // Colors in order of first appearance keep runs reproducible.
    let mut colors: Vec<String> = Vec::new();
    for carpet in &pending {
        if !colors.iter().any(|c| c == &carpet.color) {
            colors.push(carpet.color.clone());
        }
    }

    for color in &colors {
        loop {
            let must_remain = pending
                .iter()
                .any(|c| &c.color == color && c.priority == Priority::Must);
            if !must_remain {
                break;
            }
            let spec_idx = inventory
                .iter()
                .enumerate()
                .find(|(idx, s)| {
                    !disqualified.contains(idx) && s.is_available() && &s.color == color
                })
                .map(|(idx, _)| idx);
            let Some(spec_idx) = spec_idx else {
                break;
            };

            let (sheet_w, sheet_h) = (inventory[spec_idx].width_mm(), inventory[spec_idx].height_mm());
            let ctx = FillContext {
                prospective_sheet: next_sheet,
                order_ranges: &order_ranges,
            };
            let mut newly = filler::fill_sheet(&pending, sheet_w, sheet_h, color, &[], &ctx, config);
            // The pending list never contains placed ids, but the guard makes
            // double placement structurally impossible.
            newly.retain(|p| !placed_ids.contains(&p.carpet.carpet_id));
            if newly.is_empty() {
                tracing::info!(
                    "sheet type '{}' holds no remaining {} carpet, dropping it",
                    inventory[spec_idx].name,
                    color
                );
                disqualified.insert(spec_idx);
                continue;
            }

            compact::compact_sheet(&mut newly, sheet_w, sheet_h, config);

            for p in &newly {
                placed_ids.insert(p.carpet.carpet_id);
                order_ranges.note(&p.carpet.order_id, next_sheet);
            }
            pending.retain(|c| !placed_ids.contains(&c.carpet_id));
            inventory[spec_idx].used += 1;
            let layout = layout::build_layout(&inventory[spec_idx], next_sheet, newly);
            tracing::info!(
                "sheet {} filled: {} carpets, {:.1}% usage",
                next_sheet,
                layout.placed.len(),
                layout.usage_percent
            );
            layouts.push(layout);

            let percent = if total > 0 {
                (placed_ids.len() * 90 / total) as u32
            } else {
                90
            };
            report(&mut progress, percent, &format!("sheet {next_sheet} filled"));
            next_sheet += 1;
        }
    }

    report(&mut progress, 90, "backfilling priority-2 carpets");

    // Sweep emitted layouts least-filled first; the emptiest sheets have the
    // most room for backfill.
    let mut sweep: Vec<usize> = (0..layouts.len()).collect();
    sweep.sort_by(|&a, &b| {
        layouts[a]
            .usage_percent
            .total_cmp(&layouts[b].usage_percent)
            .then(layouts[a].sheet_number.cmp(&layouts[b].sheet_number))
    });
    for li in sweep {
        let backfill: Vec<Carpet> = pending
            .iter()
            .filter(|c| c.priority == Priority::Backfill && c.color == layouts[li].color)
            .cloned()
            .collect();
        if backfill.is_empty() {
            continue;
        }
        let ctx = FillContext {
            prospective_sheet: layouts[li].sheet_number,
            order_ranges: &order_ranges,
        };
        let mut newly = filler::fill_sheet(
            &backfill,
            layouts[li].width_mm,
            layouts[li].height_mm,
            &layouts[li].color,
            &layouts[li].placed,
            &ctx,
            config,
        );
        newly.retain(|p| !placed_ids.contains(&p.carpet.carpet_id));
        if newly.is_empty() {
            continue;
        }
        for p in &newly {
            placed_ids.insert(p.carpet.carpet_id);
            order_ranges.note(&p.carpet.order_id, layouts[li].sheet_number);
        }
        pending.retain(|c| !placed_ids.contains(&c.carpet_id));
        layouts[li].placed.extend(newly);
        layout::refresh_layout(&mut layouts[li]);
    }

    unplaced.extend(pending);
    unplaced.sort_by_key(|c| c.carpet_id);
    for carpet in &unplaced {
        tracing::warn!(
            "unplaced: carpet {} ({}), priority {}",
            carpet.carpet_id,
            carpet.filename,
            carpet.priority.level()
        );
    }

    let summary = layout::summarize(&layouts, unplaced.len());
    tracing::info!(
        "schedule complete: {} sheets, {} placed, {} unplaced, {:.1}% overall usage",
        summary.sheets_used,
        summary.placed_count,
        summary.unplaced_count,
        summary.overall_usage_percent
    );
    report(&mut progress, 100, "done");

    Ok(ScheduleOutcome {
        layouts,
        unplaced,
        summary,
    })
}

fn report(progress: &mut Option<&mut dyn FnMut(u32, &str)>, percent: u32, status: &str) {
    if let Some(callback) = progress.as_mut() {
        callback(percent, status);
    }
}
