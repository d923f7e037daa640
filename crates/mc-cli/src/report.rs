//! Serializable run reports.
//!
//! The placement records are the contract with the DXF-writer collaborator:
//! it applies `translate(rotate(original, rotation_deg, about centroid),
//! x_offset_mm, y_offset_mm)` to the source entities, the same transform the
//! engine collision-checked.

use mc_core::carpet::{Carpet, PlacedCarpet};
use mc_core::sheet::Layout;
use mc_nesting::{ScheduleOutcome, ScheduleSummary};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub summary: ScheduleSummary,
    pub layouts: Vec<LayoutReport>,
    pub placements: Vec<PlacementRecord>,
    pub unplaced: Vec<UnplacedRecord>,
}

#[derive(Debug, Serialize)]
pub struct LayoutReport {
    pub sheet_number: u32,
    pub sheet_name: String,
    pub width_mm: f64,
    pub height_mm: f64,
    pub color: String,
    pub usage_percent: f64,
    pub orders: Vec<String>,
    pub carpets: Vec<PlacementRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementRecord {
    pub carpet_id: u32,
    pub filename: String,
    pub x_offset_mm: f64,
    pub y_offset_mm: f64,
    pub rotation_deg: f64,
    pub sheet_number: u32,
}

#[derive(Debug, Serialize)]
pub struct UnplacedRecord {
    pub carpet_id: u32,
    pub filename: String,
    pub color: String,
    pub order: String,
    pub priority: u8,
}

impl PlacementRecord {
    fn new(placed: &PlacedCarpet, sheet_number: u32) -> Self {
        Self {
            carpet_id: placed.carpet.carpet_id.0,
            filename: placed.carpet.filename.clone(),
            x_offset_mm: placed.x_offset,
            y_offset_mm: placed.y_offset,
            rotation_deg: placed.rotation.degrees(),
            sheet_number,
        }
    }
}

impl LayoutReport {
    fn new(layout: &Layout) -> Self {
        Self {
            sheet_number: layout.sheet_number,
            sheet_name: layout.sheet_name.clone(),
            width_mm: layout.width_mm,
            height_mm: layout.height_mm,
            color: layout.color.clone(),
            usage_percent: layout.usage_percent,
            orders: layout.orders_on_sheet.iter().cloned().collect(),
            carpets: layout
                .placed
                .iter()
                .map(|p| PlacementRecord::new(p, layout.sheet_number))
                .collect(),
        }
    }
}

impl UnplacedRecord {
    fn new(carpet: &Carpet) -> Self {
        Self {
            carpet_id: carpet.carpet_id.0,
            filename: carpet.filename.clone(),
            color: carpet.color.clone(),
            order: carpet.order_id.clone(),
            priority: carpet.priority.level(),
        }
    }
}

impl PlanReport {
    pub fn from_outcome(outcome: &ScheduleOutcome) -> Self {
        let layouts: Vec<LayoutReport> = outcome.layouts.iter().map(LayoutReport::new).collect();
        let placements: Vec<PlacementRecord> = layouts
            .iter()
            .flat_map(|l| l.carpets.iter().cloned())
            .collect();
        Self {
            summary: outcome.summary.clone(),
            layouts,
            placements,
            unplaced: outcome.unplaced.iter().map(UnplacedRecord::new).collect(),
        }
    }
}
