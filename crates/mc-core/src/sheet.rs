use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::carpet::PlacedCarpet;
use crate::error::Error;
use crate::units::cm_to_mm;

/// One stock type: identical rectangular sheets of a single color.
/// Dimensions are declared in centimeters, the unit the stock list uses;
/// `used` is the only mutable stock state and counts consumed sheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSpec {
    pub name: String,
    pub width_cm: f64,
    pub height_cm: f64,
    pub color: String,
    pub count: u32,
    #[serde(default)]
    pub used: u32,
}

impl SheetSpec {
    pub fn width_mm(&self) -> f64 {
        cm_to_mm(self.width_cm)
    }

    pub fn height_mm(&self) -> f64 {
        cm_to_mm(self.height_cm)
    }

    pub fn remaining(&self) -> u32 {
        self.count.saturating_sub(self.used)
    }

    pub fn is_available(&self) -> bool {
        self.remaining() > 0
    }

    /// True iff a part with the given bounding box fits this sheet in at
    /// least one of the two axis orientations.
    pub fn fits_bbox(&self, w_mm: f64, h_mm: f64, tol: f64) -> bool {
        let (sw, sh) = (self.width_mm() + tol, self.height_mm() + tol);
        (w_mm <= sw && h_mm <= sh) || (h_mm <= sw && w_mm <= sh)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.width_cm > 0.0) || !(self.height_cm > 0.0) {
            return Err(Error::InvalidSheet {
                name: self.name.clone(),
                reason: format!(
                    "dimensions must be positive ({} x {} cm)",
                    self.width_cm, self.height_cm
                ),
            });
        }
        if self.used > self.count {
            return Err(Error::InvalidSheet {
                name: self.name.clone(),
                reason: format!("used ({}) exceeds count ({})", self.used, self.count),
            });
        }
        Ok(())
    }
}

/// The emitted record for one consumed sheet. Append-only: once the
/// scheduler emits a layout, only the priority-2 backfill sweep extends it.
#[derive(Debug, Clone)]
pub struct Layout {
    pub sheet_name: String,
    /// 1-based, globally sequential in emission order.
    pub sheet_number: u32,
    pub width_mm: f64,
    pub height_mm: f64,
    pub color: String,
    /// Placed carpets in placement order.
    pub placed: Vec<PlacedCarpet>,
    /// Total placed polygon area over sheet area, as a percentage.
    pub usage_percent: f64,
    pub orders_on_sheet: BTreeSet<String>,
}

impl Layout {
    pub fn sheet_area_mm2(&self) -> f64 {
        self.width_mm * self.height_mm
    }

    pub fn placed_area_mm2(&self) -> f64 {
        self.placed.iter().map(PlacedCarpet::area).sum()
    }
}
