use serde::{Deserialize, Serialize};

/// Unit system for job inputs. All internal computation uses f64 millimeters;
/// sheet stock is declared in centimeters and converted at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Millimeters,
    Centimeters,
}

impl Unit {
    /// Convert a value from this unit to the other unit.
    pub fn convert_to(self, value: f64, target: Unit) -> f64 {
        match (self, target) {
            (Unit::Centimeters, Unit::Millimeters) => value * 10.0,
            (Unit::Millimeters, Unit::Centimeters) => value / 10.0,
            _ => value,
        }
    }
}

pub fn cm_to_mm(v: f64) -> f64 {
    v * 10.0
}

pub fn mm_to_cm(v: f64) -> f64 {
    v / 10.0
}
