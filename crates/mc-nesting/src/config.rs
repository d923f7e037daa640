use crate::error::NestingError;

/// Configuration for the nesting engine. One explicit struct passed through
/// the whole stack; there is no module-level tuning state.
#[derive(Debug, Clone)]
pub struct NestingConfig {
    /// Minimum clearance between any two placed carpets, millimeters.
    /// Zero disables the clearance and allows touching boundaries.
    pub min_gap_mm: f64,
    /// Slack allowed when testing containment against the sheet rectangle.
    pub boundary_tol_mm: f64,
    /// Cap on candidate positions evaluated per rotation.
    pub max_candidates: usize,
    /// Side of the bottom-left region swept at 1 mm; clamped to a third of
    /// the sheet in each axis.
    pub corner_region_mm: f64,
    /// Edge-grid step for small parts, and the cap for obstacle sweeps.
    pub fine_step_mm: f64,
    /// Edge-grid step for large parts.
    pub coarse_step_mm: f64,
    /// Parts whose larger bounding-box side exceeds this use the coarse step.
    pub coarse_part_threshold_mm: f64,
    /// Skip priority-2 backfill on sheets already fuller than this percent.
    /// Empirical tuning knob, not a contract.
    pub backfill_usage_threshold: f64,
    /// Relocation passes run over each freshly filled sheet to lower its
    /// packed height. Zero disables compaction.
    pub compaction_passes: usize,
    /// Bound on `max(sheet) - min(sheet) + 1` across one order's placements.
    pub max_sheet_range_per_order: Option<u32>,
    /// Log every placement at info instead of debug.
    pub verbose: bool,
}

impl Default for NestingConfig {
    fn default() -> Self {
        Self {
            min_gap_mm: 2.0,
            boundary_tol_mm: 0.1,
            max_candidates: 2000,
            corner_region_mm: 200.0,
            fine_step_mm: 3.0,
            coarse_step_mm: 15.0,
            coarse_part_threshold_mm: 800.0,
            backfill_usage_threshold: 60.0,
            compaction_passes: 3,
            max_sheet_range_per_order: None,
            verbose: false,
        }
    }
}

impl NestingConfig {
    /// Edge-grid step for a part with the given larger bounding-box side.
    pub fn step_size_for(&self, max_side_mm: f64) -> f64 {
        if max_side_mm > self.coarse_part_threshold_mm {
            self.coarse_step_mm
        } else {
            self.fine_step_mm
        }
    }

    pub fn validate(&self) -> Result<(), NestingError> {
        if !self.min_gap_mm.is_finite() || self.min_gap_mm < 0.0 {
            return Err(NestingError::InvalidConfig(
                "min_gap_mm must be non-negative".into(),
            ));
        }
        if !self.boundary_tol_mm.is_finite() || self.boundary_tol_mm < 0.0 {
            return Err(NestingError::InvalidConfig(
                "boundary_tol_mm must be non-negative".into(),
            ));
        }
        if self.max_candidates == 0 {
            return Err(NestingError::InvalidConfig(
                "max_candidates must be positive".into(),
            ));
        }
        if self.fine_step_mm <= 0.0 || self.coarse_step_mm <= 0.0 {
            return Err(NestingError::InvalidConfig(
                "grid steps must be positive".into(),
            ));
        }
        if self.max_sheet_range_per_order == Some(0) {
            return Err(NestingError::InvalidConfig(
                "max_sheet_range_per_order must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(NestingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_step_selection() {
        let config = NestingConfig::default();
        assert_eq!(config.step_size_for(300.0), 3.0);
        assert_eq!(config.step_size_for(1200.0), 15.0);
    }

    #[test]
    fn test_negative_gap_rejected() {
        let config = NestingConfig {
            min_gap_mm: -1.0,
            ..NestingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(NestingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_range_rejected() {
        let config = NestingConfig {
            max_sheet_range_per_order: Some(0),
            ..NestingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
