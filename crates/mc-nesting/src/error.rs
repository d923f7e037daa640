use thiserror::Error;

#[derive(Debug, Error)]
pub enum NestingError {
    #[error("invalid nesting configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Core(#[from] mc_core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = NestingError::InvalidConfig("min_gap_mm must be non-negative".into());
        assert!(err.to_string().contains("min_gap_mm"));
    }

    #[test]
    fn test_core_error_passes_through() {
        let core = mc_core::Error::InvalidSheet {
            name: "s".into(),
            reason: "width must be positive".into(),
        };
        let err = NestingError::from(core);
        assert!(err.to_string().contains("width must be positive"));
    }
}
