use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// A configuration or viewport value that violates an engine precondition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("resolution must be non-zero (got {length}x{width})")]
    ZeroResolution { length: usize, width: usize },

    #[error("row length {length} is not a multiple of the lane width {lane_width}")]
    LaneMisaligned { length: usize, lane_width: usize },

    #[error("iteration cap {n_max} outside 1..={max}")]
    IterationCap { n_max: u32, max: u32 },

    #[error("escape radius must be positive and finite (got {r2_max})")]
    EscapeRadius { r2_max: f32 },

    #[error("{field} must be finite (got {value})")]
    NonFinite { field: &'static str, value: f32 },

    #[error("pan step must be positive (got {value})")]
    PanStep { value: f32 },

    #[error("zoom step must lie in (0, 1) (got {value})")]
    ZoomStep { value: f32 },

    #[error("viewport scale must be positive and finite (got {scale})")]
    Scale { scale: f32 },
}

#[cfg(test)]
mod tests {
    use super::ConfigError;

    #[test]
    fn lane_misaligned_message_names_both_values() {
        let error = ConfigError::LaneMisaligned {
            length: 401,
            lane_width: 8,
        };
        assert_eq!(
            error.to_string(),
            "row length 401 is not a multiple of the lane width 8"
        );
    }

    #[test]
    fn non_finite_message_names_field() {
        let error = ConfigError::NonFinite {
            field: "x_shift",
            value: f32::NAN,
        };
        assert!(error.to_string().starts_with("x_shift must be finite"));
    }
}
