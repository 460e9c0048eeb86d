//! Engine configuration.
//!
//! Every constant the renderer and controller depend on lives in one
//! immutable [`EngineConfig`] value. Build it with the `with_*` methods and
//! call [`EngineConfig::validate`] once; downstream constructors assume a
//! validated config.
//!
//! Naming follows the raster: `length` is the number of pixels per row
//! (horizontal extent), `width` is the number of rows (vertical extent).

use mbrot_simd::{EscapeParams, LANE_WIDTH, MAX_EXACT_ITERATIONS};

use crate::error::{ConfigError, Result};

/// Immutable engine configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Pixels per row.
    pub length: usize,
    /// Number of rows.
    pub width: usize,
    /// Iteration cap.
    pub n_max: u32,
    /// Squared escape radius.
    pub r2_max: f32,
    /// Constant added to every real coordinate.
    pub x_pre_shift: f32,
    /// Constant added to every imaginary coordinate.
    pub y_pre_shift: f32,
    /// Pan distance as a fraction of the current scale.
    pub pan_step: f32,
    /// Zoom factor as a fraction of the current scale.
    pub zoom_step: f32,
}

impl EngineConfig {
    pub const DEFAULT_LENGTH: usize = 400;
    pub const DEFAULT_WIDTH: usize = 200;
    pub const DEFAULT_N_MAX: u32 = EscapeParams::DEFAULT_N_MAX;
    pub const DEFAULT_R2_MAX: f32 = EscapeParams::DEFAULT_R2_MAX;
    /// Centers the default view on the main body of the set.
    pub const DEFAULT_X_PRE_SHIFT: f32 = -1.325;
    pub const DEFAULT_Y_PRE_SHIFT: f32 = 0.0;
    pub const DEFAULT_PAN_STEP: f32 = 0.10;
    pub const DEFAULT_ZOOM_STEP: f32 = 0.10;

    /// Set the raster size.
    #[must_use]
    pub const fn with_resolution(mut self, length: usize, width: usize) -> Self {
        self.length = length;
        self.width = width;
        self
    }

    /// Set the iteration cap.
    #[must_use]
    pub const fn with_n_max(mut self, n_max: u32) -> Self {
        self.n_max = n_max;
        self
    }

    /// Set the squared escape radius.
    #[must_use]
    pub const fn with_r2_max(mut self, r2_max: f32) -> Self {
        self.r2_max = r2_max;
        self
    }

    /// Set the constant offsets applied after scaling.
    #[must_use]
    pub const fn with_pre_shift(mut self, x: f32, y: f32) -> Self {
        self.x_pre_shift = x;
        self.y_pre_shift = y;
        self
    }

    /// Set the pan step.
    #[must_use]
    pub const fn with_pan_step(mut self, pan_step: f32) -> Self {
        self.pan_step = pan_step;
        self
    }

    /// Set the zoom step.
    #[must_use]
    pub const fn with_zoom_step(mut self, zoom_step: f32) -> Self {
        self.zoom_step = zoom_step;
        self
    }

    /// Check every constraint and return the config unchanged if it holds.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(self) -> Result<Self> {
        if self.length == 0 || self.width == 0 {
            return Err(ConfigError::ZeroResolution {
                length: self.length,
                width: self.width,
            });
        }
        if self.length % LANE_WIDTH != 0 {
            return Err(ConfigError::LaneMisaligned {
                length: self.length,
                lane_width: LANE_WIDTH,
            });
        }
        if !(1..=MAX_EXACT_ITERATIONS).contains(&self.n_max) {
            return Err(ConfigError::IterationCap {
                n_max: self.n_max,
                max: MAX_EXACT_ITERATIONS,
            });
        }
        if !(self.r2_max.is_finite() && self.r2_max > 0.0) {
            return Err(ConfigError::EscapeRadius {
                r2_max: self.r2_max,
            });
        }
        for (field, value) in [
            ("x_pre_shift", self.x_pre_shift),
            ("y_pre_shift", self.y_pre_shift),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        if !(self.pan_step.is_finite() && self.pan_step > 0.0) {
            return Err(ConfigError::PanStep {
                value: self.pan_step,
            });
        }
        if !(self.zoom_step > 0.0 && self.zoom_step < 1.0) {
            return Err(ConfigError::ZoomStep {
                value: self.zoom_step,
            });
        }
        Ok(self)
    }

    /// Kernel parameters derived from this config.
    #[must_use]
    pub fn escape_params(&self) -> EscapeParams {
        EscapeParams::new(self.n_max, self.r2_max)
    }

    /// Number of pixels in a frame.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.length * self.width
    }

    /// Bytes in one RGBA row.
    #[must_use]
    pub const fn row_stride(&self) -> usize {
        self.length * 4
    }

    /// Bytes in one RGBA frame.
    #[must_use]
    pub const fn buffer_len(&self) -> usize {
        self.pixel_count() * 4
    }

    /// Lane batches per row.
    #[must_use]
    pub const fn batches_per_row(&self) -> usize {
        self.length / LANE_WIDTH
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            length: Self::DEFAULT_LENGTH,
            width: Self::DEFAULT_WIDTH,
            n_max: Self::DEFAULT_N_MAX,
            r2_max: Self::DEFAULT_R2_MAX,
            x_pre_shift: Self::DEFAULT_X_PRE_SHIFT,
            y_pre_shift: Self::DEFAULT_Y_PRE_SHIFT,
            pan_step: Self::DEFAULT_PAN_STEP,
            zoom_step: Self::DEFAULT_ZOOM_STEP,
        }
    }
}
