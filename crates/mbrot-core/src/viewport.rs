//! View state and the pixel-to-plane mapping.
//!
//! With `dx = 1 / length` and `dy = 1 / width`:
//!
//! ```text
//! x0_base = (-(length / 2) * dx) * scale + x_shift + x_pre_shift
//! cx(x)   = x0_base + x * (dx * scale)
//! cy(y)   = ((y - width / 2) * dy) * scale + y_shift + y_pre_shift
//! ```
//!
//! Every term is evaluated in `f32` in exactly this order, so the kernel's
//! lane coordinates and the scalar coordinates agree bit for bit. The column
//! term groups as `x * (dx * scale)`, not `(x * dx) * scale`: the spacing is
//! rounded once per frame and every strategy multiplies by that one value.

use mbrot_simd::pixel_cx;

use crate::config::EngineConfig;
use crate::error::{ConfigError, Result};

/// Pan and zoom state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x_shift: f32,
    pub y_shift: f32,
    /// Multiplier on the pixel spacing; larger values show more of the plane.
    pub scale: f32,
}

impl Viewport {
    /// Create a viewport.
    ///
    /// # Panics
    /// Panics if a shift is not finite or `scale` is not positive and finite.
    #[must_use]
    pub fn new(x_shift: f32, y_shift: f32, scale: f32) -> Self {
        match Self::try_new(x_shift, y_shift, scale) {
            Ok(viewport) => viewport,
            Err(err) => panic!("invalid viewport: {err}"),
        }
    }

    /// Create a viewport, reporting invalid values instead of panicking.
    ///
    /// # Errors
    /// Returns [`ConfigError::NonFinite`] for a non-finite shift and
    /// [`ConfigError::Scale`] for a scale that is not positive and finite.
    pub fn try_new(x_shift: f32, y_shift: f32, scale: f32) -> Result<Self> {
        for (field, value) in [("x_shift", x_shift), ("y_shift", y_shift)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ConfigError::Scale { scale });
        }
        Ok(Self {
            x_shift,
            y_shift,
            scale,
        })
    }

    /// Whether every field satisfies the viewport invariants.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x_shift.is_finite()
            && self.y_shift.is_finite()
            && self.scale.is_finite()
            && self.scale > 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x_shift: 0.0,
            y_shift: 0.0,
            scale: 1.0,
        }
    }
}

/// Pixel-to-plane mapping for one frame.
///
/// Built once per frame from the config and the current viewport; every
/// accessor is a pure function of the pixel index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    x0_base: f32,
    step: f32,
    dy: f32,
    half_width: f32,
    scale: f32,
    y_offset: f32,
    y_pre_shift: f32,
}

impl ViewportTransform {
    /// # Panics
    /// Panics if `viewport` violates its invariants.
    #[must_use]
    pub fn new(config: &EngineConfig, viewport: &Viewport) -> Self {
        assert!(
            viewport.is_valid(),
            "viewport scale must be positive and finite: {viewport:?}"
        );
        let length = config.length as f32;
        let width = config.width as f32;
        let dx = 1.0 / length;
        let dy = 1.0 / width;
        let scale = viewport.scale;
        Self {
            x0_base: ((-length / 2.0) * dx) * scale + viewport.x_shift + config.x_pre_shift,
            step: dx * scale,
            dy,
            half_width: width / 2.0,
            scale,
            y_offset: viewport.y_shift,
            y_pre_shift: config.y_pre_shift,
        }
    }

    /// Real part of column 0.
    #[must_use]
    pub const fn x0_base(&self) -> f32 {
        self.x0_base
    }

    /// Real-axis distance between neighbouring columns.
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    #[must_use]
    pub fn cx(&self, x: usize) -> f32 {
        pixel_cx(self.x0_base, self.step, x)
    }

    #[must_use]
    pub fn cy(&self, y: usize) -> f32 {
        (((y as f32) - self.half_width) * self.dy) * self.scale + self.y_offset + self.y_pre_shift
    }

    /// Complex coordinate `(re, im)` of pixel `(x, y)`.
    #[must_use]
    pub fn map(&self, x: usize, y: usize) -> (f32, f32) {
        (self.cx(x), self.cy(y))
    }
}
