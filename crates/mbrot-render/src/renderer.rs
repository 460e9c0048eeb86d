//! One frame: rows of coordinates through the kernel into colors.
//!
//! Pixels are produced row-major: `y` ascending, then `x`, then lane index
//! inside a batch. The buffer is borrowed for the duration of one call and
//! every byte of it is overwritten.

use mbrot_core::{ColorMapper, ConfigError, EngineConfig, Rgba, Viewport, ViewportTransform};
use mbrot_simd::{EscapeTimeKernel, RowStats, Strategy};

use crate::buffer::PixelBuffer;

/// Work summary for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Rows rendered.
    pub rows: usize,
    /// Pixels rendered.
    pub pixels: usize,
    /// Pixels that reached the iteration cap.
    pub bounded: usize,
    /// Lane-steps executed by the kernel (see [`mbrot_simd::RowStats::steps`]).
    pub steps: u64,
}

impl FrameStats {
    fn add_row(&mut self, row: RowStats) {
        self.rows += 1;
        self.pixels += row.pixels;
        self.bounded += row.bounded;
        self.steps += row.steps;
    }

    /// Share of pixels presumed inside the set.
    #[must_use]
    pub fn bounded_fraction(&self) -> f64 {
        if self.pixels == 0 {
            0.0
        } else {
            self.bounded as f64 / self.pixels as f64
        }
    }
}

/// Everything known about one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelProbe {
    pub x: usize,
    pub y: usize,
    /// Real part of the pixel's complex coordinate.
    pub cx: f32,
    /// Imaginary part.
    pub cy: f32,
    pub count: u32,
    pub color: Rgba,
}

/// Renders frames for a fixed config and strategy.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    config: EngineConfig,
    kernel: EscapeTimeKernel,
    colors: ColorMapper,
    row_counts: Vec<u32>,
}

impl FrameRenderer {
    /// Create a renderer.
    ///
    /// `strategy` is resolved against the running CPU; check
    /// [`Self::strategy`] for the one actually used.
    ///
    /// # Errors
    /// Returns the first constraint `config` violates.
    pub fn new(config: &EngineConfig, strategy: Strategy) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        Ok(Self {
            kernel: EscapeTimeKernel::new(strategy, config.escape_params()),
            colors: ColorMapper::new(config.n_max),
            row_counts: vec![0; config.length],
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Effective strategy.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.kernel.strategy()
    }

    /// Strategy passed to [`Self::new`].
    #[must_use]
    pub const fn requested_strategy(&self) -> Strategy {
        self.kernel.requested()
    }

    #[must_use]
    pub const fn colors(&self) -> &ColorMapper {
        &self.colors
    }

    /// Fill `buffer` with the frame seen through `viewport`.
    ///
    /// # Panics
    /// Panics if `buffer` is not exactly `width * length * 4` bytes or if
    /// `viewport` has a non-positive scale.
    pub fn render(&mut self, viewport: &Viewport, buffer: &mut [u8]) -> FrameStats {
        assert_eq!(
            buffer.len(),
            self.config.buffer_len(),
            "pixel buffer must be {} bytes",
            self.config.buffer_len()
        );
        let transform = ViewportTransform::new(&self.config, viewport);

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "frame.render",
            strategy = self.kernel.strategy().name(),
            scale = viewport.scale
        );
        #[cfg(feature = "tracing")]
        let _guard = _span.enter();

        let mut stats = FrameStats::default();
        for (y, row) in buffer.chunks_exact_mut(self.config.row_stride()).enumerate() {
            let row_stats = self.kernel.fill_row(
                transform.x0_base(),
                transform.step(),
                transform.cy(y),
                &mut self.row_counts,
            );
            for (pixel, &n) in row.chunks_exact_mut(4).zip(self.row_counts.iter()) {
                self.colors.write(n, pixel);
            }
            stats.add_row(row_stats);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            pixels = stats.pixels,
            bounded = stats.bounded,
            steps = stats.steps,
            "frame rendered"
        );

        stats
    }

    /// [`Self::render`] into an owned buffer.
    ///
    /// # Panics
    /// Panics if `buffer` was not sized for this renderer's config.
    pub fn render_into(&mut self, viewport: &Viewport, buffer: &mut PixelBuffer) -> FrameStats {
        self.render(viewport, buffer.as_bytes_mut())
    }

    /// Fill `counts` (one entry per pixel, row-major) with raw iteration
    /// counts instead of colors.
    ///
    /// # Panics
    /// Panics if `counts` is not exactly `width * length` long or if
    /// `viewport` has a non-positive scale.
    pub fn render_counts(&self, viewport: &Viewport, counts: &mut [u32]) -> FrameStats {
        assert_eq!(
            counts.len(),
            self.config.pixel_count(),
            "count grid must hold {} entries",
            self.config.pixel_count()
        );
        let transform = ViewportTransform::new(&self.config, viewport);
        let mut stats = FrameStats::default();
        for (y, row) in counts.chunks_exact_mut(self.config.length).enumerate() {
            stats.add_row(self.kernel.fill_row(
                transform.x0_base(),
                transform.step(),
                transform.cy(y),
                row,
            ));
        }
        stats
    }

    /// Coordinate, count and color of pixel `(x, y)`.
    ///
    /// # Panics
    /// Panics if the pixel lies outside the raster.
    #[must_use]
    pub fn probe(&self, x: usize, y: usize, viewport: &Viewport) -> PixelProbe {
        assert!(
            x < self.config.length && y < self.config.width,
            "pixel ({x}, {y}) outside {}x{} raster",
            self.config.length,
            self.config.width
        );
        let (cx, cy) = ViewportTransform::new(&self.config, viewport).map(x, y);
        let count = self.kernel.escape_point(cx, cy);
        PixelProbe {
            x,
            y,
            cx,
            cy,
            count,
            color: self.colors.color(count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EngineConfig {
        EngineConfig::default().with_resolution(32, 16)
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig::default().with_resolution(30, 16);
        assert!(matches!(
            FrameRenderer::new(&config, Strategy::Scalar),
            Err(ConfigError::LaneMisaligned { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "pixel buffer must be")]
    fn wrong_buffer_size_panics() {
        let mut renderer = FrameRenderer::new(&small_config(), Strategy::Scalar).unwrap();
        let mut buf = vec![0u8; 10];
        renderer.render(&Viewport::default(), &mut buf);
    }

    #[test]
    #[should_panic(expected = "viewport scale must be positive")]
    fn non_positive_scale_panics() {
        let mut renderer = FrameRenderer::new(&small_config(), Strategy::Scalar).unwrap();
        let mut buf = PixelBuffer::for_config(renderer.config());
        let viewport = Viewport {
            x_shift: 0.0,
            y_shift: 0.0,
            scale: -1.0,
        };
        renderer.render_into(&viewport, &mut buf);
    }

    #[test]
    fn every_pixel_is_opaque() {
        let mut renderer = FrameRenderer::new(&small_config(), Strategy::PortableVector).unwrap();
        let mut buf = PixelBuffer::for_config(renderer.config());
        let stats = renderer.render_into(&Viewport::default(), &mut buf);
        assert_eq!(stats.rows, 16);
        assert_eq!(stats.pixels, 32 * 16);
        assert!(buf.as_bytes().chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn colors_match_counts() {
        let config = small_config();
        let mut renderer = FrameRenderer::new(&config, Strategy::Scalar).unwrap();
        let viewport = Viewport::new(0.3, 0.1, 1.5);
        let mut buf = PixelBuffer::for_config(&config);
        let mut counts = vec![0u32; config.pixel_count()];
        let a = renderer.render_into(&viewport, &mut buf);
        let b = renderer.render_counts(&viewport, &mut counts);
        assert_eq!(a, b);
        for (i, &n) in counts.iter().enumerate() {
            let (x, y) = (i % config.length, i / config.length);
            assert_eq!(buf.pixel(x, y), Some(renderer.colors().color(n)));
        }
    }

    #[test]
    fn probe_agrees_with_grid() {
        let config = small_config();
        let renderer = FrameRenderer::new(&config, Strategy::HardwareVector).unwrap();
        let viewport = Viewport::new(-0.2, 0.05, 0.8);
        let mut counts = vec![0u32; config.pixel_count()];
        renderer.render_counts(&viewport, &mut counts);
        for (x, y) in [(0, 0), (31, 15), (7, 9), (16, 8)] {
            let probe = renderer.probe(x, y, &viewport);
            assert_eq!(probe.count, counts[y * config.length + x], "({x}, {y})");
            assert_eq!(probe.color, renderer.colors().color(probe.count));
        }
    }

    #[test]
    #[should_panic(expected = "outside 32x16 raster")]
    fn probe_out_of_range_panics() {
        let renderer = FrameRenderer::new(&small_config(), Strategy::Scalar).unwrap();
        let _ = renderer.probe(32, 0, &Viewport::default());
    }

    #[test]
    fn bounded_fraction_of_empty_stats() {
        assert_eq!(FrameStats::default().bounded_fraction(), 0.0);
    }

    #[test]
    fn reports_requested_strategy() {
        let renderer = FrameRenderer::new(&small_config(), Strategy::HardwareVector).unwrap();
        assert_eq!(renderer.requested_strategy(), Strategy::HardwareVector);
        assert!(renderer.strategy().is_available());
    }
}
