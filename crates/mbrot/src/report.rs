//! Benchmark and probe reports.

use std::fmt;

use mbrot_render::PixelProbe;
use serde::{Deserialize, Serialize};

use crate::program::{RunSummary, saturating_micros};

/// Result of a headless benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchReport {
    /// Effective strategy.
    pub strategy: String,
    pub requested_strategy: String,
    /// Frames rendered.
    pub frames: u64,
    /// Render time summed over all frames, in microseconds.
    pub total_micros: u64,
    pub micros_per_frame: f64,
    pub pixels_per_frame: usize,
    /// Pixels of the last frame that reached the iteration cap.
    pub bounded_pixels: usize,
}

impl BenchReport {
    #[must_use]
    pub fn from_summary(summary: &RunSummary) -> Self {
        let total_micros = saturating_micros(summary.render_time);
        let micros_per_frame = if summary.frames == 0 {
            0.0
        } else {
            total_micros as f64 / summary.frames as f64
        };
        Self {
            strategy: summary.strategy.name().to_string(),
            requested_strategy: summary.requested.name().to_string(),
            frames: summary.frames,
            total_micros,
            micros_per_frame,
            pixels_per_frame: summary.last_frame.pixels,
            bounded_pixels: summary.last_frame.bounded,
        }
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "strategy: {}, runs: {}, time: {}us, time per run: {:.1}us",
            self.strategy, self.frames, self.total_micros, self.micros_per_frame
        )
    }
}

/// One probed pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub x: usize,
    pub y: usize,
    pub cx: f32,
    pub cy: f32,
    pub count: u32,
    pub n_max: u32,
    /// `[r, g, b, a]`.
    pub rgba: [u8; 4],
}

impl ProbeReport {
    #[must_use]
    pub fn new(probe: &PixelProbe, n_max: u32) -> Self {
        Self {
            x: probe.x,
            y: probe.y,
            cx: probe.cx,
            cy: probe.cy,
            count: probe.count,
            n_max,
            rgba: probe.color.to_bytes(),
        }
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.rgba;
        write!(
            f,
            "pixel ({}, {}) -> c = ({}, {}), count {}/{}, rgba ({r}, {g}, {b}, {a})",
            self.x, self.y, self.cx, self.cy, self.count, self.n_max
        )
    }
}
