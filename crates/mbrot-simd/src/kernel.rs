//! Escape-time iteration kernel.
//!
//! # Canonical semantics
//!
//! ```text
//! z = c ; n = 0
//! while n < n_max:
//!     x2 = re(z)^2 ; y2 = im(z)^2 ; xy = re(z) * im(z)
//!     if x2 + y2 > r2_max: break
//!     z = (x2 - y2 + re(c), xy + xy + im(c))
//!     n += 1
//! return n
//! ```
//!
//! A count is the number of completed recurrence steps: the escape test runs
//! *before* the step, so a point already outside the radius yields 0 and a
//! point that never leaves yields `n_max`. Batched strategies keep a per-lane
//! `active` mask; a lane drops out on the iteration its test fails and the
//! batch ends as soon as the mask is empty.
//!
//! # Pixel coordinates
//!
//! The real part of pixel `x` in a row is `x0_base + (x as f32) * step`.
//! Batched strategies build the same value per lane from the absolute pixel
//! index, so no drift accumulates across a row and every strategy sees
//! bit-identical inputs.

use std::fmt;
use std::str::FromStr;

use crate::lanes::{ArrayLanes, LANE_WIDTH, LaneF32, LaneMask, lane_offsets};

/// Largest cap for which per-lane `f32` counters stay exact.
pub const MAX_EXACT_ITERATIONS: u32 = 1 << 24;

/// Iteration cap and squared escape radius.
///
/// Only constructible through [`EscapeParams::new`] or `Default`, so every
/// kernel runs with a cap the `f32` lane counters can represent exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeParams {
    n_max: u32,
    r2_max: f32,
}

impl EscapeParams {
    /// Default iteration cap.
    pub const DEFAULT_N_MAX: u32 = 256;
    /// Default squared escape radius.
    pub const DEFAULT_R2_MAX: f32 = 10_000.0;

    /// Create parameters.
    ///
    /// # Panics
    /// Panics if `n_max` is 0 or above [`MAX_EXACT_ITERATIONS`], or if
    /// `r2_max` is not a positive finite number.
    #[must_use]
    pub fn new(n_max: u32, r2_max: f32) -> Self {
        assert!(
            (1..=MAX_EXACT_ITERATIONS).contains(&n_max),
            "n_max out of range: {n_max}"
        );
        assert!(
            r2_max.is_finite() && r2_max > 0.0,
            "r2_max must be positive and finite: {r2_max}"
        );
        Self { n_max, r2_max }
    }

    /// Maximum number of recurrence steps per point.
    #[must_use]
    pub const fn n_max(&self) -> u32 {
        self.n_max
    }

    /// Squared escape radius.
    #[must_use]
    pub const fn r2_max(&self) -> f32 {
        self.r2_max
    }
}

impl Default for EscapeParams {
    fn default() -> Self {
        Self {
            n_max: Self::DEFAULT_N_MAX,
            r2_max: Self::DEFAULT_R2_MAX,
        }
    }
}

/// Which implementation computes iteration counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// One pixel per loop.
    Scalar,
    /// [`LANE_WIDTH`] pixels in plain arrays.
    PortableVector,
    /// [`LANE_WIDTH`] pixels in a 256-bit AVX register.
    #[default]
    HardwareVector,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Strategy; 3] = [
        Strategy::Scalar,
        Strategy::PortableVector,
        Strategy::HardwareVector,
    ];

    /// Short name used on the command line and in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::PortableVector => "portable",
            Self::HardwareVector => "hardware",
        }
    }

    /// Whether the strategy can run on this machine.
    #[must_use]
    pub fn is_available(self) -> bool {
        match self {
            Self::Scalar | Self::PortableVector => true,
            Self::HardwareVector => hardware_available(),
        }
    }

    /// The strategy that will actually run: hardware falls back to portable
    /// lanes when the CPU lacks AVX.
    #[must_use]
    pub fn resolve(self) -> Self {
        if self.is_available() {
            self
        } else {
            Self::PortableVector
        }
    }

    /// Whether the strategy processes pixels in lane batches.
    #[must_use]
    pub const fn is_batched(self) -> bool {
        !matches!(self, Self::Scalar)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a strategy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrategyError(pub String);

impl fmt::Display for ParseStrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown strategy `{}` (expected scalar, portable or hardware)",
            self.0
        )
    }
}

impl std::error::Error for ParseStrategyError {}

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scalar" => Ok(Self::Scalar),
            "portable" | "portable-vector" | "array" => Ok(Self::PortableVector),
            "hardware" | "hardware-vector" | "avx" => Ok(Self::HardwareVector),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

/// Result of one lane batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Iteration count per lane.
    pub counts: [u32; LANE_WIDTH],
    /// Escape bitmask: bit `i` set when lane `i` left the radius before the cap.
    pub escaped: u8,
    /// Recurrence steps the batch loop executed.
    pub steps: u32,
}

/// Work summary for one row (or a whole frame, after merging).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowStats {
    /// Pixels computed.
    pub pixels: usize,
    /// Pixels that reached the iteration cap.
    pub bounded: usize,
    /// Lane-steps executed: one per pixel per recurrence step evaluated.
    /// A batch costs `LANE_WIDTH` lane-steps per step even after some of its
    /// lanes escaped, so batched totals are never below the scalar total for
    /// the same row.
    pub steps: u64,
}

impl RowStats {
    /// Accumulate another summary into this one.
    pub fn merge(&mut self, other: RowStats) {
        self.pixels += other.pixels;
        self.bounded += other.bounded;
        self.steps += other.steps;
    }

    fn record_batch(&mut self, outcome: &BatchOutcome, n_max: u32) {
        self.pixels += LANE_WIDTH;
        self.bounded += outcome.counts.iter().filter(|&&n| n == n_max).count();
        self.steps += u64::from(outcome.steps) * LANE_WIDTH as u64;
    }
}

/// Escape-time kernel bound to one strategy.
#[derive(Debug, Clone, Copy)]
pub struct EscapeTimeKernel {
    params: EscapeParams,
    requested: Strategy,
    strategy: Strategy,
}

impl EscapeTimeKernel {
    /// Create a kernel. The effective strategy is `strategy.resolve()`.
    #[must_use]
    pub fn new(strategy: Strategy, params: EscapeParams) -> Self {
        Self {
            params,
            requested: strategy,
            strategy: strategy.resolve(),
        }
    }

    /// Strategy actually used.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Strategy the caller asked for.
    #[must_use]
    pub const fn requested(&self) -> Strategy {
        self.requested
    }

    /// Iteration cap and radius.
    #[must_use]
    pub const fn params(&self) -> EscapeParams {
        self.params
    }

    /// Iteration count for a single point.
    ///
    /// Always evaluated with the scalar loop; batched strategies are
    /// guaranteed to agree with it.
    #[must_use]
    pub fn escape_point(&self, cx: f32, cy: f32) -> u32 {
        escape_scalar(self.params, cx, cy)
    }

    /// Iteration counts for the [`LANE_WIDTH`] pixels starting at column `x`.
    #[must_use]
    pub fn escape_batch(&self, x0_base: f32, step: f32, x: usize, cy: f32) -> BatchOutcome {
        match self.strategy {
            Strategy::Scalar => scalar_batch(self.params, x0_base, step, x, cy),
            Strategy::PortableVector => escape_lanes(
                self.params,
                lane_cx::<ArrayLanes>(x0_base, step, x),
                ArrayLanes::splat(cy),
            ),
            Strategy::HardwareVector => hardware_batch(self.params, x0_base, step, x, cy),
        }
    }

    /// Fill `counts` with the iteration counts of one row.
    ///
    /// Pixel `x` of the row has real part `x0_base + x * step` and imaginary
    /// part `cy`.
    ///
    /// # Panics
    /// Batched strategies panic if `counts.len()` is not a multiple of
    /// [`LANE_WIDTH`].
    pub fn fill_row(&self, x0_base: f32, step: f32, cy: f32, counts: &mut [u32]) -> RowStats {
        if self.strategy.is_batched() {
            assert!(
                counts.len() % LANE_WIDTH == 0,
                "row length {} is not a multiple of the lane width {}",
                counts.len(),
                LANE_WIDTH
            );
        }
        match self.strategy {
            Strategy::Scalar => fill_row_scalar(self.params, x0_base, step, cy, counts),
            Strategy::PortableVector => {
                fill_row_lanes::<ArrayLanes>(self.params, x0_base, step, cy, counts)
            }
            Strategy::HardwareVector => hardware_fill_row(self.params, x0_base, step, cy, counts),
        }
    }
}

/// Real part of pixel `x`.
#[inline(always)]
#[must_use]
pub fn pixel_cx(x0_base: f32, step: f32, x: usize) -> f32 {
    x0_base + (x as f32) * step
}

/// Scalar escape-time loop.
#[inline]
#[must_use]
pub fn escape_scalar(params: EscapeParams, cx: f32, cy: f32) -> u32 {
    let (mut x, mut y) = (cx, cy);
    let mut n = 0;
    while n < params.n_max {
        let x2 = x * x;
        let y2 = y * y;
        let xy = x * y;
        if x2 + y2 > params.r2_max {
            break;
        }
        x = x2 - y2 + cx;
        y = xy + xy + cy;
        n += 1;
    }
    n
}

fn scalar_batch(params: EscapeParams, x0_base: f32, step: f32, x: usize, cy: f32) -> BatchOutcome {
    let mut counts = [0u32; LANE_WIDTH];
    let mut escaped = 0u8;
    for (lane, count) in counts.iter_mut().enumerate() {
        *count = escape_scalar(params, pixel_cx(x0_base, step, x + lane), cy);
        if *count < params.n_max {
            escaped |= 1 << lane;
        }
    }
    let steps = counts.iter().copied().max().unwrap_or(0);
    BatchOutcome {
        counts,
        escaped,
        steps,
    }
}

fn fill_row_scalar(
    params: EscapeParams,
    x0_base: f32,
    step: f32,
    cy: f32,
    counts: &mut [u32],
) -> RowStats {
    let mut stats = RowStats::default();
    for (x, slot) in counts.iter_mut().enumerate() {
        let n = escape_scalar(params, pixel_cx(x0_base, step, x), cy);
        *slot = n;
        stats.pixels += 1;
        stats.bounded += usize::from(n == params.n_max);
        stats.steps += u64::from(n);
    }
    stats
}

/// Lane real parts for the batch starting at column `x`.
#[inline(always)]
pub(crate) fn lane_cx<L: LaneF32>(x0_base: f32, step: f32, x: usize) -> L {
    // Integer-valued floats below 2^24 are exact, so `x + lane` matches the
    // scalar `(x + lane) as f32`.
    let columns = L::splat(x as f32).add(L::from_array(lane_offsets()));
    L::splat(x0_base).add(columns.mul(L::splat(step)))
}

/// Batched escape-time loop, generic over the lane backend.
#[inline(always)]
pub(crate) fn escape_lanes<L: LaneF32>(params: EscapeParams, cx: L, cy: L) -> BatchOutcome {
    let r2_max = L::splat(params.r2_max);
    let one = L::splat(1.0);
    let (mut x, mut y) = (cx, cy);
    let mut counts = L::splat(0.0);
    let mut active = <L::Mask as LaneMask>::all();
    let mut steps = 0;

    while steps < params.n_max {
        let x2 = x.mul(x);
        let y2 = y.mul(y);
        let xy = x.mul(y);
        active = active.and_not(x2.add(y2).gt(r2_max));
        if active.none() {
            break;
        }
        counts = counts.add_masked(active, one);
        x = x2.sub(y2).add(cx);
        y = xy.add(xy).add(cy);
        steps += 1;
    }

    let lanes = counts.to_array();
    let mut out = [0u32; LANE_WIDTH];
    for (slot, &count) in out.iter_mut().zip(lanes.iter()) {
        *slot = count as u32;
    }
    BatchOutcome {
        counts: out,
        escaped: !active.bitmask(),
        steps,
    }
}

#[inline(always)]
pub(crate) fn fill_row_lanes<L: LaneF32>(
    params: EscapeParams,
    x0_base: f32,
    step: f32,
    cy: f32,
    counts: &mut [u32],
) -> RowStats {
    let mut stats = RowStats::default();
    let cy = L::splat(cy);
    for (batch, chunk) in counts.chunks_exact_mut(LANE_WIDTH).enumerate() {
        let outcome = escape_lanes(params, lane_cx::<L>(x0_base, step, batch * LANE_WIDTH), cy);
        chunk.copy_from_slice(&outcome.counts);
        stats.record_batch(&outcome, params.n_max);
    }
    stats
}

#[cfg(target_arch = "x86_64")]
fn hardware_available() -> bool {
    crate::avx::is_available()
}

#[cfg(not(target_arch = "x86_64"))]
fn hardware_available() -> bool {
    false
}

#[cfg(target_arch = "x86_64")]
fn hardware_batch(params: EscapeParams, x0_base: f32, step: f32, x: usize, cy: f32) -> BatchOutcome {
    crate::avx::escape_batch(params, x0_base, step, x, cy)
}

#[cfg(not(target_arch = "x86_64"))]
fn hardware_batch(params: EscapeParams, x0_base: f32, step: f32, x: usize, cy: f32) -> BatchOutcome {
    escape_lanes(
        params,
        lane_cx::<ArrayLanes>(x0_base, step, x),
        ArrayLanes::splat(cy),
    )
}

#[cfg(target_arch = "x86_64")]
fn hardware_fill_row(
    params: EscapeParams,
    x0_base: f32,
    step: f32,
    cy: f32,
    counts: &mut [u32],
) -> RowStats {
    crate::avx::fill_row(params, x0_base, step, cy, counts)
}

#[cfg(not(target_arch = "x86_64"))]
fn hardware_fill_row(
    params: EscapeParams,
    x0_base: f32,
    step: f32,
    cy: f32,
    counts: &mut [u32],
) -> RowStats {
    fill_row_lanes::<ArrayLanes>(params, x0_base, step, cy, counts)
}
