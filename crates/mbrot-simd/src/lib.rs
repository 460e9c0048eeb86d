// Unsafe is denied everywhere except the AVX lane backend, which opts in locally.
#![deny(unsafe_code)]

//! Escape-time kernel and its execution strategies.
//!
//! # Role in mbrot
//! `mbrot-simd` owns the only hot loop in the system: counting how many
//! iterations of `z <- z^2 + c` a point survives before `|z|^2` exceeds the
//! escape radius. The same recurrence is evaluated by three interchangeable
//! strategies:
//!
//! - **Scalar**: one pixel at a time.
//! - **PortableVector**: a batch of [`LANE_WIDTH`] pixels held in plain arrays
//!   ([`ArrayLanes`]); autovec-friendly, works on every target.
//! - **HardwareVector**: the same batch in a 256-bit AVX register. Selected at
//!   runtime only when the CPU reports AVX; otherwise the kernel falls back to
//!   the portable lanes.
//!
//! # Equivalence contract
//! Every strategy produces bit-identical iteration counts for identical
//! inputs. Lane coordinates are derived with the same float operations the
//! scalar path uses, and a lane stops counting on the exact iteration the
//! scalar loop would break.
//!
//! # How it fits in the system
//! The crate has no dependencies. `mbrot-render` maps pixels to coordinates,
//! calls [`EscapeTimeKernel::fill_row`] once per row, and colors the result.

pub mod kernel;
pub mod lanes;

#[cfg(target_arch = "x86_64")]
#[allow(unsafe_code)]
mod avx;

pub use kernel::{
    BatchOutcome, EscapeParams, EscapeTimeKernel, MAX_EXACT_ITERATIONS, ParseStrategyError,
    RowStats, Strategy, escape_scalar, pixel_cx,
};
pub use lanes::{ArrayLanes, ArrayMask, LANE_WIDTH, LaneF32, LaneMask, lane_offsets};
