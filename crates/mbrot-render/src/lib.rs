#![forbid(unsafe_code)]

//! Frame renderer: viewport mapping, escape-time kernel, coloring.
//!
//! # Role in mbrot
//! `mbrot-render` is the thin orchestrator between the pure pieces in
//! `mbrot-core` and the kernel in `mbrot-simd`. For every row of the raster
//! it builds the row's complex coordinates, asks the kernel for iteration
//! counts, and writes the colored pixels into a caller-provided RGBA buffer.
//!
//! # Primary responsibilities
//! - **PixelBuffer**: owned, fixed-size RGBA8 frame.
//! - **FrameRenderer**: fills a buffer (or a count grid) for one viewport.
//! - **RunMode**: interactive versus headless-benchmark frame loops.
//!
//! # How it fits in the system
//! The `mbrot` application owns a `FrameRenderer` and a `PixelBuffer`, calls
//! [`FrameRenderer::render`] once per frame, and hands the buffer to a
//! presenter from `mbrot-backend`. Rendering is synchronous and touches no
//! I/O; with the `tracing` feature each frame is wrapped in a span.

pub mod buffer;
pub mod mode;
pub mod renderer;

pub use buffer::PixelBuffer;
pub use mbrot_simd::Strategy;
pub use mode::RunMode;
pub use renderer::{FrameRenderer, FrameStats, PixelProbe};
