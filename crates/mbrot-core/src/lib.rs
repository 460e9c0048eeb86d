#![forbid(unsafe_code)]

//! Core: configuration, viewport math, coloring, and input events.
//!
//! # Role in mbrot
//! `mbrot-core` holds everything around the escape-time kernel that is pure
//! computation and state, with no I/O:
//!
//! - **EngineConfig**: resolution, iteration cap, escape radius, pre-shift and
//!   controller steps, validated once at startup.
//! - **Viewport / ViewportTransform**: pan/zoom state and the pixel to
//!   complex-plane mapping.
//! - **ColorMapper**: iteration count to RGBA.
//! - **Event / ViewportController**: canonical key events and the state
//!   machine that turns key releases into viewport updates.
//!
//! # How it fits in the system
//! `mbrot-render` combines these with the kernel from `mbrot-simd` to fill a
//! pixel buffer. Backends in `mbrot-backend` translate platform input into
//! [`event::Event`] values that the controller consumes between frames.

pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod viewport;

pub use color::{ColorMapper, Rgba};
pub use config::EngineConfig;
pub use controller::{KeyMap, ViewCommand, ViewportController};
pub use error::ConfigError;
pub use viewport::{Viewport, ViewportTransform};
