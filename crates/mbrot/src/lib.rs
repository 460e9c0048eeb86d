#![forbid(unsafe_code)]

//! The mbrot application: command line, frame loop and reports.
//!
//! # Role in mbrot
//! This crate wires the pieces together. It validates the engine
//! configuration from the command line, builds a [`FrameRenderer`] for the
//! requested strategy, picks a backend for the run mode and drives the
//! [`Program`] frame loop until the frame budget is spent or the user quits.
//!
//! # How it fits in the system
//! - `mbrot run` drives a crossterm terminal session (feature `terminal`).
//! - `mbrot bench` renders headless frames and prints a [`BenchReport`].
//! - `mbrot probe` reports one pixel as a [`ProbeReport`].
//!
//! [`FrameRenderer`]: mbrot_render::FrameRenderer

pub mod cli;
pub mod error;
pub mod logging;
pub mod program;
pub mod report;

pub use cli::{Cli, Commands, execute, run, run_from_env};
pub use error::{AppError, Result};
pub use program::{Program, RunSummary};
pub use report::{BenchReport, ProbeReport};
