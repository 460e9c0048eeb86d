//! The frame loop.
//!
//! Each iteration: drain input, stop on a quit request, apply the rest to
//! the controller, clear the buffer, render, then present (interactive) or
//! discard (headless). The viewport only changes between frames and the
//! quit check runs once per frame.

use std::time::Duration;

use mbrot_backend::{Backend, BackendClock, BackendEventSource, BackendPresenter};
use mbrot_core::{Viewport, ViewportController};
use mbrot_render::{FrameRenderer, FrameStats, PixelBuffer, RunMode, Strategy};

use crate::error::{AppError, Result};

/// How long an idle interactive session waits for input before redrawing.
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Outcome of a [`Program::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub mode: RunMode,
    /// Strategy that computed the frames.
    pub strategy: Strategy,
    /// Strategy the user asked for.
    pub requested: Strategy,
    /// Frames rendered.
    pub frames: u64,
    /// Time spent inside the renderer, summed over frames.
    pub render_time: Duration,
    /// Stats of the last frame rendered.
    pub last_frame: FrameStats,
    /// Viewport when the loop ended.
    pub viewport: Viewport,
    /// Controller transitions applied.
    pub commands: u64,
    /// Whether the loop ended on a quit request.
    pub quit: bool,
}

/// Whole microseconds in `duration`, saturating at `u64::MAX`.
#[must_use]
pub fn saturating_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Owns the backend, renderer, controller and pixel buffer for one session.
pub struct Program<B: Backend> {
    backend: B,
    renderer: FrameRenderer,
    controller: ViewportController,
    buffer: PixelBuffer,
    mode: RunMode,
}

impl<B> Program<B>
where
    B: Backend,
    AppError: From<B::Error>,
{
    #[must_use]
    pub fn new(
        backend: B,
        renderer: FrameRenderer,
        controller: ViewportController,
        mode: RunMode,
    ) -> Self {
        let buffer = PixelBuffer::for_config(renderer.config());
        Self {
            backend,
            renderer,
            controller,
            buffer,
            mode,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Run until the mode's frame budget is spent or the user quits.
    ///
    /// # Errors
    /// Propagates backend input and presentation errors.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut frames = 0u64;
        let mut render_time = Duration::ZERO;
        let mut last_frame = FrameStats::default();
        let mut quit = false;

        tracing::info!(
            mode = self.mode.name(),
            strategy = %self.renderer.strategy(),
            frames = ?self.mode.frame_limit(),
            "frame loop started"
        );

        while self.mode.should_continue(frames) {
            if self.apply_input()? {
                quit = true;
                tracing::info!(frames, "quit requested");
                break;
            }

            let viewport = self.controller.viewport();
            self.buffer.clear();
            let start = self.backend.clock().now_mono();
            last_frame = self.renderer.render_into(&viewport, &mut self.buffer);
            render_time += self
                .backend
                .clock()
                .now_mono()
                .saturating_sub(start);
            frames += 1;

            match self.mode {
                RunMode::Interactive => {
                    self.backend.presenter().present_frame(&self.buffer)?;
                    // Block until input arrives (or the idle timeout) instead
                    // of redrawing an unchanged view in a hot loop.
                    self.backend.events().poll_event(IDLE_POLL)?;
                }
                RunMode::Headless { frames: total } => {
                    tracing::debug!(frame = frames, total, "{frames}/{total}");
                }
            }
        }

        let summary = RunSummary {
            mode: self.mode,
            strategy: self.renderer.strategy(),
            requested: self.renderer.requested_strategy(),
            frames,
            render_time,
            last_frame,
            viewport: self.controller.viewport(),
            commands: self.controller.applied(),
            quit,
        };
        tracing::info!(
            frames = summary.frames,
            render_micros = saturating_micros(summary.render_time),
            commands = summary.commands,
            "frame loop finished"
        );
        Ok(summary)
    }

    /// Drain pending input into the controller. Returns `true` on a quit
    /// request; events after it in the same batch are dropped.
    fn apply_input(&mut self) -> Result<bool> {
        for event in self.backend.drain_events()? {
            if event.is_quit() {
                return Ok(true);
            }
            if let Some(command) = self.controller.handle_event(&event) {
                let v = self.controller.viewport();
                tracing::debug!(
                    command = command.label(),
                    x_shift = v.x_shift,
                    y_shift = v.y_shift,
                    scale = v.scale,
                    "viewport updated"
                );
            }
        }
        Ok(false)
    }
}
