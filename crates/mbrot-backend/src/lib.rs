#![forbid(unsafe_code)]
#![doc = "Backend traits for mbrot: platform abstraction for input, presentation, and time."]
#![doc = ""]
#![doc = "This crate defines the boundary between the frame loop and whatever shows"]
#![doc = "the pixels: a scripted headless backend for benchmarks and tests, and a"]
#![doc = "crossterm terminal backend behind the `crossterm` feature."]

use core::time::Duration;

use mbrot_core::event::Event;
use mbrot_render::PixelBuffer;

pub mod clock;
pub mod headless;
#[cfg(all(not(target_arch = "wasm32"), feature = "crossterm"))]
pub mod terminal;

pub use clock::{MonotonicClock, StepClock};
pub use headless::{DiscardPresenter, HeadlessBackend, ScriptedEvents};
#[cfg(all(not(target_arch = "wasm32"), feature = "crossterm"))]
pub use terminal::{TerminalBackend, TerminalEvents, TerminalPresenter};

/// Monotonic clock abstraction.
///
/// The frame loop never reads the system clock directly; all timing flows
/// through this trait so benchmark reports can be made deterministic.
pub trait BackendClock {
    /// Returns elapsed time since an unspecified epoch, monotonically increasing.
    fn now_mono(&self) -> Duration;
}

/// Event source abstraction: output size queries and event I/O.
pub trait BackendEventSource {
    /// Platform-specific error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Current output dimensions (columns, rows).
    fn size(&self) -> Result<(u16, u16), Self::Error>;

    /// Poll for an available event, returning `true` if one is ready.
    ///
    /// Must not block longer than `timeout`. Returns `Ok(false)` on timeout.
    fn poll_event(&mut self, timeout: Duration) -> Result<bool, Self::Error>;

    /// Read the next available event, or `None` if none is ready or the
    /// platform event has no canonical counterpart.
    fn read_event(&mut self) -> Result<Option<Event>, Self::Error>;
}

/// Presentation abstraction: puts a finished frame in front of the user.
pub trait BackendPresenter {
    /// Platform-specific error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Present one RGBA frame.
    fn present_frame(&mut self, frame: &PixelBuffer) -> Result<(), Self::Error>;

    /// Frames presented so far.
    fn presented(&self) -> u64;
}

/// Unified backend combining clock, event source, and presenter.
pub trait Backend {
    /// Platform-specific error type shared across sub-traits.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Clock implementation.
    type Clock: BackendClock;

    /// Event source implementation.
    type Events: BackendEventSource<Error = Self::Error>;

    /// Presenter implementation.
    type Presenter: BackendPresenter<Error = Self::Error>;

    /// Access the monotonic clock.
    fn clock(&self) -> &Self::Clock;

    /// Access the event source (mutable for polling/reading).
    fn events(&mut self) -> &mut Self::Events;

    /// Access the presenter (mutable for rendering).
    fn presenter(&mut self) -> &mut Self::Presenter;

    /// Drain every event that is ready right now, without blocking.
    ///
    /// # Errors
    /// Propagates the event source's error.
    fn drain_events(&mut self) -> Result<Vec<Event>, Self::Error> {
        let mut out = Vec::new();
        let events = self.events();
        while events.poll_event(Duration::ZERO)? {
            if let Some(event) = events.read_event()? {
                out.push(event);
            }
        }
        Ok(out)
    }
}
