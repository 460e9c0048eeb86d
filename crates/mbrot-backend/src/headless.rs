//! Headless backend: scripted input, discarded output.
//!
//! Used by the benchmark run mode and by tests that drive the frame loop
//! without a terminal. Nothing here can fail, so the error type is
//! [`Infallible`].

use core::convert::Infallible;
use core::time::Duration;
use std::collections::VecDeque;

use mbrot_core::event::Event;
use mbrot_render::PixelBuffer;

use crate::clock::MonotonicClock;
use crate::{Backend, BackendClock, BackendEventSource, BackendPresenter};

#[derive(Debug, Clone, PartialEq)]
enum Scripted {
    Event(Event),
    /// Answers one poll with "nothing ready".
    Pause,
}

/// Event source that replays a fixed queue.
///
/// A [`pause`](Self::pause) marker makes the next poll report no input, so
/// a script can hand events to a frame loop one drain at a time.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    queue: VecDeque<Scripted>,
    size: (u16, u16),
}

impl ScriptedEvents {
    /// Queue `events`, reporting an output of `size` (columns, rows).
    #[must_use]
    pub fn new(events: impl IntoIterator<Item = Event>, size: (u16, u16)) -> Self {
        Self {
            queue: events.into_iter().map(Scripted::Event).collect(),
            size,
        }
    }

    /// Append an event to the end of the script.
    pub fn push(&mut self, event: Event) {
        self.queue.push_back(Scripted::Event(event));
    }

    /// Append a pause: the poll that reaches it returns `false` and consumes it.
    pub fn pause(&mut self) {
        self.queue.push_back(Scripted::Pause);
    }

    /// Events not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue
            .iter()
            .filter(|item| matches!(item, Scripted::Event(_)))
            .count()
    }
}

impl BackendEventSource for ScriptedEvents {
    type Error = Infallible;

    fn size(&self) -> Result<(u16, u16), Self::Error> {
        Ok(self.size)
    }

    fn poll_event(&mut self, _timeout: Duration) -> Result<bool, Self::Error> {
        match self.queue.front() {
            Some(Scripted::Pause) => {
                self.queue.pop_front();
                Ok(false)
            }
            Some(Scripted::Event(_)) => Ok(true),
            None => Ok(false),
        }
    }

    fn read_event(&mut self) -> Result<Option<Event>, Self::Error> {
        match self.queue.front() {
            Some(Scripted::Event(_)) => match self.queue.pop_front() {
                Some(Scripted::Event(event)) => Ok(Some(event)),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }
}

/// Presenter that counts frames and drops them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscardPresenter {
    presented: u64,
}

impl BackendPresenter for DiscardPresenter {
    type Error = Infallible;

    fn present_frame(&mut self, _frame: &PixelBuffer) -> Result<(), Self::Error> {
        self.presented += 1;
        Ok(())
    }

    fn presented(&self) -> u64 {
        self.presented
    }
}

/// Backend with scripted input and no output.
#[derive(Debug, Clone)]
pub struct HeadlessBackend<C: BackendClock = MonotonicClock> {
    clock: C,
    events: ScriptedEvents,
    presenter: DiscardPresenter,
}

impl HeadlessBackend<MonotonicClock> {
    /// Backend with no scripted events and a wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for HeadlessBackend<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: BackendClock> HeadlessBackend<C> {
    /// Backend with no scripted events and the given clock.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            events: ScriptedEvents::default(),
            presenter: DiscardPresenter::default(),
        }
    }

    /// Replace the scripted events.
    #[must_use]
    pub fn with_events(mut self, events: ScriptedEvents) -> Self {
        self.events = events;
        self
    }

    /// Frames handed to the presenter so far.
    #[must_use]
    pub fn presented(&self) -> u64 {
        self.presenter.presented()
    }
}

impl<C: BackendClock> Backend for HeadlessBackend<C> {
    type Error = Infallible;
    type Clock = C;
    type Events = ScriptedEvents;
    type Presenter = DiscardPresenter;

    fn clock(&self) -> &Self::Clock {
        &self.clock
    }

    fn events(&mut self) -> &mut Self::Events {
        &mut self.events
    }

    fn presenter(&mut self) -> &mut Self::Presenter {
        &mut self.presenter
    }
}
