#![forbid(unsafe_code)]

//! Terminal backend built on crossterm.
//!
//! The frame is shown with upper-half-block cells (`▀`): the foreground color
//! paints the top half of a cell and the background color the bottom half,
//! so every terminal row carries two pixel rows. The RGBA buffer is scaled
//! to the terminal with nearest-neighbour sampling.
//!
//! # Key releases
//!
//! The viewport controller acts on releases only. Terminals that speak the
//! keyboard enhancement protocol report them natively; for the rest the
//! event source emits a synthetic release immediately after every press.
//!
//! # Cleanup
//!
//! [`TerminalBackend`] restores the terminal in `Drop` (and from a panic
//! hook), leaving features in reverse order of entry.

use core::time::Duration;
use std::io::{self, BufWriter, Stdout, Write};
use std::sync::OnceLock;

use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, queue, terminal};
use mbrot_core::Rgba;
use mbrot_core::event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
use mbrot_render::PixelBuffer;

use crate::clock::MonotonicClock;
use crate::{Backend, BackendEventSource, BackendPresenter};

const UPPER_HALF_BLOCK: char = '▀';

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Crossterm input translated into canonical events.
#[derive(Debug, Default)]
pub struct TerminalEvents {
    synthesize_release: bool,
    pending: Option<Event>,
}

impl TerminalEvents {
    /// `synthesize_release` makes every press be followed by a release.
    #[must_use]
    pub const fn new(synthesize_release: bool) -> Self {
        Self {
            synthesize_release,
            pending: None,
        }
    }

    #[must_use]
    pub const fn synthesizes_release(&self) -> bool {
        self.synthesize_release
    }

    fn accept(&mut self, event: Option<Event>) -> Option<Event> {
        if self.synthesize_release {
            if let Some(Event::Key(key)) = event {
                if key.kind == KeyEventKind::Press {
                    self.pending = Some(Event::Key(key.with_kind(KeyEventKind::Release)));
                }
            }
        }
        event
    }
}

impl BackendEventSource for TerminalEvents {
    type Error = io::Error;

    fn size(&self) -> Result<(u16, u16), Self::Error> {
        terminal::size()
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<bool, Self::Error> {
        if self.pending.is_some() {
            return Ok(true);
        }
        crossterm::event::poll(timeout)
    }

    fn read_event(&mut self) -> Result<Option<Event>, Self::Error> {
        if let Some(event) = self.pending.take() {
            return Ok(Some(event));
        }
        let event = map_event(crossterm::event::read()?);
        Ok(self.accept(event))
    }
}

/// Translate a crossterm event. Events with no canonical counterpart map to
/// `None`.
#[must_use]
pub fn map_event(event: crossterm::event::Event) -> Option<Event> {
    match event {
        crossterm::event::Event::Key(key) => Some(Event::Key(map_key(key))),
        crossterm::event::Event::Resize(width, height) => Some(Event::Resize { width, height }),
        _ => None,
    }
}

fn map_key(key: crossterm::event::KeyEvent) -> KeyEvent {
    use crossterm::event::{KeyCode as Ct, KeyEventKind as CtKind, KeyModifiers};

    let code = match key.code {
        Ct::Char(c) => KeyCode::Char(c),
        Ct::Enter => KeyCode::Enter,
        Ct::Esc => KeyCode::Escape,
        Ct::Up => KeyCode::Up,
        Ct::Down => KeyCode::Down,
        Ct::Left => KeyCode::Left,
        Ct::Right => KeyCode::Right,
        _ => KeyCode::Other,
    };
    let kind = match key.kind {
        CtKind::Press => KeyEventKind::Press,
        CtKind::Repeat => KeyEventKind::Repeat,
        CtKind::Release => KeyEventKind::Release,
    };
    let mut modifiers = Modifiers::NONE;
    for (from, to) in [
        (KeyModifiers::SHIFT, Modifiers::SHIFT),
        (KeyModifiers::ALT, Modifiers::ALT),
        (KeyModifiers::CONTROL, Modifiers::CTRL),
        (KeyModifiers::SUPER, Modifiers::SUPER),
    ] {
        if key.modifiers.contains(from) {
            modifiers |= to;
        }
    }
    KeyEvent::new(code).with_modifiers(modifiers).with_kind(kind)
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Draws frames to stdout as half-block truecolor cells.
#[derive(Debug)]
pub struct TerminalPresenter {
    out: BufWriter<Stdout>,
    presented: u64,
}

impl TerminalPresenter {
    fn new() -> Self {
        Self {
            out: BufWriter::new(io::stdout()),
            presented: 0,
        }
    }
}

impl BackendPresenter for TerminalPresenter {
    type Error = io::Error;

    fn present_frame(&mut self, frame: &PixelBuffer) -> Result<(), Self::Error> {
        let (cols, rows) = terminal::size()?;
        queue!(self.out, terminal::BeginSynchronizedUpdate)?;
        encode_half_blocks(frame, cols, rows, &mut self.out)?;
        queue!(self.out, terminal::EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.presented += 1;
        Ok(())
    }

    fn presented(&self) -> u64 {
        self.presented
    }
}

fn rgb(color: Rgba) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Queue the commands that draw `frame` on a `cols` x `rows` grid.
///
/// Colors are only re-emitted when they change from the previous cell.
///
/// # Errors
/// Propagates write errors from `out`.
pub fn encode_half_blocks(
    frame: &PixelBuffer,
    cols: u16,
    rows: u16,
    out: &mut impl Write,
) -> io::Result<()> {
    if cols == 0 || rows == 0 || frame.length() == 0 || frame.width() == 0 {
        return Ok(());
    }
    let (cols, rows) = (usize::from(cols), usize::from(rows));
    let sub_rows = rows * 2;
    let mut fg: Option<Rgba> = None;
    let mut bg: Option<Rgba> = None;

    for row in 0..rows {
        // `row` < `rows`, which came from a u16.
        queue!(out, cursor::MoveTo(0, row as u16))?;
        let top_y = (2 * row) * frame.width() / sub_rows;
        let bottom_y = (2 * row + 1) * frame.width() / sub_rows;
        for col in 0..cols {
            let x = col * frame.length() / cols;
            let top = frame.pixel(x, top_y).unwrap_or_default();
            let bottom = frame.pixel(x, bottom_y).unwrap_or_default();
            if fg != Some(top) {
                queue!(out, SetForegroundColor(rgb(top)))?;
                fg = Some(top);
            }
            if bg != Some(bottom) {
                queue!(out, SetBackgroundColor(rgb(bottom)))?;
                bg = Some(bottom);
            }
            queue!(out, Print(UPPER_HALF_BLOCK))?;
        }
    }
    queue!(out, ResetColor)
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Interactive terminal session.
///
/// Construction enters raw mode and the alternate screen and hides the
/// cursor; dropping the backend restores all of it.
#[derive(Debug)]
pub struct TerminalBackend {
    clock: MonotonicClock,
    events: TerminalEvents,
    presenter: TerminalPresenter,
    alternate_screen_enabled: bool,
    keyboard_enhanced: bool,
}

impl TerminalBackend {
    /// Take over the terminal.
    ///
    /// # Errors
    /// Returns an error if raw mode or the alternate screen cannot be entered.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        terminal::enable_raw_mode()?;
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode enabled");

        // From here on, an early return drops `backend` and restores the terminal.
        let mut backend = Self {
            clock: MonotonicClock::new(),
            events: TerminalEvents::default(),
            presenter: TerminalPresenter::new(),
            alternate_screen_enabled: false,
            keyboard_enhanced: false,
        };

        let mut stdout = io::stdout();
        crossterm::execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(terminal::ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        backend.alternate_screen_enabled = true;
        #[cfg(feature = "tracing")]
        tracing::info!("alternate screen enabled (with clear)");

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            crossterm::execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            backend.keyboard_enhanced = true;
            #[cfg(feature = "tracing")]
            tracing::info!("keyboard enhancement enabled");
        } else {
            #[cfg(feature = "tracing")]
            tracing::info!("keyboard enhancement unavailable; synthesizing key releases");
        }

        // Windows consoles report releases without the protocol.
        let synthesize = !backend.keyboard_enhanced && !cfg!(windows);
        backend.events = TerminalEvents::new(synthesize);
        Ok(backend)
    }

    /// Whether the terminal reports key releases natively.
    #[must_use]
    pub const fn keyboard_enhanced(&self) -> bool {
        self.keyboard_enhanced
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();

        if self.keyboard_enhanced {
            let _ = crossterm::execute!(stdout, PopKeyboardEnhancementFlags);
            self.keyboard_enhanced = false;
            #[cfg(feature = "tracing")]
            tracing::info!("keyboard enhancement disabled");
        }

        let _ = crossterm::execute!(stdout, ResetColor, cursor::Show);

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            #[cfg(feature = "tracing")]
            tracing::info!("alternate screen disabled");
        }

        let _ = terminal::disable_raw_mode();
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode disabled");

        let _ = stdout.flush();
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl Backend for TerminalBackend {
    type Error = io::Error;
    type Clock = MonotonicClock;
    type Events = TerminalEvents;
    type Presenter = TerminalPresenter;

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

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

/// Restore the terminal on paths that skip `Drop`.
///
/// Call before `std::process::exit`.
pub fn best_effort_cleanup_for_exit() {
    best_effort_cleanup();
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, PopKeyboardEnhancementFlags);
    let _ = crossterm::execute!(stdout, ResetColor, cursor::Show);
    let _ = crossterm::execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}
