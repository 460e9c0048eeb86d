//! Key-driven viewport state machine.
//!
//! Only key *releases* move the view. Presses and auto-repeats are ignored,
//! so holding a key produces exactly one transition. Each release is looked
//! up in a [`KeyMap`]; the first binding that matches decides the command
//! and unmatched keys are no-ops.

use crate::config::EngineConfig;
use crate::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use crate::viewport::Viewport;

/// One discrete view change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewCommand {
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    /// Grow the scale by `zoom_step`.
    ZoomIn,
    /// Shrink the scale by `zoom_step`.
    ZoomOut,
}

impl ViewCommand {
    pub const ALL: [ViewCommand; 6] = [
        ViewCommand::PanLeft,
        ViewCommand::PanRight,
        ViewCommand::PanUp,
        ViewCommand::PanDown,
        ViewCommand::ZoomIn,
        ViewCommand::ZoomOut,
    ];

    /// The viewport after this command. Pan distances are proportional to the
    /// current scale.
    #[must_use]
    pub fn apply(self, viewport: Viewport, pan_step: f32, zoom_step: f32) -> Viewport {
        let mut next = viewport;
        let scale = viewport.scale;
        match self {
            Self::PanLeft => next.x_shift -= pan_step * scale,
            Self::PanRight => next.x_shift += pan_step * scale,
            Self::PanUp => next.y_shift -= pan_step * scale,
            Self::PanDown => next.y_shift += pan_step * scale,
            Self::ZoomIn => next.scale += zoom_step * scale,
            Self::ZoomOut => next.scale -= zoom_step * scale,
        }
        next
    }

    /// Short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PanLeft => "pan-left",
            Self::PanRight => "pan-right",
            Self::PanUp => "pan-up",
            Self::PanDown => "pan-down",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
        }
    }
}

/// Ordered key bindings. Character keys match case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: Vec<(KeyCode, ViewCommand)>,
}

impl KeyMap {
    /// A map with no bindings.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Append a binding. Earlier bindings take precedence.
    #[must_use]
    pub fn bind(mut self, code: KeyCode, command: ViewCommand) -> Self {
        self.bindings.push((normalize(code), command));
        self
    }

    #[must_use]
    pub fn bindings(&self) -> &[(KeyCode, ViewCommand)] {
        &self.bindings
    }

    /// The command bound to `code`, if any.
    #[must_use]
    pub fn lookup(&self, code: KeyCode) -> Option<ViewCommand> {
        let code = normalize(code);
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|&(_, command)| command)
    }
}

impl Default for KeyMap {
    /// `a`/`d` pan horizontally, `w`/`s` vertically, Up/Down zoom.
    fn default() -> Self {
        Self::empty()
            .bind(KeyCode::Char('a'), ViewCommand::PanLeft)
            .bind(KeyCode::Char('d'), ViewCommand::PanRight)
            .bind(KeyCode::Char('w'), ViewCommand::PanUp)
            .bind(KeyCode::Char('s'), ViewCommand::PanDown)
            .bind(KeyCode::Up, ViewCommand::ZoomIn)
            .bind(KeyCode::Down, ViewCommand::ZoomOut)
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Owns the viewport between frames.
#[derive(Debug, Clone)]
pub struct ViewportController {
    viewport: Viewport,
    keymap: KeyMap,
    pan_step: f32,
    zoom_step: f32,
    applied: u64,
}

impl ViewportController {
    /// Controller at the default viewport with the default key map.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            viewport: Viewport::default(),
            keymap: KeyMap::default(),
            pan_step: config.pan_step,
            zoom_step: config.zoom_step,
            applied: 0,
        }
    }

    /// # Panics
    /// Panics if `viewport` violates its invariants.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        assert!(viewport.is_valid(), "invalid viewport: {viewport:?}");
        self.viewport = viewport;
        self
    }

    #[must_use]
    pub fn with_keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub const fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Number of transitions applied so far.
    #[must_use]
    pub const fn applied(&self) -> u64 {
        self.applied
    }

    /// Apply `command` unless it would leave the viewport invalid (a scale
    /// that is no longer positive and finite, or a non-finite shift).
    /// Returns whether the viewport changed.
    pub fn apply(&mut self, command: ViewCommand) -> bool {
        let next = command.apply(self.viewport, self.pan_step, self.zoom_step);
        if !next.is_valid() {
            return false;
        }
        self.viewport = next;
        self.applied += 1;
        true
    }

    /// Handle one key event. Returns the command applied, if any.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<ViewCommand> {
        if key.kind != KeyEventKind::Release {
            return None;
        }
        let command = self.keymap.lookup(key.code)?;
        self.apply(command).then_some(command)
    }

    /// Handle any event; non-key events are ignored.
    pub fn handle_event(&mut self, event: &Event) -> Option<ViewCommand> {
        match event {
            Event::Key(key) => self.handle_key(key),
            _ => None,
        }
    }
}
