//! Terminal input events, decoupled from crossterm.
//!
//! Crossterm events are converted through `From` impls so the rest of the
//! terminal toolkit (and its headless tests) never touch crossterm types.

use std::ops::BitOr;

use crossterm::event as ct;

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// Anything the toolkit does not act on.
    Other,
}

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);

    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

/// A key press with modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// A left-button press at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Click {
    pub x: u16,
    pub y: u16,
}

/// Input the terminal toolkit reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyPress),
    Click(Click),
    Resize { width: u16, height: u16 },
    Paste(String),
}

impl InputEvent {
    pub fn key(key: Key) -> Self {
        InputEvent::Key(KeyPress::plain(key))
    }

    pub fn ctrl(c: char) -> Self {
        InputEvent::Key(KeyPress::new(Key::Char(c), Modifiers::CTRL))
    }

    pub fn click(x: u16, y: u16) -> Self {
        InputEvent::Click(Click { x, y })
    }
}

// ---------------------------------------------------------------------------
// From<crossterm> conversions
// ---------------------------------------------------------------------------

fn convert_modifiers(m: ct::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if m.contains(ct::KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if m.contains(ct::KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if m.contains(ct::KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    out
}

impl From<ct::KeyEvent> for KeyPress {
    fn from(event: ct::KeyEvent) -> Self {
        let key = match event.code {
            ct::KeyCode::Char(c) => Key::Char(c),
            ct::KeyCode::Enter => Key::Enter,
            ct::KeyCode::Esc => Key::Escape,
            ct::KeyCode::Tab => Key::Tab,
            ct::KeyCode::BackTab => Key::BackTab,
            ct::KeyCode::Backspace => Key::Backspace,
            ct::KeyCode::Delete => Key::Delete,
            ct::KeyCode::Left => Key::Left,
            ct::KeyCode::Right => Key::Right,
            ct::KeyCode::Up => Key::Up,
            ct::KeyCode::Down => Key::Down,
            ct::KeyCode::Home => Key::Home,
            ct::KeyCode::End => Key::End,
            _ => Key::Other,
        };
        KeyPress::new(key, convert_modifiers(event.modifiers))
    }
}

/// Convert a crossterm event, dropping the ones the toolkit ignores
/// (key releases, focus changes, mouse motion).
pub fn from_crossterm(event: ct::Event) -> Option<InputEvent> {
    match event {
        ct::Event::Key(key) if key.kind != ct::KeyEventKind::Release => {
            Some(InputEvent::Key(KeyPress::from(key)))
        }
        ct::Event::Mouse(ct::MouseEvent {
            kind: ct::MouseEventKind::Down(ct::MouseButton::Left),
            column,
            row,
            ..
        }) => Some(InputEvent::click(column, row)),
        ct::Event::Resize(width, height) => Some(InputEvent::Resize { width, height }),
        ct::Event::Paste(text) => Some(InputEvent::Paste(text)),
        _ => None,
    }
}
