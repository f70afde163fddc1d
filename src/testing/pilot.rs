//! Pilot: programmatic interaction with a headless window.
//!
//! The `Pilot` wraps a [`Window`] over the [`MemoryBackend`] and addresses
//! widgets by key. Simulated user actions queue native events exactly like a
//! real toolkit would; [`poll`](Pilot::poll) then runs the same dispatch and
//! value snapshot a live window does.

use std::time::Duration;

use crate::layout::Layout;
use crate::native::{BackendError, Handle, MemoryBackend, WindowEvent};
use crate::sync::Event;
use crate::value::{Value, ValueMap};
use crate::window::{Window, WindowConfig, WindowError};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless window driver for testing.
///
/// # Examples
///
/// ```ignore
/// use gridwin::prelude::*;
/// use gridwin::testing::Pilot;
///
/// let mut pilot = Pilot::new("W", layout![[TextField::new("abc").key("t1")]]).unwrap();
/// pilot.replace_text("t1", "xyz").unwrap();
/// let (event, values) = pilot.poll();
/// assert_eq!(event.unwrap(), "t1");
/// assert_eq!(values["t1"], Some(Value::from("xyz")));
/// ```
pub struct Pilot {
    window: Window<MemoryBackend>,
}

impl Pilot {
    /// Build and show a window titled `title`.
    pub fn new(title: &str, layout: Layout) -> Result<Self, WindowError> {
        Self::with_config(WindowConfig::new(title).with_hidden(false), layout)
    }

    /// Build a window from an explicit config. Hidden windows stay hidden.
    pub fn with_config(config: WindowConfig, layout: Layout) -> Result<Self, WindowError> {
        Self::with_backend(config, layout, MemoryBackend::new())
    }

    /// Build over a preconfigured backend, e.g. one lacking some kinds.
    pub fn with_backend(config: WindowConfig, layout: Layout, backend: MemoryBackend) -> Result<Self, WindowError> {
        Ok(Self {
            window: Window::new(config, layout, backend)?,
        })
    }

    fn handle(&self, key: &str) -> Result<Handle, BackendError> {
        self.window
            .handle_of(key)
            .ok_or_else(|| BackendError::NotFound(format!("widget `{key}`")))
    }

    fn root(&self) -> Result<Handle, BackendError> {
        self.window
            .root()
            .ok_or_else(|| BackendError::NotFound("window root".into()))
    }

    fn backend(&mut self) -> &mut MemoryBackend {
        self.window.backend_mut()
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Replace a text widget's whole content; reports once.
    pub fn replace_text(&mut self, key: &str, text: &str) -> Result<(), BackendError> {
        let handle = self.handle(key)?;
        self.backend().replace_text(handle, text)
    }

    /// Type into a text widget, one report per character.
    pub fn type_text(&mut self, key: &str, text: &str) -> Result<(), BackendError> {
        let handle = self.handle(key)?;
        self.backend().type_text(handle, text)
    }

    pub fn backspace(&mut self, key: &str, count: usize) -> Result<(), BackendError> {
        let handle = self.handle(key)?;
        self.backend().backspace(handle, count)
    }

    /// Click a button or check box. Radio groups go through
    /// [`choose_radio`](Self::choose_radio).
    pub fn click(&mut self, key: &str) -> Result<(), BackendError> {
        let handle = self.handle(key)?;
        self.backend().click(handle)
    }

    pub fn choose_radio(&mut self, key: &str, index: usize) -> Result<(), BackendError> {
        let handle = self.handle(key)?;
        self.backend().choose_radio(handle, index)
    }

    pub fn select_rows(&mut self, key: &str, rows: &[usize]) -> Result<(), BackendError> {
        let handle = self.handle(key)?;
        self.backend().select_rows(handle, rows)
    }

    /// Pick a combo box entry by index.
    pub fn choose(&mut self, key: &str, index: usize) -> Result<(), BackendError> {
        let handle = self.handle(key)?;
        self.backend().choose(handle, index)
    }

    pub fn drag_slider(&mut self, key: &str, value: f64) -> Result<(), BackendError> {
        let handle = self.handle(key)?;
        self.backend().drag_slider(handle, value)
    }

    pub fn select_tree(&mut self, key: &str, ids: &[&str]) -> Result<(), BackendError> {
        let handle = self.handle(key)?;
        self.backend().select_tree(handle, ids)
    }

    /// A window-manager action such as a resize.
    pub fn window_event(&mut self, event: WindowEvent) -> Result<(), BackendError> {
        let root = self.root()?;
        self.backend().window_event(root, event)
    }

    /// Press the close button.
    pub fn close(&mut self) -> Result<(), BackendError> {
        self.window_event(WindowEvent::Close)
    }

    // ── Processing ───────────────────────────────────────────────────

    /// One non-blocking poll tick.
    pub fn poll(&mut self) -> (Option<Event>, ValueMap) {
        self.window.poll(Duration::ZERO)
    }

    /// Poll and keep only the event key.
    pub fn next_event(&mut self) -> Option<String> {
        self.poll().0.map(|event| event.key().to_owned())
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn window(&self) -> &Window<MemoryBackend> {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut Window<MemoryBackend> {
        &mut self.window
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.window.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.window.set(key, value);
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Button, CheckBox, ComboBox, Label, ListBox, SelectMode, TextField};
    use pretty_assertions::assert_eq;

    fn pilot() -> Pilot {
        Pilot::new(
            "Form",
            crate::layout![
                [Label::new("Name"), TextField::new("").key("name")],
                [CheckBox::new("Subscribe").key("sub")],
                [ListBox::new(["a", "b", "c"]).select_mode(SelectMode::Multiple).key("pick")],
                [ComboBox::new(["x", "y"]).key("combo")],
                [Button::new("OK")],
            ],
        )
        .unwrap()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn new_shows_the_window() {
        let pilot = pilot();
        assert!(pilot.is_open());
        assert!(!pilot.window().is_hidden());
        assert_eq!(pilot.window().title(), "Form");
    }

    #[test]
    fn with_config_keeps_hidden_windows_hidden() {
        let pilot = Pilot::with_config(WindowConfig::new("H"), crate::layout![[Label::new("l")]]).unwrap();
        assert!(pilot.window().is_hidden());
    }

    // ── Input ────────────────────────────────────────────────────────

    #[test]
    fn typing_reports_the_field() {
        let mut pilot = pilot();
        pilot.type_text("name", "ann").unwrap();
        pilot.backspace("name", 1).unwrap();
        let (event, values) = pilot.poll();
        assert_eq!(event.unwrap(), "name");
        assert_eq!(values["name"], Some(Value::from("an")));
    }

    #[test]
    fn unknown_key_is_not_found() {
        let mut pilot = pilot();
        assert!(matches!(pilot.click("missing"), Err(BackendError::NotFound(_))));
    }

    #[test]
    fn every_kind_reports_its_key() {
        let mut pilot = pilot();
        pilot.click("sub").unwrap();
        assert_eq!(pilot.next_event().as_deref(), Some("sub"));
        pilot.select_rows("pick", &[2, 0]).unwrap();
        assert_eq!(pilot.next_event().as_deref(), Some("pick"));
        pilot.choose("combo", 1).unwrap();
        assert_eq!(pilot.next_event().as_deref(), Some("combo"));
        pilot.click("OK").unwrap();
        assert_eq!(pilot.next_event().as_deref(), Some("OK"));

        assert_eq!(pilot.get("sub"), Some(Value::Bool(true)));
        assert_eq!(pilot.get("pick"), Some(Value::Selection(vec![0, 2])));
        assert_eq!(pilot.get("combo"), Some(Value::Index(1)));
    }

    // ── Close ────────────────────────────────────────────────────────

    #[test]
    fn close_once_then_empty() {
        let mut pilot = pilot();
        pilot.close().unwrap();
        assert_eq!(pilot.next_event().as_deref(), Some("--Exit--"));
        assert!(!pilot.is_open());
        assert_eq!(pilot.poll(), (None, ValueMap::new()));
        assert!(pilot.close().is_err());
    }
}
