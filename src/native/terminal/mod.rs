//! Live terminal toolkit built on crossterm.
//!
//! [`TerminalBackend`] keeps its controls in a [`ControlTree`], lays the
//! visible window out with taffy and paints it into a cell [`Canvas`]. Key
//! and mouse input is translated into edits on the focused control plus the
//! trigger that control reports. The `new_headless` constructor runs without
//! a terminal: input is injected and the screen read back as text.

pub mod canvas;
pub mod driver;
pub mod focus;
pub mod geometry;
pub mod input;
pub mod paint;

use std::collections::{HashMap, VecDeque};
use std::io;
use std::thread;
use std::time::Duration;

use canvas::Canvas;
use driver::Driver;
use focus::FocusChain;
use geometry::Region;
use input::{InputEvent, Key, KeyPress, Modifiers};

use super::control::{ControlKind, ControlState, ControlTree};
use super::{Backend, BackendError, GridCell, Handle, NativeEvent, Trigger, WindowEvent};
use crate::descriptor::{Orient, TreeItem, WidgetKind};
use crate::value::Value;
use crate::window::WindowConfig;

/// A toolkit drawing into the terminal.
pub struct TerminalBackend {
    tree: ControlTree,
    /// Terminal output. `None` in headless mode.
    driver: Option<Driver>,
    viewport: (u16, u16),
    /// The frame currently on screen.
    front: Canvas,
    focus: FocusChain,
    /// Injected input, consumed before anything the terminal reports.
    queued: VecDeque<InputEvent>,
    /// The visible window that receives input.
    active: Option<Handle>,
    regions: HashMap<Handle, Region>,
    dirty: bool,
}

impl TerminalBackend {
    /// Attach to the real terminal. Nothing is drawn until a window is shown.
    pub fn new() -> io::Result<Self> {
        let viewport = Driver::terminal_size()?;
        let mut backend = Self::new_headless(viewport.0, viewport.1);
        backend.driver = Some(Driver::new()?);
        Ok(backend)
    }

    /// A backend with no terminal, for tests.
    pub fn new_headless(width: u16, height: u16) -> Self {
        Self {
            tree: ControlTree::new(),
            driver: None,
            viewport: (width, height),
            front: Canvas::new(width, height),
            focus: FocusChain::new(),
            queued: VecDeque::new(),
            active: None,
            regions: HashMap::new(),
            dirty: true,
        }
    }

    pub fn is_headless(&self) -> bool {
        self.driver.is_none()
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    /// Queue input for the next `process_events` call.
    pub fn inject(&mut self, input: InputEvent) {
        self.queued.push_back(input);
    }

    pub fn focused(&self) -> Option<Handle> {
        self.focus.current()
    }

    /// Lay out and paint the active window, returning the screen as text.
    pub fn render_to_string(&mut self) -> String {
        self.compose().to_text()
    }

    // -- rendering ----------------------------------------------------------

    fn compose(&mut self) -> Canvas {
        self.focus.rebuild(&self.tree, self.active);
        let mut canvas = Canvas::new(self.viewport.0, self.viewport.1);
        let Some(root) = self.active else {
            self.regions.clear();
            return canvas;
        };
        self.regions = geometry::compute(&self.tree, root, self.viewport);
        let focused = self.focus.current();
        for handle in self.tree.walk_depth_first(root) {
            if let Some(&region) = self.regions.get(&handle) {
                paint::paint(&mut canvas, &self.tree, handle, region, focused == Some(handle));
            }
        }
        canvas
    }

    fn render(&mut self) -> Result<(), BackendError> {
        let canvas = self.compose();
        if let Some(driver) = self.driver.as_mut().filter(|d| d.is_entered()) {
            driver.apply_updates(&canvas.diff(&self.front))?;
            driver.flush()?;
        }
        self.front = canvas;
        self.dirty = false;
        Ok(())
    }

    // -- input --------------------------------------------------------------

    fn handle_input(&mut self, input: InputEvent, out: &mut Vec<NativeEvent>) {
        let Some(root) = self.active else {
            return;
        };
        self.dirty = true;
        match input {
            InputEvent::Key(press) => self.handle_key(root, press, out),
            InputEvent::Click(click) => self.handle_click(i32::from(click.x), i32::from(click.y), out),
            InputEvent::Resize { width, height } => {
                self.viewport = (width, height);
                out.push(NativeEvent::Window {
                    root,
                    event: WindowEvent::Resize,
                });
            }
            InputEvent::Paste(text) => {
                let Some(focused) = self.focus.current() else {
                    return;
                };
                let mut changed = false;
                if let Ok(control) = self.tree.get_mut(focused) {
                    for ch in text.chars() {
                        changed |= control.state.push_char(ch);
                    }
                }
                if changed {
                    self.report(focused, out);
                }
            }
        }
    }

    fn handle_key(&mut self, root: Handle, press: KeyPress, out: &mut Vec<NativeEvent>) {
        let ctrl = press.modifiers.contains(Modifiers::CTRL);
        match press.key {
            Key::Escape => {
                out.push(NativeEvent::Window {
                    root,
                    event: WindowEvent::Close,
                });
                return;
            }
            Key::Char('c') if ctrl => {
                out.push(NativeEvent::Window {
                    root,
                    event: WindowEvent::Close,
                });
                return;
            }
            Key::Tab => {
                self.focus.focus_next();
                return;
            }
            Key::BackTab => {
                self.focus.focus_previous();
                return;
            }
            _ => {}
        }

        let Some(focused) = self.focus.current() else {
            return;
        };
        let Ok(control) = self.tree.get_mut(focused) else {
            return;
        };
        let is_text = matches!(
            control.state,
            ControlState::TextField { .. } | ControlState::TextArea { .. }
        );
        let changed = match press.key {
            Key::Enter if matches!(control.state, ControlState::TextArea { .. }) => control.state.push_char('\n'),
            Key::Char(ch) if is_text && !ctrl => control.state.push_char(ch),
            Key::Backspace => control.state.pop_char(),
            Key::Up => step(&mut control.state, -1, Orient::Vertical),
            Key::Down => step(&mut control.state, 1, Orient::Vertical),
            Key::Left => step(&mut control.state, -1, Orient::Horizontal),
            Key::Right => step(&mut control.state, 1, Orient::Horizontal),
            Key::Enter | Key::Char(' ') => {
                self.activate(focused, out);
                return;
            }
            _ => false,
        };
        if changed {
            self.report(focused, out);
        }
    }

    fn handle_click(&mut self, x: i32, y: i32, out: &mut Vec<NativeEvent>) {
        let Some(root) = self.active else {
            return;
        };
        // Later controls paint over earlier ones.
        let hit = self.tree.walk_depth_first(root).into_iter().rev().find(|h| {
            self.regions.get(h).is_some_and(|r| r.contains(x, y))
                && self.tree.get(*h).is_ok_and(|c| c.state.is_focusable())
        });
        let Some(hit) = hit else {
            return;
        };
        self.focus.rebuild(&self.tree, self.active);
        self.focus.focus(hit);
        let Some(region) = self.regions.get(&hit).copied() else {
            return;
        };
        let row = (y - region.y).max(0) as usize;
        if let Ok(control) = self.tree.get_mut(hit) {
            match &mut control.state {
                ControlState::ListBox { items, cursor, .. } if !items.is_empty() => {
                    let start = cursor.saturating_sub((region.height.max(1) - 1) as usize);
                    *cursor = (start + row).min(items.len() - 1);
                }
                ControlState::TreeView { items, cursor, .. } => {
                    let len = TreeItem::flatten(items).len();
                    if len > 0 {
                        let start = cursor.saturating_sub((region.height.max(1) - 1) as usize);
                        *cursor = (start + row).min(len - 1);
                    }
                }
                ControlState::TextField { .. } | ControlState::TextArea { .. } | ControlState::Slider { .. } => {
                    return;
                }
                _ => {}
            }
        }
        self.activate(hit, out);
    }

    /// The primary action. Combo boxes cycle through their values.
    fn activate(&mut self, handle: Handle, out: &mut Vec<NativeEvent>) {
        if let Ok(Some(trigger)) = self.tree.activate(handle) {
            out.extend(self.tree.emit(handle, trigger));
        }
    }

    fn report(&self, handle: Handle, out: &mut Vec<NativeEvent>) {
        let trigger = self.tree.get(handle).ok().and_then(|c| c.state.trigger());
        if let Some(event) = trigger.and_then(|t| self.tree.emit(handle, t)) {
            out.push(event);
        }
    }

    fn visible_roots(&self) -> impl Iterator<Item = Handle> + '_ {
        self.tree.roots().iter().copied().filter(|&root| {
            matches!(
                self.tree.get(root).map(|c| &c.state),
                Ok(ControlState::Window { visible: true, .. })
            )
        })
    }

    /// Point input at the most recently shown window, entering or leaving
    /// the alternate screen as windows come and go.
    fn retarget(&mut self) -> Result<(), BackendError> {
        self.active = self.visible_roots().last();
        if let Some(driver) = self.driver.as_mut() {
            if self.active.is_some() {
                driver.enter()?;
            } else {
                driver.leave()?;
            }
        }
        // Force a full repaint on the next frame.
        self.front = Canvas::new(0, 0);
        self.dirty = true;
        Ok(())
    }
}

/// Arrow-key adjustment along `axis`.
fn step(state: &mut ControlState, delta: isize, axis: Orient) -> bool {
    let vertical = axis == Orient::Vertical;
    let along_slider = matches!(state, ControlState::Slider { orient, .. } if *orient == axis);
    match state.kind() {
        ControlKind::Widget(WidgetKind::ListBox) if vertical => state.step_list(delta),
        ControlKind::Widget(WidgetKind::ComboBox) if vertical => state.step_combo(delta),
        ControlKind::Widget(WidgetKind::TreeView) if vertical => state.step_tree(delta),
        ControlKind::Widget(WidgetKind::Slider) if along_slider => state.step_slider(delta),
        _ => false,
    }
}

impl Backend for TerminalBackend {
    fn init_window(&mut self, config: &WindowConfig) -> Result<Handle, BackendError> {
        self.dirty = true;
        Ok(self.tree.insert_root(ControlState::Window {
            title: config.title.clone(),
            visible: false,
            size: config.size,
            resizable: config.resizable,
        }))
    }

    fn create(&mut self, parent: Handle, state: ControlState) -> Result<Handle, BackendError> {
        let container = self.tree.get(parent)?.state.is_container();
        if !container {
            return Err(BackendError::TypeMismatch {
                control: self.tree.get(parent)?.state.name(),
                value: "child control",
            });
        }
        self.dirty = true;
        self.tree.insert_child(parent, state)
    }

    fn place(&mut self, handle: Handle, cell: GridCell) -> Result<(), BackendError> {
        self.dirty = true;
        self.tree.place(handle, cell)
    }

    fn bind(&mut self, handle: Handle, trigger: Trigger) -> Result<(), BackendError> {
        self.tree.bind(handle, trigger)
    }

    fn set_visible(&mut self, root: Handle, visible: bool) -> Result<(), BackendError> {
        match &mut self.tree.get_mut(root)?.state {
            ControlState::Window { visible: v, .. } => *v = visible,
            _ => return Err(BackendError::NotFound("window root".into())),
        }
        self.retarget()
    }

    fn destroy(&mut self, handle: Handle) {
        let was_root = self.tree.roots().contains(&handle);
        self.tree.remove(handle);
        self.regions.remove(&handle);
        self.dirty = true;
        if was_root {
            if let Err(err) = self.retarget() {
                tracing::warn!(%err, "could not restore the terminal");
            }
        }
    }

    fn process_events(&mut self, timeout: Duration) -> Result<Vec<NativeEvent>, BackendError> {
        if self.dirty {
            self.render()?;
        }
        let mut inputs: Vec<InputEvent> = self.queued.drain(..).collect();
        match self.driver.as_mut().filter(|d| d.is_entered()) {
            Some(driver) => {
                let wait = if inputs.is_empty() { timeout } else { Duration::ZERO };
                inputs.extend(driver.read_input(wait)?);
            }
            None if inputs.is_empty() && !timeout.is_zero() => thread::sleep(timeout),
            None => {}
        }

        let mut events = Vec::new();
        self.focus.rebuild(&self.tree, self.active);
        for input in inputs {
            self.handle_input(input, &mut events);
        }
        if self.dirty {
            self.render()?;
        }
        Ok(events)
    }

    fn read(&self, handle: Handle) -> Result<Option<Value>, BackendError> {
        Ok(self.tree.get(handle)?.state.read())
    }

    fn write(&mut self, handle: Handle, value: &Value) -> Result<(), BackendError> {
        self.tree.write(handle, value)?;
        self.dirty = true;
        Ok(())
    }

    fn flush_idle(&mut self) -> Result<(), BackendError> {
        self.render()
    }

    fn root_of(&self, handle: Handle) -> Option<Handle> {
        self.tree.root_of(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{SelectMode, Sticky};

    struct Demo {
        backend: TerminalBackend,
        root: Handle,
        field: Handle,
        button: Handle,
    }

    fn cell(row: usize, column: usize, span: usize) -> GridCell {
        GridCell {
            row,
            column,
            column_span: span,
            sticky: Sticky::W,
        }
    }

    fn demo() -> Demo {
        let mut backend = TerminalBackend::new_headless(30, 6);
        let root = backend.init_window(&WindowConfig::new("Demo")).unwrap();
        let label = backend
            .create(root, ControlState::Label { text: "Name:".into() })
            .unwrap();
        backend.place(label, cell(0, 0, 1)).unwrap();
        let field = backend
            .create(
                root,
                ControlState::TextField {
                    text: "bob".into(),
                    width: Some(5),
                },
            )
            .unwrap();
        backend.place(field, cell(0, 1, 1)).unwrap();
        backend.bind(field, Trigger::TextChanged).unwrap();
        let button = backend
            .create(root, ControlState::Button { text: "OK".into() })
            .unwrap();
        backend.place(button, cell(1, 0, 2)).unwrap();
        backend.bind(button, Trigger::Click).unwrap();
        backend.set_visible(root, true).unwrap();
        Demo {
            backend,
            root,
            field,
            button,
        }
    }

    fn tick(backend: &mut TerminalBackend) -> Vec<NativeEvent> {
        backend.process_events(Duration::ZERO).unwrap()
    }

    // ── Rendering ────────────────────────────────────────────────────

    #[test]
    fn renders_the_visible_window() {
        let mut d = demo();
        insta::assert_snapshot!(d.backend.render_to_string(), @r"
        Demo
        Name: [bob  ]
        [ OK ]
        ");
    }

    #[test]
    fn hidden_window_draws_nothing() {
        let mut d = demo();
        d.backend.set_visible(d.root, false).unwrap();
        assert_eq!(d.backend.render_to_string(), "");
    }

    // ── Keyboard ─────────────────────────────────────────────────────

    #[test]
    fn tab_then_typing_edits_the_field() {
        let mut d = demo();
        d.backend.inject(InputEvent::key(Key::Tab));
        d.backend.inject(InputEvent::key(Key::Char('x')));
        let events = tick(&mut d.backend);
        assert_eq!(
            events,
            vec![NativeEvent::Widget {
                handle: d.field,
                trigger: Trigger::TextChanged
            }]
        );
        assert_eq!(d.backend.read(d.field).unwrap(), Some(Value::from("bobx")));
    }

    #[test]
    fn enter_on_button_clicks() {
        let mut d = demo();
        d.backend.inject(InputEvent::key(Key::BackTab));
        d.backend.inject(InputEvent::key(Key::Enter));
        assert_eq!(
            tick(&mut d.backend),
            vec![NativeEvent::Widget {
                handle: d.button,
                trigger: Trigger::Click
            }]
        );
    }

    #[test]
    fn escape_and_ctrl_c_close() {
        let mut d = demo();
        d.backend.inject(InputEvent::key(Key::Escape));
        d.backend.inject(InputEvent::ctrl('c'));
        let close = NativeEvent::Window {
            root: d.root,
            event: WindowEvent::Close,
        };
        assert_eq!(tick(&mut d.backend), vec![close, close]);
    }

    #[test]
    fn paste_reports_once() {
        let mut d = demo();
        d.backend.inject(InputEvent::key(Key::Tab));
        d.backend.inject(InputEvent::Paste("by".into()));
        assert_eq!(tick(&mut d.backend).len(), 1);
        assert_eq!(d.backend.read(d.field).unwrap(), Some(Value::from("bobby")));
    }

    #[test]
    fn arrows_move_list_selection() {
        let mut backend = TerminalBackend::new_headless(20, 6);
        let root = backend.init_window(&WindowConfig::new("L")).unwrap();
        let list = backend
            .create(
                root,
                ControlState::ListBox {
                    items: vec!["a".into(), "b".into()],
                    selection: Vec::new(),
                    mode: SelectMode::Browse,
                    cursor: 0,
                    height: None,
                },
            )
            .unwrap();
        backend.place(list, cell(0, 0, 1)).unwrap();
        backend.bind(list, Trigger::ListboxSelectionChanged).unwrap();
        backend.set_visible(root, true).unwrap();
        backend.inject(InputEvent::key(Key::Tab));
        backend.inject(InputEvent::key(Key::Down));
        assert_eq!(tick(&mut backend).len(), 1);
        assert_eq!(backend.read(list).unwrap(), Some(Value::Selection(vec![1])));
    }

    // ── Mouse and resize ─────────────────────────────────────────────

    #[test]
    fn clicking_a_button_focuses_and_clicks_it() {
        let mut d = demo();
        d.backend.render_to_string();
        d.backend.inject(InputEvent::click(2, 2));
        let events = tick(&mut d.backend);
        assert_eq!(
            events,
            vec![NativeEvent::Widget {
                handle: d.button,
                trigger: Trigger::Click
            }]
        );
        assert_eq!(d.backend.focused(), Some(d.button));
    }

    #[test]
    fn resize_reports_window_event() {
        let mut d = demo();
        d.backend.inject(InputEvent::Resize { width: 40, height: 10 });
        assert_eq!(
            tick(&mut d.backend),
            vec![NativeEvent::Window {
                root: d.root,
                event: WindowEvent::Resize
            }]
        );
    }

    #[test]
    fn input_without_visible_window_is_dropped() {
        let mut backend = TerminalBackend::new_headless(10, 4);
        backend.inject(InputEvent::key(Key::Escape));
        assert!(tick(&mut backend).is_empty());
    }

    #[test]
    fn programmatic_write_reports_nothing() {
        let mut d = demo();
        d.backend.write(d.field, &Value::from("alice")).unwrap();
        assert!(tick(&mut d.backend).is_empty());
    }
}
