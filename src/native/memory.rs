//! Headless in-memory toolkit.
//!
//! [`MemoryBackend`] keeps its controls in a [`ControlTree`] and never draws
//! anything. User actions are simulated through its inherent methods: each
//! one edits the control the way a real toolkit would and queues the bound
//! trigger, which the next `process_events` call hands back.

use std::collections::{HashSet, VecDeque};
use std::thread;
use std::time::Duration;

use super::control::{Control, ControlKind, ControlState, ControlTree};
use super::{Backend, BackendError, GridCell, Handle, NativeEvent, Trigger, WindowEvent};
use crate::descriptor::WidgetKind;
use crate::value::Value;
use crate::window::WindowConfig;

/// A toolkit with no display.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tree: ControlTree,
    pending: VecDeque<NativeEvent>,
    unsupported: HashSet<WidgetKind>,
    failure: Option<String>,
    idle_flushes: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the toolkit has no control for `kind` (builder).
    pub fn without(mut self, kind: WidgetKind) -> Self {
        self.unsupported.insert(kind);
        self
    }

    /// Make the next `process_events` call fail with a toolkit error.
    pub fn fail_next_tick(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    pub fn control(&self, handle: Handle) -> Option<&Control> {
        self.tree.get(handle).ok()
    }

    /// How many times idle work was flushed.
    pub fn idle_flushes(&self) -> usize {
        self.idle_flushes
    }

    /// Events queued for the next tick.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    // -- simulated user actions ---------------------------------------------

    /// Replace the whole content of a text control, as a paste over a
    /// selection would.
    pub fn replace_text(&mut self, handle: Handle, text: &str) -> Result<(), BackendError> {
        let control = self.tree.get_mut(handle)?;
        match &mut control.state {
            ControlState::TextField { text: current, .. } | ControlState::TextArea { text: current, .. } => {
                *current = text.to_owned();
            }
            other => {
                return Err(BackendError::TypeMismatch {
                    control: other.name(),
                    value: "text",
                })
            }
        }
        self.report(handle);
        Ok(())
    }

    /// Type characters one at a time; every keystroke reports.
    pub fn type_text(&mut self, handle: Handle, text: &str) -> Result<(), BackendError> {
        for ch in text.chars() {
            if self.tree.get_mut(handle)?.state.push_char(ch) {
                self.report(handle);
            }
        }
        Ok(())
    }

    /// Press Backspace `count` times.
    pub fn backspace(&mut self, handle: Handle, count: usize) -> Result<(), BackendError> {
        for _ in 0..count {
            if self.tree.get_mut(handle)?.state.pop_char() {
                self.report(handle);
            }
        }
        Ok(())
    }

    /// Click a control: presses buttons, toggles check boxes, picks radio
    /// options.
    pub fn click(&mut self, handle: Handle) -> Result<(), BackendError> {
        if let Some(trigger) = self.tree.activate(handle)? {
            self.queue(handle, trigger);
        }
        Ok(())
    }

    /// Choose the `index`-th option of a RadioGroup.
    pub fn choose_radio(&mut self, group: Handle, index: usize) -> Result<(), BackendError> {
        let option = self
            .tree
            .children(group)
            .get(index)
            .copied()
            .ok_or_else(|| BackendError::NotFound(format!("radio option {index}")))?;
        self.click(option)
    }

    /// Select exactly these ListBox rows.
    pub fn select_rows(&mut self, handle: Handle, rows: &[usize]) -> Result<(), BackendError> {
        self.user_write(handle, &Value::Selection(rows.to_vec()))
    }

    /// Pick a ComboBox entry.
    pub fn choose(&mut self, handle: Handle, index: usize) -> Result<(), BackendError> {
        self.user_write(handle, &Value::Index(index))
    }

    /// Drag a slider to `value`.
    pub fn drag_slider(&mut self, handle: Handle, value: f64) -> Result<(), BackendError> {
        self.user_write(handle, &Value::Number(value))
    }

    /// Select TreeView items by id.
    pub fn select_tree(&mut self, handle: Handle, ids: &[&str]) -> Result<(), BackendError> {
        let ids = ids.iter().map(|id| (*id).to_owned()).collect();
        self.user_write(handle, &Value::Items(ids))
    }

    /// A window-manager action on the window rooted at `root`.
    pub fn window_event(&mut self, root: Handle, event: WindowEvent) -> Result<(), BackendError> {
        match self.tree.get(root)?.state.kind() {
            ControlKind::Window => {
                self.pending.push_back(NativeEvent::Window { root, event });
                Ok(())
            }
            _ => Err(BackendError::NotFound("window root".into())),
        }
    }

    /// Press the close button.
    pub fn close(&mut self, root: Handle) -> Result<(), BackendError> {
        self.window_event(root, WindowEvent::Close)
    }

    fn user_write(&mut self, handle: Handle, value: &Value) -> Result<(), BackendError> {
        self.tree.write(handle, value)?;
        self.report(handle);
        Ok(())
    }

    /// Queue the control's own trigger.
    fn report(&mut self, handle: Handle) {
        let trigger = self.tree.get(handle).ok().and_then(|c| c.state.trigger());
        if let Some(trigger) = trigger {
            self.queue(handle, trigger);
        }
    }

    fn queue(&mut self, handle: Handle, trigger: Trigger) {
        if let Some(event) = self.tree.emit(handle, trigger) {
            self.pending.push_back(event);
        }
    }

    fn is_live(&self, event: &NativeEvent) -> bool {
        match *event {
            NativeEvent::Widget { handle, .. } => self.tree.contains(handle),
            NativeEvent::Window { root, .. } => self.tree.contains(root),
        }
    }
}

impl Backend for MemoryBackend {
    fn init_window(&mut self, config: &WindowConfig) -> Result<Handle, BackendError> {
        Ok(self.tree.insert_root(ControlState::Window {
            title: config.title.clone(),
            visible: false,
            size: config.size,
            resizable: config.resizable,
        }))
    }

    fn create(&mut self, parent: Handle, state: ControlState) -> Result<Handle, BackendError> {
        if let ControlKind::Widget(kind) = state.kind() {
            if self.unsupported.contains(&kind) {
                return Err(BackendError::UnsupportedKind(kind));
            }
        }
        if !self.tree.get(parent)?.state.is_container() {
            return Err(BackendError::TypeMismatch {
                control: self.tree.get(parent)?.state.name(),
                value: "child control",
            });
        }
        self.tree.insert_child(parent, state)
    }

    fn place(&mut self, handle: Handle, cell: GridCell) -> Result<(), BackendError> {
        self.tree.place(handle, cell)
    }

    fn bind(&mut self, handle: Handle, trigger: Trigger) -> Result<(), BackendError> {
        self.tree.bind(handle, trigger)
    }

    fn set_visible(&mut self, root: Handle, visible: bool) -> Result<(), BackendError> {
        match &mut self.tree.get_mut(root)?.state {
            ControlState::Window { visible: v, .. } => {
                *v = visible;
                Ok(())
            }
            _ => Err(BackendError::NotFound("window root".into())),
        }
    }

    fn destroy(&mut self, handle: Handle) {
        self.tree.remove(handle);
    }

    fn process_events(&mut self, timeout: Duration) -> Result<Vec<NativeEvent>, BackendError> {
        if let Some(message) = self.failure.take() {
            return Err(BackendError::Toolkit(message));
        }
        if self.pending.is_empty() && !timeout.is_zero() {
            thread::sleep(timeout);
        }
        let drained: Vec<NativeEvent> = self.pending.drain(..).collect();
        Ok(drained.into_iter().filter(|e| self.is_live(e)).collect())
    }

    fn read(&self, handle: Handle) -> Result<Option<Value>, BackendError> {
        Ok(self.tree.get(handle)?.state.read())
    }

    fn write(&mut self, handle: Handle, value: &Value) -> Result<(), BackendError> {
        self.tree.write(handle, value)
    }

    fn flush_idle(&mut self) -> Result<(), BackendError> {
        self.idle_flushes += 1;
        Ok(())
    }

    fn root_of(&self, handle: Handle) -> Option<Handle> {
        self.tree.root_of(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_with_root() -> (MemoryBackend, Handle) {
        let mut backend = MemoryBackend::new();
        let root = backend.init_window(&WindowConfig::new("T")).unwrap();
        (backend, root)
    }

    fn field(backend: &mut MemoryBackend, root: Handle) -> Handle {
        let h = backend
            .create(
                root,
                ControlState::TextField {
                    text: "abc".into(),
                    width: None,
                },
            )
            .unwrap();
        backend.bind(h, Trigger::TextChanged).unwrap();
        h
    }

    #[test]
    fn simulated_edits_queue_bound_triggers() {
        let (mut backend, root) = backend_with_root();
        let h = field(&mut backend, root);
        backend.type_text(h, "de").unwrap();
        assert_eq!(backend.pending(), 2);

        let events = backend.process_events(Duration::ZERO).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(
            e,
            NativeEvent::Widget {
                trigger: Trigger::TextChanged,
                ..
            }
        )));
        assert_eq!(backend.read(h).unwrap(), Some(Value::from("abcde")));
        assert!(backend.process_events(Duration::ZERO).unwrap().is_empty());
    }

    #[test]
    fn unbound_controls_stay_silent() {
        let (mut backend, root) = backend_with_root();
        let h = backend
            .create(
                root,
                ControlState::TextField {
                    text: String::new(),
                    width: None,
                },
            )
            .unwrap();
        backend.replace_text(h, "x").unwrap();
        assert_eq!(backend.pending(), 0);
    }

    #[test]
    fn programmatic_write_does_not_report() {
        let (mut backend, root) = backend_with_root();
        let h = field(&mut backend, root);
        backend.write(h, &Value::from("new")).unwrap();
        assert_eq!(backend.pending(), 0);
    }

    #[test]
    fn events_for_destroyed_controls_are_dropped() {
        let (mut backend, root) = backend_with_root();
        let h = field(&mut backend, root);
        backend.replace_text(h, "x").unwrap();
        backend.destroy(h);
        assert!(backend.process_events(Duration::ZERO).unwrap().is_empty());
        assert!(matches!(backend.read(h), Err(BackendError::StaleWidget(_))));
    }

    #[test]
    fn unsupported_kind_is_refused() {
        let mut backend = MemoryBackend::new().without(WidgetKind::TreeView);
        let root = backend.init_window(&WindowConfig::new("T")).unwrap();
        let err = backend
            .create(
                root,
                ControlState::TreeView {
                    items: Vec::new(),
                    selection: Vec::new(),
                    cursor: 0,
                    height: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, BackendError::UnsupportedKind(WidgetKind::TreeView)));
    }

    #[test]
    fn injected_failure_hits_one_tick() {
        let (mut backend, _root) = backend_with_root();
        backend.fail_next_tick("display lost");
        assert!(matches!(
            backend.process_events(Duration::ZERO),
            Err(BackendError::Toolkit(msg)) if msg == "display lost"
        ));
        assert!(backend.process_events(Duration::ZERO).is_ok());
    }

    #[test]
    fn close_queues_window_event() {
        let (mut backend, root) = backend_with_root();
        backend.close(root).unwrap();
        assert_eq!(
            backend.process_events(Duration::ZERO).unwrap(),
            vec![NativeEvent::Window {
                root,
                event: WindowEvent::Close
            }]
        );
    }

    #[test]
    fn leaves_cannot_hold_children() {
        let (mut backend, root) = backend_with_root();
        let label = backend
            .create(root, ControlState::Label { text: "l".into() })
            .unwrap();
        assert!(backend
            .create(label, ControlState::Label { text: "x".into() })
            .is_err());
    }
}
