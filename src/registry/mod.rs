//! Identity registry: the owned table of widget, frame and window metadata.
//!
//! One [`Registry`] belongs to one window. Widget entries are keyed by
//! [`WidgetId`] in resolution order; secondary indexes map caller keys and
//! native handles back to ids. Native controls themselves are owned by the
//! backend; entries only reference them through [`Handle`]s.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::descriptor::{Command, Descriptor, Placement, WidgetId, WidgetKind, WidgetSpec, WindowId};
use crate::native::{Handle, Trigger};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Everything the registry knows about one widget.
#[derive(Debug, Clone)]
pub struct WidgetEntry {
    pub id: WidgetId,
    pub key: String,
    pub kind: WidgetKind,
    pub window: WindowId,
    /// The Frame this widget was declared in, if any.
    pub frame: Option<WidgetId>,
    pub placement: Placement,
    pub in_frame: bool,
    /// Native container the control was created in.
    pub container: Option<Handle>,
    /// The live control. `None` until materialized or after teardown.
    pub handle: Option<Handle>,
    /// Per-option controls of a RadioGroup.
    pub option_handles: Vec<Handle>,
    /// Built as a placeholder because the backend lacks this kind.
    pub placeholder: bool,
    pub command: Option<Command>,
    pub last_event: Option<Trigger>,
    pub last_value: Option<Value>,
}

impl WidgetEntry {
    /// Denormalize a descriptor into a fresh, unmaterialized entry.
    pub fn from_descriptor(d: &Descriptor, window: WindowId, frame: Option<WidgetId>) -> Self {
        let command = match d.spec() {
            WidgetSpec::Button(button) => button.command.clone(),
            _ => None,
        };
        Self {
            id: d.id(),
            key: d.key().to_owned(),
            kind: d.kind(),
            window,
            frame,
            placement: d.placement(),
            in_frame: frame.is_some(),
            container: None,
            handle: None,
            option_handles: Vec::new(),
            placeholder: false,
            command,
            last_event: None,
            last_value: None,
        }
    }

    /// Whether a live native control is attached.
    pub fn is_materialized(&self) -> bool {
        self.handle.is_some()
    }
}

/// A Frame and its direct children, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEntry {
    pub frame: WidgetId,
    pub window: WindowId,
    pub children: Vec<WidgetId>,
}

/// Window-level metadata.
#[derive(Debug, Clone)]
pub struct WindowEntry {
    pub id: WindowId,
    pub title: String,
    pub root: Option<Handle>,
    pub hidden: bool,
    /// Widest top-level row; a sizing hint only.
    pub columns: usize,
}

impl WindowEntry {
    pub fn new(id: WindowId, title: impl Into<String>, hidden: bool) -> Self {
        Self {
            id,
            title: title.into(),
            root: None,
            hidden,
            columns: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Owned identity tables for a single window.
#[derive(Debug, Clone)]
pub struct Registry {
    window: WindowEntry,
    widgets: IndexMap<WidgetId, WidgetEntry>,
    keys: HashMap<String, WidgetId>,
    frames: IndexMap<WidgetId, FrameEntry>,
    handles: HashMap<Handle, WidgetId>,
}

impl Registry {
    pub fn new(window: WindowEntry) -> Self {
        Self {
            window,
            widgets: IndexMap::new(),
            keys: HashMap::new(),
            frames: IndexMap::new(),
            handles: HashMap::new(),
        }
    }

    pub fn window(&self) -> &WindowEntry {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut WindowEntry {
        &mut self.window
    }

    /// Insert a widget entry.
    ///
    /// Returns the entry back if its key or id is already taken; the
    /// registry is unchanged in that case.
    pub fn insert_widget(&mut self, entry: WidgetEntry) -> Result<(), WidgetEntry> {
        if self.keys.contains_key(&entry.key) || self.widgets.contains_key(&entry.id) {
            return Err(entry);
        }
        self.keys.insert(entry.key.clone(), entry.id);
        self.widgets.insert(entry.id, entry);
        Ok(())
    }

    pub fn insert_frame(&mut self, frame: FrameEntry) {
        self.frames.insert(frame.frame, frame);
    }

    /// Record that native events from `handle` belong to widget `id`.
    pub fn bind_handle(&mut self, handle: Handle, id: WidgetId) {
        self.handles.insert(handle, id);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn id_of(&self, key: &str) -> Option<WidgetId> {
        self.keys.get(key).copied()
    }

    pub fn widget(&self, id: WidgetId) -> Option<&WidgetEntry> {
        self.widgets.get(&id)
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut WidgetEntry> {
        self.widgets.get_mut(&id)
    }

    pub fn by_key(&self, key: &str) -> Option<&WidgetEntry> {
        self.id_of(key).and_then(|id| self.widgets.get(&id))
    }

    pub fn by_key_mut(&mut self, key: &str) -> Option<&mut WidgetEntry> {
        let id = self.id_of(key)?;
        self.widgets.get_mut(&id)
    }

    /// The widget a native handle was bound to.
    pub fn by_handle(&self, handle: Handle) -> Option<WidgetId> {
        self.handles.get(&handle).copied()
    }

    pub fn frame(&self, id: WidgetId) -> Option<&FrameEntry> {
        self.frames.get(&id)
    }

    pub fn frames(&self) -> impl Iterator<Item = &FrameEntry> {
        self.frames.values()
    }

    /// Widget entries in resolution order.
    pub fn widgets(&self) -> impl Iterator<Item = &WidgetEntry> {
        self.widgets.values()
    }

    pub fn widgets_mut(&mut self) -> impl Iterator<Item = &mut WidgetEntry> {
        self.widgets.values_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.widgets.values().map(|w| w.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Forget every native handle after the window's controls are torn down.
    pub fn clear_handles(&mut self) {
        self.handles.clear();
        self.window.root = None;
        for entry in self.widgets.values_mut() {
            entry.handle = None;
            entry.container = None;
            entry.option_handles.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Button, Label};
    use slotmap::SlotMap;

    fn registry() -> Registry {
        Registry::new(WindowEntry::new(WindowId::next(), "W", true))
    }

    fn entry(d: &Descriptor) -> WidgetEntry {
        WidgetEntry::from_descriptor(d, WindowId::next(), None)
    }

    #[test]
    fn insert_and_lookup_by_key() {
        let mut reg = registry();
        let d = Descriptor::from(Label::new("hi").key("l1"));
        reg.insert_widget(entry(&d)).unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.id_of("l1"), Some(d.id()));
        assert_eq!(reg.by_key("l1").unwrap().kind, WidgetKind::Label);
        assert!(reg.by_key("nope").is_none());
    }

    #[test]
    fn duplicate_key_is_refused() {
        let mut reg = registry();
        let a = Descriptor::from(Label::new("a").key("same"));
        let b = Descriptor::from(Label::new("b").key("same"));
        reg.insert_widget(entry(&a)).unwrap();
        let refused = reg.insert_widget(entry(&b)).unwrap_err();
        assert_eq!(refused.id, b.id());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.id_of("same"), Some(a.id()));
    }

    #[test]
    fn entry_copies_button_command() {
        let d = Descriptor::from(Button::new("Go").command(|| {}));
        assert!(entry(&d).command.is_some());
        assert!(!entry(&d).is_materialized());
    }

    #[test]
    fn handles_map_back_to_widgets() {
        let mut arena: SlotMap<Handle, ()> = SlotMap::with_key();
        let h = arena.insert(());
        let mut reg = registry();
        let d = Descriptor::from(Label::new("x"));
        reg.insert_widget(entry(&d)).unwrap();
        reg.bind_handle(h, d.id());
        reg.widget_mut(d.id()).unwrap().handle = Some(h);
        assert_eq!(reg.by_handle(h), Some(d.id()));

        reg.clear_handles();
        assert_eq!(reg.by_handle(h), None);
        assert!(reg.widget(d.id()).unwrap().handle.is_none());
    }

    #[test]
    fn keys_follow_insertion_order() {
        let mut reg = registry();
        for key in ["c", "a", "b"] {
            let d = Descriptor::from(Label::new(key));
            reg.insert_widget(entry(&d)).unwrap();
        }
        assert_eq!(reg.keys().collect::<Vec<_>>(), vec!["c", "a", "b"]);
    }
}
