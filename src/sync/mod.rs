//! Event/value synchronization: poll, get and set over a live window.
//!
//! A [`Synchronizer`] belongs to one window. Each [`poll`](Synchronizer::poll)
//! runs one backend tick, dispatches what fired into the window's single
//! [`EventSlot`], and rebuilds the value map from every live control.
//!
//! The slot holds at most one event. A burst of changes between two polls
//! collapses to the most recent one; this is the contract, not a queue.

use std::fmt;
use std::time::Duration;

use crate::descriptor::WidgetKind;
use crate::native::{Backend, BackendError, NativeEvent, WindowEvent};
use crate::registry::{Registry, WidgetEntry};
use crate::value::{Value, ValueMap};

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// What a poll reports: a widget key or a window-level action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Widget(String),
    Window(WindowEvent),
}

impl Event {
    /// The event key: the widget's key, or a reserved `--Name--` key.
    pub fn key(&self) -> &str {
        match self {
            Event::Widget(key) => key,
            Event::Window(event) => event.key(),
        }
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Event::Window(WindowEvent::Close))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl PartialEq<str> for Event {
    fn eq(&self, other: &str) -> bool {
        self.key() == other
    }
}

impl PartialEq<&str> for Event {
    fn eq(&self, other: &&str) -> bool {
        self.key() == *other
    }
}

// ---------------------------------------------------------------------------
// EventSlot
// ---------------------------------------------------------------------------

/// A single-slot holder for the latest unconsumed event.
///
/// `put` overwrites whatever is there; `take` empties the slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSlot(Option<Event>);

impl EventSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `event`, dropping any unconsumed one.
    pub fn put(&mut self, event: Event) {
        self.0 = Some(event);
    }

    pub fn take(&mut self) -> Option<Event> {
        self.0.take()
    }

    pub fn peek(&self) -> Option<&Event> {
        self.0.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Result of one poll tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tick {
    pub event: Option<Event>,
    pub values: ValueMap,
    /// The close-button action fired during this tick.
    pub close_requested: bool,
}

/// Per-window event dispatch and value access.
#[derive(Debug, Default)]
pub struct Synchronizer {
    slot: EventSlot,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self) -> &EventSlot {
        &self.slot
    }

    /// Run one tick: process native events for at most `timeout`, dispatch
    /// them, then take the slot and snapshot every live control.
    ///
    /// A toolkit failure degrades the tick to no event and an empty map.
    pub fn poll<B: Backend>(&mut self, backend: &mut B, registry: &mut Registry, timeout: Duration) -> Tick {
        let events = match backend.process_events(timeout) {
            Ok(events) => events,
            Err(err) => {
                tracing::error!(%err, "event loop tick failed");
                return Tick::default();
            }
        };
        let close_requested = self.dispatch(registry, events);

        let values = match snapshot(backend, registry) {
            Ok(values) => values,
            Err(err) => {
                tracing::error!(%err, "reading widget values failed");
                return Tick {
                    close_requested,
                    ..Tick::default()
                };
            }
        };
        for entry in registry.widgets_mut() {
            if let Some(value) = values.get(&entry.key) {
                entry.last_value.clone_from(value);
            }
        }
        let event = self.slot.take();
        tracing::trace!(event = ?event.as_ref().map(Event::key), widgets = values.len(), "poll tick");
        Tick {
            event,
            values,
            close_requested,
        }
    }

    /// Route native events into the slot. Returns `true` if the window was
    /// asked to close; events after the close are dropped. Events for other
    /// windows on the same toolkit are ignored.
    pub fn dispatch(&mut self, registry: &mut Registry, events: Vec<NativeEvent>) -> bool {
        for event in events {
            match event {
                NativeEvent::Widget { handle, trigger } => {
                    let Some(entry) = registry.by_handle(handle).and_then(|id| registry.widget_mut(id)) else {
                        tracing::trace!(?handle, "event from an unregistered control");
                        continue;
                    };
                    // The callback runs before the event is captured.
                    if let Some(command) = entry.command.clone() {
                        command.call();
                    }
                    entry.last_event = Some(trigger);
                    self.slot.put(Event::Widget(entry.key.clone()));
                }
                NativeEvent::Window { root, event } => {
                    if registry.window().root.is_some_and(|own| own != root) {
                        tracing::trace!(?root, "event for another window");
                        continue;
                    }
                    self.slot.put(Event::Window(event));
                    if event == WindowEvent::Close {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Read one widget's value. Unknown keys and unreadable controls give
    /// `None`.
    pub fn get<B: Backend>(&self, backend: &B, registry: &Registry, key: &str) -> Option<Value> {
        let entry = registry.by_key(key)?;
        match read_value(backend, entry) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, key, "could not read widget");
                None
            }
        }
    }

    /// Push a value into one widget, then flush idle work so the display
    /// catches up. Unknown keys are ignored. Never raises a widget event.
    pub fn set<B: Backend>(&mut self, backend: &mut B, registry: &Registry, key: &str, value: &Value) {
        let Some(handle) = registry.by_key(key).and_then(|entry| entry.handle) else {
            tracing::debug!(key, "set on an unknown or torn-down widget");
            return;
        };
        if let Err(err) = backend.write(handle, value) {
            tracing::warn!(%err, key, value = value.type_name(), "could not set widget value");
        }
        if let Err(err) = backend.flush_idle() {
            tracing::warn!(%err, "idle flush failed");
        }
    }
}

/// Every live widget's value, keyed by widget key in resolution order.
///
/// # Errors
///
/// Any toolkit failure other than a stale control.
pub fn snapshot<B: Backend>(backend: &B, registry: &Registry) -> Result<ValueMap, BackendError> {
    let mut values = ValueMap::new();
    for entry in registry.widgets().filter(|e| e.is_materialized()) {
        values.insert(entry.key.clone(), read_value(backend, entry)?);
    }
    Ok(values)
}

/// Read and normalize one widget's value. A control torn down under the
/// registry reads as `None`.
fn read_value<B: Backend>(backend: &B, entry: &WidgetEntry) -> Result<Option<Value>, BackendError> {
    let Some(handle) = entry.handle else {
        return Ok(None);
    };
    if entry.placeholder || !entry.kind.has_value() {
        return Ok(None);
    }
    match backend.read(handle) {
        Ok(Some(Value::Text(text))) if entry.kind == WidgetKind::TextArea => {
            Ok(Some(Value::Text(text.trim().to_owned())))
        }
        Ok(value) => Ok(value),
        Err(BackendError::StaleWidget(_)) => {
            tracing::warn!(key = %entry.key, "widget no longer exists");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::descriptor::{Button, CheckBox, Label, RadioGroup, Slider, TextArea, TextField, WindowId};
    use crate::layout::{resolve, Layout};
    use crate::materialize::Materializer;
    use crate::native::{ControlState, Handle, MemoryBackend};
    use crate::registry::WindowEntry;
    use crate::window::WindowConfig;
    use pretty_assertions::assert_eq;

    struct Fixture {
        backend: MemoryBackend,
        registry: Registry,
        root: Handle,
        sync: Synchronizer,
    }

    impl Fixture {
        fn new(mut layout: Layout) -> Self {
            let mut backend = MemoryBackend::new();
            let mut registry = Registry::new(WindowEntry::new(WindowId::next(), "W", true));
            resolve(&mut layout, &mut registry).unwrap();
            let root = backend.init_window(&WindowConfig::new("W")).unwrap();
            Materializer::new(&mut backend, &mut registry)
                .materialize(&layout, root)
                .unwrap();
            Self {
                backend,
                registry,
                root,
                sync: Synchronizer::new(),
            }
        }

        fn handle(&self, key: &str) -> Handle {
            self.registry.by_key(key).unwrap().handle.unwrap()
        }

        fn poll(&mut self) -> Tick {
            self.sync.poll(&mut self.backend, &mut self.registry, Duration::ZERO)
        }
    }

    // ── EventSlot ────────────────────────────────────────────────────

    #[test]
    fn slot_keeps_only_the_latest() {
        let mut slot = EventSlot::new();
        slot.put(Event::Widget("a".into()));
        slot.put(Event::Widget("b".into()));
        assert_eq!(slot.peek(), Some(&Event::Widget("b".into())));
        assert_eq!(slot.take(), Some(Event::Widget("b".into())));
        assert!(slot.is_empty());
    }

    #[test]
    fn event_keys() {
        assert_eq!(Event::Widget("t1".into()), "t1");
        assert_eq!(Event::Window(WindowEvent::Close).key(), "--Exit--");
        assert!(Event::Window(WindowEvent::Close).is_close());
        assert_eq!(Event::Window(WindowEvent::Resize).to_string(), "--Resize--");
    }

    // ── Poll ─────────────────────────────────────────────────────────

    #[test]
    fn quiet_tick_has_values_but_no_event() {
        let mut f = Fixture::new(crate::layout![[Label::new("hi").key("l1"), TextField::new("abc").key("t1")]]);
        let tick = f.poll();
        assert_eq!(tick.event, None);
        assert_eq!(tick.values.get("l1"), Some(&None));
        assert_eq!(tick.values.get("t1"), Some(&Some(Value::from("abc"))));
        assert!(!tick.close_requested);
    }

    #[test]
    fn burst_collapses_to_latest() {
        let mut f = Fixture::new(crate::layout![[TextField::new("").key("a"), TextField::new("").key("b")]]);
        let (a, b) = (f.handle("a"), f.handle("b"));
        f.backend.type_text(a, "xyz").unwrap();
        f.backend.type_text(b, "q").unwrap();
        let tick = f.poll();
        assert_eq!(tick.event, Some(Event::Widget("b".into())));
        assert_eq!(f.poll().event, None);
        assert_eq!(f.registry.by_key("a").unwrap().last_value, Some(Value::from("xyz")));
    }

    #[test]
    fn text_area_reads_trimmed() {
        let mut f = Fixture::new(crate::layout![[TextArea::new("  body \n").key("ta")]]);
        assert_eq!(f.poll().values["ta"], Some(Value::from("body")));
    }

    #[test]
    fn command_runs_before_capture() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let mut f = Fixture::new(crate::layout![[Button::new("Go").command(move || seen.set(seen.get() + 1))]]);
        let go = f.handle("Go");
        f.backend.click(go).unwrap();
        let tick = f.poll();
        assert_eq!(calls.get(), 1);
        assert_eq!(tick.event, Some(Event::Widget("Go".into())));
        assert_eq!(
            f.registry.by_key("Go").unwrap().last_event,
            Some(crate::native::Trigger::Click)
        );
    }

    #[test]
    fn close_stops_dispatch() {
        let mut f = Fixture::new(crate::layout![[CheckBox::new("c").key("c")]]);
        let c = f.handle("c");
        f.backend.close(f.root).unwrap();
        f.backend.click(c).unwrap();
        let tick = f.poll();
        assert!(tick.close_requested);
        assert_eq!(tick.event, Some(Event::Window(WindowEvent::Close)));
        // The click was dropped, but the toggle itself happened natively.
        assert_eq!(tick.values["c"], Some(Value::Bool(true)));
    }

    #[test]
    fn window_events_for_other_roots_are_ignored() {
        let mut f = Fixture::new(crate::layout![[Label::new("l")]]);
        f.registry.window_mut().root = Some(f.root);
        let other = f.backend.init_window(&WindowConfig::new("Other")).unwrap();
        let closed = f.sync.dispatch(
            &mut f.registry,
            vec![NativeEvent::Window {
                root: other,
                event: WindowEvent::Close,
            }],
        );
        assert!(!closed);
        assert!(f.sync.slot().is_empty());
    }

    #[test]
    fn toolkit_failure_degrades_the_tick() {
        let mut f = Fixture::new(crate::layout![[TextField::new("x").key("t")]]);
        f.backend.fail_next_tick("boom");
        assert_eq!(f.poll(), Tick::default());
        assert_eq!(f.poll().values.len(), 1);
    }

    #[test]
    fn stale_control_reads_as_none() {
        let mut f = Fixture::new(crate::layout![[TextField::new("x").key("t")]]);
        let t = f.handle("t");
        f.backend.destroy(t);
        let tick = f.poll();
        assert_eq!(tick.values.get("t"), Some(&None));
        assert_eq!(f.sync.get(&f.backend, &f.registry, "t"), None);
    }

    // ── Get / set ────────────────────────────────────────────────────

    #[test]
    fn set_then_get_round_trips_without_an_event() {
        let mut f = Fixture::new(crate::layout![[TextField::new("").key("t")]]);
        f.sync.set(&mut f.backend, &f.registry, "t", &Value::from("new"));
        assert_eq!(f.sync.get(&f.backend, &f.registry, "t"), Some(Value::from("new")));
        assert_eq!(f.backend.idle_flushes(), 1);
        assert_eq!(f.poll().event, None);
    }

    #[test]
    fn unknown_keys_are_lenient() {
        let mut f = Fixture::new(crate::layout![[Label::new("l")]]);
        assert_eq!(f.sync.get(&f.backend, &f.registry, "nonexistent"), None);
        f.sync.set(&mut f.backend, &f.registry, "nonexistent", &Value::from("x"));
        assert_eq!(f.backend.idle_flushes(), 0);
    }

    #[test]
    fn mismatched_set_leaves_the_control_alone() {
        let mut f = Fixture::new(crate::layout![[CheckBox::new("Accept").key("c")]]);
        let c = f.handle("c");
        f.sync.set(&mut f.backend, &f.registry, "c", &Value::from("yes"));
        assert_eq!(
            f.backend.control(c).unwrap().state,
            ControlState::CheckBox {
                text: "Accept".into(),
                checked: false,
            }
        );
        assert_eq!(f.sync.get(&f.backend, &f.registry, "c"), Some(Value::Bool(false)));
    }

    #[test]
    fn radio_set_must_name_an_option() {
        let mut f = Fixture::new(crate::layout![[RadioGroup::new([("A", "a"), ("B", "b")]).key("r")]]);
        f.sync.set(&mut f.backend, &f.registry, "r", &Value::from("bogus"));
        assert_eq!(f.sync.get(&f.backend, &f.registry, "r"), Some(Value::from("a")));
        f.sync.set(&mut f.backend, &f.registry, "r", &Value::from("b"));
        assert_eq!(f.sync.get(&f.backend, &f.registry, "r"), Some(Value::from("b")));
        assert_eq!(f.poll().event, None);
    }

    #[test]
    fn nan_slider_bound_fails_the_build_not_the_set() {
        let mut layout = crate::layout![[Slider::new(f64::NAN, 10.0).key("s")]];
        let mut backend = MemoryBackend::new();
        let mut registry = Registry::new(WindowEntry::new(WindowId::next(), "W", true));
        resolve(&mut layout, &mut registry).unwrap();
        let root = backend.init_window(&WindowConfig::new("W")).unwrap();
        let result = Materializer::new(&mut backend, &mut registry).materialize(&layout, root);
        assert!(matches!(
            result,
            Err(crate::materialize::MaterializeError::InvalidArgument { argument: "from", .. })
        ));
    }
}
