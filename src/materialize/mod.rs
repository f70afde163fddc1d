//! Native materialization: resolved descriptors to live toolkit controls.
//!
//! The [`Materializer`] walks a resolved [`Layout`] top level first, building
//! each widget's [`ControlState`] from its configuration record, creating it
//! inside its container, placing it in the container's grid and binding the
//! trigger it reports. Frames recurse with their own control as the parent.

use crate::descriptor::{Descriptor, Sticky, WidgetKind, WidgetSpec};
use crate::layout::Layout;
use crate::native::{Backend, BackendError, ControlState, GridCell, Handle, Trigger};
use crate::registry::Registry;

/// Errors that abort materialization.
#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("{kind} `{key}` is missing required argument `{argument}`")]
    MissingArgument {
        kind: WidgetKind,
        key: String,
        argument: &'static str,
    },
    #[error("{kind} `{key}` has an invalid `{argument}`: {reason}")]
    InvalidArgument {
        kind: WidgetKind,
        key: String,
        argument: &'static str,
        reason: &'static str,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Build the initial native state for a descriptor.
///
/// # Errors
///
/// [`MaterializeError::MissingArgument`] if a required argument of the kind
/// was left out, [`MaterializeError::InvalidArgument`] if a slider bound or
/// resolution is not a finite number.
pub fn control_state(d: &Descriptor) -> Result<ControlState, MaterializeError> {
    let missing = |argument: &'static str| MaterializeError::MissingArgument {
        kind: d.kind(),
        key: d.key().to_owned(),
        argument,
    };
    let state = match d.spec() {
        WidgetSpec::Label(w) => ControlState::Label {
            text: w.text.clone().ok_or_else(|| missing("text"))?,
        },
        WidgetSpec::Button(w) => ControlState::Button {
            text: w.text.clone().ok_or_else(|| missing("text"))?,
        },
        WidgetSpec::TextField(w) => ControlState::TextField {
            text: w.text.clone().ok_or_else(|| missing("text"))?,
            width: w.width,
        },
        WidgetSpec::TextArea(w) => ControlState::TextArea {
            text: w.text.clone().ok_or_else(|| missing("text"))?,
            size: w.size,
        },
        WidgetSpec::CheckBox(w) => ControlState::CheckBox {
            text: w.text.clone().ok_or_else(|| missing("text"))?,
            checked: w.checked,
        },
        WidgetSpec::RadioGroup(w) => {
            let options = w.options.as_ref().ok_or_else(|| missing("options"))?;
            ControlState::RadioGroup {
                value: options.first().map(|(_, value)| value.clone()).unwrap_or_default(),
            }
        }
        WidgetSpec::ListBox(w) => ControlState::ListBox {
            items: w.items.clone().ok_or_else(|| missing("items"))?,
            selection: Vec::new(),
            mode: w.select_mode,
            cursor: 0,
            height: w.height,
        },
        WidgetSpec::Frame(w) => ControlState::Frame {
            title: w.title.clone().filter(|t| !t.is_empty()),
        },
        WidgetSpec::Slider(w) => {
            let finite = |argument: &'static str, n: f64| {
                if n.is_finite() {
                    Ok(n)
                } else {
                    Err(MaterializeError::InvalidArgument {
                        kind: d.kind(),
                        key: d.key().to_owned(),
                        argument,
                        reason: "not a finite number",
                    })
                }
            };
            let from = finite("from", w.from.ok_or_else(|| missing("from"))?)?;
            let to = finite("to", w.to.ok_or_else(|| missing("to"))?)?;
            finite("resolution", w.resolution)?;
            ControlState::Slider {
                from,
                to,
                value: from,
                resolution: w.resolution,
                orient: w.orient,
                length: w.length,
            }
        }
        WidgetSpec::ComboBox(w) => {
            let values = w.values.clone().ok_or_else(|| missing("values"))?;
            let current = w.current.filter(|&i| i < values.len());
            ControlState::ComboBox { values, current }
        }
        WidgetSpec::ProgressBar(w) => ControlState::ProgressBar {
            value: w.value.clamp(0.0, w.maximum.max(0.0)),
            maximum: w.maximum,
            mode: w.mode,
            length: w.length,
        },
        WidgetSpec::TreeView(w) => ControlState::TreeView {
            items: w.items.clone(),
            selection: Vec::new(),
            cursor: 0,
            height: w.height,
        },
    };
    Ok(state)
}

/// Drives one window's materialization against a backend.
pub struct Materializer<'a, B: Backend> {
    backend: &'a mut B,
    registry: &'a mut Registry,
    created: usize,
}

impl<'a, B: Backend> Materializer<'a, B> {
    pub fn new(backend: &'a mut B, registry: &'a mut Registry) -> Self {
        Self {
            backend,
            registry,
            created: 0,
        }
    }

    /// Materialize every descriptor of `layout` inside `parent`.
    ///
    /// Returns the number of native controls created, radio options and
    /// placeholders included.
    ///
    /// # Errors
    ///
    /// Stops at the first missing argument or toolkit failure. Controls
    /// created so far stay alive; the caller destroys the root.
    pub fn materialize(mut self, layout: &Layout, parent: Handle) -> Result<usize, MaterializeError> {
        self.layout(layout, parent)?;
        Ok(self.created)
    }

    fn layout(&mut self, layout: &Layout, parent: Handle) -> Result<(), MaterializeError> {
        for row in layout.rows() {
            for d in row {
                self.widget(d, parent)?;
            }
        }
        Ok(())
    }

    fn widget(&mut self, d: &Descriptor, parent: Handle) -> Result<(), MaterializeError> {
        let state = control_state(d)?;
        let trigger = state.trigger();
        let placement = self
            .registry
            .widget(d.id())
            .map(|entry| entry.placement)
            .unwrap_or_else(|| d.placement());

        let (handle, placeholder) = match self.backend.create(parent, state) {
            Ok(handle) => (handle, false),
            Err(BackendError::UnsupportedKind(kind)) => {
                tracing::warn!(%kind, key = d.key(), "toolkit lacks this kind, using a placeholder");
                let text = format!("<{kind}>");
                (self.backend.create(parent, ControlState::Placeholder { text })?, true)
            }
            Err(err) => return Err(err.into()),
        };
        self.created += 1;
        self.backend.place(handle, GridCell::from(placement))?;
        if let Some(trigger) = trigger.filter(|_| !placeholder) {
            self.backend.bind(handle, trigger)?;
        }
        self.registry.bind_handle(handle, d.id());

        let mut options = Vec::new();
        if !placeholder {
            match d.spec() {
                WidgetSpec::RadioGroup(group) => {
                    for (row, (label, value)) in group.options.iter().flatten().enumerate() {
                        let option = self.backend.create(
                            handle,
                            ControlState::RadioOption {
                                label: label.clone(),
                                value: value.clone(),
                            },
                        )?;
                        self.created += 1;
                        let mut cell = GridCell::new(row, 0);
                        cell.sticky = Sticky::W;
                        self.backend.place(option, cell)?;
                        self.backend.bind(option, Trigger::RadioSelected)?;
                        self.registry.bind_handle(option, d.id());
                        options.push(option);
                    }
                }
                WidgetSpec::Frame(frame) => self.layout(&frame.layout, handle)?,
                _ => {}
            }
        }

        if let Some(entry) = self.registry.widget_mut(d.id()) {
            entry.handle = Some(handle);
            entry.container = Some(parent);
            entry.option_handles = options;
            entry.placeholder = placeholder;
        }
        tracing::debug!(
            kind = %d.kind(),
            key = d.key(),
            id = %d.id(),
            row = placement.row,
            column = placement.column,
            "materialized widget"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        ArgValue, Button, ComboBox, Frame, Label, ListBox, ProgressBar, RadioGroup, Slider, TextField,
        WindowId,
    };
    use crate::layout::resolve;
    use crate::native::{Backend, ControlKind, MemoryBackend};
    use crate::registry::WindowEntry;
    use crate::value::Value;
    use crate::window::WindowConfig;
    use pretty_assertions::assert_eq;

    fn build(mut layout: Layout, backend: &mut MemoryBackend) -> Result<(Registry, Handle, usize), MaterializeError> {
        let mut registry = Registry::new(WindowEntry::new(WindowId::next(), "W", true));
        resolve(&mut layout, &mut registry).unwrap();
        let root = backend.init_window(&WindowConfig::new("W"))?;
        let created = Materializer::new(backend, &mut registry).materialize(&layout, root)?;
        Ok((registry, root, created))
    }

    // ── Control state ────────────────────────────────────────────────

    #[test]
    fn missing_text_is_reported() {
        let d = Descriptor::from_args(WidgetKind::Label, [("key", ArgValue::from("l"))]).unwrap();
        let err = control_state(&d).unwrap_err();
        assert!(matches!(
            err,
            MaterializeError::MissingArgument { kind: WidgetKind::Label, ref key, argument: "text" } if key == "l"
        ));
    }

    #[test]
    fn slider_needs_both_bounds() {
        let d = Descriptor::from_args(WidgetKind::Slider, [("from", ArgValue::from(0.0))]).unwrap();
        assert!(matches!(
            control_state(&d),
            Err(MaterializeError::MissingArgument { argument: "to", .. })
        ));
    }

    #[test]
    fn initial_values() {
        let slider = control_state(&Slider::new(5.0, 10.0).into()).unwrap();
        assert_eq!(slider.read(), Some(Value::Number(5.0)));

        let combo = control_state(&ComboBox::new(["a", "b"]).current(7).into()).unwrap();
        assert_eq!(combo.read(), None);

        let bar = control_state(&ProgressBar::new().value(500.0).into()).unwrap();
        assert_eq!(bar.read(), Some(Value::Number(100.0)));

        let group = control_state(&RadioGroup::new([("One", "1"), ("Two", "2")]).into()).unwrap();
        assert_eq!(group.read(), Some(Value::from("1")));
    }

    #[test]
    fn slider_bounds_must_be_finite() {
        for (from, to) in [(f64::NAN, 10.0), (0.0, f64::INFINITY)] {
            let err = control_state(&Slider::new(from, to).key("s").into()).unwrap_err();
            assert!(matches!(
                err,
                MaterializeError::InvalidArgument { kind: WidgetKind::Slider, ref key, .. } if key == "s"
            ));
        }
        let err = control_state(&Slider::new(0.0, 1.0).resolution(f64::NAN).into()).unwrap_err();
        assert!(matches!(err, MaterializeError::InvalidArgument { argument: "resolution", .. }));
    }

    // ── Materialization ──────────────────────────────────────────────

    #[test]
    fn every_widget_gets_a_placed_handle() {
        let mut backend = MemoryBackend::new();
        let layout = crate::layout![
            [Label::new("Name").key("l"), TextField::new("bob").key("t")],
            [Button::new("OK")],
        ];
        let (registry, root, created) = build(layout, &mut backend).unwrap();
        assert_eq!(created, 3);
        for entry in registry.widgets() {
            let handle = entry.handle.unwrap();
            assert_eq!(entry.container, Some(root));
            assert_eq!(registry.by_handle(handle), Some(entry.id));
            let control = backend.control(handle).unwrap();
            assert_eq!(control.cell, Some(GridCell::from(entry.placement)));
        }
        let ok = backend.control(registry.by_key("OK").unwrap().handle.unwrap()).unwrap();
        assert_eq!(ok.cell.map(|c| c.column_span), Some(2));
        assert_eq!(ok.triggers, vec![Trigger::Click]);
    }

    #[test]
    fn labels_bind_nothing() {
        let mut backend = MemoryBackend::new();
        let (registry, _, _) = build(crate::layout![[Label::new("x")]], &mut backend).unwrap();
        let handle = registry.by_key("x").unwrap().handle.unwrap();
        assert!(backend.control(handle).unwrap().triggers.is_empty());
    }

    #[test]
    fn frames_parent_their_contents() {
        let mut backend = MemoryBackend::new();
        let layout = crate::layout![[Frame::new(crate::layout![[Label::new("in")], [ListBox::new(["a"]).key("lb")]])
            .title("Box")
            .key("f")]];
        let (registry, root, created) = build(layout, &mut backend).unwrap();
        assert_eq!(created, 3);
        let frame = registry.by_key("f").unwrap().handle.unwrap();
        assert_eq!(backend.tree().parent(frame), Some(root));
        let inner = registry.by_key("lb").unwrap();
        assert_eq!(inner.container, Some(frame));
        assert_eq!(backend.tree().children(frame).len(), 2);
    }

    #[test]
    fn radio_options_are_children_of_the_group() {
        let mut backend = MemoryBackend::new();
        let layout = crate::layout![[RadioGroup::new([("A", "a"), ("B", "b")]).key("r")]];
        let (registry, _, created) = build(layout, &mut backend).unwrap();
        assert_eq!(created, 3);
        let entry = registry.by_key("r").unwrap();
        let group = entry.handle.unwrap();
        assert_eq!(entry.option_handles.len(), 2);
        assert_eq!(backend.tree().children(group), entry.option_handles.as_slice());
        for (row, option) in entry.option_handles.iter().enumerate() {
            assert_eq!(registry.by_handle(*option), Some(entry.id));
            assert_eq!(backend.control(*option).unwrap().cell.map(|c| c.row), Some(row));
        }
    }

    #[test]
    fn unsupported_kind_becomes_placeholder() {
        let mut backend = MemoryBackend::new().without(WidgetKind::Slider);
        let layout = crate::layout![[Slider::new(0.0, 1.0).key("s")]];
        let (registry, _, _) = build(layout, &mut backend).unwrap();
        let entry = registry.by_key("s").unwrap();
        assert!(entry.placeholder);
        let control = backend.control(entry.handle.unwrap()).unwrap();
        assert_eq!(control.state.kind(), ControlKind::Placeholder);
        assert_eq!(
            control.state,
            ControlState::Placeholder {
                text: "<Slider>".into()
            }
        );
    }

    #[test]
    fn missing_argument_stops_the_walk() {
        let mut backend = MemoryBackend::new();
        let broken = Descriptor::from_args(WidgetKind::ListBox, [("key", ArgValue::from("lb"))]).unwrap();
        let layout = Layout::from_rows(vec![vec![broken], vec![Label::new("after").into()]]);
        let err = build(layout, &mut backend).unwrap_err();
        assert!(matches!(err, MaterializeError::MissingArgument { argument: "items", .. }));
    }
}
