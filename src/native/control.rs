//! The control model shared by the bundled backends.
//!
//! [`ControlState`] is the live state of one native control together with
//! its raw read/write rules and the user-level edits a toolkit performs on
//! it. [`ControlTree`] is a slotmap arena of controls with parent/child
//! links; both backends keep their controls in one.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::{BackendError, GridCell, Handle, NativeEvent, Trigger};
use crate::descriptor::{Orient, ProgressMode, SelectMode, TreeItem, WidgetKind};
use crate::value::Value;

const EMPTY_CHILDREN: &[Handle] = &[];

// ---------------------------------------------------------------------------
// ControlKind
// ---------------------------------------------------------------------------

/// What a native control is, at the toolkit level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Window,
    Widget(WidgetKind),
    /// One choice inside a RadioGroup.
    RadioOption,
    /// Stand-in for a kind the toolkit cannot build.
    Placeholder,
}

// ---------------------------------------------------------------------------
// ControlState
// ---------------------------------------------------------------------------

/// Live state of one native control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlState {
    Window {
        title: String,
        visible: bool,
        size: Option<(u16, u16)>,
        resizable: bool,
    },
    Label {
        text: String,
    },
    Button {
        text: String,
    },
    TextField {
        text: String,
        width: Option<u16>,
    },
    TextArea {
        text: String,
        size: (u16, u16),
    },
    CheckBox {
        text: String,
        checked: bool,
    },
    /// Container for the options; holds the shared value.
    RadioGroup {
        value: String,
    },
    RadioOption {
        label: String,
        value: String,
    },
    ListBox {
        items: Vec<String>,
        selection: Vec<usize>,
        mode: SelectMode,
        cursor: usize,
        height: Option<u16>,
    },
    Frame {
        title: Option<String>,
    },
    Slider {
        from: f64,
        to: f64,
        value: f64,
        resolution: f64,
        orient: Orient,
        length: Option<u16>,
    },
    ComboBox {
        values: Vec<String>,
        current: Option<usize>,
    },
    ProgressBar {
        value: f64,
        maximum: f64,
        mode: ProgressMode,
        length: Option<u16>,
    },
    TreeView {
        items: Vec<TreeItem>,
        /// Selected item ids.
        selection: Vec<String>,
        cursor: usize,
        height: Option<u16>,
    },
    Placeholder {
        text: String,
    },
}

impl ControlState {
    pub fn kind(&self) -> ControlKind {
        match self {
            ControlState::Window { .. } => ControlKind::Window,
            ControlState::Label { .. } => ControlKind::Widget(WidgetKind::Label),
            ControlState::Button { .. } => ControlKind::Widget(WidgetKind::Button),
            ControlState::TextField { .. } => ControlKind::Widget(WidgetKind::TextField),
            ControlState::TextArea { .. } => ControlKind::Widget(WidgetKind::TextArea),
            ControlState::CheckBox { .. } => ControlKind::Widget(WidgetKind::CheckBox),
            ControlState::RadioGroup { .. } => ControlKind::Widget(WidgetKind::RadioGroup),
            ControlState::RadioOption { .. } => ControlKind::RadioOption,
            ControlState::ListBox { .. } => ControlKind::Widget(WidgetKind::ListBox),
            ControlState::Frame { .. } => ControlKind::Widget(WidgetKind::Frame),
            ControlState::Slider { .. } => ControlKind::Widget(WidgetKind::Slider),
            ControlState::ComboBox { .. } => ControlKind::Widget(WidgetKind::ComboBox),
            ControlState::ProgressBar { .. } => ControlKind::Widget(WidgetKind::ProgressBar),
            ControlState::TreeView { .. } => ControlKind::Widget(WidgetKind::TreeView),
            ControlState::Placeholder { .. } => ControlKind::Placeholder,
        }
    }

    /// Human-readable control name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ControlState::Window { .. } => "window",
            ControlState::Label { .. } => "label",
            ControlState::Button { .. } => "button",
            ControlState::TextField { .. } => "text field",
            ControlState::TextArea { .. } => "text area",
            ControlState::CheckBox { .. } => "check box",
            ControlState::RadioGroup { .. } => "radio group",
            ControlState::RadioOption { .. } => "radio option",
            ControlState::ListBox { .. } => "list box",
            ControlState::Frame { .. } => "frame",
            ControlState::Slider { .. } => "slider",
            ControlState::ComboBox { .. } => "combo box",
            ControlState::ProgressBar { .. } => "progress bar",
            ControlState::TreeView { .. } => "tree view",
            ControlState::Placeholder { .. } => "placeholder",
        }
    }

    /// The trigger this control reports on user action. RadioGroups report
    /// through their options.
    pub fn trigger(&self) -> Option<Trigger> {
        match self {
            ControlState::Button { .. } => Some(Trigger::Click),
            ControlState::TextField { .. } => Some(Trigger::TextChanged),
            ControlState::TextArea { .. } => Some(Trigger::TextAreaChanged),
            ControlState::CheckBox { .. } => Some(Trigger::Toggled),
            ControlState::RadioOption { .. } => Some(Trigger::RadioSelected),
            ControlState::ListBox { .. } => Some(Trigger::ListboxSelectionChanged),
            ControlState::Slider { .. } => Some(Trigger::SliderMoved),
            ControlState::ComboBox { .. } => Some(Trigger::ComboboxSelected),
            ControlState::TreeView { .. } => Some(Trigger::TreeviewSelected),
            _ => None,
        }
    }

    /// Whether other controls can be created inside this one.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ControlState::Window { .. } | ControlState::Frame { .. } | ControlState::RadioGroup { .. }
        )
    }

    /// Whether keyboard focus can land here.
    pub fn is_focusable(&self) -> bool {
        self.trigger().is_some()
    }

    /// The raw value, before any per-kind normalization.
    pub fn read(&self) -> Option<Value> {
        match self {
            ControlState::TextField { text, .. } | ControlState::TextArea { text, .. } => {
                Some(Value::Text(text.clone()))
            }
            ControlState::CheckBox { checked, .. } => Some(Value::Bool(*checked)),
            ControlState::RadioGroup { value } => Some(Value::Text(value.clone())),
            ControlState::ListBox { selection, .. } => Some(Value::Selection(selection.clone())),
            ControlState::Slider { value, .. } | ControlState::ProgressBar { value, .. } => {
                Some(Value::Number(*value))
            }
            ControlState::ComboBox { current, .. } => current.map(Value::Index),
            ControlState::TreeView { selection, .. } => Some(Value::Items(selection.clone())),
            _ => None,
        }
    }

    /// Replace the control's value.
    ///
    /// Numbers are clamped into range; list selections drop rows that do not
    /// exist. A value of the wrong shape is refused and leaves the control
    /// unchanged. A check box takes only a `Bool`. Radio groups are written
    /// through [`ControlTree::write`], which knows their options.
    pub fn write(&mut self, value: &Value) -> Result<(), BackendError> {
        let control = self.name();
        let mismatch = || BackendError::TypeMismatch {
            control,
            value: value.type_name(),
        };
        match (self, value) {
            (ControlState::Window { title, .. }, Value::Text(t))
            | (ControlState::Label { text: title }, Value::Text(t))
            | (ControlState::Button { text: title }, Value::Text(t))
            | (ControlState::TextField { text: title, .. }, Value::Text(t))
            | (ControlState::TextArea { text: title, .. }, Value::Text(t)) => {
                title.clone_from(t);
            }
            (ControlState::Frame { title }, Value::Text(t)) => *title = Some(t.clone()),
            (ControlState::CheckBox { checked, .. }, Value::Bool(b)) => *checked = *b,
            (
                ControlState::ListBox {
                    items,
                    selection,
                    mode,
                    cursor,
                    ..
                },
                Value::Selection(rows),
            ) => {
                let mut rows: Vec<usize> = rows.iter().copied().filter(|&r| r < items.len()).collect();
                rows.sort_unstable();
                rows.dedup();
                if !mode.is_multi() {
                    rows.truncate(1);
                }
                if let Some(&first) = rows.first() {
                    *cursor = first;
                }
                *selection = rows;
            }
            (
                ControlState::ListBox {
                    items,
                    selection,
                    cursor,
                    ..
                },
                Value::Items(new_items),
            ) => {
                items.clone_from(new_items);
                selection.clear();
                *cursor = 0;
            }
            (
                ControlState::Slider {
                    from,
                    to,
                    value: v,
                    resolution,
                    ..
                },
                Value::Number(n),
            ) => {
                *v = snap(*n, *from, *to, *resolution);
            }
            (ControlState::ProgressBar { value: v, maximum, .. }, Value::Number(n)) => {
                *v = n.clamp(0.0, maximum.max(0.0));
            }
            (ControlState::ComboBox { values, current }, Value::Index(i)) => {
                if *i >= values.len() {
                    return Err(mismatch());
                }
                *current = Some(*i);
            }
            (ControlState::ComboBox { values, current }, Value::Text(t)) => {
                let index = values.iter().position(|v| v == t).ok_or_else(mismatch)?;
                *current = Some(index);
            }
            (ControlState::ComboBox { values, current }, Value::Items(new_values)) => {
                values.clone_from(new_values);
                *current = None;
            }
            (ControlState::TreeView { items, selection, .. }, Value::Items(ids)) => {
                let known = TreeItem::flatten(items);
                *selection = ids
                    .iter()
                    .filter(|id| known.iter().any(|(_, item)| &item.id == *id))
                    .cloned()
                    .collect();
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }

    // -- user edits ---------------------------------------------------------

    /// Type one character into a text control. TextFields ignore newlines.
    pub fn push_char(&mut self, ch: char) -> bool {
        match self {
            ControlState::TextField { text, .. } if ch != '\n' => {
                text.push(ch);
                true
            }
            ControlState::TextArea { text, .. } => {
                text.push(ch);
                true
            }
            _ => false,
        }
    }

    /// Delete the last character of a text control.
    pub fn pop_char(&mut self) -> bool {
        match self {
            ControlState::TextField { text, .. } | ControlState::TextArea { text, .. } => {
                text.pop().is_some()
            }
            _ => false,
        }
    }

    pub fn toggle(&mut self) -> bool {
        match self {
            ControlState::CheckBox { checked, .. } => {
                *checked = !*checked;
                true
            }
            _ => false,
        }
    }

    /// Move a ListBox cursor. Single-selection modes follow the cursor.
    pub fn step_list(&mut self, delta: isize) -> bool {
        match self {
            ControlState::ListBox {
                items,
                selection,
                mode,
                cursor,
                ..
            } if !items.is_empty() => {
                let next = step_index(*cursor, items.len(), delta);
                *cursor = next;
                if mode.is_multi() || selection.as_slice() == [next] {
                    return false;
                }
                *selection = vec![next];
                true
            }
            _ => false,
        }
    }

    /// Select (or, in multi-select modes, toggle) the row under the cursor.
    pub fn toggle_list_cursor(&mut self) -> bool {
        match self {
            ControlState::ListBox {
                items,
                selection,
                mode,
                cursor,
                ..
            } if *cursor < items.len() => {
                if mode.is_multi() {
                    match selection.iter().position(|&r| r == *cursor) {
                        Some(i) => {
                            selection.remove(i);
                        }
                        None => {
                            selection.push(*cursor);
                            selection.sort_unstable();
                        }
                    }
                    true
                } else if selection.as_slice() != [*cursor] {
                    *selection = vec![*cursor];
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub fn step_combo(&mut self, delta: isize) -> bool {
        match self {
            ControlState::ComboBox { values, current } if !values.is_empty() => {
                let next = match *current {
                    Some(i) => step_index(i, values.len(), delta),
                    None => 0,
                };
                let changed = *current != Some(next);
                *current = Some(next);
                changed
            }
            _ => false,
        }
    }

    /// Advance a combo box to its next value, wrapping at the end.
    pub fn cycle_combo(&mut self) -> bool {
        match self {
            ControlState::ComboBox { values, current } if !values.is_empty() => {
                let next = current.map_or(0, |i| (i + 1) % values.len());
                let changed = *current != Some(next);
                *current = Some(next);
                changed
            }
            _ => false,
        }
    }

    /// Move a slider by whole resolution steps.
    pub fn step_slider(&mut self, steps: isize) -> bool {
        match self {
            ControlState::Slider {
                from,
                to,
                value,
                resolution,
                ..
            } => {
                let step = if *resolution > 0.0 { *resolution } else { 1.0 };
                let direction = if to >= from { 1.0 } else { -1.0 };
                let next = snap(*value + direction * step * steps as f64, *from, *to, *resolution);
                let changed = next != *value;
                *value = next;
                changed
            }
            _ => false,
        }
    }

    /// Move a TreeView cursor over the flattened items, selecting as it goes.
    pub fn step_tree(&mut self, delta: isize) -> bool {
        match self {
            ControlState::TreeView {
                items,
                selection,
                cursor,
                ..
            } => {
                let flat = TreeItem::flatten(items);
                if flat.is_empty() {
                    return false;
                }
                let next = if selection.is_empty() {
                    (*cursor).min(flat.len() - 1)
                } else {
                    step_index(*cursor, flat.len(), delta)
                };
                let id = flat[next].1.id.clone();
                *cursor = next;
                if selection.as_slice() == [id.clone()] {
                    return false;
                }
                *selection = vec![id];
                true
            }
            _ => false,
        }
    }
}

fn step_index(current: usize, len: usize, delta: isize) -> usize {
    let max = len.saturating_sub(1) as isize;
    (current as isize + delta).clamp(0, max) as usize
}

/// Clamp `value` into the slider's range and round it to the resolution grid.
fn snap(value: f64, from: f64, to: f64, resolution: f64) -> f64 {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    // A NaN bound has no range to clamp into.
    if !(lo <= hi) {
        return value;
    }
    let mut v = value.clamp(lo, hi);
    if resolution > 0.0 {
        v = from + ((v - from) / resolution).round() * resolution;
        v = v.clamp(lo, hi);
    }
    v
}

// ---------------------------------------------------------------------------
// ControlTree
// ---------------------------------------------------------------------------

/// One control in the arena.
#[derive(Debug, Clone)]
pub struct Control {
    pub state: ControlState,
    /// Grid position once placed.
    pub cell: Option<GridCell>,
    /// Triggers the owner asked to hear about.
    pub triggers: Vec<Trigger>,
}

impl Control {
    fn new(state: ControlState) -> Self {
        Self {
            state,
            cell: None,
            triggers: Vec::new(),
        }
    }
}

/// Arena of native controls with parent/child links.
///
/// Removal takes the whole subtree; handles of removed controls go stale and
/// every lookup through them fails with [`BackendError::StaleWidget`].
#[derive(Debug, Default)]
pub struct ControlTree {
    nodes: SlotMap<Handle, Control>,
    children: SecondaryMap<Handle, Vec<Handle>>,
    parent: SecondaryMap<Handle, Handle>,
    roots: Vec<Handle>,
}

impl ControlTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a top-level control.
    pub fn insert_root(&mut self, state: ControlState) -> Handle {
        let id = self.nodes.insert(Control::new(state));
        self.children.insert(id, Vec::new());
        self.roots.push(id);
        id
    }

    /// Insert a control as the last child of `parent`.
    pub fn insert_child(&mut self, parent: Handle, state: ControlState) -> Result<Handle, BackendError> {
        if !self.nodes.contains_key(parent) {
            return Err(BackendError::StaleWidget(parent));
        }
        let id = self.nodes.insert(Control::new(state));
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        Ok(id)
    }

    /// Remove a control and all its descendants, returning the control.
    pub fn remove(&mut self, id: Handle) -> Option<Control> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }
        self.roots.retain(|&r| r != id);

        let mut to_remove = VecDeque::from([id]);
        let mut removed = None;
        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            let control = self.nodes.remove(current);
            if current == id {
                removed = control;
            }
        }
        removed
    }

    pub fn get(&self, id: Handle) -> Result<&Control, BackendError> {
        self.nodes.get(id).ok_or(BackendError::StaleWidget(id))
    }

    pub fn get_mut(&mut self, id: Handle) -> Result<&mut Control, BackendError> {
        self.nodes.get_mut(id).ok_or(BackendError::StaleWidget(id))
    }

    pub fn contains(&self, id: Handle) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn parent(&self, id: Handle) -> Option<Handle> {
        self.parent.get(id).copied()
    }

    pub fn children(&self, id: Handle) -> &[Handle] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Top-level controls in creation order.
    pub fn roots(&self) -> &[Handle] {
        &self.roots
    }

    /// The top-level control `id` lives under.
    pub fn root_of(&self, id: Handle) -> Option<Handle> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        let mut current = id;
        while let Some(p) = self.parent(current) {
            current = p;
        }
        Some(current)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: Handle) -> Vec<Handle> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    pub fn place(&mut self, id: Handle, cell: GridCell) -> Result<(), BackendError> {
        self.get_mut(id)?.cell = Some(cell);
        Ok(())
    }

    pub fn bind(&mut self, id: Handle, trigger: Trigger) -> Result<(), BackendError> {
        let control = self.get_mut(id)?;
        if !control.triggers.contains(&trigger) {
            control.triggers.push(trigger);
        }
        Ok(())
    }

    /// The event for `trigger` on `id`, if the owner bound it.
    pub fn emit(&self, id: Handle, trigger: Trigger) -> Option<NativeEvent> {
        self.nodes
            .get(id)
            .filter(|c| c.triggers.contains(&trigger))
            .map(|_| NativeEvent::Widget { handle: id, trigger })
    }

    /// Make `option` the chosen value of its RadioGroup.
    pub fn select_radio(&mut self, option: Handle) -> Result<(), BackendError> {
        let value = match &self.get(option)?.state {
            ControlState::RadioOption { value, .. } => value.clone(),
            other => {
                return Err(BackendError::TypeMismatch {
                    control: other.name(),
                    value: "radio choice",
                })
            }
        };
        let group = self
            .parent(option)
            .ok_or_else(|| BackendError::NotFound("radio group of option".into()))?;
        match &mut self.get_mut(group)?.state {
            ControlState::RadioGroup { value: shared } => {
                *shared = value;
                Ok(())
            }
            other => Err(BackendError::TypeMismatch {
                control: other.name(),
                value: "radio choice",
            }),
        }
    }

    /// Replace a control's value, see [`ControlState::write`].
    ///
    /// A radio group takes the text of one of its options' values; anything
    /// else is refused.
    pub fn write(&mut self, id: Handle, value: &Value) -> Result<(), BackendError> {
        let control = self.get_mut(id)?;
        if !matches!(control.state, ControlState::RadioGroup { .. }) {
            return control.state.write(value);
        }
        let mismatch = BackendError::TypeMismatch {
            control: "radio group",
            value: value.type_name(),
        };
        let Value::Text(wanted) = value else {
            return Err(mismatch);
        };
        let option = self.children(id).iter().copied().find(|&option| {
            matches!(
                self.nodes.get(option).map(|c| &c.state),
                Some(ControlState::RadioOption { value, .. }) if value == wanted
            )
        });
        match option {
            Some(option) => self.select_radio(option),
            None => Err(mismatch),
        }
    }

    /// Whether a RadioOption is the chosen one in its group.
    pub fn radio_checked(&self, option: Handle) -> bool {
        let Ok(Control {
            state: ControlState::RadioOption { value, .. },
            ..
        }) = self.get(option)
        else {
            return false;
        };
        match self.parent(option).and_then(|g| self.nodes.get(g)) {
            Some(Control {
                state: ControlState::RadioGroup { value: shared },
                ..
            }) => shared == value,
            _ => false,
        }
    }

    /// The primary user action on a control (click, Enter or Space).
    ///
    /// Returns the trigger that action reports, or `None` if the control has
    /// no primary action or nothing changed.
    pub fn activate(&mut self, id: Handle) -> Result<Option<Trigger>, BackendError> {
        let kind = self.get(id)?.state.kind();
        let trigger = match kind {
            ControlKind::Widget(WidgetKind::Button) => Some(Trigger::Click),
            ControlKind::Widget(WidgetKind::CheckBox) => {
                self.get_mut(id)?.state.toggle();
                Some(Trigger::Toggled)
            }
            ControlKind::RadioOption => {
                self.select_radio(id)?;
                Some(Trigger::RadioSelected)
            }
            ControlKind::Widget(WidgetKind::ListBox) => self
                .get_mut(id)?
                .state
                .toggle_list_cursor()
                .then_some(Trigger::ListboxSelectionChanged),
            ControlKind::Widget(WidgetKind::TreeView) => self
                .get_mut(id)?
                .state
                .step_tree(0)
                .then_some(Trigger::TreeviewSelected),
            ControlKind::Widget(WidgetKind::ComboBox) => self
                .get_mut(id)?
                .state
                .cycle_combo()
                .then_some(Trigger::ComboboxSelected),
            _ => None,
        };
        Ok(trigger)
    }
}
