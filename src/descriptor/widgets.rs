//! Per-kind configuration records.
//!
//! Each widget kind has its own record enumerating every option it accepts.
//! The typed constructors (`Label::new`, `Slider::new`, ...) always fill the
//! kind's required arguments; the records keep them as `Option` only because
//! the dynamic [`Descriptor::from_args`](super::Descriptor::from_args) path can
//! leave one out, which is reported when the widget is materialized.

use std::fmt;
use std::rc::Rc;

use super::kind::{Orient, ProgressMode, SelectMode, Sticky};
use crate::layout::Layout;

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// Options every kind accepts.
#[derive(Debug, Clone, Default)]
pub struct Common {
    /// Explicit caller key. Takes precedence over the text-derived key.
    pub key: Option<String>,
    /// Alignment inside the grid cell.
    pub sticky: Sticky,
}

/// A button callback. Invoked before the button's click event is captured.
#[derive(Clone)]
pub struct Command(Rc<dyn Fn()>);

impl Command {
    /// Wrap a closure.
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Command(..)")
    }
}

/// One node of a TreeView.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub id: String,
    pub text: String,
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    /// Create a leaf item.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Append a child item (builder).
    pub fn child(mut self, item: TreeItem) -> Self {
        self.children.push(item);
        self
    }

    /// Pre-order flattening as `(depth, item)` pairs.
    pub fn flatten(items: &[TreeItem]) -> Vec<(usize, &TreeItem)> {
        fn walk<'a>(items: &'a [TreeItem], depth: usize, out: &mut Vec<(usize, &'a TreeItem)>) {
            for item in items {
                out.push((depth, item));
                walk(&item.children, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(items, 0, &mut out);
        out
    }
}

macro_rules! common_builders {
    ($($ty:ident),* $(,)?) => {$(
        impl $ty {
            /// Set an explicit widget key (builder).
            pub fn key(mut self, key: impl Into<String>) -> Self {
                self.common.key = Some(key.into());
                self
            }

            /// Set the grid alignment hint (builder).
            pub fn sticky(mut self, sticky: Sticky) -> Self {
                self.common.sticky = sticky;
                self
            }
        }
    )*};
}

common_builders!(
    Label, Button, TextField, TextArea, CheckBox, RadioGroup, ListBox, Frame, Slider, ComboBox,
    ProgressBar, TreeView,
);

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Static text. Required: `text`.
#[derive(Debug, Clone, Default)]
pub struct Label {
    pub(crate) common: Common,
    pub(crate) text: Option<String>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Push button. Required: `text`.
#[derive(Debug, Clone, Default)]
pub struct Button {
    pub(crate) common: Common,
    pub(crate) text: Option<String>,
    pub(crate) command: Option<Command>,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Attach a callback run on every click, before the click event is captured.
    pub fn command(mut self, f: impl Fn() + 'static) -> Self {
        self.command = Some(Command::new(f));
        self
    }
}

/// Single-line text entry. Required: `text` (the initial content).
#[derive(Debug, Clone, Default)]
pub struct TextField {
    pub(crate) common: Common,
    pub(crate) text: Option<String>,
    pub(crate) width: Option<u16>,
}

impl TextField {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Visible width in characters.
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }
}

/// Multi-line text buffer. Required: `text`.
#[derive(Debug, Clone)]
pub struct TextArea {
    pub(crate) common: Common,
    pub(crate) text: Option<String>,
    pub(crate) size: (u16, u16),
}

impl TextArea {
    pub const DEFAULT_SIZE: (u16, u16) = (100, 100);

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Width in characters and height in lines.
    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.size = (width, height);
        self
    }
}

impl Default for TextArea {
    fn default() -> Self {
        Self {
            common: Common::default(),
            text: None,
            size: Self::DEFAULT_SIZE,
        }
    }
}

/// Boolean toggle. Required: `text`.
#[derive(Debug, Clone, Default)]
pub struct CheckBox {
    pub(crate) common: Common,
    pub(crate) text: Option<String>,
    pub(crate) checked: bool,
}

impl CheckBox {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Initial state.
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

/// A set of mutually exclusive options sharing one value.
/// Required: `options`, an ordered label → value mapping.
#[derive(Debug, Clone, Default)]
pub struct RadioGroup {
    pub(crate) common: Common,
    pub(crate) options: Option<Vec<(String, String)>>,
    pub(crate) group: Option<String>,
}

impl RadioGroup {
    pub fn new<L, V>(options: impl IntoIterator<Item = (L, V)>) -> Self
    where
        L: Into<String>,
        V: Into<String>,
    {
        Self {
            options: Some(
                options
                    .into_iter()
                    .map(|(label, value)| (label.into(), value.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Logical group name.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

/// Scrollable list of items. Required: `items`.
#[derive(Debug, Clone, Default)]
pub struct ListBox {
    pub(crate) common: Common,
    pub(crate) items: Option<Vec<String>>,
    pub(crate) select_mode: SelectMode,
    pub(crate) height: Option<u16>,
}

impl ListBox {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            items: Some(items.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn select_mode(mut self, mode: SelectMode) -> Self {
        self.select_mode = mode;
        self
    }

    /// Visible rows.
    pub fn height(mut self, height: u16) -> Self {
        self.height = Some(height);
        self
    }
}

/// Container with its own nested layout. A title makes it a titled group.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub(crate) common: Common,
    pub(crate) title: Option<String>,
    pub(crate) layout: Layout,
}

impl Frame {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

/// Numeric range control. Required: `from`, `to`.
#[derive(Debug, Clone)]
pub struct Slider {
    pub(crate) common: Common,
    pub(crate) from: Option<f64>,
    pub(crate) to: Option<f64>,
    pub(crate) orient: Orient,
    pub(crate) resolution: f64,
    pub(crate) length: Option<u16>,
}

impl Slider {
    pub fn new(from: f64, to: f64) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn orient(mut self, orient: Orient) -> Self {
        self.orient = orient;
        self
    }

    /// Step size for keyboard adjustment and value snapping.
    pub fn resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Track length in cells.
    pub fn length(mut self, length: u16) -> Self {
        self.length = Some(length);
        self
    }
}

impl Default for Slider {
    fn default() -> Self {
        Self {
            common: Common::default(),
            from: None,
            to: None,
            orient: Orient::default(),
            resolution: 1.0,
            length: None,
        }
    }
}

/// Drop-down choice among `values`. Required: `values`.
#[derive(Debug, Clone, Default)]
pub struct ComboBox {
    pub(crate) common: Common,
    pub(crate) values: Option<Vec<String>>,
    pub(crate) current: Option<usize>,
}

impl ComboBox {
    pub fn new(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Initially chosen index.
    pub fn current(mut self, index: usize) -> Self {
        self.current = Some(index);
        self
    }
}

/// Progress indicator. No required arguments.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    pub(crate) common: Common,
    pub(crate) mode: ProgressMode,
    pub(crate) maximum: f64,
    pub(crate) value: f64,
    pub(crate) length: Option<u16>,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: ProgressMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = maximum;
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn length(mut self, length: u16) -> Self {
        self.length = Some(length);
        self
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            common: Common::default(),
            mode: ProgressMode::default(),
            maximum: 100.0,
            value: 0.0,
            length: None,
        }
    }
}

/// Hierarchical item list. No required arguments.
#[derive(Debug, Clone, Default)]
pub struct TreeView {
    pub(crate) common: Common,
    pub(crate) items: Vec<TreeItem>,
    pub(crate) height: Option<u16>,
}

impl TreeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(mut self, items: impl IntoIterator<Item = TreeItem>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    pub fn height(mut self, height: u16) -> Self {
        self.height = Some(height);
        self
    }
}
