//! Widget descriptors: identity, kind, grid placement and per-kind options.
//!
//! A [`Descriptor`] is pure data. It is created once from a per-kind record
//! (see [`widgets`]), gets its grid placement written by the layout resolver,
//! and is then only read by the materializer.

pub mod args;
pub mod id;
pub mod kind;
pub mod widgets;

pub use args::ArgValue;
pub use id::{WidgetId, WindowId};
pub use kind::{Orient, ProgressMode, SelectMode, Sticky, WidgetKind};
pub use widgets::{
    Button, CheckBox, ComboBox, Command, Common, Frame, Label, ListBox, ProgressBar, RadioGroup,
    Slider, TextArea, TextField, TreeItem, TreeView,
};

use crate::layout::Layout;

/// Errors raised while building a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("unknown widget kind: {0}")]
    UnknownKind(String),
    #[error("{kind} does not accept option `{option}`")]
    UnknownOption { kind: WidgetKind, option: String },
    #[error("invalid value for {kind} option `{option}`: expected {expected}")]
    InvalidOption {
        kind: WidgetKind,
        option: String,
        expected: &'static str,
    },
    #[error("invalid sticky value: {0}")]
    InvalidSticky(String),
}

// ---------------------------------------------------------------------------
// WidgetSpec
// ---------------------------------------------------------------------------

/// The kind-tagged configuration of one widget.
#[derive(Debug, Clone)]
pub enum WidgetSpec {
    Label(Label),
    Button(Button),
    TextField(TextField),
    TextArea(TextArea),
    ListBox(ListBox),
    RadioGroup(RadioGroup),
    CheckBox(CheckBox),
    Frame(Frame),
    Slider(Slider),
    ComboBox(ComboBox),
    ProgressBar(ProgressBar),
    TreeView(TreeView),
}

impl WidgetSpec {
    /// A record of the given kind with every option at its default and no
    /// required argument filled in.
    pub fn blank(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Label => WidgetSpec::Label(Label::default()),
            WidgetKind::Button => WidgetSpec::Button(Button::default()),
            WidgetKind::TextField => WidgetSpec::TextField(TextField::default()),
            WidgetKind::TextArea => WidgetSpec::TextArea(TextArea::default()),
            WidgetKind::ListBox => WidgetSpec::ListBox(ListBox::default()),
            WidgetKind::RadioGroup => WidgetSpec::RadioGroup(RadioGroup::default()),
            WidgetKind::CheckBox => WidgetSpec::CheckBox(CheckBox::default()),
            WidgetKind::Frame => WidgetSpec::Frame(Frame::default()),
            WidgetKind::Slider => WidgetSpec::Slider(Slider::default()),
            WidgetKind::ComboBox => WidgetSpec::ComboBox(ComboBox::default()),
            WidgetKind::ProgressBar => WidgetSpec::ProgressBar(ProgressBar::default()),
            WidgetKind::TreeView => WidgetSpec::TreeView(TreeView::default()),
        }
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            WidgetSpec::Label(_) => WidgetKind::Label,
            WidgetSpec::Button(_) => WidgetKind::Button,
            WidgetSpec::TextField(_) => WidgetKind::TextField,
            WidgetSpec::TextArea(_) => WidgetKind::TextArea,
            WidgetSpec::ListBox(_) => WidgetKind::ListBox,
            WidgetSpec::RadioGroup(_) => WidgetKind::RadioGroup,
            WidgetSpec::CheckBox(_) => WidgetKind::CheckBox,
            WidgetSpec::Frame(_) => WidgetKind::Frame,
            WidgetSpec::Slider(_) => WidgetKind::Slider,
            WidgetSpec::ComboBox(_) => WidgetKind::ComboBox,
            WidgetSpec::ProgressBar(_) => WidgetKind::ProgressBar,
            WidgetSpec::TreeView(_) => WidgetKind::TreeView,
        }
    }

    pub fn common(&self) -> &Common {
        match self {
            WidgetSpec::Label(w) => &w.common,
            WidgetSpec::Button(w) => &w.common,
            WidgetSpec::TextField(w) => &w.common,
            WidgetSpec::TextArea(w) => &w.common,
            WidgetSpec::ListBox(w) => &w.common,
            WidgetSpec::RadioGroup(w) => &w.common,
            WidgetSpec::CheckBox(w) => &w.common,
            WidgetSpec::Frame(w) => &w.common,
            WidgetSpec::Slider(w) => &w.common,
            WidgetSpec::ComboBox(w) => &w.common,
            WidgetSpec::ProgressBar(w) => &w.common,
            WidgetSpec::TreeView(w) => &w.common,
        }
    }

    pub(crate) fn common_mut(&mut self) -> &mut Common {
        match self {
            WidgetSpec::Label(w) => &mut w.common,
            WidgetSpec::Button(w) => &mut w.common,
            WidgetSpec::TextField(w) => &mut w.common,
            WidgetSpec::TextArea(w) => &mut w.common,
            WidgetSpec::ListBox(w) => &mut w.common,
            WidgetSpec::RadioGroup(w) => &mut w.common,
            WidgetSpec::CheckBox(w) => &mut w.common,
            WidgetSpec::Frame(w) => &mut w.common,
            WidgetSpec::Slider(w) => &mut w.common,
            WidgetSpec::ComboBox(w) => &mut w.common,
            WidgetSpec::ProgressBar(w) => &mut w.common,
            WidgetSpec::TreeView(w) => &mut w.common,
        }
    }

    /// The `text` argument, if the kind has one. A Frame's title counts.
    pub fn text(&self) -> Option<&str> {
        match self {
            WidgetSpec::Label(w) => w.text.as_deref(),
            WidgetSpec::Button(w) => w.text.as_deref(),
            WidgetSpec::TextField(w) => w.text.as_deref(),
            WidgetSpec::TextArea(w) => w.text.as_deref(),
            WidgetSpec::CheckBox(w) => w.text.as_deref(),
            WidgetSpec::Frame(w) => w.title.as_deref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Grid position inside the owning container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub row: usize,
    pub column: usize,
    /// Columns covered, at least 1.
    pub column_span: usize,
    pub sticky: Sticky,
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// One declared widget: id, resolved key, configuration and grid placement.
#[derive(Debug, Clone)]
pub struct Descriptor {
    id: WidgetId,
    key: String,
    spec: WidgetSpec,
    placement: Placement,
    in_frame: bool,
}

impl Descriptor {
    /// Wrap a configuration record, allocating a fresh id.
    ///
    /// The key is the explicit key if one was given, else the `text`
    /// argument, else `widget_<id>`. Empty strings count as absent.
    pub fn new(spec: WidgetSpec) -> Self {
        let id = WidgetId::next();
        let key = spec
            .common()
            .key
            .as_deref()
            .filter(|k| !k.is_empty())
            .or_else(|| spec.text().filter(|t| !t.is_empty()))
            .map(str::to_owned)
            .unwrap_or_else(|| format!("widget_{id}"));
        let placement = Placement {
            row: 0,
            column: 0,
            column_span: 1,
            sticky: spec.common().sticky,
        };
        Self {
            id,
            key,
            spec,
            placement,
            in_frame: false,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> WidgetKind {
        self.spec.kind()
    }

    pub fn spec(&self) -> &WidgetSpec {
        &self.spec
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn row(&self) -> usize {
        self.placement.row
    }

    pub fn column(&self) -> usize {
        self.placement.column
    }

    pub fn sticky(&self) -> Sticky {
        self.placement.sticky
    }

    /// Whether layout resolution found this widget inside a Frame.
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    /// The nested layout of a Frame descriptor.
    pub fn nested_layout(&self) -> Option<&Layout> {
        match &self.spec {
            WidgetSpec::Frame(frame) => Some(&frame.layout),
            _ => None,
        }
    }

    pub(crate) fn nested_layout_mut(&mut self) -> Option<&mut Layout> {
        match &mut self.spec {
            WidgetSpec::Frame(frame) => Some(&mut frame.layout),
            _ => None,
        }
    }

    pub(crate) fn set_placement(&mut self, placement: Placement, in_frame: bool) {
        self.placement = placement;
        self.in_frame = in_frame;
    }
}

impl From<WidgetSpec> for Descriptor {
    fn from(spec: WidgetSpec) -> Self {
        Descriptor::new(spec)
    }
}

macro_rules! descriptor_from {
    ($($ty:ident),* $(,)?) => {$(
        impl From<$ty> for Descriptor {
            fn from(record: $ty) -> Self {
                Descriptor::new(WidgetSpec::$ty(record))
            }
        }
    )*};
}

descriptor_from!(
    Label, Button, TextField, TextArea, ListBox, RadioGroup, CheckBox, Frame, Slider, ComboBox,
    ProgressBar, TreeView,
);

#[cfg(test)]
mod tests {
    use super::*;

    // ── Key resolution ───────────────────────────────────────────────

    #[test]
    fn explicit_key_wins() {
        let d = Descriptor::from(Label::new("hello").key("greeting"));
        assert_eq!(d.key(), "greeting");
    }

    #[test]
    fn text_is_second_choice() {
        let d = Descriptor::from(Button::new("Click Me"));
        assert_eq!(d.key(), "Click Me");
    }

    #[test]
    fn frame_title_counts_as_text() {
        let d = Descriptor::from(Frame::new(Layout::new()).title("Options"));
        assert_eq!(d.key(), "Options");
    }

    #[test]
    fn synthesized_key_uses_id() {
        let d = Descriptor::from(ListBox::new(["a"]));
        assert_eq!(d.key(), format!("widget_{}", d.id()));
    }

    #[test]
    fn empty_strings_fall_through() {
        let d = Descriptor::from(TextField::new("").key(""));
        assert_eq!(d.key(), format!("widget_{}", d.id()));
    }

    // ── Defaults ─────────────────────────────────────────────────────

    #[test]
    fn fresh_descriptor_defaults() {
        let d = Descriptor::from(CheckBox::new("c"));
        assert_eq!(d.kind(), WidgetKind::CheckBox);
        assert_eq!(d.row(), 0);
        assert_eq!(d.column(), 0);
        assert_eq!(d.placement().column_span, 1);
        assert_eq!(d.sticky(), Sticky::N);
        assert!(!d.in_frame());
    }

    #[test]
    fn sticky_carries_into_placement() {
        let d = Descriptor::from(Label::new("x").sticky(Sticky::NSEW));
        assert_eq!(d.sticky(), Sticky::NSEW);
    }

    #[test]
    fn ids_are_unique_per_construction() {
        let a = Descriptor::from(Label::new("a"));
        let b = Descriptor::from(Label::new("a"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn blank_spec_matches_kind() {
        for kind in WidgetKind::ALL {
            assert_eq!(WidgetSpec::blank(kind).kind(), kind);
        }
    }

    #[test]
    fn nested_layout_only_on_frames() {
        let frame = Descriptor::from(Frame::new(Layout::new()));
        let label = Descriptor::from(Label::new("l"));
        assert!(frame.nested_layout().is_some());
        assert!(label.nested_layout().is_none());
    }
}
