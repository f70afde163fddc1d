//! Dynamic option bag: build a descriptor from `(name, value)` pairs.
//!
//! This is the untyped entry point for callers that assemble widgets from
//! data. Every option name is checked against the kind's record at
//! construction time; unknown names and mistyped values are rejected here.
//! Required arguments are NOT checked here; a missing one surfaces when the
//! widget is materialized.

use super::kind::{Orient, ProgressMode, SelectMode, Sticky, WidgetKind};
use super::widgets::{Command, TreeItem};
use super::{Descriptor, DescriptorError, WidgetSpec};
use crate::layout::Layout;

/// A loosely typed option value.
#[derive(Debug, Clone)]
pub enum ArgValue {
    Text(String),
    Bool(bool),
    Integer(i64),
    Number(f64),
    List(Vec<String>),
    Pairs(Vec<(String, String)>),
    Tree(Vec<TreeItem>),
    Size(u16, u16),
    Sticky(Sticky),
    Layout(Layout),
    Command(Command),
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Text(s.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Text(s)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<i64> for ArgValue {
    fn from(n: i64) -> Self {
        ArgValue::Integer(n)
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        ArgValue::Number(n)
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(items: Vec<String>) -> Self {
        ArgValue::List(items)
    }
}

impl From<Vec<&str>> for ArgValue {
    fn from(items: Vec<&str>) -> Self {
        ArgValue::List(items.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<(&str, &str)>> for ArgValue {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        ArgValue::Pairs(
            pairs
                .into_iter()
                .map(|(l, v)| (l.to_owned(), v.to_owned()))
                .collect(),
        )
    }
}

impl From<Layout> for ArgValue {
    fn from(layout: Layout) -> Self {
        ArgValue::Layout(layout)
    }
}

impl From<Sticky> for ArgValue {
    fn from(sticky: Sticky) -> Self {
        ArgValue::Sticky(sticky)
    }
}

impl Descriptor {
    /// Build a descriptor of `kind` from named options.
    ///
    /// # Errors
    ///
    /// [`DescriptorError::UnknownOption`] for a name the kind does not
    /// recognise, [`DescriptorError::InvalidOption`] for a value of the wrong
    /// shape.
    pub fn from_args<I, K>(kind: WidgetKind, args: I) -> Result<Descriptor, DescriptorError>
    where
        I: IntoIterator<Item = (K, ArgValue)>,
        K: AsRef<str>,
    {
        let mut spec = WidgetSpec::blank(kind);
        for (name, value) in args {
            apply(&mut spec, name.as_ref(), value)?;
        }
        Ok(Descriptor::new(spec))
    }
}

fn apply(spec: &mut WidgetSpec, name: &str, value: ArgValue) -> Result<(), DescriptorError> {
    let kind = spec.kind();
    let arg = Arg { kind, name, value };
    match (spec, name) {
        (spec, "key") => spec.common_mut().key = Some(arg.text()?),
        (spec, "sticky") => spec.common_mut().sticky = arg.sticky()?,

        (WidgetSpec::Label(w), "text") => w.text = Some(arg.text()?),

        (WidgetSpec::Button(w), "text") => w.text = Some(arg.text()?),
        (WidgetSpec::Button(w), "command") => w.command = Some(arg.command()?),

        (WidgetSpec::TextField(w), "text") => w.text = Some(arg.text()?),
        (WidgetSpec::TextField(w), "width") => w.width = Some(arg.cells()?),

        (WidgetSpec::TextArea(w), "text") => w.text = Some(arg.text()?),
        (WidgetSpec::TextArea(w), "size") => w.size = arg.size()?,
        (WidgetSpec::TextArea(w), "width") => w.size.0 = arg.cells()?,
        (WidgetSpec::TextArea(w), "height") => w.size.1 = arg.cells()?,

        (WidgetSpec::CheckBox(w), "text") => w.text = Some(arg.text()?),
        (WidgetSpec::CheckBox(w), "checked") => w.checked = arg.flag()?,

        (WidgetSpec::RadioGroup(w), "options") => w.options = Some(arg.pairs()?),
        (WidgetSpec::RadioGroup(w), "group") => w.group = Some(arg.text()?),

        (WidgetSpec::ListBox(w), "items") => w.items = Some(arg.list()?),
        (WidgetSpec::ListBox(w), "select_mode") => w.select_mode = arg.text()?.parse::<SelectMode>()?,
        (WidgetSpec::ListBox(w), "height") => w.height = Some(arg.cells()?),

        (WidgetSpec::Frame(w), "text") => w.title = Some(arg.text()?),
        (WidgetSpec::Frame(w), "layout") => w.layout = arg.layout()?,

        (WidgetSpec::Slider(w), "from") => w.from = Some(arg.number()?),
        (WidgetSpec::Slider(w), "to") => w.to = Some(arg.number()?),
        (WidgetSpec::Slider(w), "orient") => w.orient = arg.text()?.parse::<Orient>()?,
        (WidgetSpec::Slider(w), "resolution") => w.resolution = arg.number()?,
        (WidgetSpec::Slider(w), "length") => w.length = Some(arg.cells()?),

        (WidgetSpec::ComboBox(w), "values") => w.values = Some(arg.list()?),
        (WidgetSpec::ComboBox(w), "current") => w.current = Some(arg.index()?),

        (WidgetSpec::ProgressBar(w), "mode") => w.mode = arg.text()?.parse::<ProgressMode>()?,
        (WidgetSpec::ProgressBar(w), "maximum") => w.maximum = arg.number()?,
        (WidgetSpec::ProgressBar(w), "value") => w.value = arg.number()?,
        (WidgetSpec::ProgressBar(w), "length") => w.length = Some(arg.cells()?),

        (WidgetSpec::TreeView(w), "items") => w.items = arg.tree()?,
        (WidgetSpec::TreeView(w), "height") => w.height = Some(arg.cells()?),

        _ => {
            return Err(DescriptorError::UnknownOption {
                kind,
                option: name.to_owned(),
            })
        }
    }
    Ok(())
}

/// One option being applied, with typed extractors.
struct Arg<'a> {
    kind: WidgetKind,
    name: &'a str,
    value: ArgValue,
}

impl Arg<'_> {
    fn invalid(&self, expected: &'static str) -> DescriptorError {
        DescriptorError::InvalidOption {
            kind: self.kind,
            option: self.name.to_owned(),
            expected,
        }
    }

    fn text(self) -> Result<String, DescriptorError> {
        match self.value {
            ArgValue::Text(s) => Ok(s),
            _ => Err(self.invalid("text")),
        }
    }

    fn flag(self) -> Result<bool, DescriptorError> {
        match self.value {
            ArgValue::Bool(b) => Ok(b),
            _ => Err(self.invalid("a boolean")),
        }
    }

    fn number(self) -> Result<f64, DescriptorError> {
        match self.value {
            ArgValue::Number(n) if n.is_finite() => Ok(n),
            ArgValue::Integer(n) => Ok(n as f64),
            _ => Err(self.invalid("a finite number")),
        }
    }

    fn index(self) -> Result<usize, DescriptorError> {
        match self.value {
            ArgValue::Integer(n) => usize::try_from(n).map_err(|_| self.invalid("an index")),
            _ => Err(self.invalid("an index")),
        }
    }

    fn cells(self) -> Result<u16, DescriptorError> {
        match self.value {
            ArgValue::Integer(n) => u16::try_from(n).map_err(|_| self.invalid("a cell count")),
            _ => Err(self.invalid("a cell count")),
        }
    }

    fn size(self) -> Result<(u16, u16), DescriptorError> {
        match self.value {
            ArgValue::Size(w, h) => Ok((w, h)),
            _ => Err(self.invalid("a (width, height) size")),
        }
    }

    fn list(self) -> Result<Vec<String>, DescriptorError> {
        match self.value {
            ArgValue::List(items) => Ok(items),
            _ => Err(self.invalid("a list of strings")),
        }
    }

    fn pairs(self) -> Result<Vec<(String, String)>, DescriptorError> {
        match self.value {
            ArgValue::Pairs(pairs) => Ok(pairs),
            _ => Err(self.invalid("label/value pairs")),
        }
    }

    fn tree(self) -> Result<Vec<TreeItem>, DescriptorError> {
        match self.value {
            ArgValue::Tree(items) => Ok(items),
            _ => Err(self.invalid("tree items")),
        }
    }

    fn sticky(self) -> Result<Sticky, DescriptorError> {
        match self.value {
            ArgValue::Sticky(s) => Ok(s),
            ArgValue::Text(s) => s.parse(),
            _ => Err(self.invalid("a sticky value")),
        }
    }

    fn layout(self) -> Result<Layout, DescriptorError> {
        match self.value {
            ArgValue::Layout(layout) => Ok(layout),
            _ => Err(self.invalid("a layout")),
        }
    }

    fn command(self) -> Result<Command, DescriptorError> {
        match self.value {
            ArgValue::Command(command) => Ok(command),
            _ => Err(self.invalid("a command")),
        }
    }
}
