//! Declarative layouts: rows of descriptors, possibly nesting frames.
//!
//! A [`Layout`] is either built row by row or from a flat list where every
//! descriptor gets its own row. [`resolve`] turns it into grid placements and
//! registry entries.

pub mod resolve;

pub use resolve::{resolve, is_reserved_key, LayoutError, Resolution};

use crate::descriptor::Descriptor;

/// Rows of widget descriptors, top to bottom, each row left to right.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    rows: Vec<Vec<Descriptor>>,
}

impl Layout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flat sequence of descriptors, each on its own row.
    pub fn flat(items: impl IntoIterator<Item = Descriptor>) -> Self {
        Self {
            rows: items.into_iter().map(|d| vec![d]).collect(),
        }
    }

    /// A sequence of rows.
    pub fn from_rows(rows: impl IntoIterator<Item = Vec<Descriptor>>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    /// Append a row (builder).
    pub fn row(mut self, row: impl IntoIterator<Item = Descriptor>) -> Self {
        self.rows.push(row.into_iter().collect());
        self
    }

    /// Append a single-widget row (builder).
    pub fn push(mut self, item: impl Into<Descriptor>) -> Self {
        self.rows.push(vec![item.into()]);
        self
    }

    pub fn rows(&self) -> &[Vec<Descriptor>] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<Descriptor>] {
        &mut self.rows
    }

    /// Number of top-level descriptors (frame contents not counted).
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widest row at this level.
    pub fn column_capacity(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Every descriptor, frames before their contents, depth-first.
    pub fn descriptors(&self) -> Vec<&Descriptor> {
        let mut out = Vec::new();
        for row in &self.rows {
            for d in row {
                out.push(d);
                if let Some(nested) = d.nested_layout() {
                    out.extend(nested.descriptors());
                }
            }
        }
        out
    }

    /// Find a descriptor by key anywhere in the tree.
    pub fn find(&self, key: &str) -> Option<&Descriptor> {
        self.descriptors().into_iter().find(|d| d.key() == key)
    }
}

/// Build a [`Layout`] from rows of widget records.
///
/// ```ignore
/// let layout = layout![
///     [Label::new("Name"), TextField::new("").key("name")],
///     [Button::new("OK")],
/// ];
/// ```
#[macro_export]
macro_rules! layout {
    ( $( [ $( $widget:expr ),* $(,)? ] ),* $(,)? ) => {
        $crate::layout::Layout::from_rows(vec![
            $( vec![ $( $crate::descriptor::Descriptor::from($widget) ),* ] ),*
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Button, Frame, Label, TextField};

    #[test]
    fn flat_layout_one_per_row() {
        let layout = Layout::flat([Label::new("a").into(), Label::new("b").into()]);
        assert_eq!(layout.rows().len(), 2);
        assert_eq!(layout.column_capacity(), 1);
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn macro_builds_rows() {
        let layout = layout![
            [Label::new("Name"), TextField::new("bob")],
            [Button::new("OK")],
        ];
        assert_eq!(layout.rows().len(), 2);
        assert_eq!(layout.rows()[0].len(), 2);
        assert_eq!(layout.column_capacity(), 2);
    }

    #[test]
    fn builder_rows() {
        let layout = Layout::new()
            .push(Label::new("a"))
            .row([Label::new("b").into(), Label::new("c").into()]);
        assert_eq!(layout.len(), 3);
        assert!(!layout.is_empty());
        assert!(Layout::new().is_empty());
    }

    #[test]
    fn descriptors_walks_into_frames() {
        let layout = layout![
            [Frame::new(layout![[Label::new("inner")]]).key("f")],
            [Label::new("outer")],
        ];
        let keys: Vec<&str> = layout.descriptors().iter().map(|d| d.key()).collect();
        assert_eq!(keys, vec!["f", "inner", "outer"]);
        assert!(layout.find("inner").is_some());
        assert!(layout.find("missing").is_none());
    }
}
