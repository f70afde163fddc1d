//! Widget values as returned by `poll` and `get` and accepted by `set`.

use std::fmt;

use indexmap::IndexMap;

/// The normalized value of one control.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Entry text, text-area buffer, or a chosen radio option's value.
    Text(String),
    /// Check box state.
    Bool(bool),
    /// Chosen ComboBox index.
    Index(usize),
    /// Selected ListBox rows.
    Selection(Vec<usize>),
    /// Slider or ProgressBar position.
    Number(f64),
    /// Selected TreeView item ids, or a replacement item list.
    Items(Vec<String>),
}

/// One tick's snapshot: widget key to value, in resolution order. Keys whose
/// control carries no value map to `None`.
pub type ValueMap = IndexMap<String, Option<Value>>;

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Value::Index(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_selection(&self) -> Option<&[usize]> {
        match self {
            Value::Selection(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[String]> {
        match self {
            Value::Items(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Bool(_) => "bool",
            Value::Index(_) => "index",
            Value::Selection(_) => "selection",
            Value::Number(_) => "number",
            Value::Items(_) => "items",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Index(i) => write!(f, "{i}"),
            Value::Selection(rows) => write!(f, "{rows:?}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Items(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Index(i)
    }
}

impl From<Vec<usize>> for Value {
    fn from(rows: Vec<usize>) -> Self {
        Value::Selection(rows)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::Items(items)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_text() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        assert_eq!(Value::from("x").as_text(), Some("x"));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(2usize).as_index(), Some(2));
        assert_eq!(Value::from(vec![0usize, 3]).as_selection(), Some(&[0, 3][..]));
        assert_eq!(Value::from(1.5).as_number(), Some(1.5));
        assert_eq!(Value::from("x").as_bool(), None);
    }

    #[test]
    fn compares_against_str() {
        assert_eq!(Value::from("xyz"), "xyz");
        assert!(Value::Bool(true) != "true");
    }

    #[test]
    fn display_is_plain() {
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Selection(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::Items(vec!["a".into(), "b".into()]).to_string(), "a, b");
    }
}
