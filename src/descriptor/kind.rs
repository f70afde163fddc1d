//! Closed widget-kind enumeration and the small option enums shared by
//! descriptors and native controls.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use super::DescriptorError;

// ---------------------------------------------------------------------------
// WidgetKind
// ---------------------------------------------------------------------------

/// Every widget type a layout can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Label,
    Button,
    TextField,
    TextArea,
    ListBox,
    RadioGroup,
    CheckBox,
    Frame,
    Slider,
    ComboBox,
    ProgressBar,
    TreeView,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 12] = [
        WidgetKind::Label,
        WidgetKind::Button,
        WidgetKind::TextField,
        WidgetKind::TextArea,
        WidgetKind::ListBox,
        WidgetKind::RadioGroup,
        WidgetKind::CheckBox,
        WidgetKind::Frame,
        WidgetKind::Slider,
        WidgetKind::ComboBox,
        WidgetKind::ProgressBar,
        WidgetKind::TreeView,
    ];

    /// The kind's display name (e.g. "TextField").
    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::Label => "Label",
            WidgetKind::Button => "Button",
            WidgetKind::TextField => "TextField",
            WidgetKind::TextArea => "TextArea",
            WidgetKind::ListBox => "ListBox",
            WidgetKind::RadioGroup => "RadioGroup",
            WidgetKind::CheckBox => "CheckBox",
            WidgetKind::Frame => "Frame",
            WidgetKind::Slider => "Slider",
            WidgetKind::ComboBox => "ComboBox",
            WidgetKind::ProgressBar => "ProgressBar",
            WidgetKind::TreeView => "TreeView",
        }
    }

    /// Whether a user action on this kind produces an event.
    pub fn is_interactive(self) -> bool {
        !matches!(
            self,
            WidgetKind::Label | WidgetKind::Frame | WidgetKind::ProgressBar
        )
    }

    /// Whether the bulk value read skips this kind (it carries no user value).
    pub fn has_value(self) -> bool {
        !matches!(
            self,
            WidgetKind::Label | WidgetKind::Button | WidgetKind::Frame
        )
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WidgetKind {
    type Err = DescriptorError;

    /// Parse a kind name case-insensitively. `RadioButton` is accepted as an
    /// alias of `RadioGroup`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "radiobutton" {
            return Ok(WidgetKind::RadioGroup);
        }
        WidgetKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(&lower))
            .ok_or_else(|| DescriptorError::UnknownKind(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Sticky
// ---------------------------------------------------------------------------

/// Grid-cell alignment hint, a bitmask of compass edges.
///
/// An edge in the mask pins the widget to that side of its cell; opposite
/// edges together stretch it. The default is `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sticky(pub u8);

impl Sticky {
    pub const NONE: Sticky = Sticky(0);
    pub const N: Sticky = Sticky(1);
    pub const S: Sticky = Sticky(2);
    pub const E: Sticky = Sticky(4);
    pub const W: Sticky = Sticky(8);
    pub const NSEW: Sticky = Sticky(15);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Sticky) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether no edge is set (centered).
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for Sticky {
    fn default() -> Self {
        Sticky::N
    }
}

impl BitOr for Sticky {
    type Output = Sticky;
    fn bitor(self, rhs: Self) -> Self::Output {
        Sticky(self.0 | rhs.0)
    }
}

impl fmt::Display for Sticky {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (edge, ch) in [
            (Sticky::N, 'N'),
            (Sticky::S, 'S'),
            (Sticky::E, 'E'),
            (Sticky::W, 'W'),
        ] {
            if self.contains(edge) {
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Sticky {
    type Err = DescriptorError;

    /// Parse a compass string such as `"N"`, `"nsew"` or `"we"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = Sticky::NONE;
        for ch in s.trim().chars() {
            out = out
                | match ch.to_ascii_uppercase() {
                    'N' => Sticky::N,
                    'S' => Sticky::S,
                    'E' => Sticky::E,
                    'W' => Sticky::W,
                    _ => return Err(DescriptorError::InvalidSticky(s.to_owned())),
                };
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Option enums
// ---------------------------------------------------------------------------

/// ListBox selection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectMode {
    /// At most one item, picked explicitly.
    Single,
    /// At most one item, following the cursor.
    #[default]
    Browse,
    /// Any number of items, each toggled individually.
    Multiple,
    /// Any number of items.
    Extended,
}

impl SelectMode {
    /// Whether more than one item may be selected at once.
    pub fn is_multi(self) -> bool {
        matches!(self, SelectMode::Multiple | SelectMode::Extended)
    }
}

impl FromStr for SelectMode {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(SelectMode::Single),
            "browse" => Ok(SelectMode::Browse),
            "multiple" => Ok(SelectMode::Multiple),
            "extended" => Ok(SelectMode::Extended),
            _ => Err(DescriptorError::InvalidOption {
                kind: WidgetKind::ListBox,
                option: "select_mode".into(),
                expected: "single, browse, multiple or extended",
            }),
        }
    }
}

/// Slider orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orient {
    #[default]
    Horizontal,
    Vertical,
}

impl FromStr for Orient {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Orient::Horizontal),
            "vertical" => Ok(Orient::Vertical),
            _ => Err(DescriptorError::InvalidOption {
                kind: WidgetKind::Slider,
                option: "orient".into(),
                expected: "horizontal or vertical",
            }),
        }
    }
}

/// ProgressBar display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProgressMode {
    #[default]
    Determinate,
    Indeterminate,
}

impl FromStr for ProgressMode {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "determinate" => Ok(ProgressMode::Determinate),
            "indeterminate" => Ok(ProgressMode::Indeterminate),
            _ => Err(DescriptorError::InvalidOption {
                kind: WidgetKind::ProgressBar,
                option: "mode".into(),
                expected: "determinate or indeterminate",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── WidgetKind ───────────────────────────────────────────────────

    #[test]
    fn kind_names_round_trip() {
        for kind in WidgetKind::ALL {
            assert_eq!(kind.name().parse::<WidgetKind>().unwrap(), kind);
        }
    }

    #[test]
    fn kind_parse_is_case_insensitive() {
        assert_eq!("textfield".parse::<WidgetKind>().unwrap(), WidgetKind::TextField);
        assert_eq!("RADIOBUTTON".parse::<WidgetKind>().unwrap(), WidgetKind::RadioGroup);
    }

    #[test]
    fn kind_parse_unknown() {
        assert_eq!(
            "Canvas".parse::<WidgetKind>(),
            Err(DescriptorError::UnknownKind("Canvas".into()))
        );
    }

    #[test]
    fn interactive_kinds() {
        assert!(WidgetKind::Button.is_interactive());
        assert!(WidgetKind::TreeView.is_interactive());
        assert!(!WidgetKind::Label.is_interactive());
        assert!(!WidgetKind::Frame.is_interactive());
    }

    #[test]
    fn valueless_kinds() {
        assert!(!WidgetKind::Label.has_value());
        assert!(!WidgetKind::Button.has_value());
        assert!(WidgetKind::CheckBox.has_value());
        assert!(WidgetKind::ProgressBar.has_value());
    }

    // ── Sticky ───────────────────────────────────────────────────────

    #[test]
    fn sticky_default_is_north() {
        assert_eq!(Sticky::default(), Sticky::N);
    }

    #[test]
    fn sticky_parse_and_display() {
        let s: Sticky = "we".parse().unwrap();
        assert!(s.contains(Sticky::W));
        assert!(s.contains(Sticky::E));
        assert!(!s.contains(Sticky::N));
        assert_eq!(s.to_string(), "EW");
        assert_eq!("nsew".parse::<Sticky>().unwrap(), Sticky::NSEW);
    }

    #[test]
    fn sticky_empty_string_is_centered() {
        assert!("".parse::<Sticky>().unwrap().is_empty());
    }

    #[test]
    fn sticky_parse_rejects_garbage() {
        assert!("north".parse::<Sticky>().is_err());
    }

    // ── Option enums ─────────────────────────────────────────────────

    #[test]
    fn select_mode_parse() {
        assert_eq!("single".parse::<SelectMode>().unwrap(), SelectMode::Single);
        assert!(SelectMode::Extended.is_multi());
        assert!(!SelectMode::default().is_multi());
        assert!("many".parse::<SelectMode>().is_err());
    }

    #[test]
    fn orient_and_progress_parse() {
        assert_eq!("Vertical".parse::<Orient>().unwrap(), Orient::Vertical);
        assert_eq!(
            "indeterminate".parse::<ProgressMode>().unwrap(),
            ProgressMode::Indeterminate
        );
    }
}
