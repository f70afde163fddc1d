//! Measuring and drawing individual controls.

use super::canvas::{Canvas, CellStyle};
use super::geometry::Region;
use crate::descriptor::{Orient, ProgressMode, TreeItem};
use crate::native::control::{ControlState, ControlTree};
use crate::native::Handle;

const DEFAULT_FIELD_WIDTH: u16 = 20;
const DEFAULT_TRACK: u16 = 20;
const MAX_LIST_ROWS: usize = 10;
/// Text areas are sized in characters; a terminal cannot honor huge ones.
const MAX_TEXT_AREA: (u16, u16) = (60, 12);

fn width_of(text: &str) -> u16 {
    u16::try_from(text.chars().count()).unwrap_or(u16::MAX)
}

fn rows(count: usize, requested: Option<u16>) -> u16 {
    requested.unwrap_or_else(|| count.clamp(1, MAX_LIST_ROWS) as u16).max(1)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Natural size of a leaf control in (columns, rows).
pub fn measure(state: &ControlState) -> (u16, u16) {
    match state {
        ControlState::Label { text } => {
            let lines: Vec<&str> = text.split('\n').collect();
            let w = lines.iter().map(|l| width_of(l)).max().unwrap_or(0);
            (w, lines.len().max(1) as u16)
        }
        ControlState::Button { text } => (width_of(text).saturating_add(4), 1),
        ControlState::TextField { width, .. } => (width.unwrap_or(DEFAULT_FIELD_WIDTH).saturating_add(2), 1),
        ControlState::TextArea { size, .. } => (
            size.0.clamp(1, MAX_TEXT_AREA.0),
            size.1.clamp(1, MAX_TEXT_AREA.1),
        ),
        ControlState::CheckBox { text, .. } => (width_of(text).saturating_add(4), 1),
        ControlState::RadioOption { label, .. } => (width_of(label).saturating_add(4), 1),
        ControlState::ListBox { items, height, .. } => {
            let w = items.iter().map(|i| width_of(i)).max().unwrap_or(0);
            (w.saturating_add(2).max(4), rows(items.len(), *height))
        }
        ControlState::Slider {
            from,
            to,
            orient,
            length,
            ..
        } => {
            let label = width_of(&format_number(*from)).max(width_of(&format_number(*to)));
            let track = length.unwrap_or(DEFAULT_TRACK).max(2);
            match orient {
                Orient::Horizontal => (track.saturating_add(1 + label), 1),
                Orient::Vertical => (label.max(1), track.saturating_add(1)),
            }
        }
        ControlState::ComboBox { values, .. } => {
            let w = values.iter().map(|v| width_of(v)).max().unwrap_or(0);
            (w.saturating_add(4), 1)
        }
        ControlState::ProgressBar { length, .. } => (length.unwrap_or(DEFAULT_TRACK).saturating_add(2), 1),
        ControlState::TreeView { items, height, .. } => {
            let flat = TreeItem::flatten(items);
            let w = flat
                .iter()
                .map(|(depth, item)| width_of(&item.text).saturating_add(2 * *depth as u16))
                .max()
                .unwrap_or(0);
            (w.max(4), rows(flat.len(), *height))
        }
        ControlState::Placeholder { text } => (width_of(text), 1),
        ControlState::Window { .. } | ControlState::Frame { .. } | ControlState::RadioGroup { .. } => (0, 0),
    }
}

/// First visible row so that `cursor` stays in a window of `visible` rows.
fn scroll_start(cursor: usize, visible: usize) -> usize {
    cursor.saturating_sub(visible.saturating_sub(1))
}

/// Draw one control into its region.
pub fn paint(canvas: &mut Canvas, tree: &ControlTree, handle: Handle, region: Region, focused: bool) {
    let Ok(control) = tree.get(handle) else {
        return;
    };
    let (x, y) = (region.x, region.y);
    let width = region.width.max(0) as usize;
    let plain = CellStyle::PLAIN;
    let focus_style = if focused { CellStyle::reverse() } else { plain };

    match &control.state {
        ControlState::Window { title, .. } => {
            canvas.put_str(x, y, title, CellStyle::bold(), width);
        }
        ControlState::Label { text } => {
            for (dy, line) in text.split('\n').enumerate() {
                canvas.put_str(x, y + dy as i32, line, plain, width);
            }
        }
        ControlState::Button { text } => {
            canvas.put_str(x, y, &format!("[ {text} ]"), focus_style, width);
        }
        ControlState::TextField { text, .. } => {
            let inner = width.saturating_sub(2);
            let count = text.chars().count();
            let visible: String = text.chars().skip(count.saturating_sub(inner)).collect();
            canvas.put_str(x, y, "[", plain, width);
            canvas.put_str(x + 1, y, &format!("{visible:<inner$}"), focus_style, inner);
            canvas.put_str(x + 1 + inner as i32, y, "]", plain, 1);
        }
        ControlState::TextArea { text, .. } => {
            let height = region.height.max(0) as usize;
            let lines: Vec<&str> = text.split('\n').collect();
            let start = lines.len().saturating_sub(height);
            let style = if focused {
                CellStyle::reverse()
            } else {
                CellStyle::underline()
            };
            for row in 0..height {
                let line = lines.get(start + row).copied().unwrap_or("");
                canvas.put_str(x, y + row as i32, &format!("{line:<width$}"), style, width);
            }
        }
        ControlState::CheckBox { text, checked } => {
            let mark = if *checked { 'x' } else { ' ' };
            canvas.put_str(x, y, &format!("[{mark}]"), focus_style, width);
            canvas.put_str(x + 3, y, &format!(" {text}"), plain, width.saturating_sub(3));
        }
        ControlState::RadioOption { label, .. } => {
            let mark = if tree.radio_checked(handle) { '*' } else { ' ' };
            canvas.put_str(x, y, &format!("({mark})"), focus_style, width);
            canvas.put_str(x + 3, y, &format!(" {label}"), plain, width.saturating_sub(3));
        }
        ControlState::ListBox {
            items,
            selection,
            cursor,
            ..
        } => {
            let visible = region.height.max(0) as usize;
            let start = scroll_start(*cursor, visible);
            for (row, (index, item)) in items.iter().enumerate().skip(start).take(visible).enumerate() {
                let selected = selection.contains(&index);
                let mark = if selected { '>' } else { ' ' };
                let style = match (focused && index == *cursor, selected) {
                    (true, _) => CellStyle::reverse(),
                    (false, true) => CellStyle::bold(),
                    (false, false) => plain,
                };
                canvas.put_str(x, y + row as i32, &format!("{mark} {item:<width$}"), style, width);
            }
        }
        ControlState::Frame { title: Some(title) } => {
            let right = region.right() - 1;
            let bottom = region.bottom() - 1;
            for cx in x..=right {
                canvas.put(cx, y, '─', plain);
                canvas.put(cx, bottom, '─', plain);
            }
            for cy in y..=bottom {
                canvas.put(x, cy, '│', plain);
                canvas.put(right, cy, '│', plain);
            }
            canvas.put(x, y, '┌', plain);
            canvas.put(right, y, '┐', plain);
            canvas.put(x, bottom, '└', plain);
            canvas.put(right, bottom, '┘', plain);
            canvas.put_str(x + 1, y, title, CellStyle::bold(), width.saturating_sub(2));
        }
        ControlState::Slider {
            from,
            to,
            value,
            orient,
            length,
            ..
        } => {
            let track = usize::from(length.unwrap_or(DEFAULT_TRACK).max(2));
            let span = to - from;
            let fraction = if span == 0.0 { 0.0 } else { ((value - from) / span).clamp(0.0, 1.0) };
            let knob = (fraction * (track - 1) as f64).round() as usize;
            let label = format_number(*value);
            match orient {
                Orient::Horizontal => {
                    for i in 0..track {
                        let (ch, style) = if i == knob { ('█', focus_style) } else { ('─', plain) };
                        canvas.put(x + i as i32, y, ch, style);
                    }
                    canvas.put_str(x + track as i32 + 1, y, &label, plain, width.saturating_sub(track + 1));
                }
                Orient::Vertical => {
                    for i in 0..track {
                        let (ch, style) = if i == knob { ('█', focus_style) } else { ('│', plain) };
                        canvas.put(x, y + i as i32, ch, style);
                    }
                    canvas.put_str(x, y + track as i32, &label, plain, width);
                }
            }
        }
        ControlState::ComboBox { values, current } => {
            let inner = width.saturating_sub(4);
            let shown = current.and_then(|i| values.get(i)).map(String::as_str).unwrap_or("");
            canvas.put_str(x, y, &format!("[{shown:<inner$} v]"), focus_style, width);
        }
        ControlState::ProgressBar {
            value,
            maximum,
            mode,
            ..
        } => {
            let inner = width.saturating_sub(2);
            let bar: String = match mode {
                ProgressMode::Determinate => {
                    let fraction = if *maximum > 0.0 { (value / maximum).clamp(0.0, 1.0) } else { 0.0 };
                    let filled = (fraction * inner as f64).round() as usize;
                    format!("{}{}", "#".repeat(filled), " ".repeat(inner - filled))
                }
                ProgressMode::Indeterminate => {
                    // The block walks with the value.
                    let at = if inner == 0 { 0 } else { (*value as usize) % inner };
                    (0..inner).map(|i| if i == at { '#' } else { ' ' }).collect()
                }
            };
            canvas.put_str(x, y, &format!("[{bar}]"), plain, width);
        }
        ControlState::TreeView {
            items,
            selection,
            cursor,
            ..
        } => {
            let flat = TreeItem::flatten(items);
            let visible = region.height.max(0) as usize;
            let start = scroll_start(*cursor, visible);
            for (row, (index, (depth, item))) in flat.iter().enumerate().skip(start).take(visible).enumerate() {
                let selected = selection.contains(&item.id);
                let style = match (focused && index == *cursor, selected) {
                    (true, _) => CellStyle::reverse(),
                    (false, true) => CellStyle::bold(),
                    (false, false) => plain,
                };
                let indent = "  ".repeat(*depth);
                canvas.put_str(x, y + row as i32, &format!("{indent}{}", item.text), style, width);
            }
        }
        ControlState::Placeholder { text } => {
            canvas.put_str(x, y, text, CellStyle::dim(), width);
        }
        ControlState::Frame { title: None } | ControlState::RadioGroup { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SelectMode;

    #[test]
    fn measure_text_controls() {
        assert_eq!(measure(&ControlState::Label { text: "Name:".into() }), (5, 1));
        assert_eq!(measure(&ControlState::Label { text: "a\nbcd".into() }), (3, 2));
        assert_eq!(measure(&ControlState::Button { text: "OK".into() }), (6, 1));
        assert_eq!(
            measure(&ControlState::TextField {
                text: "bob".into(),
                width: Some(5)
            }),
            (7, 1)
        );
    }

    #[test]
    fn text_area_is_clamped() {
        let area = ControlState::TextArea {
            text: String::new(),
            size: (100, 100),
        };
        assert_eq!(measure(&area), MAX_TEXT_AREA);
    }

    #[test]
    fn list_height_follows_items() {
        let list = ControlState::ListBox {
            items: vec!["one".into(), "three".into()],
            selection: Vec::new(),
            mode: SelectMode::Browse,
            cursor: 0,
            height: None,
        };
        assert_eq!(measure(&list), (7, 2));
    }

    #[test]
    fn text_field_shows_the_tail() {
        let mut tree = ControlTree::new();
        let root = tree.insert_root(ControlState::Window {
            title: String::new(),
            visible: true,
            size: None,
            resizable: true,
        });
        let field = tree
            .insert_child(
                root,
                ControlState::TextField {
                    text: "abcdefgh".into(),
                    width: Some(4),
                },
            )
            .unwrap();
        let mut canvas = Canvas::new(10, 1);
        paint(&mut canvas, &tree, field, Region::new(0, 0, 6, 1), false);
        assert_eq!(canvas.to_text(), "[efgh]");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        let mut tree = ControlTree::new();
        let root = tree.insert_root(ControlState::Window {
            title: String::new(),
            visible: true,
            size: None,
            resizable: true,
        });
        let bar = tree
            .insert_child(
                root,
                ControlState::ProgressBar {
                    value: 50.0,
                    maximum: 100.0,
                    mode: ProgressMode::Determinate,
                    length: Some(4),
                },
            )
            .unwrap();
        let mut canvas = Canvas::new(10, 1);
        paint(&mut canvas, &tree, bar, Region::new(0, 0, 6, 1), false);
        assert_eq!(canvas.to_text(), "[##  ]");
    }
}
