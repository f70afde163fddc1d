//! Grid geometry: control tree to screen regions, via taffy.
//!
//! Every container (window, frame, radio group) becomes a CSS grid with
//! auto-sized tracks packed to the top-left; every leaf gets its measured
//! size. A control's grid cell maps to explicit grid lines, and its sticky
//! edges to self-alignment on each axis.

use std::collections::HashMap;

use taffy::prelude::*;

use super::paint::measure;
use crate::descriptor::Sticky;
use crate::native::control::{ControlState, ControlTree};
use crate::native::{GridCell, Handle};

/// A rectangle in terminal cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Lay out the window rooted at `root` in a `viewport` of (columns, rows).
///
/// Returns the absolute region of every control under `root`, the root
/// included. A taffy failure yields an empty map.
pub fn compute(tree: &ControlTree, root: Handle, viewport: (u16, u16)) -> HashMap<Handle, Region> {
    let mut builder = Builder {
        tree,
        taffy: TaffyTree::new(),
        nodes: HashMap::new(),
    };
    let mut out = HashMap::new();
    let Ok(node) = builder.build(root, Some(viewport)) else {
        return out;
    };
    let available = Size {
        width: AvailableSpace::Definite(f32::from(viewport.0)),
        height: AvailableSpace::Definite(f32::from(viewport.1)),
    };
    if builder.taffy.compute_layout(node, available).is_err() {
        return out;
    }
    builder.collect(root, (0.0, 0.0), &mut out);
    out
}

struct Builder<'a> {
    tree: &'a ControlTree,
    taffy: TaffyTree<()>,
    nodes: HashMap<Handle, NodeId>,
}

impl Builder<'_> {
    fn build(&mut self, handle: Handle, viewport: Option<(u16, u16)>) -> taffy::TaffyResult<NodeId> {
        let tree = self.tree;
        let node = match tree.get(handle) {
            Ok(control) if control.state.is_container() => {
                let kids = tree
                    .children(handle)
                    .iter()
                    .map(|&child| self.build(child, None))
                    .collect::<taffy::TaffyResult<Vec<_>>>()?;
                self.taffy
                    .new_with_children(container_style(&control.state, control.cell, viewport), &kids)?
            }
            Ok(control) => self.taffy.new_leaf(leaf_style(&control.state, control.cell))?,
            Err(_) => self.taffy.new_leaf(Style::default())?,
        };
        self.nodes.insert(handle, node);
        Ok(node)
    }

    fn collect(&self, handle: Handle, origin: (f32, f32), out: &mut HashMap<Handle, Region>) {
        let Some(layout) = self.nodes.get(&handle).and_then(|&n| self.taffy.layout(n).ok()) else {
            return;
        };
        let x = origin.0 + layout.location.x;
        let y = origin.1 + layout.location.y;
        out.insert(
            handle,
            Region::new(
                x.round() as i32,
                y.round() as i32,
                layout.size.width.round() as i32,
                layout.size.height.round() as i32,
            ),
        );
        for &child in self.tree.children(handle) {
            self.collect(child, (x, y), out);
        }
    }
}

fn container_style(state: &ControlState, cell: Option<GridCell>, viewport: Option<(u16, u16)>) -> Style {
    let mut style = Style {
        display: Display::Grid,
        justify_content: Some(JustifyContent::Start),
        align_content: Some(AlignContent::Start),
        ..Style::default()
    };
    let column_gap = LengthPercentage::from_length(1.0);
    match state {
        ControlState::Window { .. } => {
            // Row 0 is the title line.
            style.padding.top = LengthPercentage::from_length(1.0);
            style.gap.width = column_gap;
            if let Some((w, h)) = viewport {
                style.size = Size {
                    width: Dimension::from_length(f32::from(w)),
                    height: Dimension::from_length(f32::from(h)),
                };
            }
        }
        ControlState::Frame { title } => {
            style.gap.width = column_gap;
            if title.is_some() {
                let edge = LengthPercentage::from_length(1.0);
                style.border = Rect {
                    left: edge,
                    right: edge,
                    top: edge,
                    bottom: edge,
                };
            }
        }
        _ => {}
    }
    place(&mut style, cell);
    style
}

fn leaf_style(state: &ControlState, cell: Option<GridCell>) -> Style {
    let (w, h) = measure(state);
    let (w, h) = (Dimension::from_length(f32::from(w)), Dimension::from_length(f32::from(h)));
    let sticky = cell.map(|c| c.sticky).unwrap_or_default();
    let mut style = Style::default();
    // A stretched axis keeps its measured size as a floor.
    if sticky.contains(Sticky::W | Sticky::E) {
        style.min_size.width = w;
    } else {
        style.size.width = w;
    }
    if sticky.contains(Sticky::N | Sticky::S) {
        style.min_size.height = h;
    } else {
        style.size.height = h;
    }
    place(&mut style, cell);
    style
}

fn place(style: &mut Style, cell: Option<GridCell>) {
    let Some(cell) = cell else {
        return;
    };
    style.grid_row = Line {
        start: line(grid_line(cell.row)),
        end: span(1),
    };
    style.grid_column = Line {
        start: line(grid_line(cell.column)),
        end: span(u16::try_from(cell.column_span.max(1)).unwrap_or(u16::MAX)),
    };
    style.justify_self = Some(align(cell.sticky, Sticky::W, Sticky::E));
    style.align_self = Some(align(cell.sticky, Sticky::N, Sticky::S));
}

/// Grid lines are 1-based.
fn grid_line(index: usize) -> i16 {
    i16::try_from(index + 1).unwrap_or(i16::MAX)
}

fn align(sticky: Sticky, start: Sticky, end: Sticky) -> AlignItems {
    match (sticky.contains(start), sticky.contains(end)) {
        (true, true) => AlignItems::Stretch,
        (true, false) => AlignItems::Start,
        (false, true) => AlignItems::End,
        (false, false) => AlignItems::Center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::control::ControlTree;

    fn window(tree: &mut ControlTree) -> Handle {
        tree.insert_root(ControlState::Window {
            title: "W".into(),
            visible: true,
            size: None,
            resizable: true,
        })
    }

    fn label(tree: &mut ControlTree, parent: Handle, text: &str, cell: GridCell) -> Handle {
        let h = tree
            .insert_child(parent, ControlState::Label { text: text.into() })
            .unwrap();
        tree.place(h, cell).unwrap();
        h
    }

    fn cell(row: usize, column: usize, span: usize, sticky: Sticky) -> GridCell {
        GridCell {
            row,
            column,
            column_span: span,
            sticky,
        }
    }

    #[test]
    fn region_contains_half_open() {
        let r = Region::new(2, 1, 3, 2);
        assert!(r.contains(2, 1));
        assert!(r.contains(4, 2));
        assert!(!r.contains(5, 1));
        assert!(!r.contains(2, 3));
    }

    #[test]
    fn cells_pack_from_top_left_below_title() {
        let mut tree = ControlTree::new();
        let root = window(&mut tree);
        let a = label(&mut tree, root, "aaa", cell(0, 0, 1, Sticky::W));
        let b = label(&mut tree, root, "bb", cell(0, 1, 1, Sticky::W));
        let c = label(&mut tree, root, "c", cell(1, 0, 1, Sticky::W));

        let regions = compute(&tree, root, (40, 10));
        assert_eq!(regions[&root], Region::new(0, 0, 40, 10));
        assert_eq!(regions[&a], Region::new(0, 1, 3, 1));
        // One column of gap after the first track.
        assert_eq!(regions[&b], Region::new(4, 1, 2, 1));
        assert_eq!(regions[&c], Region::new(0, 2, 1, 1));
    }

    #[test]
    fn sticky_east_aligns_to_track_end() {
        let mut tree = ControlTree::new();
        let root = window(&mut tree);
        label(&mut tree, root, "wide label", cell(0, 0, 1, Sticky::W));
        let short = label(&mut tree, root, "x", cell(1, 0, 1, Sticky::E));
        let regions = compute(&tree, root, (40, 10));
        assert_eq!(regions[&short].x, 9);
    }

    #[test]
    fn titled_frame_insets_its_contents() {
        let mut tree = ControlTree::new();
        let root = window(&mut tree);
        let frame = tree
            .insert_child(
                root,
                ControlState::Frame {
                    title: Some("F".into()),
                },
            )
            .unwrap();
        tree.place(frame, cell(0, 0, 1, Sticky::W)).unwrap();
        let inner = label(&mut tree, frame, "in", cell(0, 0, 1, Sticky::W));

        let regions = compute(&tree, root, (40, 10));
        assert_eq!(regions[&frame], Region::new(0, 1, 4, 3));
        assert_eq!(regions[&inner], Region::new(1, 2, 2, 1));
    }
}
