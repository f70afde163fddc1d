//! Layout resolution: identities, grid positions and frame topology.
//!
//! Resolution runs in two passes. The first walks the layout top to bottom,
//! left to right, registering every descriptor (frame contents before the
//! frame itself) and recording each container's column capacity. The second
//! pass, once every row width is known, writes the final row, column and
//! column span into the registry and back into the descriptors.

use std::collections::HashMap;

use super::Layout;
use crate::descriptor::{Descriptor, Placement, WidgetId, WindowId};
use crate::registry::{FrameEntry, Registry, WidgetEntry};

/// Errors that abort layout resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("duplicate widget key `{0}`")]
    DuplicateKey(String),
    #[error("widget key `{0}` is reserved for window events")]
    ReservedKey(String),
}

/// Summary of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Widest top-level row.
    pub columns: usize,
    /// Widgets registered, frame contents included.
    pub widgets: usize,
    pub frames: usize,
}

/// Whether `key` has the `--Name--` shape of a window-event key.
pub fn is_reserved_key(key: &str) -> bool {
    key.len() > 4 && key.starts_with("--") && key.ends_with("--")
}

/// Resolve `layout` into `registry`.
///
/// # Errors
///
/// Fails on the first duplicate or reserved key. The registry may then hold
/// a partial set of entries and should be discarded; no placement has been
/// written back into the layout.
pub fn resolve(layout: &mut Layout, registry: &mut Registry) -> Result<Resolution, LayoutError> {
    let window = registry.window().id;
    let mut walker = Walker {
        registry,
        window,
        pending: Vec::new(),
        capacity: HashMap::new(),
        frames: 0,
    };
    walker.walk(layout, None)?;

    // Second pass: every container's width is known now.
    let Walker {
        registry,
        pending,
        capacity,
        frames,
        ..
    } = walker;
    for cell in &pending {
        let cap = capacity.get(&cell.container).copied().unwrap_or(1);
        let last_in_row = cell.column + 1 == cell.row_len;
        let column_span = if last_in_row && cell.row_len < cap {
            cap - cell.row_len + 1
        } else {
            1
        };
        if let Some(entry) = registry.widget_mut(cell.id) {
            entry.placement = Placement {
                row: cell.row,
                column: cell.column,
                column_span,
                sticky: entry.placement.sticky,
            };
        }
    }
    write_back(layout, registry, false);

    let columns = capacity.get(&None).copied().unwrap_or(0);
    registry.window_mut().columns = columns;
    Ok(Resolution {
        columns,
        widgets: pending.len(),
        frames,
    })
}

/// A widget visited by the first pass, awaiting its final placement.
struct Pending {
    id: WidgetId,
    container: Option<WidgetId>,
    row: usize,
    column: usize,
    row_len: usize,
}

struct Walker<'r> {
    registry: &'r mut Registry,
    window: WindowId,
    pending: Vec<Pending>,
    /// Column capacity per container; `None` is the window itself.
    capacity: HashMap<Option<WidgetId>, usize>,
    frames: usize,
}

impl Walker<'_> {
    /// Register every descriptor of `layout`, returning the direct children
    /// in declaration order.
    fn walk(&mut self, layout: &Layout, frame: Option<WidgetId>) -> Result<Vec<WidgetId>, LayoutError> {
        let mut children = Vec::new();
        let mut capacity = 0;
        for (row, items) in layout.rows().iter().enumerate() {
            capacity = capacity.max(items.len());
            for (column, d) in items.iter().enumerate() {
                if let Some(nested) = d.nested_layout() {
                    let contents = self.walk(nested, Some(d.id()))?;
                    self.registry.insert_frame(FrameEntry {
                        frame: d.id(),
                        window: self.window,
                        children: contents,
                    });
                    self.frames += 1;
                }
                self.record(d, frame)?;
                self.pending.push(Pending {
                    id: d.id(),
                    container: frame,
                    row,
                    column,
                    row_len: items.len(),
                });
                children.push(d.id());
            }
        }
        self.capacity.insert(frame, capacity);
        Ok(children)
    }

    fn record(&mut self, d: &Descriptor, frame: Option<WidgetId>) -> Result<(), LayoutError> {
        if is_reserved_key(d.key()) {
            return Err(LayoutError::ReservedKey(d.key().to_owned()));
        }
        self.registry
            .insert_widget(WidgetEntry::from_descriptor(d, self.window, frame))
            .map_err(|refused| LayoutError::DuplicateKey(refused.key))
    }
}

fn write_back(layout: &mut Layout, registry: &Registry, in_frame: bool) {
    for row in layout.rows_mut() {
        for d in row.iter_mut() {
            if let Some(entry) = registry.widget(d.id()) {
                d.set_placement(entry.placement, in_frame);
            }
            if let Some(nested) = d.nested_layout_mut() {
                write_back(nested, registry, true);
            }
        }
    }
}
