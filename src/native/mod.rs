//! The native toolkit boundary.
//!
//! Everything above this module talks to a toolkit only through the
//! [`Backend`] trait and opaque [`Handle`]s. A backend owns its controls; the
//! registry merely refers to them. Two backends ship with the crate:
//! [`memory::MemoryBackend`], a headless toolkit for tests, and
//! [`terminal::TerminalBackend`], a live crossterm one. Several windows can
//! run on one toolkit through [`shared::Shared`].

pub mod control;
pub mod memory;
pub mod shared;
pub mod terminal;

use std::fmt;
use std::io;
use std::time::Duration;

pub use control::{Control, ControlKind, ControlState, ControlTree};
pub use memory::MemoryBackend;
pub use shared::Shared;
pub use terminal::TerminalBackend;

use crate::descriptor::{Placement, Sticky, WidgetKind};
use crate::value::Value;
use crate::window::WindowConfig;

slotmap::new_key_type! {
    /// Opaque reference to a native control owned by a backend.
    pub struct Handle;
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The single native action a control reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Click,
    TextChanged,
    TextAreaChanged,
    Toggled,
    RadioSelected,
    ListboxSelectionChanged,
    SliderMoved,
    ComboboxSelected,
    TreeviewSelected,
}

impl Trigger {
    pub fn name(self) -> &'static str {
        match self {
            Trigger::Click => "click",
            Trigger::TextChanged => "text_changed",
            Trigger::TextAreaChanged => "text_area_changed",
            Trigger::Toggled => "toggled",
            Trigger::RadioSelected => "radio_selected",
            Trigger::ListboxSelectionChanged => "listbox_selection_changed",
            Trigger::SliderMoved => "slider_moved",
            Trigger::ComboboxSelected => "combobox_selected",
            Trigger::TreeviewSelected => "treeview_selected",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Window-level actions, reported under reserved keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEvent {
    Resize,
    Minimize,
    Maximize,
    Restore,
    /// The close-button action.
    Close,
}

impl WindowEvent {
    pub const ALL: [WindowEvent; 5] = [
        WindowEvent::Resize,
        WindowEvent::Minimize,
        WindowEvent::Maximize,
        WindowEvent::Restore,
        WindowEvent::Close,
    ];

    /// The reserved event key.
    pub fn key(self) -> &'static str {
        match self {
            WindowEvent::Resize => "--Resize--",
            WindowEvent::Minimize => "--Minimize--",
            WindowEvent::Maximize => "--Maximize--",
            WindowEvent::Restore => "--Restore--",
            WindowEvent::Close => "--Exit--",
        }
    }
}

/// One event delivered by [`Backend::process_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeEvent {
    /// A bound trigger fired on a control.
    Widget { handle: Handle, trigger: Trigger },
    /// A window-level action on the window rooted at `root`.
    Window { root: Handle, event: WindowEvent },
}

/// Where a control sits in its container's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
    pub column_span: usize,
    pub sticky: Sticky,
}

impl GridCell {
    pub fn new(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            column_span: 1,
            sticky: Sticky::N,
        }
    }
}

impl From<Placement> for GridCell {
    fn from(p: Placement) -> Self {
        Self {
            row: p.row,
            column: p.column,
            column_span: p.column_span.max(1),
            sticky: p.sticky,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures reported by a toolkit.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The control behind this handle no longer exists.
    #[error("native control {0:?} no longer exists")]
    StaleWidget(Handle),
    #[error("toolkit has no control for {0}")]
    UnsupportedKind(WidgetKind),
    #[error("{control} cannot hold a {value} value")]
    TypeMismatch {
        control: &'static str,
        value: &'static str,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("toolkit failure: {0}")]
    Toolkit(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// A native GUI toolkit.
///
/// All calls happen on the thread that owns the window; nothing here is
/// required to be `Send`.
pub trait Backend {
    /// Create a top-level window and return its root container.
    fn init_window(&mut self, config: &WindowConfig) -> Result<Handle, BackendError>;

    /// Create a control inside `parent`.
    ///
    /// Fails with [`BackendError::UnsupportedKind`] when the toolkit has no
    /// control for the state's widget kind.
    fn create(&mut self, parent: Handle, state: ControlState) -> Result<Handle, BackendError>;

    /// Put a control into its parent's grid.
    fn place(&mut self, handle: Handle, cell: GridCell) -> Result<(), BackendError>;

    /// Ask the toolkit to report `trigger` for this control.
    fn bind(&mut self, handle: Handle, trigger: Trigger) -> Result<(), BackendError>;

    fn set_visible(&mut self, root: Handle, visible: bool) -> Result<(), BackendError>;

    /// Destroy a control and everything inside it. Unknown handles are ignored.
    fn destroy(&mut self, handle: Handle);

    /// Run one iteration of the event loop, waiting at most `timeout` for
    /// input, and return what fired in order.
    fn process_events(&mut self, timeout: Duration) -> Result<Vec<NativeEvent>, BackendError>;

    /// The control's current raw value, `None` if it carries none.
    fn read(&self, handle: Handle) -> Result<Option<Value>, BackendError>;

    /// Replace the control's value. Never reports a trigger.
    fn write(&mut self, handle: Handle, value: &Value) -> Result<(), BackendError>;

    /// Run pending idle work so the display reflects recent writes.
    fn flush_idle(&mut self) -> Result<(), BackendError>;

    /// The window root a live control belongs to.
    fn root_of(&self, handle: Handle) -> Option<Handle>;
}

/// A borrowed backend is a backend, so callers can keep inspecting it.
impl<B: Backend + ?Sized> Backend for &mut B {
    fn init_window(&mut self, config: &WindowConfig) -> Result<Handle, BackendError> {
        (**self).init_window(config)
    }

    fn create(&mut self, parent: Handle, state: ControlState) -> Result<Handle, BackendError> {
        (**self).create(parent, state)
    }

    fn place(&mut self, handle: Handle, cell: GridCell) -> Result<(), BackendError> {
        (**self).place(handle, cell)
    }

    fn bind(&mut self, handle: Handle, trigger: Trigger) -> Result<(), BackendError> {
        (**self).bind(handle, trigger)
    }

    fn set_visible(&mut self, root: Handle, visible: bool) -> Result<(), BackendError> {
        (**self).set_visible(root, visible)
    }

    fn destroy(&mut self, handle: Handle) {
        (**self).destroy(handle)
    }

    fn process_events(&mut self, timeout: Duration) -> Result<Vec<NativeEvent>, BackendError> {
        (**self).process_events(timeout)
    }

    fn read(&self, handle: Handle) -> Result<Option<Value>, BackendError> {
        (**self).read(handle)
    }

    fn write(&mut self, handle: Handle, value: &Value) -> Result<(), BackendError> {
        (**self).write(handle, value)
    }

    fn flush_idle(&mut self) -> Result<(), BackendError> {
        (**self).flush_idle()
    }

    fn root_of(&self, handle: Handle) -> Option<Handle> {
        (**self).root_of(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_event_keys_are_reserved_shape() {
        for event in WindowEvent::ALL {
            let key = event.key();
            assert!(key.starts_with("--") && key.ends_with("--"), "{key}");
        }
        assert_eq!(WindowEvent::Close.key(), "--Exit--");
    }

    #[test]
    fn trigger_names() {
        assert_eq!(Trigger::TextChanged.to_string(), "text_changed");
        assert_eq!(Trigger::ComboboxSelected.name(), "combobox_selected");
    }

    #[test]
    fn grid_cell_from_placement_keeps_span_positive() {
        let cell = GridCell::from(Placement {
            row: 2,
            column: 1,
            column_span: 0,
            sticky: Sticky::W,
        });
        assert_eq!(cell.column_span, 1);
        assert_eq!((cell.row, cell.column), (2, 1));
        assert_eq!(cell.sticky, Sticky::W);
    }
}
