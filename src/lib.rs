//! # gridwin
//!
//! Declarative grid windows. Describe a window as rows of widget records,
//! then drive it with a single loop: each [`Window::poll`] returns the latest
//! event key and the value of every keyed widget.
//!
//! ```ignore
//! use gridwin::prelude::*;
//!
//! let layout = layout![
//!     [Label::new("Name"), TextField::new("").key("name")],
//!     [Button::new("OK")],
//! ];
//! let backend = TerminalBackend::new()?;
//! let mut window = Window::new(WindowConfig::new("Hello").with_hidden(false), layout, backend)?;
//! loop {
//!     let (event, values) = window.poll(std::time::Duration::from_millis(50));
//!     match event {
//!         Some(e) if e.is_close() => break,
//!         Some(e) if e == "OK" => println!("hello {:?}", values["name"]),
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Core Systems
//!
//! - **[`descriptor`]**: widget records, kinds, ids and placements
//! - **[`layout`]**: rows of descriptors and the grid resolver
//! - **[`registry`]**: per-window lookup by key, id and native handle
//! - **[`native`]**: the toolkit boundary plus memory and terminal backends
//! - **[`materialize`]**: turns a resolved layout into native controls
//! - **[`sync`]**: event dispatch and value snapshots
//! - **[`window`]**: configuration and the poll/get/set surface
//! - **[`testing`]**: headless [`Pilot`](testing::Pilot)

// Data model
pub mod descriptor;
pub mod layout;
pub mod value;

// Bookkeeping
pub mod registry;

// Toolkit boundary
pub mod materialize;
pub mod native;

// Runtime
pub mod sync;
pub mod window;

// Test support
pub mod testing;

pub use layout::Layout;
pub use sync::Event;
pub use value::{Value, ValueMap};
pub use window::{CloseAction, Window, WindowConfig, WindowError};

/// Everything a typical window definition needs.
pub mod prelude {
    pub use crate::descriptor::{
        Button, CheckBox, ComboBox, Frame, Label, ListBox, Orient, ProgressBar, ProgressMode,
        RadioGroup, SelectMode, Slider, Sticky, TextArea, TextField, TreeItem, TreeView,
    };
    pub use crate::layout;
    pub use crate::layout::Layout;
    pub use crate::native::{MemoryBackend, Shared, TerminalBackend, WindowEvent};
    pub use crate::sync::Event;
    pub use crate::value::{Value, ValueMap};
    pub use crate::window::{CloseAction, Window, WindowConfig, WindowError};
}
