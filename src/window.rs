//! Window: configuration, construction and the poll/get/set surface.
//!
//! [`Window::new`] resolves the layout, creates the native root and
//! materializes every widget, all or nothing. The window then owns its
//! registry, its backend and its event slot; dropping it destroys the native
//! controls.

use std::time::Duration;

use crate::descriptor::WindowId;
use crate::layout::{resolve, Layout, LayoutError};
use crate::materialize::{MaterializeError, Materializer};
use crate::native::{Backend, BackendError, Handle};
use crate::registry::{Registry, WindowEntry};
use crate::sync::{Event, Synchronizer};
use crate::value::{Value, ValueMap};

// ---------------------------------------------------------------------------
// WindowConfig
// ---------------------------------------------------------------------------

/// What the close button does after `--Exit--` is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseAction {
    /// Tear down every native control.
    #[default]
    Destroy,
    /// Withdraw the window but keep it alive.
    Hide,
}

/// Configuration for a window.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Requested (columns, rows). A sizing hint for the toolkit.
    pub size: Option<(u16, u16)>,
    pub resizable: bool,
    /// Start withdrawn; `show` reveals it.
    pub hidden: bool,
    pub close_action: CloseAction,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            size: None,
            resizable: true,
            hidden: true,
            close_action: CloseAction::default(),
        }
    }
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the requested size (builder).
    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_close_action(mut self, action: CloseAction) -> Self {
        self.close_action = action;
        self
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Errors raised while building a window.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// A materialized window over backend `B`.
pub struct Window<B: Backend> {
    config: WindowConfig,
    layout: Layout,
    registry: Registry,
    backend: B,
    sync: Synchronizer,
}

impl<B: Backend> Window<B> {
    /// Resolve `layout` and materialize it into a new native window.
    ///
    /// # Errors
    ///
    /// A duplicate or reserved key fails before any native control exists. A
    /// missing argument or toolkit failure destroys whatever was built.
    pub fn new(config: WindowConfig, mut layout: Layout, mut backend: B) -> Result<Self, WindowError> {
        let id = WindowId::next();
        let mut registry = Registry::new(WindowEntry::new(id, config.title.clone(), config.hidden));
        let resolution = resolve(&mut layout, &mut registry)?;

        let root = backend.init_window(&config)?;
        let built = Materializer::new(&mut backend, &mut registry)
            .materialize(&layout, root)
            .map_err(WindowError::from)
            .and_then(|created| {
                if !config.hidden {
                    backend.set_visible(root, true)?;
                }
                Ok(created)
            });
        let created = match built {
            Ok(created) => created,
            Err(err) => {
                backend.destroy(root);
                return Err(err);
            }
        };
        registry.window_mut().root = Some(root);
        tracing::debug!(
            window = %id,
            title = %config.title,
            widgets = resolution.widgets,
            frames = resolution.frames,
            controls = created,
            "window built"
        );
        Ok(Self {
            config,
            layout,
            registry,
            backend,
            sync: Synchronizer::new(),
        })
    }

    pub fn id(&self) -> WindowId {
        self.registry.window().id
    }

    pub fn title(&self) -> &str {
        &self.registry.window().title
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// The resolved layout, placements written back.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The native root, `None` once destroyed.
    pub fn root(&self) -> Option<Handle> {
        self.registry.window().root
    }

    pub fn is_open(&self) -> bool {
        self.root().is_some()
    }

    pub fn is_hidden(&self) -> bool {
        self.registry.window().hidden
    }

    /// The native control behind `key`.
    pub fn handle_of(&self, key: &str) -> Option<Handle> {
        self.registry.by_key(key).and_then(|entry| entry.handle)
    }

    /// Reveal the window. A destroyed window stays destroyed.
    pub fn show(&mut self) -> Result<(), WindowError> {
        self.set_hidden(false)
    }

    /// Withdraw the window without destroying anything.
    pub fn hide(&mut self) -> Result<(), WindowError> {
        self.set_hidden(true)
    }

    fn set_hidden(&mut self, hidden: bool) -> Result<(), WindowError> {
        let Some(root) = self.root() else {
            return Ok(());
        };
        self.backend.set_visible(root, !hidden)?;
        self.registry.window_mut().hidden = hidden;
        Ok(())
    }

    /// One tick of the event loop, waiting at most `timeout` for input.
    ///
    /// Returns the latest event, if any, and the value of every live widget.
    /// After the close button the window is torn down (or hidden, per
    /// [`CloseAction`]); polling a destroyed window returns `(None, {})`.
    pub fn poll(&mut self, timeout: Duration) -> (Option<Event>, ValueMap) {
        if !self.is_open() {
            return (None, ValueMap::new());
        }
        let tick = self.sync.poll(&mut self.backend, &mut self.registry, timeout);
        if tick.close_requested {
            match self.config.close_action {
                CloseAction::Destroy => self.close(),
                CloseAction::Hide => {
                    if let Err(err) = self.hide() {
                        tracing::warn!(%err, "could not hide window");
                    }
                }
            }
        }
        (tick.event, tick.values)
    }

    /// Read one widget. Unknown keys give `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.sync.get(&self.backend, &self.registry, key)
    }

    /// Write one widget without raising an event. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        self.sync.set(&mut self.backend, &self.registry, key, &value);
    }

    /// Destroy every native control. Idempotent.
    pub fn close(&mut self) {
        if let Some(root) = self.root() {
            self.backend.destroy(root);
            self.registry.clear_handles();
            tracing::debug!(window = %self.id(), "window destroyed");
        }
    }
}

impl<B: Backend> Drop for Window<B> {
    fn drop(&mut self) {
        self.close();
    }
}
