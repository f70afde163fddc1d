//! One toolkit, several windows.
//!
//! A [`Shared`] is a handle onto a backend that other handles also use. Each
//! handle hosts at most one window. Events are sorted by the window root
//! they belong to: whatever a tick produces for another window waits in a
//! common backlog until that window polls.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::Duration;

use super::{Backend, BackendError, ControlState, GridCell, Handle, NativeEvent, Trigger};
use crate::value::Value;
use crate::window::WindowConfig;

struct Inner<B> {
    backend: B,
    backlog: Vec<NativeEvent>,
}

/// A backend handle shared between windows on the same thread.
///
/// ```ignore
/// let toolkit = Shared::new(TerminalBackend::new()?);
/// let mut main = Window::new(WindowConfig::new("Main"), main_layout, toolkit.share())?;
/// let mut tools = Window::new(WindowConfig::new("Tools"), tool_layout, toolkit.share())?;
/// ```
pub struct Shared<B: Backend> {
    inner: Rc<RefCell<Inner<B>>>,
    root: Option<Handle>,
}

impl<B: Backend> Shared<B> {
    pub fn new(backend: B) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                backend,
                backlog: Vec::new(),
            })),
            root: None,
        }
    }

    /// Another handle onto the same toolkit, ready to host a new window.
    pub fn share(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            root: None,
        }
    }

    /// The root of the window this handle hosts.
    pub fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Events produced for other windows, not yet polled.
    pub fn backlog_len(&self) -> usize {
        self.inner.try_borrow().map_or(0, |inner| inner.backlog.len())
    }

    /// Borrow the underlying toolkit.
    pub fn backend(&self) -> Result<Ref<'_, B>, BackendError> {
        self.inner
            .try_borrow()
            .map(|inner| Ref::map(inner, |inner| &inner.backend))
            .map_err(|_| busy())
    }

    /// Borrow the underlying toolkit mutably, e.g. to simulate input.
    pub fn backend_mut(&self) -> Result<RefMut<'_, B>, BackendError> {
        self.inner
            .try_borrow_mut()
            .map(|inner| RefMut::map(inner, |inner| &mut inner.backend))
            .map_err(|_| busy())
    }

    fn inner_mut(&self) -> Result<RefMut<'_, Inner<B>>, BackendError> {
        self.inner.try_borrow_mut().map_err(|_| busy())
    }
}

fn busy() -> BackendError {
    BackendError::Toolkit("shared toolkit is already borrowed".into())
}

/// The window root an event belongs to, `None` once its control is gone.
fn owner<B: Backend>(backend: &B, event: &NativeEvent) -> Option<Handle> {
    match *event {
        NativeEvent::Widget { handle, .. } => backend.root_of(handle),
        NativeEvent::Window { root, .. } => backend.root_of(root),
    }
}

impl<B: Backend> Backend for Shared<B> {
    fn init_window(&mut self, config: &WindowConfig) -> Result<Handle, BackendError> {
        if self.root.is_some() {
            return Err(BackendError::Toolkit("this handle already hosts a window".into()));
        }
        let root = self.inner_mut()?.backend.init_window(config)?;
        self.root = Some(root);
        Ok(root)
    }

    fn create(&mut self, parent: Handle, state: ControlState) -> Result<Handle, BackendError> {
        self.inner_mut()?.backend.create(parent, state)
    }

    fn place(&mut self, handle: Handle, cell: GridCell) -> Result<(), BackendError> {
        self.inner_mut()?.backend.place(handle, cell)
    }

    fn bind(&mut self, handle: Handle, trigger: Trigger) -> Result<(), BackendError> {
        self.inner_mut()?.backend.bind(handle, trigger)
    }

    fn set_visible(&mut self, root: Handle, visible: bool) -> Result<(), BackendError> {
        self.inner_mut()?.backend.set_visible(root, visible)
    }

    fn destroy(&mut self, handle: Handle) {
        match self.inner_mut() {
            Ok(mut inner) => inner.backend.destroy(handle),
            Err(err) => {
                tracing::warn!(%err, ?handle, "could not destroy control");
                return;
            }
        }
        if self.root == Some(handle) {
            self.root = None;
        }
    }

    /// Run one toolkit tick and keep only this window's events. Events for
    /// other windows are held back; if some of ours are already held, the
    /// tick does not wait.
    fn process_events(&mut self, timeout: Duration) -> Result<Vec<NativeEvent>, BackendError> {
        let Some(root) = self.root else {
            return Ok(Vec::new());
        };
        let mut inner = self.inner_mut()?;
        let Inner { backend, backlog } = &mut *inner;
        let waiting = backlog.iter().any(|e| owner(&*backend, e) == Some(root));
        let fresh = backend.process_events(if waiting { Duration::ZERO } else { timeout })?;
        backlog.extend(fresh);

        let mut mine = Vec::new();
        for event in std::mem::take(backlog) {
            match owner(&*backend, &event) {
                Some(r) if r == root => mine.push(event),
                Some(_) => backlog.push(event),
                None => {}
            }
        }
        Ok(mine)
    }

    fn read(&self, handle: Handle) -> Result<Option<Value>, BackendError> {
        self.backend()?.read(handle)
    }

    fn write(&mut self, handle: Handle, value: &Value) -> Result<(), BackendError> {
        self.inner_mut()?.backend.write(handle, value)
    }

    fn flush_idle(&mut self) -> Result<(), BackendError> {
        self.inner_mut()?.backend.flush_idle()
    }

    fn root_of(&self, handle: Handle) -> Option<Handle> {
        self.backend().ok()?.root_of(handle)
    }
}
