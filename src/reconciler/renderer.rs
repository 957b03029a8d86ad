//! Public renderer handle.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::Reconciler;
use crate::config::RefreshConfig;
use crate::core::RenderError;
use crate::element::Node;
use crate::fiber::RootId;
use crate::host::HostId;
use crate::refresh::{
    RefreshBridge, RefreshEntry, ReloadRequest, ReloadResult, WorkScheduler,
    schedule_update_for_hot_reload,
};

/// Shared handle to a reconciler and its in-memory host.
///
/// Event handlers and effects run while the reconciler is not borrowed, so
/// they may call `Setter`/`Dispatch` freely; they must not call back into
/// the `Renderer` while it is rendering.
#[derive(Clone)]
pub struct Renderer {
    inner: Rc<RefCell<Reconciler>>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_config(&RefreshConfig::default())
    }

    pub fn with_config(config: &RefreshConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Reconciler::new(config))),
        }
    }

    pub fn create_root(&self) -> RootId {
        self.inner.borrow_mut().create_root()
    }

    /// Render `node` into `root`, committing synchronously.
    pub fn render(&self, root: RootId, node: impl Into<Node>) -> Result<(), RenderError> {
        self.inner.borrow_mut().update_container(root, node.into())
    }

    /// Run `f`, then flush all scheduled work and passive effects.
    pub fn act<R>(&self, f: impl FnOnce(&Renderer) -> R) -> Result<R, RenderError> {
        let result = f(self);
        self.inner.borrow_mut().settle()?;
        Ok(result)
    }

    /// Fire `event` at `target`, bubbling to the root, then flush the
    /// synchronous updates it produced. Returns the number of handlers run.
    pub fn dispatch_event(&self, target: HostId, event: &str) -> Result<usize, RenderError> {
        let handlers = self.inner.borrow().host.bubble_handlers(target, event);
        for handler in &handlers {
            handler();
        }
        self.inner.borrow_mut().batched_updates(|_| ())?;
        Ok(handlers.len())
    }

    pub fn dispatch_click(&self, target: HostId) -> Result<usize, RenderError> {
        self.dispatch_event(target, "onClick")
    }

    pub fn flush_passive_effects(&self) -> bool {
        self.inner.borrow_mut().flush_passive()
    }

    pub fn flush_scheduled(&self) -> Result<(), RenderError> {
        self.inner.borrow_mut().flush_scheduled()
    }

    /// Apply a reload to one root of this renderer.
    pub fn schedule_update_for_hot_reload(
        &self,
        root: RootId,
        request: &ReloadRequest,
    ) -> Result<ReloadResult, RenderError> {
        let mut reconciler = self.inner.borrow_mut();
        let options = reconciler.options().clone();
        schedule_update_for_hot_reload(&mut *reconciler, root, request, &options)
    }

    /// Register this renderer with a refresh bridge. The bridge holds it
    /// weakly. Returns the entry id.
    pub fn inject_into(&self, bridge: &mut RefreshBridge) -> u32 {
        bridge.inject(Box::new(self.downgrade()))
    }

    pub fn downgrade(&self) -> WeakRenderer {
        WeakRenderer(Rc::downgrade(&self.inner))
    }

    // =========================================================================
    // Host inspection
    // =========================================================================

    pub fn container(&self, root: RootId) -> Option<HostId> {
        self.inner.borrow().root(root).map(|r| r.container)
    }

    pub fn container_first_child(&self, root: RootId) -> Option<HostId> {
        let reconciler = self.inner.borrow();
        let container = reconciler.root(root)?.container;
        reconciler.host.first_child(container)
    }

    pub fn text_content(&self, node: HostId) -> String {
        self.inner.borrow().host.text_content(node)
    }

    pub fn attribute(&self, node: HostId, name: &str) -> Option<String> {
        self.inner.borrow().host.attribute(node, name).map(str::to_owned)
    }

    /// Markup of everything rendered into `root`.
    pub fn markup(&self, root: RootId) -> String {
        let reconciler = self.inner.borrow();
        match reconciler.root(root) {
            Some(entry) => reconciler.host.render_markup(entry.container),
            None => String::new(),
        }
    }

    pub fn with_reconciler<R>(&self, f: impl FnOnce(&Reconciler) -> R) -> R {
        f(&self.inner.borrow())
    }
}

/// Weak renderer reference held by a `RefreshBridge`.
pub struct WeakRenderer(Weak<RefCell<Reconciler>>);

impl RefreshEntry for WeakRenderer {
    fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    fn roots(&self) -> Vec<RootId> {
        self.0
            .upgrade()
            .map(|inner| inner.borrow().root_ids())
            .unwrap_or_default()
    }

    fn refresh_root(
        &self,
        root: RootId,
        request: &ReloadRequest,
    ) -> Result<ReloadResult, RenderError> {
        let inner = self.0.upgrade().ok_or(RenderError::UnknownRoot)?;
        let mut reconciler = inner.borrow_mut();
        let options = reconciler.options().clone();
        schedule_update_for_hot_reload(&mut *reconciler, root, request, &options)
    }
}
