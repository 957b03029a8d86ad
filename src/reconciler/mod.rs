//! Synchronous reference reconciler.
//!
//! Double-buffered fibers, a begin/complete work loop with bailouts, error
//! boundaries and a commit phase writing to the in-memory host. It
//! implements the collaborator traits the refresh core drives
//! (`WorkScheduler`, `TreeReflection`, `RefreshTarget`).
//!
//! # Modules
//!
//! - `begin` - per-tag render logic and bailouts
//! - `child` - keyed child reconciliation
//! - `complete` - completion and error unwinding
//! - `commit` - host mutations, effects and arena sweep
//! - `renderer` - the public `Renderer` handle

mod begin;
mod child;
mod commit;
mod complete;
mod renderer;

#[cfg(test)]
mod tests;

use std::rc::Rc;

use slotmap::SlotMap;

use crate::config::{RefreshConfig, RefreshSection};
use crate::core::{EffectFlags, Priority, RenderError, ScheduleRequest, WorkFlags};
use crate::element::{Node, Props};
use crate::fiber::{Fiber, FiberId, FiberTag, FiberTree, RootId, StateNode, TreeReflection};
use crate::hooks::{ContextFrame, UpdateSink};
use crate::host::{HostId, MemoryHost};
use crate::refresh::{RefreshTarget, WorkScheduler};
use crate::debug;

pub use renderer::{Renderer, WeakRenderer};

/// A render root: container host node plus its current fiber tree.
pub struct FiberRoot {
    pub current: FiberId,
    pub container: HostId,
    pending: Option<Node>,
}

/// Reconciler state shared by every root of one renderer.
pub struct Reconciler {
    tree: FiberTree,
    host: MemoryHost,
    roots: SlotMap<RootId, FiberRoot>,
    sink: UpdateSink,
    options: RefreshSection,
    nested_update_limit: usize,

    batch_depth: usize,
    sync_queue: Vec<RootId>,
    deferred_queue: Vec<RootId>,
    pending_passive: Vec<FiberId>,
    commit_log: Vec<(FiberId, EffectFlags)>,
    commit_count: u64,

    // Render pass state
    effects: Vec<FiberId>,
    context_stack: Vec<ContextFrame>,
    wip_root: Option<FiberId>,
}

impl Reconciler {
    pub fn new(config: &RefreshConfig) -> Self {
        Self {
            tree: FiberTree::new(),
            host: MemoryHost::new(),
            roots: SlotMap::with_key(),
            sink: UpdateSink::default(),
            options: config.refresh.clone(),
            nested_update_limit: config.scheduler.nested_update_limit,
            batch_depth: 0,
            sync_queue: Vec::new(),
            deferred_queue: Vec::new(),
            pending_passive: Vec::new(),
            commit_log: Vec::new(),
            commit_count: 0,
            effects: Vec::new(),
            context_stack: Vec::new(),
            wip_root: None,
        }
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    pub fn options(&self) -> &RefreshSection {
        &self.options
    }

    pub fn root(&self, root: RootId) -> Option<&FiberRoot> {
        self.roots.get(root)
    }

    pub fn root_ids(&self) -> Vec<RootId> {
        self.roots.keys().collect()
    }

    /// Create an empty root with its own container node.
    pub fn create_root(&mut self) -> RootId {
        let container = self.host.create_container();
        let tree = &mut self.tree;
        self.roots.insert_with_key(|root| {
            let mut fiber = Fiber::new(FiberTag::HostRoot, Rc::new(Props::new()));
            fiber.state_node = StateNode::Root(root);
            fiber.memoized_props = Some(fiber.pending_props.clone());
            fiber.mounted = true;
            FiberRoot {
                current: tree.insert(fiber),
                container,
                pending: None,
            }
        })
    }

    /// Replace the element rendered into `root` and flush synchronously.
    pub fn update_container(&mut self, root: RootId, node: Node) -> Result<(), RenderError> {
        let current = {
            let entry = self.roots.get_mut(root).ok_or(RenderError::UnknownRoot)?;
            entry.pending = Some(node);
            entry.current
        };
        self.batched_updates(|this| {
            this.schedule_work(current, ScheduleRequest::update(Priority::Sync));
        })
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    fn schedule_update_on_fiber(&mut self, fiber: FiberId, request: ScheduleRequest) {
        let Some(current) = self.tree.find_current_fiber(fiber) else {
            debug!("schedule"; "dropping update for unmounted fiber {fiber:?}");
            return;
        };

        let mut flags = WorkFlags::UPDATE;
        if request.force {
            flags |= WorkFlags::FORCE;
        }
        self.tree.for_each_buffer(current, |f| f.work |= flags);

        let mut top = current;
        while let Some(parent) = self.tree.get(top).and_then(|f| f.parent) {
            self.tree
                .for_each_buffer(parent, |f| f.work |= WorkFlags::CHILD_UPDATE);
            top = parent;
        }

        match self.tree.get(top).map(|f| &f.state_node) {
            Some(StateNode::Root(root)) => self.ensure_root_scheduled(*root, request.priority),
            _ => debug!("schedule"; "fiber {fiber:?} is detached from any root"),
        }
    }

    fn ensure_root_scheduled(&mut self, root: RootId, priority: Priority) {
        let queue = match priority {
            Priority::Sync => &mut self.sync_queue,
            Priority::Normal => &mut self.deferred_queue,
        };
        if !queue.contains(&root) {
            queue.push(root);
        }
    }

    fn drain_sink(&mut self) {
        for (fiber, request) in self.sink.drain() {
            self.schedule_update_on_fiber(fiber, request);
        }
    }

    /// Render and commit every root with synchronous work, repeating while
    /// commits and effects keep producing updates.
    pub(crate) fn flush_sync_work(&mut self) -> Result<(), RenderError> {
        let mut passes = 0;
        loop {
            self.drain_sink();
            if self.sync_queue.is_empty() {
                return Ok(());
            }
            passes += 1;
            if passes > self.nested_update_limit {
                self.sync_queue.clear();
                self.deferred_queue.clear();
                self.sink.drain();
                return Err(RenderError::NestedUpdateLimit(self.nested_update_limit));
            }
            while !self.sync_queue.is_empty() {
                let root = self.sync_queue.remove(0);
                self.deferred_queue.retain(|r| *r != root);
                self.perform_work_on_root(root)?;
            }
        }
    }

    /// Promote deferred work and flush it.
    pub fn flush_scheduled(&mut self) -> Result<(), RenderError> {
        self.drain_sink();
        for root in std::mem::take(&mut self.deferred_queue) {
            self.ensure_root_scheduled(root, Priority::Sync);
        }
        self.flush_sync_work()
    }

    /// Flush everything: sync and deferred work plus passive effects, until
    /// nothing is left.
    pub fn settle(&mut self) -> Result<(), RenderError> {
        for _ in 0..=self.nested_update_limit {
            self.flush_scheduled()?;
            if !self.flush_passive() && self.sink.is_empty() {
                return Ok(());
            }
        }
        Err(RenderError::NestedUpdateLimit(self.nested_update_limit))
    }

    fn perform_work_on_root(&mut self, root: RootId) -> Result<(), RenderError> {
        self.flush_passive();
        let Some(current) = self.roots.get(root).map(|r| r.current) else {
            return Ok(());
        };

        match self.render_root(current) {
            Ok(finished) => {
                self.commit_root(root, finished);
                Ok(())
            }
            Err(error) => {
                debug!("render"; "{error}; unmounting root");
                if let Some(entry) = self.roots.get_mut(root) {
                    entry.pending = Some(Node::Empty);
                }
                self.tree
                    .for_each_buffer(current, |f| f.work |= WorkFlags::UPDATE);
                if let Ok(finished) = self.render_root(current) {
                    self.commit_root(root, finished);
                }
                Err(error)
            }
        }
    }

    // =========================================================================
    // Work loop
    // =========================================================================

    fn render_root(&mut self, current: FiberId) -> Result<FiberId, RenderError> {
        let props = self.tree[current].pending_props.clone();
        let wip = self.create_work_in_progress(current, props);
        self.effects.clear();
        self.context_stack.clear();
        self.wip_root = Some(wip);

        let mut next = Some(wip);
        let result = loop {
            let Some(unit) = next else {
                break Ok(wip);
            };
            match self.perform_unit_of_work(unit) {
                Ok(following) => next = following,
                Err(error) => break Err(error),
            }
        };
        self.wip_root = None;
        result
    }

    fn perform_unit_of_work(&mut self, unit: FiberId) -> Result<Option<FiberId>, RenderError> {
        match self.begin_work(unit) {
            Ok(Some(child)) => Ok(Some(child)),
            Ok(None) => Ok(self.complete_unit_of_work(unit)),
            Err(error) => self.throw_exception(unit, error),
        }
    }

    /// Work-in-progress twin of `current`, reusing the alternate buffer.
    pub(crate) fn create_work_in_progress(&mut self, current: FiberId, props: Rc<Props>) -> FiberId {
        let mut next = self.tree[current].clone();
        next.pending_props = props;
        next.alternate = Some(current);
        next.effect = EffectFlags::empty();
        next.deletions.clear();
        next.mounted = false;

        match self.tree.alternate(current) {
            Some(alternate) => {
                self.tree[alternate] = next;
                alternate
            }
            None => {
                let id = self.tree.insert(next);
                self.tree[current].alternate = Some(id);
                id
            }
        }
    }

    fn context_changed(&self) -> bool {
        self.context_stack.iter().any(|frame| frame.changed)
    }
}

// =============================================================================
// Collaborator traits
// =============================================================================

impl WorkScheduler for Reconciler {
    fn schedule_work(&mut self, fiber: FiberId, request: ScheduleRequest) {
        self.schedule_update_on_fiber(fiber, request);
    }

    fn batched_updates<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Result<R, RenderError> {
        if self.batch_depth == 0 {
            self.commit_log.clear();
        }
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.flush_sync_work()?;
        }
        Ok(result)
    }

    fn flush_passive_effects(&mut self) -> bool {
        self.flush_passive()
    }
}

impl TreeReflection for Reconciler {
    fn find_current_fiber(&self, fiber: FiberId) -> Option<FiberId> {
        self.tree.find_current_fiber(fiber)
    }
}

impl RefreshTarget for Reconciler {
    fn tree(&self) -> &FiberTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut FiberTree {
        &mut self.tree
    }

    fn root_fiber(&self, root: RootId) -> Option<FiberId> {
        self.roots.get(root).map(|r| r.current)
    }

    fn last_committed_effects(&self) -> &[(FiberId, EffectFlags)] {
        &self.commit_log
    }

    fn commit_count(&self) -> u64 {
        self.commit_count
    }
}
