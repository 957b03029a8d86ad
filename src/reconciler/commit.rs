//! Commit phase.
//!
//! Applies a finished work-in-progress tree: deletions first, then host
//! creation and updates, child-list resyncs, the buffer swap, refs and
//! layout effects. Passive effects are queued for `flush_passive`.

use rustc_hash::FxHashSet;

use super::Reconciler;
use crate::core::EffectFlags;
use crate::element::ComponentType;
use crate::fiber::{FiberId, FiberTag, RootId, StateNode, collect_host_nodes, host_children};
use crate::hooks::{EffectKind, Hook};
use crate::host::HostId;
use crate::debug;

impl Reconciler {
    pub(super) fn commit_root(&mut self, root: RootId, finished: FiberId) {
        let mut effects = std::mem::take(&mut self.effects);

        // Deletions
        for &id in &effects {
            let deletions = std::mem::take(&mut self.tree[id].deletions);
            for deleted in deletions {
                self.commit_deletion(deleted);
            }
        }

        // Host creation and updates
        for &id in &effects {
            self.commit_host(id);
        }

        // Child lists
        for &id in &effects {
            if self.tree[id].effect.contains(EffectFlags::CHILDREN_CHANGED)
                && let Some(parent) = self.host_node_of(id)
            {
                let children = host_children(&self.tree, id);
                self.host.set_children(parent, &children);
            }
        }

        if let Some(entry) = self.roots.get_mut(root) {
            entry.current = finished;
        }
        self.sync_mounted();
        effects.retain(|id| self.tree.contains(*id));

        for &id in &effects {
            let fiber = &self.tree[id];
            if fiber.effect.contains(EffectFlags::REF)
                && let Some(node_ref) = &fiber.node_ref
            {
                node_ref.set(fiber.state_node.host());
            }
        }
        for &id in &effects {
            if self.tree[id].effect.contains(EffectFlags::LAYOUT) {
                self.run_effects(id, EffectKind::Layout);
            }
        }
        for &id in &effects {
            if self.tree[id].effect.contains(EffectFlags::PASSIVE) && !self.pending_passive.contains(&id) {
                self.pending_passive.push(id);
            }
        }

        self.commit_log
            .extend(effects.iter().map(|&id| (id, self.tree[id].effect)));
        self.commit_count += 1;
        debug!("commit"; "root committed: {} effects, {} fibers", effects.len(), self.tree.len());
    }

    /// Unmount a committed subtree and drop its host nodes.
    fn commit_deletion(&mut self, deleted: FiberId) {
        if !self.tree.contains(deleted) {
            return;
        }
        let top_nodes = collect_host_nodes(&self.tree, deleted);

        for id in self.tree.subtree(deleted) {
            let fiber = &self.tree[id];
            for hook in &fiber.hooks {
                if let Hook::Effect(effect) = hook {
                    effect.teardown();
                }
            }
            if let Some(instance) = fiber.state_node.instance() {
                instance.borrow_mut().will_unmount();
            }
            if fiber.tag.is_host()
                && let Some(node_ref) = &fiber.node_ref
            {
                node_ref.set(None);
            }
            self.tree.for_each_buffer(id, |f| f.mounted = false);
        }

        for node in top_nodes {
            self.host.remove(node);
        }
    }

    fn commit_host(&mut self, id: FiberId) {
        let fiber = &self.tree[id];
        if !fiber.tag.is_host() {
            return;
        }
        let props = fiber.pending_props.clone();
        let text = props.text_content().map(|t| t.to_string()).unwrap_or_default();

        match fiber.state_node.host() {
            None => {
                let node = match (&fiber.tag, &fiber.element_type) {
                    (FiberTag::HostComponent, Some(ComponentType::Host(tag))) => {
                        self.host.create_element(tag, &props)
                    }
                    _ => self.host.create_text(&text),
                };
                self.tree[id].state_node = StateNode::Host(node);
            }
            Some(node) if fiber.effect.contains(EffectFlags::UPDATE) => match fiber.tag {
                FiberTag::HostText => self.host.set_text(node, &text),
                _ => self.host.apply_props(node, &props),
            },
            Some(_) => {}
        }
    }

    fn host_node_of(&self, id: FiberId) -> Option<HostId> {
        match &self.tree[id].state_node {
            StateNode::Root(root) => self.roots.get(*root).map(|r| r.container),
            state => state.host(),
        }
    }

    /// Relink parents from every root, flip `mounted` to the committed
    /// buffers and drop fibers that are neither committed nor a twin of one.
    fn sync_mounted(&mut self) {
        let mut live = FxHashSet::default();
        let roots: Vec<FiberId> = self.roots.values().map(|r| r.current).collect();

        for root in roots {
            let mut stack = vec![(root, None)];
            while let Some((id, parent)) = stack.pop() {
                if !self.tree.contains(id) {
                    continue;
                }
                live.insert(id);
                if let Some(alternate) = self.tree.alternate(id) {
                    live.insert(alternate);
                    self.tree[alternate].mounted = false;
                }
                let fiber = &mut self.tree[id];
                fiber.parent = parent;
                fiber.mounted = true;
                for child in self.tree.children(id) {
                    stack.push((child, Some(id)));
                }
            }
        }

        self.tree.retain(|id| live.contains(&id));
        self.pending_passive.retain(|id| live.contains(id));
    }

    fn run_effects(&mut self, id: FiberId, kind: EffectKind) {
        let Some(fiber) = self.tree.get_mut(id) else {
            return;
        };
        for hook in &mut fiber.hooks {
            if let Hook::Effect(effect) = hook
                && effect.kind == kind
                && effect.pending
            {
                effect.run();
            }
        }
    }

    /// Run queued passive effects of fibers that are still mounted.
    /// Returns whether anything was queued.
    pub(super) fn flush_passive(&mut self) -> bool {
        let pending = std::mem::take(&mut self.pending_passive);
        if pending.is_empty() {
            return false;
        }
        for id in pending {
            if self.tree.get(id).is_some_and(|f| f.mounted) {
                self.run_effects(id, EffectKind::Passive);
            }
        }
        true
    }
}
