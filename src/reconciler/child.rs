//! Keyed child reconciliation.
//!
//! Old children come from the committed twin. A new child reuses an old
//! fiber when their keys match (explicit key, else position) and the
//! types are compatible: strictly equal, or the same component across a
//! reload. Fibers marked `REMOUNT` are never reused.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::Reconciler;
use crate::core::{EffectFlags, WorkFlags};
use crate::element::{Node, Props, SharedStr};
use crate::fiber::{Fiber, FiberId, FiberTag};
use crate::identity::is_same_component;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ChildKey {
    Key(SharedStr),
    Index(usize),
}

impl ChildKey {
    fn of(key: Option<&SharedStr>, index: usize) -> Self {
        match key {
            Some(key) => Self::Key(key.clone()),
            None => Self::Index(index),
        }
    }
}

/// Flattened children with their positional index. Empty nodes keep
/// their position so conditional siblings do not shift.
fn child_slots(node: Node) -> Vec<(usize, Node)> {
    fn push(node: Node, index: &mut usize, out: &mut Vec<(usize, Node)>) {
        match node {
            Node::List(nodes) => {
                for node in nodes {
                    push(node, index, out);
                }
            }
            Node::Empty => *index += 1,
            node => {
                out.push((*index, node));
                *index += 1;
            }
        }
    }

    let mut out = Vec::new();
    push(node, &mut 0, &mut out);
    out
}

impl Reconciler {
    /// Rebuild the child list of `wip` from `children`.
    ///
    /// With `force_remount`, no old child is reused. Returns the first
    /// child.
    pub(super) fn reconcile_children(
        &mut self,
        wip: FiberId,
        children: Node,
        force_remount: bool,
    ) -> Option<FiberId> {
        let old = match self.tree.alternate(wip) {
            Some(current) => self.tree.children(current),
            None => Vec::new(),
        };
        let mut by_key: FxHashMap<ChildKey, FiberId> = old
            .iter()
            .map(|&id| {
                let fiber = &self.tree[id];
                (ChildKey::of(fiber.key.as_ref(), fiber.index), id)
            })
            .collect();

        let mut reused = Vec::new();
        let mut created = false;
        let mut first = None;
        let mut prev: Option<FiberId> = None;

        for (index, node) in child_slots(children) {
            let key = match &node {
                Node::Element(element) => ChildKey::of(element.key.as_ref(), index),
                _ => ChildKey::Index(index),
            };
            let candidate = by_key
                .get(&key)
                .copied()
                .filter(|&old| !force_remount && self.can_reuse(old, &node));

            let child = match candidate {
                Some(old) => {
                    by_key.remove(&key);
                    reused.push(old);
                    self.update_child(old, node)
                }
                None => {
                    created = true;
                    self.create_child(node)
                }
            };

            let fiber = &mut self.tree[child];
            fiber.parent = Some(wip);
            fiber.index = index;
            fiber.sibling = None;
            match prev {
                Some(prev) => self.tree[prev].sibling = Some(child),
                None => first = Some(child),
            }
            prev = Some(child);
        }

        let kept: FxHashSet<FiberId> = reused.iter().copied().collect();
        let deletions: Vec<FiberId> = old.iter().copied().filter(|id| !kept.contains(id)).collect();
        let reordered = old.iter().copied().filter(|id| kept.contains(id)).ne(reused.iter().copied());

        if created || reordered || !deletions.is_empty() {
            self.mark_host_parent(wip);
        }
        let fiber = &mut self.tree[wip];
        fiber.child = first;
        fiber.deletions = deletions;
        first
    }

    fn can_reuse(&self, old: FiberId, node: &Node) -> bool {
        let fiber = &self.tree[old];
        if fiber.work.contains(WorkFlags::REMOUNT) {
            return false;
        }
        match node {
            Node::Text(_) => fiber.tag == FiberTag::HostText,
            Node::Element(element) => fiber
                .element_type
                .as_ref()
                .is_some_and(|ty| ty.same_type(&element.ty) || is_same_component(ty, &element.ty)),
            Node::Empty | Node::List(_) => false,
        }
    }

    fn update_child(&mut self, old: FiberId, node: Node) -> FiberId {
        match node {
            Node::Element(element) => {
                let id = self.create_work_in_progress(old, element.props);
                let fiber = &mut self.tree[id];
                fiber.element_type = Some(element.ty);
                fiber.node_ref = element.node_ref;
                id
            }
            Node::Text(text) => {
                let props = self.tree[old]
                    .memoized_props
                    .clone()
                    .filter(|props| props.text_content().is_some_and(|t| *t == text))
                    .unwrap_or_else(|| Rc::new(Props::text(text)));
                self.create_work_in_progress(old, props)
            }
            Node::Empty | Node::List(_) => old,
        }
    }

    fn create_child(&mut self, node: Node) -> FiberId {
        let mut fiber = match node {
            Node::Element(element) => {
                let mut fiber = Fiber::new(FiberTag::of(&element.ty), element.props);
                fiber.key = element.key;
                fiber.element_type = Some(element.ty);
                fiber.node_ref = element.node_ref;
                fiber
            }
            Node::Text(text) => Fiber::new(FiberTag::HostText, Rc::new(Props::text(text))),
            Node::Empty | Node::List(_) => Fiber::new(FiberTag::HostText, Rc::new(Props::text("".into()))),
        };
        fiber.effect = EffectFlags::PLACEMENT;
        self.tree.insert(fiber)
    }

    /// Flag the nearest host ancestor (or `wip` itself) for a child resync.
    fn mark_host_parent(&mut self, wip: FiberId) {
        let mut next = Some(wip);
        while let Some(id) = next {
            let fiber = &mut self.tree[id];
            if matches!(fiber.tag, FiberTag::HostComponent | FiberTag::HostRoot) {
                fiber.effect.insert(EffectFlags::CHILDREN_CHANGED);
                return;
            }
            next = fiber.parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slots_keep_positions() {
        let slots = child_slots(Node::List(vec![
            Node::Empty,
            Node::from("a"),
            Node::List(vec![Node::from("b"), Node::Empty]),
            Node::from("c"),
        ]));
        let indices: Vec<usize> = slots.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 2, 4]);
    }

    #[test]
    fn test_explicit_key_wins_over_index() {
        let key: SharedStr = "row".into();
        assert_eq!(ChildKey::of(Some(&key), 3), ChildKey::Key(key));
        assert_eq!(ChildKey::of(None, 3), ChildKey::Index(3));
    }
}
