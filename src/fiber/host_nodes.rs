//! Host-node collection.

use super::{FiberId, FiberTree, TreeReflection};
use crate::host::HostId;

/// Host nodes of every mounted host fiber under `fiber`, in document order.
///
/// `fiber` may be a stale handle; it is resolved to its committed twin
/// first. Returns an empty list when neither buffer is mounted. A host
/// fiber contributes its own node and is not descended into; the
/// starting fiber's siblings are never visited.
pub fn collect_host_nodes(tree: &FiberTree, fiber: FiberId) -> Vec<HostId> {
    match tree.find_current_fiber(fiber) {
        Some(current) => collect(tree, current, true),
        None => Vec::new(),
    }
}

/// Host nodes directly below `fiber` (its own node excluded), in order.
///
/// These are the children a host parent must hold after a commit.
pub fn host_children(tree: &FiberTree, fiber: FiberId) -> Vec<HostId> {
    collect(tree, fiber, false)
}

fn collect(tree: &FiberTree, start: FiberId, include_start: bool) -> Vec<HostId> {
    let mut out = Vec::new();
    let Some(first) = tree.get(start) else {
        return out;
    };
    if include_start && first.tag.is_host() {
        out.extend(first.state_node.host());
        return out;
    }

    // Child links only: parent links of bailed-out subtrees may still point
    // at the previous buffer until the commit relinks them.
    let mut stack = tree.children(start);
    stack.reverse();
    while let Some(id) = stack.pop() {
        let Some(fiber) = tree.get(id) else {
            continue;
        };
        if fiber.tag.is_host() {
            out.extend(fiber.state_node.host());
            continue;
        }
        let mut children = tree.children(id);
        children.reverse();
        stack.extend(children);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use slotmap::SlotMap;

    use super::*;
    use crate::element::Props;
    use crate::fiber::{Fiber, FiberTag, StateNode};

    struct Builder {
        tree: FiberTree,
        hosts: SlotMap<HostId, ()>,
    }

    impl Builder {
        fn new() -> Self {
            Self {
                tree: FiberTree::new(),
                hosts: SlotMap::with_key(),
            }
        }

        fn node(&mut self, tag: FiberTag, children: &[FiberId]) -> (FiberId, Option<HostId>) {
            let mut fiber = Fiber::new(tag, Rc::new(Props::new()));
            fiber.mounted = true;
            let host = tag.is_host().then(|| self.hosts.insert(()));
            if let Some(host) = host {
                fiber.state_node = StateNode::Host(host);
            }
            fiber.child = children.first().copied();
            let id = self.tree.insert(fiber);
            for (i, &child) in children.iter().enumerate() {
                let c = self.tree.get_mut(child).expect("child");
                c.parent = Some(id);
                c.sibling = children.get(i + 1).copied();
            }
            (id, host)
        }
    }

    #[test]
    fn test_document_order_across_component_boundaries() {
        // <App> <div><span/></div> <Inner> "a" <p/> </Inner> </App>
        let mut b = Builder::new();
        let (span, _) = b.node(FiberTag::HostComponent, &[]);
        let (div, div_node) = b.node(FiberTag::HostComponent, &[span]);
        let (text, text_node) = b.node(FiberTag::HostText, &[]);
        let (p, p_node) = b.node(FiberTag::HostComponent, &[]);
        let (inner, _) = b.node(FiberTag::Function, &[text, p]);
        let (app, _) = b.node(FiberTag::Function, &[div, inner]);

        let nodes = collect_host_nodes(&b.tree, app);
        assert_eq!(nodes, [div_node, text_node, p_node].map(Option::unwrap).to_vec());

        assert_eq!(host_children(&b.tree, div).len(), 1);
        assert_eq!(collect_host_nodes(&b.tree, div), vec![div_node.unwrap()]);
    }

    #[test]
    fn test_start_siblings_are_not_visited() {
        let mut b = Builder::new();
        let (t1, t1_node) = b.node(FiberTag::HostText, &[]);
        let (first, _) = b.node(FiberTag::Function, &[t1]);
        let (t2, _) = b.node(FiberTag::HostText, &[]);
        let (second, _) = b.node(FiberTag::Function, &[t2]);
        let (_root, _) = b.node(FiberTag::HostRoot, &[first, second]);

        assert_eq!(collect_host_nodes(&b.tree, first), vec![t1_node.unwrap()]);
    }

    #[test]
    fn test_unmounted_fiber_yields_nothing() {
        let mut b = Builder::new();
        let (text, _) = b.node(FiberTag::HostText, &[]);
        let (comp, _) = b.node(FiberTag::Function, &[text]);
        b.tree.get_mut(comp).expect("comp").mounted = false;
        assert!(collect_host_nodes(&b.tree, comp).is_empty());
    }
}
