//! Retained fiber tree.
//!
//! Fibers live in a `SlotMap` arena and link to each other by `FiberId`:
//! parent, first child, next sibling and alternate. A fiber and its
//! alternate are the two buffers of one tree position; after every commit
//! exactly one of them is current and carries `mounted = true`.
//!
//! # Modules
//!
//! - `host_nodes` - mounted host nodes under a fiber, in document order

mod host_nodes;

use std::cell::RefCell;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

use crate::core::{EffectFlags, WorkFlags};
use crate::element::{Component, ComponentType, NodeRef, Props, SharedStr};
use crate::hooks::Hook;
use crate::host::HostId;

pub use host_nodes::{collect_host_nodes, host_children};

new_key_type! {
    /// Handle of a fiber in the arena.
    pub struct FiberId;

    /// Handle of a render root.
    pub struct RootId;
}

/// What a fiber represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiberTag {
    HostRoot,
    HostComponent,
    HostText,
    Function,
    Class,
    Memo,
    ForwardRef,
    Provider,
    Consumer,
}

impl FiberTag {
    pub fn of(ty: &ComponentType) -> Self {
        match ty {
            ComponentType::Host(_) => Self::HostComponent,
            ComponentType::Function(_) => Self::Function,
            ComponentType::Class(_) => Self::Class,
            ComponentType::Memo(_) => Self::Memo,
            ComponentType::ForwardRef(_) => Self::ForwardRef,
            ComponentType::Provider(_) => Self::Provider,
            ComponentType::Consumer(_) => Self::Consumer,
        }
    }

    /// Fibers that own a host node.
    pub fn is_host(self) -> bool {
        matches!(self, Self::HostComponent | Self::HostText)
    }
}

/// Class component instance shared by both buffers.
pub type Instance = Rc<RefCell<Box<dyn Component>>>;

/// Per-tag state attached to a fiber.
#[derive(Clone, Default)]
pub enum StateNode {
    #[default]
    None,
    Host(HostId),
    Instance(Instance),
    Root(RootId),
}

impl StateNode {
    pub fn host(&self) -> Option<HostId> {
        match self {
            Self::Host(id) => Some(*id),
            _ => None,
        }
    }

    pub fn instance(&self) -> Option<&Instance> {
        match self {
            Self::Instance(instance) => Some(instance),
            _ => None,
        }
    }
}

/// One node of the retained tree.
#[derive(Clone)]
pub struct Fiber {
    pub tag: FiberTag,
    pub key: Option<SharedStr>,
    pub element_type: Option<ComponentType>,
    pub pending_props: Rc<Props>,
    pub memoized_props: Option<Rc<Props>>,
    pub hooks: Vec<Hook>,
    pub state_node: StateNode,

    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub index: usize,
    pub alternate: Option<FiberId>,

    pub effect: EffectFlags,
    pub work: WorkFlags,
    pub deletions: Vec<FiberId>,
    pub node_ref: Option<NodeRef>,
    pub mounted: bool,

    /// Context stack depth when this fiber began, restored on unwind.
    pub(crate) context_depth: usize,
    /// Effect list length when this fiber began, restored on unwind.
    pub(crate) effect_mark: usize,
}

impl Fiber {
    pub fn new(tag: FiberTag, props: Rc<Props>) -> Self {
        Self {
            tag,
            key: None,
            element_type: None,
            pending_props: props,
            memoized_props: None,
            hooks: Vec::new(),
            state_node: StateNode::None,
            parent: None,
            child: None,
            sibling: None,
            index: 0,
            alternate: None,
            effect: EffectFlags::empty(),
            work: WorkFlags::empty(),
            deletions: Vec::new(),
            node_ref: None,
            mounted: false,
            context_depth: 0,
            effect_mark: 0,
        }
    }

    /// Display name for logs and errors.
    pub fn name(&self) -> &str {
        match (&self.element_type, self.tag) {
            (Some(ty), _) => ty.name(),
            (None, FiberTag::HostRoot) => "#root",
            (None, FiberTag::HostText) => "#text",
            (None, _) => "#unknown",
        }
    }
}

impl fmt::Debug for Fiber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fiber")
            .field("tag", &self.tag)
            .field("name", &self.name())
            .field("key", &self.key)
            .field("effect", &self.effect)
            .field("work", &self.work)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// FiberTree
// =============================================================================

/// Arena owning every fiber of every root.
#[derive(Default)]
pub struct FiberTree {
    fibers: SlotMap<FiberId, Fiber>,
}

impl FiberTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fiber: Fiber) -> FiberId {
        self.fibers.insert(fiber)
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber> {
        self.fibers.get(id)
    }

    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber> {
        self.fibers.get_mut(id)
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Drop every fiber for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(FiberId) -> bool) {
        self.fibers.retain(|id, _| keep(id));
    }

    pub fn alternate(&self, id: FiberId) -> Option<FiberId> {
        self.get(id)
            .and_then(|f| f.alternate)
            .filter(|alt| self.contains(*alt))
    }

    /// Direct children of `id`, in sibling order.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut next = self.get(id).and_then(|f| f.child);
        while let Some(child) = next {
            let Some(fiber) = self.get(child) else {
                break;
            };
            out.push(child);
            next = fiber.sibling;
        }
        out
    }

    /// Apply `f` to the fiber and to its alternate, if any.
    pub fn for_each_buffer(&mut self, id: FiberId, mut f: impl FnMut(&mut Fiber)) {
        let alternate = self.alternate(id);
        for target in std::iter::once(id).chain(alternate) {
            if let Some(fiber) = self.get_mut(target) {
                f(fiber);
            }
        }
    }

    /// All fibers of the subtree rooted at `id` (including `id`), pre-order.
    pub fn subtree(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            out.push(current);
            let mut children = self.children(current);
            children.reverse();
            stack.extend(children);
        }
        out
    }
}

impl Index<FiberId> for FiberTree {
    type Output = Fiber;

    fn index(&self, id: FiberId) -> &Fiber {
        &self.fibers[id]
    }
}

impl IndexMut<FiberId> for FiberTree {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber {
        &mut self.fibers[id]
    }
}

// =============================================================================
// Tree reflection
// =============================================================================

/// Resolution of possibly stale fiber handles.
pub trait TreeReflection {
    /// The committed twin of `fiber`, or `None` if neither buffer is mounted.
    fn find_current_fiber(&self, fiber: FiberId) -> Option<FiberId>;

    fn is_fiber_mounted(&self, fiber: FiberId) -> bool {
        self.find_current_fiber(fiber).is_some()
    }
}

impl TreeReflection for FiberTree {
    fn find_current_fiber(&self, fiber: FiberId) -> Option<FiberId> {
        let node = self.get(fiber)?;
        if node.mounted {
            return Some(fiber);
        }
        self.alternate(fiber)
            .filter(|alt| self.get(*alt).is_some_and(|f| f.mounted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(tree: &mut FiberTree, parent: FiberId, children: &[FiberId]) {
        if let Some(p) = tree.get_mut(parent) {
            p.child = children.first().copied();
        }
        for (i, &child) in children.iter().enumerate() {
            let fiber = tree.get_mut(child).expect("child exists");
            fiber.parent = Some(parent);
            fiber.index = i;
            fiber.sibling = children.get(i + 1).copied();
        }
    }

    fn fiber(tree: &mut FiberTree, tag: FiberTag) -> FiberId {
        tree.insert(Fiber::new(tag, Rc::new(Props::new())))
    }

    #[test]
    fn test_children_and_subtree_order() {
        let mut tree = FiberTree::new();
        let root = fiber(&mut tree, FiberTag::HostRoot);
        let a = fiber(&mut tree, FiberTag::Function);
        let b = fiber(&mut tree, FiberTag::HostComponent);
        let a1 = fiber(&mut tree, FiberTag::HostText);
        link(&mut tree, root, &[a, b]);
        link(&mut tree, a, &[a1]);

        assert_eq!(tree.children(root), vec![a, b]);
        assert_eq!(tree.subtree(root), vec![root, a, a1, b]);
    }

    #[test]
    fn test_reflection_follows_alternate() {
        let mut tree = FiberTree::new();
        let current = fiber(&mut tree, FiberTag::Function);
        let wip = fiber(&mut tree, FiberTag::Function);
        tree.get_mut(current).expect("current").alternate = Some(wip);
        tree.get_mut(wip).expect("wip").alternate = Some(current);
        tree.get_mut(current).expect("current").mounted = true;

        assert_eq!(tree.find_current_fiber(wip), Some(current));
        assert_eq!(tree.find_current_fiber(current), Some(current));

        tree.get_mut(current).expect("current").mounted = false;
        assert!(!tree.is_fiber_mounted(wip));
    }

    #[test]
    fn test_for_each_buffer_touches_both() {
        let mut tree = FiberTree::new();
        let a = fiber(&mut tree, FiberTag::Function);
        let b = fiber(&mut tree, FiberTag::Function);
        tree.get_mut(a).expect("a").alternate = Some(b);
        tree.for_each_buffer(a, |f| f.work |= WorkFlags::REMOUNT);
        assert!(tree.get(a).is_some_and(|f| f.work.contains(WorkFlags::REMOUNT)));
        assert!(tree.get(b).is_some_and(|f| f.work.contains(WorkFlags::REMOUNT)));
    }
}
