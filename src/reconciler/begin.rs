//! Begin phase: bailouts and per-tag rendering.

use std::cell::RefCell;
use std::rc::Rc;

use super::Reconciler;
use crate::core::{EffectFlags, RenderError, WorkFlags};
use crate::element::{ComponentType, Element, Node, NodeRef, Props, RenderFn};
use crate::fiber::{FiberId, FiberTag, StateNode};
use crate::hooks::{ContextFrame, Hooks, lookup_context};
use crate::identity::{resolve_function, resolve_latest, unwrap_to_hot_reloadable};
use crate::debug;

impl Reconciler {
    /// Render `wip` and return its first child to work on next.
    pub(super) fn begin_work(&mut self, wip: FiberId) -> Result<Option<FiberId>, RenderError> {
        let depth = self.context_stack.len();
        let mark = self.effects.len();
        let fiber = &mut self.tree[wip];
        fiber.context_depth = depth;
        fiber.effect_mark = mark;
        let tag = fiber.tag;
        let work = fiber.work;

        // Providers push before the bailout check so bailed-out subtrees
        // still see their value.
        if tag == FiberTag::Provider {
            self.push_provider(wip);
        }

        if self.can_bail_out(wip) {
            self.tree[wip].work.remove(WorkFlags::ANY);
            return Ok(self.bailout(wip, work));
        }
        self.tree[wip].work.remove(WorkFlags::ANY);

        let ty = self.tree[wip].element_type.clone();
        match (tag, ty) {
            (FiberTag::HostRoot, _) => Ok(self.update_host_root(wip)),
            (FiberTag::HostText, _) => Ok(None),
            (FiberTag::HostComponent | FiberTag::Provider, _) => {
                let children = self.tree[wip].pending_props.children().to_vec();
                Ok(self.reconcile_children(wip, Node::List(children), false))
            }
            (FiberTag::Function, Some(ComponentType::Function(def))) => {
                let render = resolve_function(&def).render().clone();
                self.render_with_hooks(wip, None, &render)
            }
            (FiberTag::ForwardRef, Some(ty)) => {
                let Some(def) = unwrap_to_hot_reloadable(&resolve_latest(&ty)) else {
                    return Ok(None);
                };
                let render = def.render().clone();
                let forwarded = self.tree[wip].node_ref.clone();
                self.render_with_hooks(wip, forwarded, &render)
            }
            (FiberTag::Class, Some(ComponentType::Class(def))) => {
                let props = self.tree[wip].pending_props.clone();
                let captured = self.tree[wip].effect.contains(EffectFlags::DID_CAPTURE);
                let instance = match self.tree[wip].state_node.instance() {
                    Some(instance) => instance.clone(),
                    None => {
                        let instance = Rc::new(RefCell::new(def.construct(&props)));
                        self.tree[wip].state_node = StateNode::Instance(instance.clone());
                        instance
                    }
                };
                let node = instance.borrow().render(&props)?;
                Ok(self.reconcile_children(wip, node, captured))
            }
            (FiberTag::Memo, Some(ty)) => Ok(self.update_memo(wip, &ty, work)),
            (FiberTag::Consumer, Some(ComponentType::Consumer(context))) => {
                let value = lookup_context(&self.context_stack, &context)
                    .map(|frame| frame.value.clone())
                    .unwrap_or_else(|| context.default_value().clone());
                let props = self.tree[wip].pending_props.clone();
                let node = props
                    .render_prop("render")
                    .map_or(Node::Empty, |render| render(&value));
                Ok(self.reconcile_children(wip, node, false))
            }
            (tag, ty) => {
                debug!("render"; "no render path for {tag:?} with {ty:?}");
                Ok(None)
            }
        }
    }

    fn can_bail_out(&self, wip: FiberId) -> bool {
        let fiber = &self.tree[wip];
        let unchanged = fiber
            .memoized_props
            .as_ref()
            .is_some_and(|memoized| Rc::ptr_eq(memoized, &fiber.pending_props));
        unchanged
            && !fiber.work.intersects(WorkFlags::PENDING)
            && !fiber.effect.contains(EffectFlags::DID_CAPTURE)
            && !self.context_changed()
    }

    /// Skip rendering `wip`; descend only when a descendant has work.
    fn bailout(&mut self, wip: FiberId, work: WorkFlags) -> Option<FiberId> {
        if !work.contains(WorkFlags::CHILD_UPDATE) {
            return None;
        }
        self.clone_child_fibers(wip);
        self.tree[wip].child
    }

    /// Give every child of `wip` a work-in-progress twin.
    fn clone_child_fibers(&mut self, wip: FiberId) {
        let children = self.tree.children(wip);
        let mut prev: Option<FiberId> = None;
        for child in children {
            let props = self.tree[child].pending_props.clone();
            let next = self.create_work_in_progress(child, props);
            self.tree[next].parent = Some(wip);
            self.tree[next].sibling = None;
            match prev {
                Some(prev) => self.tree[prev].sibling = Some(next),
                None => self.tree[wip].child = Some(next),
            }
            prev = Some(next);
        }
    }

    fn push_provider(&mut self, wip: FiberId) {
        let fiber = &self.tree[wip];
        let Some(ComponentType::Provider(context)) = &fiber.element_type else {
            return;
        };
        let value = fiber
            .pending_props
            .value("value")
            .cloned()
            .unwrap_or_else(|| context.default_value().clone());
        let changed = match fiber.memoized_props.as_ref().and_then(|p| p.value("value")) {
            Some(prev) => !Rc::ptr_eq(prev, &value),
            None => fiber.memoized_props.is_some(),
        };
        self.context_stack.push(ContextFrame {
            context: context.clone(),
            value,
            changed,
        });
    }

    fn update_host_root(&mut self, wip: FiberId) -> Option<FiberId> {
        let pending = match &self.tree[wip].state_node {
            StateNode::Root(root) => self.roots.get_mut(*root).and_then(|r| r.pending.take()),
            _ => None,
        };
        if let Some(node) = pending {
            self.tree[wip].pending_props = Rc::new(Props::with_children(vec![node]));
        }
        let children = self.tree[wip].pending_props.children().to_vec();
        self.reconcile_children(wip, Node::List(children), false)
    }

    fn update_memo(&mut self, wip: FiberId, ty: &ComponentType, work: WorkFlags) -> Option<FiberId> {
        let latest = resolve_latest(ty);
        let (inner, memo) = match &latest {
            ComponentType::Memo(def) => (def.inner().clone(), Some(def.clone())),
            other => (other.clone(), None),
        };

        let fiber = &self.tree[wip];
        let props_equal = match (&memo, &fiber.memoized_props) {
            (Some(def), Some(prev)) => def.props_equal(prev, &fiber.pending_props),
            _ => false,
        };
        if props_equal
            && fiber.child.is_some()
            && !work.intersects(WorkFlags::PENDING)
            && !self.context_changed()
        {
            return self.bailout(wip, work);
        }

        let element = Element {
            ty: inner,
            key: None,
            props: fiber.pending_props.clone(),
            node_ref: fiber.node_ref.clone(),
        };
        self.reconcile_children(wip, Node::Element(element), false)
    }

    fn render_with_hooks(
        &mut self,
        wip: FiberId,
        forwarded_ref: Option<NodeRef>,
        render: &RenderFn,
    ) -> Result<Option<FiberId>, RenderError> {
        let prev = std::mem::take(&mut self.tree[wip].hooks);
        let props = self.tree[wip].pending_props.clone();
        let mut hooks = Hooks::new(
            wip,
            prev,
            self.context_stack.clone(),
            self.sink.clone(),
            forwarded_ref,
        );
        let node = render(&mut hooks, &props)?;
        let (slots, flags) = hooks.finish();

        let fiber = &mut self.tree[wip];
        fiber.hooks = slots;
        fiber.effect |= flags;
        Ok(self.reconcile_children(wip, node, false))
    }

    /// Route a render error to the nearest boundary above `unit`.
    ///
    /// On capture, render state is unwound to the boundary and the boundary
    /// is returned as the next unit of work.
    pub(super) fn throw_exception(
        &mut self,
        unit: FiberId,
        error: RenderError,
    ) -> Result<Option<FiberId>, RenderError> {
        let mut next = self.tree.get(unit).and_then(|f| f.parent);
        while let Some(id) = next {
            let fiber = &self.tree[id];
            next = fiber.parent;
            if fiber.tag != FiberTag::Class || fiber.effect.contains(EffectFlags::DID_CAPTURE) {
                continue;
            }
            let Some(instance) = fiber.state_node.instance().cloned() else {
                continue;
            };
            if !instance.borrow_mut().capture_error(&error) {
                continue;
            }

            debug!("render"; "<{}> captured: {}", fiber.name(), error);
            let (depth, mark) = (fiber.context_depth, fiber.effect_mark);
            self.context_stack.truncate(depth);
            self.effects.truncate(mark);
            self.tree[id].effect.insert(EffectFlags::DID_CAPTURE);
            return Ok(Some(id));
        }

        let name = self.tree.get(unit).map_or("#unknown", |f| f.name()).to_owned();
        Err(RenderError::uncaught(&name, error))
    }
}
