//! Complete phase.

use std::rc::Rc;

use super::Reconciler;
use crate::core::EffectFlags;
use crate::fiber::{FiberId, FiberTag};

impl Reconciler {
    /// Complete `unit` and its finished ancestors; return the next sibling
    /// to begin, or `None` when the root is done.
    pub(super) fn complete_unit_of_work(&mut self, unit: FiberId) -> Option<FiberId> {
        let mut node = unit;
        loop {
            self.complete_work(node);
            if Some(node) == self.wip_root {
                return None;
            }
            let fiber = &self.tree[node];
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            node = fiber.parent?;
        }
    }

    fn complete_work(&mut self, id: FiberId) {
        if self.tree[id].tag == FiberTag::Provider {
            self.context_stack.truncate(self.tree[id].context_depth);
        }

        let alternate_ref = self
            .tree
            .alternate(id)
            .and_then(|alt| self.tree[alt].node_ref.clone());

        let fiber = &mut self.tree[id];
        if fiber.tag.is_host() {
            let changed = fiber
                .memoized_props
                .as_ref()
                .is_some_and(|prev| !Rc::ptr_eq(prev, &fiber.pending_props));
            let placed = fiber.state_node.host().is_none();
            if placed {
                fiber.effect.insert(EffectFlags::PLACEMENT);
            } else if changed {
                fiber.effect.insert(EffectFlags::UPDATE);
            }
            if let Some(node_ref) = &fiber.node_ref
                && (placed || !alternate_ref.is_some_and(|prev| prev.ptr_eq(node_ref)))
            {
                fiber.effect.insert(EffectFlags::REF);
            }
        }
        fiber.memoized_props = Some(fiber.pending_props.clone());

        if !fiber.effect.is_empty() || !fiber.deletions.is_empty() {
            self.effects.push(id);
        }
    }
}
