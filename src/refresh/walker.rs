//! Tree walk issuing refresh and remount requests.

use super::{RefreshTarget, ReloadRequest};
use crate::core::{ScheduleRequest, WorkFlags};
use crate::fiber::FiberId;
use crate::hooks::invalidate_fiber_hooks;
use crate::identity::unwrap_to_hot_reloadable;
use crate::debug;

/// Walk the committed tree below `root_fiber` and schedule every fiber the
/// request touches. Returns the affected fibers in visit order.
///
/// - a failed boundary (either buffer) is remounted through its parent
/// - a fiber whose identity is invalidated is remounted through its parent;
///   invalidation wins over an update of the same identity
/// - a fiber whose identity is updated is re-rendered with its hook
///   dependency lists invalidated
///
/// Must run inside `batched_updates` so the requests coalesce into one
/// commit.
pub fn schedule_refresh<T: RefreshTarget>(
    target: &mut T,
    root_fiber: FiberId,
    request: &ReloadRequest,
) -> Vec<FiberId> {
    let mut affected = Vec::new();
    let mut stack = vec![root_fiber];

    while let Some(id) = stack.pop() {
        let Some(fiber) = target.tree().get(id) else {
            continue;
        };
        let parent = fiber.parent;
        let failed = request.failed_boundaries.contains(&id)
            || fiber
                .alternate
                .is_some_and(|alt| request.failed_boundaries.contains(&alt));
        let identity = fiber
            .element_type
            .as_ref()
            .and_then(unwrap_to_hot_reloadable)
            .and_then(|def| def.identity().cloned());

        let mut children = target.tree().children(id);
        children.reverse();
        stack.extend(children);

        let invalidated = identity
            .as_ref()
            .is_some_and(|identity| request.invalidated.contains_ref(identity));
        if failed || invalidated {
            schedule_remount(target, id, parent, &mut affected);
        } else if identity
            .as_ref()
            .is_some_and(|identity| request.updated.contains_ref(identity))
        {
            target.schedule_work(id, ScheduleRequest::refresh());
            invalidate_fiber_hooks(target.tree_mut(), id);
            affected.push(id);
        }
    }
    affected
}

fn schedule_remount<T: RefreshTarget>(
    target: &mut T,
    fiber: FiberId,
    parent: Option<FiberId>,
    affected: &mut Vec<FiberId>,
) {
    let Some(parent) = parent else {
        debug!("refresh"; "cannot remount parentless fiber {fiber:?}; skipped");
        return;
    };
    target
        .tree_mut()
        .for_each_buffer(fiber, |f| f.work.insert(WorkFlags::REMOUNT));
    target.schedule_work(parent, ScheduleRequest::refresh());
    affected.push(parent);
}
