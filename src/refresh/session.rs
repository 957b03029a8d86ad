//! Refresh session entry point.

use rustc_hash::FxHashSet;

use super::{RefreshTarget, ReloadRequest, ReloadResult, walker};
use crate::config::RefreshSection;
use crate::core::{EffectFlags, RenderError};
use crate::fiber::{FiberId, FiberTag, FiberTree, RootId, collect_host_nodes};
use crate::host::HostId;
use crate::{debug, debug_do};

/// Apply `request` to the tree mounted at `root`.
///
/// Pending passive effects are flushed first (unless disabled), then the
/// tree walk runs inside one batch so every request commits together.
/// Returns the host nodes of all affected subtrees and the class
/// boundaries that captured an error while re-rendering.
pub fn schedule_update_for_hot_reload<T: RefreshTarget>(
    target: &mut T,
    root: RootId,
    request: &ReloadRequest,
    options: &RefreshSection,
) -> Result<ReloadResult, RenderError> {
    let root_fiber = target.root_fiber(root).ok_or(RenderError::UnknownRoot)?;

    if options.flush_passive_effects {
        target.flush_passive_effects();
    }

    let commits_before = target.commit_count();
    let affected = target.batched_updates(|target| walker::schedule_refresh(target, root_fiber, request))?;

    let failed_boundaries = if target.commit_count() == commits_before {
        Vec::new()
    } else {
        captured_boundaries(target.tree(), target.last_committed_effects())
    };

    let host_nodes = if options.collect_host_nodes {
        affected_host_nodes(target, &affected)
    } else {
        Vec::new()
    };

    debug!(
        "refresh";
        "{} updated, {} invalidated: {} fibers affected, {} host nodes, {} failed boundaries",
        request.updated.len(),
        request.invalidated.len(),
        affected.len(),
        host_nodes.len(),
        failed_boundaries.len()
    );
    debug_do! {
        for fiber in &failed_boundaries {
            if let Some(f) = target.tree().get(*fiber) {
                debug!("refresh"; "boundary <{}> captured during reload", f.name());
            }
        }
    }

    Ok(ReloadResult {
        host_nodes,
        failed_boundaries,
    })
}

/// Class fibers flagged `DID_CAPTURE` in `effects`, first occurrence order.
fn captured_boundaries(tree: &FiberTree, effects: &[(FiberId, EffectFlags)]) -> Vec<FiberId> {
    let mut seen = FxHashSet::default();
    effects
        .iter()
        .filter(|(_, flags)| flags.contains(EffectFlags::DID_CAPTURE))
        .map(|(fiber, _)| *fiber)
        .filter(|fiber| tree.get(*fiber).is_some_and(|f| f.tag == FiberTag::Class))
        .filter(|fiber| seen.insert(*fiber))
        .collect()
}

fn affected_host_nodes<T: RefreshTarget>(target: &T, affected: &[FiberId]) -> Vec<HostId> {
    let mut seen_fibers = FxHashSet::default();
    let mut seen_nodes = FxHashSet::default();
    let mut nodes = Vec::new();

    for &fiber in affected {
        let Some(current) = target.find_current_fiber(fiber) else {
            continue;
        };
        if !seen_fibers.insert(current) {
            continue;
        }
        for node in collect_host_nodes(target.tree(), current) {
            if seen_nodes.insert(node) {
                nodes.push(node);
            }
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::rc::Rc;

    use crate::element::Props;
    use crate::fiber::Fiber;

    #[test]
    fn test_captured_boundaries_keeps_classes_once() {
        let mut tree = FiberTree::new();
        let a = tree.insert(Fiber::new(FiberTag::Class, Rc::new(Props::new())));
        let b = tree.insert(Fiber::new(FiberTag::Class, Rc::new(Props::new())));
        let f = tree.insert(Fiber::new(FiberTag::Function, Rc::new(Props::new())));
        let effects = [
            (a, EffectFlags::DID_CAPTURE | EffectFlags::CHILDREN_CHANGED),
            (b, EffectFlags::UPDATE),
            (f, EffectFlags::DID_CAPTURE),
            (a, EffectFlags::DID_CAPTURE),
        ];
        assert_eq!(captured_boundaries(&tree, &effects), vec![a]);
    }
}
