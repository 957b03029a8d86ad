//! Reload-time invalidation of hook dependency lists.

use super::Hook;
use crate::fiber::{FiberId, FiberTree};

/// Mark every tracked dependency list in `hooks` stale.
///
/// Memo, callback and effect slots recompute (or re-run, cleanup first) on
/// the next render; state, reducer, ref and context slots are untouched.
/// Returns the number of lists invalidated.
pub fn invalidate_hooks(hooks: &mut [Hook]) -> usize {
    hooks
        .iter_mut()
        .filter_map(Hook::deps_mut)
        .map(|deps| usize::from(deps.invalidate()))
        .sum()
}

/// Invalidate the hooks of `fiber` and of its alternate.
///
/// Fibers without hooks (hosts, classes, contexts) are a no-op.
pub fn invalidate_fiber_hooks(tree: &mut FiberTree, fiber: FiberId) -> usize {
    let mut count = 0;
    tree.for_each_buffer(fiber, |f| count += invalidate_hooks(&mut f.hooks));
    count
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::deps;
    use crate::hooks::{Deps, EffectHook, EffectKind, MemoHook, StateHook};

    fn effect(deps: Deps) -> Hook {
        Hook::Effect(EffectHook {
            kind: EffectKind::Passive,
            create: Rc::new(|| None),
            destroy: Rc::default(),
            deps,
            pending: false,
        })
    }

    #[test]
    fn test_only_tracked_lists_are_invalidated() {
        let mut hooks = vec![
            Hook::State(StateHook::new(3_i64)),
            Hook::Memo(MemoHook {
                value: Rc::new("cached"),
                deps: deps![1],
            }),
            effect(deps![]),
            effect(Deps::Always),
            Hook::Ref(Rc::new(0_u8)),
        ];
        assert_eq!(invalidate_hooks(&mut hooks), 2);
        assert!(hooks[1].deps().is_some_and(Deps::is_invalidated));
        assert!(hooks[2].deps().is_some_and(Deps::is_invalidated));
        assert_eq!(hooks[3].deps(), Some(&Deps::Always));

        let Hook::State(state) = &hooks[0] else {
            panic!("state slot moved");
        };
        assert_eq!(state.get::<i64>(), Some(3));
    }

    #[test]
    fn test_empty_hook_list_is_noop() {
        assert_eq!(invalidate_hooks(&mut []), 0);
    }
}
