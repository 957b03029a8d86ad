//! Dependency lists of memo and effect hooks.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::element::SharedStr;

/// A single dependency value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dep {
    Int(i64),
    Str(SharedStr),
    Bool(bool),
    /// Address of a shared value, compared by reference.
    Ptr(usize),
}

impl Dep {
    /// Dependency on the identity of a shared value.
    pub fn ptr<T: ?Sized>(value: &Rc<T>) -> Self {
        Self::Ptr(Rc::as_ptr(value).cast::<()>() as usize)
    }
}

impl From<i64> for Dep {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Dep {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<usize> for Dep {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<bool> for Dep {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Dep {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Dep {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<SharedStr> for Dep {
    fn from(value: SharedStr) -> Self {
        Self::Str(value)
    }
}

/// Dependency list of a memo or effect slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deps {
    /// No list: recompute on every render.
    Always,
    /// Recompute when any element changes; empty means "once".
    Tracked(SmallVec<[Dep; 4]>),
    /// Marked stale by a reload. Never equal to anything.
    Invalidated,
}

impl Deps {
    /// The "run once" list.
    pub fn once() -> Self {
        Self::Tracked(SmallVec::new())
    }

    /// Whether a slot recorded with `self` can be reused for `next`.
    pub fn matches(&self, next: &Deps) -> bool {
        match (self, next) {
            (Self::Tracked(prev), Self::Tracked(next)) => prev == next,
            _ => false,
        }
    }

    /// Mark stale. Returns `true` if the list carried dependencies.
    pub fn invalidate(&mut self) -> bool {
        match self {
            Self::Tracked(_) => {
                *self = Self::Invalidated;
                true
            }
            Self::Always | Self::Invalidated => false,
        }
    }

    pub fn is_invalidated(&self) -> bool {
        matches!(self, Self::Invalidated)
    }
}

/// Build a tracked dependency list.
///
/// ```ignore
/// hooks.use_memo(deps![count, "label"], || expensive(count));
/// hooks.use_effect(deps![], || { subscribe(); None });
/// ```
#[macro_export]
macro_rules! deps {
    () => {
        $crate::hooks::Deps::once()
    };
    ($($dep:expr),+ $(,)?) => {
        $crate::hooks::Deps::Tracked(::smallvec::smallvec![$($crate::hooks::Dep::from($dep)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps;

    #[test]
    fn test_tracked_lists_compare_elementwise() {
        assert!(deps![1, "a"].matches(&deps![1, "a"]));
        assert!(!deps![1, "a"].matches(&deps![2, "a"]));
        assert!(deps![].matches(&Deps::once()));
    }

    #[test]
    fn test_always_and_invalidated_never_match() {
        assert!(!Deps::Always.matches(&Deps::Always));
        assert!(!Deps::Invalidated.matches(&deps![]));
        assert!(!deps![].matches(&Deps::Invalidated));
    }

    #[test]
    fn test_invalidate_only_touches_tracked_lists() {
        let mut tracked = deps![true];
        assert!(tracked.invalidate());
        assert!(tracked.is_invalidated());

        let mut always = Deps::Always;
        assert!(!always.invalidate());
        assert_eq!(always, Deps::Always);
    }

    #[test]
    fn test_ptr_dep_uses_reference_identity() {
        let a = Rc::new(5);
        let b = Rc::new(5);
        assert_eq!(Dep::ptr(&a), Dep::ptr(&a.clone()));
        assert_ne!(Dep::ptr(&a), Dep::ptr(&b));
    }
}
