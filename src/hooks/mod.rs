//! Per-render hook slots of function components.
//!
//! A function fiber keeps an ordered list of `Hook` slots. During render the
//! `Hooks` context walks the previous list (taken from the committed twin)
//! and builds the next one; slot order is stable as long as the component's
//! control flow does not change.
//!
//! # Modules
//!
//! - `deps` - dependency lists and the `deps!` macro
//! - `queue` - state queues, `Setter`/`Dispatch`, the update sink
//! - `invalidate` - reload-time invalidation of dependency lists

mod deps;
mod invalidate;
mod queue;

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::core::EffectFlags;
use crate::element::{Context, Handler, NodeRef};
use crate::fiber::FiberId;
use crate::identity::is_same_component;

pub use deps::{Dep, Deps};
pub use invalidate::{invalidate_fiber_hooks, invalidate_hooks};
pub use queue::{ActionQueue, Dispatch, Setter, StateHook, UpdateSink};

use queue::StateUpdate;

/// Teardown returned by an effect.
pub type Cleanup = Box<dyn FnOnce()>;

/// Setup function of an effect.
pub type EffectFn = Rc<dyn Fn() -> Option<Cleanup>>;

/// When an effect runs relative to the commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// After the commit, on `flush_passive_effects`.
    Passive,
    /// Synchronously during the commit, after host mutations.
    Layout,
}

/// Cached value of `use_memo` / `use_callback`.
#[derive(Clone)]
pub struct MemoHook {
    pub(crate) value: Rc<dyn Any>,
    pub deps: Deps,
}

/// Effect slot.
#[derive(Clone)]
pub struct EffectHook {
    pub kind: EffectKind,
    pub(crate) create: EffectFn,
    /// Shared by both buffers so a cleanup survives the buffer swap.
    pub(crate) destroy: Rc<RefCell<Option<Cleanup>>>,
    pub deps: Deps,
    /// Set when this render requires the effect to (re)run at commit.
    pub pending: bool,
}

impl EffectHook {
    /// Run the previous cleanup, then the setup.
    pub(crate) fn run(&mut self) {
        let cleanup = self.destroy.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
        let next = (self.create)();
        *self.destroy.borrow_mut() = next;
        self.pending = false;
    }

    /// Run the cleanup only (unmount).
    pub(crate) fn teardown(&self) {
        let cleanup = self.destroy.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }
}

/// One hook slot.
#[derive(Clone)]
pub enum Hook {
    State(StateHook),
    Reducer(StateHook),
    Memo(MemoHook),
    Effect(EffectHook),
    Ref(Rc<dyn Any>),
    Context(Context),
}

impl Hook {
    /// Dependency list carried by the slot, if any.
    pub fn deps(&self) -> Option<&Deps> {
        match self {
            Self::Memo(memo) => Some(&memo.deps),
            Self::Effect(effect) => Some(&effect.deps),
            Self::State(_) | Self::Reducer(_) | Self::Ref(_) | Self::Context(_) => None,
        }
    }

    pub(crate) fn deps_mut(&mut self) -> Option<&mut Deps> {
        match self {
            Self::Memo(memo) => Some(&mut memo.deps),
            Self::Effect(effect) => Some(&mut effect.deps),
            Self::State(_) | Self::Reducer(_) | Self::Ref(_) | Self::Context(_) => None,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(state) => f.debug_tuple("State").field(state).finish(),
            Self::Reducer(state) => f.debug_tuple("Reducer").field(state).finish(),
            Self::Memo(memo) => f.debug_tuple("Memo").field(&memo.deps).finish(),
            Self::Effect(effect) => f
                .debug_struct("Effect")
                .field("kind", &effect.kind)
                .field("deps", &effect.deps)
                .field("pending", &effect.pending)
                .finish(),
            Self::Ref(_) => f.write_str("Ref"),
            Self::Context(ctx) => f.debug_tuple("Context").field(&ctx.name()).finish(),
        }
    }
}

// =============================================================================
// Context frames
// =============================================================================

/// A provider value visible to the subtree being rendered.
#[derive(Clone)]
pub struct ContextFrame {
    pub context: Context,
    pub value: Rc<dyn Any>,
    /// The provider's value changed in this render pass.
    pub changed: bool,
}

/// Innermost provider value for `context`.
///
/// Contexts match by object, or by identity when the context object itself
/// was replaced by a reload.
pub fn lookup_context<'a>(frames: &'a [ContextFrame], context: &Context) -> Option<&'a ContextFrame> {
    frames.iter().rev().find(|frame| {
        frame.context.ptr_eq(context) || is_same_component(&frame.context.provider(), &context.provider())
    })
}

// =============================================================================
// Hooks render context
// =============================================================================

/// Render context handed to function components.
///
/// Callbacks returned by hooks may be invoked from event handlers and
/// effects; they must not call back into the `Renderer` synchronously while
/// it is rendering.
pub struct Hooks {
    fiber: FiberId,
    prev: std::vec::IntoIter<Hook>,
    next: Vec<Hook>,
    contexts: Vec<ContextFrame>,
    sink: UpdateSink,
    forwarded_ref: Option<NodeRef>,
    flags: EffectFlags,
}

impl Hooks {
    pub(crate) fn new(
        fiber: FiberId,
        prev: Vec<Hook>,
        contexts: Vec<ContextFrame>,
        sink: UpdateSink,
        forwarded_ref: Option<NodeRef>,
    ) -> Self {
        Self {
            fiber,
            prev: prev.into_iter(),
            next: Vec::new(),
            contexts,
            sink,
            forwarded_ref,
            flags: EffectFlags::empty(),
        }
    }

    /// Fiber being rendered.
    pub fn fiber(&self) -> FiberId {
        self.fiber
    }

    /// Ref passed to a forward-ref component's element.
    pub fn forwarded_ref(&self) -> Option<NodeRef> {
        self.forwarded_ref.clone()
    }

    /// Slot list and the effect flags it requires at commit.
    pub(crate) fn finish(self) -> (Vec<Hook>, EffectFlags) {
        (self.next, self.flags)
    }

    fn take_prev(&mut self) -> Option<Hook> {
        self.prev.next()
    }

    pub fn use_state<T: Clone + 'static>(&mut self, init: impl FnOnce() -> T) -> (T, Setter<T>) {
        let (value, dispatch) = self.reducer_slot(
            |state: &T, update: StateUpdate<T>| update(state),
            init,
            false,
        );
        (value, Setter::new(dispatch))
    }

    pub fn use_reducer<S, A>(
        &mut self,
        reducer: impl Fn(&S, A) -> S,
        init: impl FnOnce() -> S,
    ) -> (S, Dispatch<A>)
    where
        S: Clone + 'static,
        A: 'static,
    {
        self.reducer_slot(reducer, init, true)
    }

    fn reducer_slot<S, A>(
        &mut self,
        reducer: impl Fn(&S, A) -> S,
        init: impl FnOnce() -> S,
        is_reducer: bool,
    ) -> (S, Dispatch<A>)
    where
        S: Clone + 'static,
        A: 'static,
    {
        let mut slot = match self.take_prev() {
            Some(Hook::State(state)) if !is_reducer => state,
            Some(Hook::Reducer(state)) if is_reducer => state,
            _ => {
                let value = init();
                let state = StateHook::new(value.clone());
                let dispatch = Dispatch::new(self.fiber, state.queue.clone(), self.sink.clone());
                self.push_state(state, is_reducer);
                return (value, dispatch);
            }
        };
        let value = slot.process(&reducer, init);
        let dispatch = Dispatch::new(self.fiber, slot.queue.clone(), self.sink.clone());
        self.push_state(slot, is_reducer);
        (value, dispatch)
    }

    fn push_state(&mut self, state: StateHook, is_reducer: bool) {
        self.next.push(if is_reducer {
            Hook::Reducer(state)
        } else {
            Hook::State(state)
        });
    }

    /// Cached value recomputed when `deps` change.
    pub fn use_memo<T: Clone + 'static>(&mut self, deps: Deps, compute: impl FnOnce() -> T) -> T {
        if let Some(Hook::Memo(prev)) = self.take_prev()
            && prev.deps.matches(&deps)
            && let Some(value) = prev.value.downcast_ref::<T>().cloned()
        {
            self.next.push(Hook::Memo(prev));
            return value;
        }
        let value = compute();
        self.next.push(Hook::Memo(MemoHook {
            value: Rc::new(value.clone()),
            deps,
        }));
        value
    }

    /// Stable event handler, replaced when `deps` change.
    pub fn use_callback(&mut self, deps: Deps, callback: impl Fn() + 'static) -> Handler {
        self.use_memo(deps, move || Rc::new(callback) as Handler)
    }

    pub fn use_effect(&mut self, deps: Deps, create: impl Fn() -> Option<Cleanup> + 'static) {
        self.effect_slot(EffectKind::Passive, deps, Rc::new(create));
    }

    pub fn use_layout_effect(&mut self, deps: Deps, create: impl Fn() -> Option<Cleanup> + 'static) {
        self.effect_slot(EffectKind::Layout, deps, Rc::new(create));
    }

    fn effect_slot(&mut self, kind: EffectKind, deps: Deps, create: EffectFn) {
        let (destroy, pending) = match self.take_prev() {
            Some(Hook::Effect(prev)) if prev.kind == kind => {
                let pending = !prev.deps.matches(&deps);
                (prev.destroy, pending)
            }
            _ => (Rc::default(), true),
        };
        if pending {
            self.flags |= match kind {
                EffectKind::Passive => EffectFlags::PASSIVE,
                EffectKind::Layout => EffectFlags::LAYOUT,
            };
        }
        self.next.push(Hook::Effect(EffectHook {
            kind,
            create,
            destroy,
            deps,
            pending,
        }));
    }

    /// Mutable box that survives re-renders and reloads.
    pub fn use_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        if let Some(Hook::Ref(prev)) = self.take_prev()
            && let Ok(cell) = prev.clone().downcast::<RefCell<T>>()
        {
            self.next.push(Hook::Ref(prev));
            return cell;
        }
        let cell = Rc::new(RefCell::new(init()));
        self.next.push(Hook::Ref(cell.clone()));
        cell
    }

    /// Innermost provided value of `context`, or its default.
    ///
    /// Returns `None` when the value is not a `T`.
    pub fn use_context<T: Clone + 'static>(&mut self, context: &Context) -> Option<T> {
        let _ = self.take_prev();
        self.next.push(Hook::Context(context.clone()));
        let value = match lookup_context(&self.contexts, context) {
            Some(frame) => &frame.value,
            None => context.default_value(),
        };
        value.downcast_ref::<T>().cloned()
    }
}
