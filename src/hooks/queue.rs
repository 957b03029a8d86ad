//! State queues, dispatchers and the update sink.
//!
//! Dispatching never touches the reconciler directly: the action is pushed
//! onto the slot's queue (shared by both buffers of the fiber) and the fiber
//! is pushed onto the `UpdateSink`, which the scheduler drains after event
//! handlers, effects and commits.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::core::{Priority, ScheduleRequest};
use crate::fiber::FiberId;

type Action = Box<dyn Any>;

/// Pending actions of one state or reducer slot.
pub type ActionQueue = Rc<RefCell<Vec<Action>>>;

/// Updater used by `use_state`, queued as a reducer action.
pub(crate) type StateUpdate<T> = Box<dyn FnOnce(&T) -> T>;

/// Stored state of a `use_state` or `use_reducer` slot.
#[derive(Clone)]
pub struct StateHook {
    pub(crate) value: Rc<dyn Any>,
    pub(crate) queue: ActionQueue,
}

impl StateHook {
    pub(crate) fn new<S: 'static>(value: S) -> Self {
        Self {
            value: Rc::new(value),
            queue: Rc::default(),
        }
    }

    /// Apply every queued action through `reducer`.
    ///
    /// A value of a foreign type (slot reused by a different hook after a
    /// control-flow change) is replaced by `init`, and foreign actions are
    /// dropped.
    pub(crate) fn process<S, A>(
        &mut self,
        reducer: &dyn Fn(&S, A) -> S,
        init: impl FnOnce() -> S,
    ) -> S
    where
        S: Clone + 'static,
        A: 'static,
    {
        let actions: Vec<Action> = self.queue.borrow_mut().drain(..).collect();
        let mut state = self.get::<S>().unwrap_or_else(init);
        for action in actions {
            if let Ok(action) = action.downcast::<A>() {
                state = reducer(&state, *action);
            }
        }
        self.value = Rc::new(state.clone());
        state
    }

    /// Current value, if it has type `S`.
    pub fn get<S: Clone + 'static>(&self) -> Option<S> {
        self.value.downcast_ref::<S>().cloned()
    }
}

impl fmt::Debug for StateHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHook")
            .field("queued", &self.queue.borrow().len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// UpdateSink
// =============================================================================

/// Fibers that received an update since the scheduler last looked.
#[derive(Clone, Default)]
pub struct UpdateSink(Rc<RefCell<Vec<(FiberId, ScheduleRequest)>>>);

impl UpdateSink {
    pub fn push(&self, fiber: FiberId, request: ScheduleRequest) {
        self.0.borrow_mut().push((fiber, request));
    }

    pub fn drain(&self) -> Vec<(FiberId, ScheduleRequest)> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

// =============================================================================
// Dispatchers
// =============================================================================

/// Dispatcher returned by `use_reducer`.
pub struct Dispatch<A> {
    fiber: FiberId,
    queue: ActionQueue,
    sink: UpdateSink,
    _action: PhantomData<fn(A)>,
}

impl<A: 'static> Dispatch<A> {
    pub(crate) fn new(fiber: FiberId, queue: ActionQueue, sink: UpdateSink) -> Self {
        Self {
            fiber,
            queue,
            sink,
            _action: PhantomData,
        }
    }

    /// Queue `action` and request a synchronous re-render.
    pub fn dispatch(&self, action: A) {
        self.dispatch_with(action, Priority::Sync);
    }

    /// Queue `action` and request a re-render that waits for the next flush.
    pub fn dispatch_deferred(&self, action: A) {
        self.dispatch_with(action, Priority::Normal);
    }

    fn dispatch_with(&self, action: A, priority: Priority) {
        self.queue.borrow_mut().push(Box::new(action));
        self.sink.push(self.fiber, ScheduleRequest::update(priority));
    }
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self {
            fiber: self.fiber,
            queue: self.queue.clone(),
            sink: self.sink.clone(),
            _action: PhantomData,
        }
    }
}

/// Setter returned by `use_state`.
pub struct Setter<T>(Dispatch<StateUpdate<T>>);

impl<T: 'static> Setter<T> {
    pub(crate) fn new(dispatch: Dispatch<StateUpdate<T>>) -> Self {
        Self(dispatch)
    }

    pub fn set(&self, value: T) {
        self.0.dispatch(Box::new(move |_: &T| value));
    }

    /// Queue an update computed from the latest state.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.0.dispatch(Box::new(f));
    }

    pub fn set_deferred(&self, value: T) {
        self.0.dispatch_deferred(Box::new(move |_: &T| value));
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
