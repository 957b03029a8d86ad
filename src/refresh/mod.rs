//! Hot-reload refresh core.
//!
//! Given identities that now point to new implementations, walk a mounted
//! tree, force matching fibers to re-render with their state intact (or
//! remount them when their identity was invalidated), and report the host
//! nodes and error boundaries involved.
//!
//! # Modules
//!
//! - `walker` - tree walk issuing refresh/remount requests
//! - `session` - `schedule_update_for_hot_reload` entry point
//! - `bridge` - registration hook fanning a reload out to every renderer

mod bridge;
mod session;
mod walker;


use rustc_hash::FxHashSet;

use crate::core::{EffectFlags, RenderError, ScheduleRequest};
use crate::fiber::{FiberId, FiberTree, RootId, TreeReflection};
use crate::host::HostId;
use crate::identity::{Identity, IdentitySet};

pub use bridge::{RefreshBridge, RefreshEntry, RootOutcome};
pub use session::schedule_update_for_hot_reload;
pub use walker::schedule_refresh;

// =============================================================================
// Collaborators
// =============================================================================

/// Work scheduling interface of a reconciler.
pub trait WorkScheduler {
    /// Queue an update for `fiber`. Stale handles resolve to their committed
    /// twin; unmounted fibers are ignored.
    fn schedule_work(&mut self, fiber: FiberId, request: ScheduleRequest);

    /// Run `f`, deferring synchronous work until the outermost batch ends,
    /// then flush it.
    fn batched_updates<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Result<R, RenderError>
    where
        Self: Sized;

    /// Run pending passive effects. Returns whether any were pending.
    fn flush_passive_effects(&mut self) -> bool;
}

/// Everything a refresh session needs from a reconciler.
pub trait RefreshTarget: WorkScheduler + TreeReflection {
    fn tree(&self) -> &FiberTree;

    fn tree_mut(&mut self) -> &mut FiberTree;

    /// Current root fiber of `root`.
    fn root_fiber(&self, root: RootId) -> Option<FiberId>;

    /// Effect list of the commits made since the outermost batch started.
    fn last_committed_effects(&self) -> &[(FiberId, EffectFlags)];

    /// Number of commits so far.
    fn commit_count(&self) -> u64;
}

// =============================================================================
// Request / result
// =============================================================================

/// Input of one refresh session.
#[derive(Debug, Clone, Default)]
pub struct ReloadRequest {
    /// Identities whose new implementation keeps hook state.
    pub updated: IdentitySet,
    /// Identities whose instances must be remounted.
    pub invalidated: IdentitySet,
    /// Boundaries that captured an error in a previous session.
    pub failed_boundaries: FxHashSet<FiberId>,
}

impl ReloadRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(mut self, identity: &Identity) -> Self {
        self.updated.insert(identity);
        self
    }

    pub fn invalidate(mut self, identity: &Identity) -> Self {
        self.invalidated.insert(identity);
        self
    }

    pub fn with_failed_boundaries(mut self, boundaries: impl IntoIterator<Item = FiberId>) -> Self {
        self.failed_boundaries.extend(boundaries);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.invalidated.is_empty() && self.failed_boundaries.is_empty()
    }
}

/// Outcome of one refresh session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadResult {
    /// Host nodes of every affected subtree, document order, deduplicated.
    pub host_nodes: Vec<HostId>,
    /// Class boundaries that captured an error during the session commit.
    pub failed_boundaries: Vec<FiberId>,
}
