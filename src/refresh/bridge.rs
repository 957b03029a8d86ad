//! Registration hook connecting renderers to the version-tracking layer.
//!
//! Each renderer injects a weak entry point. A reload is fanned out to
//! every root of every live renderer; boundaries that failed during one
//! reload are handed back on the next so they get remounted.

use rustc_hash::{FxHashMap, FxHashSet};

use super::{ReloadRequest, ReloadResult};
use crate::core::RenderError;
use crate::fiber::{FiberId, RootId};
use crate::{debug, log};

/// Session entry point registered by one renderer.
pub trait RefreshEntry {
    /// Whether the renderer behind this entry still exists.
    fn is_alive(&self) -> bool;

    fn roots(&self) -> Vec<RootId>;

    fn refresh_root(&self, root: RootId, request: &ReloadRequest) -> Result<ReloadResult, RenderError>;
}

/// Result of refreshing one root.
#[derive(Debug)]
pub struct RootOutcome {
    pub renderer: u32,
    pub root: RootId,
    pub result: Result<ReloadResult, RenderError>,
}

#[derive(Default)]
pub struct RefreshBridge {
    entries: Vec<(u32, Box<dyn RefreshEntry>)>,
    next_id: u32,
    failed: FxHashMap<(u32, RootId), FxHashSet<FiberId>>,
}

impl RefreshBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry point; returns its id.
    pub fn inject(&mut self, entry: Box<dyn RefreshEntry>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, entry));
        debug!("bridge"; "renderer {id} injected");
        id
    }

    /// Number of live renderers.
    pub fn renderer_count(&self) -> usize {
        self.entries.iter().filter(|(_, e)| e.is_alive()).count()
    }

    /// Boundaries remembered as failed for one root.
    pub fn failed_boundaries(&self, renderer: u32, root: RootId) -> Option<&FxHashSet<FiberId>> {
        self.failed.get(&(renderer, root))
    }

    /// Apply `request` to every root of every live renderer.
    ///
    /// Failed boundaries recorded by the previous call are added to each
    /// root's request; the set is replaced by what this call reports.
    pub fn perform_refresh(&mut self, request: &ReloadRequest) -> Vec<RootOutcome> {
        self.prune();

        let mut outcomes = Vec::new();
        for (renderer, entry) in &self.entries {
            for root in entry.roots() {
                let key = (*renderer, root);
                let mut scoped = request.clone();
                if let Some(failed) = self.failed.remove(&key) {
                    scoped.failed_boundaries.extend(failed);
                }

                let result = entry.refresh_root(root, &scoped);
                match &result {
                    Ok(outcome) if !outcome.failed_boundaries.is_empty() => {
                        self.failed
                            .insert(key, outcome.failed_boundaries.iter().copied().collect());
                    }
                    Ok(_) => {}
                    Err(e) => log!("error"; "refresh of renderer {renderer} failed: {e}"),
                }
                outcomes.push(RootOutcome {
                    renderer: *renderer,
                    root,
                    result,
                });
            }
        }
        outcomes
    }

    fn prune(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|(_, entry)| entry.is_alive());
        let live: FxHashSet<u32> = self.entries.iter().map(|(id, _)| *id).collect();
        self.failed.retain(|(renderer, _), _| live.contains(renderer));
        if self.entries.len() != before {
            debug!("bridge"; "pruned {} dropped renderers", before - self.entries.len());
        }
    }
}
