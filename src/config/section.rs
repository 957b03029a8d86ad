//! Configuration sections.
//!
//! # Example
//!
//! ```toml
//! [log]
//! verbose = false               # Print debug output
//!
//! [refresh]
//! flush_passive_effects = true  # Run pending passive effects before a reload
//! collect_host_nodes = true     # Report host nodes of affected subtrees
//!
//! [scheduler]
//! nested_update_limit = 50      # Render passes allowed per flush
//! ```

use serde::{Deserialize, Serialize};

/// `[log]` settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub verbose: bool,
}

/// `[refresh]` settings, read by every reload session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSection {
    /// Flush pending passive effects before walking the tree.
    pub flush_passive_effects: bool,

    /// Collect host nodes of affected fibers into the result.
    pub collect_host_nodes: bool,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            flush_passive_effects: true,
            collect_host_nodes: true,
        }
    }
}

/// `[scheduler]` settings of the reference reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// Consecutive render passes one flush may run before it gives up with
    /// `RenderError::NestedUpdateLimit`.
    pub nested_update_limit: usize,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            nested_update_limit: 50,
        }
    }
}
