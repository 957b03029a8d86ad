//! hotfiber - live component identity resolution and selective re-render
//! for a fiber reconciler.
//!
//! Given a retained tree of rendered component instances and a set of
//! identities that now point to updated implementations, a refresh session
//! finds the matching fibers, re-renders them with their local state and
//! host nodes intact, invalidates memoized values and effects bound to the
//! old implementation, re-arms instances behind previously tripped error
//! boundaries and reports the host nodes and boundaries involved.
//!
//! # Modules
//!
//! | Module       | Purpose                                            |
//! |--------------|----------------------------------------------------|
//! | `identity`   | Identities, same-component check, registry         |
//! | `hooks`      | Hook slots and reload-time invalidation            |
//! | `fiber`      | Fiber arena, tree reflection, host-node collection |
//! | `refresh`    | Tree walker, reload session, refresh bridge        |
//! | `reconciler` | Synchronous reference reconciler and `Renderer`    |
//! | `host`       | In-memory host renderer                            |
//! | `element`    | Elements, props and component types                |
//! | `core`       | Errors, flags, scheduling priorities               |
//! | `config`     | `hotfiber.toml`                                    |
//! | `logger`     | `log!` / `debug!` output                           |

#[macro_use]
pub mod logger;

pub mod config;
pub mod core;
pub mod element;
pub mod fiber;
pub mod hooks;
pub mod host;
pub mod identity;
pub mod reconciler;
pub mod refresh;

pub use crate::core::{EffectFlags, Priority, RenderError, ScheduleRequest, WorkFlags};
pub use element::{ComponentType, Context, Element, Node, NodeRef, Props};
pub use identity::{Identity, Registry};
pub use reconciler::Renderer;
pub use refresh::{RefreshBridge, ReloadRequest, ReloadResult, schedule_update_for_hot_reload};
