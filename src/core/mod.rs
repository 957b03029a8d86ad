//! Core types - pure abstractions shared across the codebase.

mod error;
mod flags;
mod priority;

pub use error::RenderError;
pub use flags::{EffectFlags, WorkFlags};
pub use priority::{Priority, ScheduleRequest};
